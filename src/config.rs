//! Validator configuration.
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_ALPHA: f64 = 0.05;

/// Settings for the chi-square goodness-of-fit test.
///
/// Passed explicitly to every validation so different callers can use
/// different significance levels side by side.
///
/// ```
/// use mendel::config::ValidatorConfig;
///
/// let config = ValidatorConfig::default().with_alpha(0.01);
/// assert_eq!(config.alpha, 0.01);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Significance level; the critical value is taken at `1 - alpha`.
    pub alpha: f64,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
        }
    }
}

impl ValidatorConfig {
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Alpha must lie strictly between 0 and 1.
    pub fn validate(&self) -> Result<()> {
        if self.alpha > 0.0 && self.alpha < 1.0 {
            Ok(())
        } else {
            Err(Error::Validation(format!(
                "alpha must be in (0, 1), got {}",
                self.alpha
            )))
        }
    }
}
