use crate::config::ValidatorConfig;
use crate::distribution::{chi_square_ppf, chi_square_sf};
use crate::prelude::*;
use log::debug;
use serde::{Deserialize, Serialize};

/// Outcome of one goodness-of-fit test.
///
/// Values are kept at full precision; `rounded()` gives the three-decimal
/// form used for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChiSquareResult {
    statistic: f64,
    degrees_of_freedom: usize,
    p_value: f64,
    critical_value: f64,
    alpha: f64,
    passed: bool,
    interpretation: String,
}

impl ChiSquareResult {
    pub fn statistic(&self) -> f64 {
        self.statistic
    }

    pub fn degrees_of_freedom(&self) -> usize {
        self.degrees_of_freedom
    }

    pub fn p_value(&self) -> f64 {
        self.p_value
    }

    pub fn critical_value(&self) -> f64 {
        self.critical_value
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// True when the statistic is strictly below the critical value.
    pub fn passed(&self) -> bool {
        self.passed
    }

    pub fn interpretation(&self) -> &str {
        &self.interpretation
    }

    pub fn rounded(&self) -> Self {
        Self {
            statistic: round3(self.statistic),
            p_value: round3(self.p_value),
            critical_value: round3(self.critical_value),
            ..self.clone()
        }
    }
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

fn interpret(statistic: f64, df: usize, p_value: f64, critical_value: f64, alpha: f64, passed: bool) -> String {
    if passed {
        format!(
            "chi-square {:.3} is below the critical value {:.3} (df = {}, p = {:.3}, alpha = {}). \
             The observed counts match the expected ratios; there is no statistically significant deviation.",
            statistic, critical_value, df, p_value, alpha
        )
    } else {
        format!(
            "chi-square {:.3} is not below the critical value {:.3} (df = {}, p = {:.3}, alpha = {}). \
             The observed counts show a significant deviation from the expected ratios, which may point to \
             counting error, selection bias or a different inheritance mechanism than predicted.",
            statistic, critical_value, df, p_value, alpha
        )
    }
}

/// Pearson's chi-square goodness-of-fit test of `observed` against `expected`.
///
/// Both tables must have the same phenotype labels, at least two of them,
/// and every expected count must be positive and finite. Nothing is
/// computed unless all of that holds.
pub fn chi_square_test(
    expected: &ExpectedCounts,
    observed: &ObservedCounts,
    config: &ValidatorConfig,
) -> Result<ChiSquareResult> {
    config.validate()?;

    if !expected.keys().eq(observed.keys()) {
        let missing: Vec<&String> = expected
            .keys()
            .filter(|k| !observed.contains_key(*k))
            .chain(observed.keys().filter(|k| !expected.contains_key(*k)))
            .collect();
        return Err(Error::Validation(format!(
            "expected and observed phenotypes differ: {:?}",
            missing
        )));
    }
    if expected.len() < 2 {
        return Err(Error::Validation(format!(
            "need at least 2 phenotype categories, got {}",
            expected.len()
        )));
    }
    if let Some((label, count)) = expected.iter().find(|(_, c)| !(c.is_finite() && **c > 0.0)) {
        return Err(Error::Validation(format!(
            "expected count for '{}' must be positive, got {}",
            label, count
        )));
    }

    let statistic: f64 = expected
        .iter()
        .zip(observed.values())
        .map(|((_, e), o)| {
            let deviation = *o as f64 - e;
            deviation * deviation / e
        })
        .sum();
    let degrees_of_freedom = expected.len() - 1;
    let critical_value = chi_square_ppf(1.0 - config.alpha, degrees_of_freedom);
    let p_value = chi_square_sf(statistic, degrees_of_freedom);
    if !statistic.is_finite() || !p_value.is_finite() {
        return Err(Error::Validation(format!(
            "chi-square is not representable (statistic {}, p {}); expected counts are too small",
            statistic, p_value
        )));
    }
    let passed = statistic < critical_value;

    debug!(
        "chi-square {:.4} on {} df against {:.4}: {}",
        statistic,
        degrees_of_freedom,
        critical_value,
        if passed { "pass" } else { "fail" }
    );

    Ok(ChiSquareResult {
        statistic,
        degrees_of_freedom,
        p_value,
        critical_value,
        alpha: config.alpha,
        passed,
        interpretation: interpret(statistic, degrees_of_freedom, p_value, critical_value, config.alpha, passed),
    })
}

/// Tests observed counts against a table of expectations.
pub trait GoodnessOfFit {
    fn goodness_of_fit(&self, observed: &ObservedCounts, config: &ValidatorConfig) -> Result<ChiSquareResult>;
}

impl GoodnessOfFit for ExpectedCounts {
    fn goodness_of_fit(&self, observed: &ObservedCounts, config: &ValidatorConfig) -> Result<ChiSquareResult> {
        chi_square_test(self, observed, config)
    }
}
