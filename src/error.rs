use crate::experiment::ExperimentState;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong between a genotype string and a verdict.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A genotype or allele symbol that does not follow the pair rules.
    #[error("malformed genotype: {0}")]
    Format(String),

    #[error("parents have different trait counts ({left} vs {right})")]
    TraitCountMismatch { left: usize, right: usize },

    #[error("no allele definition for symbol '{0}'")]
    UnknownAllele(char),

    /// Inputs the validator or the ratio functions refuse to compute on.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("experiment cannot move from {from:?} to {to:?}")]
    InvalidTransition {
        from: ExperimentState,
        to: ExperimentState,
    },

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("punnett square shape: {0}")]
    Shape(#[from] ndarray::ShapeError),
}
