pub use crate::chi_square::{chi_square_test, ChiSquareResult, GoodnessOfFit};
pub use crate::config::ValidatorConfig;
pub use crate::cross::{
    cross, expected_counts, genotype_ratios, genotype_to_phenotype, phenotype_counts,
    phenotype_ratios, Ratio,
};
pub use crate::error::{Error, Result};
pub use crate::experiment::{Experiment, ExperimentState};
pub use crate::observable::CsvBuilder;
pub use crate::punnett::PunnettSquare;
pub use crate::{
    Allele, AlleleDefinitions, ExpectedCounts, Gamete, Genotype, ObservedCounts, Phenotype,
    Ratios, Symbol, TraitPair,
};
