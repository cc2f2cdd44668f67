//! The experiment record that carries a cross from prediction to verdict.
//!
//! Storage is someone else's job: the record only knows how to turn itself
//! into JSON and back.
use crate::chi_square::chi_square_test;
use crate::cross::{cross, expected_counts, phenotype_ratios};
use crate::prelude::*;
use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExperimentState {
    Created,
    ExpectedCalculated,
    ObservationsRecorded,
    AnalysisComplete,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ExperimentRecord")]
pub struct Experiment {
    id: String,
    name: String,
    parent1: Genotype,
    parent2: Genotype,
    allele_definitions: AlleleDefinitions,
    total_expected: u32,
    #[serde(default)]
    notes: String,
    #[serde(default)]
    expected_counts: ExpectedCounts,
    observed_counts: Option<ObservedCounts>,
    chi_square_result: Option<ChiSquareResult>,
    state: ExperimentState,
    created: DateTime<Utc>,
    modified: DateTime<Utc>,
}

/// The stored form of an `Experiment`, checked before it becomes one.
#[derive(Deserialize)]
struct ExperimentRecord {
    id: String,
    name: String,
    parent1: Genotype,
    parent2: Genotype,
    allele_definitions: AlleleDefinitions,
    total_expected: u32,
    #[serde(default)]
    notes: String,
    #[serde(default)]
    expected_counts: ExpectedCounts,
    observed_counts: Option<ObservedCounts>,
    chi_square_result: Option<ChiSquareResult>,
    state: ExperimentState,
    created: DateTime<Utc>,
    modified: DateTime<Utc>,
}

impl TryFrom<ExperimentRecord> for Experiment {
    type Error = Error;

    /// Rejects records whose stored data contradicts their state.
    fn try_from(record: ExperimentRecord) -> Result<Self> {
        use self::ExperimentState::*;
        if record.parent1.trait_count() != record.parent2.trait_count() {
            return Err(Error::TraitCountMismatch {
                left: record.parent1.trait_count(),
                right: record.parent2.trait_count(),
            });
        }
        if record.total_expected == 0 {
            return Err(Error::Validation("expected total must be positive".into()));
        }
        if record.modified < record.created {
            return Err(Error::Validation("modified before it was created".into()));
        }

        let has_expected = !record.expected_counts.is_empty();
        let observed_matches = record
            .observed_counts
            .as_ref()
            .map(|observed| record.expected_counts.keys().eq(observed.keys()));
        let has_result = record.chi_square_result.is_some();
        let consistent = match record.state {
            Created => !has_expected && observed_matches.is_none() && !has_result,
            ExpectedCalculated => has_expected && observed_matches.is_none() && !has_result,
            ObservationsRecorded => has_expected && observed_matches == Some(true) && !has_result,
            AnalysisComplete => has_expected && observed_matches == Some(true) && has_result,
        };
        if !consistent {
            return Err(Error::Validation(format!(
                "experiment {} holds data that does not fit state {:?}",
                record.id, record.state
            )));
        }

        Ok(Self {
            id: record.id,
            name: record.name,
            parent1: record.parent1,
            parent2: record.parent2,
            allele_definitions: record.allele_definitions,
            total_expected: record.total_expected,
            notes: record.notes,
            expected_counts: record.expected_counts,
            observed_counts: record.observed_counts,
            chi_square_result: record.chi_square_result,
            state: record.state,
            created: record.created,
            modified: record.modified,
        })
    }
}

impl Experiment {
    /// Parses both parents and checks they can be crossed.
    pub fn new(
        id: &str,
        name: &str,
        parent1: &str,
        parent2: &str,
        allele_definitions: AlleleDefinitions,
        total_expected: u32,
    ) -> Result<Self> {
        let parent1: Genotype = parent1.parse()?;
        let parent2: Genotype = parent2.parse()?;
        if parent1.trait_count() != parent2.trait_count() {
            return Err(Error::TraitCountMismatch {
                left: parent1.trait_count(),
                right: parent2.trait_count(),
            });
        }
        if total_expected == 0 {
            return Err(Error::Validation("expected total must be positive".into()));
        }
        let now = Utc::now();
        Ok(Self {
            id: id.into(),
            name: name.into(),
            parent1,
            parent2,
            allele_definitions,
            total_expected,
            notes: String::new(),
            expected_counts: ExpectedCounts::new(),
            observed_counts: None,
            chi_square_result: None,
            state: ExperimentState::Created,
            created: now,
            modified: now,
        })
    }

    pub fn with_notes(mut self, notes: &str) -> Self {
        self.notes = notes.into();
        self.modified = Utc::now();
        self
    }

    fn advance(&mut self, allowed: &[ExperimentState], to: ExperimentState) -> Result<()> {
        if !allowed.contains(&self.state) {
            return Err(Error::InvalidTransition {
                from: self.state,
                to,
            });
        }
        debug!("experiment {}: {:?} -> {:?}", self.id, self.state, to);
        self.state = to;
        self.modified = Utc::now();
        Ok(())
    }

    /// Crosses the parents and scales the phenotype ratios to `total_expected`.
    ///
    /// Can be repeated until observations are recorded.
    pub fn calculate_expected(&mut self) -> Result<&ExpectedCounts> {
        use self::ExperimentState::*;
        if ![Created, ExpectedCalculated].contains(&self.state) {
            return Err(Error::InvalidTransition {
                from: self.state,
                to: ExpectedCalculated,
            });
        }
        let offspring = cross(&self.parent1, &self.parent2)?;
        let ratios = phenotype_ratios(&offspring, &self.allele_definitions)?;
        self.expected_counts = expected_counts(&ratios, self.total_expected)?;
        self.advance(&[Created, ExpectedCalculated], ExpectedCalculated)?;
        Ok(&self.expected_counts)
    }

    /// Stores counted offspring. Recording again replaces the counts and
    /// drops any earlier analysis.
    pub fn record_observations(&mut self, observed: ObservedCounts) -> Result<()> {
        use self::ExperimentState::*;
        if ![ExpectedCalculated, ObservationsRecorded, AnalysisComplete].contains(&self.state) {
            return Err(Error::InvalidTransition {
                from: self.state,
                to: ObservationsRecorded,
            });
        }
        if !self.expected_counts.keys().eq(observed.keys()) {
            return Err(Error::Validation(
                "observed phenotypes must match the expected phenotypes".into(),
            ));
        }
        self.observed_counts = Some(observed);
        self.chi_square_result = None;
        self.advance(
            &[ExpectedCalculated, ObservationsRecorded, AnalysisComplete],
            ObservationsRecorded,
        )
    }

    /// Runs the goodness-of-fit test on the recorded observations.
    pub fn analyze(&mut self, config: &ValidatorConfig) -> Result<&ChiSquareResult> {
        use self::ExperimentState::*;
        let observed = match (&self.observed_counts, self.state) {
            (Some(observed), ObservationsRecorded) | (Some(observed), AnalysisComplete) => observed,
            _ => {
                return Err(Error::InvalidTransition {
                    from: self.state,
                    to: AnalysisComplete,
                })
            }
        };
        let result = chi_square_test(&self.expected_counts, observed, config)?;
        self.advance(&[ObservationsRecorded, AnalysisComplete], AnalysisComplete)?;
        Ok(self.chi_square_result.insert(result))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn parents(&self) -> (&Genotype, &Genotype) {
        (&self.parent1, &self.parent2)
    }

    pub fn allele_definitions(&self) -> &AlleleDefinitions {
        &self.allele_definitions
    }

    pub fn total_expected(&self) -> u32 {
        self.total_expected
    }

    pub fn expected_counts(&self) -> &ExpectedCounts {
        &self.expected_counts
    }

    pub fn observed_counts(&self) -> Option<&ObservedCounts> {
        self.observed_counts.as_ref()
    }

    pub fn chi_square_result(&self) -> Option<&ChiSquareResult> {
        self.chi_square_result.as_ref()
    }

    pub fn state(&self) -> ExperimentState {
        self.state
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    /// Time of the last state change or edit.
    pub fn modified(&self) -> DateTime<Utc> {
        self.modified
    }

    /// Observations have been recorded.
    pub fn is_complete(&self) -> bool {
        self.observed_counts.is_some()
    }

    pub fn status(&self) -> &'static str {
        if self.is_complete() {
            "Complete"
        } else {
            "Pending"
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a stored experiment. A record whose contents contradict its
    /// state is a `Validation` error.
    pub fn from_json(json: &str) -> Result<Self> {
        let record: ExperimentRecord = serde_json::from_str(json)?;
        Self::try_from(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    type TestResult = std::result::Result<(), Box<dyn StdError>>;

    fn eye_color() -> Result<Experiment> {
        let mut defs = AlleleDefinitions::new();
        defs.define_trait('E', "Red eyes", "White eyes")?;
        Experiment::new("TEST_001", "Eye color testcross", "Ee", "ee", defs, 500)
    }

    fn counts(red: u64, white: u64) -> ObservedCounts {
        let mut observed = ObservedCounts::new();
        observed.insert("Red eyes".into(), red);
        observed.insert("White eyes".into(), white);
        observed
    }

    #[test]
    fn test_full_lifecycle() -> TestResult {
        let mut experiment = eye_color()?.with_notes("expect 1:1");
        assert_eq!(experiment.state(), ExperimentState::Created);
        assert_eq!(experiment.status(), "Pending");

        let expected = experiment.calculate_expected()?;
        assert_eq!(expected["Red eyes"], 250.0);
        assert_eq!(experiment.state(), ExperimentState::ExpectedCalculated);

        experiment.record_observations(counts(247, 253))?;
        assert_eq!(experiment.state(), ExperimentState::ObservationsRecorded);
        assert_eq!(experiment.status(), "Complete");

        let passed = experiment.analyze(&ValidatorConfig::default())?.passed();
        assert!(passed);
        assert_eq!(experiment.state(), ExperimentState::AnalysisComplete);
        Ok(())
    }

    #[test]
    fn test_out_of_order_steps_are_rejected() -> TestResult {
        let mut experiment = eye_color()?;
        assert!(matches!(
            experiment.record_observations(counts(1, 1)),
            Err(Error::InvalidTransition { .. })
        ));
        assert!(matches!(
            experiment.analyze(&ValidatorConfig::default()),
            Err(Error::InvalidTransition { .. })
        ));
        experiment.calculate_expected()?;
        experiment.record_observations(counts(250, 250))?;
        assert!(matches!(
            experiment.calculate_expected(),
            Err(Error::InvalidTransition { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_rerecording_drops_analysis() -> TestResult {
        let mut experiment = eye_color()?;
        experiment.calculate_expected()?;
        experiment.record_observations(counts(247, 253))?;
        experiment.analyze(&ValidatorConfig::default())?;
        experiment.record_observations(counts(150, 350))?;
        assert!(experiment.chi_square_result().is_none());
        assert!(!experiment.analyze(&ValidatorConfig::default())?.passed());
        Ok(())
    }

    #[test]
    fn test_observations_must_match_phenotypes() -> TestResult {
        let mut experiment = eye_color()?;
        experiment.calculate_expected()?;
        let mut observed = counts(250, 250);
        observed.insert("Pink eyes".into(), 3);
        assert!(matches!(
            experiment.record_observations(observed),
            Err(Error::Validation(_))
        ));
        assert_eq!(experiment.state(), ExperimentState::ExpectedCalculated);
        Ok(())
    }

    #[test]
    fn test_construction_errors() -> TestResult {
        let mut defs = AlleleDefinitions::new();
        defs.define_trait('E', "Red eyes", "White eyes")?;
        assert!(matches!(
            Experiment::new("X", "bad", "Ee Ww", "ee", defs.clone(), 10),
            Err(Error::TraitCountMismatch { .. })
        ));
        assert!(matches!(
            Experiment::new("X", "bad", "E", "ee", defs.clone(), 10),
            Err(Error::Format(_))
        ));
        assert!(Experiment::new("X", "bad", "Ee", "ee", defs, 0).is_err());
        Ok(())
    }

    #[test]
    fn test_json_round_trip() -> TestResult {
        let mut experiment = eye_color()?;
        experiment.calculate_expected()?;
        experiment.record_observations(counts(247, 253))?;
        experiment.analyze(&ValidatorConfig::default())?;

        let json = experiment.to_json()?;
        let value: serde_json::Value = serde_json::from_str(&json)?;
        assert_eq!(value["parent1"], "Ee");
        assert_eq!(value["state"], "AnalysisComplete");
        assert_eq!(value["observed_counts"]["White eyes"], 253);

        let back = Experiment::from_json(&json)?;
        assert_eq!(back.id(), "TEST_001");
        assert_eq!(back.parents().0.to_string(), "Ee");
        assert_eq!(back.allele_definitions().lookup('e')?.description(), "White eyes");
        assert_eq!(back.expected_counts(), experiment.expected_counts());
        assert_eq!(back.chi_square_result().map(|r| r.passed()), Some(true));
        assert_eq!(back.created(), experiment.created());
        assert_eq!(back.modified(), experiment.modified());
        Ok(())
    }

    #[test]
    fn test_timestamps_track_changes() -> TestResult {
        let mut experiment = eye_color()?;
        let created = experiment.created();
        assert_eq!(experiment.modified(), created);
        experiment.calculate_expected()?;
        assert!(experiment.modified() >= created);
        assert_eq!(experiment.created(), created);
        Ok(())
    }

    fn stored_analysis() -> std::result::Result<serde_json::Value, Box<dyn StdError>> {
        let mut experiment = eye_color()?;
        experiment.calculate_expected()?;
        experiment.record_observations(counts(247, 253))?;
        experiment.analyze(&ValidatorConfig::default())?;
        Ok(serde_json::from_str(&experiment.to_json()?)?)
    }

    #[test]
    fn test_stored_state_must_match_contents() -> TestResult {
        let mut value = stored_analysis()?;
        value["observed_counts"] = serde_json::Value::Null;
        assert!(matches!(
            Experiment::from_json(&value.to_string()),
            Err(Error::Validation(_))
        ));

        let mut value = stored_analysis()?;
        value["state"] = "ExpectedCalculated".into();
        assert!(matches!(
            Experiment::from_json(&value.to_string()),
            Err(Error::Validation(_))
        ));
        Ok(())
    }

    #[test]
    fn test_stored_zero_total_is_rejected() -> TestResult {
        let mut value = stored_analysis()?;
        value["total_expected"] = 0.into();
        assert!(matches!(
            Experiment::from_json(&value.to_string()),
            Err(Error::Validation(_))
        ));
        Ok(())
    }

    #[test]
    fn test_stored_observations_must_match_phenotypes() -> TestResult {
        let mut value = stored_analysis()?;
        value["observed_counts"]["Pink eyes"] = 3.into();
        assert!(matches!(
            Experiment::from_json(&value.to_string()),
            Err(Error::Validation(_))
        ));
        Ok(())
    }
}
