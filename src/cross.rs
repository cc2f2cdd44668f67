//! Punnett-square enumeration and the tallies built on top of it.
//!
//! Everything here is exhaustive: a cross between two parents with `n`
//! traits each produces `2^n * 2^n` offspring. There is no sampling fallback,
//! so keeping the trait count small is the caller's business.
use crate::prelude::*;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type Tally = BTreeMap<String, usize>;

impl Genotype {
    /// All gametes this genotype can produce, one allele per trait.
    ///
    /// The list always has `2^t` entries for `t` traits. Homozygous traits
    /// still contribute two (identical) choices, so duplicates are kept and
    /// only collapse when offspring are tallied. The first trait varies
    /// slowest: `EeWw` yields `EW, Ew, eW, ew`.
    pub fn gametes(&self) -> Vec<Gamete> {
        let mut gametes = vec![String::with_capacity(self.trait_count())];
        for pair in self.pairs() {
            let mut next = Vec::with_capacity(gametes.len() * 2);
            for partial in &gametes {
                for allele in pair.alleles().iter() {
                    let mut gamete = partial.clone();
                    gamete.push(*allele);
                    next.push(gamete);
                }
            }
            gametes = next;
        }
        trace!("{} -> {} gametes", self, gametes.len());
        gametes
    }
}

/// Parses `genotype` and enumerates its gametes.
pub fn gametes(genotype: &str) -> Result<Vec<Gamete>> {
    Ok(genotype.parse::<Genotype>()?.gametes())
}

/// Every offspring genotype of `parent1 x parent2`.
///
/// The outer loop runs over parent1's gametes and the inner loop over
/// parent2's, both in `gametes()` order. Within each offspring pair the
/// parent1 allele comes first.
///
/// Both parents must carry the same traits in the same positions. The cost
/// is `O(4^n)` for `n` traits.
pub fn cross(parent1: &Genotype, parent2: &Genotype) -> Result<Vec<Genotype>> {
    if parent1.trait_count() != parent2.trait_count() {
        return Err(Error::TraitCountMismatch {
            left: parent1.trait_count(),
            right: parent2.trait_count(),
        });
    }
    for (i, (a, b)) in parent1.pairs().iter().zip(parent2.pairs()).enumerate() {
        if a.base() != b.base() {
            return Err(Error::Format(format!(
                "trait {} is '{}' in the first parent but '{}' in the second",
                i + 1,
                a,
                b
            )));
        }
    }

    let left = parent1.gametes();
    let right = parent2.gametes();
    let mut offspring = Vec::with_capacity(left.len() * right.len());
    for g1 in &left {
        for g2 in &right {
            offspring.push(combine(g1, g2)?);
        }
    }

    debug!(
        "crossed {} x {}: {} x {} gametes -> {} offspring",
        parent1,
        parent2,
        left.len(),
        right.len(),
        offspring.len()
    );
    Ok(offspring)
}

fn combine(gamete1: &str, gamete2: &str) -> Result<Genotype> {
    let pairs = gamete1
        .chars()
        .zip(gamete2.chars())
        .map(|(a, b)| TraitPair::new(a, b))
        .collect::<Result<Vec<_>>>()?;
    Genotype::from_pairs(pairs)
}

/// Resolves each trait of `offspring` to a description.
///
/// A dominant allele masks a recessive one. If the first allele is dominant
/// it wins, even when the second is flagged dominant too; co-dominance is not
/// modeled. Otherwise the second allele's description is used.
pub fn genotype_to_phenotype(offspring: &Genotype, definitions: &AlleleDefinitions) -> Result<Phenotype> {
    let traits = offspring
        .pairs()
        .iter()
        .map(|pair| {
            let first = definitions.lookup(pair.first())?;
            let second = definitions.lookup(pair.second())?;
            let expressed = if first.is_dominant() || pair.is_homozygous() {
                first
            } else {
                second
            };
            Ok(expressed.description().to_owned())
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Phenotype::new(traits))
}

/// Number of offspring per phenotype label.
pub fn phenotype_counts(offspring: &[Genotype], definitions: &AlleleDefinitions) -> Result<Tally> {
    let mut counts = Tally::new();
    for genotype in offspring {
        let phenotype = genotype_to_phenotype(genotype, definitions)?;
        *counts.entry(phenotype.label()).or_insert(0) += 1;
    }
    Ok(counts)
}

/// Fraction of offspring showing each phenotype. The values sum to 1.
pub fn phenotype_ratios(offspring: &[Genotype], definitions: &AlleleDefinitions) -> Result<Ratios> {
    if offspring.is_empty() {
        return Err(Error::Validation("no offspring to tally".into()));
    }
    let total = offspring.len() as f64;
    Ok(phenotype_counts(offspring, definitions)?
        .into_iter()
        .map(|(label, count)| (label, count as f64 / total))
        .collect())
}

/// A count out of a total, e.g. `2/4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ratio {
    pub count: usize,
    pub total: usize,
}

impl Ratio {
    pub fn ratio(&self) -> f64 {
        self.count as f64 / self.total as f64
    }

    pub fn fraction(&self) -> String {
        format!("{}/{}", self.count, self.total)
    }
}

/// Number of offspring per distinct genotype, pairs written dominant-first.
pub fn genotype_counts(offspring: &[Genotype]) -> Tally {
    let mut counts = Tally::new();
    for genotype in offspring {
        *counts.entry(genotype.normalized().to_string()).or_insert(0) += 1;
    }
    counts
}

pub fn genotype_ratios(offspring: &[Genotype]) -> Result<BTreeMap<String, Ratio>> {
    if offspring.is_empty() {
        return Err(Error::Validation("no offspring to tally".into()));
    }
    let total = offspring.len();
    Ok(genotype_counts(offspring)
        .into_iter()
        .map(|(genotype, count)| (genotype, Ratio { count, total }))
        .collect())
}

/// Scales `ratios` to a sample of `total` offspring. No rounding is applied.
pub fn expected_counts(ratios: &Ratios, total: u32) -> Result<ExpectedCounts> {
    if total == 0 {
        return Err(Error::Validation("expected total must be positive".into()));
    }
    Ok(ratios
        .iter()
        .map(|(label, ratio)| (label.clone(), ratio * f64::from(total)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    type TestResult = std::result::Result<(), Box<dyn StdError>>;

    fn eye_and_wing() -> Result<AlleleDefinitions> {
        let mut defs = AlleleDefinitions::new();
        defs.define_trait('E', "Red eyes", "White eyes")?
            .define_trait('W', "Normal wings", "Vestigial wings")?;
        Ok(defs)
    }

    #[test]
    fn test_gametes_follow_product_order() -> TestResult {
        assert_eq!(gametes("Ee Ww")?, vec!["EW", "Ew", "eW", "ew"]);
        Ok(())
    }

    #[test]
    fn test_homozygous_gametes_keep_duplicates() -> TestResult {
        assert_eq!(gametes("ee")?, vec!["e", "e"]);
        assert_eq!(gametes("EE ww")?.len(), 4);
        Ok(())
    }

    #[test]
    fn test_gametes_rejects_unvalidated_input() {
        assert!(matches!(gametes("Eew"), Err(Error::Format(_))));
    }

    #[test]
    fn test_monohybrid_testcross() -> TestResult {
        let offspring = cross(&"Ee".parse()?, &"ee".parse()?)?;
        let strings: Vec<String> = offspring.iter().map(|g| g.to_string()).collect();
        assert_eq!(strings, vec!["Ee", "Ee", "ee", "ee"]);
        Ok(())
    }

    #[test]
    fn test_cross_keeps_parent1_allele_first() -> TestResult {
        let offspring = cross(&"ee".parse()?, &"EE".parse()?)?;
        assert!(offspring.iter().all(|g| g.to_string() == "eE"));
        Ok(())
    }

    #[test]
    fn test_cross_rejects_trait_count_mismatch() -> TestResult {
        let result = cross(&"Ee Ww".parse()?, &"ee".parse()?);
        assert!(matches!(
            result,
            Err(Error::TraitCountMismatch { left: 2, right: 1 })
        ));
        Ok(())
    }

    #[test]
    fn test_cross_rejects_misaligned_traits() -> TestResult {
        let result = cross(&"Ee Ww".parse()?, &"Ww Ee".parse()?);
        assert!(matches!(result, Err(Error::Format(_))));
        Ok(())
    }

    #[test]
    fn test_dominant_allele_masks_recessive() -> TestResult {
        let defs = eye_and_wing()?;
        let phenotype = genotype_to_phenotype(&"eE ww".parse()?, &defs)?;
        assert_eq!(phenotype.label(), "Red eyes, Vestigial wings");
        Ok(())
    }

    #[test]
    fn test_first_dominant_allele_wins() -> TestResult {
        let mut defs = AlleleDefinitions::new();
        defs.define(Allele::new('B', "Black", true))?
            .define(Allele::new('b', "Brown", true))?;
        assert_eq!(genotype_to_phenotype(&"bB".parse()?, &defs)?.label(), "Brown");
        assert_eq!(genotype_to_phenotype(&"Bb".parse()?, &defs)?.label(), "Black");
        Ok(())
    }

    #[test]
    fn test_two_recessive_flags_resolve_to_second_allele() -> TestResult {
        let mut defs = AlleleDefinitions::new();
        defs.define(Allele::new('B', "Black", false))?
            .define(Allele::new('b', "Brown", false))?;
        assert_eq!(genotype_to_phenotype(&"Bb".parse()?, &defs)?.label(), "Brown");
        assert_eq!(genotype_to_phenotype(&"bB".parse()?, &defs)?.label(), "Black");
        assert_eq!(genotype_to_phenotype(&"BB".parse()?, &defs)?.label(), "Black");
        Ok(())
    }

    #[test]
    fn test_unknown_allele_is_reported() -> TestResult {
        let mut defs = AlleleDefinitions::new();
        defs.define(Allele::from_symbol('E', "Red eyes"))?;
        let result = genotype_to_phenotype(&"Ee".parse()?, &defs);
        assert!(matches!(result, Err(Error::UnknownAllele('e'))));
        Ok(())
    }

    #[test]
    fn test_monohybrid_phenotype_ratio() -> TestResult {
        let offspring = cross(&"Ee".parse()?, &"ee".parse()?)?;
        let ratios = phenotype_ratios(&offspring, &eye_and_wing()?)?;
        assert_eq!(ratios.len(), 2);
        assert_eq!(ratios["Red eyes"], 0.5);
        assert_eq!(ratios["White eyes"], 0.5);
        Ok(())
    }

    #[test]
    fn test_dihybrid_counts_are_9_3_3_1() -> TestResult {
        let parent: Genotype = "Ee Ww".parse()?;
        let offspring = cross(&parent, &parent)?;
        assert_eq!(offspring.len(), 16);
        let counts = phenotype_counts(&offspring, &eye_and_wing()?)?;
        assert_eq!(counts["Red eyes, Normal wings"], 9);
        assert_eq!(counts["Red eyes, Vestigial wings"], 3);
        assert_eq!(counts["White eyes, Normal wings"], 3);
        assert_eq!(counts["White eyes, Vestigial wings"], 1);
        Ok(())
    }

    #[test]
    fn test_genotype_ratios_merge_pair_order() -> TestResult {
        let parent: Genotype = "Ee".parse()?;
        let ratios = genotype_ratios(&cross(&parent, &parent)?)?;
        assert_eq!(ratios.keys().collect::<Vec<_>>(), vec!["EE", "Ee", "ee"]);
        assert_eq!(ratios["Ee"].fraction(), "2/4");
        assert_eq!(ratios["ee"].ratio(), 0.25);
        Ok(())
    }

    #[test]
    fn test_empty_offspring_is_rejected() -> TestResult {
        assert!(phenotype_ratios(&[], &eye_and_wing()?).is_err());
        assert!(genotype_ratios(&[]).is_err());
        Ok(())
    }

    #[test]
    fn test_expected_counts_scale_without_rounding() -> TestResult {
        let mut ratios = Ratios::new();
        ratios.insert("Red eyes".into(), 0.75);
        ratios.insert("White eyes".into(), 0.25);
        let expected = expected_counts(&ratios, 101)?;
        assert_eq!(expected["Red eyes"], 75.75);
        assert_eq!(expected["White eyes"], 25.25);
        assert!(expected_counts(&ratios, 0).is_err());
        Ok(())
    }
}
