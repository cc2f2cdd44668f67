#![crate_name = "mendel"]
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

pub mod prelude;

pub mod chi_square;
pub mod config;
pub mod cross;
pub mod distribution;
pub mod error;
pub mod experiment;
pub mod observable;
pub mod punnett;

pub use error::{Error, Result};

pub type Symbol = char;
pub type Gamete = String;
pub type Ratios = BTreeMap<String, f64>;
pub type ExpectedCounts = BTreeMap<String, f64>;
pub type ObservedCounts = BTreeMap<String, u64>;

/// A single variant of a trait.
///
/// The symbol's letter identifies the trait, the case conventionally marks
/// dominance (`E` dominant, `e` recessive). The dominance flag is what the
/// phenotype resolution actually reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allele {
    symbol: Symbol,
    description: String,
    is_dominant: bool,
}

impl Allele {
    pub fn new(symbol: Symbol, description: &str, is_dominant: bool) -> Self {
        Self {
            symbol,
            description: description.into(),
            is_dominant,
        }
    }

    /// Constructs an `Allele` whose dominance follows the symbol's case.
    pub fn from_symbol(symbol: Symbol, description: &str) -> Self {
        Self::new(symbol, description, symbol.is_uppercase())
    }

    pub fn symbol(&self) -> Symbol {
        self.symbol
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_dominant(&self) -> bool {
        self.is_dominant
    }
}

/// Lookup table from allele symbol to its definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlleleDefinitions {
    alleles: BTreeMap<Symbol, Allele>,
}

impl AlleleDefinitions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the definition for the allele's symbol.
    pub fn define(&mut self, allele: Allele) -> Result<&mut Self> {
        if !allele.symbol.is_ascii_alphabetic() {
            return Err(Error::Format(format!(
                "allele symbol '{}' is not a letter",
                allele.symbol
            )));
        }
        self.alleles.insert(allele.symbol, allele);
        Ok(self)
    }

    /// Defines both case variants of a trait in one go.
    ///
    /// `letter` may be given in either case; the uppercase variant gets
    /// `dominant` and is flagged dominant.
    pub fn define_trait(&mut self, letter: Symbol, dominant: &str, recessive: &str) -> Result<&mut Self> {
        self.define(Allele::new(letter.to_ascii_uppercase(), dominant, true))?;
        self.define(Allele::new(letter.to_ascii_lowercase(), recessive, false))
    }

    pub fn get(&self, symbol: Symbol) -> Option<&Allele> {
        self.alleles.get(&symbol)
    }

    /// Like `get` but a missing symbol is an error.
    pub fn lookup(&self, symbol: Symbol) -> Result<&Allele> {
        self.get(symbol).ok_or(Error::UnknownAllele(symbol))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Allele> {
        self.alleles.values()
    }

    pub fn len(&self) -> usize {
        self.alleles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alleles.is_empty()
    }
}

/// The two alleles an organism carries for one trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraitPair {
    first: Symbol,
    second: Symbol,
}

impl TraitPair {
    /// Both symbols must be letters and case variants of the same letter.
    pub fn new(first: Symbol, second: Symbol) -> Result<Self> {
        if !first.is_ascii_alphabetic() || !second.is_ascii_alphabetic() {
            return Err(Error::Format(format!(
                "'{}{}' contains a non-letter allele",
                first, second
            )));
        }
        if first.to_ascii_lowercase() != second.to_ascii_lowercase() {
            return Err(Error::Format(format!(
                "'{}{}' mixes alleles of different traits",
                first, second
            )));
        }
        Ok(Self { first, second })
    }

    pub fn first(&self) -> Symbol {
        self.first
    }

    pub fn second(&self) -> Symbol {
        self.second
    }

    pub fn alleles(&self) -> [Symbol; 2] {
        [self.first, self.second]
    }

    /// The lowercase letter identifying the trait.
    pub fn base(&self) -> Symbol {
        self.first.to_ascii_lowercase()
    }

    pub fn is_homozygous(&self) -> bool {
        self.first == self.second
    }

    pub fn is_heterozygous(&self) -> bool {
        !self.is_homozygous()
    }

    /// The same pair with the uppercase allele written first.
    pub fn normalized(&self) -> Self {
        if self.first.is_lowercase() && self.second.is_uppercase() {
            Self {
                first: self.second,
                second: self.first,
            }
        } else {
            *self
        }
    }
}

impl fmt::Display for TraitPair {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.first, self.second)
    }
}

/// An ordered list of trait pairs, e.g. `"Ee Ww"`.
///
/// A `Genotype` can only be built through parsing or `from_pairs`, so every
/// value in circulation has at least one trait and only well-formed pairs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Genotype {
    pairs: Vec<TraitPair>,
}

impl Genotype {
    pub fn from_pairs(pairs: Vec<TraitPair>) -> Result<Self> {
        if pairs.is_empty() {
            return Err(Error::Format("genotype has no traits".into()));
        }
        Ok(Self { pairs })
    }

    pub fn pairs(&self) -> &[TraitPair] {
        &self.pairs
    }

    pub fn trait_count(&self) -> usize {
        self.pairs.len()
    }

    /// Every pair rewritten dominant-first, so `eE` and `Ee` compare equal.
    pub fn normalized(&self) -> Self {
        Self {
            pairs: self.pairs.iter().map(TraitPair::normalized).collect(),
        }
    }
}

impl FromStr for Genotype {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let pairs = s
            .split_whitespace()
            .map(|token| {
                let symbols: Vec<char> = token.chars().collect();
                if symbols.len() != 2 {
                    return Err(Error::Format(format!(
                        "each trait needs exactly 2 alleles, got '{}'",
                        token
                    )));
                }
                TraitPair::new(symbols[0], symbols[1])
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_pairs(pairs)
    }
}

impl TryFrom<String> for Genotype {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Genotype> for String {
    fn from(genotype: Genotype) -> String {
        genotype.to_string()
    }
}

impl fmt::Display for Genotype {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, pair) in self.pairs.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", pair)?;
        }
        Ok(())
    }
}

/// Observable trait descriptions, one per trait, in trait order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Phenotype(Vec<String>);

impl Phenotype {
    pub fn new(traits: Vec<String>) -> Self {
        Self(traits)
    }

    pub fn traits(&self) -> &[String] {
        &self.0
    }

    /// Composite label used as the key in ratio and count tables.
    pub fn label(&self) -> String {
        self.0.join(", ")
    }
}

impl fmt::Display for Phenotype {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.label())
    }
}
