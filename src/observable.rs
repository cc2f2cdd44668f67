//! Reading counted offspring and allele tables from delimited text.
use crate::prelude::*;
use csv;
use std::io::Read;

/// Where the fields of a record live.
#[derive(Clone, Copy)]
struct Columns {
    label: usize,
    value: usize,
    flag: Option<usize>,
}

/// A row of an observation table: phenotype label and how many were counted.
pub type CountRecord = (String, u64);

/// Streams `CountRecord`s out of a csv reader.
///
/// Implements Iterator so rows can be inspected one by one; most callers
/// want `CsvBuilder::observed_counts` instead, which folds them into a table.
pub struct CountRecords {
    records: std::iter::Enumerate<csv::StringRecordsIntoIter<Box<dyn Read>>>,
    columns: Columns,
}

impl Iterator for CountRecords {
    type Item = Result<CountRecord>;

    fn next(&mut self) -> Option<Result<CountRecord>> {
        let (idx, row) = self.records.next()?;
        Some(row.map_err(Error::from).and_then(|row| {
            let label = field(&row, self.columns.label, idx)?;
            let raw = field(&row, self.columns.value, idx)?;
            let count = raw.parse::<u64>().map_err(|_| {
                Error::Validation(format!("row {}: '{}' is not a count", idx + 1, raw))
            })?;
            Ok((label.to_owned(), count))
        }))
    }
}

fn field<'r>(row: &'r csv::StringRecord, column: usize, idx: usize) -> Result<&'r str> {
    row.get(column)
        .map(str::trim)
        .ok_or_else(|| Error::Validation(format!("row {} has no column {}", idx + 1, column + 1)))
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" | "dominant" => Some(true),
        "false" | "no" | "n" | "0" | "recessive" => Some(false),
        _ => None,
    }
}

/// Configures how observation and allele tables are read.
///
/// By default the first line is a header and the columns are found by name:
/// `phenotype,count` for observations and `symbol,description,dominant` for
/// allele definitions (the `dominant` column is optional). Without headers
/// the columns are taken in that order.
pub struct CsvBuilder {
    headers: bool,
    delimiter: u8,
    phenotype_field: String,
    count_field: String,
    symbol_field: String,
    description_field: String,
    dominant_field: String,
}

impl Default for CsvBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvBuilder {
    /// Construct a new Csv builder
    pub fn new() -> Self {
        Self {
            headers: true,
            delimiter: b',',
            phenotype_field: "phenotype".to_owned(),
            count_field: "count".to_owned(),
            symbol_field: "symbol".to_owned(),
            description_field: "description".to_owned(),
            dominant_field: "dominant".to_owned(),
        }
    }

    pub fn headers(&mut self, headers: bool) -> &mut Self {
        self.headers = headers;
        self
    }

    pub fn delimiter(&mut self, delimiter: u8) -> &mut Self {
        self.delimiter = delimiter;
        self
    }

    pub fn phenotype_field(&mut self, name: &str) -> &mut Self {
        self.phenotype_field = name.to_owned();
        self
    }

    pub fn count_field(&mut self, name: &str) -> &mut Self {
        self.count_field = name.to_owned();
        self
    }

    pub fn symbol_field(&mut self, name: &str) -> &mut Self {
        self.symbol_field = name.to_owned();
        self
    }

    pub fn description_field(&mut self, name: &str) -> &mut Self {
        self.description_field = name.to_owned();
        self
    }

    pub fn dominant_field(&mut self, name: &str) -> &mut Self {
        self.dominant_field = name.to_owned();
        self
    }

    fn reader(&self, reader: Box<dyn Read>) -> csv::Reader<Box<dyn Read>> {
        csv::ReaderBuilder::new()
            .has_headers(self.headers)
            .delimiter(self.delimiter)
            .trim(csv::Trim::All)
            .from_reader(reader)
    }

    fn columns(
        &self,
        rdr: &mut csv::Reader<Box<dyn Read>>,
        label: &str,
        value: &str,
        flag: Option<&str>,
    ) -> Result<Columns> {
        if !self.headers {
            return Ok(Columns {
                label: 0,
                value: 1,
                flag: flag.map(|_| 2),
            });
        }
        let headers = rdr.headers()?.clone();
        let position = |name: &str| headers.iter().position(|h| h == name);
        let required = |name: &str| {
            position(name).ok_or_else(|| Error::Validation(format!("missing column '{}'", name)))
        };
        Ok(Columns {
            label: required(label)?,
            value: required(value)?,
            flag: flag.and_then(|name| position(name)),
        })
    }

    pub fn count_records(&self, reader: Box<dyn Read>) -> Result<CountRecords> {
        let mut rdr = self.reader(reader);
        let columns = self.columns(&mut rdr, &self.phenotype_field, &self.count_field, None)?;
        Ok(CountRecords {
            records: rdr.into_records().enumerate(),
            columns,
        })
    }

    /// Reads a phenotype/count table. Repeated phenotypes are summed.
    pub fn observed_counts(&self, reader: Box<dyn Read>) -> Result<ObservedCounts> {
        let mut counts = ObservedCounts::new();
        for (idx, record) in self.count_records(reader)?.enumerate() {
            let (label, count) = record?;
            let total = counts.entry(label).or_insert(0);
            *total = total.checked_add(count).ok_or_else(|| {
                Error::Validation(format!("row {}: count overflows", idx + 1))
            })?;
        }
        Ok(counts)
    }

    /// Reads a symbol/description[/dominant] table.
    ///
    /// Rows with an empty or missing dominance cell take their dominance from
    /// the symbol's case.
    pub fn allele_definitions(&self, reader: Box<dyn Read>) -> Result<AlleleDefinitions> {
        let mut rdr = self.reader(reader);
        let columns = self.columns(
            &mut rdr,
            &self.symbol_field,
            &self.description_field,
            Some(self.dominant_field.as_str()),
        )?;

        let mut definitions = AlleleDefinitions::new();
        for (idx, row) in rdr.into_records().enumerate() {
            let row = row?;
            let raw_symbol = field(&row, columns.label, idx)?;
            let mut chars = raw_symbol.chars();
            let symbol = match (chars.next(), chars.next()) {
                (Some(c), None) => c,
                _ => {
                    return Err(Error::Format(format!(
                        "row {}: allele symbol must be a single letter, got '{}'",
                        idx + 1,
                        raw_symbol
                    )))
                }
            };
            let description = field(&row, columns.value, idx)?;
            let flag = columns
                .flag
                .and_then(|c| row.get(c))
                .map(str::trim)
                .filter(|raw| !raw.is_empty());
            let allele = match flag {
                None => Allele::from_symbol(symbol, description),
                Some(raw) => match parse_flag(raw) {
                    Some(is_dominant) => Allele::new(symbol, description, is_dominant),
                    None => {
                        return Err(Error::Validation(format!(
                            "row {}: '{}' is not a dominance flag",
                            idx + 1,
                            raw
                        )))
                    }
                },
            };
            definitions.define(allele)?;
        }
        Ok(definitions)
    }
}
