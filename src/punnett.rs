use crate::cross::cross;
use crate::prelude::*;
use ndarray;
use std::fmt;

/// A cross laid out as a grid.
///
/// Row `i` belongs to the first parent's gamete `i`, column `j` to the second
/// parent's gamete `j`, and the cell holds their offspring. Reading the cells
/// row by row gives exactly the list `cross` returns.
pub struct PunnettSquare {
    rows: Vec<Gamete>,
    columns: Vec<Gamete>,
    cells: ndarray::Array2<Genotype>,
}

impl PunnettSquare {
    pub fn new(parent1: &Genotype, parent2: &Genotype) -> Result<Self> {
        let offspring = cross(parent1, parent2)?;
        let rows = parent1.gametes();
        let columns = parent2.gametes();
        let cells = ndarray::Array::from_shape_vec((rows.len(), columns.len()), offspring)?;
        Ok(Self {
            rows,
            columns,
            cells,
        })
    }

    /// The first parent's gametes, one per row.
    pub fn rows(&self) -> &[Gamete] {
        &self.rows
    }

    /// The second parent's gametes, one per column.
    pub fn columns(&self) -> &[Gamete] {
        &self.columns
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&Genotype> {
        self.cells.get((row, column))
    }

    pub fn dim(&self) -> (usize, usize) {
        self.cells.dim()
    }

    /// Offspring in row-major order.
    pub fn offspring(&self) -> impl Iterator<Item = &Genotype> {
        self.cells.iter()
    }
}

impl fmt::Display for PunnettSquare {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let width = self
            .cells
            .iter()
            .map(|g| g.to_string().len())
            .chain(self.columns.iter().map(String::len))
            .chain(self.rows.iter().map(String::len))
            .max()
            .unwrap_or(0);

        write!(f, "{:width$}", "", width = width)?;
        for gamete in &self.columns {
            write!(f, " | {:width$}", gamete, width = width)?;
        }
        writeln!(f)?;
        for (gamete, row) in self.rows.iter().zip(self.cells.genrows()) {
            write!(f, "{:width$}", gamete, width = width)?;
            for genotype in row.iter() {
                write!(f, " | {:width$}", genotype.to_string(), width = width)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
