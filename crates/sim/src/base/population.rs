//! Population matrix: cell counts per (sub-population, species).

use crate::base::array::Array2D;
use crate::errors::{Result, SimError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cell count type. Signed so that branching updates can be written as
/// plain linear combinations of reaction counts.
pub type Count = i64;

/// One snapshot of the simulation state.
///
/// Rows are independent sub-populations, columns are mutation-count classes
/// ordered from wild type to fully mutated. The shape never changes after
/// construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<Count>>", into = "Vec<Vec<Count>>")]
pub struct PopulationMatrix {
    counts: Array2D<Count>,
}

impl PopulationMatrix {
    /// Create an all-zero matrix.
    pub fn zeros(number_sub_pops: usize, number_species: usize) -> Self {
        Self {
            counts: Array2D::new([number_sub_pops, number_species]),
        }
    }

    /// Create a matrix from rows, one row per sub-population.
    ///
    /// All rows must have the same length and every count must be
    /// non-negative.
    pub fn from_rows(rows: Vec<Vec<Count>>) -> Result<Self> {
        let number_sub_pops = rows.len();
        let number_species = rows.first().map_or(0, Vec::len);
        if number_sub_pops == 0 || number_species == 0 {
            return Err(SimError::mismatch(
                "population matrix needs at least one sub-population and one species",
            ));
        }
        let mut matrix = Self::zeros(number_sub_pops, number_species);
        for (pop, row) in rows.iter().enumerate() {
            if row.len() != number_species {
                return Err(SimError::mismatch(format!(
                    "sub-population {pop} has {} species, expected {number_species}",
                    row.len()
                )));
            }
            for (spe, &count) in row.iter().enumerate() {
                if count < 0 {
                    return Err(SimError::parameter(format!(
                        "negative count {count} at sub-population {pop}, species {spe}"
                    )));
                }
                matrix.set(pop, spe, count)?;
            }
        }
        Ok(matrix)
    }

    /// Single sub-population matrix from one row.
    pub fn from_row(row: Vec<Count>) -> Result<Self> {
        Self::from_rows(vec![row])
    }

    pub fn number_sub_pops(&self) -> usize {
        self.counts.dim(0)
    }

    pub fn number_species(&self) -> usize {
        self.counts.dim(1)
    }

    /// Get the count of `spe` cells in sub-population `pop`.
    pub fn get(&self, pop: usize, spe: usize) -> Result<Count> {
        self.counts.at([pop, spe]).copied()
    }

    /// Overwrite the count of `spe` cells in sub-population `pop`.
    pub fn set(&mut self, pop: usize, spe: usize, value: Count) -> Result<()> {
        self.counts.set([pop, spe], value)
    }

    /// Add `delta` (possibly negative) to one entry.
    pub fn add(&mut self, pop: usize, spe: usize, delta: Count) -> Result<()> {
        let entry = self.counts.at_mut([pop, spe])?;
        *entry += delta;
        Ok(())
    }

    /// Total cell count of sub-population `pop`.
    pub fn sub_pop_total(&self, pop: usize) -> Result<Count> {
        (0..self.number_species()).map(|spe| self.get(pop, spe)).sum()
    }

    /// Total count of species `spe` across all sub-populations.
    pub fn species_total(&self, spe: usize) -> Result<Count> {
        (0..self.number_sub_pops()).map(|pop| self.get(pop, spe)).sum()
    }

    /// Total number of cells.
    pub fn total(&self) -> Count {
        self.counts.sum()
    }

    /// Copy of row `pop`.
    pub fn row(&self, pop: usize) -> Result<Vec<Count>> {
        (0..self.number_species()).map(|spe| self.get(pop, spe)).collect()
    }

    /// All rows.
    pub fn rows(&self) -> Vec<Vec<Count>> {
        (0..self.number_sub_pops())
            .map(|pop| {
                (0..self.number_species())
                    .map(|spe| self.counts.as_slice()[pop + self.number_sub_pops() * spe])
                    .collect()
            })
            .collect()
    }

    /// Copy with `extra` zero species appended to every row.
    pub fn padded(&self, extra: usize) -> Result<Self> {
        let mut padded = Self::zeros(self.number_sub_pops(), self.number_species() + extra);
        for (pop, row) in self.rows().into_iter().enumerate() {
            for (spe, count) in row.into_iter().enumerate() {
                padded.set(pop, spe, count)?;
            }
        }
        Ok(padded)
    }

    /// Underlying dense array.
    pub fn as_array(&self) -> &Array2D<Count> {
        &self.counts
    }
}

impl TryFrom<Vec<Vec<Count>>> for PopulationMatrix {
    type Error = SimError;

    fn try_from(rows: Vec<Vec<Count>>) -> Result<Self> {
        Self::from_rows(rows)
    }
}

impl From<PopulationMatrix> for Vec<Vec<Count>> {
    fn from(matrix: PopulationMatrix) -> Self {
        matrix.rows()
    }
}

impl fmt::Display for PopulationMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            let line: Vec<String> = row.iter().map(|c| c.to_string()).collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_shape_and_totals() {
        let m = PopulationMatrix::from_rows(vec![vec![5, 1, 0], vec![2, 0, 3]]).unwrap();
        assert_eq!(m.number_sub_pops(), 2);
        assert_eq!(m.number_species(), 3);
        assert_eq!(m.get(1, 2).unwrap(), 3);
        assert_eq!(m.sub_pop_total(0).unwrap(), 6);
        assert_eq!(m.species_total(0).unwrap(), 7);
        assert_eq!(m.total(), 11);
        assert_eq!(m.rows(), vec![vec![5, 1, 0], vec![2, 0, 3]]);
    }

    #[test]
    fn test_from_rows_rejects_ragged_and_negative() {
        assert!(PopulationMatrix::from_rows(vec![vec![1, 2], vec![1]]).is_err());
        assert!(PopulationMatrix::from_rows(vec![vec![1, -2]]).is_err());
        assert!(PopulationMatrix::from_rows(vec![]).is_err());
    }

    #[test]
    fn test_padded_appends_zero_species() {
        let m = PopulationMatrix::from_row(vec![10, 2]).unwrap();
        let p = m.padded(1).unwrap();
        assert_eq!(p.rows(), vec![vec![10, 2, 0]]);
    }

    #[test]
    fn test_serde_as_nested_rows() {
        let m = PopulationMatrix::from_rows(vec![vec![1, 2], vec![3, 4]]).unwrap();
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, "[[1,2],[3,4]]");
        let back: PopulationMatrix = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
        assert!(serde_json::from_str::<PopulationMatrix>("[[1],[2,3]]").is_err());
    }
}
