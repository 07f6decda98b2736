//! Joint strategy: one 2-vector per player.

use crate::error::{Error, Result};

/// Strategy rows of all players, indexed by player.
///
/// The row count is fixed at construction; rows are replaced, never appended.
#[derive(Clone, Debug, PartialEq)]
pub struct JointStrategy {
    rows: Vec<[f64; 2]>,
}

impl JointStrategy {
    /// 1.0 in every coordinate.
    pub fn ones(n_players: usize) -> Self {
        Self::filled(n_players, 1.0)
    }

    pub fn filled(n_players: usize, value: f64) -> Self {
        Self { rows: vec![[value; 2]; n_players] }
    }

    pub fn from_rows(rows: Vec<[f64; 2]>) -> Self {
        Self { rows }
    }

    /// Row-major `[x00, x01, x10, x11, ...]`.
    pub fn from_flat(values: &[f64]) -> Result<Self> {
        if values.len() % 2 != 0 {
            return Err(Error::FlatLength(values.len()));
        }
        Ok(Self {
            rows: values.chunks_exact(2).map(|c| [c[0], c[1]]).collect(),
        })
    }

    pub fn n_players(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, player: usize) -> &[f64; 2] {
        &self.rows[player]
    }

    pub fn rows(&self) -> &[[f64; 2]] {
        &self.rows
    }

    /// Coordinate `j` of every player.
    pub fn column(&self, j: usize) -> Vec<f64> {
        self.rows.iter().map(|r| r[j]).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &[f64; 2]> {
        self.rows.iter()
    }

    pub fn into_rows(self) -> Vec<[f64; 2]> {
        self.rows
    }
}

impl TryFrom<Vec<Vec<f64>>> for JointStrategy {
    type Error = Error;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self> {
        let n = rows.len();
        rows.into_iter()
            .map(|r| match r.as_slice() {
                &[a, b] => Ok([a, b]),
                _ => Err(Error::Shape { rows: n, cols: r.len() }),
            })
            .collect::<Result<Vec<_>>>()
            .map(Self::from_rows)
    }
}

impl std::ops::Index<usize> for JointStrategy {
    type Output = [f64; 2];
    fn index(&self, player: usize) -> &[f64; 2] {
        &self.rows[player]
    }
}
