// src/nlp/sdk.rs

//! # NLP SDK
//!
//! The contract between the equilibrium solver and a constrained nonlinear
//! optimization engine. Everything the solver hands to an engine goes through
//! the capability traits in this module, so engines are interchangeable.
//!
//! ## Pieces
//! - [`VariableSet`]: a named block of `k` variables with box bounds.
//!   Values change only through [`VariableSet::set_values`], which rejects a
//!   vector of the wrong length.
//! - [`CostTerm`]: a scalar cost over the problem's variables plus its exact
//!   gradient, written block by block into a [`SparseRow`].
//! - [`Problem`]: owns the blocks and cost terms, and flattens them into the
//!   `x / bounds / cost / gradient` view an engine iterates on.
//! - [`Solver`]: accepts key/value options and solves a problem in place.
//!
//! ## Sense
//! Engines **minimize** `obj_scaling_factor · Σ cost`. Cost terms report their
//! value as-is; a payoff is maximized by setting the factor to `-1`.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::mechanics::Bound;

// -----------------------------------------------------------------------------
// Option keys
// -----------------------------------------------------------------------------

pub const LINEAR_SOLVER: &str = "linear_solver";
pub const JACOBIAN_APPROXIMATION: &str = "jacobian_approximation";
pub const PRINT_LEVEL: &str = "print_level";
/// Suppress the engine banner ("yes" / "no").
pub const SUPPRESS_BANNER: &str = "sb";
pub const MAX_ITER: &str = "max_iter";
pub const TOL: &str = "tol";
pub const OBJ_SCALING_FACTOR: &str = "obj_scaling_factor";

#[derive(Clone, Debug, PartialEq)]
pub enum OptionValue {
    Str(String),
    Int(i64),
    Num(f64),
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::Str(s.to_owned())
    }
}
impl From<i64> for OptionValue {
    fn from(i: i64) -> Self {
        OptionValue::Int(i)
    }
}
impl From<usize> for OptionValue {
    fn from(i: usize) -> Self {
        OptionValue::Int(i64::try_from(i).unwrap_or(i64::MAX))
    }
}
impl From<f64> for OptionValue {
    fn from(x: f64) -> Self {
        OptionValue::Num(x)
    }
}

impl OptionValue {
    pub fn as_str(&self, key: &str) -> Result<&str> {
        match self {
            OptionValue::Str(s) => Ok(s),
            other => Err(option_err(key, format!("expected a string, got {other:?}"))),
        }
    }
    pub fn as_int(&self, key: &str) -> Result<i64> {
        match self {
            OptionValue::Int(i) => Ok(*i),
            other => Err(option_err(key, format!("expected an integer, got {other:?}"))),
        }
    }
    /// Integers are accepted where a number is expected.
    pub fn as_num(&self, key: &str) -> Result<f64> {
        match self {
            OptionValue::Num(x) => Ok(*x),
            OptionValue::Int(i) => Ok(*i as f64),
            other => Err(option_err(key, format!("expected a number, got {other:?}"))),
        }
    }
}

pub(crate) fn option_err(key: &str, reason: impl Into<String>) -> Error {
    Error::Option { key: key.to_owned(), reason: reason.into() }
}

// -----------------------------------------------------------------------------
// Gradient buffer
// -----------------------------------------------------------------------------

/// One row of a sparse Jacobian, restricted to a single variable block.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SparseRow {
    cols: usize,
    entries: BTreeMap<usize, f64>,
}

impl SparseRow {
    pub fn new(cols: usize) -> Self {
        Self { cols, entries: BTreeMap::new() }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Mutable slot for column `col`, created as 0.0 if absent.
    pub fn coeff_mut(&mut self, col: usize) -> Result<&mut f64> {
        if col >= self.cols {
            return Err(Error::Dimension {
                block: "jacobian row".to_owned(),
                expected: self.cols,
                got: col + 1,
            });
        }
        Ok(self.entries.entry(col).or_insert(0.0))
    }

    pub fn get(&self, col: usize) -> f64 {
        self.entries.get(&col).copied().unwrap_or(0.0)
    }

    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn to_dense(&self) -> Vec<f64> {
        (0..self.cols).map(|c| self.get(c)).collect()
    }
}

// -----------------------------------------------------------------------------
// Capabilities
// -----------------------------------------------------------------------------

/// A named block of decision variables with box bounds.
pub trait VariableSet {
    fn name(&self) -> &str;
    fn size(&self) -> usize;
    /// Replace all values; fails without mutating on a length mismatch.
    fn set_values(&mut self, values: &[f64]) -> Result<()>;
    fn values(&self) -> Vec<f64>;
    fn bounds(&self) -> Vec<Bound>;
}

/// A scalar cost with an exact gradient.
pub trait CostTerm {
    fn name(&self) -> &str;
    fn cost(&self, vars: &Composite) -> Result<f64>;
    /// Write partial derivatives w.r.t. block `block` only.
    fn fill_gradient_block(&self, vars: &Composite, block: &str, row: &mut SparseRow)
    -> Result<()>;
}

/// Ordered variable blocks of a problem, addressable by name.
#[derive(Default)]
pub struct Composite {
    blocks: Vec<Box<dyn VariableSet>>,
}

impl Composite {
    pub fn from_blocks(blocks: Vec<Box<dyn VariableSet>>) -> Self {
        Self { blocks }
    }

    pub fn component(&self, name: &str) -> Result<&dyn VariableSet> {
        self.blocks
            .iter()
            .find(|b| b.name() == name)
            .map(|b| b.as_ref())
            .ok_or_else(|| Error::UnknownBlock(name.to_owned()))
    }

    pub fn blocks(&self) -> impl Iterator<Item = &dyn VariableSet> {
        self.blocks.iter().map(|b| b.as_ref())
    }

    pub fn size(&self) -> usize {
        self.blocks.iter().map(|b| b.size()).sum()
    }

    pub fn values(&self) -> Vec<f64> {
        self.blocks.iter().flat_map(|b| b.values()).collect()
    }

    pub fn bounds(&self) -> Vec<Bound> {
        self.blocks.iter().flat_map(|b| b.bounds()).collect()
    }

    /// Split a flat vector across blocks in order.
    pub fn set_values(&mut self, x: &[f64]) -> Result<()> {
        if x.len() != self.size() {
            return Err(Error::Dimension {
                block: "composite".to_owned(),
                expected: self.size(),
                got: x.len(),
            });
        }
        let mut offset = 0;
        for b in self.blocks.iter_mut() {
            let k = b.size();
            b.set_values(&x[offset..offset + k])?;
            offset += k;
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Problem
// -----------------------------------------------------------------------------

/// Variable blocks plus cost terms. Cost terms may borrow for `'a`.
#[derive(Default)]
pub struct Problem<'a> {
    vars: Composite,
    costs: Vec<Box<dyn CostTerm + 'a>>,
}

impl<'a> Problem<'a> {
    pub fn new() -> Self {
        Self { vars: Composite::default(), costs: Vec::new() }
    }

    pub fn add_variable_set(&mut self, set: Box<dyn VariableSet>) {
        self.vars.blocks.push(set);
    }

    pub fn add_cost_term(&mut self, term: Box<dyn CostTerm + 'a>) {
        self.costs.push(term);
    }

    pub fn n_vars(&self) -> usize {
        self.vars.size()
    }

    pub fn x(&self) -> Vec<f64> {
        self.vars.values()
    }

    pub fn set_x(&mut self, x: &[f64]) -> Result<()> {
        self.vars.set_values(x)
    }

    pub fn bounds(&self) -> Vec<Bound> {
        self.vars.bounds()
    }

    /// Sum of all cost terms at the current variables.
    pub fn cost(&self) -> Result<f64> {
        self.costs.iter().map(|c| c.cost(&self.vars)).sum()
    }

    /// Dense gradient of the total cost, assembled block by block.
    pub fn gradient(&self) -> Result<Vec<f64>> {
        let mut g = Vec::with_capacity(self.n_vars());
        for block in self.vars.blocks() {
            let mut acc = vec![0.0; block.size()];
            for term in &self.costs {
                let mut row = SparseRow::new(block.size());
                term.fill_gradient_block(&self.vars, block.name(), &mut row)?;
                for (a, v) in acc.iter_mut().zip(row.to_dense()) {
                    *a += v;
                }
            }
            g.extend(acc);
        }
        Ok(g)
    }

    /// Variables after solving.
    pub fn opt_variables(&self) -> &Composite {
        &self.vars
    }
}

// -----------------------------------------------------------------------------
// Solver
// -----------------------------------------------------------------------------

/// Why the engine stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    /// Projected gradient within tolerance.
    Converged,
    /// Iteration cap hit first.
    MaxIter,
    /// Line search could not decrease the cost.
    Stalled,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Report {
    pub status: Status,
    pub iters: usize,
    /// Unscaled cost at the final iterate.
    pub cost: f64,
}

impl Report {
    pub fn converged(&self) -> bool {
        self.status == Status::Converged
    }
}

/// A local box-constrained optimizer consuming exact gradients.
pub trait Solver {
    fn set_option(&mut self, key: &str, value: OptionValue) -> Result<()>;
    /// Leaves the problem's variables at the final iterate.
    fn solve(&self, problem: &mut Problem<'_>) -> Result<Report>;
}
