use crate::error::{Error, Result};
use crate::mechanics::{Bound, BoundPolicy};
use crate::nlp::sdk::VariableSet;

/// A named vector of `k` values with one bound per value.
///
/// `values.len() == bounds.len()` holds for the whole lifetime of the set.
#[derive(Clone, Debug, PartialEq)]
pub struct VarSet {
    name: String,
    values: Vec<f64>,
    bounds: Vec<Bound>,
}

impl VarSet {
    /// `k` values at 1.0 under the default bound policy.
    pub fn new(name: impl Into<String>, k: usize) -> Self {
        Self::with_values(name, vec![1.0; k])
    }

    /// Seeded values under the default bound policy.
    pub fn with_values(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self::with_policy(name, values, BoundPolicy::default())
    }

    pub fn with_policy(name: impl Into<String>, values: Vec<f64>, policy: BoundPolicy) -> Self {
        let bounds = policy.generate(values.len());
        Self { name: name.into(), values, bounds }
    }

    /// Explicit bounds; their count must match the values.
    pub fn with_bounds(
        name: impl Into<String>,
        values: Vec<f64>,
        bounds: Vec<Bound>,
    ) -> Result<Self> {
        let name = name.into();
        if bounds.len() != values.len() {
            return Err(Error::Dimension { block: name, expected: values.len(), got: bounds.len() });
        }
        Ok(Self { name, values, bounds })
    }
}

impl VariableSet for VarSet {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> usize {
        self.values.len()
    }

    fn set_values(&mut self, values: &[f64]) -> Result<()> {
        if values.len() != self.values.len() {
            return Err(Error::Dimension {
                block: self.name.clone(),
                expected: self.values.len(),
                got: values.len(),
            });
        }
        self.values.copy_from_slice(values);
        Ok(())
    }

    fn values(&self) -> Vec<f64> {
        self.values.clone()
    }

    fn bounds(&self) -> Vec<Bound> {
        self.bounds.clone()
    }
}
