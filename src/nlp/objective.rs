use crate::error::{Error, Result};
use crate::games::PayoffEvaluator;
use crate::nlp::sdk::{Composite, CostTerm, SparseRow};

/// Cost term over one 2-dimensional block, backed by a borrowed payoff evaluator.
///
/// The payoff is reported unmodified. Nothing is cached: every call reads the
/// block's current values.
pub struct PayoffObjective<'a> {
    name: String,
    var_name: String,
    payoff: &'a dyn PayoffEvaluator,
}

impl<'a> PayoffObjective<'a> {
    pub fn new(
        name: impl Into<String>,
        var_name: impl Into<String>,
        payoff: &'a dyn PayoffEvaluator,
    ) -> Self {
        Self { name: name.into(), var_name: var_name.into(), payoff }
    }

    pub fn var_name(&self) -> &str {
        &self.var_name
    }

    /// [`CostTerm::fill_gradient_block`] for the bound block.
    pub fn fill_own_gradient_block(&self, vars: &Composite, row: &mut SparseRow) -> Result<()> {
        self.fill_gradient_block(vars, &self.var_name, row)
    }

    fn point(&self, vars: &Composite) -> Result<[f64; 2]> {
        let values = vars.component(&self.var_name)?.values();
        <[f64; 2]>::try_from(values.as_slice()).map_err(|_| Error::Dimension {
            block: self.var_name.clone(),
            expected: 2,
            got: values.len(),
        })
    }
}

impl CostTerm for PayoffObjective<'_> {
    fn name(&self) -> &str {
        &self.name
    }

    fn cost(&self, vars: &Composite) -> Result<f64> {
        let x = self.point(vars)?;
        Ok(self.payoff.value(&x))
    }

    fn fill_gradient_block(&self, vars: &Composite, block: &str, row: &mut SparseRow)
    -> Result<()> {
        if block != self.var_name {
            return Ok(());
        }
        let x = self.point(vars)?;
        let [g0, g1] = self.payoff.gradient(&x);
        *row.coeff_mut(0)? = g0;
        *row.coeff_mut(1)? = g1;
        Ok(())
    }
}
