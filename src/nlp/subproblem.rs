//! One player's best-response problem, wired for an engine.

use crate::error::{Error, Result};
use crate::nlp::objective::PayoffObjective;
use crate::nlp::quasi_newton::QuasiNewton;
use crate::nlp::sdk::{
    JACOBIAN_APPROXIMATION, LINEAR_SOLVER, MAX_ITER, OBJ_SCALING_FACTOR, OptionValue, PRINT_LEVEL,
    Problem, Report, SUPPRESS_BANNER, Solver, TOL, VariableSet,
};
use crate::nlp::varset::VarSet;

/// Engine verbosity for subproblems: failures only.
pub const QUIET_PRINT_LEVEL: i64 = 1;

/// Apply the subproblem settings to any engine.
///
/// Direct linear solves, exact gradients only, failures-only output, no banner,
/// maximization of the payoff, and the caller's iteration cap and tolerance.
pub fn configure_solver<S: Solver + ?Sized>(solver: &mut S, max_iter: usize, tol: f64) -> Result<()> {
    solver.set_option(LINEAR_SOLVER, "direct".into())?;
    solver.set_option(JACOBIAN_APPROXIMATION, "exact".into())?;
    solver.set_option(PRINT_LEVEL, OptionValue::Int(QUIET_PRINT_LEVEL))?;
    solver.set_option(SUPPRESS_BANNER, "yes".into())?;
    // payoffs arrive unmodified; the engine minimizes factor · cost
    solver.set_option(OBJ_SCALING_FACTOR, OptionValue::Num(-1.0))?;
    solver.set_option(MAX_ITER, OptionValue::from(max_iter))?;
    solver.set_option(TOL, OptionValue::Num(tol))?;
    Ok(())
}

/// A best response and how the engine got there.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Solved {
    pub x: [f64; 2],
    pub report: Report,
}

/// One variable block, one payoff cost term, one configured engine.
pub struct Subproblem<'a, S: Solver = QuasiNewton> {
    problem: Problem<'a>,
    var_name: String,
    solver: S,
}

impl<'a> Subproblem<'a> {
    pub fn new(vars: VarSet, objective: PayoffObjective<'a>, max_iter: usize, tol: f64)
    -> Result<Self> {
        Self::with_solver(vars, objective, QuasiNewton::default(), max_iter, tol)
    }
}

impl<'a, S: Solver> Subproblem<'a, S> {
    /// Fails before any engine call if the block is not 2-dimensional or the
    /// objective is bound to a different block.
    pub fn with_solver(
        vars: VarSet,
        objective: PayoffObjective<'a>,
        mut solver: S,
        max_iter: usize,
        tol: f64,
    ) -> Result<Self> {
        if vars.size() != 2 {
            return Err(Error::Dimension { block: vars.name().to_owned(), expected: 2, got: vars.size() });
        }
        if objective.var_name() != vars.name() {
            return Err(Error::UnknownBlock(objective.var_name().to_owned()));
        }
        configure_solver(&mut solver, max_iter, tol)?;
        let var_name = vars.name().to_owned();
        let mut problem = Problem::new();
        problem.add_variable_set(Box::new(vars));
        problem.add_cost_term(Box::new(objective));
        Ok(Self { problem, var_name, solver })
    }

    /// Swap in another engine as-is; it keeps whatever options it already has.
    pub fn change_solver(&mut self, solver: S) {
        self.solver = solver;
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    /// Run the engine once. The engine's final iterate is returned whether or
    /// not it met its tolerance; the report says which.
    pub fn solve(&mut self) -> Result<Solved> {
        let report = self.solver.solve(&mut self.problem)?;
        let values = self.problem.opt_variables().component(&self.var_name)?.values();
        let x = <[f64; 2]>::try_from(values.as_slice()).map_err(|_| Error::Dimension {
            block: self.var_name.clone(),
            expected: 2,
            got: values.len(),
        })?;
        Ok(Solved { x, report })
    }
}
