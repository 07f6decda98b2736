use crate::mechanics::ZeroDenominator;

/// Knobs for the outer best-response loop and the per-player engine runs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolverConfig {
    /// Outer round cap.
    pub max_rounds: usize,
    /// Stop once the max relative change of a round is below this.
    pub outer_tol: f64,
    /// Engine iteration cap per subproblem.
    pub inner_max_iter: usize,
    /// Engine tolerance per subproblem.
    pub inner_tol: f64,
    pub zero_denominator: ZeroDenominator,
    /// Fail instead of accepting an inner solve that missed its tolerance.
    pub strict_inner: bool,
    /// Solve a round's subproblems on the rayon pool (feature `parallel`).
    pub parallel: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_rounds: 500,
            outer_tol: 1e-3,
            inner_max_iter: 500,
            inner_tol: 1e-3,
            zero_denominator: ZeroDenominator::default(),
            strict_inner: false,
            parallel: false,
        }
    }
}

impl SolverConfig {
    pub fn new(max_rounds: usize, outer_tol: f64, inner_max_iter: usize, inner_tol: f64) -> Self {
        Self { max_rounds, outer_tol, inner_max_iter, inner_tol, ..Self::default() }
    }

    pub fn with_zero_denominator(mut self, zero: ZeroDenominator) -> Self {
        self.zero_denominator = zero;
        self
    }

    pub fn with_strict_inner(mut self, strict: bool) -> Self {
        self.strict_inner = strict;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}
