//! Built-in engine: projected quasi-Newton for box-bounded problems.
//!
//! Each iteration builds a BFGS model of the (scaled) cost on the variables not
//! pinned at a bound, solves the model's step system directly, and backtracks
//! along the projection arc until the Armijo condition holds. It stops when the
//! projected gradient is within `tol`.

use nalgebra::{DMatrix, DVector};

use crate::error::Result;
use crate::mechanics::Bound;
use crate::nlp::sdk::{
    JACOBIAN_APPROXIMATION, LINEAR_SOLVER, MAX_ITER, OBJ_SCALING_FACTOR, OptionValue, PRINT_LEVEL,
    Problem, Report, SUPPRESS_BANNER, Solver, Status, TOL, option_err,
};

/// Sufficient-decrease constant.
const ARMIJO: f64 = 1e-4;
/// Step halvings before the line search gives up.
const MAX_BACKTRACKS: usize = 60;
/// Curvature pairs with `s·y` below this (relative) are skipped.
const CURVATURE_EPS: f64 = 1e-10;

/// How the step system of the quadratic model is solved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinearSolver {
    /// Dense LU factorization of the reduced model.
    Direct,
    /// Identity model: plain projected gradient steps.
    None,
}

#[derive(Clone, Debug, PartialEq)]
pub struct QuasiNewton {
    linear_solver: LinearSolver,
    print_level: i64,
    banner: bool,
    max_iter: usize,
    tol: f64,
    obj_scaling: f64,
}

impl Default for QuasiNewton {
    fn default() -> Self {
        Self {
            linear_solver: LinearSolver::Direct,
            print_level: 5,
            banner: true,
            max_iter: 3000,
            tol: 1e-8,
            obj_scaling: 1.0,
        }
    }
}

impl QuasiNewton {
    pub fn linear_solver(&self) -> LinearSolver {
        self.linear_solver
    }
    pub fn max_iter(&self) -> usize {
        self.max_iter
    }
    pub fn tol(&self) -> f64 {
        self.tol
    }
    pub fn obj_scaling(&self) -> f64 {
        self.obj_scaling
    }
    pub fn print_level(&self) -> i64 {
        self.print_level
    }
    pub fn banner(&self) -> bool {
        self.banner
    }

    fn scaled_cost(&self, problem: &Problem<'_>) -> Result<f64> {
        Ok(self.obj_scaling * problem.cost()?)
    }

    fn scaled_gradient(&self, problem: &Problem<'_>) -> Result<Vec<f64>> {
        Ok(problem.gradient()?.into_iter().map(|g| self.obj_scaling * g).collect())
    }

    /// Model step on the free variables; `None` if the reduced system is singular.
    fn model_step(&self, model: &DMatrix<f64>, g: &[f64], free: &[usize]) -> Option<Vec<f64>> {
        let mut d = vec![0.0; g.len()];
        match self.linear_solver {
            LinearSolver::None => {
                for &i in free {
                    d[i] = -g[i];
                }
            }
            LinearSolver::Direct => {
                let m = free.len();
                let reduced = DMatrix::from_fn(m, m, |r, c| model[(free[r], free[c])]);
                let rhs = DVector::from_iterator(m, free.iter().map(|&i| -g[i]));
                let step = reduced.lu().solve(&rhs)?;
                for (k, &i) in free.iter().enumerate() {
                    d[i] = step[k];
                }
            }
        }
        Some(d)
    }

    fn finish(&self, problem: &Problem<'_>, status: Status, iters: usize) -> Result<Report> {
        let cost = problem.cost()?;
        match status {
            Status::Converged if self.print_level >= 3 => {
                log::debug!("engine converged after {iters} iterations, cost {cost:.6e}");
            }
            Status::MaxIter | Status::Stalled if self.print_level >= 1 => {
                log::warn!("engine stopped with {status:?} after {iters} iterations, cost {cost:.6e}");
            }
            _ => {}
        }
        Ok(Report { status, iters, cost })
    }
}

/// Infinity norm of `P(x - g) - x`.
fn projected_gradient_norm(x: &[f64], g: &[f64], bounds: &[Bound]) -> f64 {
    x.iter()
        .zip(g)
        .zip(bounds)
        .map(|((&xi, &gi), b)| (b.project(xi - gi) - xi).abs())
        .fold(0.0, f64::max)
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

impl Solver for QuasiNewton {
    fn set_option(&mut self, key: &str, value: OptionValue) -> Result<()> {
        match key {
            LINEAR_SOLVER => {
                self.linear_solver = match value.as_str(key)? {
                    "direct" => LinearSolver::Direct,
                    "none" => LinearSolver::None,
                    other => return Err(option_err(key, format!("unknown linear solver `{other}`"))),
                };
            }
            JACOBIAN_APPROXIMATION => match value.as_str(key)? {
                "exact" => {}
                other => {
                    return Err(option_err(
                        key,
                        format!("`{other}` unsupported, gradients must be exact"),
                    ));
                }
            },
            PRINT_LEVEL => {
                let level = value.as_int(key)?;
                if !(0..=12).contains(&level) {
                    return Err(option_err(key, format!("{level} outside 0..=12")));
                }
                self.print_level = level;
            }
            SUPPRESS_BANNER => {
                self.banner = match value.as_str(key)? {
                    "yes" => false,
                    "no" => true,
                    other => return Err(option_err(key, format!("expected yes/no, got `{other}`"))),
                };
            }
            MAX_ITER => {
                let n = value.as_int(key)?;
                self.max_iter =
                    usize::try_from(n).map_err(|_| option_err(key, format!("{n} is negative")))?;
            }
            TOL => {
                let tol = value.as_num(key)?;
                if !(tol > 0.0) {
                    return Err(option_err(key, format!("{tol} is not positive")));
                }
                self.tol = tol;
            }
            OBJ_SCALING_FACTOR => {
                let s = value.as_num(key)?;
                if !s.is_finite() || s == 0.0 {
                    return Err(option_err(key, format!("{s} is not a finite nonzero factor")));
                }
                self.obj_scaling = s;
            }
            _ => return Err(option_err(key, "unknown option")),
        }
        Ok(())
    }

    fn solve(&self, problem: &mut Problem<'_>) -> Result<Report> {
        let bounds = problem.bounds();
        let n = bounds.len();
        if self.banner {
            log::info!(
                "quasi-newton engine: {n} variables, linear solver {:?}, tol {:e}, max_iter {}",
                self.linear_solver,
                self.tol,
                self.max_iter
            );
        }

        let mut x: Vec<f64> = problem.x().iter().zip(&bounds).map(|(&v, b)| b.project(v)).collect();
        problem.set_x(&x)?;
        let mut f = self.scaled_cost(problem)?;
        let mut g = self.scaled_gradient(problem)?;
        let mut model = DMatrix::<f64>::identity(n, n);

        for iter in 0..self.max_iter {
            let pg = projected_gradient_norm(&x, &g, &bounds);
            if self.print_level >= 5 {
                log::trace!("{iter:>5} f {f:+.6e} |pg| {pg:.3e}");
            }
            if pg <= self.tol {
                return self.finish(problem, Status::Converged, iter);
            }

            let free: Vec<usize> = (0..n)
                .filter(|&i| {
                    let pinned_low = bounds[i].at_lower(x[i]) && g[i] > 0.0;
                    let pinned_high = bounds[i].at_upper(x[i]) && g[i] < 0.0;
                    !(pinned_low || pinned_high)
                })
                .collect();

            let mut d = self
                .model_step(&model, &g, &free)
                .unwrap_or_else(|| free_steepest(&g, &free));
            if !(dot(&d, &g) < 0.0) {
                model = DMatrix::identity(n, n);
                d = free_steepest(&g, &free);
            }

            let mut t = 1.0;
            let mut accepted = None;
            for _ in 0..MAX_BACKTRACKS {
                let trial: Vec<f64> = x
                    .iter()
                    .zip(&d)
                    .zip(&bounds)
                    .map(|((&xi, &di), b)| b.project(xi + t * di))
                    .collect();
                problem.set_x(&trial)?;
                let ft = self.scaled_cost(problem)?;
                let decrease: f64 = g.iter().zip(&trial).zip(&x).map(|((gi, ti), xi)| gi * (ti - xi)).sum();
                if ft.is_finite() && ft <= f + ARMIJO * decrease {
                    accepted = Some((trial, ft));
                    break;
                }
                t *= 0.5;
            }

            let Some((x_new, f_new)) = accepted.filter(|(trial, _)| trial != &x) else {
                problem.set_x(&x)?;
                return self.finish(problem, Status::Stalled, iter);
            };

            let g_new = self.scaled_gradient(problem)?;
            if self.linear_solver == LinearSolver::Direct {
                let s = DVector::from_iterator(n, x_new.iter().zip(&x).map(|(a, b)| a - b));
                let y = DVector::from_iterator(n, g_new.iter().zip(&g).map(|(a, b)| a - b));
                let sy = s.dot(&y);
                if sy > CURVATURE_EPS * s.norm() * y.norm() {
                    let bs = &model * &s;
                    let sbs = s.dot(&bs);
                    if sbs > 0.0 {
                        model += &y * y.transpose() / sy - &bs * bs.transpose() / sbs;
                    }
                }
            }
            x = x_new;
            f = f_new;
            g = g_new;
        }

        self.finish(problem, Status::MaxIter, self.max_iter)
    }
}

fn free_steepest(g: &[f64], free: &[usize]) -> Vec<f64> {
    let mut d = vec![0.0; g.len()];
    for &i in free {
        d[i] = -g[i];
    }
    d
}
