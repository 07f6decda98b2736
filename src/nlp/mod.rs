// src/nlp/mod.rs

// Engine contract (sdk), the adapters that satisfy it for one player, and a
// built-in engine so the crate runs without an external optimizer.

pub mod sdk;
pub use sdk::*;

pub mod objective;
pub mod quasi_newton;
pub mod subproblem;
pub mod varset;

pub use objective::PayoffObjective;
pub use quasi_newton::{LinearSolver, QuasiNewton};
pub use subproblem::{Solved, Subproblem, configure_solver};
pub use varset::VarSet;
