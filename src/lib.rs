/*!
`equilibria` — best-response fixed-point iteration for n-player games.

What it does
- Each of `n` players picks a nonnegative 2-vector to maximize a private payoff
  that depends on everyone's strategy.
- Every round freezes the joint strategy θ, solves one bounded, exact-gradient
  optimization per player against that frozen θ (Jacobi-style: nobody sees
  another player's in-round move), and assembles the answers into θ'.
- Repeats until `max |(θ' - θ) / θ| < outer_tol` or the round cap is hit.

How to use (call surface only)
- Implement [`games::Game`]: a player count plus, for player `i` and a frozen
  joint strategy, a [`games::PayoffEvaluator`] exposing `value(x)` and
  `gradient(x)` of that player's payoff in their own 2-vector `x`.
- Call [`solve`] (start guess all ones) or [`solve_from`], or [`equilibrate`]
  with a [`SolverConfig`] for the full [`Outcome`].

What it does NOT do
- No economics: payoffs are yours (one worked model ships behind the
  `model-race` feature).
- No global optimization: each subproblem is a local solve by the engine in
  [`nlp`], which can be replaced through the [`nlp::Solver`] trait.
*/

pub mod config;
pub mod equilibrium;
pub mod error;
pub mod games;
pub mod mechanics;
pub mod nlp;
pub mod strategy;

pub use config::SolverConfig;
pub use equilibrium::{EquilibriumIterator, Outcome, State, Termination};
pub use error::{Error, Result};
pub use games::{Game, PayoffEvaluator};
pub use strategy::JointStrategy;

/// Full run from `start_guess`: θ_{t+1} = best_responses(θ_t) until stable.
pub fn equilibrate<G: Game + ?Sized>(
    game: &G,
    start_guess: JointStrategy,
    config: &SolverConfig,
) -> Result<Outcome> {
    EquilibriumIterator::new(game, start_guess, *config)?.run()
}

/// Equilibrium joint strategy from an explicit start guess.
///
/// Reaching `max_rounds` is not an error: the last computed guess is returned.
pub fn solve_from<G: Game + ?Sized>(
    game: &G,
    start_guess: JointStrategy,
    max_rounds: usize,
    outer_tol: f64,
    inner_max_iter: usize,
    inner_tol: f64,
) -> Result<JointStrategy> {
    let config = SolverConfig::new(max_rounds, outer_tol, inner_max_iter, inner_tol);
    Ok(equilibrate(game, start_guess, &config)?.theta)
}

/// [`solve_from`] starting at 1.0 in every coordinate.
pub fn solve<G: Game + ?Sized>(
    game: &G,
    max_rounds: usize,
    outer_tol: f64,
    inner_max_iter: usize,
    inner_tol: f64,
) -> Result<JointStrategy> {
    solve_from(game, JointStrategy::ones(game.n_players()), max_rounds, outer_tol, inner_max_iter, inner_tol)
}
