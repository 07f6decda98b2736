// src/games/sdk.rs

//! # Games SDK
//!
//! The payoff side of the solver. A **game** knows how many players it has and,
//! given a frozen joint strategy, hands out one **payoff evaluator** per player.
//! The solver never looks inside either: it only asks an evaluator for the value
//! and exact gradient of the player's payoff at that player's own 2-vector `x`,
//! with every other player's row held at the snapshot.
//!
//! ## Writing a game
//! 1. Implement [`PayoffEvaluator`] for a small struct that borrows whatever it
//!    needs from the snapshot (other players' rows, totals, ...).
//! 2. Implement [`Game::evaluator`] to build it for player `i`.
//!
//! Evaluators are built fresh for every player in every round and dropped when
//! that player's subproblem ends, so they may precompute snapshot-dependent
//! quantities once in their constructor.
//!
//! ## Gradients
//! Gradients must be exact (analytic). The engine is configured to refuse
//! finite-difference approximations.
//!
//! ## Threads
//! `Game: Sync` so a round can fan out over a thread pool. Evaluators
//! themselves never cross threads.

use crate::strategy::JointStrategy;

/// A player's payoff as a function of their own strategy `x`.
pub trait PayoffEvaluator {
    fn value(&self, x: &[f64; 2]) -> f64;
    fn gradient(&self, x: &[f64; 2]) -> [f64; 2];
}

/// An n-player game with 2-dimensional strategies.
pub trait Game: Sync {
    fn n_players(&self) -> usize;

    /// Payoff of `player` with all other rows fixed at `snapshot`.
    fn evaluator<'s>(&'s self, player: usize, snapshot: &'s JointStrategy)
    -> Box<dyn PayoffEvaluator + 's>;
}

/// Payoff given by a pair of closures, for quick games and tests.
pub struct FnPayoff<V, G> {
    pub value: V,
    pub gradient: G,
}

impl<V, G> PayoffEvaluator for FnPayoff<V, G>
where
    V: Fn(&[f64; 2]) -> f64,
    G: Fn(&[f64; 2]) -> [f64; 2],
{
    fn value(&self, x: &[f64; 2]) -> f64 {
        (self.value)(x)
    }
    fn gradient(&self, x: &[f64; 2]) -> [f64; 2] {
        (self.gradient)(x)
    }
}
