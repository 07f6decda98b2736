//! Jacobi-style best-response iteration.
//!
//! Every round freezes the current joint strategy, solves one subproblem per
//! player against that frozen snapshot, and assembles the answers by player
//! index. No player ever sees another player's in-round update.

use crate::config::SolverConfig;
use crate::error::{Error, Result};
use crate::games::Game;
use crate::mechanics::max_relative_change;
use crate::nlp::{PayoffObjective, Solved, Subproblem, VarSet};
use crate::strategy::JointStrategy;

/// Name of the single variable block in every subproblem.
pub const VAR_NAME: &str = "vars";
/// Name of the single cost term in every subproblem.
pub const COST_NAME: &str = "obj";

#[derive(Clone, Debug, PartialEq)]
pub enum State {
    Running { round: usize, guess: JointStrategy },
    Converged { guess: JointStrategy, round: usize },
    Exhausted { guess: JointStrategy },
}

impl State {
    pub fn guess(&self) -> &JointStrategy {
        match self {
            State::Running { guess, .. }
            | State::Converged { guess, .. }
            | State::Exhausted { guess } => guess,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, State::Running { .. })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    /// Relative change fell below the outer tolerance in this round.
    Converged { round: usize },
    /// Round cap reached first.
    Exhausted,
}

/// Result of a full run.
#[derive(Clone, Debug, PartialEq)]
pub struct Outcome {
    pub theta: JointStrategy,
    pub termination: Termination,
    /// Rounds actually executed.
    pub rounds: usize,
    /// Max relative change of the last executed round (+inf if none ran).
    pub change: f64,
    /// Subproblems whose engine stopped short of its tolerance.
    pub inner_unconverged: usize,
}

impl Outcome {
    pub fn converged(&self) -> bool {
        matches!(self.termination, Termination::Converged { .. })
    }
}

/// Best response of `player` to `snapshot`.
pub fn best_response<G: Game + ?Sized>(
    game: &G,
    player: usize,
    snapshot: &JointStrategy,
    config: &SolverConfig,
) -> Result<Solved> {
    let payoff = game.evaluator(player, snapshot);
    let objective = PayoffObjective::new(COST_NAME, VAR_NAME, payoff.as_ref());
    let vars = VarSet::with_values(VAR_NAME, snapshot.row(player).to_vec());
    Subproblem::new(vars, objective, config.inner_max_iter, config.inner_tol)?.solve()
}

/// Every player's best response to the same snapshot; entry `i` is player `i`.
pub fn best_responses<G: Game + ?Sized>(
    game: &G,
    snapshot: &JointStrategy,
    config: &SolverConfig,
) -> Result<Vec<Solved>> {
    let n = snapshot.n_players();
    #[cfg(feature = "parallel")]
    {
        if config.parallel {
            use rayon::iter::{IntoParallelIterator, ParallelIterator};
            return (0..n)
                .into_par_iter()
                .map(|i| best_response(game, i, snapshot, config))
                .collect();
        }
    }
    #[cfg(not(feature = "parallel"))]
    {
        if config.parallel {
            log::debug!("parallel rounds need the `parallel` feature, solving sequentially");
        }
    }
    (0..n).map(|i| best_response(game, i, snapshot, config)).collect()
}

/// Round-by-round driver of the best-response loop.
pub struct EquilibriumIterator<'g, G: Game + ?Sized> {
    game: &'g G,
    config: SolverConfig,
    state: State,
    rounds: usize,
    change: f64,
    inner_unconverged: usize,
}

impl<'g, G: Game + ?Sized> EquilibriumIterator<'g, G> {
    pub fn new(game: &'g G, guess: JointStrategy, config: SolverConfig) -> Result<Self> {
        if guess.n_players() != game.n_players() {
            return Err(Error::PlayerCount { expected: game.n_players(), got: guess.n_players() });
        }
        Ok(Self {
            game,
            config,
            state: State::Running { round: 0, guess },
            rounds: 0,
            change: f64::INFINITY,
            inner_unconverged: 0,
        })
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Execute one round, or settle into a terminal state. No-op once terminal.
    pub fn step(&mut self) -> Result<&State> {
        let (round, snapshot) = match &self.state {
            State::Running { round, guess } => (*round, guess.clone()),
            _ => return Ok(&self.state),
        };
        if round >= self.config.max_rounds {
            log::info!("reached max iterations");
            self.state = State::Exhausted { guess: snapshot };
            return Ok(&self.state);
        }

        let solved = best_responses(self.game, &snapshot, &self.config)?;
        for (player, s) in solved.iter().enumerate() {
            if s.report.converged() {
                continue;
            }
            if self.config.strict_inner {
                return Err(Error::UnconvergedInner { player, round, status: s.report.status });
            }
            self.inner_unconverged += 1;
            log::warn!(
                "round {round}: player {player} subproblem ended with {:?} after {} iterations",
                s.report.status,
                s.report.iters
            );
        }
        let candidate = JointStrategy::from_rows(solved.into_iter().map(|s| s.x).collect());

        let change = max_relative_change(snapshot.iter().zip(candidate.iter()), self.config.zero_denominator);
        log::debug!("round {round:>4} max relative change {change:.3e}");
        self.rounds += 1;
        self.change = change;

        self.state = if change < self.config.outer_tol {
            log::info!("converged at round {round}");
            State::Converged { guess: candidate, round }
        } else if round + 1 >= self.config.max_rounds {
            log::info!("reached max iterations");
            State::Exhausted { guess: candidate }
        } else {
            State::Running { round: round + 1, guess: candidate }
        };
        Ok(&self.state)
    }

    /// Step until terminal.
    pub fn run(mut self) -> Result<Outcome> {
        while !self.state.is_terminal() {
            self.step()?;
        }
        let termination = match self.state {
            State::Converged { round, .. } => Termination::Converged { round },
            _ => Termination::Exhausted,
        };
        Ok(Outcome {
            theta: self.state.guess().clone(),
            termination,
            rounds: self.rounds,
            change: self.change,
            inner_unconverged: self.inner_unconverged,
        })
    }
}
