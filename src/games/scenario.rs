// src/games/scenario.rs
#![cfg(feature = "model-race")]

//! Parameter sweeps over the race model.
//!
//! A scenario fixes every player's parameters except one, which takes each
//! value of a grid in turn (applied to all players). One equilibrium is solved
//! per grid value; with `SolverConfig::parallel` and the `parallel` feature the
//! grid is spread over the rayon pool. Results come back in grid order.
//!
//! An optional secondary parameter takes per-player values, one row at a time,
//! and the whole sweep is repeated for each row.

use std::str::FromStr;

use crate::config::SolverConfig;
use crate::equilibrium::Outcome;
use crate::error::{Error, Result};
use crate::games::race::{Player, RaceGame};
use crate::mechanics::Csf;
use crate::strategy::JointStrategy;

/// Which per-player parameter varies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Param {
    A,
    Alpha,
    B,
    Beta,
    Theta,
    D,
    R,
}

impl Param {
    pub fn apply(self, player: &mut Player, value: f64) {
        match self {
            Param::A => player.prod.a = value,
            Param::Alpha => player.prod.alpha = value,
            Param::B => player.prod.b = value,
            Param::Beta => player.prod.beta = value,
            Param::Theta => player.prod.theta = value,
            Param::D => player.d = value,
            Param::R => player.r = value,
        }
    }
}

impl FromStr for Param {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "A" => Param::A,
            "alpha" => Param::Alpha,
            "B" => Param::B,
            "beta" => Param::Beta,
            "theta" => Param::Theta,
            "d" => Param::D,
            "r" => Param::R,
            other => return Err(Error::Parameter(format!("unknown parameter `{other}`"))),
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Varying {
    pub param: Param,
    pub values: Vec<f64>,
}

/// A second parameter varied per player, one row of player values at a time.
///
/// Each row of `per_player` holds one value per player; the whole primary
/// sweep is solved once per row.
#[derive(Clone, Debug, PartialEq)]
pub struct SecondaryVarying {
    pub param: Param,
    pub per_player: Vec<Vec<f64>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Scenario {
    pub players: Vec<Player>,
    pub csf: Csf,
    pub varying: Varying,
    pub secondary: Option<SecondaryVarying>,
}

/// Equilibrium at one grid value, with derived quantities.
#[derive(Clone, Debug, PartialEq)]
pub struct StepResult {
    pub value: f64,
    pub outcome: Outcome,
    /// `(s, p)` per player at the equilibrium.
    pub outputs: Vec<(f64, f64)>,
    pub payoffs: Vec<f64>,
    pub safety_probability: f64,
}

impl Scenario {
    /// Player sets the primary sweep starts from: the base players, or one
    /// set per secondary row.
    fn bases(&self) -> Result<Vec<Vec<Player>>> {
        let Some(sec) = &self.secondary else {
            return Ok(vec![self.players.clone()]);
        };
        sec.per_player
            .iter()
            .enumerate()
            .map(|(k, row)| {
                if row.len() != self.players.len() {
                    return Err(Error::Parameter(format!(
                        "secondary row {k} has {} values for {} players",
                        row.len(),
                        self.players.len()
                    )));
                }
                let mut players = self.players.clone();
                for (p, &v) in players.iter_mut().zip(row) {
                    sec.param.apply(p, v);
                }
                Ok(players)
            })
            .collect()
    }

    /// One game per grid value, per secondary row (a single row without one).
    pub fn games(&self) -> Result<Vec<Vec<RaceGame>>> {
        self.bases()?
            .into_iter()
            .map(|base| {
                self.varying
                    .values
                    .iter()
                    .map(|&v| {
                        let mut players = base.clone();
                        for p in players.iter_mut() {
                            self.varying.param.apply(p, v);
                        }
                        RaceGame::new(players, self.csf)
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .collect()
    }

    /// Solve every game; the outer vector follows the secondary rows, the inner
    /// one the grid values.
    pub fn run(&self, config: &SolverConfig) -> Result<Vec<Vec<StepResult>>> {
        let grid = self.games()?;
        let jobs: Vec<(f64, &RaceGame)> = grid
            .iter()
            .flat_map(|row| self.varying.values.iter().copied().zip(row.iter()))
            .collect();
        log::info!(
            "{:<32}{:<32}",
            "solving scenario",
            format!("{} rows x {} steps", grid.len(), self.varying.values.len())
        );
        let mut solved = solve_all(jobs, config)?.into_iter();
        Ok(grid.iter().map(|row| solved.by_ref().take(row.len()).collect()).collect())
    }
}

fn solve_all(jobs: Vec<(f64, &RaceGame)>, config: &SolverConfig) -> Result<Vec<StepResult>> {
    #[cfg(feature = "parallel")]
    {
        if config.parallel {
            use rayon::iter::{IntoParallelIterator, ParallelIterator};
            return jobs.into_par_iter().map(|(v, g)| solve_step(v, g, config)).collect();
        }
    }
    jobs.into_iter().map(|(v, g)| solve_step(v, g, config)).collect()
}

fn solve_step(value: f64, game: &RaceGame, config: &SolverConfig) -> Result<StepResult> {
    let outcome = crate::equilibrate(game, JointStrategy::ones(game.players().len()), config)?;
    let outputs = game.outputs(&outcome.theta)?;
    let payoffs = game.payoffs(&outcome.theta)?;
    let safety_probability = game.safety_probability(&outcome.theta)?;
    Ok(StepResult { value, outcome, outputs, payoffs, safety_probability })
}
