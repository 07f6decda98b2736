// src/games/race.rs
#![cfg(feature = "model-race")]

//! Safety/performance race.
//!
//! Each player splits spending between safety input `Ks` and performance input
//! `Kp`. Performance wins the contest (see [`Csf`]); safety keeps everyone out
//! of a shared disaster. The world is safe with probability
//! `σ = Π_j s_j / (1 + s_j)`, and player `i` nets
//!
//! `u_i = σ·R_i − (1 − σ)·d_i − r_i·(Ks_i + Kp_i)`
//!
//! where `R_i` is the contest reward and `d_i` the disaster cost.

use crate::error::{Error, Result};
use crate::games::sdk::{Game, PayoffEvaluator};
use crate::mechanics::{Csf, ProdFunc};
use crate::strategy::JointStrategy;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Player {
    pub prod: ProdFunc,
    /// Cost of disaster.
    pub d: f64,
    /// Factor cost per unit of input.
    pub r: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RaceGame {
    players: Vec<Player>,
    csf: Csf,
}

impl RaceGame {
    pub fn new(players: Vec<Player>, csf: Csf) -> Result<Self> {
        if players.is_empty() {
            return Err(Error::Parameter("a race needs at least one player".to_owned()));
        }
        for (i, p) in players.iter().enumerate() {
            validate(i, p)?;
        }
        Ok(Self { players, csf })
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn csf(&self) -> Csf {
        self.csf
    }

    /// `(s, p)` of every player.
    pub fn outputs(&self, strategy: &JointStrategy) -> Result<Vec<(f64, f64)>> {
        self.check_rows(strategy)?;
        Ok(self
            .players
            .iter()
            .zip(strategy.iter())
            .map(|(pl, &[ks, kp])| pl.prod.outputs(ks, kp))
            .collect())
    }

    /// Probability that no player causes a disaster.
    pub fn safety_probability(&self, strategy: &JointStrategy) -> Result<f64> {
        Ok(self.outputs(strategy)?.iter().map(|&(s, _)| s / (1.0 + s)).product())
    }

    /// Net payoff of every player.
    pub fn payoffs(&self, strategy: &JointStrategy) -> Result<Vec<f64>> {
        self.check_rows(strategy)?;
        Ok((0..self.players.len())
            .map(|i| self.payoff_of(i, strategy).value(strategy.row(i)))
            .collect())
    }

    fn check_rows(&self, strategy: &JointStrategy) -> Result<()> {
        if strategy.n_players() != self.players.len() {
            return Err(Error::PlayerCount { expected: self.players.len(), got: strategy.n_players() });
        }
        Ok(())
    }

    fn payoff_of(&self, player: usize, snapshot: &JointStrategy) -> RacePayoff {
        let mut others_safe = 1.0;
        let mut others_p = 0.0;
        for (j, (pl, &[ks, kp])) in self.players.iter().zip(snapshot.iter()).enumerate() {
            if j == player {
                continue;
            }
            let (s, p) = pl.prod.outputs(ks, kp);
            others_safe *= s / (1.0 + s);
            others_p += p;
        }
        RacePayoff { player: self.players[player], csf: self.csf, others_safe, others_p }
    }
}

fn validate(i: usize, p: &Player) -> Result<()> {
    let f = &p.prod;
    let checks = [
        (f.a > 0.0, "A must be positive"),
        (f.b > 0.0, "B must be positive"),
        (f.alpha > 0.0 && f.alpha <= 1.0, "alpha must lie in (0, 1]"),
        (f.beta > 0.0 && f.beta <= 1.0, "beta must lie in (0, 1]"),
        (f.theta >= 0.0, "theta must be nonnegative"),
        (p.d >= 0.0, "d must be nonnegative"),
        (p.r >= 0.0, "r must be nonnegative"),
    ];
    match checks.iter().find(|(ok, _)| !ok) {
        Some((_, msg)) => Err(Error::Parameter(format!("player {i}: {msg}"))),
        None => Ok(()),
    }
}

/// Player `i`'s payoff with everyone else frozen.
struct RacePayoff {
    player: Player,
    csf: Csf,
    /// `Π_{j≠i} s_j / (1 + s_j)`.
    others_safe: f64,
    /// `Σ_{j≠i} p_j`.
    others_p: f64,
}

impl PayoffEvaluator for RacePayoff {
    fn value(&self, x: &[f64; 2]) -> f64 {
        let [ks, kp] = *x;
        let (s, p) = self.player.prod.outputs(ks, kp);
        let sigma = self.others_safe * s / (1.0 + s);
        let reward = self.csf.reward(p, self.others_p + p);
        sigma * reward - (1.0 - sigma) * self.player.d - self.player.r * (ks + kp)
    }

    fn gradient(&self, x: &[f64; 2]) -> [f64; 2] {
        let [ks, kp] = *x;
        let Player { prod, d, r } = self.player;
        let (s, p) = prod.outputs(ks, kp);
        let sum = self.others_p + p;
        let sigma = self.others_safe * s / (1.0 + s);
        let dsigma_ds = self.others_safe / ((1.0 + s) * (1.0 + s));
        let (ds_dks, ds_dkp) = prod.ds(ks, kp);
        let reward = self.csf.reward(p, sum);
        let stake = reward + d;
        [
            dsigma_ds * ds_dks * stake - r,
            dsigma_ds * ds_dkp * stake + sigma * self.csf.reward_deriv(p, sum) * prod.dp_dkp(kp) - r,
        ]
    }
}

impl Game for RaceGame {
    fn n_players(&self) -> usize {
        self.players.len()
    }

    fn evaluator<'s>(&'s self, player: usize, snapshot: &'s JointStrategy)
    -> Box<dyn PayoffEvaluator + 's> {
        Box::new(self.payoff_of(player, snapshot))
    }
}
