// src/games/mod.rs

// Payoff side of the solver. The SDK is always available; concrete models are
// feature-gated so downstream users enable only what they use.

pub mod sdk;
pub use sdk::*;

#[cfg(feature = "model-race")]
pub mod race;
#[cfg(feature = "model-race")]
pub mod scenario;

#[cfg(feature = "model-race")]
pub use race::{Player, RaceGame};
#[cfg(feature = "model-race")]
pub use scenario::{Param, Scenario, SecondaryVarying, StepResult, Varying};
