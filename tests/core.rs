// tests/core.rs
use bevy_prng::WyRand;
use equilibria::games::sdk::FnPayoff;
use equilibria::mechanics::ZeroDenominator;
use equilibria::nlp::Status;
use equilibria::{
    EquilibriumIterator, Error, Game, JointStrategy, PayoffEvaluator, SolverConfig, State,
    Termination, equilibrate, solve, solve_from,
};
use rand_core::{RngCore, SeedableRng};

/// Payoff `-(x0 - t0)^2 - (x1 - t1)^2`: best response is exactly `t`.
fn quadratic(t: [f64; 2]) -> Box<dyn PayoffEvaluator> {
    Box::new(FnPayoff {
        value: move |x: &[f64; 2]| -(x[0] - t[0]).powi(2) - (x[1] - t[1]).powi(2),
        gradient: move |x: &[f64; 2]| [-2.0 * (x[0] - t[0]), -2.0 * (x[1] - t[1])],
    })
}

/// Every player chases a fixed target, ignoring the others.
struct Targets(Vec<[f64; 2]>);

impl Game for Targets {
    fn n_players(&self) -> usize {
        self.0.len()
    }
    fn evaluator<'s>(&'s self, player: usize, _snapshot: &'s JointStrategy)
    -> Box<dyn PayoffEvaluator + 's> {
        quadratic(self.0[player])
    }
}

/// Constant payoff: nothing ever moves.
struct Flat(usize);

impl Game for Flat {
    fn n_players(&self) -> usize {
        self.0
    }
    fn evaluator<'s>(&'s self, _player: usize, _snapshot: &'s JointStrategy)
    -> Box<dyn PayoffEvaluator + 's> {
        Box::new(FnPayoff { value: |_: &[f64; 2]| 7.0, gradient: |_: &[f64; 2]| [0.0, 0.0] })
    }
}

/// Two players, each copying the other's snapshot row.
struct Copycats;

impl Game for Copycats {
    fn n_players(&self) -> usize {
        2
    }
    fn evaluator<'s>(&'s self, player: usize, snapshot: &'s JointStrategy)
    -> Box<dyn PayoffEvaluator + 's> {
        quadratic(*snapshot.row(1 - player))
    }
}

/// Player 0 wants (5, 5); player 1 copies player 0's snapshot row.
struct Leader;

impl Game for Leader {
    fn n_players(&self) -> usize {
        2
    }
    fn evaluator<'s>(&'s self, player: usize, snapshot: &'s JointStrategy)
    -> Box<dyn PayoffEvaluator + 's> {
        match player {
            0 => quadratic([5.0, 5.0]),
            _ => quadratic(*snapshot.row(0)),
        }
    }
}

/// Each player aims at 1 + half the mean of everyone else: a contraction.
struct Mean(usize);

impl Game for Mean {
    fn n_players(&self) -> usize {
        self.0
    }
    fn evaluator<'s>(&'s self, player: usize, snapshot: &'s JointStrategy)
    -> Box<dyn PayoffEvaluator + 's> {
        let others = (self.0 - 1).max(1) as f64;
        let mut t = [0.0; 2];
        for (j, row) in snapshot.iter().enumerate() {
            if j != player {
                t[0] += row[0] / others;
                t[1] += row[1] / others;
            }
        }
        quadratic([1.0 + 0.5 * t[0], 1.0 + 0.5 * t[1]])
    }
}

fn uniform(rng: &mut WyRand, lo: f64, hi: f64) -> f64 {
    let u = ((rng.next_u64() >> 11) as f64) / ((1u64 << 53) as f64);
    lo + (hi - lo) * u
}

/* ──────────────────────────────────────────────────────────────────────────
1) Single player — quadratic payoff peaks at (2, 3)
────────────────────────────────────────────────────────────────────────── */

#[test]
fn single_player_converges_to_unconstrained_optimum() {
    let game = Targets(vec![[2.0, 3.0]]);
    let cfg = SolverConfig::new(10, 1e-6, 500, 1e-3);

    let out = equilibrate(&game, JointStrategy::ones(1), &cfg).unwrap();

    assert!(out.converged(), "expected convergence: {:?}", out);
    match out.termination {
        Termination::Converged { round } => assert!(round <= 2, "converged late, round {round}"),
        Termination::Exhausted => unreachable!(),
    }
    let [x0, x1] = *out.theta.row(0);
    assert!((x0 - 2.0).abs() < 1e-6, "x0 = {x0}");
    assert!((x1 - 3.0).abs() < 1e-6, "x1 = {x1}");
    assert_eq!(out.inner_unconverged, 0);
}

#[test]
fn solve_defaults_start_guess_to_ones() {
    let game = Targets(vec![[2.0, 3.0], [4.0, 0.5]]);
    let theta = solve(&game, 10, 1e-6, 500, 1e-3).unwrap();
    let from_ones = solve_from(&game, JointStrategy::ones(2), 10, 1e-6, 500, 1e-3).unwrap();
    assert_eq!(theta, from_ones);
    assert!((theta.row(1)[0] - 4.0).abs() < 1e-6);
    assert!((theta.row(1)[1] - 0.5).abs() < 1e-6);
}

/* ──────────────────────────────────────────────────────────────────────────
2) Round caps — zero rounds and an oscillating best response
────────────────────────────────────────────────────────────────────────── */

#[test]
fn zero_round_cap_returns_start_guess() {
    let game = Targets(vec![[2.0, 3.0], [4.0, 4.0]]);
    let guess = JointStrategy::from_rows(vec![[1.5, 0.25], [3.0, 8.0]]);
    let cfg = SolverConfig::new(0, 1e-6, 500, 1e-3);

    let out = equilibrate(&game, guess.clone(), &cfg).unwrap();

    assert_eq!(out.theta, guess);
    assert_eq!(out.termination, Termination::Exhausted);
    assert_eq!(out.rounds, 0);
    assert!(out.change.is_infinite());
}

#[test]
fn oscillating_best_response_exhausts_without_error() {
    let guess = JointStrategy::from_rows(vec![[1.0, 1.0], [2.0, 2.0]]);
    let cfg = SolverConfig::new(5, 1e-6, 500, 1e-8);

    let out = equilibrate(&Copycats, guess, &cfg).unwrap();

    assert_eq!(out.termination, Termination::Exhausted);
    assert_eq!(out.rounds, 5);
    // five swaps starting from [(1,1), (2,2)]
    let rows = out.theta.rows();
    assert!((rows[0][0] - 2.0).abs() < 1e-9 && (rows[0][1] - 2.0).abs() < 1e-9, "{rows:?}");
    assert!((rows[1][0] - 1.0).abs() < 1e-9 && (rows[1][1] - 1.0).abs() < 1e-9, "{rows:?}");
    assert!(out.change >= 0.5);
}

/* ──────────────────────────────────────────────────────────────────────────
3) Fixed points and update order
────────────────────────────────────────────────────────────────────────── */

#[test]
fn constant_payoff_is_a_fixed_point_at_round_zero() {
    let guess = JointStrategy::from_rows(vec![[0.3, 2.0], [1.0, 1.0], [9.5, 0.01]]);
    let out = equilibrate(&Flat(3), guess.clone(), &SolverConfig::default()).unwrap();

    assert_eq!(out.termination, Termination::Converged { round: 0 });
    assert_eq!(out.theta, guess);
    assert_eq!(out.rounds, 1);
    assert_eq!(out.change, 0.0);
}

#[test]
fn players_respond_to_the_frozen_snapshot() {
    let cfg = SolverConfig::new(10, 1e-6, 500, 1e-8);
    let mut it = EquilibriumIterator::new(&Leader, JointStrategy::ones(2), cfg).unwrap();

    let state = it.step().unwrap().clone();

    // Player 1 copied player 0's *old* row, not the (5, 5) it moved to.
    match state {
        State::Running { round, guess } => {
            assert_eq!(round, 1);
            assert!((guess.row(0)[0] - 5.0).abs() < 1e-9);
            assert!((guess.row(1)[0] - 1.0).abs() < 1e-9);
            assert!((guess.row(1)[1] - 1.0).abs() < 1e-9);
        }
        other => panic!("expected a running state, got {other:?}"),
    }

    let out = it.run().unwrap();
    assert!(out.converged());
    assert!((out.theta.row(1)[0] - 5.0).abs() < 1e-6);
}

#[test]
fn step_is_a_no_op_once_terminal() {
    let cfg = SolverConfig::new(3, 1e-6, 500, 1e-3);
    let game = Flat(2);
    let mut it = EquilibriumIterator::new(&game, JointStrategy::ones(2), cfg).unwrap();
    let first = it.step().unwrap().clone();
    assert!(first.is_terminal());
    assert_eq!(it.step().unwrap(), &first);
}

/* ──────────────────────────────────────────────────────────────────────────
4) Shape invariant over random games and guesses
────────────────────────────────────────────────────────────────────────── */

#[test]
fn joint_strategy_keeps_its_shape() {
    let mut rng = WyRand::from_seed(42u64.to_le_bytes());
    for _ in 0..20 {
        let n = 1 + (rng.next_u64() % 6) as usize;
        let rows = (0..n)
            .map(|_| [uniform(&mut rng, 0.1, 5.0), uniform(&mut rng, 0.1, 5.0)])
            .collect();
        let cfg = SolverConfig::new(1 + (rng.next_u64() % 8) as usize, 1e-6, 200, 1e-6);

        let game = Mean(n);
        let mut it = EquilibriumIterator::new(&game, JointStrategy::from_rows(rows), cfg).unwrap();
        while !it.state().is_terminal() {
            let state = it.step().unwrap();
            assert_eq!(state.guess().n_players(), n);
        }
        let out = it.run().unwrap();
        assert_eq!(out.theta.n_players(), n);
        assert!(out.theta.iter().flatten().all(|v| v.is_finite() && *v > 0.0));
    }
}

#[test]
fn start_guess_must_match_player_count() {
    let err = equilibrate(&Flat(3), JointStrategy::ones(2), &SolverConfig::default()).unwrap_err();
    assert_eq!(err, Error::PlayerCount { expected: 3, got: 2 });
}

#[test]
fn ragged_strategy_data_is_rejected() {
    let err = JointStrategy::try_from(vec![vec![1.0, 2.0], vec![3.0]]).unwrap_err();
    assert!(matches!(err, Error::Shape { rows: 2, cols: 1 }));
    let err = JointStrategy::from_flat(&[1.0, 2.0, 3.0]).unwrap_err();
    assert_eq!(err, Error::FlatLength(3));
    assert!(err.to_string().contains("length 3"));
    let ok = JointStrategy::from_flat(&[1.0, 2.0, 3.0, 4.0]).unwrap();
    assert_eq!(ok.rows(), &[[1.0, 2.0], [3.0, 4.0]]);
    assert_eq!(ok.column(1), vec![2.0, 4.0]);
}

/* ──────────────────────────────────────────────────────────────────────────
5) Degenerate convergence test and inner failures
────────────────────────────────────────────────────────────────────────── */

#[test]
fn zero_coordinates_follow_the_configured_policy() {
    // The engine lifts 0.0 just inside the strict lower bound.
    let guess = JointStrategy::from_rows(vec![[0.0, 1.0]]);

    let fallback = SolverConfig::default();
    let out = equilibrate(&Flat(1), guess.clone(), &fallback).unwrap();
    assert_eq!(out.termination, Termination::Converged { round: 0 });
    assert!(out.theta.row(0)[0] > 0.0);

    let never = SolverConfig::default().with_zero_denominator(ZeroDenominator::NeverConverges);
    let out = equilibrate(&Flat(1), guess, &never).unwrap();
    assert_eq!(out.termination, Termination::Converged { round: 1 });
}

#[test]
fn unconverged_inner_solves_are_accepted_by_default() {
    let game = Targets(vec![[2.0, 3.0]]);
    // No engine iterations at all: the start point comes straight back.
    let cfg = SolverConfig::new(4, 1e-6, 0, 1e-8);

    let out = equilibrate(&game, JointStrategy::ones(1), &cfg).unwrap();
    assert_eq!(out.theta, JointStrategy::ones(1));
    assert_eq!(out.termination, Termination::Converged { round: 0 });
    assert_eq!(out.inner_unconverged, 1);
}

#[test]
fn strict_mode_surfaces_unconverged_inner_solves() {
    let game = Targets(vec![[2.0, 3.0]]);
    let cfg = SolverConfig::new(4, 1e-6, 0, 1e-8).with_strict_inner(true);

    let err = equilibrate(&game, JointStrategy::ones(1), &cfg).unwrap_err();
    assert_eq!(err, Error::UnconvergedInner { player: 0, round: 0, status: Status::MaxIter });
}

/* ──────────────────────────────────────────────────────────────────────────
6) Parallel rounds
────────────────────────────────────────────────────────────────────────── */

#[cfg(feature = "parallel")]
#[test]
fn parallel_rounds_match_sequential_rounds() {
    let guess = JointStrategy::from_rows(vec![[0.5, 4.0], [2.0, 1.0], [3.0, 3.0], [1.0, 0.2]]);
    let seq = SolverConfig::new(50, 1e-8, 500, 1e-10);
    let par = seq.with_parallel(true);

    let a = equilibrate(&Mean(4), guess.clone(), &seq).unwrap();
    let b = equilibrate(&Mean(4), guess, &par).unwrap();
    assert_eq!(a, b);
}
