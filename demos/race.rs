// demos/race.rs
// Run with:
//   cargo run --example race --features "model-race parallel"

use equilibria::SolverConfig;
use equilibria::games::race::Player;
use equilibria::games::scenario::{Param, Scenario, Varying};
use equilibria::mechanics::{Csf, ProdFunc};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    simplelog::TermLogger::init(
        log::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    // Three players of increasing productivity; factor cost r swept 0.02 → 0.04.
    let player = |a: f64, b: f64| Player {
        prod: ProdFunc { a, alpha: 0.5, b, beta: 0.5, theta: 0.0 },
        d: 1.0,
        r: 0.04,
    };
    let scenario = Scenario {
        players: vec![player(5.0, 5.0), player(10.0, 10.0), player(15.0, 15.0)],
        csf: Csf::default(),
        varying: Varying {
            param: Param::R,
            values: (0..20).map(|i| 0.02 + 0.02 * i as f64 / 19.0).collect(),
        },
        secondary: None,
    };

    let cfg = SolverConfig::default().with_parallel(true);
    let rows = scenario.run(&cfg)?;

    println!("== Race scenario: r sweep ==");
    println!("{:>8} {:>10} {:>10} {:>8}  {}", "r", "mean s", "mean p", "P(safe)", "payoffs");
    for step in rows.iter().flatten() {
        let n = step.outputs.len() as f64;
        let mean_s = step.outputs.iter().map(|(s, _)| s).sum::<f64>() / n;
        let mean_p = step.outputs.iter().map(|(_, p)| p).sum::<f64>() / n;
        println!(
            "{:>8.4} {:>10.4} {:>10.4} {:>8.4}  {:?}{}",
            step.value,
            mean_s,
            mean_p,
            step.safety_probability,
            step.payoffs,
            if step.outcome.converged() { "" } else { "  (not converged)" },
        );
    }
    Ok(())
}
