//! Basal Simulation: 24 h of the Glucose-Insulin Model
//!
//! Runs the default subject from its basal equilibrium under three
//! insulin scenarios and prints glucose summaries:
//!
//! - Basal: the equilibrium infusion, glucose should stay flat at 7.8 mmol/L
//! - Reduced: infusion halved at t = 0, glucose drifts upward
//! - Ramp: infusion ramped back to basal after a 6 h interruption

use pancreas_dynamics::{Controllable, DynamicalSystem, PancreasSimulation, Result, SimulationConfig};

const MINUTES_PER_DAY: usize = 24 * 60;

/// (min, mean, max) of a glucose trace
fn glucose_statistics(trace: &[f64]) -> (f64, f64, f64) {
    if trace.is_empty() {
        return (0.0, 0.0, 0.0);
    }
    let min = trace.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = trace.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let mean = trace.iter().sum::<f64>() / trace.len() as f64;
    (min, mean, max)
}

fn report(name: &str, sim: &PancreasSimulation) {
    let (min, mean, max) = glucose_statistics(&sim.glucose_trace());
    println!("\n{}", name);
    println!("  Insulin rate     = {:.3} mU/min", sim.get_parameter());
    println!("  Glucose min/mean/max = {:.3} / {:.3} / {:.3} mmol/L", min, mean, max);
    println!("  Final glucose    = {:.3} mmol/L", sim.glucose());
    println!("  Final CGM        = {:.3} mmol/L", sim.interstitial_glucose());
    println!("  Final insulin    = {:.3} mU/L", sim.plasma_insulin());
}

fn run() -> Result<()> {
    let config = SimulationConfig {
        max_history: MINUTES_PER_DAY + 1,
        ..SimulationConfig::default()
    };

    println!("System Parameters:");
    println!("  Body weight = {:.1} kg", config.body_weight);
    println!("  Basal rate  = {:.4} mU/min", config.basal_rate);
    println!("  dt          = {:.1} min", config.dt);

    // Scenario 1: equilibrium infusion
    let mut basal = PancreasSimulation::new(config)?;
    basal.run(MINUTES_PER_DAY)?;
    report("Scenario 1: basal infusion", &basal);

    // Scenario 2: infusion halved
    let mut reduced = PancreasSimulation::new(config)?;
    reduced.set_parameter(config.basal_rate / 2.0);
    for hour in 0..24 {
        reduced.run(60)?;
        if hour % 6 == 5 {
            println!("  [reduced] t = {:4.0} min, G = {:.3} mmol/L", reduced.time(), reduced.glucose());
        }
    }
    report("Scenario 2: infusion halved", &reduced);

    // Scenario 3: 6 h without insulin, then ramp back to basal
    let mut ramp = PancreasSimulation::new(config)?;
    ramp.set_parameter(0.0);
    ramp.run(6 * 60)?;
    println!("\n  [ramp] after 6 h without insulin: G = {:.3} mmol/L", ramp.glucose());
    ramp.ramp_parameter(config.basal_rate, 1.0, 30)?;
    let remaining = MINUTES_PER_DAY.saturating_sub(ramp.time() as usize);
    ramp.run(remaining)?;
    report("Scenario 3: interruption and ramp", &ramp);

    Ok(())
}

fn main() {
    env_logger::init();

    println!("═══════════════════════════════════════════════════════════════");
    println!("  Glucose-Insulin Model: 24 h Basal Simulation");
    println!("═══════════════════════════════════════════════════════════════\n");

    if let Err(err) = run() {
        log::error!("simulation failed: {}", err);
        eprintln!("error: {}", err);
        std::process::exit(1);
    }

    println!("\n═══════════════════════════════════════════════════════════════");
}
