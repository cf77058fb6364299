//! Dataset Generation: Noisy Neuron Trajectories with Future-Spike Labels
//!
//! Usage: `generate_dataset [config.json]`
//!
//! Without an argument the default configuration is used (20000
//! trajectories, past/future horizons 20/20, sensor sigma 1.0). A JSON file
//! may override any subset of `DatasetConfig` fields.

use pancreas_dynamics::dataset::class_counts;
use pancreas_dynamics::{build_dataset, DatasetConfig, Result};

fn run() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => {
            println!("Loading configuration from {}", path);
            DatasetConfig::from_file(path)?
        }
        None => DatasetConfig::default(),
    };

    println!("Dataset Parameters:");
    println!("  Trajectories   = {}", config.n_points);
    println!("  Past horizon   = {}", config.past_horizon);
    println!("  Future horizon = {}", config.future_horizon);
    println!("  Noise sigma    = {:?}", config.noise_sigma);
    println!("  Spike threshold = {:.2}", config.label_threshold);

    println!("\nNeuron Parameters:");
    println!("  ε = {:.3}, a = {:.2}, b = {:.2}", config.neuron.epsilon, config.neuron.a, config.neuron.b);
    println!("  I_ext = {:.3} (I_c ≈ {:.4})", config.neuron.i_ext, config.neuron.theoretical_i_critical());
    println!("  σ = {:.3}, dt = {:.3} × {} substeps", config.neuron.noise_intensity, config.neuron.dt, config.neuron.substeps);

    println!("\nGenerating...");
    let dataset = build_dataset(&config)?;

    let counts = class_counts(dataset.labels(), dataset.metadata().n_classes);
    println!("\nLabels:");
    for (class, count) in counts.iter().enumerate() {
        let share = if dataset.is_empty() { 0.0 } else { *count as f64 / dataset.len() as f64 };
        println!("  class {}: {:6} ({:5.1}%)", class, count, 100.0 * share);
    }
    if let Some(seed) = dataset.metadata().seed {
        println!("  seed = {}", seed);
    }

    let path = dataset.save(&config.output_dir)?;
    println!("\nSaved to {}", path.display());
    Ok(())
}

fn main() {
    env_logger::init();

    println!("═══════════════════════════════════════════════════════════════");
    println!("  Stochastic Neuron Dataset Generation");
    println!("═══════════════════════════════════════════════════════════════\n");

    if let Err(err) = run() {
        log::error!("dataset generation failed: {}", err);
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}
