//! Headless training CLI.
//!
//! Evolve birds as fast as the CPU allows, without a terminal view.
//!
//! Usage:
//!   cargo run --release --bin train -- [OPTIONS]
//!
//! Examples:
//!   cargo run --release --bin train                     # 50 generations of 50
//!   cargo run --release --bin train -- -g 10 -p 100     # 10 generations of 100
//!   cargo run --release --bin train -- --seed 42 --json # Reproducible, JSON report

use flappy_evolve::harness::HeadlessFrontend;
use flappy_evolve::persistence::save_json;
use flappy_evolve::training::{run_training, TrainConfig};
use std::env;
use std::path::{Path, PathBuf};

fn main() -> std::io::Result<()> {
    let args: Vec<String> = env::args().collect();
    let config = match parse_args(&args) {
        Ok(config) => config,
        Err(msg) => {
            eprintln!("{}", msg);
            std::process::exit(1);
        }
    };

    let default_filter = match config.verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    println!("╔═══════════════════════════════════════════════════════════════╗");
    println!("║                  FLAPPY-EVOLVE TRAINER                        ║");
    println!("╚═══════════════════════════════════════════════════════════════╝");
    println!();
    println!("Configuration:");
    println!("  Generations:    {}", config.generations);
    println!("  Population:     {}", config.neat.pop_size);
    println!("  Score Cap:      {}", config.score_cap);
    println!("  Fitness Goal:   {}", config.neat.fitness_threshold);
    if let Some(max_ticks) = config.max_ticks {
        println!("  Max Ticks:      {}", max_ticks);
    }
    if let Some(seed) = config.seed {
        println!("  Seed:           {}", seed);
    }
    println!("  Output:         {}", config.output_dir.display());
    println!();
    println!("Training...");
    println!();

    let outcome = run_training(&config, HeadlessFrontend::new())?;

    println!("{}", outcome.report.to_text());

    // Optionally save JSON report
    if args.iter().any(|a| a == "--json") {
        let filename = format!(
            "train_report_{}.json",
            chrono::Utc::now().format("%Y%m%d_%H%M%S")
        );
        let path = config.output_dir.join(filename);
        save_json(&path, &outcome.report)?;
        println!("JSON report saved to: {}", path.display());
    }
    Ok(())
}

fn parse_args(args: &[String]) -> Result<TrainConfig, String> {
    let mut config = TrainConfig::default();

    // Presets and the config file come first so flags can override them.
    if args.iter().any(|a| a == "--quick") {
        config = TrainConfig::quick();
    }
    if let Some(i) = args.iter().position(|a| a == "-c" || a == "--config") {
        let path = args
            .get(i + 1)
            .ok_or_else(|| "--config needs a file".to_string())?;
        config = TrainConfig::load(Path::new(path))
            .map_err(|e| format!("Failed to load config '{}': {}", path, e))?;
    }

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-g" | "--generations" => {
                if i + 1 < args.len() {
                    config.generations = args[i + 1].parse().unwrap_or(50);
                    i += 1;
                }
            }
            "-p" | "--population" => {
                if i + 1 < args.len() {
                    config.neat.pop_size = args[i + 1].parse().unwrap_or(50);
                    i += 1;
                }
            }
            "-s" | "--seed" => {
                if i + 1 < args.len() {
                    config.seed = args[i + 1].parse().ok();
                    i += 1;
                }
            }
            "-o" | "--output" => {
                if i + 1 < args.len() {
                    config.output_dir = PathBuf::from(&args[i + 1]);
                    i += 1;
                }
            }
            "-t" | "--max-ticks" => {
                if i + 1 < args.len() {
                    config.max_ticks = args[i + 1].parse().ok();
                    i += 1;
                }
            }
            "-c" | "--config" => {
                i += 1;
            }
            "-v" | "--verbose" => {
                config.verbosity = 2;
            }
            "-q" | "--quiet" => {
                config.verbosity = 0;
            }
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            _ => {}
        }
        i += 1;
    }

    config.validate().map_err(|e| format!("Invalid configuration: {}", e))?;
    Ok(config)
}

fn print_help() {
    println!("Flappy-Evolve Headless Trainer");
    println!();
    println!("USAGE:");
    println!("    cargo run --release --bin train -- [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -g, --generations <N>   Generations to evolve (default: 50)");
    println!("    -p, --population <N>    Genomes per generation (default: 50)");
    println!("    -s, --seed <S>          Random seed for reproducibility");
    println!("    -c, --config <FILE>     JSON training config");
    println!("    -o, --output <DIR>      Where genomes and reports go (default: .)");
    println!("    -t, --max-ticks <T>     Tick limit per episode");
    println!("    -v, --verbose           Log the species table every generation");
    println!("    -q, --quiet             Only log warnings");
    println!("    --json                  Save JSON report");
    println!("    --quick                 Quick run (5 generations of 20)");
    println!("    -h, --help              Show this help");
    println!();
    println!("EXAMPLES:");
    println!("    cargo run --release --bin train -- -g 10 -p 100");
    println!("    cargo run --release --bin train -- --seed 42 --json");
    println!("    cargo run --release --bin train -- --quick -v");
}
