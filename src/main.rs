//! flappy-evolve - watch a population of birds learn to fly.
//!
//! Usage:
//!   flappy-evolve [train] [OPTIONS]     # Evolve birds in the terminal
//!   flappy-evolve play FILE             # Replay a saved genome

use flappy_evolve::constants::LOG_FILE;
use flappy_evolve::persistence::GenomeStore;
use flappy_evolve::training::{replay, run_training, TrainConfig};
use flappy_evolve::ui::TerminalFrontend;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

enum Command {
    Train(TrainConfig),
    Play { genome: PathBuf, config: TrainConfig },
}

fn main() -> io::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    let command = match parse_args(&args) {
        Ok(command) => command,
        Err(msg) => {
            eprintln!("{}", msg);
            eprintln!("Run 'flappy-evolve --help' for usage.");
            std::process::exit(1);
        }
    };

    match command {
        Command::Train(config) => train(config),
        Command::Play { genome, config } => play(&genome, &config),
    }
}

fn train(config: TrainConfig) -> io::Result<()> {
    init_logging(&config.output_dir);

    // The frontend lives inside the runner; the terminal is restored when the
    // run returns, before anything is printed.
    let frontend = TerminalFrontend::new(config.fps)?;
    let outcome = run_training(&config, frontend)?;

    println!("{}", outcome.report.to_text());
    if outcome.report.quit() {
        std::process::exit(0);
    }
    Ok(())
}

fn play(path: &Path, config: &TrainConfig) -> io::Result<()> {
    let genome = GenomeStore::load(path)?;
    init_logging(&config.output_dir);

    let mut frontend = TerminalFrontend::new(config.fps)?;
    let seed = config.seed.unwrap_or_else(rand::random);
    let summary = replay(
        &genome,
        &config.neat,
        config.episode_settings(),
        &mut frontend,
        seed,
    );
    frontend.restore()?;

    println!(
        "Genome #{} finished with score {} after {} ticks ({:?})",
        genome.key, summary.score, summary.ticks, summary.status
    );
    Ok(())
}

/// Route log output to a file in the output directory so it doesn't tear
/// up the terminal view.
fn init_logging(output_dir: &Path) {
    let file = fs::create_dir_all(output_dir).and_then(|_| fs::File::create(output_dir.join(LOG_FILE)));
    match file {
        Ok(file) => {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
                .target(env_logger::Target::Pipe(Box::new(file)))
                .init();
        }
        Err(e) => eprintln!("Warning: could not open {}: {}", LOG_FILE, e),
    }
}

fn parse_args(args: &[String]) -> Result<Command, String> {
    // The config file is the base layer; flags override it wherever they appear.
    let mut config = match args.iter().position(|a| a == "-c" || a == "--config") {
        Some(i) => {
            let path = args
                .get(i + 1)
                .ok_or_else(|| "--config needs a file".to_string())?;
            TrainConfig::load(Path::new(path))
                .map_err(|e| format!("Failed to load config '{}': {}", path, e))?
        }
        None => TrainConfig::default(),
    };

    let mut play_file: Option<PathBuf> = None;
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "train" if i == 1 => {}
            "play" if i == 1 => {
                let file = args.get(i + 1).ok_or_else(|| "play needs a genome file".to_string())?;
                play_file = Some(PathBuf::from(file));
                i += 1;
            }
            "-g" | "--generations" => {
                config.generations = flag_value(args, i)?;
                i += 1;
            }
            "-p" | "--population" => {
                config.neat.pop_size = flag_value(args, i)?;
                i += 1;
            }
            "-s" | "--seed" => {
                config.seed = Some(flag_value(args, i)?);
                i += 1;
            }
            "-o" | "--output" => {
                config.output_dir = PathBuf::from(flag_value::<String>(args, i)?);
                i += 1;
            }
            "--fps" => {
                config.fps = flag_value(args, i)?;
                i += 1;
            }
            "-c" | "--config" => {
                i += 1;
            }
            "--version" | "-V" => {
                println!("flappy-evolve {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            other => return Err(format!("Unknown argument: {}", other)),
        }
        i += 1;
    }

    match play_file {
        Some(genome) => Ok(Command::Play { genome, config }),
        None => {
            config.validate().map_err(|e| e.to_string())?;
            Ok(Command::Train(config))
        }
    }
}

fn flag_value<T: std::str::FromStr>(args: &[String], i: usize) -> Result<T, String> {
    let raw = args
        .get(i + 1)
        .ok_or_else(|| format!("{} needs a value", args[i]))?;
    raw.parse()
        .map_err(|_| format!("Invalid value for {}: {}", args[i], raw))
}

fn print_help() {
    println!("flappy-evolve - neuroevolution playing Flappy Bird\n");
    println!("USAGE:");
    println!("    flappy-evolve [train] [OPTIONS]");
    println!("    flappy-evolve play FILE [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -g, --generations <N>   Generations to evolve (default: 50)");
    println!("    -p, --population <N>    Genomes per generation (default: 50)");
    println!("    -s, --seed <S>          Random seed for reproducibility");
    println!("    -c, --config <FILE>     JSON training config");
    println!("    -o, --output <DIR>      Where genomes and the log go (default: .)");
    println!("    --fps <N>               Frame rate, 0 = as fast as possible (default: 30)");
    println!("    -V, --version           Show version information");
    println!("    -h, --help              Show this help");
    println!();
    println!("Press q or Esc while training to save the best live bird to");
    println!("best.genome and exit. A run that finishes saves best_model.genome.");
}
