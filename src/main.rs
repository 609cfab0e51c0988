use std::path::PathBuf;

use clap::Parser;

use dino_ai::app::App;
use dino_ai::config::SimConfig;
use dino_ai::error::ConfigError;

/// Headless dinosaur AI simulation.
///
/// Spawns a herd of creatures and a few wandering players, then steps the
/// perception, behavior and steering systems at a fixed rate, logging
/// periodic stats. Set `RUST_LOG=debug` to see every state transition.
#[derive(Parser, Debug)]
#[command(name = "dino-ai")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON config file; missing keys use defaults
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of ticks to simulate
    #[arg(short, long, default_value_t = 1200)]
    ticks: u64,

    /// Override the number of creatures
    #[arg(long)]
    creatures: Option<usize>,

    /// Override the number of players
    #[arg(long)]
    players: Option<usize>,

    /// RNG seed (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Start with the world-wide threat alarm raised
    #[arg(long)]
    elevated_threat: bool,

    /// Print the default config as JSON and exit
    #[arg(long)]
    dump_config: bool,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if cli.dump_config {
        match SimConfig::default().to_json_pretty() {
            Ok(json) => println!("{json}"),
            Err(e) => {
                log::error!("Fatal error: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    log::info!("dino-ai starting up");
    if let Err(e) = run(cli) {
        log::error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), ConfigError> {
    let mut config = match &cli.config {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    if let Some(creatures) = cli.creatures {
        config.world.creatures = creatures;
    }
    if let Some(players) = cli.players {
        config.world.players = players;
    }

    let seed = cli.seed.unwrap_or_else(|| fastrand::u64(..));
    let mut app = App::new(config, seed)?;
    app.set_elevated_threat(cli.elevated_threat);
    app.run(cli.ticks);
    Ok(())
}
