//! Command line front end for the arena.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use bot_arena::prelude::*;

/// Run referee-driven bot matches concurrently and aggregate their scores.
#[derive(Parser, Debug)]
#[command(name = "arena", version, about)]
struct Args {
    /// Referee command line, spawned once per match
    #[arg(short, long)]
    referee: String,

    /// Player command line, repeated once per player
    #[arg(short, long = "player", required = true)]
    players: Vec<String>,

    /// Number of matches to run
    #[arg(short = 'n', long, default_value_t = 1)]
    games: usize,

    /// Number of concurrent workers (defaults to the CPU count)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Rotate player order between matches
    #[arg(short, long)]
    swap: bool,

    /// Initial seed, making match seeds repeatable
    #[arg(long)]
    seed: Option<u64>,

    /// Directory receiving one protocol transcript per match
    #[arg(short, long)]
    logs: Option<PathBuf>,

    /// Per-turn deadline for player output, in milliseconds
    #[arg(long, default_value_t = 1000)]
    player_timeout_ms: u64,

    /// Deadline for each line of referee output, in milliseconds
    #[arg(long, default_value_t = 10_000)]
    referee_timeout_ms: u64,

    /// Do not log per-match results as they complete
    #[arg(short, long)]
    quiet: bool,

    /// Also write a tournament log file in the working directory
    #[arg(long)]
    log_file: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = Configuration::new()
        .with_games(args.games)
        .with_swap(args.swap)
        .with_player_timeout(Duration::from_millis(args.player_timeout_ms))
        .with_referee_timeout(Duration::from_millis(args.referee_timeout_ms))
        .with_verbose(!args.quiet)
        .with_log(args.log_file);
    if let Some(threads) = args.threads {
        config = config.with_threads(threads);
    }
    if let Some(seed) = args.seed {
        config = config.with_initial_seed(seed);
    }
    if let Some(logs) = args.logs {
        config = config.with_logs(logs);
    }

    let arena = Arena::new(args.referee, args.players, config);
    let report = arena.run()?;
    println!("{report}");
    Ok(())
}
