//! Config for the arena behaviors
//!
//! This module provides configuration options for controlling how a tournament
//! is executed: how many matches run, how many run concurrently, how matches
//! are seeded, and how strict the per-process read deadlines are.
//!
//! Configuration can be created programmatically using [`Configuration::new()`]
//! or by reading environment variables using [`Configuration::from_env()`].
//!
//! # Environment Variables
//!
//! The following environment variables can be used to override configuration
//! values. All values are optional; flags are case-insensitive and enabled by
//! setting the value to `"true"`.
//!
//! - `ARENA_GAMES` — Total number of matches to run (default: `1`)
//! - `ARENA_THREADS` — Number of concurrent workers (default: CPU count)
//! - `ARENA_SWAP` — Rotate player order between matches (default: `false`)
//! - `ARENA_SEED` — Initial seed; enables repeatable matches when set
//! - `ARENA_LOGS` — Directory receiving one protocol log per match
//! - `ARENA_PLAYER_TIMEOUT_MS` — Per-turn deadline for player output (default: `1000`)
//! - `ARENA_REFEREE_TIMEOUT_MS` — Deadline for referee output (default: `10000`)
//! - `ARENA_VERBOSE` — Log per-match results as they complete (default: `true`)
//! - `ARENA_LOG` — Write a tournament log file (default: `false`)

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for tournament execution.
#[derive(Debug, Clone)]
pub struct Configuration {
    pub(crate) games: usize,
    pub(crate) threads: usize,
    pub(crate) swap: bool,
    pub(crate) initial_seed: Option<u64>,
    pub(crate) logs: Option<PathBuf>,
    pub(crate) player_timeout: Duration,
    pub(crate) referee_timeout: Duration,
    pub(crate) verbose: bool,
    pub(crate) log: bool,
}

impl Configuration {
    /// Create a new configuration with default parameters.
    ///
    /// By default:
    /// - A single match is run.
    /// - One worker per available CPU.
    /// - Player order is not rotated between matches.
    /// - Matches are not seeded (referees pick their own randomness).
    /// - Per-match protocol logs are disabled.
    /// - Players get one second to answer a turn, referees ten seconds per line.
    /// - Per-match results are logged as they complete.
    /// - Logging to file is disabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            games: 1,
            threads: num_cpus::get(),
            swap: false,
            initial_seed: None,
            logs: None,
            player_timeout: Duration::from_secs(1),
            referee_timeout: Duration::from_secs(10),
            verbose: true,
            log: false,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// See the module documentation for the recognized variables. Any other
    /// value (including unset) will result in using the default value for
    /// each field.
    #[must_use]
    pub fn from_env() -> Self {
        fn get_env_flag(var: &str, default: bool) -> bool {
            match std::env::var(var) {
                Ok(val) => val.eq_ignore_ascii_case("true"),
                Err(_) => default,
            }
        }

        fn get_env_parsed<T: std::str::FromStr>(var: &str) -> Option<T> {
            std::env::var(var).ok()?.parse().ok()
        }

        let defaults = Self::new();
        Self {
            games: get_env_parsed("ARENA_GAMES").unwrap_or(defaults.games),
            threads: get_env_parsed("ARENA_THREADS").unwrap_or(defaults.threads),
            swap: get_env_flag("ARENA_SWAP", defaults.swap),
            initial_seed: get_env_parsed("ARENA_SEED"),
            logs: std::env::var("ARENA_LOGS").ok().map(PathBuf::from),
            player_timeout: get_env_parsed("ARENA_PLAYER_TIMEOUT_MS")
                .map_or(defaults.player_timeout, Duration::from_millis),
            referee_timeout: get_env_parsed("ARENA_REFEREE_TIMEOUT_MS")
                .map_or(defaults.referee_timeout, Duration::from_millis),
            verbose: get_env_flag("ARENA_VERBOSE", defaults.verbose),
            log: get_env_flag("ARENA_LOG", defaults.log),
        }
    }

    /// Set the total number of matches to run.
    pub fn with_games(mut self, value: usize) -> Self {
        self.games = value;
        self
    }

    /// Set the number of concurrent workers.
    pub fn with_threads(mut self, value: usize) -> Self {
        self.threads = value;
        self
    }

    /// Enable or disable player-order rotation between matches.
    ///
    /// When enabled, each match draws a rotation offset and the physical
    /// player processes are shifted through the logical slots; reported
    /// scores are mapped back to original player identity.
    pub fn with_swap(mut self, value: bool) -> Self {
        self.swap = value;
        self
    }

    /// Seed the provider so that every match receives a deterministic
    /// `seed=<n>` line, making runs repeatable.
    pub fn with_initial_seed(mut self, value: u64) -> Self {
        self.initial_seed = Some(value);
        self
    }

    /// Write one protocol transcript per match into the given directory.
    pub fn with_logs(mut self, value: impl Into<PathBuf>) -> Self {
        self.logs = Some(value.into());
        self
    }

    /// Set the per-turn deadline for player output.
    pub fn with_player_timeout(mut self, value: Duration) -> Self {
        self.player_timeout = value;
        self
    }

    /// Set the deadline for each line of referee output.
    pub fn with_referee_timeout(mut self, value: Duration) -> Self {
        self.referee_timeout = value;
        self
    }

    /// Enable or disable per-match result logging.
    pub fn with_verbose(mut self, value: bool) -> Self {
        self.verbose = value;
        self
    }

    /// Enable or disable logging to file.
    pub fn with_log(mut self, value: bool) -> Self {
        self.log = value;
        self
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new()
    }
}
