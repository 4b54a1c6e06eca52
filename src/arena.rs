//! Tournament orchestration: the worker pool around the match engine.
//!
//! This module defines the [`Arena`] type, which owns a tournament run.
//! Its responsibilities include:
//!
//! - Spawning one worker thread per configured parallelism level
//! - Distributing match slots to workers through a shared claim counter
//! - Collecting final score vectors into a shared [`ScoreBoard`]
//! - Returning the aggregated [`TournamentReport`] once every slot ran
//!
//! # Behavior & Configuration
//!
//! Behavior is controlled by a [`Configuration`] object: total match count,
//! worker count, swap mode, seeding, per-process read deadlines and logging.
//!
//! Workers share only the claim counter and the score board, both internally
//! synchronized; everything belonging to one match (the referee and player
//! processes, the protocol state) is owned by exactly one worker for the
//! duration of that match.
//!
//! A failed match is logged with its match identity and contributes no score
//! vector; the worker moves on to the next slot. The tournament always
//! terminates once all slots are claimed and all workers have finished,
//! regardless of how many matches failed.
//!
//! # Example
//!
//! See crate-level documentation for an example of running an [`Arena`].

use std::sync::Arc;
use std::thread;

use anyhow::{ensure, Context};
use tracing::{error, info, trace};

use crate::configuration::Configuration;
use crate::logger::init_logger;
use crate::match_runner::{run_match, MatchContext};
use crate::scheduler::WorkScheduler;
use crate::seed::SeedProvider;
use crate::stats::{ScoreBoard, TournamentReport};

/// The main type for running bot tournaments.
///
/// An arena holds the referee and player command lines plus a
/// [`Configuration`]; [`Arena::run`] executes every scheduled match and
/// blocks until all of them have been attempted.
pub struct Arena {
    ctx: Arc<MatchContext>,
}

impl Arena {
    /// Create an [`Arena`] for one referee and its player commands.
    ///
    /// Command lines are split on whitespace when matches spawn them, exactly
    /// one referee and one process per player for every match.
    pub fn new(
        referee_cmd: impl Into<String>,
        player_cmds: Vec<String>,
        config: Configuration,
    ) -> Arena {
        if config.log {
            init_logger();
        }
        trace!(?config);

        let seeds = SeedProvider::new(config.initial_seed);
        Arena {
            ctx: Arc::new(MatchContext {
                referee_cmd: referee_cmd.into(),
                player_cmds,
                config,
                seeds,
            }),
        }
    }

    /// Run every scheduled match and return the aggregated report.
    ///
    /// Blocks until all configured match slots have been attempted. Failed
    /// matches are logged and recorded nowhere; they still consume their slot.
    ///
    /// # Errors
    /// Returns an error if no player command was given, the logs directory
    /// cannot be created, or a worker thread cannot be spawned.
    pub fn run(&self) -> anyhow::Result<TournamentReport> {
        let config = &self.ctx.config;
        ensure!(!self.ctx.player_cmds.is_empty(), "no player command given");
        if let Some(dir) = &config.logs {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("could not create logs directory {}", dir.display()))?;
        }

        let scheduler = Arc::new(WorkScheduler::new(config.games));
        let board = Arc::new(ScoreBoard::new(self.ctx.player_cmds.len()));

        // More workers than matches would only spawn idle threads.
        let workers = config.threads.clamp(1, config.games.max(1));
        let mut handles = Vec::with_capacity(workers);
        for id in 0..workers {
            let ctx = self.ctx.clone();
            let scheduler = scheduler.clone();
            let board = board.clone();
            let handle = thread::Builder::new()
                .name(format!("match-worker-{id}"))
                .spawn(move || worker_loop(&ctx, &scheduler, &board))
                .context("could not spawn worker thread")?;
            handles.push(handle);
        }
        for handle in handles {
            if handle.join().is_err() {
                error!("a worker thread panicked");
            }
        }

        Ok(board.report())
    }
}

/// Claim match slots until the scheduler is exhausted. Joining this worker
/// is the completion signal for its share of the tournament.
fn worker_loop(ctx: &MatchContext, scheduler: &WorkScheduler, board: &ScoreBoard) {
    while let Some(slot) = scheduler.claim() {
        match run_match(slot, ctx) {
            Ok(scores) => {
                board.record(&scores);
                if ctx.config.verbose {
                    info!(game = slot, "end of game: {}", board.report());
                }
            }
            Err(e) => error!(game = slot, "match failed: {e}"),
        }
    }
}
