//! # Bot Arena
//!
//! A concurrent harness for running isolated matches between a referee process and N bot processes, mediating a line-oriented text protocol and aggregating scores across many matches run in parallel.
//!
//! It provides:
//! - Match execution driven by the referee's framed command protocol (`Arena`)
//! - Shared-counter work distribution across a configurable worker pool
//! - Player-order rotation ("swap mode") with de-rotated score reporting
//! - Per-match protocol transcripts and aggregate win/draw/loss statistics
//!
//! Each match consists of one referee and one process per player, all spawned
//! fresh and torn down when the match ends, successfully or not. A failed
//! match never aborts the tournament: it is logged, contributes no score, and
//! its slot is not re-run.
//!
//! # Documentation Overview
//!
//! - For tournament execution and the worker model, see the [`arena`] module.
//! - For configuring match counts, parallelism, seeding and deadlines, see
//!   [`Configuration`](crate::configuration::Configuration).
//! - For the wire grammar spoken with the referee, see the [`protocol`] module.
//! - For the aggregated results, see [`stats`].
//!
//! # Usage Example
//!
//! ```no_run
//! use bot_arena::prelude::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Configuration::new()
//!         .with_games(100)
//!         .with_threads(4)
//!         .with_swap(true)
//!         .with_logs("logs");
//!
//!     let arena = Arena::new(
//!         "java -jar referee.jar",
//!         vec!["./bot_a".to_string(), "./bot_b --depth 3".to_string()],
//!         config,
//!     );
//!
//!     let report = arena.run()?;
//!     println!("{report}");
//!     Ok(())
//! }
//! ```
//!
//! # Referee Protocol
//!
//! The referee speaks a framed, line-oriented text protocol on its standard
//! streams. Every transmission starts with a `[[<COMMAND>] <lineCount>]`
//! header announcing how many payload lines follow.
//!
//! Engine → referee: `INIT` (player count, optional `seed=<n>` line),
//! `GET_GAME_INFO` (zero payload), `SET_PLAYER_OUTPUT` (count of player
//! lines about to be forwarded).
//!
//! Referee → engine: `SUMMARY` (per-player `$<p> Score: <s> | Magic: <m>`
//! lines), `NEXT_PLAYER_INPUT` (lines to buffer for the next queried
//! player), `NEXT_PLAYER_INFO` (which player to query, how many lines it
//! must answer, its time budget), `SCORES` (terminal, `<player> <score>`
//! lines), and anything else (`VIEW`, `INFOS`, `TOOLTIP`, `UINPUT`, ...)
//! which is consumed by line count and discarded.
//!
//! Player processes receive raw text on stdin and answer on stdout; the
//! engine relays their lines verbatim and never interprets their content.
//!
//! ## Player Requirements
//!
//! - Answer exactly the number of lines the referee announced, within the
//!   configured per-turn deadline
//! - Read everything from stdin, write answers to stdout, diagnostics to
//!   stderr (forwarded into the match transcript)
#![warn(missing_docs)]

pub use anyhow;

pub mod arena;
pub mod configuration;
mod logger;
mod match_runner;
mod process;
pub mod protocol;
mod scheduler;
mod seed;
pub mod stats;

pub use match_runner::MatchError;

/// Commonly used types for quick access.
///
/// Import this prelude to get started easily:
/// ```rust
/// use bot_arena::prelude::*;
/// ```
///
/// Includes:
/// - [`Arena`](crate::arena::Arena)
/// - [`Configuration`](crate::configuration::Configuration)
/// - [`TournamentReport`](crate::stats::TournamentReport) and
///   [`PlayerRecord`](crate::stats::PlayerRecord)
pub mod prelude {
    pub use crate::arena::Arena;
    pub use crate::configuration::Configuration;
    pub use crate::stats::{PlayerRecord, TournamentReport};
}
