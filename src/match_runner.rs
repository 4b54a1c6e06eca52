//! The protocol engine: executes exactly one match end-to-end.
//!
//! A match spawns one referee and N player processes, then drives the
//! referee's framed command loop: buffering player input, relaying queried
//! players' answers back to the referee, and tracking running summaries,
//! until the referee emits its terminal `SCORES` block. The engine owns its
//! processes exclusively for the duration of the match; they are killed on
//! every exit path when the runner is dropped.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{anyhow, Context};
use thiserror::Error;
use tracing::debug;

use crate::configuration::Configuration;
use crate::process::{LineProcess, ReadLineError};
use crate::protocol::{Header, InputCommand, OutputCommand, SummaryLine};
use crate::seed::SeedProvider;
use crate::stats::FinalScoreVector;

/// Match-level failures.
///
/// A failed match is logged and dropped by its worker; it never aborts the
/// tournament or other in-flight matches, and its slot is not re-run.
#[derive(Debug, Error)]
pub enum MatchError {
    /// The referee broke the framing or payload contract.
    #[error("protocol violation: {0}")]
    Protocol(String),
    /// A process could not be spawned or written to, exited mid-protocol,
    /// or produced no output before its deadline.
    #[error("process fault: {0}")]
    Process(#[from] anyhow::Error),
}

/// Everything a single match execution needs, shared by all workers.
#[derive(Debug)]
pub(crate) struct MatchContext {
    pub referee_cmd: String,
    pub player_cmds: Vec<String>,
    pub config: Configuration,
    pub seeds: SeedProvider,
}

/// Run the match for `slot` and return its de-rotated score vector.
pub(crate) fn run_match(slot: usize, ctx: &MatchContext) -> Result<FinalScoreVector, MatchError> {
    let config = &ctx.config;
    let n = ctx.player_cmds.len();
    let log = MatchLog::open(slot, config.logs.as_deref())?;

    let referee = LineProcess::spawn("referee", &ctx.referee_cmd)?;

    let (seed, offset) = ctx.seeds.rotation_for(n);
    let rotation = if config.swap { offset } else { 0 };
    let mut players = Vec::with_capacity(n);
    for i in 0..n {
        // Physical slot i runs original player (i + rotation) % n.
        players.push(LineProcess::spawn(
            format!("player {i}"),
            &ctx.player_cmds[(i + rotation) % n],
        )?);
    }

    let runner = MatchRunner {
        referee,
        players,
        rotation,
        state: RoundState::new(n),
        log,
        config,
        seeds: &ctx.seeds,
    };
    runner.run(seed)
}

/// Map a referee-reported player index back to original player identity.
fn derotate(reported: usize, rotation: usize, player_count: usize) -> usize {
    (reported + rotation) % player_count
}

struct MatchRunner<'a> {
    referee: LineProcess,
    players: Vec<LineProcess>,
    rotation: usize,
    state: RoundState,
    log: MatchLog,
    config: &'a Configuration,
    seeds: &'a SeedProvider,
}

impl MatchRunner<'_> {
    fn run(mut self, seed: u64) -> Result<FinalScoreVector, MatchError> {
        self.init_referee(seed)?;

        loop {
            let header = self.read_header()?;
            if header.command() == OutputCommand::Scores {
                return self.read_final_scores(header.line_count);
            }
            self.drain_referee_errors();
            self.dispatch(&header)?;
        }
    }

    fn init_referee(&mut self, seed: u64) -> Result<(), MatchError> {
        self.log.line("Attempting to initialize referee");

        let seed_line = if self.config.swap {
            Some(format!("seed={seed}"))
        } else if self.seeds.repeatable() {
            Some(format!("seed={}", self.seeds.next_seed()))
        } else {
            None
        };

        let line_count = 1 + usize::from(seed_line.is_some());
        self.referee
            .write_line(&InputCommand::Init.frame(line_count))?;
        self.referee.write_line(&self.players.len().to_string())?;
        if let Some(line) = seed_line {
            self.referee.write_line(&line)?;
        }
        self.referee
            .write_line(&InputCommand::GetGameInfo.frame(0))?;
        Ok(())
    }

    fn dispatch(&mut self, header: &Header) -> Result<(), MatchError> {
        match header.command() {
            OutputCommand::Summary => self.absorb_summaries(header.line_count),
            OutputCommand::NextPlayerInput => {
                let lines = self.read_payload(header.line_count)?;
                self.state.absorb_player_input(&lines)
            }
            OutputCommand::NextPlayerInfo => self.relay_turn(header),
            // SCORES never reaches dispatch; the main loop exits on it first.
            OutputCommand::Scores => Ok(()),
            OutputCommand::Other => self.read_payload(header.line_count).map(|_| ()),
        }
    }

    fn absorb_summaries(&mut self, line_count: usize) -> Result<(), MatchError> {
        for _ in 0..line_count {
            let line = self.read_referee_line()?;
            match SummaryLine::parse(&line) {
                Some(summary) => self.state.update_summary(&summary)?,
                // Non-matching summary lines are transcript noise, not errors.
                None => self.log.line(&format!("Referee SUMMARY: {line}")),
            }
        }
        Ok(())
    }

    /// Handle NEXT_PLAYER_INFO: flush buffered input to the queried player,
    /// relay the announced number of answer lines back to the referee, then
    /// ask the referee for its next command.
    fn relay_turn(&mut self, header: &Header) -> Result<(), MatchError> {
        if header.line_count < 3 {
            return Err(MatchError::Protocol(format!(
                "expected at least 3 lines from NEXT_PLAYER_INFO, got {}",
                header.line_count
            )));
        }
        let target = self.read_referee_index()?;
        let expected = self.read_referee_int()?.max(0) as usize;
        let budget_ms = self.read_referee_int()?;
        for _ in 3..header.line_count {
            self.read_referee_line()?;
        }

        if target >= self.players.len() {
            return Err(MatchError::Protocol(format!(
                "NEXT_PLAYER_INFO targets unknown player {target}"
            )));
        }

        let payload = self.state.assemble(target);
        self.log.line(&format!(
            "Flushing inputs to player {target} ({expected} line(s) expected within {budget_ms} ms):\n{payload}"
        ));
        self.players[target].write_text(&payload)?;
        self.referee
            .write_line(&InputCommand::SetPlayerOutput.frame(expected))?;

        self.drain_player_errors(target);
        for _ in 0..expected {
            let line = self.read_player_line(target)?;
            self.drain_player_errors(target);
            self.log.line(&format!("Player {target}: {line}"));
            self.referee.write_line(&line)?;
        }

        self.state.clear();
        self.referee
            .write_line(&InputCommand::GetGameInfo.frame(0))?;
        Ok(())
    }

    fn read_final_scores(mut self, line_count: usize) -> Result<FinalScoreVector, MatchError> {
        let n = self.players.len();
        let mut scores = vec![0i64; n];
        for _ in 0..line_count {
            let line = self.read_referee_line()?;
            let mut parts = line.split_whitespace();
            let reported: usize = parts
                .next()
                .and_then(|t| t.parse().ok())
                .ok_or_else(|| MatchError::Protocol(format!("malformed score line: {line:?}")))?;
            let score: i64 = parts
                .next()
                .and_then(|t| t.parse().ok())
                .ok_or_else(|| MatchError::Protocol(format!("malformed score line: {line:?}")))?;
            let original = derotate(reported, self.rotation, n);
            self.log.line(&format!("Referee: {original} {score}"));
            scores[original] = score;
        }
        Ok(FinalScoreVector(scores))
    }

    fn read_header(&mut self) -> Result<Header, MatchError> {
        let line = self.read_referee_line()?;
        let header = Header::parse(&line).ok_or_else(|| {
            MatchError::Protocol(format!("malformed header from referee: {line:?}"))
        })?;
        self.log.line(&format!("Referee: {line}"));
        Ok(header)
    }

    fn read_payload(&mut self, line_count: usize) -> Result<Vec<String>, MatchError> {
        (0..line_count).map(|_| self.read_referee_line()).collect()
    }

    fn read_referee_line(&mut self) -> Result<String, MatchError> {
        match self.referee.read_line(self.config.referee_timeout) {
            Ok(line) => Ok(line),
            Err(ReadLineError::TimedOut) => Err(MatchError::Process(anyhow!(
                "referee produced no output within {:?}",
                self.config.referee_timeout
            ))),
            Err(ReadLineError::Closed) => {
                Err(MatchError::Process(anyhow!("referee exited mid-protocol")))
            }
        }
    }

    fn read_referee_int(&mut self) -> Result<i64, MatchError> {
        let line = self.read_referee_line()?;
        line.trim().parse().map_err(|_| {
            MatchError::Protocol(format!("expected an integer from referee, got {line:?}"))
        })
    }

    fn read_referee_index(&mut self) -> Result<usize, MatchError> {
        let value = self.read_referee_int()?;
        usize::try_from(value)
            .map_err(|_| MatchError::Protocol(format!("negative player index {value}")))
    }

    fn read_player_line(&mut self, player: usize) -> Result<String, MatchError> {
        match self.players[player].read_line(self.config.player_timeout) {
            Ok(line) => Ok(line),
            Err(ReadLineError::TimedOut) => Err(MatchError::Process(anyhow!(
                "player {player} produced no output within {:?}",
                self.config.player_timeout
            ))),
            Err(ReadLineError::Closed) => Err(MatchError::Process(anyhow!(
                "player {player} exited mid-protocol"
            ))),
        }
    }

    fn drain_referee_errors(&mut self) {
        for line in self.referee.drain_stderr() {
            self.log.line(&format!("Referee error: {line}"));
        }
    }

    fn drain_player_errors(&mut self, player: usize) {
        for line in self.players[player].drain_stderr() {
            self.log.line(&format!("Player {player} error: {line}"));
        }
    }
}

/// Per-match mutable accumulator: the two pending input buffers and the
/// running per-player summaries. Created fresh at match start, cleared at
/// defined points, discarded at match end.
struct RoundState {
    init_input: String,
    turn_input: String,
    summaries: Vec<PlayerSummary>,
}

#[derive(Debug, Default, Clone, Copy)]
struct PlayerSummary {
    score: i64,
    magic: i64,
}

impl RoundState {
    fn new(player_count: usize) -> RoundState {
        RoundState {
            init_input: String::new(),
            turn_input: String::new(),
            summaries: vec![PlayerSummary::default(); player_count],
        }
    }

    /// Route a NEXT_PLAYER_INPUT payload into the right buffer: a first line
    /// below 2 marks one-time initialization input, anything else is per-turn
    /// input. All payload lines follow the first into the chosen buffer.
    fn absorb_player_input(&mut self, lines: &[String]) -> Result<(), MatchError> {
        let Some(first) = lines.first() else {
            return Ok(());
        };
        let flag: i64 = first.trim().parse().map_err(|_| {
            MatchError::Protocol(format!("bad NEXT_PLAYER_INPUT first line: {first:?}"))
        })?;
        let buffer = if flag < 2 {
            &mut self.init_input
        } else {
            &mut self.turn_input
        };
        for line in lines {
            buffer.push_str(line);
            buffer.push('\n');
        }
        Ok(())
    }

    fn update_summary(&mut self, summary: &SummaryLine) -> Result<(), MatchError> {
        let slot = self.summaries.get_mut(summary.player).ok_or_else(|| {
            MatchError::Protocol(format!("summary for unknown player {}", summary.player))
        })?;
        slot.score = summary.score;
        slot.magic = summary.magic;
        Ok(())
    }

    /// Assemble the stdin payload for `player`: pending init input, then the
    /// score/magic summary of the player and of the next one in rotation
    /// order, then the pending turn input.
    fn assemble(&self, player: usize) -> String {
        let mut text = String::new();
        if !self.init_input.is_empty() {
            text.push_str(&self.init_input);
        }
        let me = self.summaries[player];
        let next = self.summaries[(player + 1) % self.summaries.len()];
        text.push_str(&format!("{} {}\n", me.score, me.magic));
        text.push_str(&format!("{} {}\n", next.score, next.magic));
        text.push_str(&self.turn_input);
        text
    }

    fn clear(&mut self) {
        self.init_input.clear();
        self.turn_input.clear();
    }
}

/// Per-match protocol transcript, one file per match slot when enabled.
struct MatchLog {
    slot: usize,
    writer: Option<BufWriter<File>>,
}

impl MatchLog {
    fn open(slot: usize, dir: Option<&Path>) -> anyhow::Result<MatchLog> {
        let writer = match dir {
            Some(dir) => {
                let path = dir.join(format!("game{slot}.log"));
                let file = File::create(&path)
                    .with_context(|| format!("could not create match log {}", path.display()))?;
                Some(BufWriter::new(file))
            }
            None => None,
        };
        Ok(MatchLog { slot, writer })
    }

    fn line(&mut self, message: &str) {
        debug!(game = self.slot, "{message}");
        if let Some(writer) = &mut self.writer {
            let _ = writeln!(writer, "{message}");
        }
    }
}


#[cfg(test)]
mod derotation_tests {
    use super::derotate;

    #[test]
    fn identity_without_rotation() {
        assert_eq!(derotate(0, 0, 2), 0);
        assert_eq!(derotate(1, 0, 2), 1);
    }

    #[test]
    fn maps_reported_indices_back_to_original_identity() {
        // Rotation offset 1 with 2 players: reported 0 is original player 1.
        assert_eq!(derotate(0, 1, 2), 1);
        assert_eq!(derotate(1, 1, 2), 0);
    }

    #[test]
    fn wraps_for_larger_rotations() {
        assert_eq!(derotate(2, 2, 3), 1);
        assert_eq!(derotate(0, 2, 3), 2);
    }
}
