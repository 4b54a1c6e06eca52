//! Wire grammar spoken between the engine and the referee.
//!
//! Every transmission starts with a header frame `[[<COMMAND>] <lineCount>]`
//! announcing how many payload lines follow. The engine sends the commands in
//! [`InputCommand`]; referee output is classified by [`OutputCommand`], and
//! anything the engine does not recognize is consumed by line count and
//! discarded so newer referees keep working against older harnesses.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref HEADER_PATTERN: Regex =
        Regex::new(r"^\[\[(?P<cmd>.+)\] ?(?P<count>[0-9]+)\]$").expect("invalid header pattern");
    static ref SUMMARY_PATTERN: Regex =
        Regex::new(r"^\$(?P<player>\d+) Score: (?P<score>\d+) \| Magic: (?P<magic>\d+)$")
            .expect("invalid summary pattern");
}

/// Commands sent by the engine to the referee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputCommand {
    /// Opens a match: player count plus an optional `seed=<n>` line.
    Init,
    /// Asks the referee for its next command block. Zero payload lines.
    GetGameInfo,
    /// Announces how many player lines the engine is about to forward.
    SetPlayerOutput,
}

impl InputCommand {
    fn name(self) -> &'static str {
        match self {
            InputCommand::Init => "INIT",
            InputCommand::GetGameInfo => "GET_GAME_INFO",
            InputCommand::SetPlayerOutput => "SET_PLAYER_OUTPUT",
        }
    }

    /// Render this command as a header frame announcing `line_count` payload lines.
    pub fn frame(self, line_count: usize) -> String {
        format!("[[{}] {}]", self.name(), line_count)
    }
}

/// Classification of a referee header.
///
/// `VIEW`, `INFOS`, `TOOLTIP`, `UINPUT` and any future command all land in
/// [`OutputCommand::Other`]: their payload is read and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputCommand {
    /// Per-player `$<p> Score: <s> | Magic: <m>` running summaries.
    Summary,
    /// Raw lines to buffer for the next queried player.
    NextPlayerInput,
    /// Which player to query, how many lines it must answer, its time budget.
    NextPlayerInfo,
    /// Terminal command carrying the final score lines.
    Scores,
    /// Unrecognized command, consumed by line count.
    Other,
}

impl OutputCommand {
    /// Classify a header command token.
    pub fn classify(name: &str) -> OutputCommand {
        match name {
            "SUMMARY" => OutputCommand::Summary,
            "NEXT_PLAYER_INPUT" => OutputCommand::NextPlayerInput,
            "NEXT_PLAYER_INFO" => OutputCommand::NextPlayerInfo,
            "SCORES" => OutputCommand::Scores,
            _ => OutputCommand::Other,
        }
    }
}

/// A parsed `[[<COMMAND>] <lineCount>]` header frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Command token, kept verbatim so unknown commands stay loggable.
    pub command: String,
    /// Number of payload lines that immediately follow the header.
    pub line_count: usize,
}

impl Header {
    /// Parse one referee line as a header frame.
    ///
    /// Returns `None` when the line does not match the grammar; the caller
    /// treats that as a fatal protocol violation for the current match.
    pub fn parse(line: &str) -> Option<Header> {
        let caps = HEADER_PATTERN.captures(line)?;
        Some(Header {
            command: caps.name("cmd")?.as_str().to_string(),
            line_count: caps.name("count")?.as_str().parse().ok()?,
        })
    }

    /// Classification of this header's command token.
    pub fn command(&self) -> OutputCommand {
        OutputCommand::classify(&self.command)
    }
}

/// A `$<player> Score: <score> | Magic: <magic>` line from a SUMMARY payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryLine {
    /// Logical player index the summary refers to.
    pub player: usize,
    /// Running score reported by the referee.
    pub score: i64,
    /// Running magic value reported by the referee.
    pub magic: i64,
}

impl SummaryLine {
    /// Parse a SUMMARY payload line.
    ///
    /// A `None` is not an error: non-matching lines are logged verbatim and
    /// otherwise ignored.
    pub fn parse(line: &str) -> Option<SummaryLine> {
        let caps = SUMMARY_PATTERN.captures(line)?;
        Some(SummaryLine {
            player: caps.name("player")?.as_str().parse().ok()?,
            score: caps.name("score")?.as_str().parse().ok()?,
            magic: caps.name("magic")?.as_str().parse().ok()?,
        })
    }
}

#[cfg(test)]
mod protocol_tests {
    use super::*;

    #[test]
    fn parses_well_formed_header() {
        let header = Header::parse("[[SCORES] 2]").unwrap();
        assert_eq!(header.command, "SCORES");
        assert_eq!(header.line_count, 2);
        assert_eq!(header.command(), OutputCommand::Scores);
    }

    #[test]
    fn parses_header_without_separating_space() {
        let header = Header::parse("[[GET_GAME_INFO]0]").unwrap();
        assert_eq!(header.command, "GET_GAME_INFO");
        assert_eq!(header.line_count, 0);
    }

    #[test]
    fn rejects_malformed_headers() {
        assert_eq!(Header::parse("[[INVALID"), None);
        assert_eq!(Header::parse("[[NO_COUNT] ]"), None);
        assert_eq!(Header::parse("[[X] -1]"), None);
        assert_eq!(Header::parse("plain text"), None);
    }

    #[test]
    fn unknown_commands_are_classified_as_other() {
        let header = Header::parse("[[TOOLTIP] 4]").unwrap();
        assert_eq!(header.command(), OutputCommand::Other);
        assert_eq!(OutputCommand::classify("VIEW"), OutputCommand::Other);
        assert_eq!(OutputCommand::classify("BRAND_NEW"), OutputCommand::Other);
    }

    #[test]
    fn formats_engine_commands() {
        assert_eq!(InputCommand::Init.frame(2), "[[INIT] 2]");
        assert_eq!(InputCommand::GetGameInfo.frame(0), "[[GET_GAME_INFO] 0]");
        assert_eq!(
            InputCommand::SetPlayerOutput.frame(4),
            "[[SET_PLAYER_OUTPUT] 4]"
        );
    }

    #[test]
    fn engine_frames_parse_back_as_headers() {
        let header = Header::parse(&InputCommand::SetPlayerOutput.frame(3)).unwrap();
        assert_eq!(header.command, "SET_PLAYER_OUTPUT");
        assert_eq!(header.line_count, 3);
    }

    #[test]
    fn parses_summary_line() {
        let summary = SummaryLine::parse("$1 Score: 30 | Magic: 5").unwrap();
        assert_eq!(summary.player, 1);
        assert_eq!(summary.score, 30);
        assert_eq!(summary.magic, 5);
    }

    #[test]
    fn summary_noise_is_not_an_error() {
        assert_eq!(SummaryLine::parse("noise"), None);
        assert_eq!(SummaryLine::parse("$1 Score: 30"), None);
        assert_eq!(SummaryLine::parse("$x Score: 1 | Magic: 2"), None);
    }
}
