//! Score aggregation across completed matches.
//!
//! Workers submit one [`FinalScoreVector`] per successful match; the board
//! accumulates wins, draws, losses and score totals per player and produces
//! an immutable [`TournamentReport`] snapshot at any point. Failed matches
//! submit nothing and therefore leave the board untouched.

use std::fmt;
use std::sync::Mutex;

/// Final per-player scores of one completed match, indexed by original
/// (unrotated) player identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalScoreVector(
    /// One score per player, in original player order.
    pub Vec<i64>,
);

/// Accumulated results for one player across all recorded matches.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PlayerRecord {
    /// Matches where this player alone had the highest score.
    pub wins: usize,
    /// Matches where this player shared the highest score.
    pub draws: usize,
    /// Matches where some other player scored strictly higher.
    pub losses: usize,
    /// Sum of this player's final scores.
    pub total_score: i64,
}

#[derive(Debug, Clone)]
struct Inner {
    players: Vec<PlayerRecord>,
    recorded: usize,
}

/// Thread-safe accumulator of final score vectors.
///
/// Each submission is recorded atomically; concurrent workers never observe a
/// half-applied vector.
#[derive(Debug)]
pub struct ScoreBoard {
    inner: Mutex<Inner>,
}

impl ScoreBoard {
    /// A board for `player_count` players with no recorded matches.
    pub fn new(player_count: usize) -> ScoreBoard {
        ScoreBoard {
            inner: Mutex::new(Inner {
                players: vec![PlayerRecord::default(); player_count],
                recorded: 0,
            }),
        }
    }

    /// Record the outcome of one completed match.
    pub fn record(&self, scores: &FinalScoreVector) {
        let mut inner = self.inner.lock().expect("poisoned");
        inner.recorded += 1;

        let Some(&best) = scores.0.iter().max() else {
            return;
        };
        let leaders = scores.0.iter().filter(|&&s| s == best).count();
        for (record, &score) in inner.players.iter_mut().zip(&scores.0) {
            record.total_score += score;
            if score < best {
                record.losses += 1;
            } else if leaders == 1 {
                record.wins += 1;
            } else {
                record.draws += 1;
            }
        }
    }

    /// Immutable snapshot of everything recorded so far.
    pub fn report(&self) -> TournamentReport {
        let inner = self.inner.lock().expect("poisoned");
        TournamentReport {
            players: inner.players.clone(),
            recorded: inner.recorded,
        }
    }
}

/// Snapshot of the board, returned by [`crate::arena::Arena::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TournamentReport {
    /// One record per player, in original player order.
    pub players: Vec<PlayerRecord>,
    /// Number of matches that contributed a score vector.
    pub recorded: usize,
}

impl TournamentReport {
    /// Mean final score of `player` over recorded matches, 0.0 when none.
    pub fn mean_score(&self, player: usize) -> f64 {
        if self.recorded == 0 {
            return 0.0;
        }
        self.players
            .get(player)
            .map_or(0.0, |p| p.total_score as f64 / self.recorded as f64)
    }
}

impl fmt::Display for TournamentReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} game(s)", self.recorded)?;
        for (i, p) in self.players.iter().enumerate() {
            write!(
                f,
                " | player {i}: {}W {}D {}L avg {:.2}",
                p.wins,
                p.draws,
                p.losses,
                self.mean_score(i)
            )?;
        }
        Ok(())
    }
}
