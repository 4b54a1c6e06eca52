//! End-to-end tournaments against scripted referees and players.
//!
//! Each test writes small shell scripts into a scratch directory and runs
//! them through the public [`Arena`] API, exercising the real process
//! spawning, protocol loop and teardown paths.

#![cfg(unix)]

use std::fs;
use std::path::Path;
use std::time::Duration;

use bot_arena::prelude::*;
use tempfile::TempDir;

fn script(dir: &Path, name: &str, body: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    format!("sh {}", path.display())
}

fn idle_player(dir: &Path, name: &str) -> String {
    script(dir, name, "cat >/dev/null\n")
}

#[test]
fn full_match_round_trip_records_final_scores() {
    let dir = TempDir::new().unwrap();
    let logs = dir.path().join("logs");

    let referee = script(
        dir.path(),
        "referee.sh",
        r#"read -r init_header
read -r player_count
read -r game_info
[ "$init_header" = "[[INIT] 1]" ] || exit 1
[ "$player_count" = "2" ] || exit 1
[ "$game_info" = "[[GET_GAME_INFO] 0]" ] || exit 1
echo '[[UINPUT] 1]'
echo 'ignored user input'
echo '[[SUMMARY] 3]'
echo '$0 Score: 3 | Magic: 1'
echo '$1 Score: 5 | Magic: 2'
echo 'summary noise line'
echo '[[NEXT_PLAYER_INPUT] 1]'
echo '1'
echo '[[NEXT_PLAYER_INPUT] 3]'
echo '4'
echo 'entity a'
echo 'entity b'
echo '[[NEXT_PLAYER_INFO] 4]'
echo '0'
echo '1'
echo '50'
echo 'extra info line'
read -r set_output
[ "$set_output" = "[[SET_PLAYER_OUTPUT] 1]" ] || exit 1
read -r move
[ "$move" = "MOVE" ] || exit 1
read -r game_info2
[ "$game_info2" = "[[GET_GAME_INFO] 0]" ] || exit 1
echo '[[SCORES] 2]'
echo '0 10'
echo '1 20'
"#,
    );

    // The queried player sees: init input, both summary lines, turn input.
    let player = script(
        dir.path(),
        "player.sh",
        r#"read -r l1; [ "$l1" = "1" ] || exit 1
read -r l2; [ "$l2" = "3 1" ] || exit 1
read -r l3; [ "$l3" = "5 2" ] || exit 1
read -r l4; [ "$l4" = "4" ] || exit 1
read -r l5; [ "$l5" = "entity a" ] || exit 1
read -r l6; [ "$l6" = "entity b" ] || exit 1
echo 'MOVE'
"#,
    );
    let other = idle_player(dir.path(), "other.sh");

    let config = Configuration::new()
        .with_games(1)
        .with_threads(1)
        .with_logs(&logs)
        .with_referee_timeout(Duration::from_secs(5))
        .with_verbose(false);
    let report = Arena::new(referee, vec![player, other], config)
        .run()
        .unwrap();

    assert_eq!(report.recorded, 1);
    assert_eq!(report.players[0].total_score, 10);
    assert_eq!(report.players[1].total_score, 20);
    assert_eq!(report.players[0].losses, 1);
    assert_eq!(report.players[1].wins, 1);

    let transcript = fs::read_to_string(logs.join("game1.log")).unwrap();
    assert!(transcript.contains("Referee: [[SCORES] 2]"));
    assert!(transcript.contains("Referee SUMMARY: summary noise line"));
    assert!(transcript.contains("Player 0: MOVE"));
}

#[test]
fn repeatable_seed_adds_a_seed_line_to_init() {
    let dir = TempDir::new().unwrap();

    let referee = script(
        dir.path(),
        "referee.sh",
        r#"read -r init_header
[ "$init_header" = "[[INIT] 2]" ] || exit 1
read -r player_count
read -r seed_line
case "$seed_line" in seed=*) ;; *) exit 1 ;; esac
read -r game_info
echo '[[SCORES] 1]'
echo '0 7'
"#,
    );
    let player = idle_player(dir.path(), "player.sh");

    let config = Configuration::new()
        .with_games(1)
        .with_threads(1)
        .with_initial_seed(42)
        .with_referee_timeout(Duration::from_secs(5))
        .with_verbose(false);
    let report = Arena::new(referee, vec![player], config).run().unwrap();

    assert_eq!(report.recorded, 1);
    assert_eq!(report.players[0].total_score, 7);
}

#[test]
fn one_broken_referee_does_not_abort_the_tournament() {
    let dir = TempDir::new().unwrap();
    let marker = dir.path().join("first-match-marker");

    // Exactly one match grabs the marker and emits a malformed header; the
    // others complete a minimal protocol.
    let referee = script(
        dir.path(),
        "referee.sh",
        &format!(
            r#"if mkdir {} 2>/dev/null; then
  echo 'garbage header'
  exit 1
fi
read -r init_header
read -r player_count
read -r game_info
echo '[[SCORES] 2]'
echo '0 2'
echo '1 0'
"#,
            marker.display()
        ),
    );
    let players = vec![
        idle_player(dir.path(), "p0.sh"),
        idle_player(dir.path(), "p1.sh"),
    ];

    let config = Configuration::new()
        .with_games(3)
        .with_threads(2)
        .with_referee_timeout(Duration::from_secs(5))
        .with_verbose(false);
    let report = Arena::new(referee, players, config).run().unwrap();

    assert_eq!(report.recorded, 2);
    assert_eq!(report.players[0].wins, 2);
    assert_eq!(report.players[0].total_score, 4);
    assert_eq!(report.players[1].losses, 2);
}

#[test]
fn hung_player_times_out_and_match_is_discarded() {
    let dir = TempDir::new().unwrap();

    let referee = script(
        dir.path(),
        "referee.sh",
        r#"read -r init_header
read -r player_count
read -r game_info
echo '[[NEXT_PLAYER_INFO] 3]'
echo '0'
echo '1'
echo '100'
read -r set_output
read -r never_answered
"#,
    );
    let player = script(dir.path(), "player.sh", "sleep 30\n");

    let config = Configuration::new()
        .with_games(1)
        .with_threads(1)
        .with_player_timeout(Duration::from_millis(200))
        .with_referee_timeout(Duration::from_secs(5))
        .with_verbose(false);
    let report = Arena::new(referee, vec![player], config).run().unwrap();

    // The match failed, contributed nothing, and the tournament still ended.
    assert_eq!(report.recorded, 0);
    assert_eq!(report.players[0], PlayerRecord::default());
}

#[test]
fn zero_games_finishes_immediately() {
    let dir = TempDir::new().unwrap();
    let referee = script(dir.path(), "referee.sh", "exit 1\n");
    let player = idle_player(dir.path(), "player.sh");

    let config = Configuration::new().with_games(0).with_verbose(false);
    let report = Arena::new(referee, vec![player], config).run().unwrap();
    assert_eq!(report.recorded, 0);
}

#[test]
fn missing_players_is_a_setup_error() {
    let config = Configuration::new().with_verbose(false);
    assert!(Arena::new("true", vec![], config).run().is_err());
}
