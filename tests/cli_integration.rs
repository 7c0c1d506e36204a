//! CLI integration tests for Crease
//!
//! These tests drive the binary through a whole match, from project setup
//! through scoring, undo and exports, checking that commands compose.

use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get a command instance for the crease binary
fn crease_cmd() -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("crease"));
    cmd.env_remove("CREASE_SCORER").env_remove("CREASE_MATCH");
    cmd
}

/// Runs a command in `dir` as scorer `alice`
fn as_alice(dir: &TempDir) -> assert_cmd::Command {
    let mut cmd = crease_cmd();
    cmd.current_dir(dir.path()).args(["--as", "alice"]);
    cmd
}

/// Create a temporary directory and initialize a crease project
fn setup_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    crease_cmd().arg("init").arg(dir.path()).assert().success();
    dir
}

/// Project with one 1-over match, alice holding the lease and Dev bowling
fn setup_live_match() -> TempDir {
    let dir = setup_project();

    as_alice(&dir)
        .args([
            "match", "new", "Tigers vs Lions", "--team-a", "Asha,Ben,Chen,Dan", "--team-b",
            "Dev,Eli,Fay", "--overs", "1",
        ])
        .assert()
        .success();
    as_alice(&dir).args(["lock", "acquire"]).assert().success();
    as_alice(&dir)
        .args(["players", "--bowler", "Dev"])
        .assert()
        .success();

    dir
}

fn match_json(dir: &TempDir) -> serde_json::Value {
    let out = as_alice(dir)
        .args(["--format", "json", "match", "show"])
        .output()
        .unwrap();
    assert!(out.status.success());
    serde_json::from_slice(&out.stdout).unwrap()
}

// =============================================================================
// Initialization Tests
// =============================================================================

#[test]
fn test_init_creates_structure() {
    let dir = TempDir::new().unwrap();

    crease_cmd()
        .arg("init")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized crease project"));

    assert!(dir.path().join(".crease").is_dir());
    assert!(dir.path().join(".crease/matches").is_dir());
    assert!(dir.path().join(".crease/backups").is_dir());
    assert!(dir.path().join(".crease/config.toml").is_file());
    assert!(dir.path().join(".crease/.gitignore").is_file());
}

#[test]
fn test_init_is_idempotent() {
    let dir = TempDir::new().unwrap();

    crease_cmd().arg("init").arg(dir.path()).assert().success();
    crease_cmd().arg("init").arg(dir.path()).assert().success();
}

#[test]
fn test_commands_outside_project_fail() {
    let dir = TempDir::new().unwrap();

    crease_cmd()
        .current_dir(dir.path())
        .args(["match", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("crease init"));
}

// =============================================================================
// Match Tests
// =============================================================================

#[test]
fn test_match_new_and_list() {
    let dir = setup_project();

    as_alice(&dir)
        .args([
            "match", "new", "Club Final", "--team-a", "Asha,Ben", "--team-b", "Dev,Eli",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created match m-"));

    as_alice(&dir)
        .args(["match", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Club Final"))
        .stdout(predicate::str::contains("INNINGS1"));

    let m = match_json(&dir);
    assert_eq!(m["overs_limit"], 20, "default_overs from config");
    assert_eq!(m["batting"]["striker"], "Asha");
}

#[test]
fn test_match_new_rejects_shared_player() {
    let dir = setup_project();

    as_alice(&dir)
        .args(["match", "new", "Bad", "--team-a", "Asha,Ben", "--team-b", "Ben,Eli"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("both teams"));
}

#[test]
fn test_match_new_rejects_huge_overs() {
    let dir = setup_project();

    as_alice(&dir)
        .args([
            "match", "new", "Marathon", "--team-a", "Asha,Ben", "--team-b", "Dev,Eli",
            "--overs", "1000000000",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("between 1 and 100"));
}

#[test]
fn test_match_delete() {
    let dir = setup_live_match();
    let id = match_json(&dir)["id"].as_str().unwrap().to_string();

    crease_cmd()
        .current_dir(dir.path())
        .args(["--as", "bob", "match", "delete", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("alice"));

    as_alice(&dir)
        .args(["match", "delete", &id])
        .assert()
        .success();

    as_alice(&dir)
        .args(["match", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No matches yet"));
}

// =============================================================================
// Lease Tests
// =============================================================================

#[test]
fn test_scoring_requires_lease() {
    let dir = setup_live_match();

    crease_cmd()
        .current_dir(dir.path())
        .args(["--as", "bob", "ball", "4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("crease lock acquire"));

    crease_cmd()
        .current_dir(dir.path())
        .args(["--as", "bob", "lock", "acquire"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("alice"));
}

#[test]
fn test_scorer_from_environment() {
    let dir = setup_live_match();

    crease_cmd()
        .current_dir(dir.path())
        .env("CREASE_SCORER", "alice")
        .args(["ball", "1"])
        .assert()
        .success();
}

#[test]
fn test_release_then_other_scorer_takes_over() {
    let dir = setup_live_match();

    as_alice(&dir).args(["lock", "release"]).assert().success();

    crease_cmd()
        .current_dir(dir.path())
        .args(["--as", "bob", "lock", "acquire"])
        .assert()
        .success()
        .stdout(predicate::str::contains("as bob"));
}

// =============================================================================
// Scoring Tests
// =============================================================================

#[test]
fn test_ball_prints_commentary_and_score() {
    let dir = setup_live_match();

    as_alice(&dir)
        .args(["ball", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1 — Dev to Asha — "))
        .stdout(predicate::str::contains("Team A 4/0 (0.1 ov)"));
}

#[test]
fn test_unknown_code_rejected() {
    let dir = setup_live_match();

    as_alice(&dir)
        .args(["ball", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown outcome"));

    assert_eq!(match_json(&dir)["ball_log"].as_array().unwrap().len(), 0);
}

#[test]
fn test_oversized_runs_rejected() {
    let dir = setup_live_match();

    as_alice(&dir)
        .args(["ball", "NB", "--runs", "4294967295"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("more than the allowed 10"));

    let m = match_json(&dir);
    assert_eq!(m["scores"]["Team A"]["runs"], 0);
    assert_eq!(m["ball_log"].as_array().unwrap().len(), 0);
}

#[test]
fn test_undo_restores_score() {
    let dir = setup_live_match();

    as_alice(&dir).args(["ball", "1"]).assert().success();
    as_alice(&dir).args(["ball", "6"]).assert().success();
    as_alice(&dir)
        .args(["undo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1/0"));

    let m = match_json(&dir);
    assert_eq!(m["scores"]["Team A"]["runs"], 1);
    assert_eq!(m["batting"]["striker"], "Ben");
}

#[test]
fn test_full_over_switches_innings() {
    let dir = setup_live_match();

    for code in ["1", "4"] {
        as_alice(&dir).args(["ball", code]).assert().success();
    }
    as_alice(&dir)
        .args(["ball", "W", "--batter", "Dan", "--how", "bowled"])
        .assert()
        .success();
    for code in ["0", "6"] {
        as_alice(&dir).args(["ball", code]).assert().success();
    }
    as_alice(&dir)
        .args(["ball", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Innings over"))
        .stdout(predicate::str::contains("need 12 to win"));

    let m = match_json(&dir);
    assert_eq!(m["status"], "INNINGS2");
    assert_eq!(m["scores"]["Team A"]["runs"], 11);
    assert_eq!(m["scores"]["Team A"]["wkts"], 1);

    // second innings needs openers and a bowler
    as_alice(&dir)
        .args(["ball", "1"])
        .assert()
        .failure();
    as_alice(&dir)
        .args([
            "players", "--striker", "Dev", "--non-striker", "Eli", "--bowler", "Asha",
        ])
        .assert()
        .success();
    as_alice(&dir).args(["ball", "6"]).assert().success();
    as_alice(&dir)
        .args(["ball", "6"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Team B won by 2 wickets"));

    // the winning ball can still be taken back without naming the match
    as_alice(&dir)
        .args(["undo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Team B 6/0 (0.1 ov)"));

    let m = match_json(&dir);
    assert_eq!(m["status"], "INNINGS2");
    assert_eq!(m["scores"]["Team B"]["runs"], 6);
}

#[test]
fn test_end_match_early() {
    let dir = setup_live_match();

    as_alice(&dir).args(["ball", "2"]).assert().success();
    as_alice(&dir)
        .args(["end-match"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No result"));

    as_alice(&dir).args(["ball", "1"]).assert().failure();
}

// =============================================================================
// Report Tests
// =============================================================================

#[test]
fn test_commentary_newest_first() {
    let dir = setup_live_match();

    as_alice(&dir).args(["ball", "0"]).assert().success();
    as_alice(&dir).args(["ball", "4"]).assert().success();

    let out = as_alice(&dir)
        .args(["commentary", "-n", "1"])
        .output()
        .unwrap();
    let text = String::from_utf8(out.stdout).unwrap();
    assert_eq!(text.lines().count(), 1);
    assert!(text.starts_with("0.2 — "));
}

#[test]
fn test_export_csv_to_file() {
    let dir = setup_live_match();
    as_alice(&dir)
        .args(["ball", "WD", "--runs", "2"])
        .assert()
        .success();

    let path = dir.path().join("balls.csv");
    as_alice(&dir)
        .args(["export", "csv", "--output"])
        .arg(&path)
        .assert()
        .success();

    let csv = fs::read_to_string(&path).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("time,outcome,striker,non_striker,bowler,extras,wicket")
    );
    assert!(lines.next().unwrap().contains(",WD,Asha,Ben,Dev,"));
}

#[test]
fn test_export_json_is_snapshot() {
    let dir = setup_live_match();
    as_alice(&dir).args(["ball", "3"]).assert().success();

    let out = as_alice(&dir).args(["export", "json"]).output().unwrap();
    let value: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(value["scores"]["Team A"]["runs"], 3);
    assert_eq!(value["scorer_lock"]["locked_by"], "alice");
}

#[test]
fn test_stats_across_matches() {
    let dir = setup_live_match();
    as_alice(&dir).args(["ball", "4"]).assert().success();

    as_alice(&dir)
        .args(["stats"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Asha"))
        .stdout(predicate::str::contains("Dev"));

    let out = as_alice(&dir)
        .args(["--format", "json", "stats"])
        .output()
        .unwrap();
    let totals: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(totals[0]["player"], "Asha");
    assert_eq!(totals[0]["batting"]["R"], 4);
}
