//! CLI integration tests using assert_cmd.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn recall() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("recall").unwrap()
}

const MEANINGS: [&str; 4] = ["dog", "cat", "sun", "sky"];

/// An experiment directory with four associations and every media file.
fn experiment() -> TempDir {
    let dir = TempDir::new().unwrap();
    let mut input = String::new();
    for meaning in MEANINGS {
        input.push_str(&format!("{meaning},{meaning}.wav,{meaning}.mp4\n"));
    }
    std::fs::write(dir.path().join("input.csv"), input).unwrap();

    std::fs::create_dir(dir.path().join("sound")).unwrap();
    std::fs::create_dir(dir.path().join("video")).unwrap();
    for meaning in MEANINGS {
        std::fs::write(dir.path().join(format!("sound/{meaning}.wav")), b"").unwrap();
        std::fs::write(dir.path().join(format!("video/{meaning}.mp4")), b"").unwrap();
    }

    std::fs::write(
        dir.path().join("recall.toml"),
        "output_dir = \"out\"\n\n[counts.deaf]\nsigns = 4\n\n[media]\nfallback_sign_secs = 1.0\n",
    )
    .unwrap();
    dir
}

fn read_rows(path: &Path) -> Vec<Vec<String>> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| line.split(',').map(str::to_string).collect())
        .collect()
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    recall()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created recall.toml"))
        .stdout(predicate::str::contains("Created input.csv"))
        .stdout(predicate::str::contains("Created sound/"));

    assert!(dir.path().join("recall.toml").exists());
    assert!(dir.path().join("input.csv").exists());
    assert!(dir.path().join("sound").is_dir());
    assert!(dir.path().join("video").is_dir());
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    recall()
        .arg("init")
        .arg("--dir")
        .arg(dir.path())
        .assert()
        .success();

    recall()
        .arg("init")
        .arg("--dir")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn validate_reports_every_missing_file() {
    let dir = TempDir::new().unwrap();
    recall()
        .arg("init")
        .arg("--dir")
        .arg(dir.path())
        .assert()
        .success();

    // The sample table references 4 videos and 4 sounds, none present.
    recall()
        .arg("validate")
        .arg("--dir")
        .arg(dir.path())
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("MISSING").count(8))
        .stdout(predicate::str::contains("water.mp4"))
        .stdout(predicate::str::contains("friend.wav"))
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn validate_complete_experiment() {
    let dir = experiment();
    recall()
        .arg("validate")
        .arg("--dir")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("4 associations"))
        .stdout(predicate::str::contains("Catalog valid"));
}

#[test]
fn validate_missing_input() {
    let dir = TempDir::new().unwrap();
    recall()
        .arg("validate")
        .arg("--dir")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not find input table"));
}

#[test]
fn headless_run_writes_output() {
    let dir = experiment();

    recall()
        .arg("run")
        .arg("--dir")
        .arg(dir.path())
        .args(["--participant", "P1", "--hearing", "yes", "--seed", "3", "--headless"])
        .write_stdin("hound\n\nsun\nblue sky\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("[message] Welcome!"))
        .stdout(predicate::str::contains("What does this word mean?"))
        .stdout(predicate::str::contains("Wrote 4 response(s)"));

    let rows = read_rows(&dir.path().join("out/P1-output.csv"));
    assert_eq!(rows.len(), 4);
    for row in &rows {
        assert_eq!(row.len(), 3);
        assert_eq!(row[1], format!("{}.wav", row[0]));
    }
    let mut answers: Vec<_> = rows.iter().map(|r| r[2].as_str()).collect();
    answers.sort();
    assert_eq!(answers, vec!["", "blue sky", "hound", "sun"]);

    let summary: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("out/P1-session.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(summary["participant"], "P1");
    assert_eq!(summary["seed"], 3);
    assert_eq!(summary["records"].as_array().unwrap().len(), 4);
}

#[test]
fn headless_deaf_session_presents_signs() {
    let dir = experiment();

    recall()
        .arg("run")
        .arg("--dir")
        .arg(dir.path())
        .args(["--participant", "P2", "--hearing", "no", "--headless"])
        .write_stdin("a\nb\nc\nd\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Each sign will be shown twice."))
        .stdout(predicate::str::contains("What does this sign mean?"));

    let rows = read_rows(&dir.path().join("out/P2-output.csv"));
    assert_eq!(rows.len(), 4);
    assert!(rows.iter().all(|r| r[1].ends_with(".mp4")));
}

#[test]
fn headless_quit_writes_nothing() {
    let dir = experiment();

    recall()
        .arg("run")
        .arg("--dir")
        .arg(dir.path())
        .args(["--participant", "P1", "--hearing", "yes", "--headless"])
        .write_stdin("hound\n#quit\n")
        .assert()
        .code(130)
        .stderr(predicate::str::contains("no results were written"));

    assert!(!dir.path().join("out/P1-output.csv").exists());
    assert!(!dir.path().join("out/P1-session.json").exists());
}

#[test]
fn headless_end_of_input_cancels() {
    let dir = experiment();

    recall()
        .arg("run")
        .arg("--dir")
        .arg(dir.path())
        .args(["--participant", "P1", "--hearing", "yes", "--headless"])
        .write_stdin("only one\n")
        .assert()
        .code(130);

    assert!(!dir.path().join("out/P1-output.csv").exists());
}

#[test]
fn headless_requires_participant() {
    let dir = experiment();
    recall()
        .arg("run")
        .arg("--dir")
        .arg(dir.path())
        .args(["--hearing", "yes", "--headless"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("--participant"));
}

#[test]
fn run_rejects_unsafe_participant_id() {
    let dir = experiment();
    recall()
        .arg("run")
        .arg("--dir")
        .arg(dir.path())
        .args(["--participant", "../x", "--hearing", "yes", "--headless"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid participant id"));
}

#[test]
fn run_fails_when_request_cannot_be_met() {
    let dir = experiment();
    std::fs::write(dir.path().join("recall.toml"), "[counts.hearing]\nwords = 6\n").unwrap();
    recall()
        .arg("run")
        .arg("--dir")
        .arg(dir.path())
        .args(["--participant", "P1", "--hearing", "yes", "--headless"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("only 4 associations"));
}

#[test]
fn plan_prints_phase_table() {
    let dir = experiment();
    recall()
        .arg("plan")
        .arg("--dir")
        .arg(dir.path())
        .args(["--hearing", "no", "--seed", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 words, 4 signs"))
        .stdout(predicate::str::contains("dog.mp4"))
        .stdout(predicate::str::contains("Seed: 1"));
}

#[test]
fn seed_from_environment() {
    let dir = experiment();
    let plan = |seed_env: &str| {
        let output = recall()
            .arg("plan")
            .arg("--dir")
            .arg(dir.path())
            .args(["--hearing", "no"])
            .env("RECALL_SEED", seed_env)
            .output()
            .unwrap();
        assert!(output.status.success());
        String::from_utf8(output.stdout).unwrap()
    };
    assert_eq!(plan("5"), plan("5"));
    assert!(plan("5").contains("Seed: 5"));
}

#[test]
fn help_output() {
    recall()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Word and sign recall experiment runner"));
}

#[test]
fn version_output() {
    recall()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("recall"));
}
