use assert_cmd::Command;
use predicates::prelude::*;

fn reindexer() -> Command {
    Command::cargo_bin("reindexer").unwrap()
}

#[test]
fn extract_prints_id_from_watch_url() {
    reindexer()
        .args(["extract", "https://www.youtube.com/watch?v=dQw4w9WgXcQ&feature=share"])
        .assert()
        .success()
        .stdout("dQw4w9WgXcQ\n");
}

#[test]
fn extract_prints_id_from_short_link() {
    reindexer()
        .args(["extract", "https://youtu.be/dQw4w9WgXcQ"])
        .assert()
        .success()
        .stdout("dQw4w9WgXcQ\n");
}

#[test]
fn extract_rejects_unrecognized_url() {
    reindexer()
        .args(["extract", "https://example.com/video"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid YouTube URL"));
}

#[test]
fn run_requires_url() {
    reindexer()
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("<URL>"));
}
