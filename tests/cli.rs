use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;

fn demo() -> Command {
    Command::cargo_bin("pool-demo").unwrap()
}

#[test]
fn cli_version() {
    demo()
        .arg("--version")
        .assert()
        .success()
        .stdout(contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn cli_runs_every_item() {
    for capacity in ["0", "200", "1000"] {
        demo()
            .args(["--workers", "50", "--capacity", capacity, "--items", "1000"])
            .assert()
            .success()
            .stdout(contains("workers=50 finished=50 items=1000 lines=1000"));
    }
}

#[test]
fn cli_zero_workers_fails() {
    demo()
        .args(["--workers", "0"])
        .assert()
        .failure()
        .stderr(contains("pool size 0 cannot be less than 1"));
}

#[test]
fn cli_oversized_capacity_fails() {
    let max = u64::MAX.to_string();
    demo()
        .args(["--workers", "2", "--capacity", max.as_str()])
        .assert()
        .failure()
        .stderr(contains("queue capacity"))
        .stdout(predicate::str::is_empty());
}

#[test]
fn cli_rejects_unknown_flag() {
    demo().arg("--threads").assert().failure();
}
