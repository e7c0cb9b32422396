use assert_cmd::Command;
use predicates::prelude::*;

fn cargo_bin() -> Command { Command::cargo_bin("bf-tape").unwrap() }

#[test]
fn demo_prints_program_without_dump() {
    cargo_bin()
        .arg("demo")
        .assert()
        .success()
        .stdout("program  = +++>++<[->+<]\n");
}

#[test]
fn demo_dump_shows_transfer_result() {
    for flag in ["--dump", "-d"] {
        cargo_bin()
            .args(["demo", flag])
            .assert()
            .success()
            .stdout(
                predicate::str::contains("program  = +++>++<[->+<]")
                    .and(predicate::str::contains("index    = |  0|  1|"))
                    .and(predicate::str::contains("data     = |  0|  5|"))
                    .and(predicate::str::contains("pointer  =    ^")),
            );
    }
}

#[test]
fn demo_help_exits_zero() {
    cargo_bin()
        .args(["demo", "--help"])
        .assert()
        .success()
        .stderr(predicate::str::contains("built-in transfer program"));
}
