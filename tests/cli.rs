use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn cli_shows_help() {
    let mut cmd = Command::cargo_bin("epigeo").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("epigeo"))
        .stdout(predicate::str::contains("standardize"));
}

#[test]
fn cli_standardizes_offline() {
    let mut cmd = Command::cargo_bin("epigeo").unwrap();
    cmd.args(["standardize", "France;Korea, South", "--db", "jhu"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("France\tFRA"))
        .stdout(predicate::str::contains("KOR"));
}

#[test]
fn cli_expands_regions() {
    let mut cmd = Command::cargo_bin("epigeo").unwrap();
    cmd.args(["members", "G7"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::diff("CAN,DEU,FRA,GBR,ITA,JPN,USA\n"));
}

#[test]
fn cli_rejects_unknown_standard() {
    let mut cmd = Command::cargo_bin("epigeo").unwrap();
    cmd.args(["standardize", "France", "--standard", "iso4"]);
    cmd.assert().failure().stderr(predicate::str::contains("iso4"));
}

#[test]
fn cli_lists_subnational_countries() {
    let mut cmd = Command::cargo_bin("epigeo").unwrap();
    cmd.arg("subregions");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("FRA"))
        .stdout(predicate::str::contains("JPN"));
}

// Live test (opt-in): cargo test --features online
#[cfg(feature = "online")]
#[test]
fn subregions_online_japan() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("epigeo").unwrap();
    cmd.args(["subregions", "JPN", "--regions", "--cache-dir"])
        .arg(dir.path())
        .arg("--plot")
        .arg(dir.path().join("jpn.svg"));
    cmd.assert().success();
}
