#![allow(clippy::expect_used, clippy::unwrap_used)]

mod common;

use common::scrivener_cmd;
use predicates::prelude::*;
use std::io::Write;

#[test]
fn survey_processors_lists_every_built_in_without_network() {
    scrivener_cmd()
        .arg("survey-processors")
        .assert()
        .success()
        .stdout(predicate::str::contains("sphinx"))
        .stdout(predicate::str::contains("mkdocs"))
        .stdout(predicate::str::contains("pydoctor"));
}

#[test]
fn missing_required_argument_exits_with_usage_code() {
    // `query-inventory` requires LOCATION and TERM.
    scrivener_cmd().arg("query-inventory").assert().failure().code(2);
}

#[test]
fn detect_against_an_unqualified_fixture_reports_null_genera_as_json() {
    let dir = tempfile::tempdir().unwrap();
    // An empty directory qualifies for no processor; `detect` reports that
    // as `null`, not a CLI failure.
    scrivener_cmd()
        .arg("--display-format")
        .arg("json")
        .arg("detect")
        .arg(format!("file://{}/", dir.path().display()))
        .assert()
        .success()
        .stdout(predicate::str::contains("\"inventory\":null"))
        .stdout(predicate::str::contains("\"structure\":null"));
}

#[test]
fn query_inventory_against_a_sphinx_fixture_finds_the_object() {
    let dir = tempfile::tempdir().unwrap();
    write_sample_objects_inv(dir.path());

    scrivener_cmd()
        .arg("--display-format")
        .arg("json")
        .arg("query-inventory")
        .arg(format!("file://{}/", dir.path().display()))
        .arg("repo")
        .assert()
        .success()
        .stdout(predicate::str::contains("dulwich.repo.Repo"));
}

fn write_sample_objects_inv(dir: &std::path::Path) {
    use flate2::Compression;
    use flate2::write::ZlibEncoder;

    let body = "dulwich.repo.Repo py:class 1 dulwich/repo.html#$ -\n";
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(body.as_bytes()).unwrap();
    let compressed = encoder.finish().unwrap();

    let mut out = Vec::new();
    out.extend_from_slice(b"# Sphinx inventory version 2\n");
    out.extend_from_slice(b"# Project: dulwich\n");
    out.extend_from_slice(b"# Version: 1.0\n");
    out.extend_from_slice(b"# The remainder of this file is compressed using zlib.\n");
    out.extend_from_slice(&compressed);
    std::fs::write(dir.join("objects.inv"), out).unwrap();
}
