//! CLI surface: exit codes and output.

mod common;

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

#[test]
fn help_lists_subcommands() {
    Command::cargo_bin("gitca")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("fetch-root-cert")
                .and(predicate::str::contains("install-cert"))
                .and(predicate::str::contains("dedupe-path"))
                .and(predicate::str::contains("doctor")),
        );
}

#[test]
fn fetch_rejects_invalid_url_with_code_2() {
    Command::cargo_bin("gitca")
        .unwrap()
        .args(["fetch-root-cert", "ftp://nope"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("invalid url"));
}

#[test]
fn install_rejects_bad_bundle_path_with_code_6() {
    let dir = common::temp_home();
    let pki = common::test_pki();
    let cert_file = dir.path().join("root.pem");
    fs::write(&cert_file, &pki.root_pem).unwrap();

    Command::cargo_bin("gitca")
        .unwrap()
        .arg("install-cert")
        .arg("--cert")
        .arg(&cert_file)
        .arg("--bundle-path")
        .arg(dir.path().join("missing.pem"))
        .env("GITCA_HOME", dir.path().join("home"))
        .assert()
        .failure()
        .code(6)
        .stderr(predicate::str::contains("invalid bundle path"));
}

#[test]
fn install_without_tool_fails_with_code_5() {
    let dir = common::temp_home();
    let pki = common::test_pki();
    let cert_file = dir.path().join("root.pem");
    fs::write(&cert_file, &pki.root_pem).unwrap();

    Command::cargo_bin("gitca")
        .unwrap()
        .arg("install-cert")
        .arg("--cert")
        .arg(&cert_file)
        .env("GITCA_HOME", dir.path().join("home"))
        .env("GITCA_BUNDLE_PROBE", dir.path().join("no-such-bundle.crt"))
        .assert()
        .failure()
        .code(5)
        .stderr(predicate::str::contains("no Git CA bundle found"));
}

#[test]
fn install_requires_a_certificate_source() {
    Command::cargo_bin("gitca")
        .unwrap()
        .arg("install-cert")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--url"));
}

#[test]
fn dedupe_path_prints_deduplicated_value() {
    let sep = if cfg!(windows) { ';' } else { ':' };
    let value = format!("/x{sep}/y{sep}/x");

    Command::cargo_bin("gitca")
        .unwrap()
        .args(["dedupe-path", "--var", "GITCA_TEST_LIST"])
        .env("GITCA_TEST_LIST", &value)
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("/x{sep}/y")));
}

#[test]
fn dedupe_path_fails_for_unset_variable() {
    Command::cargo_bin("gitca")
        .unwrap()
        .args(["dedupe-path", "--var", "GITCA_DEFINITELY_UNSET"])
        .env_remove("GITCA_DEFINITELY_UNSET")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not set"));
}

#[cfg(unix)]
#[test]
fn install_end_to_end_with_stubbed_git() {
    use std::os::unix::fs::PermissionsExt;

    let dir = common::temp_home();
    let pki = common::test_pki();

    let cert_file = dir.path().join("root.pem");
    fs::write(&cert_file, &pki.root_pem).unwrap();

    let shipped = dir.path().join("shipped-bundle.crt");
    fs::write(&shipped, &pki.root_pem).unwrap();

    let stub = dir.path().join("git");
    fs::write(&stub, "#!/bin/sh\nexit 0\n").unwrap();
    let mut perms = fs::metadata(&stub).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&stub, perms).unwrap();

    let home = dir.path().join("home");
    Command::cargo_bin("gitca")
        .unwrap()
        .arg("install-cert")
        .arg("--cert")
        .arg(&cert_file)
        .env("GITCA_HOME", &home)
        .env("GITCA_BUNDLE_PROBE", &shipped)
        .env("GITCA_GIT", &stub)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configured git http.sslCAInfo"));

    let copy = fs::read_to_string(home.join("ca-bundle.crt")).unwrap();
    assert!(copy.starts_with(&pki.root_pem));
    assert!(copy.contains("-----END CERTIFICATE-----"));
    // Shipped bundle untouched.
    assert_eq!(fs::read_to_string(&shipped).unwrap(), pki.root_pem);
}
