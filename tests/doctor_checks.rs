//! Doctor health checks with injected locator and config writer.

mod common;

use gitca::doctor::run_checks;
use gitca::platform::{FileConfigWriter, GitConfigWriter, StaticLocator};
use std::fs;
use std::path::Path;

#[test]
fn reports_missing_tool_bundle() {
    let dir = common::temp_home();
    let locator = StaticLocator::new(vec![dir.path().join("absent.crt")]);
    let git = FileConfigWriter::new(dir.path().join("gitconfig"));

    let results = run_checks(&locator, &git).unwrap();

    assert!(!results[0].ok);
    assert!(results[0].message.contains("--bundle-path"));
}

#[test]
fn unset_config_is_not_a_failure() {
    let dir = common::temp_home();
    let bundle = dir.path().join("shipped.crt");
    fs::write(&bundle, common::test_pki().root_pem).unwrap();

    let locator = StaticLocator::new(vec![bundle]);
    let git = FileConfigWriter::new(dir.path().join("gitconfig"));

    let results = run_checks(&locator, &git).unwrap();
    assert!(results.iter().all(|r| r.ok), "{results:?}");
}

#[test]
fn configured_but_missing_bundle_fails() {
    let dir = common::temp_home();
    let bundle = dir.path().join("shipped.crt");
    fs::write(&bundle, common::test_pki().root_pem).unwrap();

    let locator = StaticLocator::new(vec![bundle]);
    let git = FileConfigWriter::new(dir.path().join("gitconfig"));
    git.set_ssl_ca_info(Path::new("/definitely/not/here.pem")).unwrap();

    let results = run_checks(&locator, &git).unwrap();
    assert!(results.iter().any(|r| !r.ok && r.message.contains("missing file")));
}

#[test]
fn healthy_setup_passes_with_cert_count() {
    let dir = common::temp_home();
    let pki = common::test_pki();

    let bundle = dir.path().join("shipped.crt");
    fs::write(&bundle, &pki.root_pem).unwrap();

    let locator = StaticLocator::new(vec![bundle.clone()]);
    let git = FileConfigWriter::new(dir.path().join("gitconfig"));
    git.set_ssl_ca_info(&bundle).unwrap();

    let results = run_checks(&locator, &git).unwrap();
    assert!(results.iter().all(|r| r.ok), "{results:?}");
    assert!(results.iter().any(|r| r.message.contains("1 certificate(s)")));
}
