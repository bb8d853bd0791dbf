//! URL parsing and validation for the fetcher.

use gitca::error::FetchError;
use gitca::fetch::HttpsTarget;

#[test]
fn parses_host_port_and_path() {
    let t = HttpsTarget::parse("https://internal.corp:8443/repo/info?x=1").unwrap();
    assert_eq!(t.host, "internal.corp");
    assert_eq!(t.port, 8443);
    assert_eq!(t.path, "/repo/info?x=1");
}

#[test]
fn defaults_port_and_path() {
    let t = HttpsTarget::parse("https://internal.corp").unwrap();
    assert_eq!(t.port, 443);
    assert_eq!(t.path, "/");
}

#[test]
fn rejects_malformed_input() {
    let err = HttpsTarget::parse("not a url").unwrap_err();
    assert!(matches!(err, FetchError::InvalidUrl { .. }));
}

#[test]
fn rejects_plain_http() {
    let err = HttpsTarget::parse("http://internal.corp/").unwrap_err();
    assert!(matches!(err, FetchError::InvalidUrl { .. }));
}

#[test]
fn rejects_other_schemes_and_missing_scheme() {
    assert!(matches!(
        HttpsTarget::parse("ftp://internal.corp/").unwrap_err(),
        FetchError::InvalidUrl { .. }
    ));
    assert!(matches!(
        HttpsTarget::parse("internal.corp/path").unwrap_err(),
        FetchError::InvalidUrl { .. }
    ));
}
