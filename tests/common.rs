//! Shared test helpers.

use rcgen::{BasicConstraints, CertificateParams, DistinguishedName, DnType, DnValue, IsCa, KeyPair};
use tempfile::TempDir;

/// Create a temp directory for use as GITCA_HOME / bundle scratch space.
/// Uses current dir (workspace) so sandbox allows full access.
pub fn temp_home() -> TempDir {
    tempfile::Builder::new()
        .prefix("gitca_test_")
        .tempdir_in(std::env::current_dir().unwrap_or_else(|_| std::path::Path::new(".").into()))
        .expect("temp dir")
}

/// A root -> intermediate -> leaf chain minted for tests.
pub struct TestPki {
    pub root_der: Vec<u8>,
    pub root_pem: String,
    pub intermediate_der: Vec<u8>,
    pub leaf_der: Vec<u8>,
    /// PKCS#8 DER key for the leaf, for running a TLS server in tests.
    pub leaf_key_der: Vec<u8>,
}

fn dn(common_name: &str) -> DistinguishedName {
    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, DnValue::Utf8String(common_name.to_string()));
    dn
}

pub fn test_pki() -> TestPki {
    let root_key = KeyPair::generate().unwrap();
    let mut root_params = CertificateParams::default();
    root_params.distinguished_name = dn("Gitca Test Root");
    root_params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    let root_cert = root_params.self_signed(&root_key).unwrap();

    let int_key = KeyPair::generate().unwrap();
    let mut int_params = CertificateParams::default();
    int_params.distinguished_name = dn("Gitca Test Intermediate");
    int_params.is_ca = IsCa::Ca(BasicConstraints::Constrained(0));
    let int_cert = int_params.signed_by(&int_key, &root_cert, &root_key).unwrap();

    let leaf_key = KeyPair::generate().unwrap();
    let mut leaf_params = CertificateParams::new(vec!["localhost".to_string()]).unwrap();
    leaf_params.distinguished_name = dn("localhost");
    leaf_params.is_ca = IsCa::NoCa;
    let leaf_cert = leaf_params.signed_by(&leaf_key, &int_cert, &int_key).unwrap();

    TestPki {
        root_der: root_cert.der().as_ref().to_vec(),
        root_pem: root_cert.pem(),
        intermediate_der: int_cert.der().as_ref().to_vec(),
        leaf_der: leaf_cert.der().as_ref().to_vec(),
        leaf_key_der: leaf_key.serialize_der(),
    }
}

/// A standalone self-signed certificate unrelated to [`test_pki`].
pub fn self_signed(common_name: &str) -> Vec<u8> {
    let key = KeyPair::generate().unwrap();
    let mut params = CertificateParams::default();
    params.distinguished_name = dn(common_name);
    params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    params.self_signed(&key).unwrap().der().as_ref().to_vec()
}
