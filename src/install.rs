//! Trust-bundle installation for the local Git client.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::cert::Certificate;
use crate::error::InstallError;
use crate::platform::{default_config_writer, default_locator, GitConfigWriter, InstallLocator};

/// Recognized trust-bundle file extensions.
pub const BUNDLE_EXTENSIONS: &[&str] = &["crt", "pem"];

/// Filesystem locations for gitca's own data.
///
/// Supports GITCA_HOME env var override for testing.
#[derive(Debug, Clone)]
pub struct InstallPaths {
    pub data_dir: PathBuf,
    pub bundle_copy: PathBuf,
}

impl InstallPaths {
    /// Build paths from base directory (ProjectDirs data dir or GITCA_HOME).
    pub fn from_base(base: PathBuf) -> Self {
        let bundle_copy = base.join("ca-bundle.crt");
        Self {
            data_dir: base,
            bundle_copy,
        }
    }

    /// Paths for testing: use a temp dir as base.
    pub fn for_test(base: impl AsRef<Path>) -> Self {
        Self::from_base(base.as_ref().to_path_buf())
    }

    /// Default paths (respects GITCA_HOME).
    pub fn default_paths() -> Self {
        let base = if let Ok(home) = std::env::var("GITCA_HOME") {
            PathBuf::from(home)
        } else if let Some(dirs) = directories::ProjectDirs::from("com", "gitca", "gitca") {
            dirs.data_dir().to_path_buf()
        } else {
            PathBuf::from(".gitca")
        };
        Self::from_base(base)
    }
}

/// Append a certificate to Git's CA bundle and point `http.sslCAInfo` at it.
/// Returns the bundle file that was configured.
pub fn install_certificate(
    cert: &Certificate,
    bundle_path: Option<&Path>,
) -> Result<PathBuf, InstallError> {
    install_certificate_with(
        default_locator().as_ref(),
        default_config_writer().as_ref(),
        &InstallPaths::default_paths(),
        cert,
        bundle_path,
    )
}

/// As [`install_certificate`], with injected locator and config writer
/// (for testing).
///
/// The append and the config write are not transactional: a config failure
/// after a successful append leaves the bundle modified, surfaced as
/// [`InstallError::ConfigWriteFailure`] so the caller can remediate.
pub fn install_certificate_with(
    locator: &dyn InstallLocator,
    git: &dyn GitConfigWriter,
    paths: &InstallPaths,
    cert: &Certificate,
    bundle_path: Option<&Path>,
) -> Result<PathBuf, InstallError> {
    let target = match bundle_path {
        Some(p) => validate_bundle_path(p)?,
        None => copy_default_bundle(locator, paths)?,
    };

    append_pem(&target, cert)?;
    git.set_ssl_ca_info(&target)?;

    Ok(target)
}

/// Check a caller-supplied bundle before any mutation: it must exist, carry
/// a recognized extension, and parse as a PEM container.
fn validate_bundle_path(path: &Path) -> Result<PathBuf, InstallError> {
    let invalid = |reason: String| InstallError::InvalidBundlePath {
        path: path.to_path_buf(),
        reason,
    };

    if !path.is_file() {
        return Err(invalid("file does not exist".to_string()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if !BUNDLE_EXTENSIONS.contains(&ext.as_str()) {
        return Err(invalid(format!(
            "unrecognized extension '.{ext}' (expected .crt or .pem)"
        )));
    }

    let content = fs::read(path).map_err(|e| invalid(format!("cannot read: {e}")))?;
    for cert in rustls_pemfile::certs(&mut content.as_slice()) {
        if let Err(e) = cert {
            return Err(invalid(format!("not a valid PEM bundle: {e}")));
        }
    }

    Ok(path.to_path_buf())
}

/// Resolve the tool-shipped bundle and copy it into our data dir. The
/// shipped bundle is never mutated directly. An existing copy is reused so
/// certificates appended by earlier runs survive.
fn copy_default_bundle(
    locator: &dyn InstallLocator,
    paths: &InstallPaths,
) -> Result<PathBuf, InstallError> {
    let source = locator
        .candidate_bundles()
        .into_iter()
        .find(|p| p.is_file())
        .ok_or(InstallError::ToolNotFound)?;

    if paths.bundle_copy.is_file() {
        return Ok(paths.bundle_copy.clone());
    }

    fs::create_dir_all(&paths.data_dir).map_err(|e| InstallError::FileWriteFailure {
        path: paths.data_dir.clone(),
        source: e,
    })?;
    fs::copy(&source, &paths.bundle_copy).map_err(|e| InstallError::FileWriteFailure {
        path: paths.bundle_copy.clone(),
        source: e,
    })?;

    Ok(paths.bundle_copy.clone())
}

/// Append a newline plus the PEM block, no trailing newline after the
/// footer. Duplicate installs append duplicate blocks; deduplication is
/// deliberately not attempted.
fn append_pem(path: &Path, cert: &Certificate) -> Result<(), InstallError> {
    let write_err = |e: std::io::Error| InstallError::FileWriteFailure {
        path: path.to_path_buf(),
        source: e,
    };

    let mut file = fs::OpenOptions::new()
        .append(true)
        .open(path)
        .map_err(write_err)?;
    file.write_all(b"\n").map_err(write_err)?;
    file.write_all(cert.to_pem().as_bytes()).map_err(write_err)?;
    Ok(())
}
