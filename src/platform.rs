//! Discovery of the local Git installation and its global config mechanism.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::InstallError;

/// Probed locations of Git-shipped CA bundles.
///
/// Windows: the Git for Windows install trees, 64-bit before 32-bit.
/// Unix: git links the system TLS stack, so the well-known system bundle
/// paths stand in for a tool-shipped bundle.
#[cfg(windows)]
const GIT_BUNDLE_CANDIDATES: &[&str] = &[
    r"C:\Program Files\Git\usr\ssl\certs\ca-bundle.crt",
    r"C:\Program Files (x86)\Git\usr\ssl\certs\ca-bundle.crt",
];

#[cfg(not(windows))]
const GIT_BUNDLE_CANDIDATES: &[&str] = &[
    "/etc/ssl/certs/ca-certificates.crt", // Debian/Ubuntu
    "/etc/pki/tls/certs/ca-bundle.crt",   // RHEL/CentOS/Fedora
    "/etc/ssl/ca-bundle.pem",             // openSUSE
    "/etc/ssl/cert.pem",                  // macOS, Alpine
];

/// Trait for locating tool-shipped CA bundles.
pub trait InstallLocator: Send + Sync {
    /// Candidate bundle paths in preference order. Entries need not exist;
    /// the installer uses the first that does.
    fn candidate_bundles(&self) -> Vec<PathBuf>;
}

/// Trait for Git's persistent, user-global `http.sslCAInfo` setting.
pub trait GitConfigWriter: Send + Sync {
    /// Point Git's TLS verification at the given bundle, for all future
    /// invocations by the current user.
    fn set_ssl_ca_info(&self, bundle: &Path) -> Result<(), InstallError>;
    /// Currently configured bundle, if any.
    fn get_ssl_ca_info(&self) -> Option<PathBuf>;
}

/// Get the platform locator.
/// If GITCA_BUNDLE_PROBE is set (e.g. in tests), its entries (platform path
/// separator) replace the built-in candidates.
pub fn default_locator() -> Box<dyn InstallLocator> {
    if let Some(probe) = std::env::var_os("GITCA_BUNDLE_PROBE") {
        return Box::new(StaticLocator::new(std::env::split_paths(&probe).collect()));
    }
    Box::new(PlatformLocator)
}

/// Get the git-backed config writer.
/// GITCA_GIT overrides the executable (e.g. a stub in tests).
pub fn default_config_writer() -> Box<dyn GitConfigWriter> {
    let program = std::env::var_os("GITCA_GIT").unwrap_or_else(|| OsString::from("git"));
    Box::new(GitCli { program })
}

/// Locator probing the built-in per-platform candidates.
pub struct PlatformLocator;

impl InstallLocator for PlatformLocator {
    fn candidate_bundles(&self) -> Vec<PathBuf> {
        GIT_BUNDLE_CANDIDATES.iter().map(PathBuf::from).collect()
    }
}

/// Locator over a fixed candidate list (for tests).
#[derive(Clone)]
pub struct StaticLocator {
    candidates: Vec<PathBuf>,
}

impl StaticLocator {
    pub fn new(candidates: Vec<PathBuf>) -> Self {
        Self { candidates }
    }
}

impl InstallLocator for StaticLocator {
    fn candidate_bundles(&self) -> Vec<PathBuf> {
        self.candidates.clone()
    }
}

/// Config writer invoking the real `git config --global`.
pub struct GitCli {
    program: OsString,
}

impl GitCli {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl GitConfigWriter for GitCli {
    fn set_ssl_ca_info(&self, bundle: &Path) -> Result<(), InstallError> {
        let output = Command::new(&self.program)
            .args(["config", "--global", "http.sslCAInfo"])
            .arg(bundle)
            .output()
            .map_err(|e| {
                InstallError::ConfigWriteFailure(format!(
                    "cannot run {}: {e}",
                    self.program.to_string_lossy()
                ))
            })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(InstallError::ConfigWriteFailure(format!(
                "git config exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        Ok(())
    }

    fn get_ssl_ca_info(&self) -> Option<PathBuf> {
        let output = Command::new(&self.program)
            .args(["config", "--global", "--get", "http.sslCAInfo"])
            .output()
            .ok()?;
        if !output.status.success() {
            return None;
        }
        let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if value.is_empty() {
            None
        } else {
            Some(PathBuf::from(value))
        }
    }
}

/// Config writer that records the bundle path in a plain file (for tests).
#[derive(Clone)]
pub struct FileConfigWriter {
    path: PathBuf,
}

impl FileConfigWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl GitConfigWriter for FileConfigWriter {
    fn set_ssl_ca_info(&self, bundle: &Path) -> Result<(), InstallError> {
        std::fs::write(&self.path, bundle.to_string_lossy().as_bytes())
            .map_err(|e| InstallError::ConfigWriteFailure(e.to_string()))
    }

    fn get_ssl_ca_info(&self) -> Option<PathBuf> {
        let value = std::fs::read_to_string(&self.path).ok()?;
        let value = value.trim();
        if value.is_empty() {
            None
        } else {
            Some(PathBuf::from(value))
        }
    }
}
