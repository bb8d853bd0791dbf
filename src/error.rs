//! Typed error taxonomy for fetch and install, with process exit codes.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from certificate-chain fetching.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The input is not a usable HTTPS URL.
    #[error("invalid url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The host could not be reached before the TLS handshake started.
    #[error("cannot reach {addr}")]
    NetworkUnreachable {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The TLS handshake failed, so no certificate was captured.
    /// Distinct from post-handshake request failures, which are swallowed.
    #[error("TLS handshake with {host} failed")]
    HandshakeFailed {
        host: String,
        #[source]
        source: std::io::Error,
    },

    /// The presented chain could not be completed up to a locally trusted
    /// root (or the server presented no certificate at all).
    #[error("could not build trust chain: {0}")]
    ChainBuildFailure(String),
}

impl FetchError {
    pub fn exit_code(&self) -> i32 {
        match self {
            FetchError::InvalidUrl { .. } => 2,
            FetchError::NetworkUnreachable { .. } | FetchError::HandshakeFailed { .. } => 3,
            FetchError::ChainBuildFailure(_) => 4,
        }
    }
}

/// Errors from trust-bundle installation.
#[derive(Debug, Error)]
pub enum InstallError {
    /// No Git CA bundle found at any probed install location and no explicit
    /// bundle path was given.
    #[error("no Git CA bundle found; pass --bundle-path to target a bundle directly")]
    ToolNotFound,

    /// The supplied bundle path failed validation; nothing was mutated.
    #[error("invalid bundle path {path}: {reason}")]
    InvalidBundlePath { path: PathBuf, reason: String },

    /// Appending to the bundle file failed.
    #[error("cannot write bundle {path}")]
    FileWriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `git config` failed. The bundle file may already contain the new
    /// entry; there is no rollback of the append.
    #[error("git config failed: {0}")]
    ConfigWriteFailure(String),
}

impl InstallError {
    pub fn exit_code(&self) -> i32 {
        match self {
            InstallError::ToolNotFound => 5,
            InstallError::InvalidBundlePath { .. } => 6,
            InstallError::FileWriteFailure { .. } => 7,
            InstallError::ConfigWriteFailure(_) => 8,
        }
    }
}

/// Map any error surfaced by the CLI to its process exit code.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    if let Some(e) = err.downcast_ref::<FetchError>() {
        return e.exit_code();
    }
    if let Some(e) = err.downcast_ref::<InstallError>() {
        return e.exit_code();
    }
    1
}
