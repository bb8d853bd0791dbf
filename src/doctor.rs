//! Doctor command: health checks for the Git trust setup.

use anyhow::Result;

use crate::chain::TrustedRoots;
use crate::platform::{GitConfigWriter, InstallLocator};

/// Result of a single check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub ok: bool,
    pub message: String,
}

/// Run all doctor checks.
pub fn run_checks(
    locator: &dyn InstallLocator,
    git: &dyn GitConfigWriter,
) -> Result<Vec<CheckResult>> {
    let mut results = Vec::new();

    // 1. A tool-shipped bundle exists at one of the probed locations
    let candidates = locator.candidate_bundles();
    let existing: Vec<_> = candidates.iter().filter(|p| p.is_file()).collect();
    if existing.is_empty() {
        results.push(CheckResult {
            ok: false,
            message: format!(
                "No Git CA bundle found at any probed location ({} probed). \
                 'install-cert' will need an explicit --bundle-path.",
                candidates.len()
            ),
        });
    } else {
        results.push(CheckResult {
            ok: true,
            message: format!(
                "Found Git CA bundle: {}",
                existing[0].display()
            ),
        });
    }

    // 2. Configured http.sslCAInfo points at a readable PEM bundle
    match git.get_ssl_ca_info() {
        None => {
            results.push(CheckResult {
                ok: true,
                message: "http.sslCAInfo not set; Git uses its shipped bundle.".to_string(),
            });
        }
        Some(path) if !path.is_file() => {
            results.push(CheckResult {
                ok: false,
                message: format!(
                    "http.sslCAInfo points at missing file {}. Re-run 'gitca install-cert'.",
                    path.display()
                ),
            });
        }
        Some(path) => match std::fs::read(&path) {
            Err(e) => {
                results.push(CheckResult {
                    ok: false,
                    message: format!("cannot read configured bundle {}: {e}", path.display()),
                });
            }
            Ok(content) => match TrustedRoots::from_pem(&content) {
                Ok(roots) => {
                    results.push(CheckResult {
                        ok: true,
                        message: format!(
                            "Configured bundle {} holds {} certificate(s)",
                            path.display(),
                            roots.len()
                        ),
                    });
                }
                Err(e) => {
                    results.push(CheckResult {
                        ok: false,
                        message: format!(
                            "configured bundle {} is not valid PEM: {e}",
                            path.display()
                        ),
                    });
                }
            },
        },
    }

    Ok(results)
}
