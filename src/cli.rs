//! CLI definitions and command routing.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::cert::Certificate;
use crate::pathenv::EnvMap;
use crate::platform::{default_config_writer, default_locator};

#[derive(Parser)]
#[command(name = "gitca")]
#[command(about = "Fetch server root certificates and trust them in Git")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch the root certificate presented by an HTTPS server, as PEM
    FetchRootCert {
        url: String,
        /// Write the PEM to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Append a certificate to Git's CA bundle and set http.sslCAInfo
    InstallCert {
        /// HTTPS URL to fetch the root certificate from
        #[arg(long, required_unless_present = "cert", conflicts_with = "cert")]
        url: Option<String>,
        /// PEM file with the certificate to install (alternative to --url)
        #[arg(long)]
        cert: Option<PathBuf>,
        /// Existing bundle to append to (default: a copy of Git's own bundle)
        #[arg(long)]
        bundle_path: Option<PathBuf>,
    },
    /// Print a PATH-style variable with duplicate entries removed
    DedupePath {
        /// Variable to read
        #[arg(long, default_value = "PATH")]
        var: String,
    },
    /// Check Git bundle locations and http.sslCAInfo health
    Doctor,
}

/// Run CLI and dispatch to handlers.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::FetchRootCert { url, output } => cmd_fetch(&url, output.as_deref()),
        Commands::InstallCert {
            url,
            cert,
            bundle_path,
        } => cmd_install(url.as_deref(), cert.as_deref(), bundle_path.as_deref()),
        Commands::DedupePath { var } => cmd_dedupe(&var),
        Commands::Doctor => cmd_doctor(),
    }
}

fn cmd_fetch(url: &str, output: Option<&Path>) -> Result<()> {
    let root = crate::fetch::fetch_root_certificate(url)?;
    eprintln!("Root certificate: {root}");

    match output {
        Some(path) => {
            std::fs::write(path, root.to_pem())
                .with_context(|| format!("write {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
        None => println!("{}", root.to_pem()),
    }
    Ok(())
}

fn cmd_install(url: Option<&str>, cert: Option<&Path>, bundle_path: Option<&Path>) -> Result<()> {
    let certificate = match (url, cert) {
        (Some(url), None) => crate::fetch::fetch_root_certificate(url)?,
        (None, Some(path)) => Certificate::from_pem_file(path)?,
        // clap enforces exactly one source
        _ => anyhow::bail!("pass exactly one of --url or --cert"),
    };

    println!("Installing certificate: {certificate}");
    let bundle = crate::install::install_certificate(&certificate, bundle_path)?;
    println!("Appended certificate to {}", bundle.display());
    println!("Configured git http.sslCAInfo = {}", bundle.display());
    Ok(())
}

fn cmd_dedupe(var: &str) -> Result<()> {
    let mut env = EnvMap::from_process();
    let removed = env
        .dedupe(var)
        .with_context(|| format!("variable '{var}' is not set"))?;
    if removed > 0 {
        eprintln!("Removed {removed} duplicate entries from {var}");
    }
    println!("{}", env.get(var).unwrap_or_default());
    Ok(())
}

fn cmd_doctor() -> Result<()> {
    let locator = default_locator();
    let git = default_config_writer();
    let results = crate::doctor::run_checks(locator.as_ref(), git.as_ref())?;

    let mut failed = 0;
    for r in &results {
        let status = if r.ok { "ok  " } else { "FAIL" };
        println!("{status} {}", r.message);
        if !r.ok {
            failed += 1;
        }
    }
    if failed > 0 {
        anyhow::bail!("{failed} check(s) failed");
    }
    Ok(())
}
