//! Immutable certificate value type and PEM encoding.

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use std::path::Path;
use x509_parser::prelude::FromDer;

/// Base64 column width inside a PEM block.
const PEM_LINE_WIDTH: usize = 64;

const PEM_HEADER: &str = "-----BEGIN CERTIFICATE-----";
const PEM_FOOTER: &str = "-----END CERTIFICATE-----";

/// An X.509 certificate captured from a server or read from disk.
///
/// Immutable after construction; subject, issuer and validity are parsed
/// once from the DER so callers never re-touch the raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    der: Vec<u8>,
    subject: String,
    issuer: String,
    not_before: time::OffsetDateTime,
    not_after: time::OffsetDateTime,
}

impl Certificate {
    /// Parse a certificate from DER bytes.
    pub fn from_der(der: &[u8]) -> Result<Self> {
        let (_, cert) = x509_parser::prelude::X509Certificate::from_der(der)
            .map_err(|e| anyhow::anyhow!("parse X.509: {e:?}"))?;

        let validity = cert.validity();
        let not_before = time::OffsetDateTime::from_unix_timestamp(validity.not_before.timestamp())
            .map_err(|e| anyhow::anyhow!("invalid notBefore: {e:?}"))?;
        let not_after = time::OffsetDateTime::from_unix_timestamp(validity.not_after.timestamp())
            .map_err(|e| anyhow::anyhow!("invalid notAfter: {e:?}"))?;

        Ok(Self {
            der: der.to_vec(),
            subject: cert.subject().to_string(),
            issuer: cert.issuer().to_string(),
            not_before,
            not_after,
        })
    }

    /// Read the first certificate from a PEM file.
    pub fn from_pem_file(path: &Path) -> Result<Self> {
        let pem = std::fs::read(path)
            .with_context(|| format!("read certificate: {}", path.display()))?;
        let der = rustls_pemfile::certs(&mut pem.as_slice())
            .next()
            .transpose()
            .with_context(|| format!("parse PEM: {}", path.display()))?
            .with_context(|| format!("no certificate in {}", path.display()))?;
        Self::from_der(der.as_ref())
    }

    pub fn der(&self) -> &[u8] {
        &self.der
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn not_before(&self) -> time::OffsetDateTime {
        self.not_before
    }

    pub fn not_after(&self) -> time::OffsetDateTime {
        self.not_after
    }

    /// A root CA issues itself.
    pub fn is_self_signed(&self) -> bool {
        self.subject == self.issuer
    }

    /// Encode as a PEM block: header, 64-column base64 of the DER, footer.
    /// No trailing newline after the footer; the installer controls spacing
    /// around the block.
    pub fn to_pem(&self) -> String {
        let b64 = BASE64.encode(&self.der);
        let mut out = String::with_capacity(b64.len() + b64.len() / PEM_LINE_WIDTH + 64);
        out.push_str(PEM_HEADER);
        for chunk in b64.as_bytes().chunks(PEM_LINE_WIDTH) {
            out.push('\n');
            // chunks of base64 output are always valid UTF-8
            out.push_str(std::str::from_utf8(chunk).unwrap_or_default());
        }
        out.push('\n');
        out.push_str(PEM_FOOTER);
        out
    }
}

impl std::fmt::Display for Certificate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (issued by {}, valid {} to {})",
            self.subject,
            self.issuer,
            self.not_before.date(),
            self.not_after.date()
        )
    }
}
