//! Chain building against locally trusted root authorities.

use anyhow::Result;
use std::collections::HashMap;
use x509_parser::prelude::FromDer;

use crate::cert::Certificate;
use crate::error::FetchError;

/// Maximum chain depth, guards against issuer cycles in presented certs.
const MAX_CHAIN_DEPTH: usize = 32;

/// Ordered certificates, leaf first, root last.
pub type CertificateChain = Vec<Certificate>;

/// Locally trusted CA certificates, indexed by raw subject DER so issuer
/// lookups are exact byte comparisons rather than string matching.
pub struct TrustedRoots {
    by_subject: HashMap<Vec<u8>, Vec<Vec<u8>>>,
    count: usize,
}

impl std::fmt::Debug for TrustedRoots {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrustedRoots").field("count", &self.count).finish()
    }
}

impl Default for TrustedRoots {
    fn default() -> Self {
        Self::new()
    }
}

impl TrustedRoots {
    pub fn new() -> Self {
        Self {
            by_subject: HashMap::new(),
            count: 0,
        }
    }

    /// Load the platform trust store (the same roots the OS TLS stack uses).
    /// Unparseable entries are skipped, matching how TLS clients treat the
    /// native store.
    pub fn system() -> Result<Self> {
        let mut roots = Self::new();
        for der in rustls_native_certs::load_native_certs()? {
            let _ = roots.add_der(der.as_ref());
        }
        Ok(roots)
    }

    /// Load roots from concatenated PEM (a trust bundle).
    pub fn from_pem(pem: &[u8]) -> Result<Self> {
        let mut roots = Self::new();
        for der in rustls_pemfile::certs(&mut &pem[..]) {
            roots.add_der(der?.as_ref())?;
        }
        Ok(roots)
    }

    /// Add a single DER certificate.
    pub fn add_der(&mut self, der: &[u8]) -> Result<()> {
        let (_, cert) = x509_parser::prelude::X509Certificate::from_der(der)
            .map_err(|e| anyhow::anyhow!("parse X.509: {e:?}"))?;
        let subject = cert.subject().as_raw().to_vec();
        self.by_subject.entry(subject).or_default().push(der.to_vec());
        self.count += 1;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// First trusted certificate whose subject matches the given raw DER name.
    fn find_by_subject(&self, subject_raw: &[u8]) -> Option<&[u8]> {
        self.by_subject
            .get(subject_raw)
            .and_then(|v| v.first())
            .map(|d| d.as_slice())
    }

    /// Whether this exact certificate is in the store.
    fn contains(&self, subject_raw: &[u8], der: &[u8]) -> bool {
        self.by_subject
            .get(subject_raw)
            .is_some_and(|v| v.iter().any(|d| d == der))
    }
}

struct ParsedNames {
    subject: Vec<u8>,
    issuer: Vec<u8>,
}

fn parse_names(der: &[u8]) -> Result<ParsedNames, FetchError> {
    let (_, cert) = x509_parser::prelude::X509Certificate::from_der(der).map_err(|e| {
        FetchError::ChainBuildFailure(format!("presented certificate is not valid X.509: {e:?}"))
    })?;
    Ok(ParsedNames {
        subject: cert.subject().as_raw().to_vec(),
        issuer: cert.issuer().as_raw().to_vec(),
    })
}

fn to_cert(der: &[u8]) -> Result<Certificate, FetchError> {
    Certificate::from_der(der).map_err(|e| FetchError::ChainBuildFailure(e.to_string()))
}

/// Build the full chain for a presented leaf (leaf first), walking issuers
/// through the presented certificates and terminating at a certificate found
/// in the local trust store. Self-signed certificates terminate the walk and
/// must themselves be trusted; an incompletable chain is a hard failure, the
/// leaf is never returned as a fallback.
pub fn build_chain(
    presented: &[Vec<u8>],
    roots: &TrustedRoots,
) -> Result<CertificateChain, FetchError> {
    if presented.is_empty() {
        return Err(FetchError::ChainBuildFailure(
            "server presented no certificate".to_string(),
        ));
    }

    let parsed: Vec<ParsedNames> = presented
        .iter()
        .map(|der| parse_names(der))
        .collect::<Result<_, _>>()?;

    let mut chain: CertificateChain = vec![to_cert(&presented[0])?];
    let mut used = vec![false; presented.len()];
    used[0] = true;
    let mut current = 0usize;

    for _ in 0..MAX_CHAIN_DEPTH {
        let cur = &parsed[current];

        if cur.subject == cur.issuer {
            if roots.contains(&cur.subject, &presented[current]) {
                return Ok(chain);
            }
            return Err(FetchError::ChainBuildFailure(format!(
                "self-signed certificate '{}' is not locally trusted",
                chain[chain.len() - 1].subject()
            )));
        }

        // Prefer issuers the server itself presented (intermediates).
        if let Some((idx, _)) = parsed
            .iter()
            .enumerate()
            .find(|(i, p)| !used[*i] && p.subject == cur.issuer)
        {
            chain.push(to_cert(&presented[idx])?);
            used[idx] = true;
            current = idx;
            continue;
        }

        // Otherwise the issuer must be a locally trusted root.
        if let Some(root_der) = roots.find_by_subject(&cur.issuer) {
            chain.push(to_cert(root_der)?);
            return Ok(chain);
        }

        return Err(FetchError::ChainBuildFailure(format!(
            "issuer of '{}' not found among presented certificates or local roots",
            chain[chain.len() - 1].subject()
        )));
    }

    Err(FetchError::ChainBuildFailure(
        "chain exceeds maximum depth".to_string(),
    ))
}
