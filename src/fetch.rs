//! Root-certificate retrieval: TLS handshake capture plus chain building.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::sync::Arc;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{DigitallySignedStruct, SignatureScheme};

use crate::cert::Certificate;
use crate::chain::{self, TrustedRoots};
use crate::error::FetchError;

/// Host, port and request path extracted from an HTTPS URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpsTarget {
    pub host: String,
    pub port: u16,
    pub path: String,
}

impl HttpsTarget {
    /// Parse and validate a URL. Only `https` is accepted: a plain-HTTP
    /// endpoint never presents a certificate, so there is nothing to fetch.
    pub fn parse(url: &str) -> Result<Self, FetchError> {
        let invalid = |reason: &str| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        };

        let uri: http::Uri = url.parse().map_err(|_| invalid("not a valid URL"))?;

        match uri.scheme_str() {
            Some("https") => {}
            Some("http") => return Err(invalid("plain http endpoints present no certificate")),
            _ => return Err(invalid("expected an https:// URL")),
        }

        let host = uri.host().ok_or_else(|| invalid("missing host"))?.to_string();
        let port = uri.port_u16().unwrap_or(443);
        let path = match uri.path_and_query() {
            Some(pq) if !pq.as_str().is_empty() => pq.as_str().to_string(),
            _ => "/".to_string(),
        };

        Ok(Self { host, port, path })
    }
}

/// Fetch the root certificate presented by (and trusted for) an HTTPS URL,
/// validating the chain against the platform trust store.
pub fn fetch_root_certificate(url: &str) -> Result<Certificate, FetchError> {
    let roots = TrustedRoots::system()
        .map_err(|e| FetchError::ChainBuildFailure(format!("cannot load local trust roots: {e}")))?;
    fetch_root_certificate_with(url, &roots)
}

/// As [`fetch_root_certificate`], with an explicit root store.
pub fn fetch_root_certificate_with(
    url: &str,
    roots: &TrustedRoots,
) -> Result<Certificate, FetchError> {
    let target = HttpsTarget::parse(url)?;
    let presented = capture_presented_chain(&target)?;
    let mut chain = chain::build_chain(&presented, roots)?;
    chain
        .pop()
        .ok_or_else(|| FetchError::ChainBuildFailure("empty chain".to_string()))
}

/// Connect, complete the TLS handshake, and return the certificate chain the
/// server presented (leaf first).
///
/// Failures before or during the handshake propagate; once the handshake has
/// completed the certificates are already in hand, so the follow-up request
/// is fire-and-forget and any I/O error from it is swallowed (a 404 or an
/// early close still yields a usable chain).
fn capture_presented_chain(target: &HttpsTarget) -> Result<Vec<Vec<u8>>, FetchError> {
    let addr = format!("{}:{}", target.host, target.port);
    let sock = TcpStream::connect(&addr).map_err(|e| FetchError::NetworkUnreachable {
        addr: addr.clone(),
        source: e,
    })?;

    let server_name = ServerName::try_from(target.host.clone()).map_err(|_| {
        FetchError::InvalidUrl {
            url: addr.clone(),
            reason: "host is not a valid server name".to_string(),
        }
    })?;

    let conn = rustls::ClientConnection::new(Arc::new(capture_client_config()), server_name)
        .map_err(|e| FetchError::HandshakeFailed {
            host: target.host.clone(),
            source: std::io::Error::other(e),
        })?;
    let mut tls = rustls::StreamOwned::new(conn, sock);

    while tls.conn.is_handshaking() {
        if let Err(e) = tls.conn.complete_io(&mut tls.sock) {
            return Err(FetchError::HandshakeFailed {
                host: target.host.clone(),
                source: e,
            });
        }
    }

    // The response itself is discarded; only the handshake side effect
    // matters. Errors from here on are the expected request-may-fail case.
    let request = format!(
        "GET {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
        target.path, target.host
    );
    let _ = tls.write_all(request.as_bytes());
    let _ = tls.flush();
    let mut sink = [0u8; 4096];
    loop {
        match tls.read(&mut sink) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
    }

    Ok(tls
        .conn
        .peer_certificates()
        .map(|certs| certs.iter().map(|c| c.as_ref().to_vec()).collect())
        .unwrap_or_default())
}

fn capture_client_config() -> rustls::ClientConfig {
    rustls::ClientConfig::builder()
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(PresentedChainVerifier::new()))
        .with_no_client_auth()
}

/// Accepts whatever chain the server presents so the handshake always
/// carries the certificates; trust is decided afterwards by
/// [`chain::build_chain`] against the local root store. Handshake signatures
/// are still verified normally.
#[derive(Debug)]
struct PresentedChainVerifier {
    algs: rustls::crypto::WebPkiSupportedAlgorithms,
}

impl PresentedChainVerifier {
    fn new() -> Self {
        Self {
            algs: rustls::crypto::ring::default_provider().signature_verification_algorithms,
        }
    }
}

impl ServerCertVerifier for PresentedChainVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls12_signature(message, cert, dss, &self.algs)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls13_signature(message, cert, dss, &self.algs)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.algs.supported_schemes()
    }
}
