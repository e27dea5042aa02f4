//! Client certificate access for the identity middleware.
//!
//! This crate terminates no TLS. The server hosting the middleware owns the
//! rustls acceptor and must insert [`PeerCertificates`] into each request's
//! extensions for connections that presented a verified client chain, e.g.
//! with an `axum::Extension` layer built per accepted connection. Without
//! it every caller resolves to the default user.

use std::sync::Arc;

use rustls_pki_types::CertificateDer;
use x509_parser::prelude::{FromDer, X509Certificate};

/// Verified client certificate chain of the connection a request arrived on.
///
/// The TLS acceptor inserts this into the request extensions after rustls has
/// verified the chain against the configured client CA. The leaf certificate
/// comes first. Plain-text connections carry no `PeerCertificates`.
#[derive(Debug, Clone)]
pub struct PeerCertificates(Arc<[CertificateDer<'static>]>);

impl PeerCertificates {
    #[must_use]
    pub fn new(chain: Vec<CertificateDer<'static>>) -> Self {
        Self(chain.into())
    }

    /// Leaf certificate of the verified chain.
    #[must_use]
    pub fn leaf(&self) -> Option<&CertificateDer<'static>> {
        self.0.first()
    }

    /// Subject common name of the leaf certificate.
    ///
    /// Returns `None` for an empty chain, an unparsable leaf, or a leaf without
    /// a UTF-8 common name.
    #[must_use]
    pub fn leaf_common_name(&self) -> Option<String> {
        self.leaf().and_then(|der| common_name(der.as_ref()))
    }
}

/// Extract the subject common name from a DER-encoded certificate.
#[must_use]
pub fn common_name(der: &[u8]) -> Option<String> {
    let (_, cert) = X509Certificate::from_der(der)
        .map_err(|e| tracing::debug!(error = %e, "Failed to parse client certificate"))
        .ok()?;

    cert.subject()
        .iter_common_name()
        .next()
        .and_then(|cn| cn.as_str().ok())
        .map(str::to_owned)
}
