//! Loading the HTTPS listener's certificate and key.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use log::info;
use rustls::ServerConfig as TlsServerConfig;
use tokio_rustls::TlsAcceptor;

use crate::server::error::Error;

/// Build a TLS acceptor from a PEM certificate chain and private key.
pub fn load_tls_acceptor(cert_path: &Path, key_path: &Path) -> Result<TlsAcceptor, Error> {
    let mut cert_file = BufReader::new(File::open(cert_path).map_err(|e| {
        Error::TlsError(format!("Failed to open certificate file {}: {e}", cert_path.display()))
    })?);
    let mut key_file = BufReader::new(File::open(key_path).map_err(|e| {
        Error::TlsError(format!("Failed to open private key file {}: {e}", key_path.display()))
    })?);

    let certs = rustls_pemfile::certs(&mut cert_file)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| Error::TlsError(format!("Failed to read certificate: {e}")))?;
    if certs.is_empty() {
        return Err(Error::TlsError("No valid certificate found".to_string()));
    }

    let private_key = rustls_pemfile::private_key(&mut key_file)
        .map_err(|e| Error::TlsError(format!("Failed to read private key: {e}")))?
        .ok_or_else(|| Error::TlsError("No valid private key found".to_string()))?;

    let config = TlsServerConfig::builder_with_provider(Arc::new(rustls::crypto::ring::default_provider()))
        .with_safe_default_protocol_versions()
        .map_err(|e| Error::TlsError(format!("Unsupported protocol versions: {e}")))?
        .with_no_client_auth()
        .with_single_cert(certs, private_key)
        .map_err(|e| Error::TlsError(format!("Failed to create TLS config: {e}")))?;

    info!("Loaded TLS certificate from {}", cert_path.display());
    Ok(TlsAcceptor::from(Arc::new(config)))
}
