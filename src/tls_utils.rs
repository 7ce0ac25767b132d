use crate::config::Config;
use rustls::{ClientConfig, RootCertStore, pki_types::CertificateDer};
use rustls_pemfile::certs;
use std::{
    fs::File,
    io::{self, BufRead, BufReader, Cursor},
    sync::Arc,
};

/// Builds a `RootCertStore` that trusts ONLY the certificates in `pem`.
///
/// # Errors
///
/// Returns an `io::Error` if the PEM data is invalid or contains no certificates.
pub fn build_pinned_root_store(pem: &[u8]) -> io::Result<RootCertStore> {
    root_store_from_reader(&mut Cursor::new(pem))
}

/// Same as [`build_pinned_root_store`], reading the CA bundle from disk.
///
/// # Errors
///
/// Returns an `io::Error` if the file cannot be opened or holds no valid certificate.
pub fn load_pinned_root_store(path: &str) -> io::Result<RootCertStore> {
    let file =
        File::open(path).map_err(|e| io::Error::new(e.kind(), format!("opening CA {path}: {e}")))?;
    root_store_from_reader(&mut BufReader::new(file))
}

fn root_store_from_reader(reader: &mut dyn BufRead) -> io::Result<RootCertStore> {
    let ca_certs: Vec<CertificateDer<'static>> = certs(reader)
        .collect::<Result<_, _>>()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("invalid CA PEM: {e}")))?;

    if ca_certs.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "CA PEM did not contain any certificates",
        ));
    }

    let mut root_store = RootCertStore::empty();
    for cert in ca_certs {
        root_store
            .add(cert)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("bad CA cert: {e}")))?;
    }
    Ok(root_store)
}

/// TLS settings for `wss://` signaling.
///
/// With `[Signaling] tls_ca` set, only that CA is trusted. Without it,
/// `None` is returned and the WebSocket layer falls back to the bundled
/// webpki roots.
///
/// # Errors
///
/// Returns an `io::Error` when the configured CA file is unreadable or invalid.
pub fn build_signaling_client_config(config: &Config) -> io::Result<Option<Arc<ClientConfig>>> {
    let Some(path) = config.get_non_empty("Signaling", "tls_ca") else {
        return Ok(None);
    };
    let root_store = load_pinned_root_store(path)?;

    let config = ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    Ok(Some(Arc::new(config)))
}
