//! TLS connector construction from configured PEM material.

use std::path::Path;

use native_tls::{Certificate, Identity, TlsConnector};

use crate::config::TlsConfig;
use crate::errors::{Error, TlsError};

async fn read_pem(path: &Path) -> Result<Vec<u8>, TlsError> {
    tokio::fs::read(path).await.map_err(|err| TlsError::ReadMaterial {
        path: path.display().to_string(),
        source: err,
    })
}

/// Build the connector used to upgrade the stream after the server accepts
/// an SSLRequest.
pub async fn build_connector(config: &TlsConfig) -> Result<tokio_native_tls::TlsConnector, Error> {
    let mut builder = TlsConnector::builder();

    if let Some(ca_path) = &config.ca_path {
        let pem = read_pem(ca_path).await?;
        let certificate = Certificate::from_pem(&pem).map_err(|err| TlsError::InvalidMaterial {
            path: ca_path.display().to_string(),
            source: err,
        })?;
        builder.add_root_certificate(certificate);
    }

    match (&config.cert_path, &config.key_path) {
        (Some(cert_path), Some(key_path)) => {
            let cert_pem = read_pem(cert_path).await?;
            let key_pem = read_pem(key_path).await?;
            let identity =
                Identity::from_pkcs8(&cert_pem, &key_pem).map_err(|err| TlsError::InvalidMaterial {
                    path: cert_path.display().to_string(),
                    source: err,
                })?;
            builder.identity(identity);
        }
        (None, None) => {}
        _ => {
            return Err(Error::BadConfig(
                "tls cert_path and key_path must be provided together".into(),
            ));
        }
    }

    if !config.verify_server_certificate {
        builder.danger_accept_invalid_certs(true);
    }
    if !config.verify_hostname {
        builder.danger_accept_invalid_hostnames(true);
    }

    let connector = builder.build().map_err(TlsError::Connector)?;
    Ok(tokio_native_tls::TlsConnector::from(connector))
}
