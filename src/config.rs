//! Connection configuration.

use std::path::{Path, PathBuf};

use serde_derive::Deserialize;

use crate::errors::Error;

/// Everything needed to reach one server. Built once, never mutated; the
/// connection takes ownership on `connect`.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub user: String,
    pub database: String,
    #[serde(default)]
    pub password: Option<String>,
    /// Reported to the server in the startup message when set.
    #[serde(default)]
    pub application_name: Option<String>,
    /// Present = request a TLS upgrade before the startup handshake.
    #[serde(default)]
    pub tls: Option<TlsConfig>,
}

fn default_port() -> u16 {
    5432
}

/// TLS material and verification policy.
///
/// Verification is on by default. Turning `verify_hostname` off is the
/// supported way to talk to servers with self-signed certificates whose
/// subject does not match the host; turning `verify_server_certificate`
/// off disables chain validation entirely and is for test setups only.
#[derive(Debug, Clone, Deserialize)]
pub struct TlsConfig {
    /// Client certificate, PEM.
    #[serde(default)]
    pub cert_path: Option<PathBuf>,
    /// Client private key, PEM (PKCS#8).
    #[serde(default)]
    pub key_path: Option<PathBuf>,
    /// Additional trusted root, PEM. System roots are always consulted.
    #[serde(default)]
    pub ca_path: Option<PathBuf>,
    #[serde(default = "default_true")]
    pub verify_server_certificate: bool,
    #[serde(default = "default_true")]
    pub verify_hostname: bool,
}

fn default_true() -> bool {
    true
}

impl Default for TlsConfig {
    fn default() -> Self {
        TlsConfig {
            cert_path: None,
            key_path: None,
            ca_path: None,
            verify_server_certificate: true,
            verify_hostname: true,
        }
    }
}

impl ConnectionConfig {
    /// Load the configuration from a TOML document.
    pub async fn from_file(path: &Path) -> Result<ConnectionConfig, Error> {
        let contents = tokio::fs::read_to_string(path).await.map_err(|err| {
            Error::BadConfig(format!("could not read {}: {err}", path.display()))
        })?;

        toml::from_str(&contents)
            .map_err(|err| Error::BadConfig(format!("TOML parse error: {err}")))
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_document() {
        let config: ConnectionConfig = toml::from_str(
            r#"
            host = "localhost"
            user = "app"
            database = "appdb"
            "#,
        )
        .unwrap();

        assert_eq!(config.port, 5432);
        assert_eq!(config.server_addr(), "localhost:5432");
        assert!(config.password.is_none());
        assert!(config.tls.is_none());
    }

    #[test]
    fn parses_tls_section_with_verification_defaults() {
        let config: ConnectionConfig = toml::from_str(
            r#"
            host = "db.internal"
            port = 5444
            user = "app"
            database = "appdb"
            password = "secret"

            [tls]
            ca_path = "/etc/certs/ca.pem"
            "#,
        )
        .unwrap();

        let tls = config.tls.unwrap();
        assert_eq!(tls.ca_path.as_deref(), Some(Path::new("/etc/certs/ca.pem")));
        assert!(tls.verify_server_certificate);
        assert!(tls.verify_hostname);
        assert!(tls.cert_path.is_none());
    }
}
