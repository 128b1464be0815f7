//! Connect over a TLS-upgraded stream using PEM material from disk.
//!
//! ```sh
//! cargo run --example secure -- conn.toml
//! ```
//!
//! The TOML document holds a `ConnectionConfig` with a `[tls]` section.
//! For self-signed test servers set `verify_hostname = false` there; with
//! no flags set, certificate chain and hostname are both verified.

use std::path::Path;

use pg_courier::{Connection, ConnectionConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "conn.toml".to_string());
    let config = ConnectionConfig::from_file(Path::new(&path)).await?;

    let mut conn = Connection::connect(config).await?;
    println!(
        "connected; server_version = {}",
        conn.server_parameters()
            .get("server_version")
            .unwrap_or("unknown")
    );

    let result = conn.query("SELECT current_user, current_database()").await?;
    for row in &result.statements[0].rows {
        for (column, value) in row.iter() {
            println!("{column} = {}", value.unwrap_or("NULL"));
        }
    }

    conn.disconnect().await?;
    Ok(())
}
