//! Connect without TLS, run a couple of queries, print the rows.
//!
//! ```sh
//! cargo run --example simple -- localhost 5432 app appdb secret
//! ```

use pg_courier::{Connection, ConnectionConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let config = ConnectionConfig {
        host: args.next().unwrap_or_else(|| "localhost".to_string()),
        port: args.next().and_then(|p| p.parse().ok()).unwrap_or(5432),
        user: args.next().unwrap_or_else(|| "postgres".to_string()),
        database: args.next().unwrap_or_else(|| "postgres".to_string()),
        password: args.next(),
        application_name: Some("pg_courier".to_string()),
        tls: None,
    };

    let mut conn = Connection::connect(config).await?;

    for sql in ["SELECT version()", "SELECT 1 AS one; SELECT 2 AS two"] {
        println!("query: {sql}");
        let result = conn.query(sql).await?;
        for statement in &result.statements {
            println!("  {}", statement.command_tag);
            for row in &statement.rows {
                for (column, value) in row.iter() {
                    println!("    {column} = {}", value.unwrap_or("NULL"));
                }
            }
        }
    }

    conn.disconnect().await?;
    Ok(())
}
