use deadpool_postgres::{Config, Pool, Runtime};
use std::env;
use tokio_postgres_rustls::MakeRustlsConnect;

/// builds the connection pool from DATABASE_URL with TLS enabled
pub fn create_pool() -> Result<Pool, Box<dyn std::error::Error + Send + Sync>> {
    let database_url =
        env::var("DATABASE_URL").map_err(|_| "DATABASE_URL environment variable not set")?;

    let mut config = Config::new();
    config.url = Some(database_url);
    let mut root_store = rustls::RootCertStore::empty();
    root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    let tls = MakeRustlsConnect::new(
        rustls::ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth(),
    );
    let pool = config.create_pool(Some(Runtime::Tokio1), tls)?;
    Ok(pool)
}
