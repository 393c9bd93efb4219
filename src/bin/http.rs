#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::net::SocketAddr;

    use client_agenda::{AgendaConfig, FileRecordStore, http_api, logging};

    let config = AgendaConfig::load()?;
    logging::init_logger(&config.log_filter);

    let addr: SocketAddr = config.http_addr.parse()?;
    tracing::info!(data_dir = %config.data_dir.display(), "using file store");

    let store = FileRecordStore::new(&config.data_dir);
    http_api::serve(addr, store).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
