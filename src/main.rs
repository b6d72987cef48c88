use invoice_generator::{router, AppConfig, AppState};
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logging: local time, filter from RUST_LOG
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // Configuration
    let config = AppConfig::load()?;
    info!("Starting server with config: {:?}", config);
    if config.upstream.url.is_none() || config.upstream.key.is_none() {
        info!("MISO_URL / MISO_KEY not set; record fetches will report a configuration error");
    }

    let state = AppState::from_config(&config)?;
    let app = router(state);

    let addr = config.bind_addr();
    info!("Server listening on {}", addr);
    info!("Endpoints:");
    info!("  GET  /                       - records table");
    info!("  GET  /api/records            - normalized records (JSON)");
    info!("  POST /api/invoices/preview   - single invoice page");
    info!("  POST /api/invoices/print     - stage a print job");
    info!("  GET  /print/:job_id          - print document");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
