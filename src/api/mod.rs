pub mod errors;
pub mod handlers;
pub mod pages;

use axum::{
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;

use crate::config::AppConfig;
use crate::error::FetchError;
use crate::service::{InvoiceRenderer, PrintExporter, PrintSpool, RecordService};

pub use handlers::*;

/// Shared state: upstream records, renderer and print exporter
#[derive(Clone)]
pub struct AppState {
    pub records: Arc<RecordService>,
    pub renderer: Arc<InvoiceRenderer>,
    pub exporter: Arc<PrintExporter>,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Result<Self, FetchError> {
        let records = Arc::new(RecordService::new(config.upstream.clone())?);
        let renderer = Arc::new(InvoiceRenderer::new(config.issuer.clone()));
        let exporter = Arc::new(PrintExporter::new(
            renderer.clone(),
            Arc::new(PrintSpool::new()),
            config.print.clone(),
        ));
        Ok(Self {
            records,
            renderer,
            exporter,
        })
    }
}

/// Full router: pages, JSON API and print jobs
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::records_page))
        .route("/invoices", post(pages::invoice_action))
        .route("/health", get(handlers::health_check))
        .route("/api/records", get(handlers::list_records))
        .route("/api/invoices/preview", post(handlers::preview_invoice))
        .route("/api/invoices/print", post(handlers::stage_print))
        .route("/print/:job_id", get(handlers::print_document))
        .route("/print/:job_id/done", post(handlers::complete_print))
        .layer(ServiceBuilder::new().layer(middleware::from_fn(log_request)))
        .with_state(state)
}

async fn log_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(req).await;

    tracing::info!(
        %method,
        path = %path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request handled"
    );
    response
}
