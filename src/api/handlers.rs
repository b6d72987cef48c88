use axum::{
    extract::{Json, Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;

use super::errors::json_error;
use super::pages;
use super::AppState;
use crate::error::{FetchError, PrintError};
use crate::format::dates;
use crate::models::InvoiceRecord;
use crate::service::{RenderContext, StagedPrint};

/// Request body: records to preview, 1-based page
#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    pub records: Vec<InvoiceRecord>,
    #[serde(default)]
    pub page: Option<usize>,
}

/// Request body: records to print, in page order
#[derive(Debug, Deserialize)]
pub struct PrintRequest {
    pub records: Vec<InvoiceRecord>,
}

/// Health check
pub async fn health_check() -> &'static str {
    "OK"
}

/// Normalized records from the workflow endpoint
pub async fn list_records(
    State(state): State<AppState>,
) -> Result<Json<Vec<InvoiceRecord>>, FetchError> {
    let records = state.records.fetch_records().await?;
    Ok(Json(records))
}

/// One invoice page of the given records
pub async fn preview_invoice(
    State(state): State<AppState>,
    Json(req): Json<PreviewRequest>,
) -> Response {
    let total_pages = req.records.len();
    if total_pages == 0 {
        return json_error(StatusCode::BAD_REQUEST, pages::EMPTY_PREVIEW_MESSAGE);
    }

    let page_number = req.page.unwrap_or(1).clamp(1, total_pages);
    let ctx = RenderContext {
        page_number,
        total_pages,
        today: dates::today(),
    };
    let page = state.renderer.render(&req.records[page_number - 1], &ctx);
    let title = format!("인보이스 미리보기 {} / {}", page_number, total_pages);

    Html(pages::document_shell(&title, &page)).into_response()
}

/// Stages a print job and returns where to open it
pub async fn stage_print(
    State(state): State<AppState>,
    Json(req): Json<PrintRequest>,
) -> Result<Json<StagedPrint>, PrintError> {
    let staged = state.exporter.export(&req.records, dates::today())?;
    Ok(Json(staged))
}

/// The staged print document
pub async fn print_document(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Response, PrintError> {
    let html = state.exporter.document(&job_id)?;
    Ok(([(header::CACHE_CONTROL, "no-store")], Html(html)).into_response())
}

/// Completion signal sent by the print document after `afterprint`
pub async fn complete_print(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> StatusCode {
    state.exporter.complete(&job_id);
    StatusCode::NO_CONTENT
}
