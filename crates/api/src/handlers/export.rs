//! Shared tail of every export endpoint.
//!
//! Handlers fetch their rows, run the same `stocktake_core::view`
//! filter/sort the list endpoint uses, snapshot a [`Table`], and hand
//! it here. CSV and HTML are cheap string work; PDF composition is
//! CPU-bound and runs on the blocking pool under the configured
//! timeout, so a huge export cannot pin a runtime worker forever.

use std::time::Duration;

use axum::body::Body;
use axum::http::{header, StatusCode};
use axum::response::Response;
use chrono::Utc;
use stocktake_core::error::CoreError;
use stocktake_core::export::{csv, export_filename, html, pdf, Table};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Download format selected by the `{format}` path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Pdf,
    Html,
}

impl ExportFormat {
    /// Parse a path segment; unknown formats are a 400.
    pub fn from_path(segment: &str) -> Result<Self, AppError> {
        match segment {
            "csv" => Ok(Self::Csv),
            "pdf" => Ok(Self::Pdf),
            "html" => Ok(Self::Html),
            other => Err(AppError::BadRequest(format!(
                "Unknown export format '{other}'. Supported: csv, pdf, html"
            ))),
        }
    }

    fn content_type(self) -> &'static str {
        match self {
            Self::Csv => "text/csv; charset=utf-8",
            Self::Pdf => "application/pdf",
            Self::Html => "text/html; charset=utf-8",
        }
    }

    fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Pdf => "pdf",
            Self::Html => "html",
        }
    }
}

/// Serialize a table and wrap it as an attachment download.
pub async fn export_attachment(
    state: &AppState,
    entity: &str,
    format: ExportFormat,
    table: Table,
) -> AppResult<Response> {
    let filename = export_filename(entity, Utc::now().date_naive(), format.extension());

    let bytes: Vec<u8> = match format {
        ExportFormat::Csv => csv::write_csv(&table)
            .map_err(|e| AppError::InternalError(format!("CSV serialization failed: {e}")))?,
        ExportFormat::Html => html::write_html(&table).into_bytes(),
        ExportFormat::Pdf => render_pdf(state, table).await?,
    };

    tracing::info!(%filename, bytes = bytes.len(), "Export rendered");

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, format.content_type())
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        )
        .body(Body::from(bytes))
        .map_err(|e| AppError::InternalError(format!("Failed to build export response: {e}")))
}

/// Compose the PDF off the async runtime, bounded by the configured
/// per-request timeout. The blocking task is dropped either way.
async fn render_pdf(state: &AppState, table: Table) -> AppResult<Vec<u8>> {
    let timeout = Duration::from_secs(state.config.export_timeout_secs);
    let task = tokio::task::spawn_blocking(move || pdf::write_pdf(&table));

    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(Ok(bytes))) => Ok(bytes),
        Ok(Ok(Err(e))) => Err(AppError::InternalError(format!(
            "PDF composition failed: {e}"
        ))),
        Ok(Err(join_err)) => Err(AppError::InternalError(format!(
            "PDF composition panicked: {join_err}"
        ))),
        Err(_) => Err(AppError::Core(CoreError::Internal(format!(
            "PDF composition exceeded {}s", state.config.export_timeout_secs
        )))),
    }
}
