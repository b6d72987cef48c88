use chrono::NaiveDate;
use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::config::PrintConfig;
use crate::error::PrintError;
use crate::models::InvoiceRecord;
use crate::service::renderer::{escape_html, InvoiceRenderer};

/// A composed multi-page print document.
#[derive(Debug, Clone)]
pub struct PrintDocument {
    /// Also the file name the browser suggests for the PDF.
    pub title: String,
    pub html: String,
    pub pages: usize,
}

/// Handle returned to the caller once a job is staged.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StagedPrint {
    pub job_id: String,
    pub url: String,
    pub file_name: String,
    pub pages: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseReason {
    /// The browser reported `afterprint`.
    Completed,
    /// The retention lease ended without a completion signal.
    Expired,
}

/// Print documents waiting for the browser, keyed by job id.
#[derive(Debug, Default)]
pub struct PrintSpool {
    jobs: DashMap<String, PrintDocument>,
}

impl PrintSpool {
    pub fn new() -> Self {
        Self::default()
    }

    fn stage(&self, job_id: &str, document: PrintDocument) {
        self.jobs.insert(job_id.to_string(), document);
    }

    pub fn html(&self, job_id: &str) -> Option<String> {
        self.jobs.get(job_id).map(|doc| doc.html.clone())
    }

    /// Removes a staged job. Only the first call for a job returns `true`.
    pub fn release(&self, job_id: &str, reason: ReleaseReason) -> bool {
        match self.jobs.remove(job_id) {
            Some((_, doc)) => {
                tracing::info!(job_id, ?reason, pages = doc.pages, "print job released");
                true
            }
            None => {
                tracing::debug!(job_id, ?reason, "print job already released");
                false
            }
        }
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

/// Owns a staged job; dropping it releases the job unless it was already released.
pub struct PrintLease {
    spool: Arc<PrintSpool>,
    job_id: String,
}

impl PrintLease {
    fn acquire(spool: Arc<PrintSpool>, job_id: String, document: PrintDocument) -> Self {
        spool.stage(&job_id, document);
        Self { spool, job_id }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }
}

impl Drop for PrintLease {
    fn drop(&mut self) {
        self.spool.release(&self.job_id, ReleaseReason::Expired);
    }
}

/// Composes invoices into print jobs and stages them for the browser.
pub struct PrintExporter {
    renderer: Arc<InvoiceRenderer>,
    spool: Arc<PrintSpool>,
    config: PrintConfig,
}

impl PrintExporter {
    pub fn new(renderer: Arc<InvoiceRenderer>, spool: Arc<PrintSpool>, config: PrintConfig) -> Self {
        Self {
            renderer,
            spool,
            config,
        }
    }

    pub fn spool(&self) -> &Arc<PrintSpool> {
        &self.spool
    }

    /// One A4 page per record, in input order.
    pub fn compose(
        &self,
        records: &[InvoiceRecord],
        today: NaiveDate,
        done_url: &str,
    ) -> Result<PrintDocument, PrintError> {
        if records.is_empty() {
            return Err(PrintError::NoRecords);
        }

        let title = print_file_name(today);
        let pages = self.renderer.render_all(records, today).concat();
        let html = print_document_html(&title, records.len(), &pages, done_url, self.config.grace_ms);

        Ok(PrintDocument {
            title,
            html,
            pages: records.len(),
        })
    }

    /// Stages a print job. It lives until the completion signal or the retention timeout.
    pub fn export(&self, records: &[InvoiceRecord], today: NaiveDate) -> Result<StagedPrint, PrintError> {
        let job_id = Uuid::new_v4().to_string();
        let url = format!("/print/{}", job_id);
        let done_url = format!("{}/done", url);

        let document = self.compose(records, today, &done_url)?;
        let file_name = document.title.clone();
        let pages = document.pages;

        let lease = PrintLease::acquire(self.spool.clone(), job_id.clone(), document);
        let retention = Duration::from_secs(self.config.retention_secs);
        tokio::spawn(async move {
            tokio::time::sleep(retention).await;
            tracing::debug!(job_id = lease.job_id(), "print job retention elapsed");
            drop(lease);
        });

        tracing::info!(job_id = %job_id, pages, "print job staged");
        Ok(StagedPrint {
            job_id,
            url,
            file_name,
            pages,
        })
    }

    /// Completion signal from the browser. Safe to call more than once.
    pub fn complete(&self, job_id: &str) -> bool {
        self.spool.release(job_id, ReleaseReason::Completed)
    }

    pub fn document(&self, job_id: &str) -> Result<String, PrintError> {
        self.spool
            .html(job_id)
            .ok_or_else(|| PrintError::NotFound(job_id.to_string()))
    }
}

pub fn print_file_name(today: NaiveDate) -> String {
    format!("invoices_{}", today.format("%Y-%m-%d"))
}

/// The page is titled for the tab; while printing the title is the PDF file name.
fn print_document_html(
    file_name: &str,
    page_count: usize,
    pages: &str,
    done_url: &str,
    grace_ms: u64,
) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="ko">
<head>
<meta charset="utf-8" />
<title>인보이스 인쇄 ({page_count}건)</title>
<style>
  @page {{ size: A4; margin: 0; }}
  body {{ margin: 0; padding: 0; background: #ffffff; }}
  .invoice-page:last-child {{ page-break-after: auto !important; }}
  @media screen {{
    body {{ background: #f1f5f9; }}
    .invoice-page {{ margin: 20px auto !important; box-shadow: 0 4px 6px -1px rgba(0, 0, 0, 0.1); }}
  }}
</style>
</head>
<body>
<div class="invoice-print-container">
{pages}</div>
<script>
(function () {{
  var done = false;
  var originalTitle = document.title;
  function cleanup() {{
    if (done) {{ return; }}
    done = true;
    document.title = originalTitle;
    window.removeEventListener("afterprint", cleanup);
    if (navigator.sendBeacon) {{ navigator.sendBeacon("{done_url}"); }}
  }}
  window.addEventListener("afterprint", cleanup);
  setTimeout(function () {{
    document.title = "{file_name}";
    window.print();
    setTimeout(cleanup, {grace_ms});
  }}, {grace_ms});
}})();
</script>
</body>
</html>
"#,
        page_count = page_count,
        file_name = escape_html(file_name),
        pages = pages,
        done_url = done_url,
        grace_ms = grace_ms,
    )
}
