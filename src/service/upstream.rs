use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use crate::config::UpstreamConfig;
use crate::error::FetchError;
use crate::models::InvoiceRecord;
use crate::service::normalizer::{self, RESULTS_KEY};

/// Fixed trigger body of the workflow run.
#[derive(Debug, Serialize)]
struct WorkflowRunRequest {
    inputs: serde_json::Map<String, Value>,
    mode: &'static str,
    user: &'static str,
}

impl Default for WorkflowRunRequest {
    fn default() -> Self {
        Self {
            inputs: serde_json::Map::new(),
            mode: "blocking",
            user: "invoice-generator",
        }
    }
}

/// Fetches contract records from the workflow endpoint.
pub struct RecordService {
    http: reqwest::Client,
    config: UpstreamConfig,
}

impl RecordService {
    pub fn new(config: UpstreamConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { http, config })
    }

    /// Runs the workflow and normalizes its response.
    pub async fn fetch_records(&self) -> Result<Vec<InvoiceRecord>, FetchError> {
        let payload = self.run_workflow().await?;
        log_payload_shape(&payload);

        let records = normalizer::normalize(&payload);
        report_empty_fields(&records);
        Ok(records)
    }

    /// Raw workflow response; credentials are checked here, not at startup.
    pub async fn run_workflow(&self) -> Result<Value, FetchError> {
        let (Some(url), Some(key)) = (non_blank(&self.config.url), non_blank(&self.config.key))
        else {
            tracing::warn!("missing upstream credentials");
            return Err(FetchError::MissingCredentials);
        };

        let endpoint = format!("{}/workflows/run", url.trim_end_matches('/'));
        tracing::info!(endpoint = %endpoint, "calling workflow endpoint");

        let response = self
            .http
            .post(&endpoint)
            .bearer_auth(key)
            .json(&WorkflowRunRequest::default())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<Value>(&body)
                .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));
            tracing::error!(status = status.as_u16(), detail = %detail, "workflow endpoint returned an error");
            return Err(FetchError::from_upstream(status.as_u16(), detail));
        }

        Ok(response.json::<Value>().await?)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn log_payload_shape(payload: &Value) {
    let outputs = payload.get("data").and_then(|d| d.get("outputs"));
    let output_keys: Vec<&str> = outputs
        .and_then(Value::as_object)
        .map(|o| o.keys().map(String::as_str).collect())
        .unwrap_or_default();

    tracing::info!(
        has_data = payload.get("data").is_some(),
        has_outputs = outputs.is_some(),
        has_results = outputs.and_then(|o| o.get(RESULTS_KEY)).is_some(),
        output_keys = ?output_keys,
        "workflow response structure"
    );
}

fn report_empty_fields(records: &[InvoiceRecord]) {
    if records.is_empty() {
        tracing::warn!("workflow returned no records");
        return;
    }

    for record in records {
        let mut empty = Vec::new();
        if record.company.is_empty() {
            empty.push("회사명");
        }
        if record.amount == 0.0 {
            empty.push("최종금액");
        }
        if record.contact_name.is_empty() {
            empty.push("담당자");
        }
        if record.contact_email.is_empty() {
            empty.push("담당자 이메일");
        }
        if !empty.is_empty() {
            tracing::warn!(id = %record.id, fields = %empty.join(", "), "record has empty fields");
        }
    }
}
