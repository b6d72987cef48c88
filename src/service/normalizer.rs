use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use crate::models::InvoiceRecord;

/// Key under `outputs` that carries the contract rows.
pub const RESULTS_KEY: &str = "결과";

const LABEL_COMPANY: &str = "회사명";
const LABEL_AMOUNT: &str = "최종금액";
const LABEL_CONTACT_NAME: &str = "담당자";
const LABEL_CONTACT_EMAIL: &str = "담당자 이메일";
const LABEL_ISSUE_DATE: &str = "발행일";
const LABEL_DESCRIPTION: &str = "설명";

lazy_static! {
    static ref FENCE_OPEN: Regex = Regex::new(r"^```[A-Za-z0-9_]*\n?").unwrap();
    static ref FENCE_CLOSE: Regex = Regex::new(r"\n?```$").unwrap();
    static ref FOREIGN_NULL: Regex = Regex::new(r":\s*None").unwrap();
}

/// The workflow `결과` value, classified once before any record mapping.
#[derive(Debug)]
enum Results<'a> {
    /// No `data.outputs.결과`, or it is falsy.
    Missing,
    /// Structured JSON delivered as-is.
    Inline(&'a Value),
    /// JSON text, possibly fenced and using `None` for null.
    Text(&'a str),
}

fn classify(payload: &Value) -> Results<'_> {
    match nested_results(payload.get("data")) {
        None => Results::Missing,
        Some(Value::String(text)) => Results::Text(text),
        Some(value) => Results::Inline(value),
    }
}

/// `outputs.결과` of `container`, if present and truthy.
fn nested_results(container: Option<&Value>) -> Option<&Value> {
    container?
        .get("outputs")?
        .get(RESULTS_KEY)
        .filter(|v| is_truthy(v))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Reduces any accepted workflow response shape to canonical records.
///
/// Never fails: unknown shapes and unparsable text yield an empty list.
pub fn normalize(payload: &Value) -> Vec<InvoiceRecord> {
    match classify(payload) {
        Results::Missing => {
            tracing::info!("no valid data structure found in workflow response");
            Vec::new()
        }
        Results::Inline(value) => records_from(value),
        Results::Text(text) => match parse_results_text(text) {
            Some(parsed) => records_from(working_value(&parsed)),
            None => Vec::new(),
        },
    }
}

/// Removes a surrounding code fence; either marker may be missing.
pub fn strip_code_fence(text: &str) -> String {
    let trimmed = text.trim();
    let opened = FENCE_OPEN.replace(trimmed, "");
    let closed = FENCE_CLOSE.replace(&opened, "");
    closed.trim().to_string()
}

/// Rewrites the Python `None` literal in value position to JSON `null`.
pub fn replace_foreign_null(text: &str) -> String {
    FOREIGN_NULL.replace_all(text, ": null").into_owned()
}

fn parse_results_text(text: &str) -> Option<Value> {
    let cleaned = replace_foreign_null(&strip_code_fence(text));
    match serde_json::from_str::<Value>(&cleaned) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::error!(error = %e, cleaned = %cleaned, "failed to parse workflow results string");
            None
        }
    }
}

/// Nested `outputs.결과` when the text wrapped a whole response, else the parsed value itself.
fn working_value(parsed: &Value) -> &Value {
    nested_results(Some(parsed)).unwrap_or(parsed)
}

fn records_from(value: &Value) -> Vec<InvoiceRecord> {
    let Value::Array(items) = value else {
        tracing::warn!("workflow results are not an array, ignoring");
        return Vec::new();
    };

    let records: Vec<InvoiceRecord> = items
        .iter()
        .enumerate()
        .map(|(idx, item)| record_from_item(idx + 1, item))
        .collect();

    tracing::info!("parsed {} records from workflow results", records.len());
    records
}

fn record_from_item(position: usize, item: &Value) -> InvoiceRecord {
    InvoiceRecord {
        id: position.to_string(),
        company: text_field(item, LABEL_COMPANY),
        amount: amount_field(item.get(LABEL_AMOUNT)),
        contact_name: text_field(item, LABEL_CONTACT_NAME),
        contact_email: text_field(item, LABEL_CONTACT_EMAIL),
        issue_date: text_field(item, LABEL_ISSUE_DATE),
        description: text_field(item, LABEL_DESCRIPTION),
    }
}

fn text_field(item: &Value, label: &str) -> String {
    match item.get(label) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Numeric coercion; anything missing, invalid, negative or non-finite becomes 0.
fn amount_field(value: Option<&Value>) -> f64 {
    let amount = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                0.0
            } else {
                s.parse::<f64>().unwrap_or(0.0)
            }
        }
        Some(Value::Bool(true)) => 1.0,
        _ => 0.0,
    };

    if amount.is_finite() && amount >= 0.0 {
        amount
    } else {
        0.0
    }
}
