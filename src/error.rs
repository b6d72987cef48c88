use serde_json::Value;
use thiserror::Error;

/// Failures while fetching records from the workflow endpoint.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("MISO 인증 정보가 설정되지 않았습니다. 환경변수를 확인해주세요.")]
    MissingCredentials,

    /// Non-success status; `message` is already user-facing.
    #[error("{message}")]
    Upstream {
        status: u16,
        message: String,
        detail: Value,
    },

    #[error("MISO API 연결에 실패했습니다. 네트워크 연결을 확인해주세요.")]
    Transport(#[from] reqwest::Error),
}

impl FetchError {
    /// Builds the upstream variant from the status and the (possibly empty) error body.
    pub fn from_upstream(status: u16, detail: Value) -> Self {
        let message = match detail.get("detail").filter(|d| !is_blank(d)) {
            Some(Value::String(text)) => format!("오류: {}", text),
            Some(other) => format!("오류: {}", other),
            None => match status {
                400 => "잘못된 요청입니다. 워크플로우가 발행되었는지 확인해주세요.".to_string(),
                401 => "인증에 실패했습니다. API 키를 확인해주세요.".to_string(),
                500 => "서버 내부 오류가 발생했습니다.".to_string(),
                _ => "MISO API 호출에 실패했습니다.".to_string(),
            },
        };
        FetchError::Upstream {
            status,
            message,
            detail,
        }
    }

    /// Upstream status to echo back, if the failure came from upstream.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            FetchError::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
        _ => false,
    }
}

/// Failures of the print export flow.
#[derive(Error, Debug)]
pub enum PrintError {
    #[error("인보이스를 생성할 계약을 선택해주세요.")]
    NoRecords,

    #[error("print job {0} not found")]
    NotFound(String),
}
