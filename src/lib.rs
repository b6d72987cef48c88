pub mod api;
pub mod config;
pub mod error;
pub mod format;
pub mod models;
pub mod service;

pub use api::{router, AppState};
pub use config::AppConfig;
pub use error::{FetchError, PrintError};
pub use models::InvoiceRecord;
pub use service::{normalize, InvoiceRenderer, PrintExporter, RecordService};
