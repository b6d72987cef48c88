pub mod record;
pub mod selection;

pub use record::{sort_records, InvoiceRecord, SortField, SortOrder, SortState};
pub use selection::Selection;
