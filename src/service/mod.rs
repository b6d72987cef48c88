pub mod normalizer;
pub mod print;
pub mod renderer;
pub mod upstream;

pub use normalizer::normalize;
pub use print::{PrintExporter, PrintSpool, StagedPrint};
pub use renderer::{InvoiceRenderer, RenderContext};
pub use upstream::RecordService;
