//! Output formatting and PDF generation

pub mod formatter;
pub mod pdf;

pub use formatter::{ConsoleFormatter, JsonFormatter, OutputFormatter};
pub use pdf::{MatchReportInput, PdfRenderer};
