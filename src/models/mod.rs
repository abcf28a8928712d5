pub mod batch;
pub mod loaders;
pub mod lookup;
pub mod progress;
pub mod report;

pub use batch::{BatchEntry, BatchResult, BatchRow, ReportItem, ReportPayload, ReportRow};
pub use loaders::{extract, extract_rows, parse_line, Extraction};
pub use lookup::{ConfidenceBand, LookupOutcome, LookupRequest, PersonRecord};
pub use progress::{progress_fraction, BatchState, ProgressEvent, ProgressState};
pub use report::{ReportResponse, ReportToken, ReportTokens};
