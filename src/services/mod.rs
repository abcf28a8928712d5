pub mod report_session;
pub mod report_writer;

pub use report_session::ReportSession;
pub use report_writer::ReportWriter;
