pub mod reporter;

pub use reporter::{StatusEvent, report_status, report_warning_code};
