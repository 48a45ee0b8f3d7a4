//! Business services layer.
//!
//! - [`ScanService`]: orchestrates one end-to-end mailbox scan
//! - [`LogBroadcaster`]: fans progress messages out to live subscribers

mod log_service;
mod scan_service;

pub use log_service::LogBroadcaster;
pub use scan_service::{RunSummary, ScanError, ScanService, SEARCH_QUERY};
