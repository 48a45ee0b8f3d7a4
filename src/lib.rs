//! optout - scans a mailbox for unsubscribe links and triggers them.
//!
//! This crate connects to an IMAP mailbox, searches for messages likely to
//! contain an unsubscribe mechanism, extracts candidate links from their
//! HTML bodies, deduplicates them per run, and fires a best-effort request
//! at each newly discovered link — while streaming human-readable progress
//! to any number of live observers.

pub mod config;
pub mod extract;
pub mod mime;
pub mod providers;
pub mod server;
pub mod services;

pub use config::{RunConfig, ServerConfig};
pub use services::{LogBroadcaster, RunSummary, ScanService};
