//! External service providers.
//!
//! - [`mail`] - mailbox session trait and IMAP implementation

pub mod mail;
