//! Mailbox session providers.
//!
//! This module contains the [`Mailbox`] trait and its IMAP implementation.
//! The scan orchestrator drives everything through the trait so that runs
//! can be tested without a live server.

mod imap;
mod traits;

pub use imap::ImapMailbox;
pub use traits::{Mailbox, MailboxError, RawMessage, Result};
