//! Mailbox session trait definition.
//!
//! [`Mailbox`] abstracts the remote mail protocol so the scan orchestrator
//! can be exercised against an in-memory fake. The concrete implementation
//! is [`ImapMailbox`](super::ImapMailbox).

use async_trait::async_trait;
use futures::stream::BoxStream;

/// Result type alias for mailbox operations.
pub type Result<T> = std::result::Result<T, MailboxError>;

/// Errors that can occur during mailbox operations.
///
/// All variants are fatal to the run in which they occur. A fetch error
/// does not invalidate messages already delivered by the stream.
#[derive(Debug, thiserror::Error)]
pub enum MailboxError {
    /// Network or protocol-level connection failure.
    #[error("connection error: {0}")]
    Connection(String),

    /// Authentication was rejected by the server.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The folder does not exist or access was denied.
    #[error("folder error: {0}")]
    Folder(String),

    /// The server-side search failed.
    #[error("search failed: {0}")]
    Search(String),

    /// The fetch stream failed with a hard I/O error.
    #[error("fetch failed: {0}")]
    Fetch(String),
}

/// An opaque transcript of one fetched message.
///
/// Owned transiently by the orchestrator for the duration of one message's
/// processing, then discarded.
#[derive(Debug, Clone)]
pub struct RawMessage {
    /// Sequence number of the message within the selected folder.
    pub id: u32,
    /// Complete message transcript (headers plus MIME body).
    pub body: Vec<u8>,
}

/// One authenticated session against a mail server.
///
/// A session is owned exclusively by one scan run and is never shared
/// across runs. Operations must be called in lifecycle order: connect,
/// open a folder, search, fetch, close.
#[async_trait]
pub trait Mailbox: Send {
    /// Establishes the connection and authenticates.
    async fn connect(&mut self) -> Result<()>;

    /// Selects a folder for read-only access.
    async fn open_folder(&mut self, folder: &str) -> Result<()>;

    /// Issues a server-side search and returns matching message ids in
    /// server order.
    async fn search(&mut self, query: &str) -> Result<Vec<u32>>;

    /// Streams one [`RawMessage`] per requested id.
    ///
    /// Delivery order across messages is server-dependent and callers must
    /// not assume it matches `ids`. On a hard error the stream yields the
    /// error and ends; messages already delivered remain valid.
    async fn fetch_stream<'a>(&'a mut self, ids: &'a [u32])
        -> Result<BoxStream<'a, Result<RawMessage>>>;

    /// Releases the connection. Idempotent; safe to call after an error.
    async fn close(&mut self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_includes_category() {
        let auth = MailboxError::Auth("LOGIN rejected".to_string());
        assert_eq!(auth.to_string(), "authentication failed: LOGIN rejected");

        let folder = MailboxError::Folder("no such mailbox".to_string());
        assert!(folder.to_string().contains("folder error"));

        let fetch = MailboxError::Fetch("connection reset".to_string());
        assert!(fetch.to_string().contains("fetch failed"));
    }

    #[test]
    fn raw_message_is_cloneable() {
        let raw = RawMessage {
            id: 7,
            body: b"From: a@b.c\r\n\r\nhi".to_vec(),
        };
        let copy = raw.clone();
        assert_eq!(copy.id, 7);
        assert_eq!(copy.body, raw.body);
    }
}
