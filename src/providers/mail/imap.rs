//! IMAP mailbox session implementation.
//!
//! Connects over TLS on the standard secure IMAP port (993) using
//! `async-imap` on top of tokio + rustls, with the tokio-util compat layer
//! bridging the futures-flavored async read/write traits that `async-imap`
//! expects.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tokio_rustls::TlsConnector;
use tokio_util::compat::{Compat, TokioAsyncReadCompatExt};

use super::{Mailbox, MailboxError, RawMessage, Result};
use crate::config::RunConfig;

/// Standard secure IMAP port.
const IMAPS_PORT: u16 = 993;

/// Type alias for the IMAP session with TLS (using tokio-util compat layer).
type ImapSession = async_imap::Session<Compat<TlsStream<TcpStream>>>;

/// An IMAP implementation of [`Mailbox`].
///
/// Owns one connection for the lifetime of one scan run.
pub struct ImapMailbox {
    host: String,
    email: String,
    password: String,
    session: Option<ImapSession>,
}

impl ImapMailbox {
    /// Creates a disconnected mailbox for the account in `config`.
    pub fn new(config: &RunConfig) -> Self {
        Self {
            host: config.imap_server.clone(),
            email: config.email.clone(),
            password: config.password.clone(),
            session: None,
        }
    }

    /// Returns whether the session is currently connected.
    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    /// Establishes the TLS connection with the futures compat wrapper.
    async fn connect_tls(&self) -> Result<Compat<TlsStream<TcpStream>>> {
        let tcp_stream = TcpStream::connect((self.host.as_str(), IMAPS_PORT))
            .await
            .map_err(|e| MailboxError::Connection(format!("TCP connect failed: {}", e)))?;

        let config = ClientConfig::builder()
            .with_root_certificates(RootCertStore::from_iter(
                webpki_roots::TLS_SERVER_ROOTS.iter().cloned(),
            ))
            .with_no_client_auth();

        let connector = TlsConnector::from(Arc::new(config));
        let server_name = ServerName::try_from(self.host.clone())
            .map_err(|e| MailboxError::Connection(format!("invalid server name: {}", e)))?;

        let tls_stream = connector
            .connect(server_name, tcp_stream)
            .await
            .map_err(|e| MailboxError::Connection(format!("TLS handshake failed: {}", e)))?;

        Ok(tls_stream.compat())
    }

    fn session_mut(&mut self) -> Result<&mut ImapSession> {
        self.session
            .as_mut()
            .ok_or_else(|| MailboxError::Connection("not connected".to_string()))
    }
}

#[async_trait]
impl Mailbox for ImapMailbox {
    async fn connect(&mut self) -> Result<()> {
        let tls_stream = self.connect_tls().await?;
        let client = async_imap::Client::new(tls_stream);

        let session = client
            .login(&self.email, &self.password)
            .await
            .map_err(|e| MailboxError::Auth(format!("IMAP login failed: {:?}", e.0)))?;

        self.session = Some(session);
        tracing::debug!(host = %self.host, "mailbox session authenticated");
        Ok(())
    }

    async fn open_folder(&mut self, folder: &str) -> Result<()> {
        let session = self.session_mut()?;

        // EXAMINE rather than SELECT: the scan never mutates the mailbox.
        session
            .examine(folder)
            .await
            .map_err(|e| MailboxError::Folder(format!("EXAMINE {} failed: {}", folder, e)))?;
        Ok(())
    }

    async fn search(&mut self, query: &str) -> Result<Vec<u32>> {
        let session = self.session_mut()?;

        let ids = session
            .search(query)
            .await
            .map_err(|e| MailboxError::Search(format!("SEARCH failed: {}", e)))?;

        // async-imap hands back a set; ascending sequence numbers restore
        // the server's result order.
        let mut ids: Vec<u32> = ids.into_iter().collect();
        ids.sort_unstable();
        Ok(ids)
    }

    async fn fetch_stream<'a>(
        &'a mut self,
        ids: &'a [u32],
    ) -> Result<BoxStream<'a, Result<RawMessage>>> {
        if ids.is_empty() {
            return Ok(futures::stream::empty().boxed());
        }

        let seq_set = ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");

        let session = self.session_mut()?;
        let fetches = session
            .fetch(seq_set, "(BODY.PEEK[])")
            .await
            .map_err(|e| MailboxError::Fetch(format!("FETCH failed: {}", e)))?;

        let stream = fetches.map(|item| {
            item.map(|fetch| RawMessage {
                id: fetch.message,
                body: fetch.body().map(<[u8]>::to_vec).unwrap_or_default(),
            })
            .map_err(|e| MailboxError::Fetch(format!("FETCH stream: {}", e)))
        });

        Ok(stream.boxed())
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(mut session) = self.session.take() {
            // Logout failures are not actionable once the run is over.
            if let Err(e) = session.logout().await {
                tracing::debug!("LOGOUT failed: {}", e);
            }
        }
        Ok(())
    }
}
