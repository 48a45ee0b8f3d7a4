//! Scan orchestration.
//!
//! A [`ScanService`] drives one end-to-end run against one mailbox:
//! connect, search, stream fetches, reassemble each message, extract
//! candidate unsubscribe links, deduplicate them for the whole run, and
//! dispatch a best-effort follow-up request per newly discovered link.
//! Progress is published through the injected [`LogBroadcaster`].

use std::collections::HashSet;

use futures::StreamExt;

use crate::config::{ConfigError, RunConfig};
use crate::extract::extract_candidate_links;
use crate::mime;
use crate::providers::mail::{ImapMailbox, Mailbox, MailboxError, RawMessage};
use crate::services::LogBroadcaster;

/// The single supported server-side search criterion.
pub const SEARCH_QUERY: &str = "TEXT \"unsubscribe\"";

/// Errors that abort a scan run.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The run configuration failed validation.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// A mailbox operation failed.
    #[error(transparent)]
    Mailbox(#[from] MailboxError),
}

/// Final result of a completed run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Messages handled, counting parse failures and HTML-less messages.
    pub emails_processed: usize,
    /// Unique unsubscribe URLs discovered during the run.
    pub links_found: HashSet<String>,
}

/// Mutable state shared by the message handlers of one run.
#[derive(Default)]
struct RunState {
    processed: usize,
    links: HashSet<String>,
}

/// Orchestrates scan runs.
///
/// The broadcaster is injected at construction so runs and subscribers can
/// be tested independently. The HTTP client is shared across runs; each run
/// otherwise owns its session and dedup set, so concurrent runs are safe.
pub struct ScanService {
    http: reqwest::Client,
    log: LogBroadcaster,
}

impl ScanService {
    /// Creates a service publishing progress to `log`.
    pub fn new(log: LogBroadcaster) -> Self {
        Self {
            http: reqwest::Client::new(),
            log,
        }
    }

    /// Runs one scan against the mailbox described by `config`.
    ///
    /// Completes when the fetch stream ends, or fails with the first fatal
    /// error. No partial summary is returned on failure.
    pub async fn run(&self, config: &RunConfig) -> Result<RunSummary, ScanError> {
        config.validate()?;
        let mut mailbox = ImapMailbox::new(config);
        self.run_with(config, &mut mailbox).await
    }

    /// Runs one scan against an already constructed mailbox.
    ///
    /// The session is closed before returning, on success and on failure.
    pub async fn run_with<M: Mailbox>(
        &self,
        config: &RunConfig,
        mailbox: &mut M,
    ) -> Result<RunSummary, ScanError> {
        config.validate()?;

        let mut state = RunState::default();
        let result = self.drive(config, mailbox, &mut state).await;

        if let Err(e) = mailbox.close().await {
            tracing::debug!("close after run failed: {}", e);
        }

        result?;
        Ok(RunSummary {
            emails_processed: state.processed,
            links_found: state.links,
        })
    }

    async fn drive<M: Mailbox>(
        &self,
        config: &RunConfig,
        mailbox: &mut M,
        state: &mut RunState,
    ) -> Result<(), MailboxError> {
        mailbox.connect().await?;
        mailbox.open_folder(&config.folder).await?;
        self.log.publish("Processing mailbox...");

        let ids = mailbox.search(SEARCH_QUERY).await?;
        self.log
            .publish(format!("Found {} emails matching search criteria.", ids.len()));

        // First N ids in search order; 0 means unlimited.
        let take = if config.limit > 0 {
            config.limit.min(ids.len())
        } else {
            ids.len()
        };
        let ids = &ids[..take];

        let mut stream = mailbox.fetch_stream(ids).await?;
        while let Some(item) = stream.next().await {
            let raw = item?;
            self.process_message(&raw, state);
            // Counted regardless of whether the message yielded links.
            state.processed += 1;
        }
        drop(stream);

        self.log
            .publish(format!("Emails processed: {}", state.processed));
        self.log
            .publish(format!("Unsubscribe links found: {}", state.links.len()));
        Ok(())
    }

    fn process_message(&self, raw: &RawMessage, state: &mut RunState) {
        self.log.publish(format!("Processing email id = {}...", raw.id));

        let parsed = match mime::parse_message(&raw.body) {
            Ok(parsed) => parsed,
            Err(e) => {
                self.log
                    .publish(format!("Error parsing email {}: {}", raw.id, e));
                return;
            }
        };

        let Some(html) = parsed.body_html else {
            tracing::debug!(id = raw.id, subject = ?parsed.subject, "no HTML part, skipping");
            return;
        };

        for link in extract_candidate_links(&html) {
            // insert() is the single atomic check-then-insert step, so a URL
            // seen in two messages dispatches exactly one follow-up.
            if state.links.insert(link.url.clone()) {
                self.log
                    .publish(format!("Found new link to unsubscribe from: {}", link.url));
                self.dispatch_follow_up(link.url);
            }
        }
    }

    /// Fires a detached, error-discarding unsubscribe request.
    fn dispatch_follow_up(&self, url: String) {
        let client = self.http.clone();
        tokio::spawn(async move {
            if let Err(e) = client.get(&url).send().await {
                tracing::debug!(url = %url, "unsubscribe request failed: {}", e);
            }
        });
    }
}
