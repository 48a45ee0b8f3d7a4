//! Run and server configuration.
//!
//! A [`RunConfig`] describes one scan of one mailbox and arrives as the JSON
//! body of the start endpoint. [`ServerConfig`] controls where the HTTP
//! layer binds and which directory it serves static assets from.

use std::net::SocketAddr;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Errors produced by configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required field was missing or empty.
    #[error("missing required configuration: {0}")]
    MissingField(&'static str),
}

/// Configuration for a single mailbox scan.
///
/// The wire shape matches the start endpoint's JSON body:
/// `{email, password, imapServer, folder?, limit?}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunConfig {
    /// IMAP server hostname.
    ///
    /// Defaults to empty when absent so a bad request reaches
    /// [`RunConfig::validate`] instead of dying in the JSON extractor.
    #[serde(default)]
    pub imap_server: String,
    /// Account email address, used as the login identity.
    #[serde(default)]
    pub email: String,
    /// Password or app-specific password.
    #[serde(default)]
    pub password: String,
    /// Mailbox folder to scan.
    #[serde(default = "default_folder")]
    pub folder: String,
    /// Maximum number of messages to process; 0 means unlimited.
    #[serde(default)]
    pub limit: usize,
}

fn default_folder() -> String {
    "INBOX".to_string()
}

impl RunConfig {
    /// Creates a config with the default folder and no limit.
    pub fn new(
        imap_server: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            imap_server: imap_server.into(),
            email: email.into(),
            password: password.into(),
            folder: default_folder(),
            limit: 0,
        }
    }

    /// Fails fast if the server address, identity, or credential is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.imap_server.trim().is_empty() {
            return Err(ConfigError::MissingField("imapServer"));
        }
        if self.email.trim().is_empty() {
            return Err(ConfigError::MissingField("email"));
        }
        if self.password.is_empty() {
            return Err(ConfigError::MissingField("password"));
        }
        Ok(())
    }
}

/// Configuration for the HTTP presentation layer.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the server binds to.
    pub bind: SocketAddr,
    /// Directory served as static assets.
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 4000)),
            static_dir: PathBuf::from("public"),
        }
    }
}

impl ServerConfig {
    /// Builds a config from `OPTOUT_ADDR` and `OPTOUT_STATIC_DIR`,
    /// falling back to the defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(addr) = std::env::var("OPTOUT_ADDR") {
            if let Ok(parsed) = addr.parse() {
                config.bind = parsed;
            }
        }
        if let Ok(dir) = std::env::var("OPTOUT_STATIC_DIR") {
            config.static_dir = PathBuf::from(dir);
        }
        config
    }
}
