//! Inbox - a messaging inbox client
//!
//! This library provides the conversation/message state store behind the
//! inbox client: it owns the in-memory view of chats and their message
//! threads, reconciles it against paginated responses from a remote
//! conversation service, applies optimistic local edits, and keeps the
//! derived views (unread counts, ordering, bookmarks) consistent while
//! asynchronous commands interleave.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod event;
pub mod service;
pub mod store;
pub mod tui;

use std::path::Path;

use store::ChatId;
use tracing_subscriber::EnvFilter;

/// Result type alias for inbox operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for inbox operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Remote conversation service failed (network or service error)
    #[error("Service error: {0}")]
    Service(String),

    /// Operation is not valid for the current state
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Chat is not known to the store
    #[error("Chat not found: {0}")]
    ChatNotFound(ChatId),

    /// A derived view diverged from its source of truth
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Settings could not be loaded, saved or validated
    #[error("Settings error: {0}")]
    Settings(String),

    /// General I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),
}

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Initialize the inbox library with logging to stderr
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter("info"))
        .init();
}

/// Initialize logging into a file
///
/// Used by the terminal UI, where writing to stderr would corrupt the screen.
/// `RUST_LOG` overrides `default_level` when set.
pub fn init_with_log_file<P: AsRef<Path>>(path: P, default_level: &str) -> Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_level))
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(file))
        .try_init()
        .map_err(|e| Error::Settings(format!("Failed to install log subscriber: {}", e)))?;

    Ok(())
}
