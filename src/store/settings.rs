//! Client settings and configuration

use crate::{store::ordering::ChatOrdering, Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Client settings
///
/// Settings are stored in JSON format and can be loaded/saved from disk.
/// Missing fields fall back to their defaults.
///
/// # Example
/// ```rust,no_run
/// use inbox::store::Settings;
///
/// // Load settings (returns default if file doesn't exist)
/// let mut settings = Settings::load("inbox.json").expect("Failed to load");
///
/// settings.set_poll_interval_ms(2_000);
/// settings.save("inbox.json").expect("Failed to save");
///
/// println!("Polling every {:?}", settings.poll_interval());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Page size used when listing chats
    pub chat_page_size: u32,
    /// Page size used when loading a message thread
    pub message_page_size: u32,
    /// Interval between polls of the open chat, in milliseconds
    pub poll_interval_ms: u64,
    /// Interval between background status syncs, in milliseconds
    pub sync_interval_ms: u64,
    /// How active chats are promoted relative to pinned chats
    pub ordering: ChatOrdering,
    /// Latency of the simulated conversation service, in milliseconds
    pub simulated_latency_ms: u64,
    /// Default log level when `RUST_LOG` is unset
    pub log_level: String,
}

impl Settings {
    /// Load settings from a JSON file
    ///
    /// # Arguments
    /// * `path` - Path to the settings file
    ///
    /// # Returns
    /// The loaded settings, or default settings if file doesn't exist
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let data = std::fs::read_to_string(path)
            .map_err(|e| Error::Settings(format!("Failed to read settings: {}", e)))?;

        // Handle empty file (return defaults)
        if data.trim().is_empty() {
            return Ok(Self::default());
        }

        let settings: Self = serde_json::from_str(&data)
            .map_err(|e| Error::Settings(format!("Failed to parse settings: {}", e)))?;
        settings.validate()?;

        Ok(settings)
    }

    /// Save settings to a JSON file
    ///
    /// # Arguments
    /// * `path` - Path to save the settings file
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Settings(format!("Failed to create settings directory: {}", e)))?;
        }

        let json = serde_json::to_string_pretty(self)?;

        std::fs::write(path, json)
            .map_err(|e| Error::Settings(format!("Failed to write settings: {}", e)))?;

        Ok(())
    }

    /// Reject values the store cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.chat_page_size == 0 || self.message_page_size == 0 {
            return Err(Error::Settings("Page sizes must be greater than zero".to_string()));
        }
        if self.poll_interval_ms == 0 || self.sync_interval_ms == 0 {
            return Err(Error::Settings("Intervals must be greater than zero".to_string()));
        }
        Ok(())
    }

    /// Update the poll interval at runtime (in milliseconds)
    pub fn set_poll_interval_ms(&mut self, interval_ms: u64) {
        self.poll_interval_ms = interval_ms;
    }

    /// Poll interval as a `Duration`
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Sync interval as a `Duration`
    pub fn sync_interval(&self) -> Duration {
        Duration::from_millis(self.sync_interval_ms)
    }

    /// Simulated service latency as a `Duration`
    pub fn simulated_latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            chat_page_size: 20,
            message_page_size: 20,
            poll_interval_ms: 5_000,
            sync_interval_ms: 30_000,
            ordering: ChatOrdering::default(),
            simulated_latency_ms: 300,
            log_level: "info".to_string(),
        }
    }
}
