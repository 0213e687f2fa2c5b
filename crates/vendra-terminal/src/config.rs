//! # Terminal Configuration
//!
//! Lane configuration from a TOML file with environment overrides.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     VENDRA_API_URL, VENDRA_API_TOKEN, VENDRA_DB_PATH,                  │
//! │     VENDRA_STORE_ID, VENDRA_BRANCH_ID                                  │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/vendra-pos/terminal.toml (Linux)                         │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # terminal.toml
//! [store]
//! id = "store-001"
//! branch_id = "branch-01"
//! name = "Downtown Branch"
//!
//! [api]
//! base_url = "https://pos.example.com/api"
//! timeout_secs = 15
//!
//! [outbox]
//! poll_interval_secs = 5
//! batch_size = 20
//! max_attempts = 10
//!
//! [session]
//! probe_interval_secs = 30
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use vendra_client::ClientConfig;
use vendra_store::StoreConfig;

use crate::error::{ErrorCode, TerminalError};
use crate::flusher::FlusherConfig;

// =============================================================================
// Sections
// =============================================================================

/// Store/branch identity stamped onto every order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSection {
    pub id: String,
    pub branch_id: String,
    #[serde(default)]
    pub name: String,
}

impl Default for StoreSection {
    fn default() -> Self {
        StoreSection {
            id: "store-001".to_string(),
            branch_id: "branch-01".to_string(),
            name: String::new(),
        }
    }
}

/// Backend connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSection {
    pub base_url: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    15
}

impl Default for ApiSection {
    fn default() -> Self {
        ApiSection {
            base_url: "http://localhost:3000/api".to_string(),
            token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Outbox flusher tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxSection {
    /// Lane database path; defaults to the platform data directory.
    #[serde(default)]
    pub db_path: Option<PathBuf>,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: i64,
    /// First retry delay; doubles per attempt.
    #[serde(default = "default_backoff_base_secs")]
    pub backoff_base_secs: u64,
    /// Ceiling for the per-entry retry delay.
    #[serde(default = "default_backoff_cap_secs")]
    pub backoff_cap_secs: u64,
}

fn default_poll_interval_secs() -> u64 {
    5
}
fn default_batch_size() -> u32 {
    20
}
fn default_max_attempts() -> i64 {
    10
}
fn default_backoff_base_secs() -> u64 {
    2
}
fn default_backoff_cap_secs() -> u64 {
    300
}

impl Default for OutboxSection {
    fn default() -> Self {
        OutboxSection {
            db_path: None,
            poll_interval_secs: default_poll_interval_secs(),
            batch_size: default_batch_size(),
            max_attempts: default_max_attempts(),
            backoff_base_secs: default_backoff_base_secs(),
            backoff_cap_secs: default_backoff_cap_secs(),
        }
    }
}

/// Session monitor tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSection {
    #[serde(default = "default_probe_interval_secs")]
    pub probe_interval_secs: u64,
}

fn default_probe_interval_secs() -> u64 {
    30
}

impl Default for SessionSection {
    fn default() -> Self {
        SessionSection {
            probe_interval_secs: default_probe_interval_secs(),
        }
    }
}

// =============================================================================
// Terminal Configuration
// =============================================================================

/// Complete lane configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TerminalConfig {
    #[serde(default)]
    pub store: StoreSection,
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub outbox: OutboxSection,
    #[serde(default)]
    pub session: SessionSection,
}

impl TerminalConfig {
    /// Parses a TOML document.
    pub fn from_toml(text: &str) -> Result<Self, TerminalError> {
        toml::from_str(text).map_err(|e| {
            TerminalError::new(ErrorCode::ValidationError, format!("invalid config: {}", e))
        })
    }

    /// Loads from a TOML file, then applies environment overrides.
    pub fn load(path: &Path) -> Result<Self, TerminalError> {
        debug!(path = %path.display(), "Loading terminal config");

        let text = std::fs::read_to_string(path).map_err(|e| {
            TerminalError::new(
                ErrorCode::Internal,
                format!("cannot read {}: {}", path.display(), e),
            )
        })?;

        let mut config = Self::from_toml(&text)?;
        config.apply_env();
        Ok(config)
    }

    /// Applies `VENDRA_*` environment overrides.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Environment override logic with an injected lookup (testable).
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("VENDRA_API_URL") {
            self.api.base_url = url;
        }
        if let Some(token) = lookup("VENDRA_API_TOKEN") {
            self.api.token = Some(token);
        }
        if let Some(path) = lookup("VENDRA_DB_PATH") {
            self.outbox.db_path = Some(PathBuf::from(path));
        }
        if let Some(id) = lookup("VENDRA_STORE_ID") {
            self.store.id = id;
        }
        if let Some(id) = lookup("VENDRA_BRANCH_ID") {
            self.store.branch_id = id;
        }
    }

    /// The lane database path: configured, or the platform data directory.
    pub fn db_path(&self) -> Result<PathBuf, TerminalError> {
        if let Some(path) = &self.outbox.db_path {
            return Ok(path.clone());
        }

        let dirs = ProjectDirs::from("com", "vendra", "pos").ok_or_else(|| {
            TerminalError::internal("could not determine platform data directory")
        })?;
        Ok(dirs.data_dir().join("lane.db"))
    }

    /// Builds the backend client configuration.
    pub fn client_config(&self) -> Result<ClientConfig, TerminalError> {
        let mut config = ClientConfig::new(self.api.base_url.as_str())?
            .with_timeout_secs(self.api.timeout_secs);
        if let Some(token) = &self.api.token {
            config = config.with_token(token);
        }
        Ok(config)
    }

    /// Builds the lane store configuration.
    pub fn store_config(&self) -> Result<StoreConfig, TerminalError> {
        Ok(StoreConfig::new(self.db_path()?))
    }

    /// Builds the outbox flusher configuration.
    pub fn flusher_config(&self) -> FlusherConfig {
        FlusherConfig {
            poll_interval: Duration::from_secs(self.outbox.poll_interval_secs),
            batch_size: self.outbox.batch_size,
            max_attempts: self.outbox.max_attempts,
            backoff_base: Duration::from_secs(self.outbox.backoff_base_secs),
            backoff_cap: Duration::from_secs(self.outbox.backoff_cap_secs),
            ..FlusherConfig::default()
        }
    }

    /// The session probe cadence.
    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.session.probe_interval_secs)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TerminalConfig::default();
        assert_eq!(config.store.id, "store-001");
        assert_eq!(config.outbox.poll_interval_secs, 5);
        assert_eq!(config.outbox.max_attempts, 10);
        assert_eq!(config.session.probe_interval_secs, 30);
    }

    #[test]
    fn test_parse_full_toml() {
        let config = TerminalConfig::from_toml(
            r#"
            [store]
            id = "store-007"
            branch_id = "branch-02"
            name = "Airport"

            [api]
            base_url = "https://pos.example.com/api"
            token = "tok"
            timeout_secs = 8

            [outbox]
            poll_interval_secs = 3
            batch_size = 50
            max_attempts = 7
            backoff_base_secs = 1
            backoff_cap_secs = 60

            [session]
            probe_interval_secs = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.store.id, "store-007");
        assert_eq!(config.api.timeout_secs, 8);
        assert_eq!(config.outbox.batch_size, 50);
        assert_eq!(config.session.probe_interval_secs, 10);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = TerminalConfig::from_toml(
            r#"
            [api]
            base_url = "http://10.0.0.5:3000"
            "#,
        )
        .unwrap();

        assert_eq!(config.api.base_url, "http://10.0.0.5:3000");
        assert_eq!(config.api.timeout_secs, 15);
        assert_eq!(config.store.id, "store-001");
    }

    #[test]
    fn test_invalid_toml_rejected() {
        assert!(TerminalConfig::from_toml("store = nonsense [").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = TerminalConfig::default();
        config.apply_env_from(|key| match key {
            "VENDRA_API_URL" => Some("https://override.example.com".to_string()),
            "VENDRA_API_TOKEN" => Some("env-token".to_string()),
            "VENDRA_DB_PATH" => Some("/tmp/lane.db".to_string()),
            "VENDRA_STORE_ID" => Some("store-env".to_string()),
            _ => None,
        });

        assert_eq!(config.api.base_url, "https://override.example.com");
        assert_eq!(config.api.token.as_deref(), Some("env-token"));
        assert_eq!(config.outbox.db_path.as_deref().unwrap().to_str().unwrap(), "/tmp/lane.db");
        assert_eq!(config.store.id, "store-env");
        // Untouched by the lookup above.
        assert_eq!(config.store.branch_id, "branch-01");
    }

    #[test]
    fn test_configured_db_path_wins() {
        let mut config = TerminalConfig::default();
        config.outbox.db_path = Some(PathBuf::from("/var/lib/vendra/lane.db"));
        assert_eq!(
            config.db_path().unwrap(),
            PathBuf::from("/var/lib/vendra/lane.db")
        );
    }

    #[test]
    fn test_client_config_propagates_token() {
        let mut config = TerminalConfig::default();
        config.api.token = Some("tok".to_string());
        let client = config.client_config().unwrap();
        assert_eq!(client.token.as_deref(), Some("tok"));
        assert_eq!(client.timeout, Duration::from_secs(15));
    }
}
