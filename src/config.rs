//! Configuration Management
//!
//! Handles persistent configuration storage for terp and layers it with the
//! environment and command-line flags.

use crate::data::Entity;
use crate::erp::ConnectionConfig;
use crate::notification::{DetailLevel, NotificationManager};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// ERP base URL
    #[serde(default)]
    pub base_url: Option<String>,
    /// API key for token authentication
    #[serde(default)]
    pub api_key: Option<String>,
    /// API secret for token authentication
    #[serde(default)]
    pub api_secret: Option<String>,
    /// Request timeout in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Last viewed entity
    #[serde(default)]
    pub last_entity: Option<String>,
    /// Toast and history settings
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

/// Notification display settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationsConfig {
    #[serde(default)]
    pub detail_level: DetailLevel,
    #[serde(default = "default_toast_duration_secs")]
    pub toast_duration_secs: u64,
    #[serde(default = "default_max_history")]
    pub max_history: usize,
}

fn default_toast_duration_secs() -> u64 {
    5
}

fn default_max_history() -> usize {
    50
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            detail_level: DetailLevel::default(),
            toast_duration_secs: default_toast_duration_secs(),
            max_history: default_max_history(),
        }
    }
}

impl NotificationsConfig {
    /// Build a manager with these settings
    pub fn manager(&self) -> NotificationManager {
        let mut manager = NotificationManager::new();
        manager.detail_level = self.detail_level;
        manager.toast_duration = Duration::from_secs(self.toast_duration_secs);
        manager.max_history = self.max_history.max(1);
        manager
    }
}

/// Connection values given on the command line
#[derive(Debug, Clone, Default)]
pub struct ConnectionOverrides {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("terp").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring unreadable config {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };

        // Create parent directory
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;

        Ok(())
    }

    /// Get effective connection (CLI > environment > config file)
    pub fn effective_connection(&self, overrides: &ConnectionOverrides) -> ConnectionConfig {
        resolve_connection(overrides, &ConnectionConfig::from_env(), self)
    }

    /// Get effective entity (config > customers)
    pub fn effective_entity(&self) -> Entity {
        self.last_entity
            .as_deref()
            .and_then(Entity::from_key)
            .unwrap_or(Entity::Customers)
    }

    /// Set entity and save
    pub fn set_last_entity(&mut self, entity: Entity) -> Result<()> {
        self.last_entity = Some(entity.key().to_string());
        self.save()
    }
}

/// Layer the three configuration sources, first non-empty value wins
pub fn resolve_connection(
    cli: &ConnectionOverrides,
    env: &ConnectionConfig,
    file: &Config,
) -> ConnectionConfig {
    fn pick(candidates: [Option<&String>; 3]) -> Option<String> {
        candidates
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .cloned()
    }

    let env_url = Some(&env.base_endpoint);

    ConnectionConfig {
        base_endpoint: pick([cli.url.as_ref(), env_url, file.base_url.as_ref()]).unwrap_or_default(),
        api_key: pick([cli.api_key.as_ref(), env.api_key.as_ref(), file.api_key.as_ref()]),
        api_secret: pick([
            cli.api_secret.as_ref(),
            env.api_secret.as_ref(),
            file.api_secret.as_ref(),
        ]),
        timeout: cli
            .timeout_secs
            .or(file.timeout_secs)
            .filter(|s| *s > 0)
            .map(Duration::from_secs),
    }
}
