//! Settings service
//!
//! Manages system settings persistence using JSON file storage.

use crate::config::{
    DEFAULT_APP_NAME, DEFAULT_EMAIL_DOMAIN, DEFAULT_SIMULATED_LATENCY_MS,
    MAX_SIMULATED_LATENCY_MS, SETTINGS_FILE,
};
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs;

/// Branding shown across the application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralSettings {
    #[serde(default = "default_app_name")]
    pub app_name: String,
    #[serde(default = "default_email_domain")]
    pub email_domain: String,
}

fn default_app_name() -> String {
    DEFAULT_APP_NAME.to_string()
}

fn default_email_domain() -> String {
    DEFAULT_EMAIL_DOMAIN.to_string()
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            email_domain: default_email_domain(),
        }
    }
}

/// Notification delivery settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationSettings {
    /// Whether new notifications also pop up as transient notices.
    /// The notification log is written either way.
    #[serde(default = "default_true")]
    pub notifications_enabled: bool,
}

fn default_true() -> bool {
    true
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            notifications_enabled: true,
        }
    }
}

/// Behavior of the simulated backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorSettings {
    /// Artificial latency of every simulated call in milliseconds
    #[serde(default = "default_simulated_latency")]
    pub simulated_latency_ms: u64,
}

fn default_simulated_latency() -> u64 {
    DEFAULT_SIMULATED_LATENCY_MS
}

impl Default for BehaviorSettings {
    fn default() -> Self {
        Self {
            simulated_latency_ms: default_simulated_latency(),
        }
    }
}

impl BehaviorSettings {
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms)
    }
}

/// System settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AppSettings {
    #[serde(default)]
    pub general: GeneralSettings,
    #[serde(default)]
    pub notifications: NotificationSettings,
    #[serde(default)]
    pub behavior: BehaviorSettings,
}

/// Service for managing system settings
#[derive(Clone)]
pub struct SettingsService {
    settings_path: PathBuf,
}

impl SettingsService {
    pub fn new(app_data_dir: PathBuf) -> Self {
        Self {
            settings_path: app_data_dir.join(SETTINGS_FILE),
        }
    }

    /// Load settings from disk or create default if not exists
    pub async fn load(&self) -> Result<AppSettings> {
        if !self.settings_path.exists() {
            tracing::info!("Settings file not found, creating default settings");
            let default = AppSettings::default();
            self.save(&default).await?;
            return Ok(default);
        }

        let content = fs::read_to_string(&self.settings_path).await?;
        let settings: AppSettings = serde_json::from_str(&content)
            .map_err(|e| AppError::Generic(format!("Failed to parse settings: {}", e)))?;

        Ok(settings)
    }

    /// Save settings to disk
    pub async fn save(&self, settings: &AppSettings) -> Result<()> {
        let content = serde_json::to_string_pretty(settings)
            .map_err(|e| AppError::Generic(format!("Failed to serialize settings: {}", e)))?;

        if let Some(parent) = self.settings_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&self.settings_path, content).await?;
        tracing::info!("Settings saved to {:?}", self.settings_path);

        Ok(())
    }

    pub async fn get_general(&self) -> Result<GeneralSettings> {
        Ok(self.load().await?.general)
    }

    pub async fn update_general(&self, general: GeneralSettings) -> Result<()> {
        if general.app_name.trim().is_empty() {
            return Err(AppError::Generic("Application name cannot be empty".to_string()));
        }
        let mut settings = self.load().await?;
        settings.general = general;
        self.save(&settings).await
    }

    pub async fn update_notifications(&self, notifications: NotificationSettings) -> Result<()> {
        let mut settings = self.load().await?;
        settings.notifications = notifications;
        self.save(&settings).await
    }

    /// Update behavior settings; latencies above the maximum are rejected
    pub async fn update_behavior(&self, behavior: BehaviorSettings) -> Result<()> {
        if behavior.simulated_latency_ms > MAX_SIMULATED_LATENCY_MS {
            return Err(AppError::Generic(format!(
                "Simulated latency must be at most {} ms",
                MAX_SIMULATED_LATENCY_MS
            )));
        }
        let mut settings = self.load().await?;
        settings.behavior = behavior;
        self.save(&settings).await
    }
}
