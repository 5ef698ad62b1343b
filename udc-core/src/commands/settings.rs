//! Settings-related commands
//!
//! Anyone may read the settings; only admins may change them. Changes are
//! written to the settings file and take effect on the next start.

use crate::app::AppState;
use crate::database::Role;
use crate::error::Result;
use crate::services::{AppSettings, BehaviorSettings, GeneralSettings, NotificationSettings};

pub async fn get_settings(state: &AppState) -> Result<AppSettings> {
    state.settings_service.load().await
}

// ===== General Settings =====

pub async fn update_general_settings(state: &AppState, general: GeneralSettings) -> Result<()> {
    state.identity_service.require_role(&[Role::Admin]).await?;
    state.settings_service.update_general(general).await
}

// ===== Notification Settings =====

pub async fn update_notification_settings(
    state: &AppState,
    notifications: NotificationSettings,
) -> Result<()> {
    state.identity_service.require_role(&[Role::Admin]).await?;
    state
        .settings_service
        .update_notifications(notifications)
        .await
}

// ===== Behavior Settings =====

/// Update simulated latency
/// Note: Application restart required for changes to take effect
pub async fn update_behavior_settings(state: &AppState, behavior: BehaviorSettings) -> Result<()> {
    state.identity_service.require_role(&[Role::Admin]).await?;
    state.settings_service.update_behavior(behavior).await?;

    tracing::warn!("Behavior settings updated. Restart required for changes to take effect.");

    Ok(())
}
