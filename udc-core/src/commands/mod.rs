//! Commands exposed to the front end
//!
//! This module organizes commands into logical submodules:
//! - `accounts`: Session, profile and the staff account directory
//! - `complaints`: Complaint listing, submission and triage
//! - `notifications`: The role-scoped notification feed
//! - `settings`: Application settings
//!
//! All commands take the shared AppState and return `Result<T, AppError>`.
//! Role gates that the browser enforced through its routes live here, not
//! in the services.

pub mod accounts;
pub mod complaints;
pub mod notifications;
pub mod settings;

use crate::app::AppState;
use crate::error::Result;

pub use accounts::*;
pub use complaints::*;
pub use notifications::*;
pub use settings::*;

// ===== General Commands =====

/// Get application information
pub async fn get_app_info(state: &AppState) -> Result<AppInfo> {
    let general = state.settings_service.get_general().await?;

    Ok(AppInfo {
        name: general.app_name,
        version: env!("CARGO_PKG_VERSION").to_string(),
        app_data_dir: state.app_data_dir.to_string_lossy().to_string(),
    })
}

/// Application information structure
#[derive(serde::Serialize)]
pub struct AppInfo {
    pub name: String,
    pub version: String,
    pub app_data_dir: String,
}
