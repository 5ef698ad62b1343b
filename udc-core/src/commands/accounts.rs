//! Account-related commands
//!
//! Login, registration, profile maintenance and the staff directory.

use crate::app::AppState;
use crate::database::{Account, ProfileUpdate, Role};
use crate::error::Result;
use crate::services::directory::accounts_to_csv;
use crate::services::AccountQuery;

pub async fn login(state: &AppState, email: String, password: String) -> Result<Account> {
    state.identity_service.login(&email, &password).await
}

pub async fn register(
    state: &AppState,
    name: String,
    email: String,
    password: String,
) -> Result<Account> {
    state.identity_service.register(&name, &email, &password).await
}

pub async fn logout(state: &AppState) -> Result<()> {
    state.identity_service.logout().await;
    Ok(())
}

/// The logged-in account, if any
pub async fn current_user(state: &AppState) -> Result<Option<Account>> {
    Ok(state.identity_service.current_user().await)
}

pub async fn update_profile(state: &AppState, update: ProfileUpdate) -> Result<Account> {
    state.identity_service.update_profile(update).await
}

pub async fn update_password(
    state: &AppState,
    current_password: String,
    new_password: String,
) -> Result<()> {
    state
        .identity_service
        .update_password(&current_password, &new_password)
        .await
}

/// List accounts for staff, optionally filtered
pub async fn list_accounts(
    state: &AppState,
    search: Option<String>,
    role: Option<Role>,
) -> Result<Vec<Account>> {
    state
        .identity_service
        .directory(&AccountQuery { search, role })
        .await
}

/// Export the filtered account directory as CSV
pub async fn export_accounts(
    state: &AppState,
    search: Option<String>,
    role: Option<Role>,
) -> Result<String> {
    let accounts = list_accounts(state, search, role).await?;
    tracing::info!("Exporting {} accounts as CSV", accounts.len());
    Ok(accounts_to_csv(&accounts))
}
