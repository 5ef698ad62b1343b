//! Notification commands
//!
//! The feed shown to the logged-in account and its read/delete actions.

use crate::app::AppState;
use crate::database::Notification;
use crate::error::Result;

#[derive(serde::Serialize)]
pub struct NotificationFeed {
    pub unread: usize,
    pub notifications: Vec<Notification>,
}

pub async fn get_notifications(state: &AppState) -> Result<NotificationFeed> {
    let service = &state.notifications_service;

    Ok(NotificationFeed {
        unread: service.unread_count().await,
        notifications: service.user_notifications().await,
    })
}

pub async fn mark_notification_read(state: &AppState, id: String) -> Result<()> {
    state.notifications_service.mark_as_read(&id).await
}

pub async fn mark_all_notifications_read(state: &AppState) -> Result<()> {
    state.notifications_service.mark_all_as_read().await
}

pub async fn delete_notification(state: &AppState, id: String) -> Result<()> {
    state.notifications_service.delete_notification(&id).await
}

pub async fn clear_notifications(state: &AppState) -> Result<()> {
    state.notifications_service.clear_all_notifications().await
}
