//! Complaint-related commands
//!
//! Listing and lookup for every role; status changes and assignment for
//! staff only.

use crate::app::AppState;
use crate::config::RECENT_COMPLAINTS_LIMIT;
use crate::database::{Complaint, ComplaintCategory, ComplaintStatus, Role};
use crate::error::Result;
use crate::services::{ComplaintFilter, ComplaintStats};

const STAFF: &[Role] = &[Role::Admin, Role::Investigator];

/// List visible complaints matching the filter
pub async fn list_complaints(state: &AppState, filter: ComplaintFilter) -> Result<Vec<Complaint>> {
    Ok(state.complaints_service.search(&filter).await)
}

/// Most recently created visible complaints
pub async fn recent_complaints(state: &AppState, limit: Option<usize>) -> Result<Vec<Complaint>> {
    Ok(state
        .complaints_service
        .recent(limit.unwrap_or(RECENT_COMPLAINTS_LIMIT))
        .await)
}

pub async fn get_complaint(state: &AppState, id: String) -> Result<Complaint> {
    state.complaints_service.complaint(&id).await
}

pub async fn get_complaint_stats(state: &AppState) -> Result<ComplaintStats> {
    Ok(state.complaints_service.statistics().await)
}

pub async fn submit_complaint(
    state: &AppState,
    title: String,
    description: String,
    category: ComplaintCategory,
) -> Result<Complaint> {
    state
        .complaints_service
        .submit_complaint(&title, &description, category)
        .await
}

/// Change a complaint's status (staff only)
pub async fn update_complaint_status(
    state: &AppState,
    id: String,
    status: ComplaintStatus,
    resolution: Option<String>,
    comment: Option<String>,
) -> Result<Complaint> {
    state.identity_service.require_role(STAFF).await?;

    state
        .complaints_service
        .update_complaint_status(&id, status, resolution.as_deref(), comment.as_deref())
        .await
}

/// Assign a complaint to an investigator (staff only)
pub async fn assign_complaint(
    state: &AppState,
    id: String,
    assigned_to: String,
    assigned_to_name: String,
) -> Result<Complaint> {
    state.identity_service.require_role(STAFF).await?;

    state
        .complaints_service
        .assign_complaint(&id, &assigned_to, &assigned_to_name)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::NotificationKind;
    use crate::error::AppError;
    use tempfile::TempDir;

    async fn create_test_state() -> (AppState, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let state = AppState::initialize(temp_dir.path().to_path_buf(), Some(0))
            .await
            .unwrap();
        (state, temp_dir)
    }

    #[tokio::test]
    async fn test_student_cannot_change_status() {
        let (state, temp_dir) = create_test_state().await;
        state
            .identity_service
            .login("student@university.edu", "password")
            .await
            .unwrap();
        let before = state.complaints_service.complaint("c-002").await.unwrap();

        let result = update_complaint_status(
            &state,
            "c-002".into(),
            ComplaintStatus::Resolved,
            Some("Closed".into()),
            None,
        )
        .await;

        assert!(matches!(result, Err(AppError::Forbidden)));
        assert_eq!(state.complaints_service.complaint("c-002").await.unwrap(), before);
        assert!(state
            .notifications_service
            .all_notifications()
            .await
            .iter()
            .all(|n| n.kind == NotificationKind::Login));

        let reopened = AppState::initialize(temp_dir.path().to_path_buf(), Some(0))
            .await
            .unwrap();
        let stored = reopened.complaints_service.all_complaints().await;
        let c002 = stored.iter().find(|c| c.id == "c-002").unwrap();
        assert_eq!(c002.status, ComplaintStatus::Pending);
    }

    #[tokio::test]
    async fn test_staff_commands_need_a_session() {
        let (state, _temp) = create_test_state().await;

        let status = update_complaint_status(
            &state,
            "c-002".into(),
            ComplaintStatus::Investigating,
            None,
            None,
        )
        .await;
        let assign = assign_complaint(
            &state,
            "c-002".into(),
            "investigator-123".into(),
            "Investigator User".into(),
        )
        .await;

        assert!(matches!(status, Err(AppError::NotAuthenticated)));
        assert!(matches!(assign, Err(AppError::NotAuthenticated)));
        let c002 = state.complaints_service.all_complaints().await;
        let c002 = c002.iter().find(|c| c.id == "c-002").unwrap();
        assert_eq!(c002.status, ComplaintStatus::Pending);
        assert!(c002.assigned_to.is_none());
        assert!(state.notifications_service.all_notifications().await.is_empty());
    }

    #[tokio::test]
    async fn test_investigator_changes_status() {
        let (state, _temp) = create_test_state().await;
        state
            .identity_service
            .login("investigator@university.edu", "password")
            .await
            .unwrap();

        let updated = update_complaint_status(
            &state,
            "c-002".into(),
            ComplaintStatus::Investigating,
            None,
            Some("Interviewing witnesses".into()),
        )
        .await
        .unwrap();

        assert_eq!(updated.status, ComplaintStatus::Investigating);
        assert_eq!(
            updated.tracking_history.last().unwrap().comment.as_deref(),
            Some("Interviewing witnesses")
        );
    }
}
