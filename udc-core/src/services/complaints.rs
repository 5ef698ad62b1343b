//! Complaints service
//!
//! Complaint lifecycle, role-based visibility and the audit trail. Every
//! mutation is computed on a copy of the collection, persisted, and only
//! then swapped in, so a failed write leaves nothing applied.

use crate::config::COMPLAINTS_KEY;
use crate::database::{
    Account, Audience, Complaint, ComplaintCategory, ComplaintStatus, NotificationDraft,
    NotificationKind, Role, TrackingUpdate,
};
use crate::error::{AppError, Result};
use crate::events::NoticeBus;
use crate::services::analytics::{compute_stats, ComplaintStats};
use crate::services::seed::seed_complaints;
use crate::services::simulated::{network_delay, LoadingFlag};
use crate::services::{NotificationSink, Session};
use crate::storage::{load_json, save_json, KeyValueStore};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

const TRY_AGAIN: &str = "Something went wrong. Please try again later.";

/// List filter; empty fields match everything
#[derive(Debug, Clone, Default)]
pub struct ComplaintFilter {
    pub query: Option<String>,
    pub status: Option<ComplaintStatus>,
    pub category: Option<ComplaintCategory>,
}

impl ComplaintFilter {
    pub fn matches(&self, complaint: &Complaint) -> bool {
        let matches_status = self.status.map_or(true, |s| complaint.status == s);
        let matches_category = self.category.map_or(true, |c| complaint.category == c);

        let matches_query = match self.query.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                complaint.title.to_lowercase().contains(&term)
                    || complaint.description.to_lowercase().contains(&term)
            }
        };

        matches_status && matches_category && matches_query
    }
}

/// Plain-language phrase for a status change, as shown to students
fn status_phrase(status: ComplaintStatus) -> &'static str {
    match status {
        ComplaintStatus::Resolved => "has been resolved",
        ComplaintStatus::Investigating => "is now under investigation",
        ComplaintStatus::Rejected => "has been rejected",
        ComplaintStatus::Pending => "has been updated",
    }
}

fn is_visible(complaint: &Complaint, viewer: &Account) -> bool {
    match viewer.role {
        Role::Student => complaint.submitted_by == viewer.id,
        Role::Admin | Role::Investigator => true,
    }
}

/// Service for complaint operations
#[derive(Clone)]
pub struct ComplaintService {
    store: Arc<dyn KeyValueStore>,
    session: Session,
    notices: NoticeBus,
    sink: Arc<dyn NotificationSink>,
    latency: Duration,
    loading: LoadingFlag,
    complaints: Arc<RwLock<Vec<Complaint>>>,
}

impl ComplaintService {
    /// Read complaints from storage, seeding the demo set when none exist
    pub async fn load(
        store: Arc<dyn KeyValueStore>,
        session: Session,
        notices: NoticeBus,
        sink: Arc<dyn NotificationSink>,
        latency: Duration,
    ) -> Result<Self> {
        let complaints = match load_json::<Vec<Complaint>>(store.as_ref(), COMPLAINTS_KEY).await? {
            Some(complaints) => complaints,
            None => {
                let seeded = seed_complaints();
                save_json(store.as_ref(), COMPLAINTS_KEY, &seeded).await?;
                tracing::info!("Seeded {} demo complaints", seeded.len());
                seeded
            }
        };

        tracing::info!("Loaded {} complaints", complaints.len());

        Ok(Self {
            store,
            session,
            notices,
            sink,
            latency,
            loading: LoadingFlag::default(),
            complaints: Arc::new(RwLock::new(complaints)),
        })
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_loading()
    }

    /// Every complaint regardless of the session
    pub async fn all_complaints(&self) -> Vec<Complaint> {
        self.complaints.read().await.clone()
    }

    /// Complaints the logged-in account may see; empty without a session
    pub async fn visible_complaints(&self) -> Vec<Complaint> {
        let Some(viewer) = self.session.current().await else {
            return Vec::new();
        };

        self.complaints
            .read()
            .await
            .iter()
            .filter(|c| is_visible(c, &viewer))
            .cloned()
            .collect()
    }

    /// Look up one complaint within the visible set
    pub async fn complaint(&self, id: &str) -> Result<Complaint> {
        self.visible_complaints()
            .await
            .into_iter()
            .find(|c| c.id == id)
            .ok_or_else(|| AppError::ComplaintNotFound(id.to_string()))
    }

    pub async fn search(&self, filter: &ComplaintFilter) -> Vec<Complaint> {
        self.visible_complaints()
            .await
            .into_iter()
            .filter(|c| filter.matches(c))
            .collect()
    }

    /// The `limit` most recently created visible complaints, newest first
    pub async fn recent(&self, limit: usize) -> Vec<Complaint> {
        let mut complaints = self.visible_complaints().await;
        complaints.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        complaints.truncate(limit);
        complaints
    }

    pub async fn statistics(&self) -> ComplaintStats {
        compute_stats(&self.visible_complaints().await)
    }

    /// File a new complaint as the logged-in account
    pub async fn submit_complaint(
        &self,
        title: &str,
        description: &str,
        category: ComplaintCategory,
    ) -> Result<Complaint> {
        let Some(author) = self.session.current().await else {
            self.notices.failure(
                "Authentication required",
                "You must be logged in to submit a complaint",
            );
            return Err(AppError::NotAuthenticated);
        };

        let _loading = self.loading.begin();
        network_delay(self.latency).await;

        let now = Utc::now();
        let complaint = Complaint {
            id: format!("c-{}", Uuid::new_v4()),
            title: title.to_string(),
            description: description.to_string(),
            category,
            status: ComplaintStatus::Pending,
            submitted_by: author.id.clone(),
            submitted_by_name: author.name.clone(),
            assigned_to: None,
            assigned_to_name: None,
            created_at: now,
            updated_at: now,
            resolution: None,
            tracking_history: vec![TrackingUpdate {
                date: now,
                status: ComplaintStatus::Pending,
                comment: Some("Complaint submitted".to_string()),
                updated_by: Some(author.name.clone()),
            }],
        };

        let mut complaints = self.complaints.write().await;
        let mut next = complaints.clone();
        next.push(complaint.clone());

        if let Err(e) = save_json(self.store.as_ref(), COMPLAINTS_KEY, &next).await {
            tracing::error!("Failed to persist complaint {}: {}", complaint.id, e);
            self.notices.failure("Submission failed", TRY_AGAIN);
            return Err(e);
        }
        *complaints = next;
        drop(complaints);

        tracing::info!("Complaint {} submitted by {}", complaint.id, author.id);

        let message = format!(
            "{} has submitted a new complaint: \"{}\"",
            author.name, complaint.title
        );
        for target in [Audience::Admin, Audience::Investigator] {
            self.emit(NotificationDraft::new(
                "New Complaint Submitted",
                message.clone(),
                NotificationKind::ComplaintSubmitted,
                target,
            ))
            .await;
        }

        self.notices.success(
            "Complaint submitted",
            "Your complaint has been submitted successfully",
        );

        Ok(complaint)
    }

    /// Move a complaint to `status` and record it in the audit trail.
    ///
    /// A blank or missing `resolution` keeps the previous one.
    pub async fn update_complaint_status(
        &self,
        id: &str,
        status: ComplaintStatus,
        resolution: Option<&str>,
        comment: Option<&str>,
    ) -> Result<Complaint> {
        let actor = self.session.current().await;
        let _loading = self.loading.begin();
        network_delay(self.latency).await;

        let comment = comment
            .map(str::to_string)
            .unwrap_or_else(|| format!("Status updated to {}", status));
        let updated_by = actor.as_ref().map(|a| a.name.clone());

        let updated = self
            .mutate(id, "Update failed", |complaint| {
                if let Some(resolution) = resolution.filter(|r| !r.trim().is_empty()) {
                    complaint.resolution = Some(resolution.to_string());
                }
                complaint.record(TrackingUpdate {
                    date: Utc::now(),
                    status,
                    comment: Some(comment),
                    updated_by,
                });
            })
            .await?;

        tracing::info!("Complaint {} moved to {}", updated.id, status);

        let kind = match status {
            ComplaintStatus::Resolved => NotificationKind::ComplaintResolved,
            _ => NotificationKind::System,
        };
        let title = match status {
            ComplaintStatus::Resolved => "Complaint Resolved",
            _ => "Complaint Status Updated",
        };

        self.emit(NotificationDraft::new(
            title,
            format!("Your complaint \"{}\" {}.", updated.title, status_phrase(status)),
            kind,
            Audience::Student,
        ))
        .await;

        if let Some(actor) = actor.as_ref() {
            if let Some(other) = actor.role.other_staff() {
                self.emit(NotificationDraft::new(
                    "Complaint Status Changed",
                    format!(
                        "{} changed the status of \"{}\" to {}",
                        actor.name, updated.title, status
                    ),
                    kind,
                    other.into(),
                ))
                .await;
            }
        }

        self.notices.success(
            "Complaint updated",
            format!("Complaint status has been updated to {}", status),
        );

        Ok(updated)
    }

    /// Hand a complaint to an investigator; the status always becomes investigating
    pub async fn assign_complaint(
        &self,
        id: &str,
        assigned_to: &str,
        assigned_to_name: &str,
    ) -> Result<Complaint> {
        let actor = self.session.current().await;
        let _loading = self.loading.begin();
        network_delay(self.latency).await;

        let updated = self
            .mutate(id, "Assignment failed", |complaint| {
                if matches!(
                    complaint.status,
                    ComplaintStatus::Resolved | ComplaintStatus::Rejected
                ) {
                    tracing::warn!(
                        "Reassigning closed complaint {} reopens it",
                        complaint.id
                    );
                }
                complaint.assigned_to = Some(assigned_to.to_string());
                complaint.assigned_to_name = Some(assigned_to_name.to_string());
                complaint.record(TrackingUpdate {
                    date: Utc::now(),
                    status: ComplaintStatus::Investigating,
                    comment: Some(format!("Assigned to {}", assigned_to_name)),
                    updated_by: actor.map(|a| a.name),
                });
            })
            .await?;

        tracing::info!("Complaint {} assigned to {}", updated.id, assigned_to);

        self.emit(NotificationDraft::new(
            "New Assignment",
            format!("You have been assigned to complaint \"{}\"", updated.title),
            NotificationKind::System,
            Audience::Investigator,
        ))
        .await;
        self.emit(NotificationDraft::new(
            "Complaint Under Investigation",
            format!(
                "Your complaint \"{}\" is now under investigation by {}",
                updated.title, assigned_to_name
            ),
            NotificationKind::System,
            Audience::Student,
        ))
        .await;

        self.notices.success(
            "Complaint assigned",
            format!("Complaint has been assigned to {}", assigned_to_name),
        );

        Ok(updated)
    }

    /// Edit one complaint on a copy of the collection, persist, then swap in
    async fn mutate<F>(&self, id: &str, failure_title: &str, edit: F) -> Result<Complaint>
    where
        F: FnOnce(&mut Complaint),
    {
        let mut complaints = self.complaints.write().await;
        let mut next = complaints.clone();

        let Some(target) = next.iter_mut().find(|c| c.id == id) else {
            tracing::info!("No complaint with id {}", id);
            self.notices
                .failure(failure_title, format!("Complaint {} could not be found", id));
            return Err(AppError::ComplaintNotFound(id.to_string()));
        };

        edit(target);
        let updated = target.clone();

        if let Err(e) = save_json(self.store.as_ref(), COMPLAINTS_KEY, &next).await {
            tracing::error!("Failed to persist complaint {}: {}", id, e);
            self.notices.failure(failure_title, TRY_AGAIN);
            return Err(e);
        }

        *complaints = next;
        Ok(updated)
    }

    async fn emit(&self, draft: NotificationDraft) {
        if let Err(e) = self.sink.notify(draft).await {
            tracing::warn!("Complaint saved but notification was not recorded: {}", e);
        }
    }
}
