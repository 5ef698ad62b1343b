//! Notifications service
//!
//! Owns the global, role-addressed notification log. The log is kept
//! newest first and persisted wholesale after every change; visibility is
//! decided at read time from the viewer's role.

use crate::config::NOTIFICATIONS_KEY;
use crate::database::{Audience, Notification, NotificationDraft, NotificationKind};
use crate::error::Result;
use crate::events::NoticeBus;
use crate::services::Session;
use crate::storage::{load_json, save_json, KeyValueStore};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Receiver of lifecycle events emitted by the other services
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, draft: NotificationDraft) -> Result<Notification>;
}

/// Service for the notification log
#[derive(Clone)]
pub struct NotificationService {
    store: Arc<dyn KeyValueStore>,
    session: Session,
    notices: NoticeBus,
    popups_enabled: bool,
    log: Arc<RwLock<Vec<Notification>>>,
}

impl NotificationService {
    /// Read the log once from storage
    pub async fn load(
        store: Arc<dyn KeyValueStore>,
        session: Session,
        notices: NoticeBus,
        popups_enabled: bool,
    ) -> Result<Self> {
        let log: Vec<Notification> = load_json(store.as_ref(), NOTIFICATIONS_KEY)
            .await?
            .unwrap_or_default();

        tracing::info!("Loaded {} notifications", log.len());

        Ok(Self {
            store,
            session,
            notices,
            popups_enabled,
            log: Arc::new(RwLock::new(log)),
        })
    }

    /// Append a notification to the top of the log
    pub async fn add_notification(
        &self,
        title: impl Into<String>,
        message: impl Into<String>,
        kind: NotificationKind,
        target: Audience,
    ) -> Result<Notification> {
        let notification = Notification {
            id: format!("n-{}", Uuid::new_v4()),
            title: title.into(),
            message: message.into(),
            timestamp: Utc::now(),
            read: false,
            kind,
            target_role: Some(target),
        };

        let mut log = self.log.write().await;
        let mut next = Vec::with_capacity(log.len() + 1);
        next.push(notification.clone());
        next.extend(log.iter().cloned());

        if let Err(e) = save_json(self.store.as_ref(), NOTIFICATIONS_KEY, &next).await {
            tracing::error!("Failed to persist notification {}: {}", notification.id, e);
            return Err(e);
        }
        *log = next;
        drop(log);

        tracing::info!(
            "Added notification {} ({:?}) for {:?}",
            notification.id,
            kind,
            target
        );

        if self.popups_enabled {
            if let Some(role) = self.session.role().await {
                if target.includes(role) {
                    self.notices
                        .success(notification.title.clone(), notification.message.clone());
                }
            }
        }

        Ok(notification)
    }

    /// The whole log regardless of audience
    pub async fn all_notifications(&self) -> Vec<Notification> {
        self.log.read().await.clone()
    }

    /// Notifications visible to the current viewer, newest first
    pub async fn user_notifications(&self) -> Vec<Notification> {
        let Some(role) = self.session.role().await else {
            return Vec::new();
        };

        self.log
            .read()
            .await
            .iter()
            .filter(|n| n.is_visible_to(role))
            .cloned()
            .collect()
    }

    pub async fn unread_count(&self) -> usize {
        self.user_notifications()
            .await
            .iter()
            .filter(|n| !n.read)
            .count()
    }

    /// Mark one entry read; unknown or already-read ids are a no-op
    pub async fn mark_as_read(&self, id: &str) -> Result<()> {
        self.rewrite("mark as read", |log| {
            let mut changed = false;
            for n in log.iter_mut().filter(|n| n.id == id && !n.read) {
                n.read = true;
                changed = true;
            }
            changed
        })
        .await
    }

    /// Mark every entry of the log read
    pub async fn mark_all_as_read(&self) -> Result<()> {
        self.rewrite("mark all as read", |log| {
            let mut changed = false;
            for n in log.iter_mut().filter(|n| !n.read) {
                n.read = true;
                changed = true;
            }
            changed
        })
        .await
    }

    pub async fn delete_notification(&self, id: &str) -> Result<()> {
        self.rewrite("delete", |log| {
            let before = log.len();
            log.retain(|n| n.id != id);
            log.len() != before
        })
        .await
    }

    pub async fn clear_all_notifications(&self) -> Result<()> {
        self.rewrite("clear", |log| {
            log.clear();
            true
        })
        .await
    }

    /// Apply `edit` to a copy of the log, persist it, then swap it in.
    ///
    /// `edit` returns whether anything changed; unchanged logs are not written.
    async fn rewrite<F>(&self, action: &str, edit: F) -> Result<()>
    where
        F: FnOnce(&mut Vec<Notification>) -> bool,
    {
        let mut log = self.log.write().await;
        let mut next = log.clone();

        if !edit(&mut next) {
            tracing::debug!("Notification {}: nothing to change", action);
            return Ok(());
        }

        if let Err(e) = save_json(self.store.as_ref(), NOTIFICATIONS_KEY, &next).await {
            tracing::error!("Notification {} failed: {}", action, e);
            self.notices
                .failure("Notification update failed", "Something went wrong. Please try again later.");
            return Err(e);
        }

        *log = next;
        tracing::debug!("Notification {} applied, {} entries remain", action, log.len());
        Ok(())
    }
}

#[async_trait]
impl NotificationSink for NotificationService {
    async fn notify(&self, draft: NotificationDraft) -> Result<Notification> {
        self.add_notification(draft.title, draft.message, draft.kind, draft.target)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{Account, Role};
    use crate::events::NoticeVariant;
    use crate::storage::MemoryStore;

    fn account(role: Role) -> Account {
        Account {
            id: format!("{}-1", role),
            name: format!("{} one", role),
            email: format!("{}@university.edu", role),
            role,
            age: None,
            department: None,
            created_at: None,
        }
    }

    async fn create_test_service() -> (NotificationService, Session, MemoryStore, NoticeBus) {
        let store = MemoryStore::new();
        let session = Session::new();
        let notices = NoticeBus::default();
        let service = NotificationService::load(
            Arc::new(store.clone()),
            session.clone(),
            notices.clone(),
            true,
        )
        .await
        .unwrap();
        (service, session, store, notices)
    }

    async fn seed(service: &NotificationService) {
        for (title, target) in [
            ("everyone", Audience::All),
            ("students", Audience::Student),
            ("admins", Audience::Admin),
            ("investigators", Audience::Investigator),
        ] {
            service
                .add_notification(title, "msg", NotificationKind::System, target)
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_newest_first() {
        let (service, _session, _store, _notices) = create_test_service().await;

        service
            .add_notification("first", "1", NotificationKind::System, Audience::All)
            .await
            .unwrap();
        service
            .add_notification("second", "2", NotificationKind::System, Audience::All)
            .await
            .unwrap();

        let log = service.all_notifications().await;
        assert_eq!(log[0].title, "second");
        assert_eq!(log[1].title, "first");
        assert!(log[0].id.starts_with("n-"));
    }

    #[tokio::test]
    async fn test_feed_is_filtered_by_role() {
        let (service, session, _store, _notices) = create_test_service().await;
        seed(&service).await;

        assert!(service.user_notifications().await.is_empty());

        session.set(Some(account(Role::Admin))).await;
        let titles: Vec<String> = service
            .user_notifications()
            .await
            .into_iter()
            .map(|n| n.title)
            .collect();
        assert_eq!(titles, vec!["admins", "everyone"]);

        session.set(Some(account(Role::Student))).await;
        let titles: Vec<String> = service
            .user_notifications()
            .await
            .into_iter()
            .map(|n| n.title)
            .collect();
        assert_eq!(titles, vec!["students", "everyone"]);
    }

    #[tokio::test]
    async fn test_untargeted_entries_from_storage_are_public() {
        let store = MemoryStore::new();
        store
            .set(
                NOTIFICATIONS_KEY,
                r#"[{"id":"n-1","title":"Legacy","message":"m","timestamp":"2023-06-18T09:15:00Z","read":false,"type":"system"}]"#,
            )
            .await
            .unwrap();
        let session = Session::new();
        let service =
            NotificationService::load(Arc::new(store), session.clone(), NoticeBus::default(), true)
                .await
                .unwrap();

        session.set(Some(account(Role::Investigator))).await;
        assert_eq!(service.user_notifications().await.len(), 1);
        assert_eq!(service.unread_count().await, 1);
    }

    #[tokio::test]
    async fn test_unread_count_tracks_mutations() {
        let (service, session, _store, _notices) = create_test_service().await;
        session.set(Some(account(Role::Student))).await;
        seed(&service).await;

        assert_eq!(service.unread_count().await, 2);

        let students = service
            .user_notifications()
            .await
            .into_iter()
            .find(|n| n.title == "students")
            .unwrap();
        service.delete_notification(&students.id).await.unwrap();
        assert_eq!(service.unread_count().await, 1);

        service.mark_all_as_read().await.unwrap();
        assert_eq!(service.unread_count().await, 0);
        assert!(service.all_notifications().await.iter().all(|n| n.read));
    }

    #[tokio::test]
    async fn test_mark_as_read_is_idempotent() {
        let (service, session, store, _notices) = create_test_service().await;
        session.set(Some(account(Role::Admin))).await;
        seed(&service).await;
        let id = service.user_notifications().await[0].id.clone();

        service.mark_as_read(&id).await.unwrap();
        let once = service.all_notifications().await;
        let stored_once = store.get(NOTIFICATIONS_KEY).await.unwrap();

        service.mark_as_read(&id).await.unwrap();
        assert_eq!(service.all_notifications().await, once);
        assert_eq!(store.get(NOTIFICATIONS_KEY).await.unwrap(), stored_once);

        service.mark_as_read("n-missing").await.unwrap();
        assert_eq!(service.all_notifications().await, once);
    }

    #[tokio::test]
    async fn test_log_survives_reload() {
        let (service, session, store, _notices) = create_test_service().await;
        seed(&service).await;
        let id = service.all_notifications().await[1].id.clone();
        service.mark_as_read(&id).await.unwrap();

        let reloaded =
            NotificationService::load(Arc::new(store), session, NoticeBus::default(), true)
                .await
                .unwrap();

        assert_eq!(reloaded.all_notifications().await, service.all_notifications().await);
    }

    #[tokio::test]
    async fn test_clear_all() {
        let (service, session, store, _notices) = create_test_service().await;
        session.set(Some(account(Role::Admin))).await;
        seed(&service).await;

        service.clear_all_notifications().await.unwrap();

        assert!(service.all_notifications().await.is_empty());
        assert_eq!(service.unread_count().await, 0);
        assert_eq!(store.get(NOTIFICATIONS_KEY).await.unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_storage_failure_keeps_log() {
        let (service, session, store, notices) = create_test_service().await;
        session.set(Some(account(Role::Admin))).await;
        seed(&service).await;
        let before = service.all_notifications().await;
        let mut rx = notices.subscribe();

        store.set_fail_writes(true);
        assert!(service
            .add_notification("lost", "m", NotificationKind::System, Audience::All)
            .await
            .is_err());
        assert!(service.mark_all_as_read().await.is_err());
        assert!(service.clear_all_notifications().await.is_err());

        assert_eq!(service.all_notifications().await, before);
        let notice = rx.recv().await.unwrap();
        assert_eq!(notice.variant, NoticeVariant::Destructive);
    }

    #[tokio::test]
    async fn test_popup_only_for_matching_viewer() {
        let (service, session, _store, notices) = create_test_service().await;
        session.set(Some(account(Role::Student))).await;
        let mut rx = notices.subscribe();

        service
            .add_notification("for admins", "m", NotificationKind::System, Audience::Admin)
            .await
            .unwrap();
        service
            .add_notification("for students", "m", NotificationKind::System, Audience::Student)
            .await
            .unwrap();

        let notice = rx.recv().await.unwrap();
        assert_eq!(notice.title, "for students");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_popups_can_be_disabled() {
        let session = Session::new();
        let notices = NoticeBus::default();
        let service = NotificationService::load(
            Arc::new(MemoryStore::new()),
            session.clone(),
            notices.clone(),
            false,
        )
        .await
        .unwrap();
        session.set(Some(account(Role::Admin))).await;
        let mut rx = notices.subscribe();

        service
            .add_notification("quiet", "m", NotificationKind::System, Audience::All)
            .await
            .unwrap();

        assert!(rx.try_recv().is_err());
        assert_eq!(service.unread_count().await, 1);
    }
}
