//! Identity service
//!
//! Session lifecycle and account credentials. Demo accounts are fixed
//! constants; registered accounts live in the durable roster together with
//! their plaintext passwords.

use crate::config::{
    DEMO_ACCOUNT_IDS, DEMO_ADMIN_EMAIL, DEMO_ADMIN_ID, DEMO_INVESTIGATOR_EMAIL,
    DEMO_INVESTIGATOR_ID, DEMO_PASSWORD, DEMO_STUDENT_EMAIL, DEMO_STUDENT_ID,
    REGISTERED_USERS_KEY, SESSION_KEY,
};
use crate::database::{
    Account, Audience, NotificationDraft, NotificationKind, ProfileUpdate, Role, StoredAccount,
};
use crate::error::{AppError, Result};
use crate::events::NoticeBus;
use crate::services::directory::{filter_accounts, AccountQuery};
use crate::services::simulated::{network_delay, LoadingFlag};
use crate::services::{NotificationSink, Session};
use crate::storage::{load_json, save_json, KeyValueStore};
use chrono::{TimeZone, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

const TRY_AGAIN: &str = "Something went wrong. Please try again later.";

/// The three seeded accounts, one per role
pub fn demo_accounts() -> Vec<Account> {
    vec![
        Account {
            id: DEMO_ADMIN_ID.to_string(),
            name: "Admin User".to_string(),
            email: DEMO_ADMIN_EMAIL.to_string(),
            role: Role::Admin,
            age: None,
            department: None,
            created_at: Utc.with_ymd_and_hms(2023, 1, 15, 10, 30, 0).single(),
        },
        Account {
            id: DEMO_STUDENT_ID.to_string(),
            name: "Student User".to_string(),
            email: DEMO_STUDENT_EMAIL.to_string(),
            role: Role::Student,
            age: Some(21),
            department: Some("Computer Science".to_string()),
            created_at: Utc.with_ymd_and_hms(2023, 2, 20, 14, 45, 0).single(),
        },
        Account {
            id: DEMO_INVESTIGATOR_ID.to_string(),
            name: "Investigator User".to_string(),
            email: DEMO_INVESTIGATOR_EMAIL.to_string(),
            role: Role::Investigator,
            age: None,
            department: Some("Student Affairs".to_string()),
            created_at: Utc.with_ymd_and_hms(2023, 1, 25, 9, 15, 0).single(),
        },
    ]
}

pub fn is_demo_account(id: &str) -> bool {
    DEMO_ACCOUNT_IDS.contains(&id)
}

/// Service for accounts and the session
#[derive(Clone)]
pub struct IdentityService {
    store: Arc<dyn KeyValueStore>,
    session: Session,
    notices: NoticeBus,
    sink: Option<Arc<dyn NotificationSink>>,
    latency: Duration,
    loading: LoadingFlag,
    roster: Arc<RwLock<Vec<StoredAccount>>>,
}

impl IdentityService {
    /// Read the roster and any persisted session from storage
    pub async fn load(
        store: Arc<dyn KeyValueStore>,
        session: Session,
        notices: NoticeBus,
        sink: Option<Arc<dyn NotificationSink>>,
        latency: Duration,
    ) -> Result<Self> {
        let roster: Vec<StoredAccount> = load_json(store.as_ref(), REGISTERED_USERS_KEY)
            .await?
            .unwrap_or_default();
        let current: Option<Account> = load_json(store.as_ref(), SESSION_KEY).await?;

        tracing::info!(
            "Loaded {} registered accounts, session: {}",
            roster.len(),
            current.as_ref().map_or("anonymous", |a| a.id.as_str())
        );

        session.set(current).await;

        Ok(Self {
            store,
            session,
            notices,
            sink,
            latency,
            loading: LoadingFlag::default(),
            roster: Arc::new(RwLock::new(roster)),
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub async fn current_user(&self) -> Option<Account> {
        self.session.current().await
    }

    /// Whether a simulated call is in flight
    pub fn is_loading(&self) -> bool {
        self.loading.is_loading()
    }

    /// Log in with a demo or registered account
    pub async fn login(&self, email: &str, password: &str) -> Result<Account> {
        let _loading = self.loading.begin();
        network_delay(self.latency).await;

        let demo = demo_accounts()
            .into_iter()
            .find(|a| a.email == email && password == DEMO_PASSWORD);
        let found = match demo {
            Some(account) => Some(account),
            None => self
                .roster
                .read()
                .await
                .iter()
                .find(|s| s.account.email == email && s.password == password)
                .map(|s| s.account.clone()),
        };

        let Some(account) = found else {
            tracing::info!("Login rejected for {}", email);
            self.notices.failure("Login failed", "Invalid email or password");
            return Err(AppError::InvalidCredentials);
        };

        if let Err(e) = save_json(self.store.as_ref(), SESSION_KEY, &account).await {
            tracing::error!("Failed to persist session for {}: {}", account.id, e);
            self.notices.failure("Login failed", TRY_AGAIN);
            return Err(e);
        }
        self.session.set(Some(account.clone())).await;

        tracing::info!("Logged in: {} ({})", account.id, account.role);
        self.notices
            .success("Logged in successfully", format!("Welcome back, {}!", account.name));

        self.emit(NotificationDraft::new(
            "User Login",
            format!("{} ({}) logged in", account.name, account.role),
            NotificationKind::Login,
            Audience::All,
        ))
        .await;

        Ok(account)
    }

    /// Register a new student account and log it in
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<Account> {
        let _loading = self.loading.begin();
        network_delay(self.latency).await;

        let account = Account {
            id: format!("user-{}", Uuid::new_v4()),
            name: name.to_string(),
            email: email.to_string(),
            role: Role::Student,
            age: None,
            department: None,
            created_at: Some(Utc::now()),
        };

        let mut roster = self.roster.write().await;

        let taken = roster.iter().any(|s| s.account.email == email)
            || demo_accounts().iter().any(|a| a.email == email);
        if taken {
            tracing::warn!("Registering a second account for email {}", email);
        }

        let mut next = roster.clone();
        next.push(StoredAccount {
            account: account.clone(),
            password: password.to_string(),
        });

        if let Err(e) = save_json(self.store.as_ref(), REGISTERED_USERS_KEY, &next).await {
            tracing::error!("Failed to persist roster: {}", e);
            self.notices.failure("Registration failed", TRY_AGAIN);
            return Err(e);
        }

        if let Err(e) = save_json(self.store.as_ref(), SESSION_KEY, &account).await {
            tracing::error!("Failed to persist session for {}: {}", account.id, e);
            if let Err(restore) =
                save_json(self.store.as_ref(), REGISTERED_USERS_KEY, &*roster).await
            {
                tracing::warn!("Could not restore roster after failed registration: {}", restore);
            }
            self.notices.failure("Registration failed", TRY_AGAIN);
            return Err(e);
        }

        *roster = next;
        drop(roster);
        self.session.set(Some(account.clone())).await;

        tracing::info!("Registered account {}", account.id);
        self.notices
            .success("Registration successful", format!("Welcome, {}!", account.name));

        Ok(account)
    }

    /// Replace the profile fields of the logged-in account
    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<Account> {
        let Some(current) = self.session.current().await else {
            self.notices
                .failure("Update failed", "You must be logged in to update your profile");
            return Err(AppError::NotAuthenticated);
        };

        let _loading = self.loading.begin();
        network_delay(self.latency).await;

        let updated = Account {
            name: update.name,
            email: update.email,
            age: update.age,
            department: update.department,
            ..current
        };

        let mut roster = self.roster.write().await;
        let mut next = roster.clone();
        let in_roster = match next.iter_mut().find(|s| s.account.id == updated.id) {
            Some(entry) => {
                entry.account = updated.clone();
                true
            }
            None => false,
        };

        let persisted = async {
            if in_roster {
                save_json(self.store.as_ref(), REGISTERED_USERS_KEY, &next).await?;
            }
            save_json(self.store.as_ref(), SESSION_KEY, &updated).await
        }
        .await;

        if let Err(e) = persisted {
            tracing::error!("Failed to persist profile of {}: {}", updated.id, e);
            self.notices.failure("Update failed", TRY_AGAIN);
            return Err(e);
        }

        *roster = next;
        drop(roster);
        self.session.set(Some(updated.clone())).await;

        tracing::info!("Updated profile of {}", updated.id);
        self.notices
            .success("Profile updated", "Your profile has been updated successfully");

        Ok(updated)
    }

    /// Change the password of the logged-in registered account
    pub async fn update_password(&self, current_password: &str, new_password: &str) -> Result<()> {
        let Some(current) = self.session.current().await else {
            self.notices
                .failure("Password change failed", "You must be logged in to change your password");
            return Err(AppError::NotAuthenticated);
        };

        if is_demo_account(&current.id) {
            tracing::info!("Refused password change for demo account {}", current.id);
            self.notices.failure(
                "Password change failed",
                "Passwords of demo accounts cannot be changed",
            );
            return Err(AppError::DemoAccountLocked(current.id));
        }

        let _loading = self.loading.begin();
        network_delay(self.latency).await;

        let mut roster = self.roster.write().await;
        let mut next = roster.clone();

        let Some(entry) = next.iter_mut().find(|s| s.account.id == current.id) else {
            self.notices
                .failure("Password change failed", "Your account could not be found");
            return Err(AppError::AccountNotFound(current.id));
        };

        if entry.password != current_password {
            self.notices
                .failure("Password change failed", "Current password is incorrect");
            return Err(AppError::IncorrectPassword);
        }
        entry.password = new_password.to_string();

        if let Err(e) = save_json(self.store.as_ref(), REGISTERED_USERS_KEY, &next).await {
            tracing::error!("Failed to persist password of {}: {}", current.id, e);
            self.notices.failure("Password change failed", TRY_AGAIN);
            return Err(e);
        }
        *roster = next;

        tracing::info!("Password changed for {}", current.id);
        self.notices
            .success("Password updated", "Your password has been changed successfully");

        Ok(())
    }

    /// Clear the session. Never fails; a storage error is only logged.
    pub async fn logout(&self) {
        self.session.set(None).await;

        if let Err(e) = self.store.remove(SESSION_KEY).await {
            tracing::warn!("Failed to remove persisted session: {}", e);
        }

        tracing::info!("Logged out");
        self.notices
            .success("Logged out", "You have been logged out successfully");
    }

    /// Current account if its role is one of `allowed`
    pub async fn require_role(&self, allowed: &[Role]) -> Result<Account> {
        let Some(account) = self.session.current().await else {
            self.notices
                .failure("Authentication required", "You must be logged in to do that");
            return Err(AppError::NotAuthenticated);
        };

        if !allowed.contains(&account.role) {
            tracing::warn!("{} refused: role {} not permitted", account.id, account.role);
            self.notices
                .failure("Access denied", "Your role does not permit this action");
            return Err(AppError::Forbidden);
        }

        Ok(account)
    }

    /// Registered accounts without their passwords
    pub async fn registered_accounts(&self) -> Vec<Account> {
        self.roster
            .read()
            .await
            .iter()
            .map(|s| s.account.clone())
            .collect()
    }

    /// Staff-only listing of demo and registered accounts
    pub async fn directory(&self, query: &AccountQuery) -> Result<Vec<Account>> {
        self.require_role(&[Role::Admin, Role::Investigator]).await?;

        let mut accounts = demo_accounts();
        accounts.extend(self.registered_accounts().await);

        Ok(filter_accounts(&accounts, query))
    }

    async fn emit(&self, draft: NotificationDraft) {
        let Some(sink) = &self.sink else {
            return;
        };

        if let Err(e) = sink.notify(draft).await {
            tracing::warn!("Failed to record notification: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Notification;
    use crate::events::NoticeVariant;
    use crate::storage::MemoryStore;
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        drafts: Mutex<Vec<NotificationDraft>>,
    }

    #[async_trait]
    impl NotificationSink for RecordingSink {
        async fn notify(&self, draft: NotificationDraft) -> Result<Notification> {
            self.drafts.lock().await.push(draft.clone());
            Ok(Notification {
                id: "n-test".to_string(),
                title: draft.title,
                message: draft.message,
                timestamp: Utc::now(),
                read: false,
                kind: draft.kind,
                target_role: Some(draft.target),
            })
        }
    }

    async fn create_test_service() -> (IdentityService, MemoryStore, Arc<RecordingSink>) {
        let store = MemoryStore::new();
        let sink = Arc::new(RecordingSink::default());
        let service = IdentityService::load(
            Arc::new(store.clone()),
            Session::new(),
            NoticeBus::default(),
            Some(sink.clone() as Arc<dyn NotificationSink>),
            Duration::ZERO,
        )
        .await
        .unwrap();
        (service, store, sink)
    }

    #[tokio::test]
    async fn test_demo_login_emits_login_event() {
        let (service, store, sink) = create_test_service().await;

        let account = service
            .login("admin@university.edu", "password")
            .await
            .unwrap();

        assert_eq!(account.id, "admin-123");
        assert_eq!(account.role, Role::Admin);
        assert_eq!(service.current_user().await, Some(account));
        assert!(store.get(SESSION_KEY).await.unwrap().is_some());

        let drafts = sink.drafts.lock().await;
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].kind, NotificationKind::Login);
        assert_eq!(drafts[0].target, Audience::All);
        assert!(drafts[0].message.contains("Admin User"));
    }

    #[tokio::test]
    async fn test_login_failure_is_reported() {
        let (service, _store, sink) = create_test_service().await;
        let mut rx = service.notices.subscribe();

        let result = service.login("admin@university.edu", "wrong").await;

        assert!(matches!(result, Err(AppError::InvalidCredentials)));
        assert!(service.current_user().await.is_none());
        assert!(sink.drafts.lock().await.is_empty());
        let notice = rx.recv().await.unwrap();
        assert_eq!(notice.title, "Login failed");
        assert_eq!(notice.variant, NoticeVariant::Destructive);
    }

    #[tokio::test]
    async fn test_login_shows_loading_state() {
        let store = MemoryStore::new();
        let service = IdentityService::load(
            Arc::new(store),
            Session::new(),
            NoticeBus::default(),
            None,
            Duration::from_millis(200),
        )
        .await
        .unwrap();

        let task = tokio::spawn({
            let service = service.clone();
            async move { service.login("student@university.edu", "password").await }
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(service.is_loading());

        task.await.unwrap().unwrap();
        assert!(!service.is_loading());
    }

    #[tokio::test]
    async fn test_register_logs_in_as_student() {
        let (service, store, _sink) = create_test_service().await;

        let account = service
            .register("Jane Doe", "jane@u.edu", "secret1")
            .await
            .unwrap();

        assert!(account.id.starts_with("user-"));
        assert_eq!(account.role, Role::Student);
        assert_eq!(service.current_user().await, Some(account.clone()));

        let raw = store.get(REGISTERED_USERS_KEY).await.unwrap().unwrap();
        let roster: Vec<StoredAccount> = serde_json::from_str(&raw).unwrap();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].password, "secret1");

        service.logout().await;
        let again = service.login("jane@u.edu", "secret1").await.unwrap();
        assert_eq!(again.id, account.id);
    }

    #[tokio::test]
    async fn test_register_allows_duplicate_email() {
        let (service, _store, _sink) = create_test_service().await;

        let first = service.register("Jane", "jane@u.edu", "one").await.unwrap();
        let second = service.register("Jane", "jane@u.edu", "two").await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(service.registered_accounts().await.len(), 2);
    }

    #[tokio::test]
    async fn test_register_failure_applies_nothing() {
        let (service, store, _sink) = create_test_service().await;
        store.set_fail_writes(true);

        let result = service.register("Jane", "jane@u.edu", "secret1").await;

        assert!(result.is_err());
        assert!(service.current_user().await.is_none());
        assert!(service.registered_accounts().await.is_empty());
    }

    #[tokio::test]
    async fn test_session_is_restored_on_load() {
        let (service, store, _sink) = create_test_service().await;
        service
            .login("investigator@university.edu", "password")
            .await
            .unwrap();

        let reloaded = IdentityService::load(
            Arc::new(store),
            Session::new(),
            NoticeBus::default(),
            None,
            Duration::ZERO,
        )
        .await
        .unwrap();

        assert_eq!(
            reloaded.current_user().await.map(|a| a.id),
            Some("investigator-123".to_string())
        );
    }

    #[tokio::test]
    async fn test_update_profile_updates_roster_and_session() {
        let (service, _store, _sink) = create_test_service().await;
        let account = service.register("Jane", "jane@u.edu", "secret1").await.unwrap();

        let updated = service
            .update_profile(ProfileUpdate {
                name: "Jane Q. Doe".to_string(),
                email: "jane.doe@u.edu".to_string(),
                age: Some(22),
                department: Some("Physics".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(updated.id, account.id);
        assert_eq!(updated.role, Role::Student);
        assert_eq!(service.current_user().await, Some(updated.clone()));
        assert_eq!(service.registered_accounts().await, vec![updated]);
    }

    #[tokio::test]
    async fn test_update_profile_requires_session() {
        let (service, _store, _sink) = create_test_service().await;

        let result = service.update_profile(ProfileUpdate::default()).await;

        assert!(matches!(result, Err(AppError::NotAuthenticated)));
    }

    #[tokio::test]
    async fn test_demo_password_is_locked() {
        let (service, store, _sink) = create_test_service().await;
        service.login("admin@university.edu", "password").await.unwrap();

        let result = service.update_password("password", "new-password").await;

        assert!(matches!(result, Err(AppError::DemoAccountLocked(ref id)) if id == "admin-123"));
        assert!(store.get(REGISTERED_USERS_KEY).await.unwrap().is_none());
        service.logout().await;
        assert!(service.login("admin@university.edu", "password").await.is_ok());
    }

    #[tokio::test]
    async fn test_update_password() {
        let (service, _store, _sink) = create_test_service().await;
        service.register("Jane", "jane@u.edu", "secret1").await.unwrap();

        let wrong = service.update_password("nope", "secret2").await;
        assert!(matches!(wrong, Err(AppError::IncorrectPassword)));

        service.update_password("secret1", "secret2").await.unwrap();
        service.logout().await;

        assert!(service.login("jane@u.edu", "secret1").await.is_err());
        assert!(service.login("jane@u.edu", "secret2").await.is_ok());
    }

    #[tokio::test]
    async fn test_logout_clears_persisted_session() {
        let (service, store, _sink) = create_test_service().await;
        service.login("student@university.edu", "password").await.unwrap();

        service.logout().await;

        assert!(service.current_user().await.is_none());
        assert!(store.get(SESSION_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_directory_is_staff_only() {
        let (service, _store, _sink) = create_test_service().await;
        service.register("Jane", "jane@u.edu", "secret1").await.unwrap();

        let denied = service.directory(&AccountQuery::default()).await;
        assert!(matches!(denied, Err(AppError::Forbidden)));

        service.logout().await;
        service
            .login("investigator@university.edu", "password")
            .await
            .unwrap();

        let all = service.directory(&AccountQuery::default()).await.unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all[0].id, "admin-123");
        assert_eq!(all[3].name, "Jane");

        let students = service
            .directory(&AccountQuery {
                search: None,
                role: Some(Role::Student),
            })
            .await
            .unwrap();
        assert_eq!(students.len(), 2);
    }

    #[tokio::test]
    async fn test_role_refusal_is_reported() {
        let (service, _store, _sink) = create_test_service().await;
        let mut rx = service.notices.subscribe();

        let anonymous = service.require_role(&[Role::Admin]).await;
        assert!(matches!(anonymous, Err(AppError::NotAuthenticated)));
        let notice = rx.recv().await.unwrap();
        assert_eq!(notice.variant, NoticeVariant::Destructive);
        assert_eq!(notice.title, "Authentication required");

        service.login("student@university.edu", "password").await.unwrap();
        let mut rx = service.notices.subscribe();

        let student = service.require_role(&[Role::Admin, Role::Investigator]).await;
        assert!(matches!(student, Err(AppError::Forbidden)));
        let notice = rx.recv().await.unwrap();
        assert_eq!(notice.variant, NoticeVariant::Destructive);
        assert_eq!(notice.title, "Access denied");
    }
}
