//! Application state and initialization
//!
//! This module manages the central application state and lifecycle.
//! All services are initialized here and made available through AppState.

use crate::config::DATABASE_FILE;
use crate::database::{create_pool, Repository};
use crate::error::Result;
use crate::events::NoticeBus;
use crate::services::{
    AppSettings, ComplaintService, IdentityService, NotificationService, NotificationSink,
    Session, SettingsService,
};
use crate::storage::KeyValueStore;
use std::path::PathBuf;
use std::sync::Arc;

/// Central application state holding all services
#[derive(Clone)]
pub struct AppState {
    pub app_data_dir: PathBuf,
    pub settings_service: SettingsService,
    pub notices: NoticeBus,
    pub session: Session,
    pub notifications_service: NotificationService,
    pub identity_service: IdentityService,
    pub complaints_service: ComplaintService,
}

impl AppState {
    /// Open the database under `app_data_dir` and wire up every service.
    ///
    /// `latency_ms` overrides the simulated latency from the settings file.
    pub async fn initialize(app_data_dir: PathBuf, latency_ms: Option<u64>) -> Result<Self> {
        tracing::info!("Initializing application in {:?}", app_data_dir);

        tokio::fs::create_dir_all(&app_data_dir).await?;

        let settings_service = SettingsService::new(app_data_dir.clone());
        let mut settings = settings_service.load().await?;
        if let Some(ms) = latency_ms {
            settings.behavior.simulated_latency_ms = ms;
        }

        let pool = create_pool(&app_data_dir.join(DATABASE_FILE)).await?;
        let store: Arc<dyn KeyValueStore> = Arc::new(Repository::new(pool));

        let state = Self::with_store(app_data_dir, settings_service, store, &settings).await?;

        tracing::info!("Application initialized successfully");
        Ok(state)
    }

    /// Wire the services over an already opened store
    pub async fn with_store(
        app_data_dir: PathBuf,
        settings_service: SettingsService,
        store: Arc<dyn KeyValueStore>,
        settings: &AppSettings,
    ) -> Result<Self> {
        let latency = settings.behavior.latency();
        let notices = NoticeBus::default();
        let session = Session::new();

        let notifications_service = NotificationService::load(
            store.clone(),
            session.clone(),
            notices.clone(),
            settings.notifications.notifications_enabled,
        )
        .await?;
        let sink: Arc<dyn NotificationSink> = Arc::new(notifications_service.clone());

        let identity_service = IdentityService::load(
            store.clone(),
            session.clone(),
            notices.clone(),
            Some(sink.clone()),
            latency,
        )
        .await?;

        let complaints_service =
            ComplaintService::load(store, session.clone(), notices.clone(), sink, latency).await?;

        Ok(Self {
            app_data_dir,
            settings_service,
            notices,
            session,
            notifications_service,
            identity_service,
            complaints_service,
        })
    }
}
