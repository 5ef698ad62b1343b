//! Services module
//!
//! Business logic services that coordinate between commands and storage.

pub mod analytics;
pub mod complaints;
pub mod directory;
pub mod identity;
pub mod notifications;
pub mod seed;
pub mod session;
pub mod settings;
pub mod simulated;

pub use analytics::ComplaintStats;
pub use complaints::{ComplaintFilter, ComplaintService};
pub use directory::AccountQuery;
pub use identity::IdentityService;
pub use notifications::{NotificationService, NotificationSink};
pub use session::Session;
pub use settings::{AppSettings, BehaviorSettings, GeneralSettings, NotificationSettings, SettingsService};
