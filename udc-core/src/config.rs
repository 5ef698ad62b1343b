//! Application configuration constants
//!
//! Central location for storage keys, seed credentials and defaults
//! used throughout the application.

// ===== Storage Keys =====

/// Session identity of the current account
pub const SESSION_KEY: &str = "udc_user";
/// Registered accounts, including plaintext passwords
pub const REGISTERED_USERS_KEY: &str = "udc_registered_users";
/// Complaint collection
pub const COMPLAINTS_KEY: &str = "udc_complaints";
/// Global notification log, newest first
pub const NOTIFICATIONS_KEY: &str = "udc_notifications";

// ===== Files =====

/// SQLite database holding the key-value namespace
pub const DATABASE_FILE: &str = "udc.db";
/// Admin-editable settings document
pub const SETTINGS_FILE: &str = "settings.json";

// ===== Demo Accounts =====

/// Password shared by the three seeded demo accounts
pub const DEMO_PASSWORD: &str = "password";

pub const DEMO_ADMIN_ID: &str = "admin-123";
pub const DEMO_ADMIN_EMAIL: &str = "admin@university.edu";

pub const DEMO_STUDENT_ID: &str = "student-123";
pub const DEMO_STUDENT_EMAIL: &str = "student@university.edu";

pub const DEMO_INVESTIGATOR_ID: &str = "investigator-123";
pub const DEMO_INVESTIGATOR_EMAIL: &str = "investigator@university.edu";

/// Reserved ids that can never change their password
pub const DEMO_ACCOUNT_IDS: &[&str] = &[DEMO_ADMIN_ID, DEMO_STUDENT_ID, DEMO_INVESTIGATOR_ID];

// ===== Behavior Defaults =====

/// Artificial latency of every simulated remote call, in milliseconds
pub const DEFAULT_SIMULATED_LATENCY_MS: u64 = 1000;

/// Upper bound accepted for the simulated latency (10 seconds)
pub const MAX_SIMULATED_LATENCY_MS: u64 = 10_000;

/// Default number of entries in the dashboard "recent complaints" list
pub const RECENT_COMPLAINTS_LIMIT: usize = 4;

/// Capacity of the transient notice channel
pub const NOTICE_CHANNEL_CAPACITY: usize = 64;

/// Default application name shown in the header
pub const DEFAULT_APP_NAME: &str = "UDC System";

/// Default institutional email domain
pub const DEFAULT_EMAIL_DOMAIN: &str = "university.edu";
