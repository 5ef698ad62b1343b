//! Domain models
//!
//! Rust structs representing the records kept in the key-value namespace.
//! Field names serialize in camelCase and enum values in snake_case so the
//! stored JSON matches what the browser front end reads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of an account
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Student,
    Admin,
    Investigator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Admin => "admin",
            Role::Investigator => "investigator",
        }
    }

    /// Admins and investigators
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Investigator)
    }

    /// The staff role opposite to this one; `None` for students
    pub fn other_staff(&self) -> Option<Role> {
        match self {
            Role::Admin => Some(Role::Investigator),
            Role::Investigator => Some(Role::Admin),
            Role::Student => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "admin" => Ok(Role::Admin),
            "investigator" => Ok(Role::Investigator),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Who a notification is addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    Student,
    Admin,
    Investigator,
    All,
}

impl Audience {
    pub fn includes(&self, role: Role) -> bool {
        match self {
            Audience::All => true,
            Audience::Student => role == Role::Student,
            Audience::Admin => role == Role::Admin,
            Audience::Investigator => role == Role::Investigator,
        }
    }
}

impl From<Role> for Audience {
    fn from(role: Role) -> Self {
        match role {
            Role::Student => Audience::Student,
            Role::Admin => Audience::Admin,
            Role::Investigator => Audience::Investigator,
        }
    }
}

/// A user account as seen by the rest of the application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
    pub email: String,
    /// Roster entries written without a role are students
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Roster entry: an account plus its plaintext password
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredAccount {
    #[serde(flatten)]
    pub account: Account,
    pub password: String,
}

/// Profile update request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub name: String,
    pub email: String,
    pub age: Option<u32>,
    pub department: Option<String>,
}

/// Complaint category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplaintCategory {
    AcademicMisconduct,
    Harassment,
    Discrimination,
    SafetyConcern,
    FacilityIssue,
    Other,
}

impl ComplaintCategory {
    pub const ALL: [ComplaintCategory; 6] = [
        ComplaintCategory::AcademicMisconduct,
        ComplaintCategory::Harassment,
        ComplaintCategory::Discrimination,
        ComplaintCategory::SafetyConcern,
        ComplaintCategory::FacilityIssue,
        ComplaintCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComplaintCategory::AcademicMisconduct => "academic_misconduct",
            ComplaintCategory::Harassment => "harassment",
            ComplaintCategory::Discrimination => "discrimination",
            ComplaintCategory::SafetyConcern => "safety_concern",
            ComplaintCategory::FacilityIssue => "facility_issue",
            ComplaintCategory::Other => "other",
        }
    }

    /// Title-cased label, e.g. "Academic Misconduct"
    pub fn label(&self) -> String {
        self.as_str()
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for ComplaintCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ComplaintCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown category: {}", s))
    }
}

/// Complaint status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplaintStatus {
    Pending,
    Investigating,
    Resolved,
    Rejected,
}

impl ComplaintStatus {
    pub const ALL: [ComplaintStatus; 4] = [
        ComplaintStatus::Pending,
        ComplaintStatus::Investigating,
        ComplaintStatus::Resolved,
        ComplaintStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComplaintStatus::Pending => "pending",
            ComplaintStatus::Investigating => "investigating",
            ComplaintStatus::Resolved => "resolved",
            ComplaintStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ComplaintStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown status: {}", s))
    }
}

/// One entry of a complaint's audit trail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingUpdate {
    pub date: DateTime<Utc>,
    pub status: ComplaintStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
}

/// A complaint and its audit trail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Complaint {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: ComplaintCategory,
    pub status: ComplaintStatus,
    pub submitted_by: String,
    /// Snapshot of the author's name at submission time
    pub submitted_by_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    #[serde(default)]
    pub tracking_history: Vec<TrackingUpdate>,
}

impl Complaint {
    /// Append an audit entry and move `updated_at` to its date.
    ///
    /// The entry date is clamped so the trail never goes backwards in time.
    pub fn record(&mut self, mut update: TrackingUpdate) {
        if let Some(last) = self.tracking_history.last() {
            if update.date < last.date {
                update.date = last.date;
            }
        }
        self.status = update.status;
        self.updated_at = update.date;
        self.tracking_history.push(update);
    }
}

/// Kind of notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Login,
    ComplaintResolved,
    ComplaintSubmitted,
    System,
}

/// Entry of the global notification log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    /// `None` means everyone, same as `Audience::All`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_role: Option<Audience>,
}

impl Notification {
    pub fn is_visible_to(&self, role: Role) -> bool {
        self.target_role.map_or(true, |audience| audience.includes(role))
    }
}

/// Event handed to a notification sink
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationDraft {
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub target: Audience,
}

impl NotificationDraft {
    pub fn new(
        title: impl Into<String>,
        message: impl Into<String>,
        kind: NotificationKind,
        target: Audience,
    ) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            kind,
            target,
        }
    }
}
