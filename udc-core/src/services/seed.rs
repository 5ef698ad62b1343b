//! Seed complaints
//!
//! Written to storage the first time the complaint collection is missing.

use crate::config::{DEMO_ADMIN_ID, DEMO_INVESTIGATOR_ID, DEMO_STUDENT_ID};
use crate::database::{Complaint, ComplaintCategory, ComplaintStatus, TrackingUpdate};
use chrono::{DateTime, TimeZone, Utc};

fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .unwrap_or_default()
}

fn entry(date: DateTime<Utc>, status: ComplaintStatus, comment: &str, by: &str) -> TrackingUpdate {
    TrackingUpdate {
        date,
        status,
        comment: Some(comment.to_string()),
        updated_by: Some(by.to_string()),
    }
}

struct SeedComplaint {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    category: ComplaintCategory,
    submitted_by: (&'static str, &'static str),
    assigned: bool,
    resolution: Option<&'static str>,
    history: Vec<TrackingUpdate>,
}

impl SeedComplaint {
    fn build(self) -> Complaint {
        let created_at = self.history.first().map(|e| e.date).unwrap_or_default();
        let last = self.history.last().cloned();

        Complaint {
            id: self.id.to_string(),
            title: self.title.to_string(),
            description: self.description.to_string(),
            category: self.category,
            status: last.as_ref().map_or(ComplaintStatus::Pending, |e| e.status),
            submitted_by: self.submitted_by.0.to_string(),
            submitted_by_name: self.submitted_by.1.to_string(),
            assigned_to: self.assigned.then(|| DEMO_INVESTIGATOR_ID.to_string()),
            assigned_to_name: self.assigned.then(|| "Investigator User".to_string()),
            created_at,
            updated_at: last.map_or(created_at, |e| e.date),
            resolution: self.resolution.map(str::to_string),
            tracking_history: self.history,
        }
    }
}

/// The five demo complaints
pub fn seed_complaints() -> Vec<Complaint> {
    use ComplaintStatus::*;

    let admin = (DEMO_ADMIN_ID, "Admin User");
    let student = (DEMO_STUDENT_ID, "Student User");
    let other_student = ("student-456", "Another Student");

    vec![
        SeedComplaint {
            id: "c-001",
            title: "Cheating during final exam",
            description: "Student was seen using unauthorized notes during the CS-101 final exam.",
            category: ComplaintCategory::AcademicMisconduct,
            submitted_by: admin,
            assigned: true,
            resolution: None,
            history: vec![
                entry(at(2023, 6, 15, 10, 30), Pending, "Complaint submitted", "Admin User"),
                entry(
                    at(2023, 6, 16, 14, 20),
                    Investigating,
                    "Assigned to Investigator User",
                    "Admin User",
                ),
            ],
        },
        SeedComplaint {
            id: "c-002",
            title: "Harassment by fellow student",
            description: "I have been repeatedly harassed by a fellow student in my dorm.",
            category: ComplaintCategory::Harassment,
            submitted_by: student,
            assigned: false,
            resolution: None,
            history: vec![entry(
                at(2023, 6, 18, 9, 15),
                Pending,
                "Complaint submitted",
                "Student User",
            )],
        },
        SeedComplaint {
            id: "c-003",
            title: "Discriminatory comments by professor",
            description: "Professor made discriminatory comments during lecture on May 5th.",
            category: ComplaintCategory::Discrimination,
            submitted_by: student,
            assigned: true,
            resolution: Some(
                "After investigation, professor was required to attend sensitivity training and has issued an apology to the class.",
            ),
            history: vec![
                entry(at(2023, 5, 6, 11, 45), Pending, "Complaint submitted", "Student User"),
                entry(
                    at(2023, 5, 8, 10, 0),
                    Investigating,
                    "Assigned to Investigator User",
                    "Admin User",
                ),
                entry(
                    at(2023, 5, 20, 16, 30),
                    Resolved,
                    "Status updated to resolved",
                    "Investigator User",
                ),
            ],
        },
        SeedComplaint {
            id: "c-004",
            title: "Broken equipment in chemistry lab",
            description: "Several bunsen burners in the chemistry lab (room 302) are not functioning properly, creating a safety hazard.",
            category: ComplaintCategory::SafetyConcern,
            submitted_by: student,
            assigned: true,
            resolution: Some("Maintenance has replaced all defective equipment in the lab."),
            history: vec![
                entry(at(2023, 6, 10, 13, 20), Pending, "Complaint submitted", "Student User"),
                entry(
                    at(2023, 6, 10, 15, 0),
                    Investigating,
                    "Assigned to Investigator User",
                    "Admin User",
                ),
                entry(
                    at(2023, 6, 12, 9, 45),
                    Resolved,
                    "Status updated to resolved",
                    "Investigator User",
                ),
            ],
        },
        SeedComplaint {
            id: "c-005",
            title: "Elevator out of service in dormitory",
            description: "The elevator in East Hall has been out of service for two weeks, causing accessibility issues.",
            category: ComplaintCategory::FacilityIssue,
            submitted_by: other_student,
            assigned: true,
            resolution: None,
            history: vec![
                entry(at(2023, 6, 8, 16, 10), Pending, "Complaint submitted", "Another Student"),
                entry(
                    at(2023, 6, 9, 10, 30),
                    Investigating,
                    "Assigned to Investigator User",
                    "Admin User",
                ),
            ],
        },
    ]
    .into_iter()
    .map(SeedComplaint::build)
    .collect()
}
