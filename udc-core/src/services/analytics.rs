//! Complaint statistics
//!
//! Dashboard and analytics figures computed over a set of complaints.

use crate::database::{Complaint, ComplaintCategory, ComplaintStatus};
use serde::Serialize;

const MS_PER_DAY: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub category: ComplaintCategory,
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplaintStats {
    pub total: usize,
    pub pending: usize,
    pub investigating: usize,
    pub resolved: usize,
    pub rejected: usize,
    /// Categories with at least one complaint
    pub by_category: Vec<CategoryCount>,
    /// Share of resolved complaints, as a rounded percentage
    pub resolution_rate: u32,
    /// Mean of `updated_at - created_at` over resolved complaints, rounded to days
    pub average_resolution_days: i64,
}

pub fn compute_stats(complaints: &[Complaint]) -> ComplaintStats {
    let count = |status: ComplaintStatus| complaints.iter().filter(|c| c.status == status).count();

    let total = complaints.len();
    let resolved = count(ComplaintStatus::Resolved);

    let by_category = ComplaintCategory::ALL
        .into_iter()
        .map(|category| CategoryCount {
            category,
            label: category.label(),
            count: complaints.iter().filter(|c| c.category == category).count(),
        })
        .filter(|c| c.count > 0)
        .collect();

    let resolution_rate = if total > 0 {
        ((resolved as f64 / total as f64) * 100.0).round() as u32
    } else {
        0
    };

    let resolution_ms: Vec<i64> = complaints
        .iter()
        .filter(|c| c.status == ComplaintStatus::Resolved)
        .map(|c| (c.updated_at - c.created_at).num_milliseconds())
        .collect();
    let average_resolution_days = if resolution_ms.is_empty() {
        0
    } else {
        let mean = resolution_ms.iter().sum::<i64>() as f64 / resolution_ms.len() as f64;
        (mean / MS_PER_DAY).round() as i64
    };

    ComplaintStats {
        total,
        pending: count(ComplaintStatus::Pending),
        investigating: count(ComplaintStatus::Investigating),
        resolved,
        rejected: count(ComplaintStatus::Rejected),
        by_category,
        resolution_rate,
        average_resolution_days,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::seed::seed_complaints;

    #[test]
    fn test_stats_over_seed_data() {
        let stats = compute_stats(&seed_complaints());

        assert_eq!(stats.total, 5);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.investigating, 2);
        assert_eq!(stats.resolved, 2);
        assert_eq!(stats.rejected, 0);
        assert_eq!(stats.resolution_rate, 40);
        // c-003 took ~14.2 days, c-004 ~1.85 days
        assert_eq!(stats.average_resolution_days, 8);
        assert_eq!(stats.by_category.len(), 5);
        assert_eq!(stats.by_category[0].label, "Academic Misconduct");
    }

    #[test]
    fn test_stats_of_nothing() {
        let stats = compute_stats(&[]);

        assert_eq!(stats.total, 0);
        assert_eq!(stats.resolution_rate, 0);
        assert_eq!(stats.average_resolution_days, 0);
        assert!(stats.by_category.is_empty());
    }
}
