//! Account directory helpers
//!
//! Filtering and CSV export for the staff-only account listing.

use crate::database::{Account, Role};

/// Directory filter; empty fields match everything
#[derive(Debug, Clone, Default)]
pub struct AccountQuery {
    pub search: Option<String>,
    pub role: Option<Role>,
}

impl AccountQuery {
    /// Case-insensitive match on name, email, role or department
    pub fn matches(&self, account: &Account) -> bool {
        let matches_role = self.role.map_or(true, |role| account.role == role);

        let matches_search = match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                account.name.to_lowercase().contains(&term)
                    || account.email.to_lowercase().contains(&term)
                    || account.role.as_str().contains(&term)
                    || account
                        .department
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&term))
            }
        };

        matches_role && matches_search
    }
}

pub fn filter_accounts(accounts: &[Account], query: &AccountQuery) -> Vec<Account> {
    accounts
        .iter()
        .filter(|account| query.matches(account))
        .cloned()
        .collect()
}

const CSV_HEADER: &str = "Name,Email,Role,Department,Age,Registered Date";

/// Render accounts as CSV, one row per account
pub fn accounts_to_csv(accounts: &[Account]) -> String {
    let mut rows = vec![CSV_HEADER.to_string()];

    for account in accounts {
        let age = account.age.map(|a| a.to_string());
        let registered = account
            .created_at
            .map(|d| d.format("%b %-d, %Y").to_string());

        let fields = [
            Some(account.name.clone()),
            Some(account.email.clone()),
            Some(account.role.to_string()),
            account.department.clone(),
            age,
            registered,
        ];

        rows.push(
            fields
                .iter()
                .map(|f| csv_field(f.as_deref().unwrap_or("N/A")))
                .collect::<Vec<_>>()
                .join(","),
        );
    }

    rows.join("\n")
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
