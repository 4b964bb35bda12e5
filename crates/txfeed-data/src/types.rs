//! Wire types shared by the server, the transports and the caches

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// First name carried by the "All Employees" sentinel
pub const ALL_EMPLOYEES_FIRST_NAME: &str = "All";
/// Last name carried by the "All Employees" sentinel
pub const ALL_EMPLOYEES_LAST_NAME: &str = "Employees";

/// Employee directory entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    /// Unique identifier; the empty string is reserved for the sentinel
    pub id: String,
    pub first_name: String,
    pub last_name: String,
}

impl Employee {
    pub fn new(id: impl Into<String>, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    /// The synthetic "All Employees" filter entry
    pub fn all_employees() -> Self {
        Self::new("", ALL_EMPLOYEES_FIRST_NAME, ALL_EMPLOYEES_LAST_NAME)
    }

    /// True for the "All Employees" sentinel only
    pub fn is_all_employees(&self) -> bool {
        self.id.is_empty() && self.first_name == ALL_EMPLOYEES_FIRST_NAME
    }

    /// "First Last", as shown in the filter control
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A single card transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub amount: Decimal,
    pub employee: Employee,
    pub merchant: String,
    pub date: NaiveDate,
    pub approved: bool,
}

impl Transaction {
    pub fn employee_id(&self) -> &str {
        &self.employee.id
    }
}

/// One page of the unfiltered feed
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsPage {
    pub data: Vec<Transaction>,
    /// Token of the following page; `None` on the last page
    pub next_page: Option<String>,
}

impl TransactionsPage {
    pub fn has_next(&self) -> bool {
        self.next_page.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_detection() {
        assert!(Employee::all_employees().is_all_employees());
        assert!(!Employee::new("e1", "All", "Employees").is_all_employees());
        assert!(!Employee::new("", "Nobody", "Here").is_all_employees());
    }

    #[test]
    fn test_employee_wire_names() {
        let json = serde_json::to_value(Employee::new("e1", "James", "Smith")).unwrap();
        assert_eq!(json["firstName"], "James");
        assert_eq!(json["lastName"], "Smith");
    }

    #[test]
    fn test_last_page_serializes_null_token() {
        let page = TransactionsPage::default();
        let json = serde_json::to_value(&page).unwrap();
        assert!(json["nextPage"].is_null());
        assert!(!page.has_next());
    }
}
