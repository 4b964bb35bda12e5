//! Transaction data model and the JSON dataset backing the feed
//!
//! A dataset file looks like:
//!
//! ```json
//! { "employees": [{ "id": "e1", "firstName": "James", "lastName": "Smith" }],
//!   "transactions": [{ "id": "t1", "amount": "12.50", "merchant": "Acme",
//!                      "date": "2024-03-01", "approved": false,
//!                      "employee": { "id": "e1", "firstName": "James", "lastName": "Smith" } }] }
//! ```

pub mod error;
pub mod types;

use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

pub use error::DataError;
pub use types::{Employee, Transaction, TransactionsPage, ALL_EMPLOYEES_FIRST_NAME, ALL_EMPLOYEES_LAST_NAME};

#[derive(Debug, Deserialize)]
struct RawDataset {
    #[serde(default)]
    employees: Vec<Employee>,
    #[serde(default)]
    transactions: Vec<Transaction>,
}

/// In-memory employees and transactions, served page by page
#[derive(Debug, Clone)]
pub struct Dataset {
    employees: Vec<Employee>,
    transactions: Vec<Transaction>,
    page_size: usize,
}

impl Dataset {
    /// Build a dataset, checking employee ids and transaction ownership
    pub fn new(
        employees: Vec<Employee>,
        transactions: Vec<Transaction>,
        page_size: usize,
    ) -> Result<Self, DataError> {
        let mut ids = HashSet::new();
        for employee in &employees {
            if employee.id.is_empty() {
                return Err(DataError::EmptyEmployeeId);
            }
            if !ids.insert(employee.id.as_str()) {
                return Err(DataError::DuplicateEmployee {
                    id: employee.id.clone(),
                });
            }
        }

        for tx in &transactions {
            if !ids.contains(tx.employee_id()) {
                return Err(DataError::UnknownEmployee {
                    transaction: tx.id.clone(),
                    employee: tx.employee.id.clone(),
                });
            }
        }

        Ok(Self {
            employees,
            transactions,
            page_size: page_size.max(1),
        })
    }

    /// Parse a dataset from JSON text
    pub fn from_json(content: &str, page_size: usize) -> Result<Self, DataError> {
        let raw: RawDataset = serde_json::from_str(content)?;
        Self::new(raw.employees, raw.transactions, page_size)
    }

    /// Load a dataset file
    pub async fn load(path: impl AsRef<Path>, page_size: usize) -> Result<Self, DataError> {
        let content = tokio::fs::read_to_string(path.as_ref()).await?;
        Self::from_json(&content, page_size)
    }

    /// Employee directory in file order
    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Return one page of the unfiltered feed.
    ///
    /// `None` is the first page. Tokens are decimal page indices; the
    /// last page carries `next_page: None`.
    pub fn page(&self, token: Option<&str>) -> Result<TransactionsPage, DataError> {
        let index = match token {
            None => 0,
            Some(raw) => raw.parse::<usize>().map_err(|_| DataError::PageNotFound {
                token: raw.to_string(),
            })?,
        };

        let total = self.transactions.len();
        let start = index.saturating_mul(self.page_size);
        if start > total || (start == total && index > 0) {
            return Err(DataError::PageNotFound {
                token: index.to_string(),
            });
        }

        let end = (start + self.page_size).min(total);
        let next_page = (end < total).then(|| (index + 1).to_string());

        Ok(TransactionsPage {
            data: self.transactions[start..end].to_vec(),
            next_page,
        })
    }

    /// Every transaction owned by `employee_id`, in feed order
    pub fn transactions_for_employee(&self, employee_id: &str) -> Result<Vec<Transaction>, DataError> {
        if !self.employees.iter().any(|e| e.id == employee_id) {
            return Err(DataError::EmployeeNotFound {
                id: employee_id.to_string(),
            });
        }

        Ok(self
            .transactions
            .iter()
            .filter(|t| t.employee_id() == employee_id)
            .cloned()
            .collect())
    }
}

// ==================== Tests ====================
