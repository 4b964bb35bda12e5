//! Pure derivations from cache states to what the presentation layer shows

use serde::Serialize;
use txfeed_data::{Employee, Transaction, TransactionsPage};

use crate::error::FetchError;
use crate::state::CacheState;

/// Transactions to display.
///
/// The employee-scoped cache wins whenever it holds data; otherwise the
/// accumulated pages are shown; `None` means nothing has arrived yet.
pub fn visible_transactions(
    by_employee: &CacheState<Vec<Transaction>>,
    paginated: &CacheState<TransactionsPage>,
) -> Option<Vec<Transaction>> {
    by_employee
        .data
        .clone()
        .or_else(|| paginated.data.as_ref().map(|page| page.data.clone()))
}

/// Whether the "load more" control is offered
pub fn load_more_enabled(
    by_employee: &CacheState<Vec<Transaction>>,
    paginated: &CacheState<TransactionsPage>,
) -> bool {
    let has_visible = by_employee.data.is_some() || paginated.data.is_some();
    let more_pages = paginated.data.as_ref().map_or(true, TransactionsPage::has_next);
    has_visible && more_pages && by_employee.data.is_none()
}

/// One entry of the employee filter control
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOption {
    pub value: String,
    pub label: String,
}

impl From<&Employee> for FilterOption {
    fn from(employee: &Employee) -> Self {
        Self {
            value: employee.id.clone(),
            label: employee.display_name(),
        }
    }
}

/// "All Employees" followed by the directory; empty until the directory arrives
pub fn filter_options(directory: &CacheState<Vec<Employee>>) -> Vec<FilterOption> {
    match directory.data {
        None => vec![],
        Some(ref employees) => std::iter::once(FilterOption::from(&Employee::all_employees()))
            .chain(employees.iter().map(FilterOption::from))
            .collect(),
    }
}

/// Everything the presentation layer renders, captured at one instant
#[derive(Debug, Clone, Serialize)]
pub struct ViewSnapshot {
    pub visible_transactions: Option<Vec<Transaction>>,
    pub employee_directory_loading: bool,
    /// A "show all transactions" load is running
    pub all_transactions_loading: bool,
    pub filter_options: Vec<FilterOption>,
    pub load_more_enabled: bool,
    /// The load-more control is disabled while a page is loading
    pub load_more_busy: bool,
    pub errors: Vec<FetchError>,
}

impl ViewSnapshot {
    pub fn derive(
        directory: &CacheState<Vec<Employee>>,
        paginated: &CacheState<TransactionsPage>,
        by_employee: &CacheState<Vec<Transaction>>,
        all_transactions_loading: bool,
    ) -> Self {
        let errors = [&directory.error, &paginated.error, &by_employee.error]
            .into_iter()
            .flatten()
            .cloned()
            .collect();

        Self {
            visible_transactions: visible_transactions(by_employee, paginated),
            employee_directory_loading: directory.is_loading,
            all_transactions_loading,
            filter_options: filter_options(directory),
            load_more_enabled: load_more_enabled(by_employee, paginated),
            load_more_busy: paginated.is_loading,
            errors,
        }
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchOperation;
    use crate::testing::{employee, pages, transaction};

    fn loaded<T>(data: T) -> CacheState<T> {
        CacheState {
            data: Some(data),
            ..Default::default()
        }
    }

    #[test]
    fn test_employee_data_takes_precedence() {
        let by_employee = loaded(vec![transaction(9, "e7")]);
        let paginated = loaded(pages(&[3], "e1").remove(0));

        let visible = visible_transactions(&by_employee, &paginated).unwrap();
        assert_eq!(visible, by_employee.data.unwrap());
    }

    #[test]
    fn test_empty_employee_list_still_takes_precedence() {
        let by_employee = loaded(Vec::new());
        let paginated = loaded(pages(&[3], "e1").remove(0));

        assert_eq!(visible_transactions(&by_employee, &paginated), Some(vec![]));
    }

    #[test]
    fn test_falls_back_to_pages_then_none() {
        let paginated = loaded(pages(&[2], "e1").remove(0));
        let nothing = CacheState::default();

        assert_eq!(visible_transactions(&nothing, &paginated).unwrap().len(), 2);
        assert_eq!(visible_transactions(&nothing, &CacheState::default()), None);
    }

    #[test]
    fn test_load_more_rules() {
        let with_next = loaded(pages(&[2, 2], "e1").remove(0));
        let last = loaded(pages(&[2], "e1").remove(0));
        let none_by_employee = CacheState::default();
        let employee_loaded = loaded(vec![transaction(1, "e2")]);

        assert!(load_more_enabled(&none_by_employee, &with_next));
        assert!(!load_more_enabled(&none_by_employee, &last));
        assert!(!load_more_enabled(&employee_loaded, &with_next));
        assert!(!load_more_enabled(&employee_loaded, &CacheState::default()));
        assert!(!load_more_enabled(&none_by_employee, &CacheState::default()));
    }

    #[test]
    fn test_filter_options() {
        assert!(filter_options(&CacheState::default()).is_empty());

        let options = filter_options(&loaded(vec![employee("e1")]));
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].value, "");
        assert_eq!(options[0].label, "All Employees");
        assert_eq!(options[1].label, "First-e1 Last-e1");
    }

    #[test]
    fn test_snapshot_collects_errors_and_flags() {
        let directory = CacheState {
            data: None,
            is_loading: true,
            error: None,
        };
        let paginated = CacheState {
            data: Some(pages(&[1, 1], "e1").remove(0)),
            is_loading: true,
            error: Some(FetchError::new(FetchOperation::TransactionsPage, "503")),
        };

        let snapshot = ViewSnapshot::derive(&directory, &paginated, &CacheState::default(), true);
        assert!(snapshot.employee_directory_loading);
        assert!(snapshot.all_transactions_loading);
        assert!(snapshot.load_more_enabled);
        assert!(snapshot.load_more_busy);
        assert_eq!(snapshot.errors.len(), 1);
        assert!(snapshot.filter_options.is_empty());
    }
}
