use std::sync::Arc;

use txfeed_data::Transaction;

use super::{CacheCell, CacheSubscription, Invalidate};
use crate::error::{CoreError, CoreResult, FetchError, FetchOperation};
use crate::source::SourceRef;
use crate::state::CacheState;

/// Caches the transactions of the currently selected employee
#[derive(Clone)]
pub struct EmployeeTransactionCache {
    cell: Arc<CacheCell<Vec<Transaction>>>,
    source: SourceRef,
}

impl EmployeeTransactionCache {
    pub fn new(source: SourceRef) -> Self {
        Self {
            cell: Arc::new(CacheCell::new()),
            source,
        }
    }

    pub fn state(&self) -> CacheState<Vec<Transaction>> {
        self.cell.state()
    }

    pub fn subscribe(&self) -> CacheSubscription<Vec<Transaction>> {
        self.cell.subscribe()
    }

    /// Replace the cached list with `employee_id`'s transactions.
    ///
    /// An empty id (the "All Employees" sentinel) is rejected before any
    /// request is made.
    pub async fn fetch_by_id(&self, employee_id: &str) -> CoreResult<()> {
        if employee_id.is_empty() {
            return Err(CoreError::InvalidSelection {
                reason: "employee id must not be empty".to_string(),
            });
        }

        let request = self.cell.begin();
        log::debug!(target: "txfeed::cache", "fetching transactions for employee {}", employee_id);

        match self.source.fetch_transactions_for_employee(employee_id).await {
            Ok(transactions) => {
                let count = transactions.len();
                if self.cell.succeed(request, move |_| transactions) {
                    log::debug!(target: "txfeed::cache", "loaded {} transactions for {}", count, employee_id);
                } else {
                    log::debug!(target: "txfeed::cache", "discarded stale transactions for {}", employee_id);
                }
                Ok(())
            }
            Err(e) => {
                let error = FetchError::new(FetchOperation::EmployeeTransactions, e.to_string());
                self.cell.fail(request, error.clone());
                Err(error.into())
            }
        }
    }
}

impl Invalidate for EmployeeTransactionCache {
    fn invalidate_data(&self) {
        log::debug!(target: "txfeed::cache", "invalidating employee transactions");
        self.cell.invalidate();
    }
}
