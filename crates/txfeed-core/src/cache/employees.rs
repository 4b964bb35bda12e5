use std::sync::Arc;

use txfeed_data::Employee;

use super::{Begin, CacheCell, CacheSubscription};
use crate::error::{CoreResult, FetchError, FetchOperation};
use crate::source::SourceRef;
use crate::state::CacheState;

/// Caches the employee directory that populates the filter control.
///
/// Calling [`fetch_all`](Self::fetch_all) while a directory fetch is in
/// flight does not issue a second request; the caller waits for the
/// in-flight one and gets its outcome.
#[derive(Clone)]
pub struct EmployeeDirectoryCache {
    cell: Arc<CacheCell<Vec<Employee>>>,
    source: SourceRef,
}

impl EmployeeDirectoryCache {
    pub fn new(source: SourceRef) -> Self {
        Self {
            cell: Arc::new(CacheCell::new()),
            source,
        }
    }

    pub fn state(&self) -> CacheState<Vec<Employee>> {
        self.cell.state()
    }

    pub fn subscribe(&self) -> CacheSubscription<Vec<Employee>> {
        self.cell.subscribe()
    }

    /// Fetch the full directory in server order
    pub async fn fetch_all(&self) -> CoreResult<()> {
        let token = match self.cell.begin_or_join() {
            Begin::Started(token) => token,
            Begin::Joined => {
                log::debug!(target: "txfeed::cache", "employee directory fetch already in flight, joining");
                let settled = self.cell.settled().await?;
                return match settled.error {
                    Some(error) => Err(error.into()),
                    None => Ok(()),
                };
            }
        };

        log::debug!(target: "txfeed::cache", "fetching employee directory");
        match self.source.fetch_employees().await {
            Ok(employees) => {
                log::debug!(target: "txfeed::cache", "employee directory loaded: {} entries", employees.len());
                self.cell.succeed(token, move |_| employees);
                Ok(())
            }
            Err(e) => {
                let error = FetchError::new(FetchOperation::Employees, e.to_string());
                self.cell.fail(token, error.clone());
                Err(error.into())
            }
        }
    }
}
