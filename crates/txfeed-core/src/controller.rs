//! Composes the three caches into the transaction view
//!
//! The controller never touches cache internals. It only calls
//! `fetch_*`/`invalidate_data` and derives read-only state. Every selection
//! change goes through [`ViewController::transition`], which invalidates the
//! competing cache before the new fetch starts.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use txfeed_data::{Employee, Transaction};

use crate::cache::{EmployeeDirectoryCache, EmployeeTransactionCache, Invalidate, PaginatedTransactionCache};
use crate::error::{CoreError, CoreResult, DefaultErrorLogger, ErrorContext, ErrorLogger};
use crate::source::SourceRef;
use crate::view::{self, ViewSnapshot};

/// A filter choice that maps to a fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// The "All Employees" sentinel: paginated feed
    AllEmployees,
    /// One employee's transactions
    Employee(String),
}

impl Selection {
    /// Interpret a value coming from the filter control.
    ///
    /// `None`, and an empty id that is not the sentinel, do not represent a
    /// real choice and yield `None`.
    pub fn from_choice(choice: Option<&Employee>) -> Option<Self> {
        let employee = choice?;
        if !employee.id.is_empty() {
            Some(Selection::Employee(employee.id.clone()))
        } else if employee.is_all_employees() {
            Some(Selection::AllEmployees)
        } else {
            None
        }
    }
}

/// Keeps the "all transactions" counter raised while alive
struct AllTransactionsBusy<'a>(&'a watch::Sender<usize>);

impl<'a> AllTransactionsBusy<'a> {
    fn enter(counter: &'a watch::Sender<usize>) -> Self {
        counter.send_modify(|n| *n += 1);
        Self(counter)
    }
}

impl Drop for AllTransactionsBusy<'_> {
    fn drop(&mut self) {
        self.0.send_modify(|n| *n = n.saturating_sub(1));
    }
}

/// The cache a transition clears before fetching into the other one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stale {
    Paginated,
    ByEmployee,
}

pub struct ViewController {
    directory: EmployeeDirectoryCache,
    paginated: PaginatedTransactionCache,
    by_employee: EmployeeTransactionCache,
    startup_pending: AtomicBool,
    /// Epoch and target of the most recently started transition
    latest: Mutex<(u64, Stale)>,
    /// `load_all_transactions` calls in flight, directory and page phases alike
    all_loading: watch::Sender<usize>,
    logger: Arc<dyn ErrorLogger>,
}

impl ViewController {
    pub fn new(
        directory: EmployeeDirectoryCache,
        paginated: PaginatedTransactionCache,
        by_employee: EmployeeTransactionCache,
    ) -> Self {
        Self {
            directory,
            paginated,
            by_employee,
            startup_pending: AtomicBool::new(false),
            latest: Mutex::new((0, Stale::ByEmployee)),
            all_loading: watch::channel(0).0,
            logger: Arc::new(DefaultErrorLogger),
        }
    }

    /// Controller with three fresh caches over one source
    pub fn with_source(source: SourceRef) -> Self {
        Self::new(
            EmployeeDirectoryCache::new(source.clone()),
            PaginatedTransactionCache::new(source.clone()),
            EmployeeTransactionCache::new(source),
        )
    }

    pub fn with_logger(mut self, logger: Arc<dyn ErrorLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn directory(&self) -> &EmployeeDirectoryCache {
        &self.directory
    }

    pub fn paginated(&self) -> &PaginatedTransactionCache {
        &self.paginated
    }

    pub fn by_employee(&self) -> &EmployeeTransactionCache {
        &self.by_employee
    }

    // ==================== Derived State ====================

    pub fn visible_transactions(&self) -> Option<Vec<Transaction>> {
        view::visible_transactions(&self.by_employee.state(), &self.paginated.state())
    }

    pub fn employee_directory_loading(&self) -> bool {
        self.directory.state().is_loading
    }

    /// Whether a "show all transactions" load is running, from the start of
    /// its directory fetch to the end of its page fetch
    pub fn all_transactions_loading(&self) -> bool {
        *self.all_loading.borrow() > 0
    }

    /// Notified whenever [`all_transactions_loading`](Self::all_transactions_loading) may have changed
    pub fn subscribe_all_transactions_loading(&self) -> watch::Receiver<usize> {
        self.all_loading.subscribe()
    }

    pub fn load_more_enabled(&self) -> bool {
        view::load_more_enabled(&self.by_employee.state(), &self.paginated.state())
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot::derive(
            &self.directory.state(),
            &self.paginated.state(),
            &self.by_employee.state(),
            self.all_transactions_loading(),
        )
    }

    // ==================== Operations ====================

    fn cache(&self, stale: Stale) -> &dyn Invalidate {
        match stale {
            Stale::Paginated => &self.paginated,
            Stale::ByEmployee => &self.by_employee,
        }
    }

    /// Invalidate `stale`, then run `fetch`.
    ///
    /// `fetch` is lazy, so nothing it does can start before the
    /// invalidation has been published. If another transition started while
    /// this one was in flight, its invalidation is applied again once this
    /// one settles so the newest selection is the only one left with data.
    async fn transition<F>(&self, stale: Stale, fetch: F) -> CoreResult<()>
    where
        F: Future<Output = CoreResult<()>>,
    {
        let epoch = {
            let mut latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
            *latest = (latest.0 + 1, stale);
            latest.0
        };
        self.cache(stale).invalidate_data();

        let result = fetch.await;

        let (current, newest) = *self.latest.lock().unwrap_or_else(PoisonError::into_inner);
        if current != epoch {
            log::debug!(target: "txfeed::controller", "transition {} superseded by {}", epoch, current);
            self.cache(newest).invalidate_data();
        }
        result
    }

    /// Show the paginated feed: drop employee data, refresh the directory,
    /// then load one more page.
    ///
    /// The directory is awaited before the page so "directory ready" is
    /// observable first. A directory failure does not stop the page fetch;
    /// the first failure is returned once both settle.
    pub async fn load_all_transactions(&self) -> CoreResult<()> {
        let _busy = AllTransactionsBusy::enter(&self.all_loading);
        let result = self
            .transition(Stale::ByEmployee, async {
                let directory = self.directory.fetch_all().await;
                let page = self.paginated.fetch_all().await;
                directory.and(page)
            })
            .await;

        self.report(result, ErrorContext::new("load_all_transactions"))
    }

    /// Show one employee: drop the paginated feed, then fetch their list
    pub async fn load_transactions_for_employee(&self, employee_id: &str) -> CoreResult<()> {
        let context = ErrorContext::new("load_transactions_for_employee")
            .with_data("employee_id", serde_json::json!(employee_id));

        if employee_id.is_empty() {
            let error = CoreError::InvalidSelection {
                reason: "employee id must not be empty".to_string(),
            };
            return self.report(Err(error), context);
        }

        let result = self
            .transition(Stale::Paginated, self.by_employee.fetch_by_id(employee_id))
            .await;

        self.report(result, context)
    }

    pub async fn select(&self, selection: Selection) -> CoreResult<()> {
        match selection {
            Selection::AllEmployees => self.load_all_transactions().await,
            Selection::Employee(id) => self.load_transactions_for_employee(&id).await,
        }
    }

    /// Dispatch a change of the employee filter.
    ///
    /// Values that are not a real choice are ignored.
    pub async fn on_selection_changed(&self, choice: Option<&Employee>) -> CoreResult<()> {
        match Selection::from_choice(choice) {
            Some(selection) => self.select(selection).await,
            None => {
                self.logger.log_debug(
                    "ignoring selection change without a usable value",
                    &ErrorContext::new("on_selection_changed"),
                );
                Ok(())
            }
        }
    }

    /// Startup rule: with no directory and nothing loading, load the feed.
    ///
    /// Returns whether a load was triggered. Evaluating again while that
    /// load runs, or after the directory arrived, does nothing. After a
    /// failed load the directory is still empty, so the next evaluation
    /// tries again.
    pub async fn evaluate_startup(&self) -> CoreResult<bool> {
        if !self.directory.state().is_idle_empty() {
            return Ok(false);
        }
        if self.startup_pending.swap(true, Ordering::SeqCst) {
            return Ok(false);
        }

        log::info!(target: "txfeed::controller", "no employee directory yet, loading transactions");
        let result = self.load_all_transactions().await;
        self.startup_pending.store(false, Ordering::SeqCst);
        result.map(|_| true)
    }

    /// Load one more page when the control is enabled and not busy.
    ///
    /// Returns whether a load was started.
    pub async fn load_more(&self) -> CoreResult<bool> {
        if !self.load_more_enabled() || self.paginated.state().is_loading {
            log::debug!(target: "txfeed::controller", "load more is not available");
            return Ok(false);
        }
        self.load_all_transactions().await.map(|_| true)
    }

    fn report(&self, result: CoreResult<()>, context: ErrorContext) -> CoreResult<()> {
        if let Err(ref error) = result {
            self.logger.log_error(error, &context);
        }
        result
    }
}

// ==================== Tests ====================
