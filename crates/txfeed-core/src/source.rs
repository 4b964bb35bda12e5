//! Transport seam between the caches and wherever the data lives

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use txfeed_data::{DataError, Dataset, Employee, Transaction, TransactionsPage};

/// Errors a [`TransactionSource`] can return
#[derive(Error, Debug)]
pub enum SourceError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Server responded {status}: {message}")]
    Status { status: u16, message: String },
}

pub type SourceResult<T> = Result<T, SourceError>;

/// Source reference type
pub type SourceRef = Arc<dyn TransactionSource>;

/// The three requests the caches issue
#[async_trait]
pub trait TransactionSource: Send + Sync {
    /// Full employee directory, in server order
    async fn fetch_employees(&self) -> SourceResult<Vec<Employee>>;

    /// One page of the unfiltered feed; `None` requests the first page
    async fn fetch_transactions_page(&self, page: Option<&str>) -> SourceResult<TransactionsPage>;

    /// Every transaction of one employee
    async fn fetch_transactions_for_employee(&self, employee_id: &str) -> SourceResult<Vec<Transaction>>;
}

/// Serves a local [`Dataset`], optionally delaying every response
#[derive(Debug, Clone)]
pub struct DatasetSource {
    dataset: Arc<Dataset>,
    latency: Duration,
}

impl DatasetSource {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self {
            dataset,
            latency: Duration::ZERO,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    async fn delay(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl TransactionSource for DatasetSource {
    async fn fetch_employees(&self) -> SourceResult<Vec<Employee>> {
        self.delay().await;
        Ok(self.dataset.employees().to_vec())
    }

    async fn fetch_transactions_page(&self, page: Option<&str>) -> SourceResult<TransactionsPage> {
        self.delay().await;
        Ok(self.dataset.page(page)?)
    }

    async fn fetch_transactions_for_employee(&self, employee_id: &str) -> SourceResult<Vec<Transaction>> {
        self.delay().await;
        Ok(self.dataset.transactions_for_employee(employee_id)?)
    }
}
