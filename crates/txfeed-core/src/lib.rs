//! Cache coordination and derived view state for the transaction feed
//!
//! Three caches hold server data: the employee directory, the paginated
//! feed and the transactions of one selected employee. [`ViewController`]
//! keeps the two transaction caches mutually exclusive and derives what the
//! presentation layer shows from them.

pub mod cache;
pub mod controller;
pub mod error;
pub mod source;
pub mod state;
pub mod view;

#[cfg(test)]
mod testing;

pub use cache::{
    CacheSubscription, EmployeeDirectoryCache, EmployeeTransactionCache, Invalidate, PaginatedTransactionCache,
};
pub use controller::{Selection, ViewController};
pub use error::{
    CoreError, CoreResult, DefaultErrorLogger, ErrorContext, ErrorDetails, ErrorLogger, FetchError, FetchOperation,
};
pub use source::{DatasetSource, SourceError, SourceRef, SourceResult, TransactionSource};
pub use state::CacheState;
pub use view::{FilterOption, ViewSnapshot};

pub use txfeed_data::{Employee, Transaction, TransactionsPage};
