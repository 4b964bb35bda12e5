//! Route modules for the API server
//!
//! - employees: employee directory and per-employee transactions
//! - transactions: the paginated feed
//! - settings: effective configuration

pub mod employees;
pub mod settings;
pub mod transactions;
