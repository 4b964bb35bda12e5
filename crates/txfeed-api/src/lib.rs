//! JSON API server and HTTP transport for the transaction feed
//!
//! Routes are organized into modules:
//! - routes::employees: employee directory, per-employee transactions
//! - routes::transactions: paginated feed
//! - routes::settings: effective configuration
//!
//! [`HttpSource`] is the client side of the same API.

pub mod client;
pub mod error;
pub mod routes;

use axum::{routing::get, Router};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use txfeed_config::Config;
use txfeed_core::DatasetSource;
use txfeed_data::Dataset;

pub use client::HttpSource;
pub use error::{ApiError, ErrorBody};

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<DatasetSource>,
    pub config: Arc<Config>,
    /// Page size of the dataset being served
    pub page_size: usize,
}

impl AppState {
    pub fn new(dataset: Dataset, config: Config) -> Self {
        let latency = Duration::from_millis(config.data.simulated_latency_ms);
        let page_size = dataset.page_size();
        Self {
            source: Arc::new(DatasetSource::new(Arc::new(dataset)).with_latency(latency)),
            config: Arc::new(config),
            page_size,
        }
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::employees::{api_employee_transactions, api_employees};
    use routes::settings::api_settings;
    use routes::transactions::api_transactions;

    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/employees", get(api_employees))
        .route("/api/employees/:id/transactions", get(api_employee_transactions))
        .route("/api/transactions", get(api_transactions))
        .route("/api/settings", get(api_settings))
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Serve the dataset until Ctrl-C
pub async fn start_server(config: Config, dataset: Dataset) -> std::io::Result<()> {
    let addr = config.bind_addr();
    let employees = dataset.employees().len();
    let transactions = dataset.transaction_count();
    let router = create_router(AppState::new(dataset, config));

    let listener = TcpListener::bind(&addr).await?;
    log::info!("Starting txfeed server on http://{}", addr);
    log::info!("Serving {} employees and {} transactions", employees, transactions);
    log::info!("Available routes:");
    log::info!("  - /api/employees");
    log::info!("  - /api/employees/:id/transactions");
    log::info!("  - /api/transactions?page=<token>");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    log::info!("Server stopped gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;
    use txfeed_data::{Employee, Transaction, TransactionsPage};

    async fn get(uri: &str) -> (StatusCode, Vec<u8>) {
        let response = create_router(tests_support::state())
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get("/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"OK");
    }

    #[tokio::test]
    async fn test_employees_in_dataset_order() {
        let (status, body) = get("/api/employees").await;
        assert_eq!(status, StatusCode::OK);
        let employees: Vec<Employee> = serde_json::from_slice(&body).unwrap();
        let ids: Vec<_> = employees.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["e1", "e2"]);
    }

    #[tokio::test]
    async fn test_transactions_pages_use_camel_case_wire_form() {
        let (status, body) = get("/api/transactions").await;
        assert_eq!(status, StatusCode::OK);
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["nextPage"], "1");
        assert_eq!(value["data"][0]["employee"]["firstName"], "Ada");

        let (_, body) = get("/api/transactions?page=1").await;
        let page: TransactionsPage = serde_json::from_slice(&body).unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.next_page, None);
    }

    #[tokio::test]
    async fn test_unknown_page_is_not_found() {
        let (status, body) = get("/api/transactions?page=7").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let error: ErrorBody = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.code, "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_employee_transactions() {
        let (status, body) = get("/api/employees/e1/transactions").await;
        assert_eq!(status, StatusCode::OK);
        let transactions: Vec<Transaction> = serde_json::from_slice(&body).unwrap();
        let ids: Vec<_> = transactions.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t0", "t2"]);
    }

    #[tokio::test]
    async fn test_employee_errors() {
        let (status, _) = get("/api/employees/ghost/transactions").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = get("/api/employees/%20/transactions").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let error: ErrorBody = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.message, "Bad request: employee id must not be empty");
    }

    #[tokio::test]
    async fn test_settings_expose_page_size() {
        let (status, body) = get("/api/settings").await;
        assert_eq!(status, StatusCode::OK);
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        // the served dataset pages by 2 while the default config says 5
        assert_eq!(value["pagination"]["page_size"], 2);
    }
}
