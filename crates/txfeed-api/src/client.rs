//! `TransactionSource` over the JSON API

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use txfeed_config::ClientConfig;
use txfeed_core::{SourceError, SourceResult, TransactionSource};
use txfeed_data::{Employee, Transaction, TransactionsPage};

use crate::error::ErrorBody;

/// Fetches from a running `txfeed serve`
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    base_url: Url,
}

impl HttpSource {
    pub fn new(base_url: &str, timeout: Duration) -> SourceResult<Self> {
        let base_url = Url::parse(base_url).map_err(|e| SourceError::Transport {
            message: format!("invalid base URL {}: {}", base_url, e),
        })?;
        let client = Client::builder().timeout(timeout).build().map_err(transport)?;

        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &ClientConfig) -> SourceResult<Self> {
        Self::new(&config.base_url, Duration::from_secs(config.request_timeout_secs))
    }

    fn endpoint(&self, segments: &[&str]) -> SourceResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SourceError::Transport {
                message: format!("{} cannot be used as a base URL", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, query: &[(&str, &str)]) -> SourceResult<T> {
        log::debug!(target: "txfeed::client", "GET {}", url);
        let response = self.client.get(url).query(query).send().await.map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ErrorBody>().await {
                Ok(body) => body.message,
                Err(_) => status.canonical_reason().unwrap_or("request failed").to_string(),
            };
            return Err(SourceError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response.json::<T>().await.map_err(transport)
    }
}

fn transport(error: reqwest::Error) -> SourceError {
    SourceError::Transport {
        message: error.to_string(),
    }
}

#[async_trait]
impl TransactionSource for HttpSource {
    async fn fetch_employees(&self) -> SourceResult<Vec<Employee>> {
        let url = self.endpoint(&["api", "employees"])?;
        self.get_json(url, &[]).await
    }

    async fn fetch_transactions_page(&self, page: Option<&str>) -> SourceResult<TransactionsPage> {
        let url = self.endpoint(&["api", "transactions"])?;
        match page {
            Some(token) => self.get_json(url, &[("page", token)]).await,
            None => self.get_json(url, &[]).await,
        }
    }

    async fn fetch_transactions_for_employee(&self, employee_id: &str) -> SourceResult<Vec<Transaction>> {
        let url = self.endpoint(&["api", "employees", employee_id, "transactions"])?;
        self.get_json(url, &[]).await
    }
}
