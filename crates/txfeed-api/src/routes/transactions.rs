//! Transactions API endpoints - JSON API

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use txfeed_core::TransactionSource;
use txfeed_data::TransactionsPage;

use crate::{ApiError, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

/// Get one page of the unfiltered feed; no `page` means the first one
pub async fn api_transactions(
    state: State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<TransactionsPage>, ApiError> {
    let page = state.source.fetch_transactions_page(query.page.as_deref()).await?;
    Ok(Json(page))
}
