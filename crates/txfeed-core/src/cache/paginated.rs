use std::sync::Arc;

use txfeed_data::TransactionsPage;

use super::{CacheCell, CacheSubscription, Invalidate};
use crate::error::{CoreResult, FetchError, FetchOperation};
use crate::source::SourceRef;
use crate::state::CacheState;

/// Caches the unfiltered feed, accumulating pages.
///
/// The cached [`TransactionsPage`] holds every transaction loaded so far
/// and the `next_page` token returned by the most recent page fetch.
#[derive(Clone)]
pub struct PaginatedTransactionCache {
    cell: Arc<CacheCell<TransactionsPage>>,
    source: SourceRef,
}

impl PaginatedTransactionCache {
    pub fn new(source: SourceRef) -> Self {
        Self {
            cell: Arc::new(CacheCell::new()),
            source,
        }
    }

    pub fn state(&self) -> CacheState<TransactionsPage> {
        self.cell.state()
    }

    pub fn subscribe(&self) -> CacheSubscription<TransactionsPage> {
        self.cell.subscribe()
    }

    /// Fetch the page after the ones already cached and append it.
    ///
    /// With no cached data this fetches the first page. Once the last page
    /// has been loaded this returns immediately without touching state.
    pub async fn fetch_all(&self) -> CoreResult<()> {
        let token = match self.cell.state().data {
            None => None,
            Some(TransactionsPage { next_page: Some(next), .. }) => Some(next),
            Some(TransactionsPage { next_page: None, .. }) => {
                log::debug!(target: "txfeed::cache", "no further transaction pages");
                return Ok(());
            }
        };

        let request = self.cell.begin();
        log::debug!(target: "txfeed::cache", "fetching transactions page {:?}", token);

        match self.source.fetch_transactions_page(token.as_deref()).await {
            Ok(page) => {
                let count = page.data.len();
                let applied = self.cell.succeed(request, move |previous| append(previous, page));
                if applied {
                    log::debug!(target: "txfeed::cache", "appended {} transactions", count);
                } else {
                    log::debug!(target: "txfeed::cache", "discarded stale transactions page {:?}", token);
                }
                Ok(())
            }
            Err(e) => {
                let error = FetchError::new(FetchOperation::TransactionsPage, e.to_string());
                self.cell.fail(request, error.clone());
                Err(error.into())
            }
        }
    }
}

impl Invalidate for PaginatedTransactionCache {
    fn invalidate_data(&self) {
        log::debug!(target: "txfeed::cache", "invalidating paginated transactions");
        self.cell.invalidate();
    }
}

fn append(previous: Option<TransactionsPage>, page: TransactionsPage) -> TransactionsPage {
    match previous {
        Some(mut accumulated) => {
            accumulated.data.extend(page.data);
            accumulated.next_page = page.next_page;
            accumulated
        }
        None => page,
    }
}
