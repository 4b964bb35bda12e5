//! The three fetch caches and the bookkeeping they share
//!
//! Each cache publishes its [`CacheState`] through a `tokio::sync::watch`
//! channel. Every fetch is tagged with a request token; a response is only
//! written if its token is still the latest one issued and no invalidation
//! happened since it was issued. Everything else is discarded, so a slow
//! response for an abandoned selection cannot overwrite newer data.

mod by_employee;
mod employees;
mod paginated;

pub use by_employee::EmployeeTransactionCache;
pub use employees::EmployeeDirectoryCache;
pub use paginated::PaginatedTransactionCache;

use tokio::sync::watch;

use crate::error::{CoreError, CoreResult, FetchError};
use crate::state::CacheState;

/// Caches whose data can be cleared by the controller
pub trait Invalidate {
    /// Reset `data` to `None` and abandon every in-flight fetch
    fn invalidate_data(&self);
}

#[derive(Debug)]
struct Tracked<T> {
    state: CacheState<T>,
    /// Latest token handed out
    issued: u64,
    /// Tokens at or below this value were abandoned by an invalidation
    floor: u64,
    /// Fetches in flight that have not been abandoned
    active: usize,
}

impl<T> Default for Tracked<T> {
    fn default() -> Self {
        Self {
            state: CacheState::default(),
            issued: 0,
            floor: 0,
            active: 0,
        }
    }
}

impl<T> Tracked<T> {
    fn begin(&mut self) -> RequestToken {
        self.issued += 1;
        self.active += 1;
        self.state.is_loading = true;
        RequestToken(self.issued)
    }
}

/// Identifies one issued fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RequestToken(u64);

pub(crate) enum Begin {
    Started(RequestToken),
    /// Another fetch is already in flight
    Joined,
}

/// Receiver side of a cache, for re-rendering on change
pub struct CacheSubscription<T> {
    rx: watch::Receiver<Tracked<T>>,
}

impl<T: Clone> CacheSubscription<T> {
    /// Wait until the cache publishes a new state
    pub async fn changed(&mut self) -> CoreResult<()> {
        self.rx.changed().await.map_err(|_| closed())
    }

    /// Current state, marking it as seen
    pub fn current(&mut self) -> CacheState<T> {
        self.rx.borrow_and_update().state.clone()
    }

    /// Whether a state was published since the last [`current`](Self::current)
    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }
}

fn closed() -> CoreError {
    CoreError::Internal {
        message: "cache state channel closed".to_string(),
    }
}

pub(crate) struct CacheCell<T> {
    tx: watch::Sender<Tracked<T>>,
}

impl<T: Clone> CacheCell<T> {
    pub(crate) fn new() -> Self {
        let (tx, _) = watch::channel(Tracked::default());
        Self { tx }
    }

    pub(crate) fn state(&self) -> CacheState<T> {
        self.tx.borrow().state.clone()
    }

    pub(crate) fn subscribe(&self) -> CacheSubscription<T> {
        CacheSubscription {
            rx: self.tx.subscribe(),
        }
    }

    /// Issue a new fetch and raise the loading flag
    pub(crate) fn begin(&self) -> RequestToken {
        let mut token = RequestToken(0);
        self.tx.send_modify(|t| token = t.begin());
        token
    }

    /// Issue a new fetch unless one is already in flight
    pub(crate) fn begin_or_join(&self) -> Begin {
        let mut begin = Begin::Joined;
        self.tx.send_if_modified(|t| {
            if t.active > 0 {
                return false;
            }
            begin = Begin::Started(t.begin());
            true
        });
        begin
    }

    /// Wait until no fetch is in flight and return the settled state
    pub(crate) async fn settled(&self) -> CoreResult<CacheState<T>> {
        let mut rx = self.tx.subscribe();
        let tracked = rx.wait_for(|t| t.active == 0).await.map_err(|_| closed())?;
        Ok(tracked.state.clone())
    }

    /// Record a successful response for `token`.
    ///
    /// `merge` receives the current data and returns the new data. Returns
    /// `false` when the response was stale and discarded.
    pub(crate) fn succeed<F>(&self, token: RequestToken, merge: F) -> bool
    where
        F: FnOnce(Option<T>) -> T,
    {
        self.settle(token, |state| {
            let previous = state.data.take();
            state.data = Some(merge(previous));
            state.error = None;
        })
    }

    /// Record a failed response for `token`, keeping the current data
    pub(crate) fn fail(&self, token: RequestToken, error: FetchError) -> bool {
        self.settle(token, |state| state.error = Some(error))
    }

    fn settle<F>(&self, token: RequestToken, apply: F) -> bool
    where
        F: FnOnce(&mut CacheState<T>),
    {
        let mut applied = false;
        self.tx.send_modify(|t| {
            let abandoned = token.0 <= t.floor;
            if !abandoned {
                t.active = t.active.saturating_sub(1);
            }

            if !abandoned && token.0 == t.issued {
                apply(&mut t.state);
                applied = true;
            }

            t.state.is_loading = t.active > 0;
        });
        applied
    }

    pub(crate) fn invalidate(&self) {
        self.tx.send_modify(|t| {
            t.floor = t.issued;
            t.active = 0;
            t.state = CacheState::default();
        });
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchOperation;

    fn replace(value: u32) -> impl FnOnce(Option<u32>) -> u32 {
        move |_| value
    }

    #[test]
    fn test_begin_and_complete() {
        let cell = CacheCell::<u32>::new();
        let token = cell.begin();
        assert!(cell.state().is_loading);

        assert!(cell.succeed(token, replace(7)));
        let state = cell.state();
        assert_eq!(state.data, Some(7));
        assert!(!state.is_loading);
    }

    #[test]
    fn test_older_response_is_discarded() {
        let cell = CacheCell::<u32>::new();
        let first = cell.begin();
        let second = cell.begin();

        assert!(cell.succeed(second, replace(2)));
        assert!(cell.state().is_loading);
        assert!(!cell.succeed(first, replace(1)));

        let state = cell.state();
        assert_eq!(state.data, Some(2));
        assert!(!state.is_loading);
    }

    #[test]
    fn test_invalidation_abandons_in_flight_fetch() {
        let cell = CacheCell::<u32>::new();
        let token = cell.begin();
        cell.invalidate();
        assert_eq!(cell.state(), CacheState::default());

        assert!(!cell.succeed(token, replace(9)));
        assert_eq!(cell.state(), CacheState::default());
    }

    #[test]
    fn test_failure_keeps_data() {
        let cell = CacheCell::<u32>::new();
        let token = cell.begin();
        cell.succeed(token, replace(3));

        let token = cell.begin();
        assert!(cell.fail(token, FetchError::new(FetchOperation::Employees, "boom")));

        let state = cell.state();
        assert_eq!(state.data, Some(3));
        assert!(!state.is_loading);
        assert_eq!(state.error.unwrap().message, "boom");
    }

    #[test]
    fn test_begin_or_join() {
        let cell = CacheCell::<u32>::new();
        assert!(matches!(cell.begin_or_join(), Begin::Started(_)));
        assert!(matches!(cell.begin_or_join(), Begin::Joined));
    }

    #[tokio::test]
    async fn test_subscription_sees_changes() {
        let cell = CacheCell::<u32>::new();
        let mut sub = cell.subscribe();
        assert_eq!(sub.current().data, None);

        let token = cell.begin();
        sub.changed().await.unwrap();
        assert!(sub.current().is_loading);

        cell.succeed(token, replace(5));
        sub.changed().await.unwrap();
        assert_eq!(sub.current().data, Some(5));
    }
}
