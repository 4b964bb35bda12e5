//! Observable state of a single cache

use serde::Serialize;

use crate::error::FetchError;

/// `data` and loading flag of one cache.
///
/// `data == None` means "never fetched or invalidated"; a fetched but
/// empty result is `Some` of an empty collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheState<T> {
    pub data: Option<T>,
    pub is_loading: bool,
    /// Most recent failure, cleared by the next successful fetch or by invalidation
    pub error: Option<FetchError>,
}

impl<T> Default for CacheState<T> {
    fn default() -> Self {
        Self {
            data: None,
            is_loading: false,
            error: None,
        }
    }
}

impl<T> CacheState<T> {
    /// Nothing fetched and nothing in flight
    pub fn is_idle_empty(&self) -> bool {
        self.data.is_none() && !self.is_loading
    }
}
