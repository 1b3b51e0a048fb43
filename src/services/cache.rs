//! In-process response cache for read endpoints.
//!
//! Replaces the declarative response caching of the list/get/get-by-UPC
//! operations with an explicit keyed cache the service populates and
//! invalidates by hand. Three independent stores keep unrelated keys from
//! contending on one lock; concurrent misses on the same key may each hit
//! the repository (no single-flight de-duplication).

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::api::{BeerDto, BeerPagedList, BeerStyle, PageRequest};

/// Key for one cached list page: the full filter/page parameter tuple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListCacheKey {
    pub beer_name: Option<String>,
    pub beer_style: Option<BeerStyle>,
    pub page: PageRequest,
}

/// Cache hit/miss and occupancy counters.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub list_entries: usize,
    pub beer_entries: usize,
    pub upc_entries: usize,
}

/// Keyed response cache with per-store locks.
#[derive(Default)]
pub struct ResponseCache {
    lists: RwLock<HashMap<ListCacheKey, BeerPagedList>>,
    beers: RwLock<HashMap<i64, BeerDto>>,
    upcs: RwLock<HashMap<String, BeerDto>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_list(&self, key: &ListCacheKey) -> Option<BeerPagedList> {
        self.count(self.lists.read().get(key).cloned())
    }

    pub fn put_list(&self, key: ListCacheKey, list: BeerPagedList) {
        self.lists.write().insert(key, list);
    }

    pub fn get_beer(&self, beer_id: i64) -> Option<BeerDto> {
        self.count(self.beers.read().get(&beer_id).cloned())
    }

    pub fn put_beer(&self, beer_id: i64, dto: BeerDto) {
        self.beers.write().insert(beer_id, dto);
    }

    pub fn get_upc(&self, upc: &str) -> Option<BeerDto> {
        self.count(self.upcs.read().get(upc).cloned())
    }

    pub fn put_upc(&self, upc: impl Into<String>, dto: BeerDto) {
        self.upcs.write().insert(upc.into(), dto);
    }

    /// Drop the cached entry for one beer id.
    pub fn invalidate_beer(&self, beer_id: i64) {
        self.beers.write().remove(&beer_id);
    }

    /// Drop the cached entry for one UPC.
    pub fn invalidate_upc(&self, upc: &str) {
        self.upcs.write().remove(upc);
    }

    /// Drop every cached list page. Any write to the catalog can change any
    /// page, so list entries are cleared wholesale.
    pub fn clear_lists(&self) {
        self.lists.write().clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            list_entries: self.lists.read().len(),
            beer_entries: self.beers.read().len(),
            upc_entries: self.upcs.read().len(),
        }
    }

    fn count<T>(&self, lookup: Option<T>) -> Option<T> {
        match lookup {
            Some(value) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(value)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }
}
