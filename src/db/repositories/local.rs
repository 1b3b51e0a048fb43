//! In-memory repository implementation.
//!
//! Keeps the whole catalog in a locked map. Used as the unit-test double and
//! as the default backend for local development, where losing data on
//! restart is acceptable.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::db::models::{Beer, BeerFilter, BeerId, PageRequest};
use crate::db::repository::{BeerRepository, RepositoryResult};

/// In-memory beer repository.
pub struct LocalRepository {
    beers: RwLock<HashMap<i64, Beer>>,
    next_id: AtomicI64,
}

impl LocalRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self {
            beers: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Number of stored beers.
    pub fn len(&self) -> usize {
        self.beers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.beers.read().is_empty()
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BeerRepository for LocalRepository {
    async fn find_by_id(&self, beer_id: BeerId) -> RepositoryResult<Option<Beer>> {
        Ok(self.beers.read().get(&beer_id.value()).cloned())
    }

    async fn find_by_upc(&self, upc: &str) -> RepositoryResult<Option<Beer>> {
        let beers = self.beers.read();
        // Lowest id wins, mirroring the ordered lookup of the SQL backend.
        let mut matches: Vec<&Beer> = beers.values().filter(|b| b.upc == upc).collect();
        matches.sort_by_key(|b| b.id.map(|id| id.value()));
        Ok(matches.first().map(|b| (*b).clone()))
    }

    async fn find_all(
        &self,
        filter: &BeerFilter,
        page: PageRequest,
    ) -> RepositoryResult<Vec<Beer>> {
        let beers = self.beers.read();
        let mut rows: Vec<Beer> = beers.values().filter(|b| filter.matches(b)).cloned().collect();
        rows.sort_by_key(|b| b.id.map(|id| id.value()));

        let offset = page.offset().max(0) as usize;
        let limit = page.limit().max(0) as usize;
        Ok(rows.into_iter().skip(offset).take(limit).collect())
    }

    async fn save(&self, mut beer: Beer) -> RepositoryResult<Beer> {
        let now = Utc::now();
        match beer.id {
            None => {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst);
                beer.id = Some(BeerId::new(id));
                beer.created_date = Some(now);
                beer.last_modified_date = Some(now);
                beer.version = Some(0);
                self.beers.write().insert(id, beer.clone());
                Ok(beer)
            }
            Some(id) => {
                let mut beers = self.beers.write();
                if let Some(existing) = beers.get(&id.value()) {
                    beer.created_date = existing.created_date;
                    beer.version = Some(existing.version.unwrap_or(0) + 1);
                }
                beer.last_modified_date = Some(now);
                beers.insert(id.value(), beer.clone());
                Ok(beer)
            }
        }
    }

    async fn delete_by_id(&self, beer_id: BeerId) -> RepositoryResult<()> {
        // Absent id is a silent no-op.
        self.beers.write().remove(&beer_id.value());
        Ok(())
    }

    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(true)
    }
}
