//! Beer catalog service.
//!
//! Orchestrates repository calls for the CRUD operations, applies the
//! list filter semantics, and owns the response cache. All "not found"
//! outcomes are expressed as `None`; the HTTP layer decides which of those
//! become a 404.

use std::sync::Arc;
use tracing::debug;

use crate::api::{Beer, BeerDto, BeerFilter, BeerId, BeerPagedList, BeerStyle, PageRequest};
use crate::db::repository::{BeerRepository, RepositoryResult};
use crate::services::cache::{CacheStats, ListCacheKey, ResponseCache};
use crate::services::mapper;

/// Catalog service over a [`BeerRepository`].
pub struct BeerService {
    repository: Arc<dyn BeerRepository>,
    cache: ResponseCache,
}

impl BeerService {
    pub fn new(repository: Arc<dyn BeerRepository>) -> Self {
        Self {
            repository,
            cache: ResponseCache::new(),
        }
    }

    /// List one page of beers.
    ///
    /// The name and style filters are conjunctive: rows must match both when
    /// both are given, either one alone otherwise. Rows are mapped without
    /// inventory; `show_inventory_on_hand` only disables caching, mirroring
    /// the caching condition of the read-by-id path.
    ///
    /// `total_elements` of the returned page is the page's own row count,
    /// not a catalog-wide total.
    pub async fn list_beers(
        &self,
        beer_name: Option<String>,
        beer_style: Option<BeerStyle>,
        page: PageRequest,
        show_inventory_on_hand: bool,
    ) -> RepositoryResult<BeerPagedList> {
        let key = ListCacheKey {
            beer_name: beer_name.clone(),
            beer_style,
            page,
        };

        if !show_inventory_on_hand {
            if let Some(cached) = self.cache.get_list(&key) {
                debug!(?key, "beer list cache hit");
                return Ok(cached);
            }
        }

        let filter = BeerFilter {
            beer_name,
            beer_style,
        };
        let beers = self.repository.find_all(&filter, page).await?;
        let content: Vec<BeerDto> = beers.iter().map(mapper::beer_to_dto).collect();
        let list = BeerPagedList::of(content, page);

        if !show_inventory_on_hand {
            self.cache.put_list(key, list.clone());
        }

        Ok(list)
    }

    /// Fetch a beer by id, `None` when absent.
    ///
    /// The inventory-aware mapper is selected on request; only
    /// inventory-less responses are cached.
    pub async fn get_by_id(
        &self,
        beer_id: BeerId,
        show_inventory_on_hand: bool,
    ) -> RepositoryResult<Option<BeerDto>> {
        if !show_inventory_on_hand {
            if let Some(cached) = self.cache.get_beer(beer_id.value()) {
                debug!(%beer_id, "beer cache hit");
                return Ok(Some(cached));
            }
        }

        let beer = self.repository.find_by_id(beer_id).await?;
        Ok(beer.map(|beer| {
            if show_inventory_on_hand {
                mapper::beer_to_dto_with_inventory(&beer)
            } else {
                let dto = mapper::beer_to_dto(&beer);
                self.cache.put_beer(beer_id.value(), dto.clone());
                dto
            }
        }))
    }

    /// Fetch a beer by UPC, `None` when absent. Hits are always cached.
    pub async fn get_by_upc(&self, upc: &str) -> RepositoryResult<Option<BeerDto>> {
        if let Some(cached) = self.cache.get_upc(upc) {
            debug!(upc, "beer upc cache hit");
            return Ok(Some(cached));
        }

        let beer = self.repository.find_by_upc(upc).await?;
        Ok(beer.map(|beer| {
            let dto = mapper::beer_to_dto(&beer);
            self.cache.put_upc(upc, dto.clone());
            dto
        }))
    }

    /// Create a new beer from a validated payload and return it with its
    /// server-assigned identifier.
    pub async fn save_new_beer(&self, dto: BeerDto) -> RepositoryResult<BeerDto> {
        let beer = mapper::dto_to_beer(&dto)?;
        let saved = self.repository.save(beer).await?;
        debug!(id = ?saved.id, "created beer");

        self.cache.clear_lists();
        Ok(mapper::beer_to_dto(&saved))
    }

    /// Overwrite name/style/price/UPC of an existing beer.
    ///
    /// Returns `None` without persisting anything when no row matches the
    /// id. On success the affected cache entries are evicted so subsequent
    /// reads see the new values.
    pub async fn update_beer(
        &self,
        beer_id: BeerId,
        dto: BeerDto,
    ) -> RepositoryResult<Option<BeerDto>> {
        let Some(mut beer) = self.repository.find_by_id(beer_id).await? else {
            debug!(%beer_id, "update target not found");
            return Ok(None);
        };

        let old_upc = beer.upc.clone();
        mapper::apply_update(&mut beer, &dto)?;
        let saved = self.repository.save(beer).await?;

        self.evict(beer_id, &old_upc);
        self.cache.invalidate_upc(&saved.upc);

        Ok(Some(mapper::beer_to_dto(&saved)))
    }

    /// Delete a beer by id. A nonexistent id is a silent no-op.
    pub async fn delete_beer_by_id(&self, beer_id: BeerId) -> RepositoryResult<()> {
        // One read to learn the UPC so its cache entry can be evicted too.
        let existing: Option<Beer> = self.repository.find_by_id(beer_id).await?;
        self.repository.delete_by_id(beer_id).await?;

        match existing {
            Some(beer) => self.evict(beer_id, &beer.upc),
            None => self.cache.invalidate_beer(beer_id.value()),
        }

        Ok(())
    }

    /// Check that the backing repository is reachable.
    pub async fn health_check(&self) -> RepositoryResult<bool> {
        self.repository.health_check().await
    }

    /// Snapshot of response-cache counters.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    fn evict(&self, beer_id: BeerId, upc: &str) {
        debug!(%beer_id, upc, "evicting cache entries");
        self.cache.invalidate_beer(beer_id.value());
        self.cache.invalidate_upc(upc);
        self.cache.clear_lists();
    }
}
