//! Repository trait for beer persistence operations.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::db::models::{Beer, BeerFilter, BeerId, PageRequest};

/// Repository trait for beer catalog storage.
///
/// Lookup misses produce `Ok(None)` / an empty page rather than an error;
/// callers decide whether absence is a 404. `save` is an upsert keyed on the
/// presence of the entity id.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait BeerRepository: Send + Sync {
    /// Fetch a single beer by its identifier.
    ///
    /// # Returns
    /// * `Ok(Some(Beer))` - The stored beer
    /// * `Ok(None)` - No beer with that id exists
    /// * `Err(RepositoryError)` - If the query fails
    async fn find_by_id(&self, beer_id: BeerId) -> RepositoryResult<Option<Beer>>;

    /// Fetch a single beer by its UPC code.
    ///
    /// UPC is treated as an alternate unique key; if duplicates exist the
    /// row with the lowest id wins.
    async fn find_by_upc(&self, upc: &str) -> RepositoryResult<Option<Beer>>;

    /// Fetch one page of beers matching the given conjunctive filter,
    /// ordered by id.
    ///
    /// # Arguments
    /// * `filter` - Name/style constraints; an empty filter matches all rows
    /// * `page` - Zero-based page number and page size
    async fn find_all(
        &self,
        filter: &BeerFilter,
        page: PageRequest,
    ) -> RepositoryResult<Vec<Beer>>;

    /// Persist a beer.
    ///
    /// Inserts when `beer.id` is `None`, assigning the identifier, creation
    /// timestamp, and version; otherwise updates the existing row, bumping
    /// the last-modified timestamp and version while preserving the creation
    /// timestamp.
    ///
    /// # Returns
    /// * `Ok(Beer)` - The stored entity with all server-assigned fields set
    async fn save(&self, beer: Beer) -> RepositoryResult<Beer>;

    /// Delete a beer by id. Deleting a nonexistent id is a silent no-op.
    async fn delete_by_id(&self, beer_id: BeerId) -> RepositoryResult<()>;

    /// Check that the backing store is reachable.
    async fn health_check(&self) -> RepositoryResult<bool>;
}
