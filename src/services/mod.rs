//! Service layer for business logic and orchestration.
//!
//! This module sits between the HTTP handlers and the repository. It owns
//! the entity/DTO mapping, the response cache, and the catalog operations.

pub mod beer_service;

pub mod cache;

pub mod mapper;

pub use beer_service::BeerService;
pub use cache::{CacheStats, ListCacheKey, ResponseCache};

#[cfg(test)]
#[path = "beer_service_tests.rs"]
mod beer_service_tests;
