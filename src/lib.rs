//! # Brewery Rust Backend
//!
//! REST API backend for a beer catalog.
//!
//! This crate exposes CRUD operations over a catalog of beers: listing with
//! optional name/style filters and pagination, lookup by id or UPC code,
//! creation, update, and deletion. The HTTP layer is served by Axum and
//! delegates to a service layer that owns an in-process response cache.
//!
//! ## Architecture
//!
//! The crate is organized into layered modules:
//!
//! - [`api`]: Shared domain and wire types ([`api::Beer`], [`api::BeerDto`])
//! - [`db`]: Repository trait and its Postgres / in-memory implementations
//! - [`services`]: Business logic, entity/DTO mapping, and response caching
//! - [`http`]: Axum-based HTTP server, routing, and request handlers

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod api;

pub mod db;

pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
