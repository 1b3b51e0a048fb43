//! HTTP server module for the brewery backend.
//!
//! This module provides an axum-based HTTP server that exposes the beer
//! catalog as a REST API. It reuses the service layer and repository pattern
//! from the core library.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  HTTP Layer (axum handlers)                               │
//! │  - Request parsing and validation                         │
//! │  - JSON serialization/deserialization                     │
//! │  - CORS, compression, error handling                      │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Service Layer (services::BeerService)                    │
//! │  - CRUD orchestration, response cache                     │
//! └───────────────────┬──────────────────────────────────────┘
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Repository Layer (db/)                                   │
//! │  - LocalRepository / PostgresRepository                   │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod dto;

pub mod error;

pub mod handlers;

pub mod router;

pub mod state;

pub use router::create_router;

pub use state::AppState;
