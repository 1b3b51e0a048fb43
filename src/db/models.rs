//! Shared data models re-exported for database layer consumers.

pub use crate::api::{Beer, BeerFilter, BeerId, BeerStyle, PageRequest};
