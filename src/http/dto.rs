//! Request/response types for the HTTP API.
//!
//! The wire types themselves ([`BeerDto`], [`BeerPagedList`]) live in
//! [`crate::api`]; this module adds the query-parameter structs and the
//! body validation that is local to the HTTP boundary.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

// Re-export the wire types used by handlers.
pub use crate::api::{BeerDto, BeerPagedList};
use crate::api::BeerStyle;

/// Query parameters for the list endpoint.
///
/// Defaulting and clamping happen in the handler: absent or negative
/// `pageNumber` becomes 0, absent or non-positive `pageSize` becomes 25,
/// absent `showInventoryOnHand` is false.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListBeersQuery {
    pub beer_name: Option<String>,
    pub beer_style: Option<String>,
    pub page_number: Option<i32>,
    pub page_size: Option<i32>,
    pub show_inventory_on_hand: Option<bool>,
}

/// Query parameters for the read-by-id endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShowInventoryQuery {
    pub show_inventory_on_hand: Option<bool>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
    /// Repository connection status
    pub database: String,
}

/// Validate a create/update payload, returning one message per violated
/// field. An empty result means the payload is acceptable.
pub fn validate_beer_payload(dto: &BeerDto) -> Vec<String> {
    let mut violations = Vec::new();

    if dto.beer_name.as_deref().map_or(true, |s| s.trim().is_empty()) {
        violations.push("beerName is required".to_string());
    }

    match dto.beer_style.as_deref() {
        None => violations.push("beerStyle is required".to_string()),
        Some(style) if style.parse::<BeerStyle>().is_err() => {
            violations.push(format!("beerStyle '{}' is not a known style", style));
        }
        _ => {}
    }

    if dto.upc.as_deref().map_or(true, |s| s.trim().is_empty()) {
        violations.push("upc is required".to_string());
    }

    match &dto.price {
        None => violations.push("price is required".to_string()),
        Some(price) if *price < BigDecimal::from(0) => {
            violations.push("price must not be negative".to_string());
        }
        _ => {}
    }

    violations
}
