//! Conversions between the persisted beer entity and its wire DTO.
//!
//! All functions are pure. The DTO→entity direction is only used on create
//! and ignores client-supplied identifier and timestamp fields; the server
//! assigns those.

use crate::api::{Beer, BeerDto, BeerStyle};
use crate::db::repository::{RepositoryError, RepositoryResult};

/// Map an entity to its wire form, omitting quantity-on-hand.
pub fn beer_to_dto(beer: &Beer) -> BeerDto {
    BeerDto {
        id: beer.id,
        beer_name: Some(beer.beer_name.clone()),
        beer_style: Some(beer.beer_style.as_str().to_string()),
        upc: Some(beer.upc.clone()),
        price: Some(beer.price.clone()),
        quantity_on_hand: None,
        created_date: beer.created_date,
        last_modified_date: beer.last_modified_date,
    }
}

/// Map an entity to its wire form, including quantity-on-hand.
pub fn beer_to_dto_with_inventory(beer: &Beer) -> BeerDto {
    BeerDto {
        quantity_on_hand: beer.quantity_on_hand,
        ..beer_to_dto(beer)
    }
}

/// Build a new entity from a create payload.
///
/// Client-supplied `id`, `createdDate`, and `lastModifiedDate` are ignored;
/// missing required fields or an unknown style yield a validation error
/// naming the offending fields.
pub fn dto_to_beer(dto: &BeerDto) -> RepositoryResult<Beer> {
    let mut violations: Vec<String> = Vec::new();

    let beer_name = match dto.beer_name.as_deref() {
        Some(name) if !name.trim().is_empty() => name.to_string(),
        _ => {
            violations.push("beerName is required".to_string());
            String::new()
        }
    };

    let beer_style = match dto.beer_style.as_deref() {
        Some(style) => match style.parse::<BeerStyle>() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                violations.push(format!("beerStyle '{}' is not a known style", style));
                None
            }
        },
        None => {
            violations.push("beerStyle is required".to_string());
            None
        }
    };

    let upc = match dto.upc.as_deref() {
        Some(upc) if !upc.trim().is_empty() => upc.to_string(),
        _ => {
            violations.push("upc is required".to_string());
            String::new()
        }
    };

    let price = match dto.price.clone() {
        Some(price) => Some(price),
        None => {
            violations.push("price is required".to_string());
            None
        }
    };

    match (beer_style, price) {
        (Some(beer_style), Some(price)) if violations.is_empty() => Ok(Beer {
            id: None,
            beer_name,
            beer_style,
            upc,
            price,
            quantity_on_hand: dto.quantity_on_hand,
            created_date: None,
            last_modified_date: None,
            version: None,
        }),
        _ => Err(RepositoryError::validation(violations.join(", "))),
    }
}

/// Overwrite the mutable fields of an existing entity from an update payload.
///
/// Only name, style, price, and UPC change; identifier, timestamps, version,
/// and quantity-on-hand are left to the repository.
pub fn apply_update(beer: &mut Beer, dto: &BeerDto) -> RepositoryResult<()> {
    let updated = dto_to_beer(dto)?;
    beer.beer_name = updated.beer_name;
    beer.beer_style = updated.beer_style;
    beer.price = updated.price;
    beer.upc = updated.upc;
    Ok(())
}
