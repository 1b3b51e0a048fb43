use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::beers;

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = beers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BeerRow {
    pub id: i64,
    pub beer_name: String,
    pub beer_style: String,
    pub upc: String,
    pub price: BigDecimal,
    pub quantity_on_hand: Option<i32>,
    pub created_date: DateTime<Utc>,
    pub last_modified_date: DateTime<Utc>,
    pub version: i32,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = beers)]
pub struct NewBeerRow {
    pub beer_name: String,
    pub beer_style: String,
    pub upc: String,
    pub price: BigDecimal,
    pub quantity_on_hand: Option<i32>,
}
