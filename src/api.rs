//! Public API surface for the brewery backend.
//!
//! This file consolidates the domain entity, the wire-facing DTO types, and
//! the small value types (identifier, style, filter, page request) shared by
//! the repository, service, and HTTP layers. All wire types derive
//! Serialize/Deserialize for JSON serialization with camelCase field names.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Beer identifier (database primary key).
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct BeerId(pub i64);

impl BeerId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for BeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Beer style. Closed set; the wire representation is the upper snake-case
/// name (`PALE_ALE`), matching the values accepted by the `beerStyle` query
/// parameter and DTO field.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BeerStyle {
    Ale,
    PaleAle,
    Ipa,
    Wheat,
    Lager,
    Pilsner,
    Saison,
    Porter,
    Stout,
    Gose,
}

impl BeerStyle {
    /// All known styles, in declaration order.
    pub const ALL: [BeerStyle; 10] = [
        BeerStyle::Ale,
        BeerStyle::PaleAle,
        BeerStyle::Ipa,
        BeerStyle::Wheat,
        BeerStyle::Lager,
        BeerStyle::Pilsner,
        BeerStyle::Saison,
        BeerStyle::Porter,
        BeerStyle::Stout,
        BeerStyle::Gose,
    ];

    /// Wire name of the style.
    pub fn as_str(&self) -> &'static str {
        match self {
            BeerStyle::Ale => "ALE",
            BeerStyle::PaleAle => "PALE_ALE",
            BeerStyle::Ipa => "IPA",
            BeerStyle::Wheat => "WHEAT",
            BeerStyle::Lager => "LAGER",
            BeerStyle::Pilsner => "PILSNER",
            BeerStyle::Saison => "SAISON",
            BeerStyle::Porter => "PORTER",
            BeerStyle::Stout => "STOUT",
            BeerStyle::Gose => "GOSE",
        }
    }
}

impl fmt::Display for BeerStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BeerStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ALE" => Ok(BeerStyle::Ale),
            "PALE_ALE" => Ok(BeerStyle::PaleAle),
            "IPA" => Ok(BeerStyle::Ipa),
            "WHEAT" => Ok(BeerStyle::Wheat),
            "LAGER" => Ok(BeerStyle::Lager),
            "PILSNER" => Ok(BeerStyle::Pilsner),
            "SAISON" => Ok(BeerStyle::Saison),
            "PORTER" => Ok(BeerStyle::Porter),
            "STOUT" => Ok(BeerStyle::Stout),
            "GOSE" => Ok(BeerStyle::Gose),
            other => Err(format!("Unknown beer style: {}", other)),
        }
    }
}

/// Persisted beer entity.
///
/// `id`, `created_date`, `last_modified_date`, and `version` are
/// server-assigned: they are `None` until the entity has been stored.
/// `version` is an optimistic-concurrency counter bumped on every update;
/// business logic never inspects it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beer {
    pub id: Option<BeerId>,
    pub beer_name: String,
    pub beer_style: BeerStyle,
    /// Alternate lookup key. Not enforced unique, but treated as such.
    pub upc: String,
    pub price: BigDecimal,
    pub quantity_on_hand: Option<i32>,
    pub created_date: Option<DateTime<Utc>>,
    pub last_modified_date: Option<DateTime<Utc>>,
    pub version: Option<i32>,
}

/// Conjunctive filter for list queries: rows must match every field that is
/// set, and everything matches an empty filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BeerFilter {
    pub beer_name: Option<String>,
    pub beer_style: Option<BeerStyle>,
}

impl BeerFilter {
    pub fn is_empty(&self) -> bool {
        self.beer_name.is_none() && self.beer_style.is_none()
    }

    pub fn matches(&self, beer: &Beer) -> bool {
        if let Some(ref name) = self.beer_name {
            if &beer.beer_name != name {
                return false;
            }
        }
        if let Some(style) = self.beer_style {
            if beer.beer_style != style {
                return false;
            }
        }
        true
    }
}

/// Zero-based page request for list queries.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct PageRequest {
    pub page_number: u32,
    pub page_size: u32,
}

impl PageRequest {
    pub fn new(page_number: u32, page_size: u32) -> Self {
        Self {
            page_number,
            page_size,
        }
    }

    /// Number of rows to skip.
    pub fn offset(&self) -> i64 {
        i64::from(self.page_number) * i64::from(self.page_size)
    }

    /// Maximum number of rows to return.
    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }
}

/// Wire representation of a beer.
///
/// Every field is optional so that partial payloads deserialize and can be
/// validated with per-field messages at the HTTP boundary. `beer_style` is a
/// plain string here (relaxed input); it is parsed into [`BeerStyle`] when
/// the DTO is mapped to an entity. `quantity_on_hand` is populated only when
/// inventory was explicitly requested.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BeerDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<BeerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beer_style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<BigDecimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity_on_hand: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified_date: Option<DateTime<Utc>>,
}

/// One page of beers plus pagination metadata.
///
/// `total_elements` reports the number of rows on this page, not a count
/// across all pages. Callers paging through the catalog should iterate until
/// a short page comes back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeerPagedList {
    pub content: Vec<BeerDto>,
    pub page_number: u32,
    pub page_size: u32,
    pub total_elements: u64,
}

impl BeerPagedList {
    /// Wrap one page of mapped rows with its request's metadata.
    pub fn of(content: Vec<BeerDto>, page: PageRequest) -> Self {
        let total_elements = content.len() as u64;
        Self {
            content,
            page_number: page.page_number,
            page_size: page.page_size,
            total_elements,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beer(name: &str, style: BeerStyle) -> Beer {
        Beer {
            id: Some(BeerId::new(1)),
            beer_name: name.to_string(),
            beer_style: style,
            upc: "0631234200036".to_string(),
            price: "9.99".parse().expect("valid decimal"),
            quantity_on_hand: Some(12),
            created_date: None,
            last_modified_date: None,
            version: Some(0),
        }
    }

    #[test]
    fn test_beer_id_value() {
        let id = BeerId::new(42);
        assert_eq!(id.value(), 42);
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn test_beer_style_round_trip() {
        for style in BeerStyle::ALL {
            assert_eq!(style.as_str().parse::<BeerStyle>(), Ok(style));
        }
    }

    #[test]
    fn test_beer_style_rejects_unknown() {
        assert!("NOT_A_STYLE".parse::<BeerStyle>().is_err());
        // Matching is exact; lower case is not accepted.
        assert!("ale".parse::<BeerStyle>().is_err());
    }

    #[test]
    fn test_beer_style_serde_uses_wire_names() {
        let json = serde_json::to_string(&BeerStyle::PaleAle).unwrap();
        assert_eq!(json, "\"PALE_ALE\"");
        let style: BeerStyle = serde_json::from_str("\"GOSE\"").unwrap();
        assert_eq!(style, BeerStyle::Gose);
    }

    #[test]
    fn test_filter_is_conjunctive() {
        let mango = beer("Mango Bobs", BeerStyle::Ale);
        let galaxy = beer("Galaxy Cat", BeerStyle::PaleAle);

        let both = BeerFilter {
            beer_name: Some("Mango Bobs".to_string()),
            beer_style: Some(BeerStyle::Ale),
        };
        assert!(both.matches(&mango));
        assert!(!both.matches(&galaxy));

        let wrong_style = BeerFilter {
            beer_name: Some("Mango Bobs".to_string()),
            beer_style: Some(BeerStyle::Stout),
        };
        assert!(!wrong_style.matches(&mango));

        let name_only = BeerFilter {
            beer_name: Some("Galaxy Cat".to_string()),
            beer_style: None,
        };
        assert!(name_only.matches(&galaxy));

        assert!(BeerFilter::default().matches(&mango));
        assert!(BeerFilter::default().is_empty());
    }

    #[test]
    fn test_page_request_offset() {
        let page = PageRequest::new(0, 25);
        assert_eq!(page.offset(), 0);
        assert_eq!(page.limit(), 25);

        let page = PageRequest::new(3, 10);
        assert_eq!(page.offset(), 30);
    }

    #[test]
    fn test_dto_serializes_camel_case() {
        let dto = BeerDto {
            id: Some(BeerId::new(7)),
            beer_name: Some("Mango Bobs".to_string()),
            beer_style: Some("ALE".to_string()),
            upc: Some("0631234200036".to_string()),
            price: Some("12.95".parse().unwrap()),
            quantity_on_hand: Some(3),
            created_date: None,
            last_modified_date: None,
        };

        let value = serde_json::to_value(&dto).unwrap();
        assert_eq!(value["id"], 7);
        assert_eq!(value["beerName"], "Mango Bobs");
        assert_eq!(value["beerStyle"], "ALE");
        assert_eq!(value["upc"], "0631234200036");
        assert_eq!(value["quantityOnHand"], 3);
        // Unset server-assigned fields are omitted entirely.
        assert!(value.get("createdDate").is_none());
    }

    #[test]
    fn test_dto_deserializes_partial_payload() {
        let dto: BeerDto = serde_json::from_str(r#"{"beerName":"Galaxy Cat"}"#).unwrap();
        assert_eq!(dto.beer_name.as_deref(), Some("Galaxy Cat"));
        assert!(dto.id.is_none());
        assert!(dto.price.is_none());
    }

    #[test]
    fn test_paged_list_metadata() {
        let page = PageRequest::new(2, 25);
        let list = BeerPagedList::of(vec![BeerDto::default(); 5], page);
        assert_eq!(list.page_number, 2);
        assert_eq!(list.page_size, 25);
        assert_eq!(list.total_elements, 5);
        assert!(list.content.len() as u64 <= u64::from(list.page_size));
    }
}
