//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! service layer for business logic. The same handler set serves both the
//! `/api/v1` and `/api/v2` mounts.

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderName, StatusCode},
    Json,
};
use serde_json::Value;

use super::dto::{
    validate_beer_payload, BeerDto, BeerPagedList, HealthResponse, ListBeersQuery,
    ShowInventoryQuery,
};
use super::error::AppError;
use super::state::AppState;
use crate::api::{BeerId, BeerStyle, PageRequest};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

const DEFAULT_PAGE_NUMBER: u32 = 0;
const DEFAULT_PAGE_SIZE: u32 = 25;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint to verify the service is running and the repository
/// is accessible.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match state.service.health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Beer CRUD
// =============================================================================

/// GET /api/{v1,v2}/beer
///
/// List beers with optional name/style filters and pagination. Always 200,
/// even when the page is empty.
pub async fn list_beers(
    State(state): State<AppState>,
    Query(params): Query<ListBeersQuery>,
) -> HandlerResult<BeerPagedList> {
    let page_number = match params.page_number {
        Some(n) if n >= 0 => n as u32,
        _ => DEFAULT_PAGE_NUMBER,
    };
    let page_size = match params.page_size {
        Some(s) if s >= 1 => s as u32,
        _ => DEFAULT_PAGE_SIZE,
    };
    let show_inventory = params.show_inventory_on_hand.unwrap_or(false);

    let beer_style = params
        .beer_style
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<BeerStyle>()
                .map_err(|_| AppError::BadRequest(format!("Unknown beer style: {}", s)))
        })
        .transpose()?;
    let beer_name = params.beer_name.filter(|s| !s.is_empty());

    let list = state
        .service
        .list_beers(
            beer_name,
            beer_style,
            PageRequest::new(page_number, page_size),
            show_inventory,
        )
        .await?;

    Ok(Json(list))
}

/// GET /api/{v1,v2}/beer/{beerId}
///
/// Fetch a single beer. 404 when the id does not exist.
pub async fn get_beer_by_id(
    State(state): State<AppState>,
    Path(beer_id): Path<i64>,
    Query(params): Query<ShowInventoryQuery>,
) -> HandlerResult<BeerDto> {
    let show_inventory = params.show_inventory_on_hand.unwrap_or(false);

    let dto = state
        .service
        .get_by_id(BeerId::new(beer_id), show_inventory)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Beer {} not found", beer_id)))?;

    Ok(Json(dto))
}

/// GET /api/{v1,v2}/beerUpc/{upc}
///
/// Fetch a single beer by UPC. 404 when no row carries the code.
pub async fn get_beer_by_upc(
    State(state): State<AppState>,
    Path(upc): Path<String>,
) -> HandlerResult<BeerDto> {
    let dto = state
        .service
        .get_by_upc(&upc)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Beer with UPC {} not found", upc)))?;

    Ok(Json(dto))
}

/// POST /api/{v1,v2}/beer
///
/// Create a beer. 201 with a `Location` header pointing at the new
/// resource; 400 when the payload is malformed or incomplete.
pub async fn create_beer(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, [(HeaderName, String); 1], Json<BeerDto>), AppError> {
    let dto = parse_beer_payload(body)?;
    let saved = state.service.save_new_beer(dto).await?;

    let location = saved
        .id
        .map(|id| format!("/api/v1/beer/{}", id))
        .unwrap_or_default();

    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(saved)))
}

/// PUT /api/{v1,v2}/beer/{beerId}
///
/// Overwrite name/style/price/UPC of an existing beer. 204 with no body on
/// success, 404 when the id does not exist.
pub async fn update_beer(
    State(state): State<AppState>,
    Path(beer_id): Path<i64>,
    Json(body): Json<Value>,
) -> Result<StatusCode, AppError> {
    let dto = parse_beer_payload(body)?;

    match state.service.update_beer(BeerId::new(beer_id), dto).await? {
        Some(_) => Ok(StatusCode::NO_CONTENT),
        None => Err(AppError::NotFound(format!("Beer {} not found", beer_id))),
    }
}

/// DELETE /api/{v1,v2}/beer/{beerId}
///
/// Delete a beer. Always 200, whether or not the id existed.
pub async fn delete_beer(
    State(state): State<AppState>,
    Path(beer_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.service.delete_beer_by_id(BeerId::new(beer_id)).await?;

    Ok(StatusCode::OK)
}

/// Deserialize and validate a create/update body.
///
/// Decoding runs against `serde_json::Value` first so every malformed body
/// is a 400 rather than the extractor's default rejection.
fn parse_beer_payload(body: Value) -> Result<BeerDto, AppError> {
    let dto: BeerDto = serde_json::from_value(body)
        .map_err(|e| AppError::BadRequest(format!("Malformed beer payload: {}", e)))?;

    let violations = validate_beer_payload(&dto);
    if !violations.is_empty() {
        return Err(AppError::BadRequest(violations.join(", ")));
    }

    Ok(dto)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::LocalRepository;
    use crate::services::BeerService;
    use serde_json::json;
    use std::sync::Arc;

    fn test_state() -> AppState {
        AppState::new(Arc::new(BeerService::new(Arc::new(LocalRepository::new()))))
    }

    fn create_body(name: &str, upc: &str) -> Value {
        json!({
            "beerName": name,
            "beerStyle": "ALE",
            "upc": upc,
            "price": "12.95",
            "quantityOnHand": 25,
        })
    }

    async fn created_id(state: &AppState, name: &str, upc: &str) -> i64 {
        let (status, _, Json(dto)) =
            create_beer(State(state.clone()), Json(create_body(name, upc)))
                .await
                .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        dto.id.unwrap().value()
    }

    #[tokio::test]
    async fn test_create_sets_location_header() {
        let state = test_state();
        let (status, [(name, location)], Json(dto)) =
            create_beer(State(state), Json(create_body("Mango Bobs", "0631234200036")))
                .await
                .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(name, header::LOCATION);
        assert_eq!(location, format!("/api/v1/beer/{}", dto.id.unwrap()));
    }

    #[tokio::test]
    async fn test_create_rejects_incomplete_body() {
        let state = test_state();
        let err = create_beer(State(state), Json(json!({"beerName": "No Style"})))
            .await
            .unwrap_err();

        match err {
            AppError::BadRequest(msg) => {
                assert!(msg.contains("beerStyle is required"));
                assert!(msg.contains("price is required"));
            }
            other => panic!("expected BadRequest, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_get_by_id_found_and_missing() {
        let state = test_state();
        let id = created_id(&state, "Mango Bobs", "0631234200036").await;

        let Json(dto) = get_beer_by_id(
            State(state.clone()),
            Path(id),
            Query(ShowInventoryQuery::default()),
        )
        .await
        .unwrap();
        assert_eq!(dto.beer_name.as_deref(), Some("Mango Bobs"));
        assert!(dto.quantity_on_hand.is_none());

        let err = get_beer_by_id(
            State(state),
            Path(id + 100),
            Query(ShowInventoryQuery::default()),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_get_by_id_show_inventory() {
        let state = test_state();
        let id = created_id(&state, "Mango Bobs", "0631234200036").await;

        let Json(dto) = get_beer_by_id(
            State(state),
            Path(id),
            Query(ShowInventoryQuery {
                show_inventory_on_hand: Some(true),
            }),
        )
        .await
        .unwrap();
        assert_eq!(dto.quantity_on_hand, Some(25));
    }

    #[tokio::test]
    async fn test_get_by_upc() {
        let state = test_state();
        created_id(&state, "Mango Bobs", "0631234200036").await;

        let Json(dto) = get_beer_by_upc(State(state.clone()), Path("0631234200036".to_string()))
            .await
            .unwrap();
        assert_eq!(dto.beer_name.as_deref(), Some("Mango Bobs"));

        let err = get_beer_by_upc(State(state), Path("doesntexistUpc".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_defaults_and_clamping() {
        let state = test_state();
        created_id(&state, "Mango Bobs", "0631234200036").await;

        // Negative page number and zero page size fall back to the defaults.
        let Json(list) = list_beers(
            State(state.clone()),
            Query(ListBeersQuery {
                page_number: Some(-3),
                page_size: Some(0),
                ..ListBeersQuery::default()
            }),
        )
        .await
        .unwrap();
        assert_eq!(list.page_number, 0);
        assert_eq!(list.page_size, 25);
        assert_eq!(list.content.len(), 1);

        // An empty page is still a 200 with an empty content array.
        let Json(list) = list_beers(
            State(state),
            Query(ListBeersQuery {
                beer_name: Some("Nobody".to_string()),
                ..ListBeersQuery::default()
            }),
        )
        .await
        .unwrap();
        assert!(list.content.is_empty());
        assert_eq!(list.total_elements, 0);
    }

    #[tokio::test]
    async fn test_list_rejects_unknown_style() {
        let state = test_state();
        let err = list_beers(
            State(state),
            Query(ListBeersQuery {
                beer_style: Some("MERLOT".to_string()),
                ..ListBeersQuery::default()
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_update_found_and_missing() {
        let state = test_state();
        let id = created_id(&state, "Mango Bobs", "0631234200036").await;

        let status = update_beer(
            State(state.clone()),
            Path(id),
            Json(create_body("Renamed", "0631234200036")),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let Json(dto) = get_beer_by_id(
            State(state.clone()),
            Path(id),
            Query(ShowInventoryQuery::default()),
        )
        .await
        .unwrap();
        assert_eq!(dto.beer_name.as_deref(), Some("Renamed"));

        let err = update_beer(
            State(state),
            Path(id + 100),
            Json(create_body("Ghost", "0000000000000")),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_always_succeeds() {
        let state = test_state();
        let id = created_id(&state, "Mango Bobs", "0631234200036").await;

        assert_eq!(
            delete_beer(State(state.clone()), Path(id)).await.unwrap(),
            StatusCode::OK
        );
        // Deleting again, or deleting an id that never existed, still 200.
        assert_eq!(
            delete_beer(State(state.clone()), Path(id)).await.unwrap(),
            StatusCode::OK
        );
        assert_eq!(
            delete_beer(State(state), Path(424242)).await.unwrap(),
            StatusCode::OK
        );
    }

    #[tokio::test]
    async fn test_health_check_reports_connected() {
        let state = test_state();
        let Json(health) = health_check(State(state)).await.unwrap();
        assert_eq!(health.status, "ok");
        assert_eq!(health.database, "connected");
    }
}
