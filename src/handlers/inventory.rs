use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::Value;
use tracing::info;

use crate::{
    error::{AppError, AppResult},
    models::{document_to_json, parse_id, InventoryFilters, ItemBody, ListQuery},
    AppState,
};

/// Inventory routes, relative to wherever they are mounted.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/:id", get(get_item).put(replace_item).delete(delete_item))
}

fn not_found(id: &str) -> AppError {
    AppError::NotFound(format!("ID of {id} not found"))
}

// ── List ──────────────────────────────────────────────────────────────────────

pub async fn list_items(
    State(state): State<AppState>,
    Query(filters): Query<InventoryFilters>,
) -> AppResult<Json<Vec<Value>>> {
    let query = ListQuery::try_from(filters)?;

    let start = Instant::now();
    let items = state.store.find(&query).await?;
    let elapsed = start.elapsed();

    info!(
        count = items.len(),
        max_price = ?query.max_price,
        prefix = ?query.prefix,
        limit = ?query.limit,
        elapsed_ms = elapsed.as_millis(),
        "Listed items"
    );

    Ok(Json(items.into_iter().map(document_to_json).collect()))
}

// ── Get by ID ─────────────────────────────────────────────────────────────────

/// A missing id is still a 200, with a `null` body.
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Option<Value>>> {
    let object_id = parse_id(&id)?;

    let start = Instant::now();
    let item = state.store.find_one(object_id).await?;

    info!(
        id = %id,
        found = item.is_some(),
        elapsed_ms = start.elapsed().as_millis(),
        "Fetched item"
    );

    Ok(Json(item.map(document_to_json)))
}

// ── Create ────────────────────────────────────────────────────────────────────

/// Echoes the submitted body; the assigned identity is only logged.
pub async fn create_item(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<(StatusCode, Json<ItemBody>)> {
    let Json(body) = payload?;
    let item = ItemBody::try_from(body)?;

    let start = Instant::now();
    let id = state.store.insert_one(item.to_document()?).await?;

    info!(
        id = %id,
        product = %item.product(),
        elapsed_ms = start.elapsed().as_millis(),
        "Created item"
    );

    Ok((StatusCode::CREATED, Json(item)))
}

// ── Replace ───────────────────────────────────────────────────────────────────

pub async fn replace_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<ItemBody>> {
    let object_id = parse_id(&id)?;
    let Json(body) = payload?;
    let item = ItemBody::try_from(body)?;

    let start = Instant::now();
    let matched = state
        .store
        .replace_one(object_id, item.to_document()?)
        .await?;
    if matched == 0 {
        return Err(not_found(&id));
    }

    info!(id = %id, elapsed_ms = start.elapsed().as_millis(), "Replaced item");

    Ok(Json(item))
}

// ── Delete ────────────────────────────────────────────────────────────────────

pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let object_id = parse_id(&id)?;

    let start = Instant::now();
    let deleted = state.store.delete_one(object_id).await?;
    if deleted == 0 {
        return Err(not_found(&id));
    }

    info!(id = %id, elapsed_ms = start.elapsed().as_millis(), "Deleted item");

    Ok(StatusCode::NO_CONTENT)
}
