use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::header::LOCATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json};
use rudby_catalog::DeleteOutcome;
use rudby_types::{CatalogRecord, RecordDraft, RecordId};
use serde::Serialize;
use serde_json::json;

use crate::error::{ServerError, ServerResult};
use crate::router::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

/// Health check handler.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

/// Info handler.
pub async fn info_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    let records = state.catalog.records();
    Json(json!({
        "name": "rudby-server",
        "version": env!("CARGO_PKG_VERSION"),
        "collection": records.collection(),
        "counterKey": records.allocator().counter_key(),
        "listing": state.catalog.gate().config().listing,
    }))
}

pub async fn list_records(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ServerResult<Json<Vec<CatalogRecord>>> {
    let caller = state.caller(&headers).await?;
    Ok(Json(state.catalog.list(&caller).await?))
}

pub async fn create_record(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<RecordDraft>, JsonRejection>,
) -> ServerResult<impl IntoResponse> {
    let caller = state.caller(&headers).await?;
    let Json(draft) = body.map_err(|e| ServerError::BadRequest(e.body_text()))?;
    let record = state.catalog.create(&caller, draft).await?;
    let location = format!("/jewelleries/{}", record.id);
    Ok((StatusCode::CREATED, [(LOCATION, location)], Json(record)))
}

pub async fn get_record(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ServerResult<Json<CatalogRecord>> {
    let caller = state.caller(&headers).await?;
    let id = parse_id(&id)?;
    Ok(Json(state.catalog.get(&caller, &id).await?))
}

pub async fn update_record(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: Result<Json<RecordDraft>, JsonRejection>,
) -> ServerResult<Json<CatalogRecord>> {
    let caller = state.caller(&headers).await?;
    let id = parse_id(&id)?;
    let Json(patch) = body.map_err(|e| ServerError::BadRequest(e.body_text()))?;
    Ok(Json(state.catalog.update(&caller, &id, patch).await?))
}

pub async fn delete_record(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ServerResult<Json<serde_json::Value>> {
    let caller = state.caller(&headers).await?;
    let id = parse_id(&id)?;
    match state.catalog.delete(&caller, &id).await? {
        DeleteOutcome::Deleted => Ok(Json(json!({ "deleted": true }))),
        DeleteOutcome::NotFound => Err(ServerError::NotFound(format!("record {id}"))),
    }
}

pub async fn find_by_type(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(kind): Path<String>,
) -> ServerResult<Json<CatalogRecord>> {
    let caller = state.caller(&headers).await?;
    state
        .catalog
        .find_by_type(&caller, &kind)
        .await?
        .map(Json)
        .ok_or_else(|| ServerError::NotFound(format!("no record of type '{kind}'")))
}

pub async fn find_by_collection(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(name): Path<String>,
) -> ServerResult<Json<CatalogRecord>> {
    let caller = state.caller(&headers).await?;
    state
        .catalog
        .find_by_collection(&caller, &name)
        .await?
        .map(Json)
        .ok_or_else(|| ServerError::NotFound(format!("no record in collection '{name}'")))
}

fn parse_id(raw: &str) -> ServerResult<RecordId> {
    raw.parse()
        .map_err(|e: rudby_types::TypeError| ServerError::BadRequest(e.to_string()))
}
