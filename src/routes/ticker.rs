use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    error::TickerError,
    middleware::admin::AdminAuth,
    models::ticker::{AdminListQuery, Counter, CreateTickerRequest, UpdateTickerRequest},
    services::{feed::FeedSettings, reconcile, ticker::TickerService},
    AppState,
};

/// GET /ticker: public, aggregated feed.
pub async fn active_feed(State(state): State<AppState>) -> Result<Json<Value>, TickerError> {
    let settings = FeedSettings::from(state.config.as_ref());
    let page = TickerService::feed(
        state.store.as_ref(),
        state.cache.as_deref(),
        &settings,
        Utc::now(),
    )
    .await?;

    Ok(Json(json!({
        "success": true,
        "count": page.entries.len(),
        "data": page.entries,
        "cached": page.cached,
    })))
}

/// POST /ticker/{id}/track-view: public, always succeeds.
pub async fn track_view(State(state): State<AppState>, Path(id): Path<String>) -> Json<Value> {
    TickerService::track(state.store.as_ref(), &id, Counter::Views).await;
    Json(json!({ "success": true, "message": "View tracked" }))
}

/// POST /ticker/{id}/track-click: public, always succeeds.
pub async fn track_click(State(state): State<AppState>, Path(id): Path<String>) -> Json<Value> {
    TickerService::track(state.store.as_ref(), &id, Counter::Clicks).await;
    Json(json!({ "success": true, "message": "Click tracked" }))
}

/// GET /ticker/admin/all?page=&limit=&isActive=
pub async fn list_all(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Query(query): Query<AdminListQuery>,
) -> Result<Json<Value>, TickerError> {
    let page = TickerService::list(state.store.as_ref(), &query).await?;
    Ok(Json(json!({
        "success": true,
        "count": page.items.len(),
        "total": page.total,
        "page": page.page,
        "pages": page.pages,
        "data": page.items,
    })))
}

/// POST /ticker/admin/clear-cache
pub async fn clear_cache(State(state): State<AppState>, _admin: AdminAuth) -> Json<Value> {
    TickerService::clear_cache(state.cache.as_deref()).await;
    Json(json!({ "success": true, "message": "Ticker cache cleared successfully" }))
}

/// POST /ticker/admin/reconcile: run the expiry pass now.
pub async fn reconcile_now(
    State(state): State<AppState>,
    _admin: AdminAuth,
) -> Result<Json<Value>, TickerError> {
    let report = reconcile::run(state.store.as_ref(), Utc::now()).await?;
    if report.deactivated > 0 {
        TickerService::clear_cache(state.cache.as_deref()).await;
    }
    Ok(Json(json!({ "success": true, "data": report })))
}

/// GET /ticker/{id}
pub async fn get_item(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, TickerError> {
    let item = TickerService::get(state.store.as_ref(), id).await?;
    Ok(Json(json!({ "success": true, "data": item })))
}

/// POST /ticker: create a manual item.
pub async fn create_item(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Json(body): Json<CreateTickerRequest>,
) -> Result<(StatusCode, Json<Value>), TickerError> {
    let item = TickerService::create(
        state.store.as_ref(),
        state.cache.as_deref(),
        body,
        Utc::now(),
    )
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Ticker item created successfully",
            "data": item,
        })),
    ))
}

/// PUT /ticker/{id}
pub async fn update_item(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateTickerRequest>,
) -> Result<Json<Value>, TickerError> {
    let item = TickerService::update(state.store.as_ref(), state.cache.as_deref(), id, body).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Ticker item updated successfully",
        "data": item,
    })))
}

/// DELETE /ticker/{id}
pub async fn delete_item(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, TickerError> {
    TickerService::delete(state.store.as_ref(), state.cache.as_deref(), id).await?;
    Ok(Json(json!({ "success": true, "message": "Ticker item deleted successfully" })))
}

/// PATCH /ticker/{id}/toggle
pub async fn toggle_item(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, TickerError> {
    let active = TickerService::toggle(state.store.as_ref(), state.cache.as_deref(), id).await?;
    let verb = if active { "activated" } else { "deactivated" };
    Ok(Json(json!({
        "success": true,
        "message": format!("Ticker item {verb} successfully"),
        "data": { "id": id, "isActive": active },
    })))
}
