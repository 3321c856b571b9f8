//! Menu API
//!
//! Public availability plus the admin surface: item CRUD, week publish,
//! default sides, week duplication.

use crate::core::ServerState;
use crate::db::models::{MenuItem, MenuItemCreate, MenuItemUpdate};
use crate::services::menu_catalog::WeekMenu;
use axum::extract::{Path, Query, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::week;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/menus/{week}", get(published_week))
        .route("/api/admin/menus", post(create_item))
        .route("/api/admin/menus/{week}", get(admin_week))
        .route(
            "/api/admin/menus/item/{id}",
            put(update_item).delete(delete_item),
        )
        .route("/api/admin/menus/{week}/publish", post(publish_week))
        .route("/api/admin/menus/{week}/default-sides", post(default_sides))
        .route("/api/admin/menus/{week}/duplicate", post(duplicate_week))
}

fn parse_anchor(week: NaiveDate) -> AppResult<NaiveDate> {
    if !week::is_week_anchor(week) {
        return Err(AppError::with_message(
            ErrorCode::InvalidWeekAnchor,
            format!("{week} is not a Monday week anchor"),
        ));
    }
    Ok(week)
}

/// GET /api/menus/:week - end-user view (active and published items)
async fn published_week(
    State(state): State<ServerState>,
    Path(week): Path<NaiveDate>,
) -> AppResult<Json<WeekMenu>> {
    let week = parse_anchor(week)?;
    let menu = state.catalog.published_week(week).await?;
    Ok(Json(menu))
}

/// GET /api/admin/menus/:week - admin view (all items)
async fn admin_week(
    State(state): State<ServerState>,
    Path(week): Path<NaiveDate>,
) -> AppResult<Json<WeekMenu>> {
    let week = parse_anchor(week)?;
    let menu = state.catalog.admin_week(week).await?;
    Ok(Json(menu))
}

/// POST /api/admin/menus - create a menu item
async fn create_item(
    State(state): State<ServerState>,
    Json(payload): Json<MenuItemCreate>,
) -> AppResult<Json<MenuItem>> {
    let item = state.catalog.create_item(payload).await?;
    Ok(Json(item))
}

/// PUT /api/admin/menus/item/:id - patch a menu item
async fn update_item(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<MenuItemUpdate>,
) -> AppResult<Json<MenuItem>> {
    let item = state.catalog.update_item(&id, payload).await?;
    Ok(Json(item))
}

/// DELETE /api/admin/menus/item/:id - hard delete a menu item
async fn delete_item(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    state.catalog.delete_item(&id).await?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}

#[derive(Debug, Deserialize)]
struct PublishRequest {
    publish: bool,
}

#[derive(Debug, Serialize)]
struct PublishResponse {
    week_start: NaiveDate,
    publish: bool,
    updated: usize,
}

/// POST /api/admin/menus/:week/publish - batch-flip publish on active items
async fn publish_week(
    State(state): State<ServerState>,
    Path(week): Path<NaiveDate>,
    Json(payload): Json<PublishRequest>,
) -> AppResult<Json<PublishResponse>> {
    let week = parse_anchor(week)?;
    let updated = state.catalog.publish_week(week, payload.publish).await?;
    Ok(Json(PublishResponse {
        week_start: week,
        publish: payload.publish,
        updated,
    }))
}

#[derive(Debug, Deserialize)]
struct DefaultSidesQuery {
    date: Option<NaiveDate>,
}

/// POST /api/admin/menus/:week/default-sides[?date=] - bulk-create defaults
async fn default_sides(
    State(state): State<ServerState>,
    Path(week): Path<NaiveDate>,
    Query(query): Query<DefaultSidesQuery>,
) -> AppResult<Json<Vec<MenuItem>>> {
    let week = parse_anchor(week)?;
    let created = match query.date {
        Some(date) => {
            state
                .catalog
                .apply_default_sides_for_day(week, date)
                .await?
        }
        None => state.catalog.apply_default_sides(week).await?,
    };
    Ok(Json(created))
}

#[derive(Debug, Deserialize)]
struct DuplicateRequest {
    target_week: NaiveDate,
}

#[derive(Debug, Serialize)]
struct DuplicateResponse {
    source_week: NaiveDate,
    target_week: NaiveDate,
    created: usize,
}

/// POST /api/admin/menus/:week/duplicate - copy a week (never auto-publishes)
async fn duplicate_week(
    State(state): State<ServerState>,
    Path(week): Path<NaiveDate>,
    Json(payload): Json<DuplicateRequest>,
) -> AppResult<Json<DuplicateResponse>> {
    let week = parse_anchor(week)?;
    let created = state
        .catalog
        .duplicate_week(week, payload.target_week)
        .await?;
    Ok(Json(DuplicateResponse {
        source_week: week,
        target_week: payload.target_week,
        created,
    }))
}
