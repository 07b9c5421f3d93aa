//! `list.*` procedures.

use axum::{Json, extract::State};
use serde::Deserialize;

use violet_pages_core::{ListId, ListName};

use super::extract::{ApiJson, ApiQuery};
use crate::db::LibraryRepository;
use crate::error::{AppError, Result};
use crate::middleware::{OptionalAuth, RequireAuth, RequireOnboarded};
use crate::models::{List, ListChanges, ListDetail, NewList};
use crate::services::lists;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateListRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub public: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateListRequest {
    pub id: ListId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub public: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ListIdParams {
    pub id: ListId,
}

fn parse_name(raw: &str) -> Result<ListName> {
    ListName::parse(raw).map_err(|e| AppError::BadRequest(format!("List {e}")))
}

/// `POST /api/list.create`
pub async fn create(
    State(state): State<AppState>,
    RequireOnboarded(user): RequireOnboarded,
    ApiJson(request): ApiJson<CreateListRequest>,
) -> Result<Json<List>> {
    let new_list = NewList {
        name: parse_name(&request.name)?,
        description: request.description.trim().to_string(),
        is_public: request.public,
    };

    let store = LibraryRepository::new(state.pool());
    Ok(Json(lists::create_list(&store, user.id, &new_list).await?))
}

/// `GET /api/list.getAll`
pub async fn get_all(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<List>>> {
    let store = LibraryRepository::new(state.pool());
    Ok(Json(lists::lists_of(&store, user.id).await?))
}

/// `GET /api/list.getById?id=`
///
/// Public lists are visible to anyone; private lists only to their owner.
pub async fn get_by_id(
    State(state): State<AppState>,
    OptionalAuth(viewer): OptionalAuth,
    ApiQuery(params): ApiQuery<ListIdParams>,
) -> Result<Json<ListDetail>> {
    let store = LibraryRepository::new(state.pool());
    let detail = lists::view_list(&store, params.id, viewer.map(|v| v.id)).await?;
    Ok(Json(detail))
}

/// `POST /api/list.update`
pub async fn update(
    State(state): State<AppState>,
    RequireOnboarded(user): RequireOnboarded,
    ApiJson(request): ApiJson<UpdateListRequest>,
) -> Result<Json<List>> {
    let changes = ListChanges {
        name: request.name.as_deref().map(parse_name).transpose()?,
        description: request.description.map(|d| d.trim().to_string()),
        is_public: request.public,
    };

    let store = LibraryRepository::new(state.pool());
    Ok(Json(
        lists::update_list(&store, request.id, user.id, &changes).await?,
    ))
}

/// `POST /api/list.delete`
pub async fn delete(
    State(state): State<AppState>,
    RequireOnboarded(user): RequireOnboarded,
    ApiJson(params): ApiJson<ListIdParams>,
) -> Result<Json<List>> {
    let store = LibraryRepository::new(state.pool());
    Ok(Json(lists::delete_list(&store, params.id, user.id).await?))
}
