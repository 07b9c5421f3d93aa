//! `book.*` procedures.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use violet_pages_core::{ListId, VolumeId};

use super::extract::{ApiJson, ApiQuery};
use crate::catalog::Volume;
use crate::db::LibraryRepository;
use crate::error::Result;
use crate::middleware::{RequireAuth, RequireOnboarded};
use crate::models::{ListMembership, ListWithBooks};
use crate::services::{descriptions, membership, search};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct BookIdQuery {
    pub id: VolumeId,
}

#[derive(Debug, Deserialize)]
pub struct DescriptionQuery {
    pub id: VolumeId,
    /// Raw catalog description, only used on a cache miss.
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct DescriptionResponse {
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct AddToListsRequest {
    pub id: VolumeId,
    pub lists: Vec<ListId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFromListRequest {
    pub book_id: VolumeId,
    pub list_id: ListId,
}

/// `GET /api/book.getById?id=`
pub async fn get_by_id(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    ApiQuery(query): ApiQuery<BookIdQuery>,
) -> Result<Json<Volume>> {
    Ok(Json(search::volume(state.catalog(), &query.id).await?))
}

/// `GET /api/book.getDescription?id=&description=`
pub async fn get_description(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    ApiQuery(query): ApiQuery<DescriptionQuery>,
) -> Result<Json<DescriptionResponse>> {
    let description = descriptions::get_description(
        state.descriptions(),
        state.normalizer(),
        &query.id,
        &query.description,
    )
    .await?;

    Ok(Json(DescriptionResponse { description }))
}

/// `GET /api/book.getLists?id=`
pub async fn get_lists(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiQuery(query): ApiQuery<BookIdQuery>,
) -> Result<Json<Vec<ListMembership>>> {
    let store = LibraryRepository::new(state.pool());
    Ok(Json(
        membership::get_membership(&store, &query.id, user.id).await?,
    ))
}

/// `POST /api/book.addToLists`
///
/// Makes exactly the given lists (among the caller's) contain the book.
pub async fn add_to_lists(
    State(state): State<AppState>,
    RequireOnboarded(user): RequireOnboarded,
    ApiJson(request): ApiJson<AddToListsRequest>,
) -> Result<Json<Vec<ListMembership>>> {
    let store = LibraryRepository::new(state.pool());
    let memberships = membership::reconcile_membership(
        &store,
        state.catalog(),
        &request.id,
        user.id,
        &request.lists,
    )
    .await?;

    Ok(Json(memberships))
}

/// `POST /api/book.removeFromList`
pub async fn remove_from_list(
    State(state): State<AppState>,
    RequireOnboarded(user): RequireOnboarded,
    ApiJson(request): ApiJson<RemoveFromListRequest>,
) -> Result<Json<ListWithBooks>> {
    let store = LibraryRepository::new(state.pool());
    let list =
        membership::remove_from_list(&store, &request.book_id, request.list_id, user.id).await?;

    Ok(Json(list))
}
