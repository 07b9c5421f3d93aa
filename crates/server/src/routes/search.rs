//! `search.*` procedures.

use axum::{Json, extract::State};
use serde::Deserialize;

use super::extract::{ApiJson, ApiQuery};
use crate::catalog::VolumeSearch;
use crate::db::SearchRepository;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::Search;
use crate::services::{search, search_history};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ResultsPageQuery {
    pub query: String,
    pub page: u32,
}

#[derive(Debug, Deserialize)]
pub struct AddToHistoryRequest {
    pub query: String,
}

/// `GET /api/search.getResultsPage?query=&page=`
pub async fn get_results_page(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    ApiQuery(params): ApiQuery<ResultsPageQuery>,
) -> Result<Json<VolumeSearch>> {
    Ok(Json(
        search::results_page(state.catalog(), &params.query, params.page).await?,
    ))
}

/// `POST /api/search.addToHistory`
pub async fn add_to_history(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(request): ApiJson<AddToHistoryRequest>,
) -> Result<Json<Search>> {
    let store = SearchRepository::new(state.pool());
    Ok(Json(
        search_history::record_search(&store, user.id, &request.query).await?,
    ))
}

/// `GET /api/search.getHistory`
pub async fn get_history(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<Search>>> {
    let store = SearchRepository::new(state.pool());
    Ok(Json(search_history::get_history(&store, user.id).await?))
}
