//! `user.*` procedures.

use axum::{Json, extract::State};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use uuid::Uuid;

use violet_pages_core::{DisplayName, UserId};

use super::extract::{ApiJson, ApiQuery};
use crate::db::{LibraryRepository, RepositoryError, UserRepository};
use crate::error::{AppError, Result, clear_sentry_user};
use crate::middleware::{RequireAuth, set_current_user};
use crate::models::{CurrentUser, ListInfo, ProfileUser, User, UserProfile, UserUpdate};
use crate::services::{ServiceError, lists, users};
use crate::state::AppState;
use crate::storage::PresignedUpload;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub setup_completed: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct UserIdParams {
    pub id: UserId,
}

#[derive(Debug, Serialize)]
pub struct DeletedUser {
    pub id: UserId,
}

fn not_found_or(e: RepositoryError) -> AppError {
    ServiceError::from(e).into()
}

/// `POST /api/user.update`
///
/// Refreshes the session identity so the onboarding flag stays current.
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
    ApiJson(request): ApiJson<UpdateUserRequest>,
) -> Result<Json<User>> {
    let name = request
        .name
        .as_deref()
        .map(DisplayName::parse)
        .transpose()
        .map_err(|e| AppError::BadRequest(format!("Display {e}")))?;

    let update = UserUpdate {
        name,
        image: request.image,
        description: request.description.map(|d| d.trim().to_string()),
        setup_completed: request.setup_completed,
    };

    let repo = UserRepository::new(state.pool());
    let existing = repo
        .get_by_id(current.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Account no longer exists".to_string()))?;
    users::validate_update(&existing, &update)?;

    let user = repo
        .update_profile(current.id, &update)
        .await
        .map_err(not_found_or)?;
    set_current_user(&session, &CurrentUser::from(&user)).await?;

    Ok(Json(user))
}

/// `GET /api/user.get?id=`
pub async fn get(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<UserIdParams>,
) -> Result<Json<User>> {
    let user = UserRepository::new(state.pool())
        .get_by_id(params.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", params.id)))?;

    Ok(Json(user))
}

/// `POST /api/user.getPresignedUrl`
///
/// Signs a one-off `PUT` for a profile image under a fresh random key.
pub async fn get_presigned_url(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<PresignedUpload>> {
    let key = Uuid::new_v4().to_string();
    let upload = state.uploader().presign_put(&key, Utc::now())?;

    tracing::debug!(user_id = %user.id, key = %upload.key, "Presigned profile image upload");
    Ok(Json(upload))
}

/// `GET /api/user.getProfile?id=`
pub async fn get_profile(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<UserIdParams>,
) -> Result<Json<UserProfile>> {
    let user = UserRepository::new(state.pool())
        .get_by_id(params.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", params.id)))?;

    let store = LibraryRepository::new(state.pool());
    let lists = lists::public_lists_of(&store, user.id).await?;

    Ok(Json(UserProfile {
        user: ProfileUser::from(&user),
        lists,
    }))
}

/// `POST /api/user.delete`
///
/// Deletes the caller's own account and ends the session.
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
    ApiJson(params): ApiJson<UserIdParams>,
) -> Result<Json<DeletedUser>> {
    let repo = UserRepository::new(state.pool());
    let target = repo.get_by_id(params.id).await?;
    users::authorize_deletion(target.as_ref(), current.id)?;

    repo.delete(params.id).await.map_err(not_found_or)?;
    session.flush().await?;
    clear_sentry_user();

    tracing::info!(user_id = %params.id, "Deleted account");
    Ok(Json(DeletedUser { id: params.id }))
}

/// `GET /api/user.getListInfo`
pub async fn get_list_info(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<ListInfo>> {
    let store = LibraryRepository::new(state.pool());
    Ok(Json(lists::list_info(&store, user.id).await?))
}
