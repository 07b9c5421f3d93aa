//! Google sign-in route handlers.
//!
//! - Login: stores CSRF state and a PKCE verifier, redirects to Google
//! - Callback: verifies state, exchanges the code, upserts the user and
//!   stores `CurrentUser` in the session
//! - Logout: flushes the session

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::db::UserRepository;
use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::google_auth::{generate_random_string, pkce_challenge};
use crate::middleware::set_current_user;
use crate::models::{CurrentUser, session_keys};
use crate::state::AppState;

/// Where the browser goes when sign-in fails.
const SIGN_IN_FAILED: &str = "/?error=sign_in";

/// Query parameters from the Google OAuth callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code to exchange for tokens.
    pub code: Option<String>,
    /// State parameter for CSRF protection.
    pub state: Option<String>,
    /// Error code if authorization failed.
    pub error: Option<String>,
}

/// Start Google sign-in.
///
/// # Route
///
/// `GET /auth/google/login`
pub async fn login(State(state): State<AppState>, session: Session) -> Response {
    let oauth_state = generate_random_string(32);
    let verifier = generate_random_string(64);

    if let Err(e) = session
        .insert(session_keys::GOOGLE_OAUTH_STATE, &oauth_state)
        .await
    {
        tracing::error!(error = %e, "Failed to store OAuth state in session");
        return Redirect::to(SIGN_IN_FAILED).into_response();
    }

    if let Err(e) = session
        .insert(session_keys::GOOGLE_PKCE_VERIFIER, &verifier)
        .await
    {
        tracing::error!(error = %e, "Failed to store PKCE verifier in session");
        return Redirect::to(SIGN_IN_FAILED).into_response();
    }

    let auth_url = state.google().authorization_url(
        &state.config().oauth_redirect_uri(),
        &oauth_state,
        &pkce_challenge(&verifier),
    );

    Redirect::to(&auth_url).into_response()
}

/// Finish Google sign-in.
///
/// New users land on `/setup` to pick a display name; returning users who
/// finished onboarding go to `/dashboard`.
///
/// # Route
///
/// `GET /auth/google/callback`
pub async fn callback(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CallbackQuery>,
) -> Response {
    if let Some(error) = query.error {
        tracing::warn!(error = %error, "Google OAuth error");
        return Redirect::to(SIGN_IN_FAILED).into_response();
    }

    let (Some(code), Some(returned_state)) = (query.code, query.state) else {
        tracing::warn!("Google OAuth callback missing code or state");
        return Redirect::to(SIGN_IN_FAILED).into_response();
    };

    let stored_state: Option<String> = session
        .remove(session_keys::GOOGLE_OAUTH_STATE)
        .await
        .ok()
        .flatten();
    let verifier: Option<String> = session
        .remove(session_keys::GOOGLE_PKCE_VERIFIER)
        .await
        .ok()
        .flatten();

    if stored_state.as_deref() != Some(returned_state.as_str()) {
        tracing::warn!("Google OAuth state mismatch");
        return Redirect::to(SIGN_IN_FAILED).into_response();
    }
    let Some(verifier) = verifier else {
        tracing::warn!("Google OAuth callback without PKCE verifier");
        return Redirect::to(SIGN_IN_FAILED).into_response();
    };

    match complete_sign_in(&state, &session, &code, &verifier).await {
        Ok(user) if user.setup_completed => Redirect::to("/dashboard").into_response(),
        Ok(_) => Redirect::to("/setup").into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Google sign-in failed");
            Redirect::to(SIGN_IN_FAILED).into_response()
        }
    }
}

async fn complete_sign_in(
    state: &AppState,
    session: &Session,
    code: &str,
    verifier: &str,
) -> Result<CurrentUser, AppError> {
    let google = state.google();
    let access_token = google
        .exchange_code(code, &state.config().oauth_redirect_uri(), verifier)
        .await?;
    let identity = google.userinfo(&access_token).await?;

    let user = UserRepository::new(state.pool())
        .upsert_google(&identity)
        .await?;
    let current = CurrentUser::from(&user);

    // New session id on privilege change
    session.cycle_id().await?;
    set_current_user(session, &current).await?;
    set_sentry_user(&user.id);

    tracing::info!(user_id = %user.id, "User signed in");
    Ok(current)
}

/// Sign out.
///
/// # Route
///
/// `POST /auth/logout`
pub async fn logout(session: Session) -> Result<StatusCode, AppError> {
    session.flush().await?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}
