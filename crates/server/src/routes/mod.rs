//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! # Books
//! GET  /api/book.getById              - Catalog volume
//! GET  /api/book.getDescription       - Normalized, cached description
//! GET  /api/book.getLists             - Caller's lists and whether each has the book
//! POST /api/book.addToLists           - Reconcile the book's membership
//! POST /api/book.removeFromList       - Remove the book from one list
//!
//! # Lists
//! POST /api/list.create
//! GET  /api/list.getAll               - Caller's lists, newest first
//! GET  /api/list.getById              - List with books (optional auth)
//! POST /api/list.update
//! POST /api/list.delete
//!
//! # Search
//! GET  /api/search.getResultsPage     - Ten catalog results per page
//! POST /api/search.addToHistory
//! GET  /api/search.getHistory         - Five most recent queries
//!
//! # Users
//! POST /api/user.update
//! GET  /api/user.get                  - Public
//! POST /api/user.getPresignedUrl      - Profile image upload URL
//! GET  /api/user.getProfile           - Public profile and public lists
//! POST /api/user.delete
//! GET  /api/user.getListInfo
//!
//! # Auth
//! GET  /auth/google/login             - Redirect to Google
//! GET  /auth/google/callback          - Handle OAuth callback
//! POST /auth/logout
//! ```

pub mod auth;
pub mod book;
pub mod extract;
pub mod list;
pub mod search;
pub mod user;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/google/login", get(auth::login))
        .route("/google/callback", get(auth::callback))
        .route("/logout", post(auth::logout))
}

/// Create the RPC procedure router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/book.getById", get(book::get_by_id))
        .route("/book.getDescription", get(book::get_description))
        .route("/book.getLists", get(book::get_lists))
        .route("/book.addToLists", post(book::add_to_lists))
        .route("/book.removeFromList", post(book::remove_from_list))
        .route("/list.create", post(list::create))
        .route("/list.getAll", get(list::get_all))
        .route("/list.getById", get(list::get_by_id))
        .route("/list.update", post(list::update))
        .route("/list.delete", post(list::delete))
        .route("/search.getResultsPage", get(search::get_results_page))
        .route("/search.addToHistory", post(search::add_to_history))
        .route("/search.getHistory", get(search::get_history))
        .route("/user.update", post(user::update))
        .route("/user.get", get(user::get))
        .route("/user.getPresignedUrl", post(user::get_presigned_url))
        .route("/user.getProfile", get(user::get_profile))
        .route("/user.delete", post(user::delete))
        .route("/user.getListInfo", get(user::get_list_info))
}

/// Create all routes for the server.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api", api_routes())
        .nest("/auth", auth_routes())
}
