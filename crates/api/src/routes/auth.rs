//! Route definitions for the `/auth` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST /login        -> login (public)
/// GET  /me           -> me
/// GET  /profile      -> me
/// PUT  /profile      -> update_profile
/// GET  /me/activity  -> my_activity
/// POST /logout       -> logout
/// POST /register     -> register (superadmin, projectadmin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/me", get(auth::me))
        .route("/profile", get(auth::me).put(auth::update_profile))
        .route("/me/activity", get(auth::my_activity))
        .route("/logout", post(auth::logout))
        .route("/register", post(auth::register))
}
