//! Project API key extractor for device ingest.

use aquamon_core::api_keys::hash_api_key;
use aquamon_core::error::CoreError;
use aquamon_db::models::project::Project;
use aquamon_db::repositories::ProjectRepo;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the plaintext project key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// The active project whose key was presented in `x-api-key`.
///
/// The key is hashed and looked up by digest; the plaintext never touches
/// the database.
#[derive(Debug, Clone)]
pub struct ProjectApiKey(pub Project);

impl FromRequestParts<AppState> for ProjectApiKey {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let key = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| AppError::Core(CoreError::Unauthorized("API key required".into())))?;

        let project = ProjectRepo::find_by_api_key_hash(&state.pool, &hash_api_key(key))
            .await?
            .ok_or_else(|| AppError::Core(CoreError::Unauthorized("Invalid API key".into())))?;

        Ok(ProjectApiKey(project))
    }
}
