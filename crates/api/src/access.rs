//! Project-level authorization helpers shared by handlers.
//!
//! Superadmins see everything. Everyone else sees the projects they
//! administer or belong to, and may administer only the projects whose
//! `admin_id` is theirs.

use aquamon_core::error::CoreError;
use aquamon_core::roles::ROLE_PROJECT_ADMIN;
use aquamon_core::types::DbId;
use aquamon_db::models::project::Project;
use aquamon_db::repositories::ProjectRepo;
use aquamon_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;

/// Project ids the user may read, or `None` when unrestricted.
pub async fn accessible_projects(
    pool: &DbPool,
    user: &AuthUser,
) -> Result<Option<Vec<DbId>>, sqlx::Error> {
    if user.is_superadmin() {
        return Ok(None);
    }
    ProjectRepo::accessible_ids(pool, user.user_id).await.map(Some)
}

/// Load a project, failing with 404 when absent.
pub async fn load_project(pool: &DbPool, project_id: DbId) -> AppResult<Project> {
    ProjectRepo::find_by_id(pool, project_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id: project_id,
        }))
}

/// Fail with 403 unless the user may read `project_id`.
pub async fn ensure_project_access(
    pool: &DbPool,
    user: &AuthUser,
    project_id: DbId,
) -> AppResult<()> {
    if user.is_superadmin() || ProjectRepo::has_access(pool, project_id, user.user_id).await? {
        return Ok(());
    }
    Err(AppError::Core(CoreError::Forbidden(
        "You do not have access to this project".into(),
    )))
}

/// Load `project_id` and fail with 403 unless the user administers it.
pub async fn ensure_project_admin(
    pool: &DbPool,
    user: &AuthUser,
    project_id: DbId,
) -> AppResult<Project> {
    let project = load_project(pool, project_id).await?;
    if can_administer(user, &project) {
        Ok(project)
    } else {
        Err(AppError::Core(CoreError::Forbidden(
            "Only the project admin can modify this project".into(),
        )))
    }
}

/// Superadmins administer every project; project admins only their own.
pub fn can_administer(user: &AuthUser, project: &Project) -> bool {
    user.is_superadmin() || (user.role == ROLE_PROJECT_ADMIN && project.admin_id == user.user_id)
}
