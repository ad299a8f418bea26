//! Handlers for the `/projects` resource.
//!
//! Reads are open to superadmins, the project admin and members. Writes
//! need the project admin (or a superadmin); creating and deleting
//! projects is superadmin-only.

use aquamon_core::api_keys::generate_api_key;
use aquamon_core::audit::{actions, resources};
use aquamon_core::error::CoreError;
use aquamon_core::types::DbId;
use aquamon_db::models::audit::CreateAuditLog;
use aquamon_db::models::project::{CreateProject, Project, ProjectMember, UpdateProject};
use aquamon_db::repositories::{ProjectRepo, UserRepo};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::access::{ensure_project_access, ensure_project_admin, load_project};
use crate::audit;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::client::ClientInfo;
use crate::middleware::rbac::RequireSuperAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub name: String,
    pub description: Option<String>,
    pub location: Option<String>,
    /// Defaults to the creating superadmin.
    pub admin_id: Option<DbId>,
}

#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub user_id: DbId,
}

/// A project plus its plaintext API key. Only returned on create and
/// regenerate; the key cannot be recovered afterwards.
#[derive(Debug, Serialize)]
pub struct ProjectWithKey {
    #[serde(flatten)]
    pub project: Project,
    pub api_key: String,
}

#[derive(Debug, Serialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    pub members: Vec<ProjectMember>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/projects
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<Vec<Project>>>> {
    let projects = if auth.is_superadmin() {
        ProjectRepo::list_all(&state.pool).await?
    } else {
        ProjectRepo::list_for_user(&state.pool, auth.user_id).await?
    };
    Ok(Json(DataResponse { data: projects }))
}

/// GET /api/v1/projects/{id}
pub async fn get(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ProjectDetail>>> {
    let project = load_project(&state.pool, id).await?;
    ensure_project_access(&state.pool, &auth, id).await?;
    let members = ProjectRepo::list_members(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: ProjectDetail { project, members },
    }))
}

/// POST /api/v1/projects
pub async fn create(
    State(state): State<AppState>,
    RequireSuperAdmin(admin): RequireSuperAdmin,
    client: ClientInfo,
    Json(input): Json<CreateProjectRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<ProjectWithKey>>)> {
    input.validate()?;

    let admin_id = input.admin_id.unwrap_or(admin.user_id);
    ensure_user_exists(&state, admin_id).await?;

    let key = generate_api_key();
    let project = ProjectRepo::create(
        &state.pool,
        &CreateProject {
            name: input.name.trim().to_string(),
            description: input.description,
            location: input.location,
            admin_id,
            api_key_hash: key.hash,
            api_key_prefix: key.prefix,
        },
    )
    .await?;

    audit::record(
        &state.event_bus,
        CreateAuditLog {
            resource_id: Some(project.id),
            ..audit::entry(&client, Some(admin.user_id), actions::CREATE, resources::PROJECT)
        },
    );
    tracing::info!(project_id = project.id, admin_id, "Project created");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: ProjectWithKey {
                project,
                api_key: key.plaintext,
            },
        }),
    ))
}

/// PUT /api/v1/projects/{id}
///
/// Reassigning the project admin is superadmin-only.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    client: ClientInfo,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProject>,
) -> AppResult<Json<DataResponse<Project>>> {
    ensure_project_admin(&state.pool, &auth, id).await?;

    if let Some(admin_id) = input.admin_id {
        if !auth.is_superadmin() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Only a superadmin can reassign the project admin".into(),
            )));
        }
        ensure_user_exists(&state, admin_id).await?;
    }
    if input.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::Core(CoreError::Validation(
            "name must not be empty".into(),
        )));
    }

    let project = ProjectRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;

    audit::record(
        &state.event_bus,
        CreateAuditLog {
            resource_id: Some(id),
            ..audit::entry(&client, Some(auth.user_id), actions::UPDATE, resources::PROJECT)
        },
    );

    Ok(Json(DataResponse { data: project }))
}

/// DELETE /api/v1/projects/{id}
///
/// Removes the project with its devices and memberships. Stored readings
/// and threshold overrides keep their rows.
pub async fn delete(
    State(state): State<AppState>,
    RequireSuperAdmin(admin): RequireSuperAdmin,
    client: ClientInfo,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !ProjectRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }));
    }

    audit::record(
        &state.event_bus,
        CreateAuditLog {
            resource_id: Some(id),
            ..audit::entry(&client, Some(admin.user_id), actions::DELETE, resources::PROJECT)
        },
    );
    tracing::info!(project_id = id, "Project deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/projects/{id}/regenerate-key
pub async fn regenerate_key(
    State(state): State<AppState>,
    auth: AuthUser,
    client: ClientInfo,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ProjectWithKey>>> {
    ensure_project_admin(&state.pool, &auth, id).await?;

    let key = generate_api_key();
    let project = ProjectRepo::rotate_api_key(&state.pool, id, &key.hash, &key.prefix)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;

    audit::record(
        &state.event_bus,
        CreateAuditLog {
            resource_id: Some(id),
            details: Some(serde_json::json!({ "api_key": "regenerated" })),
            ..audit::entry(&client, Some(auth.user_id), actions::UPDATE, resources::PROJECT)
        },
    );
    tracing::info!(project_id = id, prefix = %project.api_key_prefix, "API key regenerated");

    Ok(Json(DataResponse {
        data: ProjectWithKey {
            project,
            api_key: key.plaintext,
        },
    }))
}

// ---------------------------------------------------------------------------
// Membership
// ---------------------------------------------------------------------------

/// GET /api/v1/projects/{id}/members
pub async fn list_members(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<ProjectMember>>>> {
    load_project(&state.pool, id).await?;
    ensure_project_access(&state.pool, &auth, id).await?;
    let members = ProjectRepo::list_members(&state.pool, id).await?;
    Ok(Json(DataResponse { data: members }))
}

/// POST /api/v1/projects/{id}/members
pub async fn add_member(
    State(state): State<AppState>,
    auth: AuthUser,
    client: ClientInfo,
    Path(id): Path<DbId>,
    Json(input): Json<AddMemberRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Vec<ProjectMember>>>)> {
    ensure_project_admin(&state.pool, &auth, id).await?;
    ensure_user_exists(&state, input.user_id).await?;

    ProjectRepo::add_member(&state.pool, id, input.user_id).await?;

    audit::record(
        &state.event_bus,
        CreateAuditLog {
            resource_id: Some(id),
            details: Some(serde_json::json!({ "added_user_id": input.user_id })),
            ..audit::entry(&client, Some(auth.user_id), actions::UPDATE, resources::PROJECT)
        },
    );

    let members = ProjectRepo::list_members(&state.pool, id).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: members })))
}

/// DELETE /api/v1/projects/{id}/members/{user_id}
pub async fn remove_member(
    State(state): State<AppState>,
    auth: AuthUser,
    client: ClientInfo,
    Path((id, user_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    ensure_project_admin(&state.pool, &auth, id).await?;

    if !ProjectRepo::remove_member(&state.pool, id, user_id).await? {
        return Err(AppError::NotFound(format!(
            "User {user_id} is not a member of project {id}"
        )));
    }

    audit::record(
        &state.event_bus,
        CreateAuditLog {
            resource_id: Some(id),
            details: Some(serde_json::json!({ "removed_user_id": user_id })),
            ..audit::entry(&client, Some(auth.user_id), actions::UPDATE, resources::PROJECT)
        },
    );

    Ok(StatusCode::NO_CONTENT)
}

async fn ensure_user_exists(state: &AppState, user_id: DbId) -> AppResult<()> {
    UserRepo::find_by_id(&state.pool, user_id)
        .await?
        .map(|_| ())
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user_id,
        }))
}
