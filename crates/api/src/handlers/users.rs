//! Handlers for the `/users` resource.
//!
//! Admins browse and edit accounts; only a superadmin touches other admins
//! or removes accounts.

use aquamon_core::audit::{actions, resources};
use aquamon_core::error::CoreError;
use aquamon_core::roles::{ROLE_PROJECT_ADMIN, ROLE_SUPERADMIN};
use aquamon_core::types::DbId;
use aquamon_db::models::audit::CreateAuditLog;
use aquamon_db::models::user::{UpdateUser, User, UserResponse};
use aquamon_db::repositories::{ProjectRepo, UserRepo};
use aquamon_db::DbPool;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use crate::audit;
use crate::error::{AppError, AppResult};
use crate::handlers::auth::{check_assignable_role, new_password_hash};
use crate::middleware::auth::AuthUser;
use crate::middleware::client::ClientInfo;
use crate::middleware::rbac::{RequireAdmin, RequireSuperAdmin};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `PUT /users/{id}`. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub name: Option<String>,
    #[validate(email(message = "must be a valid email address"))]
    pub email: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
    pub password: Option<String>,
}

/// GET /api/v1/users
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let users = UserRepo::list(&state.pool).await?;
    Ok(Json(DataResponse {
        data: users.into_iter().map(UserResponse::from).collect(),
    }))
}

/// GET /api/v1/users/{id}
pub async fn get(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = load_user(&state.pool, id).await?;
    Ok(Json(DataResponse { data: user.into() }))
}

/// PUT /api/v1/users/{id}
///
/// Project admins may edit plain users only, and may not hand out elevated
/// roles. Nobody changes their own role or active flag here.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    client: ClientInfo,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUserRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    input.validate()?;

    let target = load_user(&state.pool, id).await?;
    check_user_edit(&admin, &target, &input)?;

    let password_hash = input.password.as_deref().map(new_password_hash).transpose()?;

    let user = UserRepo::update(
        &state.pool,
        id,
        &UpdateUser {
            name: input.name.map(|n| n.trim().to_string()),
            email: input.email.map(|e| e.trim().to_string()),
            password_hash,
            role: input.role,
            is_active: input.is_active,
        },
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    audit::record(
        &state.event_bus,
        CreateAuditLog {
            resource_id: Some(id),
            details: Some(serde_json::json!({
                "role": user.role,
                "is_active": user.is_active,
            })),
            ..audit::entry(&client, Some(admin.user_id), actions::UPDATE, resources::USER)
        },
    );
    tracing::info!(user_id = id, updated_by = admin.user_id, "User updated");

    Ok(Json(DataResponse { data: user.into() }))
}

/// DELETE /api/v1/users/{id}
///
/// Superadmins cannot be deleted, nor can a user who still administers a
/// project.
pub async fn delete(
    State(state): State<AppState>,
    RequireSuperAdmin(admin): RequireSuperAdmin,
    client: ClientInfo,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let target = load_user(&state.pool, id).await?;
    if target.role == ROLE_SUPERADMIN {
        return Err(AppError::BadRequest(
            "Cannot delete a superadmin user".into(),
        ));
    }

    let administered = ProjectRepo::count_administered_by(&state.pool, id).await?;
    if administered > 0 {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "User still administers {administered} project(s); reassign them first"
        ))));
    }

    if !UserRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "User", id }));
    }

    audit::record(
        &state.event_bus,
        CreateAuditLog {
            resource_id: Some(id),
            details: Some(serde_json::json!({ "email": target.email })),
            ..audit::entry(&client, Some(admin.user_id), actions::DELETE, resources::USER)
        },
    );
    tracing::info!(user_id = id, deleted_by = admin.user_id, "User deleted");

    Ok(StatusCode::NO_CONTENT)
}

async fn load_user(pool: &DbPool, id: DbId) -> AppResult<User> {
    UserRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))
}

/// Role rules for editing `target`.
fn check_user_edit(admin: &AuthUser, target: &User, input: &UpdateUserRequest) -> AppResult<()> {
    let target_is_admin = target.role == ROLE_SUPERADMIN || target.role == ROLE_PROJECT_ADMIN;
    if target_is_admin && !admin.is_superadmin() {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only a superadmin can update admin users".into(),
        )));
    }

    if target.id == admin.user_id {
        let role_change = input.role.as_deref().is_some_and(|r| r != target.role);
        if role_change || input.is_active == Some(false) {
            return Err(AppError::BadRequest(
                "You cannot change your own role or deactivate yourself".into(),
            ));
        }
    }

    if let Some(role) = input.role.as_deref() {
        check_assignable_role(admin, role)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::Utc;

    use super::*;

    fn actor(user_id: DbId, role: &str) -> AuthUser {
        AuthUser {
            user_id,
            role: role.into(),
        }
    }

    fn account(id: DbId, role: &str) -> User {
        User {
            id,
            name: "Operator".into(),
            email: "operator@farm.test".into(),
            password_hash: String::new(),
            role: role.into(),
            is_active: true,
            last_login_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn project_admin_edits_plain_users() {
        let input = UpdateUserRequest {
            name: Some("Night shift".into()),
            is_active: Some(false),
            ..Default::default()
        };
        assert!(check_user_edit(&actor(2, "projectadmin"), &account(9, "user"), &input).is_ok());
    }

    #[test]
    fn project_admin_cannot_edit_admins() {
        let input = UpdateUserRequest::default();
        for role in ["projectadmin", "superadmin"] {
            assert_matches!(
                check_user_edit(&actor(2, "projectadmin"), &account(9, role), &input),
                Err(AppError::Core(CoreError::Forbidden(_)))
            );
        }
    }

    #[test]
    fn project_admin_cannot_promote() {
        let input = UpdateUserRequest {
            role: Some("projectadmin".into()),
            ..Default::default()
        };
        assert_matches!(
            check_user_edit(&actor(2, "projectadmin"), &account(9, "user"), &input),
            Err(AppError::Core(CoreError::Forbidden(_)))
        );
    }

    #[test]
    fn superadmin_may_change_roles_but_not_their_own() {
        let promote = UpdateUserRequest {
            role: Some("projectadmin".into()),
            ..Default::default()
        };
        assert!(check_user_edit(&actor(1, "superadmin"), &account(9, "user"), &promote).is_ok());

        let demote_self = UpdateUserRequest {
            role: Some("user".into()),
            ..Default::default()
        };
        assert_matches!(
            check_user_edit(&actor(1, "superadmin"), &account(1, "superadmin"), &demote_self),
            Err(AppError::BadRequest(_))
        );

        // Restating the current role is not a change.
        let same_role = UpdateUserRequest {
            role: Some("superadmin".into()),
            ..Default::default()
        };
        assert!(
            check_user_edit(&actor(1, "superadmin"), &account(1, "superadmin"), &same_role).is_ok()
        );
    }

    #[test]
    fn nobody_deactivates_themselves() {
        let input = UpdateUserRequest {
            is_active: Some(false),
            ..Default::default()
        };
        assert_matches!(
            check_user_edit(&actor(1, "superadmin"), &account(1, "superadmin"), &input),
            Err(AppError::BadRequest(_))
        );
    }

    #[test]
    fn unknown_role_is_rejected() {
        let input = UpdateUserRequest {
            role: Some("owner".into()),
            ..Default::default()
        };
        assert_matches!(
            check_user_edit(&actor(1, "superadmin"), &account(9, "user"), &input),
            Err(AppError::Core(CoreError::Validation(_)))
        );
    }
}
