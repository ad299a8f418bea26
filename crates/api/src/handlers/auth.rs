//! Handlers for the `/auth` resource (login, me, profile, logout, register).

use aquamon_core::audit::{actions, resources};
use aquamon_core::error::CoreError;
use aquamon_core::roles::{is_known_role, ROLE_USER};
use aquamon_db::models::audit::{AuditLog, CreateAuditLog};
use aquamon_db::models::user::{CreateUser, UpdateUser, UserResponse};
use aquamon_db::repositories::{AuditLogRepo, UserRepo};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::audit;
use crate::auth::jwt::generate_access_token;
use crate::auth::password::{
    hash_password, validate_password_strength, verify_password, MIN_PASSWORD_LENGTH,
};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::client::ClientInfo;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Default and maximum number of entries returned by `GET /auth/me/activity`.
const DEFAULT_ACTIVITY_LIMIT: i64 = 50;
const MAX_ACTIVITY_LIMIT: i64 = 200;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
}

/// Successful login response.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    pub password: String,
    /// Defaults to `user`.
    pub role: Option<String>,
}

/// Request body for `PUT /auth/profile`. Absent fields are left unchanged.
#[derive(Debug, Deserialize, Validate)]
pub struct ProfileRequest {
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub name: Option<String>,
    #[validate(email(message = "must be a valid email address"))]
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ActivityParams {
    pub limit: Option<i64>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/login
///
/// Authenticate with email + password. Returns an access token.
pub async fn login(
    State(state): State<AppState>,
    client: ClientInfo,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    input.validate()?;

    let invalid = || {
        AppError::Core(CoreError::Unauthorized(
            "Invalid email or password".into(),
        ))
    };

    let user = UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(invalid)?;

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::info!(user_id = user.id, "Failed login attempt");
        return Err(invalid());
    }

    UserRepo::update_last_login(&state.pool, user.id).await?;

    let access_token = generate_access_token(user.id, &user.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    audit::record(
        &state.event_bus,
        CreateAuditLog {
            resource_id: Some(user.id),
            ..audit::entry(&client, Some(user.id), actions::LOGIN, resources::USER)
        },
    );
    tracing::info!(user_id = user.id, role = %user.role, "User logged in");

    Ok(Json(AuthResponse {
        access_token,
        token_type: "Bearer",
        expires_in: state.config.jwt.access_token_expiry_mins * 60,
        user: user.into(),
    }))
}

/// GET /api/v1/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;
    Ok(Json(DataResponse { data: user.into() }))
}

/// PUT /api/v1/auth/profile
///
/// The caller's own name, email or password. Role and active flag are
/// managed through `/users`.
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    client: ClientInfo,
    Json(input): Json<ProfileRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    input.validate()?;
    let password_hash = input.password.as_deref().map(new_password_hash).transpose()?;

    let user = UserRepo::update(
        &state.pool,
        auth.user_id,
        &UpdateUser {
            name: input.name.map(|n| n.trim().to_string()),
            email: input.email.map(|e| e.trim().to_string()),
            password_hash,
            ..Default::default()
        },
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "User",
        id: auth.user_id,
    }))?;

    audit::record(
        &state.event_bus,
        CreateAuditLog {
            resource_id: Some(user.id),
            details: Some(serde_json::json!({ "profile": true })),
            ..audit::entry(&client, Some(auth.user_id), actions::UPDATE, resources::USER)
        },
    );

    Ok(Json(DataResponse { data: user.into() }))
}

/// GET /api/v1/auth/me/activity
///
/// The caller's own recent audit entries, newest first.
pub async fn my_activity(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ActivityParams>,
) -> AppResult<Json<DataResponse<Vec<AuditLog>>>> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_ACTIVITY_LIMIT)
        .clamp(1, MAX_ACTIVITY_LIMIT);
    let entries = AuditLogRepo::list_for_user(&state.pool, auth.user_id, limit).await?;
    Ok(Json(DataResponse { data: entries }))
}

/// POST /api/v1/auth/logout
///
/// Tokens are stateless, so this only records the logout.
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
    client: ClientInfo,
) -> StatusCode {
    audit::record(
        &state.event_bus,
        CreateAuditLog {
            resource_id: Some(auth.user_id),
            ..audit::entry(&client, Some(auth.user_id), actions::LOGOUT, resources::USER)
        },
    );
    StatusCode::NO_CONTENT
}

/// POST /api/v1/auth/register
///
/// Create a user. Superadmins may assign any role; project admins may only
/// create plain users.
pub async fn register(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    client: ClientInfo,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<UserResponse>>)> {
    input.validate()?;
    let password_hash = new_password_hash(&input.password)?;

    let role = input.role.as_deref().unwrap_or(ROLE_USER);
    check_assignable_role(&admin, role)?;

    if UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(
            "A user with this email already exists".into(),
        )));
    }

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            name: input.name.trim().to_string(),
            email: input.email.trim().to_string(),
            password_hash,
            role: role.to_string(),
        },
    )
    .await?;

    audit::record(
        &state.event_bus,
        CreateAuditLog {
            resource_id: Some(user.id),
            details: Some(serde_json::json!({ "role": user.role })),
            ..audit::entry(&client, Some(admin.user_id), actions::CREATE, resources::USER)
        },
    );
    tracing::info!(user_id = user.id, created_by = admin.user_id, "User registered");

    Ok((StatusCode::CREATED, Json(DataResponse { data: user.into() })))
}

/// Check strength and hash a password chosen by a user.
pub(crate) fn new_password_hash(password: &str) -> AppResult<String> {
    validate_password_strength(password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    hash_password(password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))
}

/// Reject unknown roles and role escalation by project admins.
pub(crate) fn check_assignable_role(admin: &AuthUser, role: &str) -> AppResult<()> {
    if !is_known_role(role) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Unknown role: {role}"
        ))));
    }
    if !admin.is_superadmin() && role != ROLE_USER {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only a superadmin can assign elevated roles".into(),
        )));
    }
    Ok(())
}
