//! Repository for the `projects` and `project_members` tables.

use aquamon_core::types::DbId;
use sqlx::PgPool;

use crate::models::project::{CreateProject, Project, ProjectMember, UpdateProject};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, description, location, admin_id, api_key_hash, \
                       api_key_prefix, is_active, created_at, updated_at";

/// Same columns qualified with the `p` alias for joined queries.
const P_COLUMNS: &str = "p.id, p.name, p.description, p.location, p.admin_id, p.api_key_hash, \
                         p.api_key_prefix, p.is_active, p.created_at, p.updated_at";

/// Provides CRUD and membership operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateProject) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (name, description, location, admin_id, api_key_hash, api_key_prefix)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.location)
            .bind(input.admin_id)
            .bind(&input.api_key_hash)
            .bind(&input.api_key_prefix)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an active project by the SHA-256 digest of its API key.
    pub async fn find_by_api_key_hash(
        pool: &PgPool,
        api_key_hash: &str,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects WHERE api_key_hash = $1 AND is_active = true"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(api_key_hash)
            .fetch_optional(pool)
            .await
    }

    /// List every project, newest first.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects ORDER BY created_at DESC");
        sqlx::query_as::<_, Project>(&query).fetch_all(pool).await
    }

    /// Projects the user administers or is a member of, newest first.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT DISTINCT {P_COLUMNS}
             FROM projects p
             LEFT JOIN project_members m ON m.project_id = p.id
             WHERE p.admin_id = $1 OR m.user_id = $1
             ORDER BY p.created_at DESC"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Ids of the projects the user administers or is a member of.
    pub async fn accessible_ids(pool: &PgPool, user_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT id FROM projects WHERE admin_id = $1
             UNION
             SELECT project_id FROM project_members WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Update a project. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProject,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                location = COALESCE($4, location),
                admin_id = COALESCE($5, admin_id),
                is_active = COALESCE($6, is_active),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.location)
            .bind(input.admin_id)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Replace the stored API key digest and prefix.
    pub async fn rotate_api_key(
        pool: &PgPool,
        id: DbId,
        api_key_hash: &str,
        api_key_prefix: &str,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET api_key_hash = $2, api_key_prefix = $3, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(api_key_hash)
            .bind(api_key_prefix)
            .fetch_optional(pool)
            .await
    }

    /// Delete a project and, through cascades, its devices and memberships.
    /// Readings keep their rows.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Number of projects whose admin is `user_id`.
    pub async fn count_administered_by(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*)::BIGINT FROM projects WHERE admin_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Membership
    // -----------------------------------------------------------------------

    /// Add a member. Adding an existing member is a no-op.
    pub async fn add_member(
        pool: &PgPool,
        project_id: DbId,
        user_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO project_members (project_id, user_id) VALUES ($1, $2)
             ON CONFLICT DO NOTHING",
        )
        .bind(project_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Remove a member. Returns `true` if the user was a member.
    pub async fn remove_member(
        pool: &PgPool,
        project_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM project_members WHERE project_id = $1 AND user_id = $2")
                .bind(project_id)
                .bind(user_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list_members(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<ProjectMember>, sqlx::Error> {
        sqlx::query_as::<_, ProjectMember>(
            "SELECT u.id AS user_id, u.name, u.email, u.role, m.created_at AS joined_at
             FROM project_members m
             JOIN users u ON u.id = m.user_id
             WHERE m.project_id = $1
             ORDER BY u.name",
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }

    /// Whether the user administers or belongs to the project.
    pub async fn has_access(
        pool: &PgPool,
        project_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (
                SELECT 1 FROM projects WHERE id = $1 AND admin_id = $2
                UNION ALL
                SELECT 1 FROM project_members WHERE project_id = $1 AND user_id = $2
             )",
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }
}
