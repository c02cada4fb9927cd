//! Repository for the `users` table and its `user_roles` join.
//!
//! Users are never hard-deleted; the admin "delete" operation sets the
//! `disabled` status. Creating or re-roling a user touches two tables
//! and therefore runs in one transaction.

use sqlx::{PgPool, Postgres, Transaction};
use stocktake_core::types::DbId;

use crate::models::user::{UpdateUser, User, UserRow};

const COLUMNS: &str = "id, email, full_name, phone, status, avatar_url, password_hash, \
     last_login_at, created_at, updated_at";

/// Provides account operations for platform users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user with the given role names, atomically.
    ///
    /// The caller validates the payload and hashes the password; role
    /// names were checked against [`UserRepo::find_role_ids`] first.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        pool: &PgPool,
        email: &str,
        full_name: &str,
        phone: Option<&str>,
        status: &str,
        avatar_url: Option<&str>,
        password_hash: &str,
        role_ids: &[DbId],
    ) -> Result<User, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let insert_query = format!(
            "INSERT INTO users (email, full_name, phone, status, avatar_url, password_hash) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&insert_query)
            .bind(email)
            .bind(full_name)
            .bind(phone)
            .bind(status)
            .bind(avatar_url)
            .bind(password_hash)
            .fetch_one(&mut *tx)
            .await?;

        Self::set_roles_inner(&mut tx, user.id, role_ids).await?;

        tx.commit().await?;
        Ok(user)
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email (case-insensitive).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE lower(email) = lower($1)");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Fetch all users as list rows with their roles aggregated.
    pub async fn list_rows(pool: &PgPool) -> Result<Vec<UserRow>, sqlx::Error> {
        sqlx::query_as::<_, UserRow>(
            "SELECT u.id, u.full_name, u.email, u.phone, u.status, \
                COALESCE(string_agg(r.name, ', ' ORDER BY r.name), '') AS roles, \
                u.last_login_at \
             FROM users u \
             LEFT JOIN user_roles ur ON ur.user_id = u.id \
             LEFT JOIN roles r ON r.id = ur.role_id \
             GROUP BY u.id \
             ORDER BY u.full_name, u.id",
        )
        .fetch_all(pool)
        .await
    }

    /// Role names assigned to a user, sorted.
    pub async fn get_roles(pool: &PgPool, user_id: DbId) -> Result<Vec<String>, sqlx::Error> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT r.name FROM roles r \
             JOIN user_roles ur ON ur.role_id = r.id \
             WHERE ur.user_id = $1 \
             ORDER BY r.name",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    /// Resolve role names to IDs. Names missing from the `roles` table
    /// are simply absent from the result; the handler compares lengths.
    pub async fn find_role_ids(
        pool: &PgPool,
        names: &[String],
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let rows: Vec<(DbId,)> =
            sqlx::query_as("SELECT id FROM roles WHERE name = ANY($1) ORDER BY id")
                .bind(names)
                .fetch_all(pool)
                .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Update a user's profile fields and, when `role_ids` is given,
    /// replace their role set, atomically.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateUser,
        role_ids: Option<&[DbId]>,
    ) -> Result<Option<User>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE users SET \
                email = COALESCE($2, email), \
                full_name = COALESCE($3, full_name), \
                phone = COALESCE($4, phone), \
                status = COALESCE($5, status), \
                avatar_url = COALESCE($6, avatar_url), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.email)
            .bind(&input.full_name)
            .bind(&input.phone)
            .bind(input.status.map(|s| s.as_str()))
            .bind(&input.avatar_url)
            .fetch_optional(&mut *tx)
            .await?;

        if let Some(user) = &user {
            if let Some(role_ids) = role_ids {
                sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
                    .bind(user.id)
                    .execute(&mut *tx)
                    .await?;
                Self::set_roles_inner(&mut tx, user.id, role_ids).await?;
            }
        }

        tx.commit().await?;
        Ok(user)
    }

    /// Store a new password hash. Returns `true` if a row was updated.
    pub async fn set_password_hash(
        pool: &PgPool,
        id: DbId,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(password_hash)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Soft-disable an account. Returns `true` if a live row was disabled.
    pub async fn disable(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET status = 'disabled', updated_at = NOW() \
             WHERE id = $1 AND status <> 'disabled'",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Stamp a successful login.
    pub async fn record_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    async fn set_roles_inner(
        tx: &mut Transaction<'_, Postgres>,
        user_id: DbId,
        role_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        for role_id in role_ids {
            sqlx::query(
                "INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(user_id)
            .bind(role_id)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }
}
