/// User model and database operations
///
/// This module provides the User model and CRUD operations for accounts that
/// can hold devices. Passwords are stored as Argon2id digests, never in
/// plaintext, and the digest is excluded from serialized representations.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id BIGSERIAL PRIMARY KEY,
///     username TEXT NOT NULL UNIQUE,
///     password_digest TEXT NOT NULL,
///     email TEXT NOT NULL,
///     image_path TEXT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use devicedesk_shared::models::user::{CreateUser, User};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let user = User::create(&pool, CreateUser {
///     username: "jorge".to_string(),
///     password_digest: "$argon2id$...".to_string(),
///     email: "jorge@example.com".to_string(),
/// }).await?;
///
/// let found = User::find_by_username(&pool, "jorge").await?;
/// assert_eq!(found.map(|u| u.id), Some(user.id));
/// # Ok(())
/// # }
/// ```
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

/// User model representing an account that can hold devices
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID, assigned by the store on creation
    pub id: i64,

    /// Login name (unique across all users)
    pub username: String,

    /// Argon2id password digest (PHC string)
    ///
    /// Never serialized into API responses.
    #[serde(skip_serializing)]
    pub password_digest: String,

    /// Contact email (no uniqueness requirement)
    pub email: String,

    /// Reference path into the blob store (None until an image is uploaded)
    pub image_path: Option<String>,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user
///
/// `password_digest` is the output of the credential hasher, not a plaintext
/// password.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,
    pub password_digest: String,
    pub email: String,
}

impl User {
    /// Creates a new user
    ///
    /// # Errors
    ///
    /// Returns an error if the username already exists (unique constraint)
    /// or the database operation fails.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_digest, email)
            VALUES ($1, $2, $3)
            RETURNING id, username, password_digest, email, image_path,
                      created_at, updated_at
            "#,
        )
        .bind(data.username)
        .bind(data.password_digest)
        .bind(data.email)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_digest, email, image_path,
                   created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by username
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_digest, email, image_path,
                   created_at, updated_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Lists all users, ordered by ID
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_digest, email, image_path,
                   created_at, updated_at
            FROM users
            ORDER BY id
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Sets the user's image reference path
    ///
    /// Returns false if the user does not exist.
    pub async fn attach_image(pool: &PgPool, id: i64, path: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET image_path = $2,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(path)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a user by ID
    ///
    /// Fails with a foreign-key violation while the user still holds
    /// devices.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
