/// Device model and database operations
///
/// This module provides the Device model representing a tracked piece of
/// equipment, together with its CRUD operations and the checkout/check-in
/// assignment operations.
///
/// # State Machine
///
/// Assignment state is carried entirely by the nullable `holder_id` column:
///
/// ```text
/// Available (holder_id IS NULL) → CheckedOut(holder) → Available
/// ```
///
/// Both transitions are single conditional UPDATE statements guarded on the
/// current state. Concurrent callers race at the database, and row-level
/// atomicity guarantees at most one of them matches the guard. No in-process
/// locking is involved, so the invariant holds across multiple server
/// processes sharing the same database.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE devices (
///     id BIGSERIAL PRIMARY KEY,
///     device_name TEXT NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     serial_number TEXT NOT NULL UNIQUE,
///     manufacturer TEXT NOT NULL DEFAULT '',
///     image_path TEXT,
///     holder_id BIGINT REFERENCES users(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use devicedesk_shared::models::device::{CreateDevice, Device};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let device = Device::create(&pool, CreateDevice {
///     device_name: "Laptop-1".to_string(),
///     description: "Loaner laptop".to_string(),
///     serial_number: "SN-0001".to_string(),
///     manufacturer: "Lenovo".to_string(),
/// }).await?;
///
/// // Check it out; fails cleanly if another caller got there first.
/// let checked_out = Device::checkout(&pool, device.id, 42).await?;
/// assert!(checked_out.is_some());
/// # Ok(())
/// # }
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Assignment state of a device, derived from `holder_id`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentState {
    /// No holder; the device can be checked out
    Available,

    /// Checked out to the given user
    CheckedOut(i64),
}

impl AssignmentState {
    /// Checks whether a checkout is permitted from this state
    pub fn can_checkout(&self) -> bool {
        matches!(self, AssignmentState::Available)
    }

    /// Checks whether a check-in is permitted from this state
    pub fn can_checkin(&self) -> bool {
        matches!(self, AssignmentState::CheckedOut(_))
    }
}

/// Device model representing a tracked piece of equipment
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Device {
    /// Unique device ID, assigned by the store on creation
    pub id: i64,

    /// Human-readable device name
    pub device_name: String,

    /// Free-form description
    pub description: String,

    /// Manufacturer serial number (unique per device)
    pub serial_number: String,

    /// Manufacturer name
    pub manufacturer: String,

    /// Reference path into the blob store (None until an image is uploaded)
    pub image_path: Option<String>,

    /// Current holder (None = available, Some = checked out to that user)
    pub holder_id: Option<i64>,

    /// When the device was created
    pub created_at: DateTime<Utc>,

    /// When the device was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new device
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDevice {
    pub device_name: String,
    pub description: String,
    pub serial_number: String,
    pub manufacturer: String,
}

/// Input for updating a device's descriptive fields
///
/// All four fields are overwritten unconditionally (last-writer-wins).
/// `holder_id` and `image_path` are never touched by the generic update;
/// assignment transitions go through [`Device::checkout`] / [`Device::checkin`]
/// and image attachment through [`Device::attach_image`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateDevice {
    pub device_name: String,
    pub description: String,
    pub serial_number: String,
    pub manufacturer: String,
}

impl Device {
    /// Returns the current assignment state of this row snapshot
    pub fn assignment_state(&self) -> AssignmentState {
        match self.holder_id {
            None => AssignmentState::Available,
            Some(holder) => AssignmentState::CheckedOut(holder),
        }
    }

    /// Creates a new device in the available state
    ///
    /// # Errors
    ///
    /// Returns an error if the serial number already exists (unique
    /// constraint) or the database operation fails.
    pub async fn create(pool: &PgPool, data: CreateDevice) -> Result<Self, sqlx::Error> {
        let device = sqlx::query_as::<_, Device>(
            r#"
            INSERT INTO devices (device_name, description, serial_number, manufacturer)
            VALUES ($1, $2, $3, $4)
            RETURNING id, device_name, description, serial_number, manufacturer,
                      image_path, holder_id, created_at, updated_at
            "#,
        )
        .bind(data.device_name)
        .bind(data.description)
        .bind(data.serial_number)
        .bind(data.manufacturer)
        .fetch_one(pool)
        .await?;

        Ok(device)
    }

    /// Finds a device by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let device = sqlx::query_as::<_, Device>(
            r#"
            SELECT id, device_name, description, serial_number, manufacturer,
                   image_path, holder_id, created_at, updated_at
            FROM devices
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(device)
    }

    /// Lists all devices, ordered by ID
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let devices = sqlx::query_as::<_, Device>(
            r#"
            SELECT id, device_name, description, serial_number, manufacturer,
                   image_path, holder_id, created_at, updated_at
            FROM devices
            ORDER BY id
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(devices)
    }

    /// Overwrites the four descriptive fields of a device
    ///
    /// This is intentionally unguarded: concurrent updates are
    /// last-writer-wins. Returns the updated row, or None if the device
    /// does not exist.
    pub async fn update(
        pool: &PgPool,
        id: i64,
        data: UpdateDevice,
    ) -> Result<Option<Self>, sqlx::Error> {
        let device = sqlx::query_as::<_, Device>(
            r#"
            UPDATE devices
            SET device_name = $2,
                description = $3,
                serial_number = $4,
                manufacturer = $5,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, device_name, description, serial_number, manufacturer,
                      image_path, holder_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.device_name)
        .bind(data.description)
        .bind(data.serial_number)
        .bind(data.manufacturer)
        .fetch_optional(pool)
        .await?;

        Ok(device)
    }

    /// Deletes a device
    ///
    /// Does not remove any blob the device's `image_path` references.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM devices WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Sets the device's image reference path
    ///
    /// Returns false if the device does not exist. The blob itself may
    /// already have been written by then (accepted orphan).
    pub async fn attach_image(pool: &PgPool, id: i64, path: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE devices
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

    /// Checks a device out to a user
    ///
    /// Single conditional update: the `holder_id IS NULL` guard is what
    /// enforces the at-most-one-holder invariant. Given two concurrent
    /// callers, exactly one matches the guard and gets the row back; the
    /// other gets None.
    ///
    /// Returns None when the device is absent or already checked out; the
    /// two cases are indistinguishable here.
    pub async fn checkout(
        pool: &PgPool,
        id: i64,
        holder_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        let device = sqlx::query_as::<_, Device>(
            r#"
            UPDATE devices
            SET holder_id = $2,
                updated_at = NOW()
            WHERE id = $1 AND holder_id IS NULL
            RETURNING id, device_name, description, serial_number, manufacturer,
                      image_path, holder_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(holder_id)
        .fetch_optional(pool)
        .await?;

        Ok(device)
    }

    /// Checks a device back in
    ///
    /// Mirror of [`Device::checkout`]: a single conditional update guarded
    /// on `holder_id IS NOT NULL`, so a concurrent checkout cannot slip
    /// between a read and the write.
    ///
    /// Returns None when the device is absent or not checked out.
    pub async fn checkin(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let device = sqlx::query_as::<_, Device>(
            r#"
            UPDATE devices
            SET holder_id = NULL,
                updated_at = NOW()
            WHERE id = $1 AND holder_id IS NOT NULL
            RETURNING id, device_name, description, serial_number, manufacturer,
                      image_path, holder_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(device)
    }

    /// Lists all devices currently held by a user, ordered by ID
    pub async fn list_by_holder(pool: &PgPool, holder_id: i64) -> Result<Vec<Self>, sqlx::Error> {
        let devices = sqlx::query_as::<_, Device>(
            r#"
            SELECT id, device_name, description, serial_number, manufacturer,
                   image_path, holder_id, created_at, updated_at
            FROM devices
            WHERE holder_id = $1
            ORDER BY id
            "#,
        )
        .bind(holder_id)
        .fetch_all(pool)
        .await?;

        Ok(devices)
    }
}
