/// Device endpoints
///
/// CRUD over devices plus the assignment endpoints. The assignment
/// endpoints are the only path that mutates `holder_id`; both map to a
/// single conditional update in the model, so two concurrent checkouts of
/// the same device cannot both succeed.
///
/// # Endpoints
///
/// - `GET /devices` - list devices
/// - `GET /devices/:id` - get one device
/// - `POST /devices` - create device
/// - `PUT /devices/:id` - overwrite descriptive fields
/// - `DELETE /devices/:id` - delete device
/// - `POST /devices/:id/checkout` - check out to a user
/// - `POST /devices/:id/checkin` - check back in
/// - `GET /user/:user_id/devices` - devices held by a user
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use devicedesk_shared::models::device::{CreateDevice, Device, UpdateDevice};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Create/update device request body
///
/// Missing fields deserialize to empty strings so that omission and empty
/// input fail validation the same way, with a 400 rather than a
/// deserialization rejection.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct DeviceFieldsRequest {
    #[validate(length(min = 1, message = "device_name is required"))]
    pub device_name: String,

    pub description: String,

    #[validate(length(min = 1, message = "serial_number is required"))]
    pub serial_number: String,

    pub manufacturer: String,
}

/// Create device response
#[derive(Debug, Serialize)]
pub struct CreateDeviceResponse {
    /// ID assigned by the store
    pub id: i64,
}

/// Checkout request body
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CheckoutRequest {
    /// User the device should be assigned to
    #[serde(rename = "userId")]
    pub user_id: Option<i64>,
}

/// Checkout response
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    /// Device that changed state
    pub id: i64,

    /// The new holder
    pub holder_id: i64,
}

/// Generic message response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Lists all devices
pub async fn list_devices(State(state): State<AppState>) -> ApiResult<Json<Vec<Device>>> {
    let devices = Device::list(&state.db).await?;
    Ok(Json(devices))
}

/// Gets a single device by ID
pub async fn get_device(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Device>> {
    let device = Device::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Device not found".to_string()))?;

    Ok(Json(device))
}

/// Creates a new device
///
/// The device starts out available (`holder_id` absent).
pub async fn create_device(
    State(state): State<AppState>,
    Json(req): Json<DeviceFieldsRequest>,
) -> ApiResult<(StatusCode, Json<CreateDeviceResponse>)> {
    req.validate()?;

    let device = Device::create(
        &state.db,
        CreateDevice {
            device_name: req.device_name,
            description: req.description,
            serial_number: req.serial_number,
            manufacturer: req.manufacturer,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(CreateDeviceResponse { id: device.id })))
}

/// Overwrites a device's four descriptive fields
///
/// Last-writer-wins; `holder_id` and `image_path` are untouched, so a
/// concurrent assignment transition operates on disjoint columns.
pub async fn update_device(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<DeviceFieldsRequest>,
) -> ApiResult<Json<Device>> {
    req.validate()?;

    let device = Device::update(
        &state.db,
        id,
        UpdateDevice {
            device_name: req.device_name,
            description: req.description,
            serial_number: req.serial_number,
            manufacturer: req.manufacturer,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Device not found".to_string()))?;

    Ok(Json(device))
}

/// Deletes a device
pub async fn delete_device(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    let deleted = Device::delete(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Device not found".to_string()));
    }

    Ok(Json(MessageResponse {
        message: format!("Device {} deleted", id),
    }))
}

/// Checks a device out to a user
///
/// `userId` is required and checked before the store is touched. The
/// transition itself is a single conditional update; when two callers race
/// for the same device, exactly one sees success and the other gets a 400.
pub async fn checkout_device(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<CheckoutRequest>,
) -> ApiResult<Json<CheckoutResponse>> {
    let user_id = req
        .user_id
        .ok_or_else(|| ApiError::BadRequest("userId is required".to_string()))?;

    match Device::checkout(&state.db, id, user_id).await? {
        Some(device) => {
            tracing::info!(device_id = device.id, holder_id = user_id, "Device checked out");
            Ok(Json(CheckoutResponse {
                id: device.id,
                holder_id: user_id,
            }))
        }
        None => Err(ApiError::NotAvailable(
            "Device is not available or does not exist".to_string(),
        )),
    }
}

/// Checks a device back in
pub async fn checkin_device(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    match Device::checkin(&state.db, id).await? {
        Some(device) => {
            tracing::info!(device_id = device.id, "Device checked in");
            Ok(Json(MessageResponse {
                message: format!("Device {} checked in", device.id),
            }))
        }
        None => Err(ApiError::NotAvailable(
            "Device is not checked out or does not exist".to_string(),
        )),
    }
}

/// Lists all devices currently held by a user
pub async fn list_user_devices(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<Vec<Device>>> {
    let devices = Device::list_by_holder(&state.db, user_id).await?;
    Ok(Json(devices))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_request_accepts_missing_user_id() {
        let req: CheckoutRequest = serde_json::from_str("{}").unwrap();
        assert!(req.user_id.is_none());

        let req: CheckoutRequest = serde_json::from_str(r#"{"userId": 42}"#).unwrap();
        assert_eq!(req.user_id, Some(42));
    }

    #[test]
    fn test_device_fields_validation() {
        let req: DeviceFieldsRequest =
            serde_json::from_str(r#"{"device_name": "Laptop-1", "serial_number": "SN1"}"#).unwrap();
        assert!(req.validate().is_ok());
        assert!(req.description.is_empty());

        let req: DeviceFieldsRequest = serde_json::from_str("{}").unwrap();
        assert!(req.validate().is_err());
    }
}
