use crate::common::{ApiError, ApiResult};
use crate::extractors::JsonBody;
use crate::models::dtos::device::{
    DeviceStatusResponseDto, MessageResponseDto, RegisterBodyDto, ReturnBodyDto, TakeBodyDto,
};
use crate::services::checkout::{
    REGISTER_FIELDS_REQUIRED, SERIAL_NUMBER_REQUIRED, TAKE_FIELDS_REQUIRED, non_blank,
};
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;

/// Register a new device, initially available
pub async fn register(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<RegisterBodyDto>,
) -> ApiResult<impl IntoResponse> {
    let (Some(device_name), Some(serial_number)) = (
        non_blank(body.device_name.as_deref()),
        non_blank(body.serial_number.as_deref()),
    ) else {
        return Err(ApiError::BodyFieldMissing(REGISTER_FIELDS_REQUIRED));
    };
    state
        .checkout_service
        .register(device_name, serial_number)
        .await?;
    Ok(Json(MessageResponseDto::new("Device registered successfully")))
}

/// List every device as `{device_name, serial_number}`
pub async fn list(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let devices = state.checkout_service.list().await?;
    Ok(Json(devices))
}

/// Current holder of a device, `null` when available
pub async fn get_status(
    State(state): State<AppState>,
    Path(serial_number): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let device = state.checkout_service.inspect(&serial_number).await?;
    Ok(Json(DeviceStatusResponseDto::from(device)))
}

pub async fn take(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<TakeBodyDto>,
) -> ApiResult<impl IntoResponse> {
    let (Some(user_name), Some(serial_number)) = (
        non_blank(body.user_name.as_deref()),
        non_blank(body.serial_number.as_deref()),
    ) else {
        return Err(ApiError::BodyFieldMissing(TAKE_FIELDS_REQUIRED));
    };
    state
        .checkout_service
        .take(user_name, serial_number)
        .await?;
    Ok(Json(MessageResponseDto::new("Device taken successfully")))
}

pub async fn return_device(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<ReturnBodyDto>,
) -> ApiResult<impl IntoResponse> {
    let Some(serial_number) = non_blank(body.serial_number.as_deref()) else {
        return Err(ApiError::BodyFieldMissing(SERIAL_NUMBER_REQUIRED));
    };
    state.checkout_service.return_device(serial_number).await?;
    Ok(Json(MessageResponseDto::new("Device returned successfully")))
}
