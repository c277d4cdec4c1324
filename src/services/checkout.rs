use crate::models::{Device, DeviceSummary, HolderName};
use crate::services::device_repository::{DeviceRepository, RepositoryError};
use thiserror::Error;

pub const REGISTER_FIELDS_REQUIRED: &str = "Device name and serial number are required";
pub const TAKE_FIELDS_REQUIRED: &str = "User name and serial number are required";
pub const SERIAL_NUMBER_REQUIRED: &str = "Serial number is required";

#[derive(Error, Debug)]
pub enum CheckoutError {
    #[error("{0}")]
    Validation(&'static str),

    #[error("Device already exists")]
    Conflict,

    #[error("Device not found")]
    NotFound,

    #[error("Device is already taken")]
    AlreadyTaken,

    #[error("Device storage is unavailable")]
    Storage(#[source] sqlx::Error),
}

impl From<RepositoryError> for CheckoutError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::Conflict(_) => CheckoutError::Conflict,
            RepositoryError::NotFound(_) => CheckoutError::NotFound,
            RepositoryError::AlreadyTaken(_) => CheckoutError::AlreadyTaken,
            RepositoryError::Database(err) => CheckoutError::Storage(err),
        }
    }
}

/// Empty strings count as missing, whitespace is a value.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|it| !it.is_empty())
}

/// Checkout state machine over the device repository.
///
/// A device is `Available` after registration, becomes `CheckedOut` on take
/// and `Available` again on return. Take never succeeds on a held device,
/// even for the current holder. Return always succeeds on an existing device.
pub struct CheckoutService {
    repository: DeviceRepository,
}

impl CheckoutService {
    pub fn new(repository: DeviceRepository) -> Self {
        Self { repository }
    }

    pub async fn register(
        &self,
        device_name: &str,
        serial_number: &str,
    ) -> Result<Device, CheckoutError> {
        let (Some(device_name), Some(serial_number)) =
            (non_blank(Some(device_name)), non_blank(Some(serial_number)))
        else {
            return Err(CheckoutError::Validation(REGISTER_FIELDS_REQUIRED));
        };
        let device = self.repository.create(device_name, serial_number).await?;
        tracing::info!(
            id = device.id,
            serial_number = %device.serial_number,
            "registered device '{}'",
            device.device_name
        );
        Ok(device)
    }

    pub async fn list(&self) -> Result<Vec<DeviceSummary>, CheckoutError> {
        Ok(self.repository.list_all().await?)
    }

    pub async fn inspect(&self, serial_number: &str) -> Result<Device, CheckoutError> {
        let device = self
            .repository
            .find_by_serial(serial_number)
            .await?
            .ok_or(CheckoutError::NotFound)?;
        tracing::debug!(
            %serial_number,
            available = device.status.is_available(),
            "inspected device"
        );
        Ok(device)
    }

    pub async fn take(&self, user_name: &str, serial_number: &str) -> Result<(), CheckoutError> {
        let (Some(holder), Some(serial_number)) =
            (HolderName::new(user_name), non_blank(Some(serial_number)))
        else {
            return Err(CheckoutError::Validation(TAKE_FIELDS_REQUIRED));
        };
        self.repository.try_take(serial_number, &holder).await?;
        tracing::info!(%serial_number, %holder, "device taken");
        Ok(())
    }

    pub async fn return_device(&self, serial_number: &str) -> Result<(), CheckoutError> {
        let Some(serial_number) = non_blank(Some(serial_number)) else {
            return Err(CheckoutError::Validation(SERIAL_NUMBER_REQUIRED));
        };
        self.repository.set_holder(serial_number, None).await?;
        tracing::info!(%serial_number, "device returned");
        Ok(())
    }
}
