use crate::models::{Device, HolderName};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub struct RegisterBodyDto {
    #[serde(default)]
    pub device_name: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TakeBodyDto {
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReturnBodyDto {
    #[serde(default)]
    pub serial_number: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct DeviceStatusResponseDto {
    pub device_name: String,
    pub holder: Option<HolderName>,
}

impl From<Device> for DeviceStatusResponseDto {
    fn from(device: Device) -> Self {
        Self {
            holder: device.status.holder().cloned(),
            device_name: device.device_name,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct MessageResponseDto {
    pub message: &'static str,
}

impl MessageResponseDto {
    pub fn new(message: &'static str) -> Self {
        Self { message }
    }
}
