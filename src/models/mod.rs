pub mod device;
pub mod dtos;

pub use device::{Device, DeviceEntity, DeviceSummary, HolderName};
