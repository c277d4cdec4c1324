use serde::Serialize;
use std::fmt::{Display, Formatter};
use std::ops::Deref;

/// Name of the user a device is checked out to. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HolderName(String);

impl HolderName {
    /// Returns `None` for an empty name.
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        if name.is_empty() {
            None
        } else {
            Some(Self(name))
        }
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for HolderName {
    type Target = str;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for HolderName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceStatus {
    Available,
    CheckedOut { holder: HolderName },
}

impl DeviceStatus {
    pub fn holder(&self) -> Option<&HolderName> {
        match self {
            DeviceStatus::Available => None,
            DeviceStatus::CheckedOut { holder } => Some(holder),
        }
    }
    pub fn is_available(&self) -> bool {
        matches!(self, DeviceStatus::Available)
    }
}

impl From<Option<String>> for DeviceStatus {
    fn from(value: Option<String>) -> Self {
        match value.and_then(HolderName::new) {
            Some(holder) => DeviceStatus::CheckedOut { holder },
            None => DeviceStatus::Available,
        }
    }
}

/// Row of the `devices` table as stored.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DeviceEntity {
    pub id: i64,
    pub device_name: String,
    pub serial_number: String,
    pub holder: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub id: i64,
    pub device_name: String,
    pub serial_number: String,
    pub status: DeviceStatus,
}

impl From<DeviceEntity> for Device {
    fn from(entity: DeviceEntity) -> Self {
        Self {
            id: entity.id,
            device_name: entity.device_name,
            serial_number: entity.serial_number,
            status: DeviceStatus::from(entity.holder),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct DeviceSummary {
    pub device_name: String,
    pub serial_number: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_holder_name_rejects_empty() {
        assert!(HolderName::new("").is_none());
        assert_eq!(HolderName::new("   ").unwrap().as_str(), "   ");
        assert_eq!(HolderName::new("alice").unwrap().as_str(), "alice");
    }

    #[test]
    fn test_status_from_column() {
        assert_eq!(DeviceStatus::from(None), DeviceStatus::Available);
        assert_eq!(DeviceStatus::from(Some(String::new())), DeviceStatus::Available);
        let status = DeviceStatus::from(Some("bob".to_string()));
        assert!(!status.is_available());
        assert_eq!(status.holder().map(|it| it.as_str()), Some("bob"));
    }
}
