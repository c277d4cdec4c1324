use crate::models::{Device, DeviceEntity, DeviceSummary, HolderName};
use sqlx::SqlitePool;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Device with serial number '{0}' already exists")]
    Conflict(String),

    #[error("Device with serial number '{0}' not found")]
    NotFound(String),

    #[error("Device with serial number '{0}' already has a holder")]
    AlreadyTaken(String),

    #[error("Failed to access device storage")]
    Database(#[from] sqlx::Error),
}

/// Data access for the `devices` table.
///
/// Every call goes to the pool; nothing is cached between calls.
pub struct DeviceRepository {
    pool: SqlitePool,
}

impl DeviceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        device_name: &str,
        serial_number: &str,
    ) -> Result<Device, RepositoryError> {
        let entity = sqlx::query_as::<_, DeviceEntity>(
            r#"INSERT INTO devices (device_name, serial_number)
               VALUES (?, ?)
               ON CONFLICT (serial_number) DO NOTHING
               RETURNING id, device_name, serial_number, holder"#,
        )
        .bind(device_name)
        .bind(serial_number)
        .fetch_optional(&self.pool)
        .await?;
        entity
            .map(Device::from)
            .ok_or_else(|| RepositoryError::Conflict(serial_number.to_string()))
    }

    pub async fn find_by_serial(
        &self,
        serial_number: &str,
    ) -> Result<Option<Device>, RepositoryError> {
        let entity = sqlx::query_as::<_, DeviceEntity>(
            "SELECT id, device_name, serial_number, holder FROM devices WHERE serial_number = ?",
        )
        .bind(serial_number)
        .fetch_optional(&self.pool)
        .await?;
        Ok(entity.map(Device::from))
    }

    /// No ordering guarantee.
    pub async fn list_all(&self) -> Result<Vec<DeviceSummary>, RepositoryError> {
        let rows =
            sqlx::query_as::<_, DeviceSummary>("SELECT device_name, serial_number FROM devices")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows)
    }

    /// Unconditionally overwrites the holder column.
    pub async fn set_holder(
        &self,
        serial_number: &str,
        holder: Option<&HolderName>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE devices SET holder = ? WHERE serial_number = ?")
            .bind(holder.map(|it| it.as_str()))
            .bind(serial_number)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(serial_number.to_string()));
        }
        Ok(())
    }

    /// Sets the holder only if the device currently has none.
    ///
    /// The check and the write are one statement, so of two racing calls
    /// exactly one matches the row. A zero-row update is classified with a
    /// follow-up read.
    pub async fn try_take(
        &self,
        serial_number: &str,
        holder: &HolderName,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE devices SET holder = ? WHERE serial_number = ? AND holder IS NULL",
        )
        .bind(holder.as_str())
        .bind(serial_number)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 1 {
            return Ok(());
        }
        match self.find_by_serial(serial_number).await? {
            Some(_) => Err(RepositoryError::AlreadyTaken(serial_number.to_string())),
            None => Err(RepositoryError::NotFound(serial_number.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::tests::memory_pool;

    fn holder(name: &str) -> HolderName {
        HolderName::new(name).unwrap()
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repo = DeviceRepository::new(memory_pool().await);
        let device = repo.create("Laptop-7", "SN100").await.unwrap();
        assert_eq!(device.device_name, "Laptop-7");
        assert!(device.status.is_available());

        let found = repo.find_by_serial("SN100").await.unwrap().unwrap();
        assert_eq!(found, device);
        assert!(repo.find_by_serial("SN404").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_duplicate_serial_conflicts() {
        let repo = DeviceRepository::new(memory_pool().await);
        repo.create("Laptop-7", "SN100").await.unwrap();
        let err = repo.create("Other", "SN100").await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(serial) if serial == "SN100"));
        // the first registration is untouched
        let found = repo.find_by_serial("SN100").await.unwrap().unwrap();
        assert_eq!(found.device_name, "Laptop-7");
    }

    #[tokio::test]
    async fn test_ids_are_not_reused() {
        let repo = DeviceRepository::new(memory_pool().await);
        let a = repo.create("A", "SN1").await.unwrap();
        let _ = repo.create("A again", "SN1").await;
        let b = repo.create("B", "SN2").await.unwrap();
        assert!(b.id > a.id);
    }

    #[tokio::test]
    async fn test_list_all() {
        let repo = DeviceRepository::new(memory_pool().await);
        assert!(repo.list_all().await.unwrap().is_empty());
        repo.create("A", "SN1").await.unwrap();
        repo.create("B", "SN2").await.unwrap();
        let mut rows = repo.list_all().await.unwrap();
        rows.sort_by(|a, b| a.serial_number.cmp(&b.serial_number));
        assert_eq!(
            rows,
            vec![
                DeviceSummary {
                    device_name: "A".into(),
                    serial_number: "SN1".into()
                },
                DeviceSummary {
                    device_name: "B".into(),
                    serial_number: "SN2".into()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_set_holder() {
        let repo = DeviceRepository::new(memory_pool().await);
        repo.create("A", "SN1").await.unwrap();
        repo.set_holder("SN1", Some(&holder("alice"))).await.unwrap();
        let device = repo.find_by_serial("SN1").await.unwrap().unwrap();
        assert_eq!(device.status.holder(), Some(&holder("alice")));

        repo.set_holder("SN1", None).await.unwrap();
        // clearing twice still matches the row
        repo.set_holder("SN1", None).await.unwrap();
        let device = repo.find_by_serial("SN1").await.unwrap().unwrap();
        assert!(device.status.is_available());

        let err = repo.set_holder("SN404", None).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_try_take() {
        let repo = DeviceRepository::new(memory_pool().await);
        repo.create("A", "SN1").await.unwrap();
        repo.try_take("SN1", &holder("alice")).await.unwrap();

        let err = repo.try_take("SN1", &holder("bob")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::AlreadyTaken(_)));
        let err = repo.try_take("SN1", &holder("alice")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::AlreadyTaken(_)));

        let device = repo.find_by_serial("SN1").await.unwrap().unwrap();
        assert_eq!(device.status.holder(), Some(&holder("alice")));

        let err = repo.try_take("SN404", &holder("alice")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(_)));
    }
}
