pub mod checkout;
pub mod device_repository;

pub use checkout::{CheckoutError, CheckoutService};
pub use device_repository::{DeviceRepository, RepositoryError};
