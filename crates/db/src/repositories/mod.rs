//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod audit_repo;
pub mod device_repo;
pub mod project_repo;
pub mod reading_repo;
pub mod sensor_threshold_repo;
pub mod user_repo;

pub use audit_repo::AuditLogRepo;
pub use device_repo::DeviceRepo;
pub use project_repo::ProjectRepo;
pub use reading_repo::ReadingRepo;
pub use sensor_threshold_repo::SensorThresholdRepo;
pub use user_repo::UserRepo;
