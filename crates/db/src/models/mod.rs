//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` DTOs for inserts and patches where the API accepts them

pub mod audit;
pub mod device;
pub mod project;
pub mod reading;
pub mod sensor_threshold;
pub mod user;
