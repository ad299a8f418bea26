pub mod auth;
pub mod devices;
pub mod projects;
pub mod sensor_data;
pub mod thresholds;
pub mod users;
