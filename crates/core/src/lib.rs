//! AquaMon domain core.
//!
//! Pure domain logic with no database or HTTP dependencies: sensor types,
//! threshold bounds and their override-chain resolution, reading
//! classification, and the shared constants used by the other crates.

pub mod alert;
pub mod api_keys;
pub mod audit;
pub mod error;
pub mod event_names;
pub mod hashing;
pub mod resolver;
pub mod roles;
pub mod sensor;
pub mod threshold;
pub mod types;
