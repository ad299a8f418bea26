//! Event-driven push to dashboard clients.

mod broadcaster;

pub use broadcaster::{reading_frame, ReadingBroadcaster};
