//! Phone Number Resource Pool
//!
//! A growable pool of phone numbers that are generated from segments, bound
//! to subscribers, and persisted to a versioned binary file.

pub mod domain;
pub use domain::{Config, OwnerId, PhoneNumber, ResourceRecord, Segment, Status};

pub mod pool;
pub use pool::{Error, ResourcePool, Summary};

/// Pool file persistence and startup loading.
pub mod storage;
pub use storage::{Origin, StorageError};
