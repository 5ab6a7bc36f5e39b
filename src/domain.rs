//! Domain models for the number pool.
//!
//! This module contains the core value types: validated phone numbers and
//! segments, resource records and their lifecycle state, and configuration.

/// Phone number and segment types and validation.
pub mod number;
pub use number::{is_valid_number, Error as NumberError, PhoneNumber, Segment};

/// Resource records, owners and lifecycle states.
pub mod record;
pub use record::{Assignment, OwnerId, ResourceRecord, State, Status};

mod config;
pub use config::{Config, SegmentSeed};
