//! The growable pool of phone number resources.
//!
//! The [`ResourcePool`] owns every [`ResourceRecord`]. Records are appended
//! and never removed, so the index returned by [`ResourcePool::append`] is a
//! stable handle for the lifetime of the pool. Capacity follows a doubling
//! policy so that bulk generation is amortised O(1) per number.
//!
//! Operations are split across submodules by concern:
//! - [`generator`]: deriving numbers from segments
//! - [`allocator`]: binding and releasing numbers
//! - [`query`]: read-only counts and classification

use std::collections::{HashMap, TryReserveError};

use tracing::instrument;

use crate::domain::{NumberError, OwnerId, PhoneNumber, ResourceRecord, Status};

pub mod allocator;
pub mod generator;
pub mod query;

pub use query::Availability;

/// The capacity of a pool created with [`ResourcePool::default`].
pub const DEFAULT_CAPACITY: usize = 100;

/// The per-owner binding limit of a pool unless configured otherwise.
pub const DEFAULT_OWNER_LIMIT: usize = 5;

/// An ordered, growable collection of resource records.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourcePool {
    /// The populated records, in insertion order.
    records: Vec<ResourceRecord>,

    /// An index from number to position in `records`.
    index: HashMap<PhoneNumber, usize>,

    /// The logical capacity. Only grows.
    capacity: usize,

    /// The maximum number of records one owner may hold.
    owner_limit: usize,
}

impl Default for ResourcePool {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ResourcePool {
    /// Creates an empty pool pre-sized for `initial_capacity` records.
    ///
    /// A capacity of zero is raised to one so that doubling always makes
    /// progress.
    #[must_use]
    pub fn new(initial_capacity: usize) -> Self {
        let capacity = initial_capacity.max(1);
        Self {
            records: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
            capacity,
            owner_limit: DEFAULT_OWNER_LIMIT,
        }
    }

    /// Sets the per-owner binding limit.
    #[must_use]
    pub const fn with_owner_limit(mut self, owner_limit: usize) -> Self {
        self.owner_limit = owner_limit;
        self
    }

    /// The number of populated records.
    #[must_use]
    pub fn count(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the pool holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The current capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// The per-owner binding limit.
    #[must_use]
    pub const fn owner_limit(&self) -> usize {
        self.owner_limit
    }

    /// Returns the record at `index`, if populated.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ResourceRecord> {
        self.records.get(index)
    }

    /// Returns the index of `number`, if present.
    #[must_use]
    pub fn find(&self, number: &str) -> Option<usize> {
        self.index.get(number).copied()
    }

    /// Returns `true` if `number` is present in any state.
    #[must_use]
    pub fn contains(&self, number: &str) -> bool {
        self.index.contains_key(number)
    }

    /// Iterates over the populated records in index order.
    pub fn records(&self) -> impl Iterator<Item = &ResourceRecord> {
        self.records.iter()
    }

    /// Counts records by status.
    #[must_use]
    pub fn summary(&self) -> Summary {
        let mut summary = Summary {
            capacity: self.capacity,
            ..Summary::default()
        };
        for record in &self.records {
            match record.status() {
                Status::Free => summary.free += 1,
                Status::Assigned => summary.assigned += 1,
                Status::Inactive => summary.inactive += 1,
            }
        }
        summary
    }

    /// Grows the pool so it can hold at least `required` records.
    ///
    /// Capacity is doubled until it reaches `required`. Existing records keep
    /// their positions. This is a no-op if the capacity already suffices.
    ///
    /// Capacity is a logical bound: backing storage is reserved for
    /// `required` records, not for the whole doubled capacity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailure`] if the backing storage cannot be
    /// grown. The pool is unchanged in that case.
    #[instrument(level = "trace", skip(self), fields(capacity = self.capacity))]
    pub fn ensure_capacity(&mut self, required: usize) -> Result<(), Error> {
        if required <= self.capacity {
            return Ok(());
        }

        let mut new_capacity = self.capacity;
        while new_capacity < required {
            new_capacity = new_capacity
                .checked_mul(2)
                .ok_or(Error::AllocationFailure { required })?;
        }

        self.reserve(required)?;
        tracing::debug!("Grew pool capacity from {} to {new_capacity}", self.capacity);
        self.capacity = new_capacity;
        Ok(())
    }

    /// Appends a free record for `number` and returns its index.
    ///
    /// The pool grows first if it is full.
    ///
    /// # Errors
    ///
    /// - [`Error::Duplicate`] if the number is already present
    /// - [`Error::AllocationFailure`] if the pool cannot grow
    pub fn append(&mut self, number: PhoneNumber) -> Result<usize, Error> {
        self.append_record(ResourceRecord::free(number))
    }

    pub(crate) fn append_record(&mut self, record: ResourceRecord) -> Result<usize, Error> {
        if self.index.contains_key(record.number().as_str()) {
            return Err(Error::Duplicate(record.number().clone()));
        }
        self.ensure_capacity(self.records.len() + 1)?;

        let position = self.records.len();
        self.index.insert(record.number().clone(), position);
        self.records.push(record);
        Ok(position)
    }

    /// Replaces every record with `records`, raising the capacity to at least
    /// `capacity`.
    ///
    /// The caller guarantees the records hold unique numbers.
    pub(crate) fn replace_records(
        &mut self,
        records: Vec<ResourceRecord>,
        capacity: usize,
    ) -> Result<(), Error> {
        let capacity = capacity.max(self.capacity).max(records.len());
        let mut index = HashMap::new();
        index
            .try_reserve(records.len())
            .map_err(|_| Error::AllocationFailure {
                required: records.len(),
            })?;
        for (position, record) in records.iter().enumerate() {
            index.insert(record.number().clone(), position);
        }

        self.records = records;
        self.index = index;
        self.capacity = capacity;
        Ok(())
    }

    pub(crate) fn record_mut(&mut self, index: usize) -> Option<&mut ResourceRecord> {
        self.records.get_mut(index)
    }

    pub(crate) fn records_mut(&mut self) -> impl Iterator<Item = &mut ResourceRecord> {
        self.records.iter_mut()
    }

    fn reserve(&mut self, required: usize) -> Result<(), Error> {
        let additional = required.saturating_sub(self.records.len());
        let to_error = |_: TryReserveError| Error::AllocationFailure { required };

        self.records.try_reserve_exact(additional).map_err(to_error)?;
        self.index.try_reserve(additional).map_err(to_error)?;
        Ok(())
    }
}

/// Record counts by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct Summary {
    /// Records available for binding.
    pub free: usize,
    /// Records bound to an owner.
    pub assigned: usize,
    /// Administratively withdrawn records.
    pub inactive: usize,
    /// The pool capacity.
    pub capacity: usize,
}

impl Summary {
    /// The total number of populated records.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.free + self.assigned + self.inactive
    }
}

/// Errors returned by pool operations.
///
/// Every failing operation leaves the pool unchanged, except for the partial
/// success documented on [`ResourcePool::generate`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// An argument was out of range.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A number or segment was malformed.
    #[error(transparent)]
    InvalidFormat(#[from] NumberError),

    /// The segment leaves no room for a sequence suffix.
    #[error("Segment '{0}' leaves no digits for a sequence suffix")]
    SegmentTooLong(String),

    /// The number is not in the pool.
    #[error("Phone number {0} is not in the pool")]
    NotFound(String),

    /// The number is not assigned to the given owner.
    #[error("Phone number {number} is not bound to owner {owner}")]
    NotOwned {
        /// The number.
        number: PhoneNumber,
        /// The owner that attempted the release.
        owner: OwnerId,
    },

    /// The number is not free.
    #[error("Phone number {number} is {status}")]
    AlreadyAssigned {
        /// The number.
        number: PhoneNumber,
        /// The number's current status.
        status: Status,
    },

    /// The owner already holds the maximum number of numbers.
    #[error("Owner {owner} already holds the maximum of {limit} numbers")]
    OwnerLimitExceeded {
        /// The owner.
        owner: OwnerId,
        /// The configured limit.
        limit: usize,
    },

    /// No free numbers are left.
    #[error("No free phone numbers are available")]
    Exhausted,

    /// The number is already present in the pool.
    #[error("Phone number {0} is already in the pool")]
    Duplicate(PhoneNumber),

    /// Growing the pool failed.
    #[error("Failed to grow the pool to {required} records")]
    AllocationFailure {
        /// The capacity that was requested.
        required: usize,
    },
}
