use std::{fmt, str::FromStr};

use chrono::NaiveDateTime;

use crate::domain::PhoneNumber;

/// The textual format of assignment timestamps, both in memory and on disk.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The opaque identity of a subscriber that numbers are bound to.
///
/// Owners are non-negative and fit in an `i32`, matching the pool file's
/// owner field where `-1` marks an unbound record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OwnerId(i32);

impl OwnerId {
    /// Creates an owner id.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidOwnerError`] if `id` is negative.
    pub fn new(id: i32) -> Result<Self, InvalidOwnerError> {
        if id < 0 {
            Err(InvalidOwnerError(id.to_string()))
        } else {
            Ok(Self(id))
        }
    }

    /// Returns the raw id.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OwnerId {
    type Err = InvalidOwnerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s
            .parse::<i32>()
            .map_err(|_| InvalidOwnerError(s.to_string()))?;
        Self::new(id)
    }
}

/// Error returned when an owner id is negative or not an integer.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Invalid owner id '{0}': expected a non-negative 32-bit integer")]
pub struct InvalidOwnerError(String);

/// The lifecycle status of a resource record.
///
/// The discriminants are the status codes used in the pool file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Available for binding.
    Free = 0,
    /// Bound to an owner.
    Assigned = 1,
    /// Administratively withdrawn. No operation moves a record in or out of
    /// this state; it is kept for file compatibility.
    Inactive = 2,
}

impl Status {
    /// Returns the status for a pool file status code.
    #[must_use]
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Free),
            1 => Some(Self::Assigned),
            2 => Some(Self::Inactive),
            _ => None,
        }
    }

    /// Returns the pool file status code.
    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match self {
            Self::Free => "free",
            Self::Assigned => "assigned",
            Self::Inactive => "inactive",
        };
        f.write_str(label)
    }
}

/// Who holds an assigned number, and since when.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    /// The owner the number is bound to.
    pub owner: OwnerId,
    /// Local wall-clock time of the binding, to one second.
    pub assigned_at: NaiveDateTime,
}

/// The state of a resource record.
///
/// Only the `Assigned` variant carries an owner and timestamp, so a free or
/// inactive record can never hold stale binding data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum State {
    /// Available for binding.
    #[default]
    Free,
    /// Bound to an owner.
    Assigned(Assignment),
    /// Administratively withdrawn.
    Inactive,
}

/// One phone number and its allocation state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRecord {
    number: PhoneNumber,
    state: State,
}

impl ResourceRecord {
    /// Creates a free record for `number`.
    #[must_use]
    pub const fn free(number: PhoneNumber) -> Self {
        Self::with_state(number, State::Free)
    }

    /// Creates a record in an arbitrary state.
    #[must_use]
    pub const fn with_state(number: PhoneNumber, state: State) -> Self {
        Self { number, state }
    }

    /// The phone number.
    #[must_use]
    pub const fn number(&self) -> &PhoneNumber {
        &self.number
    }

    /// The full state, including any assignment.
    #[must_use]
    pub const fn state(&self) -> State {
        self.state
    }

    /// The lifecycle status.
    #[must_use]
    pub const fn status(&self) -> Status {
        match self.state {
            State::Free => Status::Free,
            State::Assigned(_) => Status::Assigned,
            State::Inactive => Status::Inactive,
        }
    }

    /// The owner, if the record is assigned.
    #[must_use]
    pub const fn owner(&self) -> Option<OwnerId> {
        match self.state {
            State::Assigned(assignment) => Some(assignment.owner),
            State::Free | State::Inactive => None,
        }
    }

    /// The assignment time, if the record is assigned.
    #[must_use]
    pub const fn assigned_at(&self) -> Option<NaiveDateTime> {
        match self.state {
            State::Assigned(assignment) => Some(assignment.assigned_at),
            State::Free | State::Inactive => None,
        }
    }

    /// The assignment time formatted as `YYYY-MM-DD HH:MM:SS`, or an empty
    /// string if the record is not assigned.
    #[must_use]
    pub fn assigned_at_display(&self) -> String {
        self.assigned_at()
            .map(|at| at.format(TIMESTAMP_FORMAT).to_string())
            .unwrap_or_default()
    }

    /// Returns `true` if the record is free.
    #[must_use]
    pub const fn is_free(&self) -> bool {
        matches!(self.state, State::Free)
    }

    /// Returns `true` if the record is assigned to `owner`.
    #[must_use]
    pub fn is_owned_by(&self, owner: OwnerId) -> bool {
        self.owner() == Some(owner)
    }

    pub(crate) const fn assign(&mut self, owner: OwnerId, assigned_at: NaiveDateTime) {
        self.state = State::Assigned(Assignment { owner, assigned_at });
    }

    pub(crate) const fn reset(&mut self) {
        self.state = State::Free;
    }
}
