//! Binding numbers to owners and releasing them.
//!
//! A record moves `Free -> Assigned -> Free`. `Inactive` records are never
//! touched by these operations.

use chrono::{Local, NaiveDateTime, Timelike};
use rand::{seq::SliceRandom, Rng};
use tracing::instrument;

use super::{Error, ResourcePool};
use crate::domain::{OwnerId, PhoneNumber, Status};

/// The current local time, truncated to whole seconds.
fn now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

impl ResourcePool {
    /// Binds `number` to `owner`, stamped with the current local time.
    ///
    /// See [`ResourcePool::bind_at`].
    ///
    /// # Errors
    ///
    /// As for [`ResourcePool::bind_at`].
    pub fn bind(&mut self, owner: OwnerId, number: &str) -> Result<PhoneNumber, Error> {
        self.bind_at(owner, number, now())
    }

    /// Binds `number` to `owner`, stamped with `assigned_at`.
    ///
    /// # Errors
    ///
    /// Checked in this order:
    /// - [`Error::InvalidFormat`] if `number` is not eleven digits
    /// - [`Error::OwnerLimitExceeded`] if the owner is at the binding limit
    /// - [`Error::NotFound`] if the number is not in the pool
    /// - [`Error::AlreadyAssigned`] if the number is not free
    #[instrument(skip(self, assigned_at))]
    pub fn bind_at(
        &mut self,
        owner: OwnerId,
        number: &str,
        assigned_at: NaiveDateTime,
    ) -> Result<PhoneNumber, Error> {
        let number = PhoneNumber::try_from(number)?;

        let limit = self.owner_limit();
        if self.owner_count(owner) >= limit {
            return Err(Error::OwnerLimitExceeded { owner, limit });
        }

        let index = self
            .find(&number)
            .ok_or_else(|| Error::NotFound(number.to_string()))?;
        let Some(record) = self.record_mut(index) else {
            return Err(Error::NotFound(number.to_string()));
        };

        if !record.is_free() {
            return Err(Error::AlreadyAssigned {
                number,
                status: record.status(),
            });
        }

        record.assign(owner, assigned_at);
        tracing::info!("Bound {number} to owner {owner}");
        Ok(number)
    }

    /// Releases `number` from `owner`, returning it to the free state.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if the number is not in the pool
    /// - [`Error::NotOwned`] if the number is not assigned to `owner`
    #[instrument(skip(self))]
    pub fn release(&mut self, owner: OwnerId, number: &str) -> Result<(), Error> {
        let index = self
            .find(number)
            .ok_or_else(|| Error::NotFound(number.to_string()))?;
        let Some(record) = self.record_mut(index) else {
            return Err(Error::NotFound(number.to_string()));
        };

        if !record.is_owned_by(owner) {
            return Err(Error::NotOwned {
                number: record.number().clone(),
                owner,
            });
        }

        record.reset();
        tracing::info!("Released {number} from owner {owner}");
        Ok(())
    }

    /// Releases every number bound to `owner`, returning how many were
    /// released. An owner with no numbers is not an error.
    #[instrument(skip(self))]
    pub fn release_all(&mut self, owner: OwnerId) -> usize {
        let mut released = 0;
        for record in self.records_mut().filter(|r| r.is_owned_by(owner)) {
            record.reset();
            released += 1;
        }
        tracing::info!("Released {released} numbers from owner {owner}");
        released
    }

    /// Returns `true` if `number` could be bound: it is either not in the pool
    /// or free.
    #[must_use]
    pub fn is_unique(&self, number: &str) -> bool {
        self.find(number)
            .and_then(|index| self.get(index))
            .is_none_or(|record| record.status() == Status::Free)
    }

    /// The number of records bound to `owner`.
    #[must_use]
    pub fn owner_count(&self, owner: OwnerId) -> usize {
        self.records().filter(|r| r.is_owned_by(owner)).count()
    }

    /// The numbers bound to `owner`, in pool order.
    #[must_use]
    pub fn numbers_of(&self, owner: OwnerId) -> Vec<PhoneNumber> {
        self.records()
            .filter(|r| r.is_owned_by(owner))
            .map(|r| r.number().clone())
            .collect()
    }

    /// Picks a free number uniformly at random.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Exhausted`] if no number is free.
    pub fn pick_random_free(&self) -> Result<PhoneNumber, Error> {
        self.pick_random_free_with(&mut rand::thread_rng())
    }

    /// Picks a free number uniformly at random using `rng`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Exhausted`] if no number is free.
    pub fn pick_random_free_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<PhoneNumber, Error> {
        let free: Vec<&PhoneNumber> = self.free_numbers().collect();
        free.choose(rng)
            .map(|&number| number.clone())
            .ok_or(Error::Exhausted)
    }

    /// Picks up to `max_count` distinct free numbers at random.
    ///
    /// Returns fewer numbers if fewer are free.
    #[must_use]
    pub fn pick_random_free_many(&self, max_count: usize) -> Vec<PhoneNumber> {
        self.pick_random_free_many_with(max_count, &mut rand::thread_rng())
    }

    /// Picks up to `max_count` distinct free numbers at random using `rng`.
    pub fn pick_random_free_many_with<R: Rng + ?Sized>(
        &self,
        max_count: usize,
        rng: &mut R,
    ) -> Vec<PhoneNumber> {
        let mut free: Vec<&PhoneNumber> = self.free_numbers().collect();
        free.shuffle(rng);
        free.into_iter().take(max_count).cloned().collect()
    }

    fn free_numbers(&self) -> impl Iterator<Item = &PhoneNumber> {
        self.records()
            .filter(|record| record.is_free())
            .map(|record| record.number())
    }
}
