//! Number generation from segments.
//!
//! A segment such as `138` is extended with a zero-padded sequence suffix to
//! eleven digits: `13800000000`, `13800000001`, and so on. Candidates already
//! present in the pool are skipped, so generation never introduces duplicates.

use tracing::instrument;

use super::{Error, ResourcePool};
use crate::domain::{Segment, SegmentSeed};

/// Checks that `segment` is a valid segment.
///
/// # Errors
///
/// Returns [`Error::InvalidFormat`] unless the segment is 3-7 digits, starts
/// with `1`, and has a second digit in `3..=9`.
pub fn validate_segment(segment: &str) -> Result<Segment, Error> {
    Ok(Segment::try_from(segment)?)
}

/// The size of the sequence space for a suffix of `digits` digits.
fn suffix_space(digits: usize) -> u64 {
    (0..digits).fold(1_u64, |space, _| space.saturating_mul(10))
}

impl ResourcePool {
    /// Generates up to `count` free numbers from `segment`.
    ///
    /// Sequence values `0..count` are tried in order. Requests larger than the
    /// segment's sequence space are clamped to it. Numbers already in the pool
    /// are skipped and not counted.
    ///
    /// Returns the number of records actually added. Zero means nothing new
    /// could be generated; a value smaller than `count` is a partial success.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if `count` is zero or the segment is
    ///   invalid
    /// - [`Error::SegmentTooLong`] if the segment leaves no suffix digits
    /// - [`Error::AllocationFailure`] if the pool cannot grow
    #[instrument(skip(self), fields(pool_count = self.count()))]
    pub fn generate(&mut self, segment: &str, count: usize) -> Result<usize, Error> {
        if count == 0 {
            return Err(Error::InvalidArgument(
                "generation count must be positive".to_string(),
            ));
        }
        let segment =
            Segment::try_from(segment).map_err(|e| Error::InvalidArgument(e.to_string()))?;

        let suffix_digits = segment.suffix_digits();
        if suffix_digits == 0 {
            return Err(Error::SegmentTooLong(segment.to_string()));
        }

        let space = usize::try_from(suffix_space(suffix_digits)).unwrap_or(usize::MAX);
        let count = if count > space {
            tracing::debug!("Clamping request of {count} to the {space} numbers in {segment}");
            space
        } else {
            count
        };

        self.ensure_capacity(self.count().saturating_add(count))?;

        let mut added = 0;
        for sequence in (0_u64..).take(count) {
            let Some(candidate) = segment.number(sequence) else {
                continue;
            };
            if self.contains(&candidate) {
                continue;
            }
            self.append(candidate)?;
            added += 1;
        }

        tracing::debug!("Generated {added} numbers from segment {segment}");
        Ok(added)
    }

    /// Generates every configured segment, returning the total added.
    ///
    /// A segment that fails to generate is logged and skipped; the remaining
    /// segments are still processed.
    #[instrument(skip_all)]
    pub fn seed(&mut self, segments: &[SegmentSeed]) -> usize {
        segments
            .iter()
            .map(|seed| match self.generate(&seed.segment, seed.count) {
                Ok(added) => added,
                Err(e) => {
                    tracing::warn!("Failed to seed segment {}: {e}", seed.segment);
                    0
                }
            })
            .sum()
    }
}
