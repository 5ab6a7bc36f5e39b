//! Read-only queries and classification of free numbers by prefix.
//!
//! Numbers are grouped by their leading digits: a *category* is a short
//! prefix such as `13`, a *segment* a longer one such as `138`. Groupings are
//! reported in first-seen pool order.

use std::collections::HashSet;

use super::ResourcePool;
use crate::domain::PhoneNumber;

/// The free count of one prefix group.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Availability {
    /// The shared leading digits.
    pub prefix: String,
    /// How many free numbers start with `prefix`.
    pub free: usize,
}

/// Sorts numbers ascending.
///
/// Numbers are fixed-width digit strings, so this is also numeric order.
pub fn sort_numbers(numbers: &mut [PhoneNumber]) {
    numbers.sort_unstable();
}

/// The two-digit categories offered when no free number exists yet.
pub const DEFAULT_CATEGORIES: [&str; 7] = ["13", "14", "15", "16", "17", "18", "19"];

fn prefix_of(number: &str, digits: usize) -> &str {
    &number[..digits.min(number.len())]
}

impl ResourcePool {
    /// The number of free records.
    #[must_use]
    pub fn count_free(&self) -> usize {
        self.records().filter(|r| r.is_free()).count()
    }

    /// The number of free records whose number starts with `prefix`.
    #[must_use]
    pub fn count_free_by_prefix(&self, prefix: &str) -> usize {
        self.free_with_prefix(prefix).count()
    }

    /// Up to `max_count` free numbers starting with `prefix`, in pool order.
    #[must_use]
    pub fn list_free_by_prefix(&self, prefix: &str, max_count: usize) -> Vec<PhoneNumber> {
        self.free_with_prefix(prefix)
            .take(max_count)
            .cloned()
            .collect()
    }

    /// The distinct first-`prefix_len`-digit prefixes of free numbers, in
    /// first-seen order, capped at `max_count`.
    #[must_use]
    pub fn distinct_categories(&self, prefix_len: usize, max_count: usize) -> Vec<String> {
        self.distinct_prefixes("", prefix_len, max_count)
    }

    /// As [`ResourcePool::distinct_categories`], but falls back to
    /// [`DEFAULT_CATEGORIES`] (capped at `max_count`) when no number is free.
    #[must_use]
    pub fn categories_or_default(&self, prefix_len: usize, max_count: usize) -> Vec<String> {
        let categories = self.distinct_categories(prefix_len, max_count);
        if !categories.is_empty() {
            return categories;
        }
        DEFAULT_CATEGORIES
            .iter()
            .take(max_count)
            .map(ToString::to_string)
            .collect()
    }

    /// The distinct first-`segment_len`-digit prefixes of free numbers
    /// starting with `category`, in first-seen order, capped at `max_count`.
    #[must_use]
    pub fn segments_in_category(
        &self,
        category: &str,
        segment_len: usize,
        max_count: usize,
    ) -> Vec<String> {
        self.distinct_prefixes(category, segment_len, max_count)
    }

    /// The free count of every distinct first-`prefix_len`-digit prefix, in
    /// first-seen order.
    #[must_use]
    pub fn availability(&self, prefix_len: usize) -> Vec<Availability> {
        let mut groups: Vec<Availability> = Vec::new();
        for number in self.free_with_prefix("") {
            let prefix = prefix_of(number, prefix_len);
            match groups.iter_mut().find(|group| group.prefix == prefix) {
                Some(group) => group.free += 1,
                None => groups.push(Availability {
                    prefix: prefix.to_string(),
                    free: 1,
                }),
            }
        }
        groups
    }

    fn distinct_prefixes(&self, within: &str, prefix_len: usize, max_count: usize) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut prefixes = Vec::new();
        for number in self.free_with_prefix(within) {
            if prefixes.len() >= max_count {
                break;
            }
            let prefix = prefix_of(number, prefix_len);
            if seen.insert(prefix) {
                prefixes.push(prefix.to_string());
            }
        }
        prefixes
    }

    fn free_with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a PhoneNumber> {
        self.records()
            .filter(move |record| record.is_free() && record.number().starts_with(prefix))
            .map(|record| record.number())
    }
}
