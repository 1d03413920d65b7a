//! Latest-row-per-partition selection
//!
//! Two passes: sort the working set newest first, then keep the first
//! record seen for every partition key.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::hash::Hash;

use chrono::NaiveDate;

use crate::storage::{FirmwareUpdate, Update};

/// A stored release that can be ordered by recency.
pub trait Dated {
    fn date(&self) -> Option<NaiveDate>;
    /// Insertion order; larger is newer.
    fn row_id(&self) -> i32;
}

impl Dated for Update {
    fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    fn row_id(&self) -> i32 {
        self.id
    }
}

impl Dated for FirmwareUpdate {
    fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    fn row_id(&self) -> i32 {
        self.id
    }
}

/// `date` desc with undated rows last, then `id` desc.
pub fn newest_first<T: Dated>(a: &T, b: &T) -> Ordering {
    // None < Some(_), so comparing b against a also sorts undated rows last
    (b.date(), b.row_id()).cmp(&(a.date(), a.row_id()))
}

/// Keep the newest record of each partition, in newest-first order.
///
/// Equal dates resolve to the larger `id`.
pub fn latest_per_partition<T, K, F>(mut records: Vec<T>, key: F) -> Vec<T>
where
    T: Dated,
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    records.sort_by(newest_first);

    let mut seen = HashSet::with_capacity(records.len());
    records.retain(|record| seen.insert(key(record)));
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: i32,
        key: &'static str,
        date: Option<NaiveDate>,
    }

    impl Dated for Row {
        fn date(&self) -> Option<NaiveDate> {
            self.date
        }

        fn row_id(&self) -> i32 {
            self.id
        }
    }

    fn row(id: i32, key: &'static str, date: Option<(i32, u32, u32)>) -> Row {
        Row {
            id,
            key,
            date: date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
        }
    }

    #[test]
    fn test_keeps_newest_per_key() {
        let rows = vec![
            row(1, "alpha", Some((2023, 1, 1))),
            row(2, "alpha", Some((2023, 3, 1))),
            row(3, "beta", Some((2022, 6, 1))),
        ];
        let latest = latest_per_partition(rows, |r| r.key);
        assert_eq!(latest.iter().map(|r| r.id).collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn test_equal_dates_prefer_larger_id() {
        let rows = vec![
            row(5, "alpha", Some((2023, 3, 1))),
            row(9, "alpha", Some((2023, 3, 1))),
            row(7, "alpha", Some((2023, 3, 1))),
        ];
        let latest = latest_per_partition(rows, |r| r.key);
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].id, 9);
    }

    #[test]
    fn test_undated_rows_lose_to_dated() {
        let rows = vec![
            row(10, "alpha", None),
            row(1, "alpha", Some((2020, 1, 1))),
            row(11, "beta", None),
        ];
        let latest = latest_per_partition(rows, |r| r.key);
        assert_eq!(latest.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 11]);
    }

    #[test]
    fn test_composite_key() {
        let rows = vec![
            row(1, "alpha", Some((2023, 1, 1))),
            row(2, "alpha", Some((2023, 1, 2))),
        ];
        let latest = latest_per_partition(rows, |r| (r.key, r.id % 2));
        assert_eq!(latest.len(), 2);
    }

    #[test]
    fn test_empty() {
        let latest = latest_per_partition(Vec::<Row>::new(), |r| r.key);
        assert!(latest.is_empty());
    }
}
