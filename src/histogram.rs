use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::record::Record;

static EMPTY_BUCKET: BTreeSet<Record> = BTreeSet::new();

/// Records grouped by timestamp. Exact duplicate records share one slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Histogram {
    buckets: BTreeMap<i64, BTreeSet<Record>>,
}

impl Histogram {
    pub fn build<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a Record>,
    {
        let mut buckets: BTreeMap<i64, BTreeSet<Record>> = BTreeMap::new();
        for record in records {
            buckets.entry(record.time).or_default().insert(record.clone());
        }
        Self { buckets }
    }

    /// Records at `time`; an empty set when nothing was said then.
    pub fn bucket(&self, time: i64) -> &BTreeSet<Record> {
        self.buckets.get(&time).unwrap_or(&EMPTY_BUCKET)
    }

    /// Number of distinct timestamps.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn record_count(&self) -> usize {
        self.buckets.values().map(BTreeSet::len).sum()
    }

    pub fn time_range(&self) -> Option<(i64, i64)> {
        let first = *self.buckets.keys().next()?;
        let last = *self.buckets.keys().next_back()?;
        Some((first, last))
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, &BTreeSet<Record>)> {
        self.buckets.iter().map(|(&t, set)| (t, set))
    }
}

/// Groups `records` by timestamp.
pub fn histogram<'a, I>(records: I) -> Histogram
where
    I: IntoIterator<Item = &'a Record>,
{
    Histogram::build(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Record> {
        vec![
            Record::new(100, "a", "hi"),
            Record::new(100, "b", "yo"),
            Record::new(101, "a", "again"),
            Record::new(100, "a", "hi"),
        ]
    }

    #[test]
    fn groups_by_time() {
        let h = histogram(&sample());
        assert_eq!(h.len(), 2);
        assert_eq!(h.bucket(100).len(), 2);
        assert_eq!(h.bucket(101).len(), 1);
        assert_eq!(h.time_range(), Some((100, 101)));
    }

    #[test]
    fn duplicates_collapse() {
        let h = histogram(&sample());
        assert_eq!(h.record_count(), 3);
    }

    #[test]
    fn absent_time_is_empty() {
        let h = histogram(&sample());
        assert!(h.bucket(99).is_empty());
        assert_eq!(h.len(), 2);
        assert_eq!(Histogram::default().time_range(), None);
    }

    #[test]
    fn every_record_lands_in_its_own_bucket() {
        let records = sample();
        let h = histogram(&records);
        for r in &records {
            assert!(h.bucket(r.time).contains(r));
        }
        for (t, set) in h.iter() {
            assert!(set.iter().all(|r| r.time == t));
        }
    }
}
