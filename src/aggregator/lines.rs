//! Lookup of stats by zero-based line number.

use super::stats::{Stats, StatsAccumulator};
use crate::parser::schema::CallRecord;
use crate::utils::error::AggregationError;
use std::collections::BTreeMap;
use std::ops::Range;

/// Stats for every line that had at least one call record
///
/// A missing line means "no direct stats", not zero-valued stats.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineLookup {
    lines: BTreeMap<usize, Stats>,
}

impl LineLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregate buffered call records per line
    ///
    /// # Errors
    /// * `AggregationError::Empty` - a line was given no records
    pub fn from_events(
        line_events: &BTreeMap<usize, Vec<CallRecord>>,
    ) -> Result<Self, AggregationError> {
        line_events
            .iter()
            .map(|(line, events)| Stats::from_events(events).map(|stats| (*line, stats)))
            .collect()
    }

    /// Finish per-line accumulators
    ///
    /// # Errors
    /// * `AggregationError::Empty` - an accumulator never saw a record
    pub fn from_accumulators<'a, I>(accumulators: I) -> Result<Self, AggregationError>
    where
        I: IntoIterator<Item = (&'a usize, &'a StatsAccumulator)>,
    {
        accumulators
            .into_iter()
            .map(|(line, acc)| acc.finish().map(|stats| (*line, stats)))
            .collect()
    }

    pub fn get(&self, line: usize) -> Option<&Stats> {
        self.lines.get(&line)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines with stats, in ascending order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Stats)> + '_ {
        self.lines.iter().map(|(line, stats)| (*line, stats))
    }

    pub fn values(&self) -> impl Iterator<Item = &Stats> + '_ {
        self.lines.values()
    }

    /// Stats of the lines inside a half-open range
    pub fn in_range(&self, range: Range<usize>) -> impl Iterator<Item = &Stats> + '_ {
        self.lines.range(range).map(|(_, stats)| stats)
    }
}

impl FromIterator<(usize, Stats)> for LineLookup {
    fn from_iter<T: IntoIterator<Item = (usize, Stats)>>(iter: T) -> Self {
        Self {
            lines: iter.into_iter().collect(),
        }
    }
}

impl From<BTreeMap<usize, Stats>> for LineLookup {
    fn from(lines: BTreeMap<usize, Stats>) -> Self {
        Self { lines }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_events_per_line() {
        let mut line_events = BTreeMap::new();
        line_events.insert(4, vec![CallRecord::new("a.py(5): f").with_device_total(100.0)]);
        line_events.insert(
            5,
            vec![
                CallRecord::new("a.py(6): f").with_device_total(20.0),
                CallRecord::new("a.py(6): f").with_device_total(30.0),
            ],
        );

        let lookup = LineLookup::from_events(&line_events).unwrap();
        assert_eq!(lookup.len(), 2);
        assert_eq!(lookup.get(5).unwrap().device_total, 50.0);
        assert!(lookup.get(3).is_none());
    }

    #[test]
    fn test_from_events_rejects_empty_line() {
        let mut line_events = BTreeMap::new();
        line_events.insert(0, Vec::new());
        assert_eq!(
            LineLookup::from_events(&line_events),
            Err(AggregationError::Empty)
        );
    }

    #[test]
    fn test_in_range_is_half_open() {
        let lookup: LineLookup = (0..5)
            .map(|line| (line, Stats { calls: 1, ..Default::default() }))
            .collect();

        assert_eq!(lookup.in_range(1..3).count(), 2);
        assert_eq!(lookup.in_range(4..10).count(), 1);
        assert_eq!(lookup.in_range(5..10).count(), 0);
    }
}
