//! Per-line and per-scope measurement statistics.
//!
//! Two ways to build a [`Stats`]:
//! - from raw call records ([`Stats::from_events`], or incrementally with
//!   [`StatsAccumulator`]): sums plus the mean tensor-core ratio per record
//! - from child statistics ([`Stats::combine`]): sums plus the mean of the
//!   children's own tensor-core ratios
//!
//! Sums are partition-invariant: combining per-group results equals
//! aggregating every record at once. The tensor-core mean is not, because
//! each level averages over its own element count.

use crate::parser::schema::CallRecord;
use crate::utils::error::AggregationError;

/// Aggregated measurements over a set of call records or child stats
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Stats {
    /// Total number of calls
    pub calls: u64,

    /// Accelerator time in microseconds
    pub device_total: f64,

    /// CPU time in microseconds
    pub host_total: f64,

    /// Mean tensor-core utilization, 0-100
    pub tc_ratio: f64,
}

impl Stats {
    /// Aggregate raw call records
    ///
    /// **Public** - line-level aggregation
    ///
    /// # Errors
    /// * `AggregationError::Empty` - no records to average over
    pub fn from_events<'a, I>(events: I) -> Result<Self, AggregationError>
    where
        I: IntoIterator<Item = &'a CallRecord>,
    {
        let mut acc = StatsAccumulator::new();
        for event in events {
            acc.add(event);
        }
        acc.finish()
    }

    /// Combine child statistics (lines into a scope, lines into a file)
    ///
    /// **Public** - never fails; an empty input yields all-zero stats
    pub fn combine<'a, I>(children: I) -> Self
    where
        I: IntoIterator<Item = &'a Stats>,
    {
        let mut total = Stats::default();
        let mut count = 0usize;
        let mut tc_sum = 0.0;

        for child in children {
            total.calls += child.calls;
            total.device_total += child.device_total;
            total.host_total += child.host_total;
            tc_sum += child.tc_ratio;
            count += 1;
        }

        if count > 0 {
            total.tc_ratio = tc_sum / count as f64;
        }
        total
    }

    /// Fraction of `whole`'s device time spent here (0 when `whole` has none)
    pub fn device_share_of(&self, whole: &Stats) -> f64 {
        share(self.device_total, whole.device_total)
    }

    /// Fraction of `whole`'s host time spent here (0 when `whole` has none)
    pub fn host_share_of(&self, whole: &Stats) -> f64 {
        share(self.host_total, whole.host_total)
    }
}

fn share(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole
    } else {
        0.0
    }
}

/// Running aggregate of call records for one location
///
/// Records are folded in as they are seen, so memory stays proportional to
/// the number of distinct locations rather than the number of records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsAccumulator {
    events: usize,
    calls: u64,
    device_total: f64,
    host_total: f64,
    tc_ratio_sum: f64,
}

impl StatsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one call record in
    pub fn add(&mut self, record: &CallRecord) {
        self.events += 1;
        self.calls += record.calls.unwrap_or(0);
        self.device_total += record.device_total_duration.unwrap_or(0.0);
        self.host_total += record.host_total_duration.unwrap_or(0.0);
        self.tc_ratio_sum += record.tc_total_ratio.unwrap_or(0.0);
    }

    /// Fold another accumulator in, as if its records had been added here
    pub fn merge(&mut self, other: &StatsAccumulator) {
        self.events += other.events;
        self.calls += other.calls;
        self.device_total += other.device_total;
        self.host_total += other.host_total;
        self.tc_ratio_sum += other.tc_ratio_sum;
    }

    /// Number of records folded in so far
    pub fn len(&self) -> usize {
        self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events == 0
    }

    /// Produce the aggregated stats
    ///
    /// # Errors
    /// * `AggregationError::Empty` - nothing was added
    pub fn finish(&self) -> Result<Stats, AggregationError> {
        if self.events == 0 {
            return Err(AggregationError::Empty);
        }

        Ok(Stats {
            calls: self.calls,
            device_total: self.device_total,
            host_total: self.host_total,
            tc_ratio: self.tc_ratio_sum / self.events as f64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(calls: u64, device: f64, host: f64, tc: f64) -> CallRecord {
        CallRecord::new("a.py(1): f")
            .with_calls(calls)
            .with_device_total(device)
            .with_host_total(host)
            .with_tc_ratio(tc)
    }

    #[test]
    fn test_from_events_sums_and_averages() {
        let events = vec![record(2, 10.0, 4.0, 50.0), record(1, 5.0, 6.0, 0.0)];
        let stats = Stats::from_events(&events).unwrap();

        assert_eq!(stats.calls, 3);
        assert_eq!(stats.device_total, 15.0);
        assert_eq!(stats.host_total, 10.0);
        assert_eq!(stats.tc_ratio, 25.0);
    }

    #[test]
    fn test_from_events_missing_fields_count_as_zero() {
        let events = vec![CallRecord::new("a.py(1): f"), record(1, 2.0, 3.0, 80.0)];
        let stats = Stats::from_events(&events).unwrap();

        assert_eq!(stats.calls, 1);
        assert_eq!(stats.device_total, 2.0);
        // Missing ratio still counts towards the divisor
        assert_eq!(stats.tc_ratio, 40.0);
    }

    #[test]
    fn test_from_events_empty_is_an_error() {
        let events: Vec<CallRecord> = vec![];
        assert_eq!(Stats::from_events(&events), Err(AggregationError::Empty));
    }

    #[test]
    fn test_combine_empty_is_zero() {
        let children: Vec<Stats> = vec![];
        assert_eq!(Stats::combine(&children), Stats::default());
    }

    #[test]
    fn test_combine_averages_child_tc_ratio() {
        // Host totals are far outside 0-100; a host-derived average would
        // give 550, the child ratio mean gives 30
        let children = vec![
            Stats { calls: 1, device_total: 1.0, host_total: 100.0, tc_ratio: 20.0 },
            Stats { calls: 2, device_total: 3.0, host_total: 1000.0, tc_ratio: 40.0 },
        ];
        let combined = Stats::combine(&children);

        assert_eq!(combined.calls, 3);
        assert_eq!(combined.device_total, 4.0);
        assert_eq!(combined.host_total, 1100.0);
        assert_eq!(combined.tc_ratio, 30.0);
        assert_ne!(combined.tc_ratio, 550.0);
    }

    #[test]
    fn test_sums_are_partition_invariant() {
        let events = vec![
            record(1, 10.0, 1.0, 100.0),
            record(2, 20.0, 2.0, 0.0),
            record(3, 30.0, 3.0, 0.0),
        ];
        let direct = Stats::from_events(&events).unwrap();

        let left = Stats::from_events(&events[..1]).unwrap();
        let right = Stats::from_events(&events[1..]).unwrap();
        let combined = Stats::combine(&[left, right]);

        assert_eq!(combined.calls, direct.calls);
        assert_eq!(combined.device_total, direct.device_total);
        assert_eq!(combined.host_total, direct.host_total);
        // Averaging is per level: (100 + 0) / 2 vs 100 / 3
        assert_eq!(combined.tc_ratio, 50.0);
        assert!((direct.tc_ratio - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_accumulator_merge_matches_single_pass() {
        let events = vec![record(1, 1.0, 1.0, 10.0), record(1, 2.0, 2.0, 30.0)];

        let mut first = StatsAccumulator::new();
        first.add(&events[0]);
        let mut second = StatsAccumulator::new();
        second.add(&events[1]);
        first.merge(&second);

        assert_eq!(first.len(), 2);
        assert_eq!(first.finish().unwrap(), Stats::from_events(&events).unwrap());
    }

    #[test]
    fn test_shares_guard_zero_totals() {
        let part = Stats { calls: 1, device_total: 100.0, host_total: 5.0, tc_ratio: 0.0 };
        let whole = Stats { calls: 2, device_total: 150.0, host_total: 0.0, tc_ratio: 0.0 };

        assert!((part.device_share_of(&whole) - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(part.host_share_of(&whole), 0.0);
    }
}
