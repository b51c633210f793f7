//! Dimensional aggregation.
//!
//! One linear pass over the events fills the bucket plan, the dimension
//! groups and the totals together. Statistics are computed once per
//! bucket/group at [`Aggregator::finish`]; the top-N views are derived from the
//! finished groups without touching the events again.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use vitals_types::EventRecord;

use crate::bucket::BucketPlan;
use crate::stats::{rate_percent, LatencySummary};
use crate::surface::{OutcomeClass, Surface};

/// Counts and duration figures shared by buckets, groups and totals.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeStats {
    pub requests: u64,
    pub errors: u64,
    pub server_errors: u64,
    pub slow: u64,
    /// Errors as a percentage of requests, two decimals.
    pub error_rate: f64,
    pub p50: u64,
    pub p95: u64,
    pub p99: u64,
    pub avg_duration: u64,
}

/// One time-series point.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketStats {
    /// Epoch-aligned bucket start.
    pub timestamp: chrono::DateTime<chrono::Utc>,
    #[serde(flatten)]
    pub stats: OutcomeStats,
}

/// Statistics for one dimension group.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupStats {
    pub key: String,
    #[serde(flatten)]
    pub stats: OutcomeStats,
    /// Distinct sub-dimension values seen in this group, sorted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_dimensions: Vec<String>,
}

#[derive(Debug, Default)]
struct Tally {
    count: u64,
    errors: u64,
    server_errors: u64,
    slow: u64,
    durations: Vec<u64>,
}

impl Tally {
    fn add(&mut self, class: OutcomeClass, duration_ms: u64) {
        self.count += 1;
        self.errors += u64::from(class.error);
        self.server_errors += u64::from(class.server_error);
        self.slow += u64::from(class.slow);
        self.durations.push(duration_ms);
    }

    fn finish(self) -> OutcomeStats {
        let latency = LatencySummary::from_samples(self.durations);
        OutcomeStats {
            requests: self.count,
            errors: self.errors,
            server_errors: self.server_errors,
            slow: self.slow,
            error_rate: rate_percent(self.errors, self.count),
            p50: latency.p50,
            p95: latency.p95,
            p99: latency.p99,
            avg_duration: latency.avg,
        }
    }
}

#[derive(Debug, Default)]
struct GroupTally {
    tally: Tally,
    subs: BTreeSet<String>,
}

/// Single-pass accumulator over one surface and one bucket plan.
pub struct Aggregator<'a, S: Surface + ?Sized> {
    surface: &'a S,
    plan: &'a BucketPlan,
    buckets: Vec<Tally>,
    groups: BTreeMap<String, GroupTally>,
    totals: Tally,
    unbucketed: u64,
}

impl<'a, S: Surface + ?Sized> Aggregator<'a, S> {
    pub fn new(surface: &'a S, plan: &'a BucketPlan) -> Self {
        let buckets = std::iter::repeat_with(Tally::default)
            .take(plan.len())
            .collect();
        Self {
            surface,
            plan,
            buckets,
            groups: BTreeMap::new(),
            totals: Tally::default(),
            unbucketed: 0,
        }
    }

    /// Fold one event in. Returns `false` if the surface does not accept it.
    pub fn push(&mut self, event: &EventRecord) -> bool {
        if !self.surface.accepts(event) {
            return false;
        }
        let class = self.surface.classify(event);
        let group = self.surface.group_key(event);

        self.totals.add(class, event.duration_ms);
        match self.plan.index_of(event.timestamp) {
            Some(index) => self.buckets[index].add(class, event.duration_ms),
            None => self.unbucketed += 1,
        }

        let entry = self.groups.entry(group.key).or_default();
        entry.tally.add(class, event.duration_ms);
        if let Some(sub) = group.sub {
            entry.subs.insert(sub);
        }
        true
    }

    pub fn extend<'e, I>(&mut self, events: I)
    where
        I: IntoIterator<Item = &'e EventRecord>,
    {
        for event in events {
            self.push(event);
        }
    }

    pub fn finish(self) -> Aggregation {
        let buckets = self
            .plan
            .keys()
            .iter()
            .zip(self.buckets)
            .map(|(&timestamp, tally)| BucketStats {
                timestamp,
                stats: tally.finish(),
            })
            .collect();
        let groups = self
            .groups
            .into_iter()
            .map(|(key, group)| GroupStats {
                key,
                stats: group.tally.finish(),
                sub_dimensions: group.subs.into_iter().collect(),
            })
            .collect();
        Aggregation {
            buckets,
            groups,
            totals: self.totals.finish(),
            unbucketed: self.unbucketed,
        }
    }
}

/// Finished aggregation: buckets in plan order, groups sorted by key.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Aggregation {
    pub buckets: Vec<BucketStats>,
    pub groups: Vec<GroupStats>,
    pub totals: OutcomeStats,
    /// Accepted events whose timestamp fell outside the plan.
    pub unbucketed: u64,
}

impl Aggregation {
    /// Busiest groups: count descending, then key ascending.
    pub fn top_by_volume(&self, n: usize) -> Vec<GroupStats> {
        let mut ranked: Vec<&GroupStats> = self.groups.iter().collect();
        ranked.sort_by(|a, b| {
            b.stats
                .requests
                .cmp(&a.stats.requests)
                .then_with(|| a.key.cmp(&b.key))
        });
        ranked.into_iter().take(n).cloned().collect()
    }

    /// Slowest groups by p95, ignoring groups with fewer than `min_samples`.
    pub fn top_by_latency(&self, n: usize, min_samples: usize) -> Vec<GroupStats> {
        let mut ranked: Vec<&GroupStats> = self
            .groups
            .iter()
            .filter(|g| g.stats.requests >= min_samples as u64)
            .collect();
        ranked.sort_by(|a, b| latency_order(a, b));
        ranked.into_iter().take(n).cloned().collect()
    }
}

fn latency_order(a: &GroupStats, b: &GroupStats) -> Ordering {
    b.stats
        .p95
        .cmp(&a.stats.p95)
        .then_with(|| b.stats.requests.cmp(&a.stats.requests))
        .then_with(|| a.key.cmp(&b.key))
}
