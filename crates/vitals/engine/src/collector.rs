//! In-process metrics collector.
//!
//! Provides:
//! - **RingBuffer**: bounded circular buffer for raw events
//! - **MetricsCollector**: fire-and-forget recording plus on-demand snapshots
//!   that reuse the report composition of the query service

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::warn;
use vitals_types::{EventRecord, TimeRange};

use crate::config::EngineConfig;
use crate::error::{StoreResult, TelemetryResult};
use crate::query::MetricsQuery;
use crate::report::{compose_metrics_report, MetricsReport};
use crate::store::{select_events, EventFilter, EventStore};
use crate::surface::Surface;

// ── Ring Buffer ─────────────────────────────────────────────────────────

/// Fixed-capacity ring of recent items.
///
/// Slots are reserved up front and the ring never grows. Once every slot is
/// filled, each push overwrites the oldest item.
#[derive(Clone, Debug)]
pub struct RingBuffer<T> {
    slots: Vec<T>,
    capacity: usize,
    /// Next slot to overwrite, which holds the oldest item once wrapped.
    cursor: usize,
}

impl<T> RingBuffer<T> {
    /// Create a ring holding at most `capacity` items (at least 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
            cursor: 0,
        }
    }

    /// Push an item, returning the one it displaced if the ring was full.
    pub fn push(&mut self, item: T) -> Option<T> {
        if self.slots.len() < self.capacity {
            self.slots.push(item);
            return None;
        }
        let displaced = std::mem::replace(&mut self.slots[self.cursor], item);
        self.cursor = (self.cursor + 1) % self.capacity;
        Some(displaced)
    }

    /// Items oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        let (newer, older) = self.slots.split_at(self.cursor);
        older.iter().chain(newer)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every item, keeping the reserved slots.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.cursor = 0;
    }
}

// ── Collector ───────────────────────────────────────────────────────────

/// Recording counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CollectorStats {
    pub recorded: u64,
    pub overwritten: u64,
    pub buffered: usize,
    pub capacity: usize,
}

/// Bounded in-memory event sink shared across request handlers.
///
/// Cheap to clone; clones share the same buffer.
#[derive(Clone)]
pub struct MetricsCollector {
    buffer: Arc<Mutex<RingBuffer<EventRecord>>>,
    recorded: Arc<AtomicU64>,
    overwritten: Arc<AtomicU64>,
    config: EngineConfig,
}

impl MetricsCollector {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            buffer: Arc::new(Mutex::new(RingBuffer::new(config.collector_capacity))),
            recorded: Arc::new(AtomicU64::new(0)),
            overwritten: Arc::new(AtomicU64::new(0)),
            config,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(EngineConfig {
            collector_capacity: capacity,
            ..EngineConfig::default()
        })
    }

    /// Append an event. Never fails and never blocks on I/O.
    pub fn record(&self, event: EventRecord) {
        let displaced = self.buffer.lock().push(event);
        self.recorded.fetch_add(1, Ordering::Relaxed);
        if displaced.is_some() {
            self.overwritten.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_request(
        &self,
        route: impl Into<String>,
        method: impl Into<String>,
        status: u16,
        duration_ms: u64,
    ) {
        self.record(EventRecord::request(Utc::now(), route, method, status, duration_ms));
    }

    /// Record a data-access call; `slow` is fixed from the configured threshold.
    pub fn record_query(
        &self,
        model: impl Into<String>,
        action: impl Into<String>,
        success: bool,
        duration_ms: u64,
    ) {
        self.record(EventRecord::data_access(
            Utc::now(),
            model,
            action,
            success,
            duration_ms,
            self.config.slow_query_threshold_ms,
        ));
    }

    pub fn record_job(&self, name: impl Into<String>, success: bool, duration_ms: u64) {
        self.record(EventRecord::job(Utc::now(), name, success, duration_ms));
    }

    /// Copy of the buffered events, oldest first.
    pub fn events(&self) -> Vec<EventRecord> {
        self.buffer.lock().iter().cloned().collect()
    }

    /// Aggregate the buffered events for `surface` as of `now`.
    ///
    /// The buffer is copied under the lock; aggregation runs outside it.
    pub fn snapshot<S: Surface + ?Sized>(
        &self,
        surface: &S,
        query: &MetricsQuery,
        now: DateTime<Utc>,
    ) -> TelemetryResult<MetricsReport> {
        query.validate_for(surface)?;
        let range = query.window.range_ending_at(now);
        let filter = query.event_filter(surface, &self.config);
        let events = {
            let buffer = self.buffer.lock();
            select_events(buffer.iter(), range, &filter)
        };
        let truncated = events.len() >= filter.limit;
        if truncated {
            warn!(cap = filter.limit, "snapshot reached event cap; oldest buffered events skipped");
        }
        Ok(compose_metrics_report(
            surface,
            &events,
            query.window,
            now,
            query.rankings(&self.config),
            truncated,
        ))
    }

    pub fn stats(&self) -> CollectorStats {
        let buffer = self.buffer.lock();
        CollectorStats {
            recorded: self.recorded.load(Ordering::Relaxed),
            overwritten: self.overwritten.load(Ordering::Relaxed),
            buffered: buffer.len(),
            capacity: buffer.capacity(),
        }
    }

    pub fn clear(&self) {
        self.buffer.lock().clear();
    }
}

impl std::fmt::Debug for MetricsCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsCollector")
            .field("stats", &self.stats())
            .finish()
    }
}

#[async_trait]
impl EventStore for MetricsCollector {
    async fn find_events(
        &self,
        range: TimeRange,
        filter: &EventFilter,
    ) -> StoreResult<Vec<EventRecord>> {
        let events = {
            let buffer = self.buffer.lock();
            select_events(buffer.iter(), range, filter)
        };
        Ok(events)
    }
}
