//! In-memory store for development and testing

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use vitals_types::{EventRecord, JobExecutionRecord, TimeRange};

use crate::error::StoreResult;
use crate::store::{
    select_events, select_executions, EventFilter, EventStore, ExecutionQuery, JobExecutionStore,
};

/// Event and execution store backed by vectors behind async locks.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    events: Arc<RwLock<Vec<EventRecord>>>,
    executions: Arc<RwLock<Vec<JobExecutionRecord>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store from existing records.
    pub fn with_records(events: Vec<EventRecord>, executions: Vec<JobExecutionRecord>) -> Self {
        Self {
            events: Arc::new(RwLock::new(events)),
            executions: Arc::new(RwLock::new(executions)),
        }
    }

    pub async fn insert_event(&self, event: EventRecord) {
        self.events.write().await.push(event);
    }

    pub async fn insert_execution(&self, execution: JobExecutionRecord) {
        self.executions.write().await.push(execution);
    }

    pub async fn event_count(&self) -> usize {
        self.events.read().await.len()
    }
}

#[async_trait]
impl EventStore for InMemoryStore {
    async fn find_events(
        &self,
        range: TimeRange,
        filter: &EventFilter,
    ) -> StoreResult<Vec<EventRecord>> {
        let events = self.events.read().await;
        Ok(select_events(events.iter(), range, filter))
    }
}

#[async_trait]
impl JobExecutionStore for InMemoryStore {
    async fn find_executions(&self, query: ExecutionQuery) -> StoreResult<Vec<JobExecutionRecord>> {
        let executions = self.executions.read().await;
        Ok(select_executions(executions.iter(), query))
    }
}
