/// Completed run storage
///
/// Process-lifetime map of run_id to result. Bounded: once `capacity` runs are
/// held, storing another evicts the oldest one.

use crate::runtime::result::ExecutionResult;
use crate::workflow::types::RunState;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Inner {
    runs: HashMap<String, Arc<ExecutionResult>>,
    /// Insertion order, oldest first
    order: VecDeque<String>,
}

/// Bounded run store with FIFO eviction. A capacity of 0 disables the bound.
#[derive(Debug)]
pub struct RunStore {
    inner: RwLock<Inner>,
    capacity: usize,
}

impl RunStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            capacity,
        }
    }

    /// Store a result, replacing any previous result with the same run id
    pub async fn insert(&self, result: ExecutionResult) -> Arc<ExecutionResult> {
        let result = Arc::new(result);
        let mut inner = self.inner.write().await;

        let run_id = result.run_id.clone();
        if inner.runs.insert(run_id.clone(), Arc::clone(&result)).is_none() {
            inner.order.push_back(run_id);
        }

        while self.capacity > 0 && inner.runs.len() > self.capacity {
            let Some(oldest) = inner.order.pop_front() else {
                break;
            };
            inner.runs.remove(&oldest);
            tracing::debug!(run_id = %oldest, "Evicted run from store");
        }

        result
    }

    /// Full stored result
    pub async fn get(&self, run_id: &str) -> Option<Arc<ExecutionResult>> {
        self.inner.read().await.runs.get(run_id).cloned()
    }

    /// Final state of a stored run
    pub async fn get_final_state(&self, run_id: &str) -> Option<RunState> {
        self.get(run_id).await.map(|r| r.final_state.clone())
    }

    pub async fn contains(&self, run_id: &str) -> bool {
        self.inner.read().await.runs.contains_key(run_id)
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.runs.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
