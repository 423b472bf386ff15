/// Run output types
///
/// One `ExecutionLog` per completed step and one immutable `ExecutionResult`
/// per finished run.

use crate::workflow::types::RunState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Audit entry for a single completed step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionLog {
    /// 1-based step sequence number
    pub step_id: usize,
    /// Node executed in this step
    pub node_id: String,
    /// Independent copy of the run state right after this step's merge
    pub state_snapshot: RunState,
}

/// Why a run stopped without an error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum TerminationReason {
    /// The last node had no outgoing edge whose condition matched
    Completed { node_id: String },
    /// The step ceiling was reached
    StepLimit { max_steps: usize },
    /// The start node or an edge target is not a declared node
    UnknownNode { node_id: String },
    /// A tool raised an error; state and logs reflect the previous step
    StoppedOnToolError { node_id: String, error: String },
}

impl TerminationReason {
    /// Whether the run ended through normal routing rather than a forced stop
    pub fn is_natural(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// Final outcome of a run, stored in the run store under `run_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub run_id: String,
    pub graph_id: String,
    /// State after the last completed step
    pub final_state: RunState,
    /// Ordered per-step audit trail
    pub logs: Vec<ExecutionLog>,
    pub termination: TerminationReason,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ExecutionResult {
    /// Number of completed steps
    pub fn steps(&self) -> usize {
        self.logs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_only_completed_is_natural() {
        assert!(TerminationReason::Completed { node_id: "a".into() }.is_natural());
        assert!(!TerminationReason::StepLimit { max_steps: 100 }.is_natural());
        assert!(!TerminationReason::UnknownNode { node_id: "ghost".into() }.is_natural());
        assert!(!TerminationReason::StoppedOnToolError {
            node_id: "a".into(),
            error: "boom".into()
        }
        .is_natural());
    }

    #[test]
    fn test_termination_wire_format() {
        let reason = TerminationReason::StepLimit { max_steps: 3 };
        assert_eq!(
            serde_json::to_value(&reason).unwrap(),
            json!({"reason": "step_limit", "max_steps": 3})
        );
    }
}
