//! Refresh triggers and sink notification.

use crate::core::error::{EdgeId, EvaluationError, NodeId};
use crate::core::types::Value;
use crate::execution::evaluator::EvaluationStats;
use std::fmt;

/// Why the sink is being recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshReason {
    /// An edge was committed.
    Connected { edge: EdgeId },
    /// An edge was removed.
    EdgeRemoved { edge: EdgeId },
    /// A node and all its edges were removed.
    NodeRemoved { node: NodeId },
    /// A literal override was edited or cleared.
    LiteralEdited { node: NodeId, index: usize },
    /// A source node received a new held value.
    SourceChanged { node: NodeId },
    /// The host asked for a refresh with nothing pending.
    Explicit,
}

impl fmt::Display for RefreshReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefreshReason::Connected { edge } => write!(f, "edge {} connected", edge),
            RefreshReason::EdgeRemoved { edge } => write!(f, "edge {} removed", edge),
            RefreshReason::NodeRemoved { node } => write!(f, "node {} removed", node),
            RefreshReason::LiteralEdited { node, index } => {
                write!(f, "literal {} on node {} edited", index, node)
            }
            RefreshReason::SourceChanged { node } => write!(f, "source {} changed", node),
            RefreshReason::Explicit => write!(f, "explicit refresh"),
        }
    }
}

/// Callback invoked with the sink's fresh value after every refresh.
///
/// Receives `Value::None` when the sink has no result, including when the
/// pass failed on a cycle.
pub type SinkCallback = Box<dyn FnMut(&Value) + Send>;

/// Record of one refresh pass.
#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    /// What triggered the pass.
    pub reason: RefreshReason,
    /// The value delivered to the sink callback.
    pub value: Value,
    /// Statistics, when the pass completed.
    pub stats: Option<EvaluationStats>,
    /// The failure, when the pass did not complete.
    pub error: Option<EvaluationError>,
}

impl RefreshOutcome {
    /// Whether the pass completed.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}
