//! Pull-based evaluator.
//!
//! Evaluation starts at a node (normally the sink) and recursively asks every
//! connected input for its upstream value. Nothing is cached: each call walks
//! the whole upstream subgraph again. The current recursion path is tracked
//! so a cycle fails with `CycleDetected` instead of recursing forever.

use crate::core::context::InputValues;
use crate::core::error::{EvaluationError, EvaluationResult, NodeId};
use crate::core::types::Value;
use crate::graph::node::GraphNode;
use crate::graph::structure::NodeGraph;
use indexmap::IndexSet;
use log::trace;
use serde::{Deserialize, Deserializer, Serialize};
use std::time::{Duration, Instant};

/// Default bound on recursion depth.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Smallest depth that still evaluates a source feeding the sink.
pub const MIN_MAX_DEPTH: usize = 2;

/// Evaluation options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationOptions {
    /// Maximum number of nodes on one recursion path.
    #[serde(deserialize_with = "deserialize_max_depth")]
    pub max_depth: usize,
    /// Whether pass wall time is measured.
    pub collect_timing: bool,
}

fn deserialize_max_depth<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let depth = usize::deserialize(deserializer)?;
    if depth < MIN_MAX_DEPTH {
        return Err(serde::de::Error::custom(format!(
            "max_depth must be at least {MIN_MAX_DEPTH}, got {depth}"
        )));
    }
    Ok(depth)
}

impl Default for EvaluationOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            collect_timing: true,
        }
    }
}

impl EvaluationOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum recursion depth, raised to [`MIN_MAX_DEPTH`] if lower.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(MIN_MAX_DEPTH);
        self
    }

    /// Enable or disable pass timing.
    pub fn with_timing(mut self, collect_timing: bool) -> Self {
        self.collect_timing = collect_timing;
        self
    }
}

/// Statistics for one evaluation pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationStats {
    /// Nodes visited, counting repeat visits through fan-out.
    pub nodes_visited: usize,
    /// Operator calls made.
    pub operator_invocations: usize,
    /// Wall time of the pass; zero when timing is disabled.
    pub duration: Duration,
}

/// Result of evaluating a node.
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// The computed value (`Value::None` when there is no result).
    pub value: Value,
    /// Pass statistics.
    pub stats: EvaluationStats,
}

/// The evaluator.
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    options: EvaluationOptions,
}

impl Evaluator {
    /// Create a new evaluator with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with specific options.
    pub fn with_options(options: EvaluationOptions) -> Self {
        Self { options }
    }

    /// Current options.
    pub fn options(&self) -> &EvaluationOptions {
        &self.options
    }

    /// Evaluate the graph's designated sink.
    pub fn evaluate_sink(&self, graph: &NodeGraph) -> EvaluationResult<Evaluation> {
        self.evaluate(graph, graph.sink())
    }

    /// Evaluate any node in the graph.
    pub fn evaluate(&self, graph: &NodeGraph, node_id: NodeId) -> EvaluationResult<Evaluation> {
        let start = Instant::now();
        let mut pass = Pass::new(graph, &self.options);
        let value = pass.evaluate_node(node_id)?;

        let mut stats = pass.stats;
        if self.options.collect_timing {
            stats.duration = start.elapsed();
        }
        Ok(Evaluation { value, stats })
    }

    /// Resolve one input of a node: upstream value, then literal override,
    /// then the operator's declared fallback.
    pub fn resolve_input(
        &self,
        graph: &NodeGraph,
        node_id: NodeId,
        index: usize,
    ) -> EvaluationResult<Value> {
        let node = graph.get_node(node_id)?;
        let mut pass = Pass::new(graph, &self.options);
        pass.path.insert(node_id);
        pass.resolve_input(node, index)
    }
}

/// State of a single recursive walk.
struct Pass<'a> {
    graph: &'a NodeGraph,
    max_depth: usize,
    path: IndexSet<NodeId>,
    stats: EvaluationStats,
}

impl<'a> Pass<'a> {
    fn new(graph: &'a NodeGraph, options: &EvaluationOptions) -> Self {
        Self {
            graph,
            max_depth: options.max_depth,
            path: IndexSet::new(),
            stats: EvaluationStats::default(),
        }
    }

    fn evaluate_node(&mut self, node_id: NodeId) -> EvaluationResult<Value> {
        if let Some(position) = self.path.get_index_of(&node_id) {
            let nodes = self.path.iter().skip(position).copied().collect();
            return Err(EvaluationError::CycleDetected { nodes });
        }
        if self.path.len() >= self.max_depth {
            return Err(EvaluationError::DepthExceeded {
                limit: self.max_depth,
            });
        }

        let graph = self.graph;
        let node = graph.get_node(node_id)?;
        self.stats.nodes_visited += 1;

        let Some(operator) = node.operator() else {
            trace!("source {} yields {}", node_id, node.held_value());
            return Ok(node.held_value().clone());
        };

        self.path.insert(node_id);
        let resolved = (0..node.inputs().len())
            .map(|index| self.resolve_input(node, index))
            .collect::<EvaluationResult<Vec<_>>>();
        self.path.pop();

        let inputs = InputValues::new(node_id, resolved?);
        self.stats.operator_invocations += 1;
        let value = operator.evaluate(&inputs);
        trace!("{} ({}) yields {}", node.display_name(), node_id, value);
        Ok(value)
    }

    fn resolve_input(&mut self, node: &'a GraphNode, index: usize) -> EvaluationResult<Value> {
        let incoming = node.input(index).and_then(|socket| socket.incoming_edge());
        if let Some(edge_id) = incoming {
            let edge = self.graph.get_edge(edge_id)?;
            let upstream = self.evaluate_node(edge.source().node)?;
            if upstream.is_present() {
                return Ok(upstream);
            }
        }

        if let Some(value) = node.literal_value(index) {
            return Ok(value);
        }

        Ok(node.fallback(index).clone())
    }
}
