//! Graph structure and connection management.
//!
//! The NodeGraph is the central data structure that owns all nodes and
//! edges. Nodes and edges live in insertion-ordered arenas keyed by id;
//! sockets and edges refer to each other only through those ids.
//!
//! Every mutation validates before it touches anything, then triggers a
//! refresh of the designated sink (or marks the graph dirty when automatic
//! refresh is off).

use crate::config::EditorConfig;
use crate::core::error::{EdgeId, EvaluationResult, GraphError, GraphResult, NodeId};
use crate::core::node::Operator;
use crate::core::socket::{Socket, SocketDirection, SocketId};
use crate::core::types::Value;
use crate::execution::evaluator::Evaluator;
use crate::execution::trigger::{RefreshOutcome, RefreshReason, SinkCallback};
use crate::graph::connection::Edge;
use crate::graph::node::GraphNode;
use crate::graph::topology::TopologyAnalyzer;
use crate::operators::builtin::system;
use indexmap::IndexMap;
use log::{debug, warn};

/// The node graph.
pub struct NodeGraph {
    nodes: IndexMap<NodeId, GraphNode>,
    edges: IndexMap<EdgeId, Edge>,
    source: NodeId,
    sink: NodeId,
    evaluator: Evaluator,
    auto_refresh: bool,
    pending: Option<RefreshReason>,
    sink_callback: Option<SinkCallback>,
    last_outcome: Option<RefreshOutcome>,
}

impl std::fmt::Debug for NodeGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeGraph")
            .field("nodes", &self.nodes.len())
            .field("edges", &self.edges.len())
            .field("source", &self.source)
            .field("sink", &self.sink)
            .field("auto_refresh", &self.auto_refresh)
            .field("pending", &self.pending)
            .finish()
    }
}

impl NodeGraph {
    /// Create a graph holding the standard image source and result sink.
    pub fn new() -> Self {
        Self::with_endpoints(system::image_source(), system::output_result())
    }

    /// Create a graph around a custom source and sink.
    ///
    /// Both nodes are made permanent.
    pub fn with_endpoints(source: GraphNode, sink: GraphNode) -> Self {
        let source = source.permanent();
        let sink = sink.permanent();
        let source_id = source.id;
        let sink_id = sink.id;

        let mut nodes = IndexMap::new();
        nodes.insert(source_id, source);
        nodes.insert(sink_id, sink);

        Self {
            nodes,
            edges: IndexMap::new(),
            source: source_id,
            sink: sink_id,
            evaluator: Evaluator::new(),
            auto_refresh: true,
            pending: None,
            sink_callback: None,
            last_outcome: None,
        }
    }

    /// Create the standard graph configured by `config`.
    pub fn with_config(config: &EditorConfig) -> Self {
        let mut graph = Self::new();
        graph.evaluator = Evaluator::with_options(config.evaluation.clone());
        graph.auto_refresh = config.auto_refresh;
        graph
    }

    /// Replace the evaluator.
    pub fn set_evaluator(&mut self, evaluator: Evaluator) {
        self.evaluator = evaluator;
    }

    /// The evaluator used for refreshes.
    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    /// Turn immediate refresh on mutation on or off.
    pub fn set_auto_refresh(&mut self, enabled: bool) {
        self.auto_refresh = enabled;
    }

    /// Whether mutations refresh immediately.
    pub fn auto_refresh(&self) -> bool {
        self.auto_refresh
    }

    /// Register the callback receiving the sink's value after each refresh.
    pub fn on_sink_update(&mut self, callback: impl FnMut(&Value) + Send + 'static) {
        self.sink_callback = Some(Box::new(callback));
    }

    /// Drop the sink callback.
    pub fn clear_sink_callback(&mut self) {
        self.sink_callback = None;
    }

    /// The designated source node.
    pub fn source(&self) -> NodeId {
        self.source
    }

    /// The designated sink node.
    pub fn sink(&self) -> NodeId {
        self.sink
    }

    // ========================================================================
    // Node Management
    // ========================================================================

    /// Add a node to the graph.
    ///
    /// An unconnected node cannot affect the sink, so no refresh happens.
    pub fn add_node(&mut self, node: GraphNode) -> NodeId {
        let id = node.id;
        debug!("added node {} ({})", node.display_name(), id);
        self.nodes.insert(id, node);
        id
    }

    /// Add a node from an operator and return the node ID.
    pub fn add_operator(&mut self, operator: Box<dyn Operator>) -> NodeId {
        self.add_node(GraphNode::new(operator))
    }

    /// Remove a node and every edge touching it.
    ///
    /// Permanent nodes are refused and the graph is left unchanged. The
    /// sink is refreshed once, after all edges are gone.
    pub fn remove_node(&mut self, id: NodeId) -> GraphResult<GraphNode> {
        let node = self.get_node(id)?;
        if node.is_permanent() {
            warn!("refusing to remove permanent node {} ({})", node.display_name(), id);
            return Err(GraphError::PermanentNodeRemoval(id));
        }

        for edge in node.edges() {
            self.detach_edge(edge);
        }

        let node = self
            .nodes
            .shift_remove(&id)
            .ok_or(GraphError::NodeNotFound(id))?;
        debug!("removed node {} ({})", node.display_name(), id);

        self.changed(RefreshReason::NodeRemoved { node: id });
        Ok(node)
    }

    /// Get a reference to a node.
    pub fn get_node(&self, id: NodeId) -> GraphResult<&GraphNode> {
        self.nodes.get(&id).ok_or(GraphError::NodeNotFound(id))
    }

    /// Check if a node exists.
    pub fn has_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Get all nodes.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.values()
    }

    /// Get all node IDs.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Get the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Look up a socket by handle.
    pub fn socket(&self, id: SocketId) -> GraphResult<&Socket> {
        self.get_node(id.node)?
            .socket(id)
            .ok_or(GraphError::SocketNotFound { socket: id })
    }

    fn socket_mut(&mut self, id: SocketId) -> Option<&mut Socket> {
        self.nodes.get_mut(&id.node)?.socket_mut(id)
    }

    // ========================================================================
    // Connection Management
    // ========================================================================

    /// Connect an output socket to an input socket.
    ///
    /// Fails with `DirectionMismatch` unless `output` is an output and
    /// `input` an input, and with `TypeMismatch` unless the socket types are
    /// compatible. An edge already feeding `input` is replaced.
    pub fn try_connect(&mut self, output: SocketId, input: SocketId) -> GraphResult<EdgeId> {
        self.validate_connection(output, input)?;
        Ok(self.commit(Edge::between(output, input)))
    }

    /// Connect output `from_index` of `from` to input `to_index` of `to`.
    pub fn connect(
        &mut self,
        from: NodeId,
        from_index: usize,
        to: NodeId,
        to_index: usize,
    ) -> GraphResult<EdgeId> {
        self.try_connect(SocketId::output(from, from_index), SocketId::input(to, to_index))
    }

    /// Connect sockets by name.
    pub fn connect_named(
        &mut self,
        from: NodeId,
        output: &str,
        to: NodeId,
        input: &str,
    ) -> GraphResult<EdgeId> {
        let output_socket = self
            .get_node(from)?
            .output_named(output)
            .ok_or_else(|| GraphError::SocketNameNotFound {
                node_id: from,
                name: output.to_string(),
            })?;
        let input_socket = self
            .get_node(to)?
            .input_named(input)
            .ok_or_else(|| GraphError::SocketNameNotFound {
                node_id: to,
                name: input.to_string(),
            })?;
        self.try_connect(output_socket, input_socket)
    }

    /// Start an edge from an output socket, not yet bound to an input.
    ///
    /// The edge is not part of the graph until [`commit_edge`](Self::commit_edge).
    pub fn begin_edge(&self, output: SocketId) -> GraphResult<Edge> {
        let socket = self.socket(output)?;
        if socket.direction() != SocketDirection::Output {
            return Err(GraphError::DirectionMismatch {
                from: socket.direction(),
                to: SocketDirection::Input,
            });
        }
        Ok(Edge::new(output))
    }

    /// Commit a finalized edge, validating it like [`try_connect`](Self::try_connect).
    pub fn commit_edge(&mut self, edge: Edge) -> GraphResult<EdgeId> {
        let destination = edge.destination().ok_or(GraphError::EdgeNotFinalized {
            source_socket: edge.source(),
        })?;
        self.validate_connection(edge.source(), destination)?;
        Ok(self.commit(edge))
    }

    fn validate_connection(&self, output: SocketId, input: SocketId) -> GraphResult<()> {
        let from = self.socket(output)?;
        let to = self.socket(input)?;

        if from.direction() != SocketDirection::Output || to.direction() != SocketDirection::Input
        {
            return Err(GraphError::DirectionMismatch {
                from: from.direction(),
                to: to.direction(),
            });
        }

        if !from.socket_type().compatible_with(&to.socket_type()) {
            return Err(GraphError::TypeMismatch {
                from_type: from.socket_type(),
                to_type: to.socket_type(),
            });
        }

        Ok(())
    }

    /// Register a validated, finalized edge on both endpoints.
    fn commit(&mut self, edge: Edge) -> EdgeId {
        let id = edge.id;
        let output = edge.source();
        let Some(input) = edge.destination() else {
            return id;
        };

        let replaced = self
            .socket(input)
            .ok()
            .and_then(|socket| socket.incoming_edge());
        if let Some(old) = replaced {
            debug!("replacing edge {} into {}", old, input);
            self.detach_edge(old);
        }

        if let Some(socket) = self.socket_mut(output) {
            socket.connect_edge(id);
        }
        if let Some(socket) = self.socket_mut(input) {
            socket.connect_edge(id);
        }
        self.edges.insert(id, edge);
        debug!("connected {} -> {} as edge {}", output, input, id);

        self.changed(RefreshReason::Connected { edge: id });
        id
    }

    /// Remove an edge.
    ///
    /// Removing an unknown edge is a no-op and returns `None`.
    pub fn remove_edge(&mut self, id: EdgeId) -> Option<Edge> {
        let edge = self.detach_edge(id)?;
        debug!("removed edge {}", id);
        self.changed(RefreshReason::EdgeRemoved { edge: id });
        Some(edge)
    }

    /// Drop an edge from the arena and from both endpoint sockets.
    fn detach_edge(&mut self, id: EdgeId) -> Option<Edge> {
        let edge = self.edges.shift_remove(&id)?;
        if let Some(socket) = self.socket_mut(edge.source()) {
            socket.disconnect_edge(id);
        }
        if let Some(socket) = edge.destination().and_then(|d| self.socket_mut(d)) {
            socket.disconnect_edge(id);
        }
        Some(edge)
    }

    /// Get an edge by ID.
    pub fn get_edge(&self, id: EdgeId) -> GraphResult<&Edge> {
        self.edges.get(&id).ok_or(GraphError::EdgeNotFound(id))
    }

    /// Check if an edge exists.
    pub fn has_edge(&self, id: EdgeId) -> bool {
        self.edges.contains_key(&id)
    }

    /// Get all edges.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    /// Get the number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Edges leaving any output of `node_id`.
    pub fn edges_from(&self, node_id: NodeId) -> impl Iterator<Item = &Edge> {
        self.edges
            .values()
            .filter(move |edge| edge.source().node == node_id)
    }

    /// Edges entering any input of `node_id`.
    pub fn edges_to(&self, node_id: NodeId) -> impl Iterator<Item = &Edge> {
        self.edges
            .values()
            .filter(move |edge| edge.destination().map(|d| d.node) == Some(node_id))
    }

    // ========================================================================
    // Literals and Source Values
    // ========================================================================

    /// Set the literal override text of input `index`.
    ///
    /// Text that does not parse as the input's type is stored as-is and
    /// resolves to the operator's fallback.
    pub fn set_literal(
        &mut self,
        node_id: NodeId,
        index: usize,
        text: impl Into<String>,
    ) -> GraphResult<()> {
        self.write_literal(node_id, index, Some(text.into()))
    }

    /// Clear the literal override of input `index`.
    pub fn clear_literal(&mut self, node_id: NodeId, index: usize) -> GraphResult<()> {
        self.write_literal(node_id, index, None)
    }

    fn write_literal(
        &mut self,
        node_id: NodeId,
        index: usize,
        text: Option<String>,
    ) -> GraphResult<()> {
        let node = self
            .nodes
            .get_mut(&node_id)
            .ok_or(GraphError::NodeNotFound(node_id))?;
        if !node.set_literal(index, text) {
            return Err(GraphError::SocketNotFound {
                socket: SocketId::input(node_id, index),
            });
        }
        self.changed(RefreshReason::LiteralEdited {
            node: node_id,
            index,
        });
        Ok(())
    }

    /// Push a new held value into a source node.
    pub fn set_source_value(&mut self, node_id: NodeId, value: Value) -> GraphResult<()> {
        let node = self
            .nodes
            .get_mut(&node_id)
            .ok_or(GraphError::NodeNotFound(node_id))?;
        if !node.is_source() {
            return Err(GraphError::NotASource(node_id));
        }
        debug!("source {} now holds {}", node_id, value);
        node.set_held_value(value);
        self.changed(RefreshReason::SourceChanged { node: node_id });
        Ok(())
    }

    /// Push a new held value into the designated source.
    pub fn load_source(&mut self, value: Value) -> GraphResult<()> {
        self.set_source_value(self.source, value)
    }

    // ========================================================================
    // Evaluation
    // ========================================================================

    /// Evaluate the sink without touching callbacks or literal flags.
    pub fn evaluate_sink(&self) -> EvaluationResult<Value> {
        self.evaluator.evaluate_sink(self).map(|e| e.value)
    }

    /// Refresh now, consuming any pending trigger.
    pub fn refresh(&mut self) -> &RefreshOutcome {
        let reason = self.pending.take().unwrap_or(RefreshReason::Explicit);
        self.run_refresh(reason)
    }

    /// Whether a mutation is waiting for [`refresh`](Self::refresh).
    pub fn is_dirty(&self) -> bool {
        self.pending.is_some()
    }

    /// Outcome of the most recent refresh.
    pub fn last_outcome(&self) -> Option<&RefreshOutcome> {
        self.last_outcome.as_ref()
    }

    fn changed(&mut self, reason: RefreshReason) {
        if self.auto_refresh {
            self.run_refresh(reason);
        } else {
            self.pending = Some(reason);
        }
    }

    fn run_refresh(&mut self, reason: RefreshReason) -> &RefreshOutcome {
        self.pending = None;
        for node in self.nodes.values_mut() {
            node.refresh_literal_flags();
        }

        let outcome = match self.evaluator.evaluate_sink(self) {
            Ok(evaluation) => {
                debug!(
                    "refresh after {}: {} operator calls in {:?}",
                    reason, evaluation.stats.operator_invocations, evaluation.stats.duration
                );
                RefreshOutcome {
                    reason,
                    value: evaluation.value,
                    stats: Some(evaluation.stats),
                    error: None,
                }
            }
            Err(error) => {
                warn!("refresh after {} failed: {}", reason, error);
                RefreshOutcome {
                    reason,
                    value: Value::None,
                    stats: None,
                    error: Some(error),
                }
            }
        };

        if let Some(callback) = self.sink_callback.as_mut() {
            callback(&outcome.value);
        }
        self.last_outcome.insert(outcome)
    }

    // ========================================================================
    // Graph Analysis
    // ========================================================================

    /// Whether committing `output -> input` would close a cycle.
    pub fn would_create_cycle(&self, output: SocketId, input: SocketId) -> bool {
        TopologyAnalyzer::new(self).is_reachable(input.node, output.node)
    }

    /// Nodes the given node depends on.
    pub fn upstream(&self, node_id: NodeId) -> Vec<NodeId> {
        TopologyAnalyzer::new(self).upstream(node_id)
    }

    /// Nodes depending on the given node.
    pub fn downstream(&self, node_id: NodeId) -> Vec<NodeId> {
        TopologyAnalyzer::new(self).downstream(node_id)
    }
}

impl Default for NodeGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::EvaluationError;
    use crate::core::context::InputValues;
    use crate::core::node::{NodeMetadata, PassthroughOperator};
    use crate::core::socket::SocketDefinition;
    use crate::core::types::{ImageValue, SocketType};
    use crate::execution::evaluator::EvaluationOptions;
    use crate::operators::builtin::{Brightness, FloatInput, MakeColor};
    use proptest::prelude::*;
    use std::sync::{Arc, Mutex};

    fn sample_image() -> ImageValue {
        ImageValue::from_rgba(image::RgbaImage::from_pixel(
            2,
            2,
            image::Rgba([100, 50, 200, 255]),
        ))
    }

    /// source -> brightness -> sink
    fn brightness_chain() -> (NodeGraph, NodeId, EdgeId) {
        let mut graph = NodeGraph::new();
        let brightness = graph.add_operator(Box::new(Brightness));
        let source = graph.source();
        let sink = graph.sink();
        let feed = graph.connect(source, 0, brightness, 0).unwrap();
        graph.connect(brightness, 0, sink, 0).unwrap();
        (graph, brightness, feed)
    }

    /// One input and one output of the same type.
    #[derive(Debug, Clone)]
    struct TypedPort(SocketType);

    impl Operator for TypedPort {
        fn metadata(&self) -> NodeMetadata {
            NodeMetadata::builder("typed_port", "Typed Port")
                .input(SocketDefinition::input("In", self.0))
                .output(SocketDefinition::output("Out", self.0))
                .build()
        }

        fn evaluate(&self, inputs: &InputValues) -> Value {
            inputs.get(0).clone()
        }

        fn clone_box(&self) -> Box<dyn Operator> {
            Box::new(self.clone())
        }
    }

    fn assert_consistent(graph: &NodeGraph) {
        for edge in graph.edges() {
            let destination = edge.destination().expect("committed edges are finalized");
            assert!(graph.socket(edge.source()).unwrap().edges().contains(&edge.id));
            assert!(graph.socket(destination).unwrap().edges().contains(&edge.id));
        }
        for node in graph.nodes() {
            for socket in node.inputs().iter().chain(node.outputs()) {
                assert!(socket.connection_count() <= 1 || socket.direction() == SocketDirection::Output);
                for edge in socket.edges() {
                    assert!(graph.has_edge(*edge), "dangling edge {edge} on {}", socket.id());
                }
            }
        }
    }

    #[test]
    fn test_default_graph() {
        let graph = NodeGraph::new();
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.get_node(graph.source()).unwrap().is_source());
        assert!(graph.get_node(graph.sink()).unwrap().is_permanent());
        assert!(graph.last_outcome().is_none());
    }

    #[test]
    fn test_connect_nodes() {
        let (graph, brightness, feed) = brightness_chain();

        assert_eq!(graph.edge_count(), 2);
        let edge = graph.get_edge(feed).unwrap();
        assert_eq!(edge.source(), SocketId::output(graph.source(), 0));
        assert_eq!(edge.destination(), Some(SocketId::input(brightness, 0)));
        assert_consistent(&graph);
    }

    #[test]
    fn test_direction_mismatch_leaves_graph_unchanged() {
        let mut graph = NodeGraph::new();
        let a = graph.add_operator(Box::new(PassthroughOperator));
        let b = graph.add_operator(Box::new(PassthroughOperator));

        let result = graph.try_connect(SocketId::input(a, 0), SocketId::input(b, 0));
        assert!(matches!(result, Err(GraphError::DirectionMismatch { .. })));

        let result = graph.try_connect(SocketId::input(b, 0), SocketId::output(a, 0));
        assert_eq!(
            result,
            Err(GraphError::DirectionMismatch {
                from: SocketDirection::Input,
                to: SocketDirection::Output,
            })
        );
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_color_to_float_is_type_mismatch() {
        let mut graph = NodeGraph::new();
        let color = graph.add_operator(Box::new(MakeColor));
        let brightness = graph.add_operator(Box::new(Brightness));

        let result = graph.connect(color, 0, brightness, 1);
        assert_eq!(
            result,
            Err(GraphError::TypeMismatch {
                from_type: SocketType::Color,
                to_type: SocketType::Float,
            })
        );
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.last_outcome().is_none());
    }

    #[test]
    fn test_missing_socket() {
        let mut graph = NodeGraph::new();
        let a = graph.add_operator(Box::new(PassthroughOperator));
        let result = graph.connect(a, 3, graph.sink(), 0);
        assert_eq!(
            result,
            Err(GraphError::SocketNotFound {
                socket: SocketId::output(a, 3)
            })
        );

        let result = graph.connect_named(a, "Output", graph.sink(), "Nope");
        assert!(matches!(result, Err(GraphError::SocketNameNotFound { .. })));
    }

    #[test]
    fn test_connect_replaces_existing_input_edge() {
        let mut graph = NodeGraph::new();
        let first = graph.add_operator(Box::new(FloatInput));
        let second = graph.add_operator(Box::new(FloatInput));
        let brightness = graph.add_operator(Box::new(Brightness));

        let old = graph.connect(first, 0, brightness, 1).unwrap();
        let new = graph.connect(second, 0, brightness, 1).unwrap();

        assert_eq!(graph.edge_count(), 1);
        assert!(!graph.has_edge(old));
        let input = graph.socket(SocketId::input(brightness, 1)).unwrap();
        assert_eq!(input.edges(), &[new]);
        let first_out = graph.socket(SocketId::output(first, 0)).unwrap();
        assert!(!first_out.is_connected());
        assert_consistent(&graph);
    }

    #[test]
    fn test_outputs_fan_out() {
        let mut graph = NodeGraph::new();
        let float = graph.add_operator(Box::new(FloatInput));
        let a = graph.add_operator(Box::new(Brightness));
        let b = graph.add_operator(Box::new(Brightness));
        graph.connect(float, 0, a, 1).unwrap();
        graph.connect(float, 0, b, 1).unwrap();

        let output = graph.socket(SocketId::output(float, 0)).unwrap();
        assert_eq!(output.connection_count(), 2);
        assert_consistent(&graph);
    }

    #[test]
    fn test_remove_edge_is_idempotent() {
        let (mut graph, brightness, feed) = brightness_chain();

        let removed = graph.remove_edge(feed).unwrap();
        assert_eq!(removed.id, feed);
        assert_eq!(graph.edge_count(), 1);
        assert!(!graph.socket(SocketId::input(brightness, 0)).unwrap().is_connected());

        assert!(graph.remove_edge(feed).is_none());
        assert_eq!(graph.edge_count(), 1);
        assert_consistent(&graph);
    }

    #[test]
    fn test_remove_node_cascades() {
        let (mut graph, brightness, _) = brightness_chain();
        let float = graph.add_operator(Box::new(FloatInput));
        graph.connect(float, 0, brightness, 1).unwrap();
        assert_eq!(graph.edge_count(), 3);

        let removed = graph.remove_node(brightness).unwrap();
        assert_eq!(removed.id, brightness);
        assert_eq!(graph.edge_count(), 0);
        assert!(!graph.has_node(brightness));
        assert!(!graph.socket(SocketId::output(float, 0)).unwrap().is_connected());
        assert!(!graph.socket(SocketId::input(graph.sink(), 0)).unwrap().is_connected());
        assert_eq!(
            graph.last_outcome().unwrap().reason,
            RefreshReason::NodeRemoved { node: brightness }
        );
        assert_consistent(&graph);
    }

    #[test]
    fn test_remove_node_refreshes_once() {
        let (mut graph, brightness, _) = brightness_chain();
        let calls = Arc::new(Mutex::new(0usize));
        let counter = Arc::clone(&calls);
        graph.on_sink_update(move |_| *counter.lock().unwrap() += 1);

        graph.remove_node(brightness).unwrap();
        assert_eq!(*calls.lock().unwrap(), 1);
    }

    #[test]
    fn test_permanent_nodes_cannot_be_removed() {
        let (mut graph, _, _) = brightness_chain();
        let sink = graph.sink();

        let source = graph.source();
        assert_eq!(
            graph.remove_node(sink).unwrap_err(),
            GraphError::PermanentNodeRemoval(sink)
        );
        assert_eq!(
            graph.remove_node(source).unwrap_err(),
            GraphError::PermanentNodeRemoval(source)
        );
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_consistent(&graph);
    }

    #[test]
    fn test_remove_unknown_node() {
        let mut graph = NodeGraph::new();
        let missing = NodeId::new();
        assert_eq!(
            graph.remove_node(missing).unwrap_err(),
            GraphError::NodeNotFound(missing)
        );
    }

    #[test]
    fn test_brightness_scenario() {
        let (mut graph, brightness, feed) = brightness_chain();
        let results = Arc::new(Mutex::new(Vec::new()));
        let sink_values = Arc::clone(&results);
        graph.on_sink_update(move |value| sink_values.lock().unwrap().push(value.clone()));

        graph.load_source(Value::Image(sample_image())).unwrap();
        let value = graph.last_outcome().unwrap().value.clone();
        let image = value.as_image().expect("sink should hold an image").to_rgba8();
        // Factor literal 1.2 applied to (100, 50, 200)
        assert_eq!(image.get_pixel(0, 0).0, [120, 60, 240, 255]);

        graph.remove_edge(feed).unwrap();
        // Brightness with no image yields nothing
        assert!(graph.last_outcome().unwrap().value.is_none());
        assert!(graph.get_node(brightness).unwrap().is_literal_enabled(1));

        let delivered = results.lock().unwrap();
        assert_eq!(delivered.len(), 2);
        assert!(delivered[1].is_none());
    }

    #[test]
    fn test_literal_edit_triggers_refresh() {
        let (mut graph, brightness, _) = brightness_chain();
        graph.load_source(Value::Image(sample_image())).unwrap();

        graph.set_literal(brightness, 1, "0.5").unwrap();
        let outcome = graph.last_outcome().unwrap();
        assert_eq!(outcome.reason, RefreshReason::LiteralEdited { node: brightness, index: 1 });
        let image = outcome.value.as_image().unwrap().to_rgba8();
        assert_eq!(image.get_pixel(0, 0).0, [50, 25, 100, 255]);

        // Malformed text falls back to the declared default of 1.0
        graph.set_literal(brightness, 1, "half").unwrap();
        let image = graph.evaluate_sink().unwrap();
        assert_eq!(image.as_image().unwrap().to_rgba8().get_pixel(0, 0).0, [100, 50, 200, 255]);

        graph.clear_literal(brightness, 1).unwrap();
        assert_eq!(graph.get_node(brightness).unwrap().literal(1), None);

        assert_eq!(
            graph.set_literal(brightness, 7, "1.0"),
            Err(GraphError::SocketNotFound { socket: SocketId::input(brightness, 7) })
        );
    }

    #[test]
    fn test_literal_flags_track_connections() {
        let mut graph = NodeGraph::new();
        let float = graph.add_operator(Box::new(FloatInput));
        let brightness = graph.add_operator(Box::new(Brightness));

        let edge = graph.connect(float, 0, brightness, 1).unwrap();
        assert!(!graph.get_node(brightness).unwrap().is_literal_enabled(1));

        graph.remove_edge(edge);
        assert!(graph.get_node(brightness).unwrap().is_literal_enabled(1));
    }

    #[test]
    fn test_source_value_only_on_sources() {
        let mut graph = NodeGraph::new();
        let float = graph.add_operator(Box::new(FloatInput));
        assert_eq!(
            graph.set_source_value(float, Value::Float(1.0)),
            Err(GraphError::NotASource(float))
        );

        graph.load_source(Value::Image(sample_image())).unwrap();
        assert_eq!(
            graph.last_outcome().unwrap().reason,
            RefreshReason::SourceChanged { node: graph.source() }
        );
    }

    #[test]
    fn test_manual_refresh_mode() {
        let mut graph = NodeGraph::with_config(&EditorConfig {
            auto_refresh: false,
            evaluation: EvaluationOptions::default(),
        });
        let calls = Arc::new(Mutex::new(0usize));
        let counter = Arc::clone(&calls);
        graph.on_sink_update(move |_| *counter.lock().unwrap() += 1);

        let source = graph.source();
        let sink = graph.sink();
        let edge = graph.connect(source, 0, sink, 0).unwrap();
        assert!(graph.is_dirty());
        assert_eq!(*calls.lock().unwrap(), 0);

        let outcome = graph.refresh();
        assert_eq!(outcome.reason, RefreshReason::Connected { edge });
        assert!(!graph.is_dirty());
        assert_eq!(*calls.lock().unwrap(), 1);

        assert_eq!(graph.refresh().reason, RefreshReason::Explicit);
    }

    #[test]
    fn test_interactive_commit() {
        let mut graph = NodeGraph::new();
        let brightness = graph.add_operator(Box::new(Brightness));
        let output = SocketId::output(graph.source(), 0);

        let edge = graph.begin_edge(output).unwrap();
        assert_eq!(
            graph.commit_edge(edge.clone()),
            Err(GraphError::EdgeNotFinalized { source_socket: output })
        );

        let mut edge = edge;
        edge.finalize(SocketId::input(brightness, 0)).unwrap();
        let expected = edge.id;
        assert_eq!(graph.commit_edge(edge).unwrap(), expected);
        assert!(graph.has_edge(expected));

        let input = SocketId::input(brightness, 0);
        assert!(matches!(
            graph.begin_edge(input),
            Err(GraphError::DirectionMismatch { .. })
        ));
    }

    #[test]
    fn test_cycle_fails_refresh_with_none() {
        let mut graph = NodeGraph::new();
        let a = graph.add_operator(Box::new(PassthroughOperator));
        let b = graph.add_operator(Box::new(PassthroughOperator));
        let sink = graph.sink();
        graph.connect(a, 0, sink, 0).unwrap();
        graph.connect(a, 0, b, 0).unwrap();

        assert!(graph.would_create_cycle(SocketId::output(b, 0), SocketId::input(a, 0)));
        graph.connect(b, 0, a, 0).unwrap();

        let outcome = graph.last_outcome().unwrap();
        assert!(outcome.value.is_none());
        assert!(matches!(outcome.error, Some(EvaluationError::CycleDetected { .. })));
    }

    #[test]
    fn test_upstream_downstream() {
        let (graph, brightness, _) = brightness_chain();
        let upstream = graph.upstream(graph.sink());
        assert_eq!(upstream.len(), 2);
        assert!(upstream.contains(&brightness));
        assert!(upstream.contains(&graph.source()));
        assert_eq!(graph.downstream(brightness), vec![graph.sink()]);
    }

    proptest! {
        #[test]
        fn prop_type_compatibility_matches_connect(a in 0usize..4, b in 0usize..4) {
            let from = SocketType::all()[a];
            let to = SocketType::all()[b];
            let expected = from == to || from == SocketType::Any || to == SocketType::Any;
            prop_assert_eq!(from.compatible_with(&to), expected);

            // Both wiring directions agree with the type rule
            let mut graph = NodeGraph::new();
            let left = graph.add_operator(Box::new(TypedPort(from)));
            let right = graph.add_operator(Box::new(TypedPort(to)));

            for (output, input) in [(left, right), (right, left)] {
                let result = graph.connect(output, 0, input, 0);
                if expected {
                    prop_assert!(result.is_ok());
                } else {
                    let is_type_mismatch = matches!(result, Err(GraphError::TypeMismatch { .. }));
                    prop_assert!(is_type_mismatch);
                }
            }
            prop_assert_eq!(graph.edge_count(), if expected { 2 } else { 0 });
            assert_consistent(&graph);
        }

        #[test]
        fn prop_inputs_hold_at_most_one_edge(
            wiring in prop::collection::vec((0usize..4, 0usize..4, any::<bool>()), 1..24)
        ) {
            let mut graph = NodeGraph::new();
            let floats: Vec<NodeId> = (0..4).map(|_| graph.add_operator(Box::new(FloatInput))).collect();
            let targets: Vec<NodeId> = (0..4).map(|_| graph.add_operator(Box::new(Brightness))).collect();

            for (from, to, remove) in wiring {
                let edge = graph.connect(floats[from], 0, targets[to], 1).unwrap();
                if remove {
                    graph.remove_edge(edge);
                }
            }

            for target in &targets {
                let input = graph.socket(SocketId::input(*target, 1)).unwrap();
                prop_assert!(input.connection_count() <= 1);
            }
            prop_assert!(graph.edge_count() <= targets.len());
            assert_consistent(&graph);
        }
    }
}
