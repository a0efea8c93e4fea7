//! Topological analysis of graphs.
//!
//! Provides algorithms for:
//! - Dependency analysis (upstream and downstream sets)
//! - Reachability
//! - Cycle discovery

use crate::core::error::NodeId;
use crate::graph::structure::NodeGraph;
use std::collections::{HashMap, HashSet, VecDeque};

/// Analyzer for graph topology.
pub struct TopologyAnalyzer<'a> {
    graph: &'a NodeGraph,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Active,
    Done,
}

impl<'a> TopologyAnalyzer<'a> {
    /// Create a new analyzer for the given graph.
    pub fn new(graph: &'a NodeGraph) -> Self {
        Self { graph }
    }

    fn successors(&self, node_id: NodeId) -> impl Iterator<Item = NodeId> + 'a {
        self.graph
            .edges_from(node_id)
            .filter_map(|edge| edge.destination().map(|d| d.node))
    }

    fn predecessors(&self, node_id: NodeId) -> impl Iterator<Item = NodeId> + 'a {
        self.graph.edges_to(node_id).map(|edge| edge.source().node)
    }

    /// Check if `target` is reachable from `start` following edges.
    pub fn is_reachable(&self, start: NodeId, target: NodeId) -> bool {
        if start == target {
            return true;
        }

        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            if current == target {
                return true;
            }
            if visited.insert(current) {
                queue.extend(self.successors(current));
            }
        }

        false
    }

    /// Get all nodes that depend on the given node (downstream).
    pub fn downstream(&self, node_id: NodeId) -> Vec<NodeId> {
        self.collect(node_id, |id| self.successors(id).collect())
    }

    /// Get all nodes that the given node depends on (upstream).
    pub fn upstream(&self, node_id: NodeId) -> Vec<NodeId> {
        self.collect(node_id, |id| self.predecessors(id).collect())
    }

    fn collect(&self, start: NodeId, next: impl Fn(NodeId) -> Vec<NodeId>) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut visited = HashSet::new();
        let mut queue: VecDeque<NodeId> = next(start).into();

        while let Some(current) = queue.pop_front() {
            if visited.insert(current) {
                result.push(current);
                queue.extend(next(current));
            }
        }

        result
    }

    /// Find one directed cycle, returned as the nodes along it.
    pub fn find_cycle(&self) -> Option<Vec<NodeId>> {
        let mut marks: HashMap<NodeId, Mark> = HashMap::new();

        for start in self.graph.node_ids() {
            if marks.contains_key(&start) {
                continue;
            }

            // Iterative DFS; the stack mirrors the active path.
            let mut stack: Vec<(NodeId, Vec<NodeId>)> = vec![(start, self.successors(start).collect())];
            marks.insert(start, Mark::Active);

            while let Some((node, pending)) = stack.last_mut() {
                let Some(next) = pending.pop() else {
                    marks.insert(*node, Mark::Done);
                    stack.pop();
                    continue;
                };

                match marks.get(&next) {
                    Some(Mark::Active) => {
                        let position = stack.iter().position(|(id, _)| *id == next)?;
                        return Some(stack[position..].iter().map(|(id, _)| *id).collect());
                    }
                    Some(Mark::Done) => {}
                    None => {
                        marks.insert(next, Mark::Active);
                        stack.push((next, self.successors(next).collect()));
                    }
                }
            }
        }

        None
    }

    /// Check if the graph has any cycles.
    pub fn has_cycle(&self) -> bool {
        self.find_cycle().is_some()
    }

    /// Nodes that cannot influence the sink.
    pub fn detached_nodes(&self) -> Vec<NodeId> {
        let sink = self.graph.sink();
        let feeding: HashSet<NodeId> = self.upstream(sink).into_iter().collect();
        self.graph
            .node_ids()
            .filter(|id| *id != sink && !feeding.contains(id))
            .collect()
    }
}
