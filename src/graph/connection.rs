//! Edge type for the graph.
//!
//! An edge is pure topology: a source output socket and, once finalized, a
//! destination input socket. It holds socket handles, never sockets, and
//! does not touch socket edge lists itself; committing is the graph's job.

use crate::core::error::{EdgeId, GraphError, GraphResult};
use crate::core::socket::SocketId;

/// A directed link from an output socket to an input socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    /// Unique identifier for this edge.
    pub id: EdgeId,
    source: SocketId,
    destination: Option<SocketId>,
}

impl Edge {
    /// Create a transient edge anchored at `source` with no destination yet.
    pub fn new(source: SocketId) -> Self {
        Self {
            id: EdgeId::new(),
            source,
            destination: None,
        }
    }

    /// Create an edge with both endpoints bound.
    pub fn between(source: SocketId, destination: SocketId) -> Self {
        Self {
            id: EdgeId::new(),
            source,
            destination: Some(destination),
        }
    }

    /// Bind the destination input socket.
    ///
    /// Only legal once: an edge whose destination is already bound is
    /// rejected with `EdgeAlreadyFinalized`.
    pub fn finalize(&mut self, destination: SocketId) -> GraphResult<()> {
        if self.destination.is_some() {
            return Err(GraphError::EdgeAlreadyFinalized {
                source_socket: self.source,
            });
        }
        self.destination = Some(destination);
        Ok(())
    }

    /// The source output socket.
    pub fn source(&self) -> SocketId {
        self.source
    }

    /// The destination input socket, if bound.
    pub fn destination(&self) -> Option<SocketId> {
        self.destination
    }

    /// Whether the destination is bound.
    pub fn is_finalized(&self) -> bool {
        self.destination.is_some()
    }

    /// Whether `socket` is one of this edge's endpoints.
    pub fn touches(&self, socket: SocketId) -> bool {
        self.source == socket || self.destination == Some(socket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::NodeId;

    #[test]
    fn test_transient_edge() {
        let source = SocketId::output(NodeId::new(), 0);
        let edge = Edge::new(source);

        assert_eq!(edge.source(), source);
        assert_eq!(edge.destination(), None);
        assert!(!edge.is_finalized());
    }

    #[test]
    fn test_finalize_once() {
        let source = SocketId::output(NodeId::new(), 0);
        let first = SocketId::input(NodeId::new(), 0);
        let second = SocketId::input(NodeId::new(), 1);

        let mut edge = Edge::new(source);
        edge.finalize(first).unwrap();
        assert_eq!(edge.destination(), Some(first));
        assert!(edge.touches(first));
        assert!(edge.touches(source));

        let err = edge.finalize(second).unwrap_err();
        assert!(matches!(err, GraphError::EdgeAlreadyFinalized { .. }));
        assert_eq!(edge.destination(), Some(first));
    }

    #[test]
    fn test_between() {
        let source = SocketId::output(NodeId::new(), 0);
        let destination = SocketId::input(NodeId::new(), 0);
        let edge = Edge::between(source, destination);
        assert!(edge.is_finalized());
        assert!(!edge.touches(SocketId::input(source.node, 0)));
    }
}
