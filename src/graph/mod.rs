//! Graph module for managing node graphs.
//!
//! A node graph holds operator nodes and the edges carrying values between
//! their sockets. It is evaluated on demand, pulling from the designated sink.

pub mod structure;
pub mod connection;
pub mod node;
pub mod topology;

// Re-export commonly used types
pub use structure::NodeGraph;
pub use connection::Edge;
pub use node::GraphNode;
pub use topology::TopologyAnalyzer;
