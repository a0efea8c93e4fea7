//! # PhotoNodes - Node Graph for Visual Image Editing
//!
//! PhotoNodes is the data model behind a node-based image editor. Nodes
//! expose typed sockets, edges carry values from outputs to inputs, and the
//! designated sink is recomputed on demand whenever the graph changes.
//!
//! ## Features
//!
//! - **Typed Sockets**: `Image`, `Float`, `Color` and the wildcard `Any`
//! - **Single-Input Edges**: connecting to a fed input replaces the old edge
//! - **Literal Overrides**: unconnected inputs fall back to editable text
//! - **Pull Evaluation**: the sink is recomputed from scratch, no caching
//! - **Extensible**: add node kinds through the [`Operator`](core::node::Operator) trait
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use photonodes::prelude::*;
//!
//! let registry = OperatorRegistry::with_builtins();
//! let mut graph = NodeGraph::new();
//! graph.on_sink_update(|value| println!("sink: {value}"));
//!
//! let brightness = graph.add_operator(registry.create("brightness").unwrap());
//! graph.connect(graph.source(), 0, brightness, 0)?;
//! graph.connect(brightness, 0, graph.sink(), 0)?;
//! graph.set_literal(brightness, 1, "1.5")?;
//!
//! graph.load_source(Value::Image(ImageValue::from_path("photo.png")?))?;
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: Values, sockets, operators and errors
//! - [`graph`]: Graph structure, edges and topology queries
//! - [`execution`]: The pull evaluator and refresh reporting
//! - [`operators`]: Operator registry and the built-in catalog
//! - [`config`]: Editor configuration

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod core;
pub mod execution;
pub mod graph;
pub mod operators;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use photonodes::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use crate::core::types::{Color, ImageMetadata, ImageValue, SocketType, Value};

    // Sockets
    pub use crate::core::socket::{Socket, SocketDefinition, SocketDirection, SocketId};

    // Operators
    pub use crate::core::context::InputValues;
    pub use crate::core::node::{Category, NodeMetadata, Operator, PassthroughOperator};

    // Errors
    pub use crate::core::error::{
        EdgeId, EvaluationError, GraphError, NodeId, PhotoNodesError, PhotoNodesResult,
    };

    // Graph
    pub use crate::graph::connection::Edge;
    pub use crate::graph::node::GraphNode;
    pub use crate::graph::structure::NodeGraph;
    pub use crate::graph::topology::TopologyAnalyzer;

    // Evaluation
    pub use crate::execution::evaluator::{Evaluation, EvaluationOptions, EvaluationStats, Evaluator};
    pub use crate::execution::trigger::{RefreshOutcome, RefreshReason, SinkCallback};

    // Operators
    pub use crate::operators::registry::{OperatorFactory, OperatorRegistry, RegistryBuilder};
    pub use crate::operators::builtin::{
        // Adjust
        Brightness, Contrast, Grayscale, Invert,
        // Blur
        GaussianBlur,
        // Transform
        CropCenter, Transform,
        // Composite
        Layer, Mix,
        // Generators
        DrawRect, FloatInput, MakeColor,
    };

    // Configuration
    pub use crate::config::EditorConfig;
}

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
