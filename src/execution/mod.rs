//! Evaluation module.
//!
//! This module pulls values through a node graph and reports each refresh.

pub mod evaluator;
pub mod trigger;

pub use evaluator::{Evaluation, EvaluationOptions, EvaluationStats, Evaluator};
pub use trigger::{RefreshOutcome, RefreshReason, SinkCallback};
