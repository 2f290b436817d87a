//! ONNX front end: turns an ONNX graph into the IR.

mod builder;
pub mod constant;
pub mod reader;
pub mod rules;

pub use builder::{build_graph, Conversion};
