//! Converts ONNX models into the FlatBuffers model format described by
//! [`model_schema`].
//!
//! The conversion runs in two stages. [`build_graph`] turns an ONNX graph into
//! an in-memory [`ir::Graph`], normalizing operator attributes along the way,
//! and [`serialize_graph`] writes that graph out as a `Model` buffer. Fatal
//! problems are returned as [`ConvertError`]; anything recoverable is reported
//! as a [`Diagnostic`].

use std::path::Path;

use anyhow::Context;
use tracing::info;
use tract_onnx::{pb::ModelProto, prelude::*};

mod diagnostics;
mod error;
pub mod ir;
pub mod onnx;
mod serialize;
#[doc(hidden)]
pub mod testing;

pub use diagnostics::{Diagnostic, Diagnostics};
pub use error::ConvertError;
pub use onnx::{build_graph, Conversion};
pub use serialize::serialize_graph;

/// A serialized model along with the diagnostics raised while converting it.
#[derive(Debug)]
pub struct ConvertedModel {
    pub data: Vec<u8>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Converts an in-memory ONNX model.
pub fn convert_model(model: &ModelProto) -> Result<ConvertedModel, ConvertError> {
    let graph = model.graph.as_ref().ok_or(ConvertError::MissingGraph)?;
    let Conversion { graph, diagnostics } = build_graph(graph)?;
    let data = serialize_graph(&graph);
    info!(
        bytes = data.len(),
        diagnostics = diagnostics.len(),
        "serialized model"
    );
    Ok(ConvertedModel { data, diagnostics })
}

/// Reads the ONNX model at `input` and writes the converted model to `output`.
///
/// The output file is only created once conversion has succeeded.
pub fn convert_file(input: &Path, output: &Path) -> anyhow::Result<ConvertedModel> {
    let model = tract_onnx::onnx()
        .proto_model_for_path(input)
        .with_context(|| format!("reading ONNX model {}", input.display()))?;
    let converted = convert_model(&model)
        .with_context(|| format!("converting ONNX model {}", input.display()))?;
    std::fs::write(output, &converted.data)
        .with_context(|| format!("writing converted model to {}", output.display()))?;
    Ok(converted)
}
