//! Fatal conversion errors.
//!
//! Any of these aborts the conversion; nothing is written. Non-fatal findings
//! are reported as [`crate::Diagnostic`]s instead.

use crate::onnx::reader::AttrType;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConvertError {
    #[error("node name \"{0}\" conflicts with another node")]
    DuplicateNodeName(String),
    #[error("unable to find input \"{input}\" for operator \"{op}\"")]
    UnknownInput { op: String, input: String },
    #[error("unable to find output \"{output}\" for operator \"{op}\"")]
    UnknownOutput { op: String, output: String },
    #[error("graph input \"{0}\" does not match any node")]
    UnknownGraphInput(String),
    #[error("graph output \"{0}\" does not match any node")]
    UnknownGraphOutput(String),
    #[error("unsupported operator {op_type} (operator \"{op}\")")]
    UnsupportedOperator { op: String, op_type: String },
    #[error("unsupported element type {data_type} for tensor \"{tensor}\"")]
    UnsupportedElementType { tensor: String, data_type: i32 },
    #[error("invalid data for tensor \"{tensor}\": {reason}")]
    InvalidTensorData { tensor: String, reason: String },
    #[error("unsupported auto_pad value {0}")]
    UnsupportedPadMode(String),
    #[error("unsupported target type {0} for cast")]
    UnsupportedCastTarget(i64),
    #[error("strides must be the same in all dimensions, got {0:?}")]
    NonUniformStride(Vec<i64>),
    #[error("attribute \"{name}\" must have {expected} values, got {actual}")]
    InvalidAttributeLength {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error("missing required attribute \"{0}\"")]
    MissingRequiredAttribute(String),
    #[error("missing required attribute or input \"{0}\"")]
    MissingRequiredAttributeOrInput(String),
    #[error("attribute \"{name}\" has type {actual}, expected {expected}")]
    TypeMismatch {
        name: String,
        expected: AttrType,
        actual: String,
    },
    #[error("input for \"{0}\" was not found or is not a constant")]
    NotAConstant(String),
    #[error("input for \"{0}\" is not a scalar")]
    NotScalar(String),
    #[error("value of \"{0}\" must be a tensor with exactly one element")]
    NotSingleElement(String),
    #[error("unsupported value {value} for attribute \"{name}\", supported: {supported}")]
    UnsupportedAttributeValue {
        name: String,
        value: String,
        supported: String,
    },
    #[error("operator \"{0}\" has no outputs")]
    NoOutputs(String),
    #[error("model does not contain a graph")]
    MissingGraph,
    #[error("graph has more nodes than can be indexed")]
    TooManyNodes,
}

impl ConvertError {
    pub(crate) fn unsupported_value(
        name: &str,
        value: impl std::fmt::Debug,
        supported: impl std::fmt::Display,
    ) -> Self {
        ConvertError::UnsupportedAttributeValue {
            name: name.to_string(),
            value: format!("{value:?}"),
            supported: supported.to_string(),
        }
    }
}
