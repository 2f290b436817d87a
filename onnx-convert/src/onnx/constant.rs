//! Materialization of ONNX tensors into constant nodes.

use tract_onnx::pb::{tensor_proto::DataType, NodeProto, TensorProto};

use crate::{
    diagnostics::{Diagnostic, Diagnostics},
    error::ConvertError,
    ir::{ConstantData, ConstantNode},
    onnx::reader::AttributeReader,
};

// Saturation bounds for int64 to int32 narrowing.
const MAX_INT: i64 = i32::MAX as i64;
const MIN_INT: i64 = -(i32::MAX as i64);

/// Converts an initializer tensor into a constant node of the same name.
pub fn constant_from_tensor(
    tensor: &TensorProto,
    diagnostics: &mut Diagnostics,
) -> Result<ConstantNode, ConvertError> {
    materialize(&tensor.name, tensor, diagnostics)
}

/// Converts a `Constant` operator into a constant node named after the
/// operator's sole output.
pub fn constant_from_constant_op(
    node: &NodeProto,
    diagnostics: &mut Diagnostics,
) -> Result<ConstantNode, ConvertError> {
    let name = node
        .output
        .first()
        .ok_or_else(|| ConvertError::NoOutputs(node.name.clone()))?
        .clone();
    let mut reader = AttributeReader::new(node, diagnostics);

    if let Some(tensor) = reader.get_opt::<TensorProto>("value")? {
        return materialize(&name, &tensor, reader.diagnostics());
    }
    if let Some(value) = reader.get_opt::<f32>("value_float")? {
        return ConstantNode::new(name, vec![], ConstantData::Float(vec![value]));
    }
    if let Some(value) = reader.get_opt::<i64>("value_int")? {
        let data = narrow_i64(&name, vec![value], reader.diagnostics());
        return ConstantNode::new(name, vec![], ConstantData::Int(data));
    }
    if let Some(values) = reader.get_opt::<Vec<i64>>("value_ints")? {
        let len = u32::try_from(values.len()).map_err(|_| ConvertError::InvalidTensorData {
            tensor: name.clone(),
            reason: format!("{} values do not fit a single dimension", values.len()),
        })?;
        let data = narrow_i64(&name, values, reader.diagnostics());
        return ConstantNode::new(name, vec![len], ConstantData::Int(data));
    }
    Err(ConvertError::MissingRequiredAttribute("value".to_string()))
}

fn materialize(
    name: &str,
    tensor: &TensorProto,
    diagnostics: &mut Diagnostics,
) -> Result<ConstantNode, ConvertError> {
    let invalid = |reason: String| ConvertError::InvalidTensorData {
        tensor: name.to_string(),
        reason,
    };
    let shape = tensor
        .dims
        .iter()
        .map(|&dim| u32::try_from(dim).map_err(|_| invalid(format!("dimension {dim} is out of range"))))
        .collect::<Result<Vec<_>, _>>()?;

    let raw = tensor.raw_data.as_slice();
    let data = match DataType::from_i32(tensor.data_type) {
        Some(DataType::Float) => ConstantData::Float(if tensor.float_data.is_empty() {
            decode_raw(name, raw, f32::from_le_bytes)?
        } else {
            tensor.float_data.clone()
        }),
        Some(DataType::Uint8) => {
            ConstantData::Int(int_data(name, tensor, |b: [u8; 1]| u8::from_le_bytes(b).into())?)
        }
        Some(DataType::Int8) => {
            ConstantData::Int(int_data(name, tensor, |b: [u8; 1]| i8::from_le_bytes(b).into())?)
        }
        Some(DataType::Uint16) => {
            ConstantData::Int(int_data(name, tensor, |b: [u8; 2]| u16::from_le_bytes(b).into())?)
        }
        Some(DataType::Int16) => {
            ConstantData::Int(int_data(name, tensor, |b: [u8; 2]| i16::from_le_bytes(b).into())?)
        }
        Some(DataType::Int32) => ConstantData::Int(int_data(name, tensor, i32::from_le_bytes)?),
        Some(DataType::Int64) => {
            let values = if tensor.int64_data.is_empty() {
                decode_raw(name, raw, i64::from_le_bytes)?
            } else {
                tensor.int64_data.clone()
            };
            ConstantData::Int(narrow_i64(name, values, diagnostics))
        }
        _ => {
            return Err(ConvertError::UnsupportedElementType {
                tensor: name.to_string(),
                data_type: tensor.data_type,
            })
        }
    };

    ConstantNode::new(name.to_string(), shape, data)
}

/// Element data of a tensor whose typed payload lives in `int32_data`.
fn int_data<const N: usize>(
    name: &str,
    tensor: &TensorProto,
    convert: impl Fn([u8; N]) -> i32,
) -> Result<Vec<i32>, ConvertError> {
    if tensor.int32_data.is_empty() {
        decode_raw(name, &tensor.raw_data, convert)
    } else {
        Ok(tensor.int32_data.clone())
    }
}

/// Decodes a little-endian `raw_data` buffer of `N`-byte elements.
fn decode_raw<const N: usize, T>(
    name: &str,
    raw: &[u8],
    convert: impl Fn([u8; N]) -> T,
) -> Result<Vec<T>, ConvertError> {
    if raw.len() % N != 0 {
        return Err(ConvertError::InvalidTensorData {
            tensor: name.to_string(),
            reason: format!(
                "raw data length {} is not a multiple of the element size {N}",
                raw.len()
            ),
        });
    }
    Ok(raw
        .chunks_exact(N)
        .map(|chunk| {
            let mut bytes = [0u8; N];
            bytes.copy_from_slice(chunk);
            convert(bytes)
        })
        .collect())
}

/// Narrows int64 values to int32, saturating out-of-range values.
///
/// Exporters commonly use `INT64_MIN`/`INT64_MAX` as "unbounded" markers (for
/// example the `ends` of a `Slice` to the end of an axis), which saturation
/// maps onto the equivalent int32 markers.
pub fn narrow_i64(name: &str, values: Vec<i64>, diagnostics: &mut Diagnostics) -> Vec<i32> {
    values
        .into_iter()
        .map(|value| {
            let clamped = value.clamp(MIN_INT, MAX_INT);
            if clamped != value {
                diagnostics.push(Diagnostic::ValueClamped {
                    tensor: name.to_string(),
                    value,
                    clamped_to: clamped as i32,
                });
            }
            clamped as i32
        })
        .collect()
}
