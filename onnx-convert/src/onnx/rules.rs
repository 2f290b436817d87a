//! Per-operator attribute extraction and validation.
//!
//! Each supported [`OpType`] maps to a rule that reads the ONNX attributes it
//! understands, rejects values the runtime cannot honour and produces the
//! normalized [`OpAttrs`]. Attributes a rule leaves untouched are reported by
//! the caller.

use tract_onnx::pb::{tensor_proto::DataType as OnnxDataType, TensorProto};

use crate::{
    error::ConvertError,
    ir::{ConvAttrs, DataType, GemmAttrs, OpAttrs, OpType, Padding, PoolAttrs, ResizeMode},
    onnx::{
        constant::constant_from_tensor,
        reader::{AttributeReader, ConstantLookup},
    },
};

pub type AttrRule =
    fn(&mut AttributeReader, &dyn ConstantLookup) -> Result<OpAttrs, ConvertError>;

/// Returns the attribute rule of `op_type`.
pub fn attr_rule(op_type: OpType) -> AttrRule {
    match op_type {
        OpType::AveragePool => average_pool,
        OpType::BatchNormalization => batch_normalization,
        OpType::Cast => cast,
        OpType::Clip => clip,
        OpType::Concat => concat,
        OpType::ConstantOfShape => constant_of_shape,
        OpType::Conv => conv,
        OpType::ConvTranspose => conv_transpose,
        OpType::Gather => gather,
        OpType::Gemm => gemm,
        OpType::LeakyRelu => leaky_relu,
        OpType::MaxPool => max_pool,
        OpType::Pad => pad,
        OpType::ReduceMean => reduce_mean,
        OpType::Reshape => reshape,
        OpType::Resize => resize,
        OpType::Shape => shape,
        OpType::Softmax => softmax,
        OpType::Split => split,
        OpType::Squeeze => squeeze,
        OpType::Transpose => transpose,
        OpType::Unsqueeze => unsqueeze,
        OpType::Add
        | OpType::Cos
        | OpType::Div
        | OpType::Equal
        | OpType::Erf
        | OpType::Expand
        | OpType::GlobalAveragePool
        | OpType::Identity
        | OpType::Less
        | OpType::MatMul
        | OpType::Mul
        | OpType::Pow
        | OpType::Range
        | OpType::Relu
        | OpType::Sigmoid
        | OpType::Sin
        | OpType::Slice
        | OpType::Sqrt
        | OpType::Sub
        | OpType::Where => no_attrs,
    }
}

fn no_attrs(_: &mut AttributeReader, _: &dyn ConstantLookup) -> Result<OpAttrs, ConvertError> {
    Ok(OpAttrs::None)
}

fn check_len(name: &str, values: &[i64], expected: usize) -> Result<(), ConvertError> {
    if values.len() != expected {
        return Err(ConvertError::InvalidAttributeLength {
            name: name.to_string(),
            expected,
            actual: values.len(),
        });
    }
    Ok(())
}

fn to_u32(name: &str, value: i64) -> Result<u32, ConvertError> {
    u32::try_from(value)
        .map_err(|_| ConvertError::unsupported_value(name, value, "a value in 0..=u32::MAX"))
}

fn to_i32(name: &str, value: i64) -> Result<i32, ConvertError> {
    i32::try_from(value)
        .map_err(|_| ConvertError::unsupported_value(name, value, "a value in the int32 range"))
}

fn to_u32_vec(name: &str, values: &[i64]) -> Result<Vec<u32>, ConvertError> {
    values.iter().map(|&v| to_u32(name, v)).collect()
}

fn to_i32_vec(name: &str, values: &[i64]) -> Result<Vec<i32>, ConvertError> {
    values.iter().map(|&v| to_i32(name, v)).collect()
}

/// Converts an ints attribute that must hold exactly `N` values.
fn to_u32_array<const N: usize>(name: &str, values: &[i64]) -> Result<[u32; N], ConvertError> {
    check_len(name, values, N)?;
    let mut out = [0; N];
    for (slot, &value) in out.iter_mut().zip(values) {
        *slot = to_u32(name, value)?;
    }
    Ok(out)
}

fn read_padding(reader: &mut AttributeReader) -> Result<Padding, ConvertError> {
    let auto_pad = reader.get("auto_pad", "NOTSET".to_string())?;
    match auto_pad.as_str() {
        "SAME_UPPER" | "SAME_LOWER" => Ok(Padding::Same),
        "NOTSET" => {
            let pads = reader.get("pads", vec![0i64; 4])?;
            let [top, left, right, bottom] = to_u32_array::<4>("pads", &pads)?;
            Ok(Padding::Fixed([top, left, bottom, right]))
        }
        _ => Err(ConvertError::UnsupportedPadMode(auto_pad)),
    }
}

fn read_strides(reader: &mut AttributeReader) -> Result<Vec<i64>, ConvertError> {
    let strides = reader.get("strides", vec![1i64, 1])?;
    check_len("strides", &strides, 2)?;
    Ok(strides)
}

fn read_stride(reader: &mut AttributeReader) -> Result<[u32; 2], ConvertError> {
    to_u32_array::<2>("strides", &read_strides(reader)?)
}

fn read_uniform_stride(reader: &mut AttributeReader) -> Result<u32, ConvertError> {
    let strides = read_strides(reader)?;
    if strides[0] != strides[1] {
        return Err(ConvertError::NonUniformStride(strides));
    }
    to_u32("strides", strides[0])
}

fn read_pool(reader: &mut AttributeReader) -> Result<PoolAttrs, ConvertError> {
    let kernel_shape = reader.require::<Vec<i64>>("kernel_shape")?;
    let kernel_size = to_u32_array::<2>("kernel_shape", &kernel_shape)?;
    let padding = read_padding(reader)?;
    let stride = read_stride(reader)?;
    Ok(PoolAttrs {
        kernel_size,
        padding,
        stride,
    })
}

fn average_pool(
    reader: &mut AttributeReader,
    _: &dyn ConstantLookup,
) -> Result<OpAttrs, ConvertError> {
    let attrs = read_pool(reader)?;
    reader.check_default("ceil_mode", 0i64)?;
    reader.check_default("count_include_pad", 0i64)?;
    Ok(OpAttrs::AveragePool(attrs))
}

fn batch_normalization(
    reader: &mut AttributeReader,
    _: &dyn ConstantLookup,
) -> Result<OpAttrs, ConvertError> {
    Ok(OpAttrs::BatchNormalization {
        epsilon: reader.get("epsilon", 1e-5f32)?,
    })
}

fn cast(reader: &mut AttributeReader, _: &dyn ConstantLookup) -> Result<OpAttrs, ConvertError> {
    let to = reader.get("to", OnnxDataType::Float as i64)?;
    let target = i32::try_from(to).ok().and_then(OnnxDataType::from_i32);
    let to = match target {
        Some(OnnxDataType::Float) => DataType::Float,
        Some(OnnxDataType::Bool | OnnxDataType::Int32 | OnnxDataType::Int64) => DataType::Int32,
        _ => return Err(ConvertError::UnsupportedCastTarget(to)),
    };
    Ok(OpAttrs::Cast { to })
}

fn clip(
    reader: &mut AttributeReader,
    constants: &dyn ConstantLookup,
) -> Result<OpAttrs, ConvertError> {
    let min = reader.require_or_input::<f32>("min", 1, constants)?;
    let max = reader.require_or_input::<f32>("max", 2, constants)?;
    Ok(OpAttrs::Clip { min, max })
}

fn concat(reader: &mut AttributeReader, _: &dyn ConstantLookup) -> Result<OpAttrs, ConvertError> {
    let axis = reader.require::<i64>("axis")?;
    Ok(OpAttrs::Concat {
        dim: to_i32("axis", axis)?,
    })
}

fn constant_of_shape(
    reader: &mut AttributeReader,
    _: &dyn ConstantLookup,
) -> Result<OpAttrs, ConvertError> {
    let tensor = reader.require::<TensorProto>("value")?;
    let constant = constant_from_tensor(&tensor, reader.diagnostics())?;
    let data = constant.data();
    let value = (data.len() == 1)
        .then(|| data.get(0))
        .flatten()
        .ok_or_else(|| ConvertError::NotSingleElement("value".to_string()))?;
    Ok(OpAttrs::ConstantOfShape { value })
}

fn conv(reader: &mut AttributeReader, _: &dyn ConstantLookup) -> Result<OpAttrs, ConvertError> {
    let groups = to_u32("group", reader.get("group", 1i64)?)?;
    let padding = read_padding(reader)?;
    let stride = read_uniform_stride(reader)?;

    reader.check_default("dilations", vec![1i64, 1])?;
    // Inferred at runtime from the weight tensor.
    reader.ignore("kernel_shape");

    Ok(OpAttrs::Conv(ConvAttrs {
        groups,
        padding,
        stride,
    }))
}

fn conv_transpose(
    reader: &mut AttributeReader,
    _: &dyn ConstantLookup,
) -> Result<OpAttrs, ConvertError> {
    let stride = read_uniform_stride(reader)?;

    reader.check_default("auto_pad", "NOTSET".to_string())?;
    reader.check_default("dilations", vec![1i64, 1])?;
    reader.check_default("group", 1i64)?;
    reader.ignore("kernel_shape");
    reader.check_default("output_padding", vec![0i64; 4])?;
    reader.check_default("pads", vec![0i64; 4])?;

    Ok(OpAttrs::ConvTranspose { stride })
}

fn gather(reader: &mut AttributeReader, _: &dyn ConstantLookup) -> Result<OpAttrs, ConvertError> {
    Ok(OpAttrs::Gather {
        axis: to_i32("axis", reader.get("axis", 0i64)?)?,
    })
}

fn gemm(reader: &mut AttributeReader, _: &dyn ConstantLookup) -> Result<OpAttrs, ConvertError> {
    Ok(OpAttrs::Gemm(GemmAttrs {
        alpha: reader.get("alpha", 1.0f32)?,
        beta: reader.get("beta", 1.0f32)?,
        transpose_a: reader.get("transA", 0i64)? != 0,
        transpose_b: reader.get("transB", 0i64)? != 0,
    }))
}

fn leaky_relu(
    reader: &mut AttributeReader,
    _: &dyn ConstantLookup,
) -> Result<OpAttrs, ConvertError> {
    Ok(OpAttrs::LeakyRelu {
        alpha: reader.get("alpha", 0.01f32)?,
    })
}

fn max_pool(reader: &mut AttributeReader, _: &dyn ConstantLookup) -> Result<OpAttrs, ConvertError> {
    let attrs = read_pool(reader)?;
    reader.check_default("ceil_mode", 0i64)?;
    reader.check_default("dilations", vec![1i64, 1])?;
    reader.check_default("storage_order", 0i64)?;
    Ok(OpAttrs::MaxPool(attrs))
}

fn pad(reader: &mut AttributeReader, _: &dyn ConstantLookup) -> Result<OpAttrs, ConvertError> {
    reader.check_default("mode", "constant".to_string())?;
    Ok(OpAttrs::None)
}

fn reduce_mean(
    reader: &mut AttributeReader,
    _: &dyn ConstantLookup,
) -> Result<OpAttrs, ConvertError> {
    let axes = reader
        .get_opt::<Vec<i64>>("axes")?
        .map(|axes| to_i32_vec("axes", &axes))
        .transpose()?;
    let keep_dims = reader.get("keepdims", 1i64)? != 0;
    reader.check_default("noop_with_empty_axes", 0i64)?;
    Ok(OpAttrs::ReduceMean { axes, keep_dims })
}

fn reshape(reader: &mut AttributeReader, _: &dyn ConstantLookup) -> Result<OpAttrs, ConvertError> {
    reader.check_default("allowzero", 0i64)?;
    Ok(OpAttrs::None)
}

fn resize(reader: &mut AttributeReader, _: &dyn ConstantLookup) -> Result<OpAttrs, ConvertError> {
    let mode = reader.get("mode", "nearest".to_string())?;
    let mode = match mode.as_str() {
        "nearest" => ResizeMode::Nearest,
        "linear" => ResizeMode::Linear,
        _ => return Err(ConvertError::unsupported_value("mode", mode, "nearest, linear")),
    };

    reader.check_default("antialias", 0i64)?;
    // Only the HW dimensions of an NCHW tensor can be resized.
    reader.check_default("axes", vec![2i64, 3])?;
    reader.check_default(
        "coordinate_transformation_mode",
        "half_pixel".to_string(),
    )?;
    reader.check_default("cubic_coeff_a", -0.75f32)?;
    reader.check_default("exclude_outside", 0i64)?;
    reader.check_default("extrapolation_value", 0.0f32)?;
    reader.check_default("keep_aspect_ratio_policy", "stretch".to_string())?;
    reader.check_default("nearest_mode", "prefer_round_floor".to_string())?;

    Ok(OpAttrs::Resize { mode })
}

fn shape(reader: &mut AttributeReader, _: &dyn ConstantLookup) -> Result<OpAttrs, ConvertError> {
    reader.check_default("end", 0i64)?;
    reader.check_default("start", 0i64)?;
    Ok(OpAttrs::None)
}

fn softmax(reader: &mut AttributeReader, _: &dyn ConstantLookup) -> Result<OpAttrs, ConvertError> {
    Ok(OpAttrs::Softmax {
        axis: to_i32("axis", reader.get("axis", 0i64)?)?,
    })
}

fn split(reader: &mut AttributeReader, _: &dyn ConstantLookup) -> Result<OpAttrs, ConvertError> {
    let axis = to_i32("axis", reader.get("axis", 0i64)?)?;
    let split = to_u32_vec("split", &reader.get("split", Vec::<i64>::new())?)?;
    reader.check_default("num_outputs", 0i64)?;
    Ok(OpAttrs::Split { axis, split })
}

fn squeeze(reader: &mut AttributeReader, _: &dyn ConstantLookup) -> Result<OpAttrs, ConvertError> {
    Ok(OpAttrs::Squeeze {
        axes: to_i32_vec("axes", &reader.get("axes", Vec::<i64>::new())?)?,
    })
}

fn transpose(
    reader: &mut AttributeReader,
    _: &dyn ConstantLookup,
) -> Result<OpAttrs, ConvertError> {
    Ok(OpAttrs::Transpose {
        perm: to_u32_vec("perm", &reader.get("perm", Vec::<i64>::new())?)?,
    })
}

fn unsqueeze(
    reader: &mut AttributeReader,
    _: &dyn ConstantLookup,
) -> Result<OpAttrs, ConvertError> {
    Ok(OpAttrs::Unsqueeze {
        axes: to_i32_vec("axes", &reader.get("axes", Vec::<i64>::new())?)?,
    })
}
