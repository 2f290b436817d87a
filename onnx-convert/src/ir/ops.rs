//! Operator kinds and their normalized attributes.

use crate::ir::node::Scalar;

/// Invokes `$callback!` with the name of every supported operator kind.
///
/// Both the ONNX-side rule registry and the serializer expand from this list,
/// so an operator cannot be known to one and missing from the other.
macro_rules! for_each_op_type {
    ($callback:ident) => {
        $callback! {
            Add,
            AveragePool,
            BatchNormalization,
            Cast,
            Clip,
            Concat,
            ConstantOfShape,
            Conv,
            ConvTranspose,
            Cos,
            Div,
            Equal,
            Erf,
            Expand,
            Gather,
            Gemm,
            GlobalAveragePool,
            Identity,
            LeakyRelu,
            Less,
            MatMul,
            MaxPool,
            Mul,
            Pad,
            Pow,
            Range,
            ReduceMean,
            Relu,
            Reshape,
            Resize,
            Shape,
            Sigmoid,
            Sin,
            Slice,
            Softmax,
            Split,
            Sqrt,
            Squeeze,
            Sub,
            Transpose,
            Unsqueeze,
            Where,
        }
    };
}
pub(crate) use for_each_op_type;

macro_rules! define_op_type {
    ($($name:ident),+ $(,)?) => {
        /// Closed set of operator kinds the converter accepts.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum OpType {
            $($name),+
        }

        impl OpType {
            pub const ALL: &'static [OpType] = &[$(OpType::$name),+];

            /// Maps an ONNX `op_type` to the operator kind of the same name.
            pub fn from_onnx(op_type: &str) -> Option<OpType> {
                match op_type {
                    $(stringify!($name) => Some(OpType::$name),)+
                    _ => None,
                }
            }

            pub fn name(self) -> &'static str {
                match self {
                    $(OpType::$name => stringify!($name),)+
                }
            }
        }
    };
}

for_each_op_type!(define_op_type);

/// Padding of a spatial operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Padding {
    /// Pad so the output has the same spatial size as the input.
    Same,
    /// Explicit padding in `[top, left, bottom, right]` order.
    Fixed([u32; 4]),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataType {
    Int32,
    Float,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResizeMode {
    Nearest,
    Linear,
}

/// Attributes shared by `AveragePool` and `MaxPool`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolAttrs {
    pub kernel_size: [u32; 2],
    pub padding: Padding,
    pub stride: [u32; 2],
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConvAttrs {
    pub groups: u32,
    pub padding: Padding,
    pub stride: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GemmAttrs {
    pub alpha: f32,
    pub beta: f32,
    pub transpose_a: bool,
    pub transpose_b: bool,
}

/// Normalized attribute set of an operator node.
///
/// `None` is used by every operator whose binary encoding carries no
/// attribute table, even if the ONNX operator had attributes that were
/// validated during conversion.
#[derive(Clone, Debug, PartialEq)]
pub enum OpAttrs {
    None,
    AveragePool(PoolAttrs),
    BatchNormalization { epsilon: f32 },
    Cast { to: DataType },
    Clip { min: f32, max: f32 },
    Concat { dim: i32 },
    ConstantOfShape { value: Scalar },
    Conv(ConvAttrs),
    ConvTranspose { stride: u32 },
    Gather { axis: i32 },
    Gemm(GemmAttrs),
    LeakyRelu { alpha: f32 },
    MaxPool(PoolAttrs),
    ReduceMean { axes: Option<Vec<i32>>, keep_dims: bool },
    Resize { mode: ResizeMode },
    Softmax { axis: i32 },
    Split { axis: i32, split: Vec<u32> },
    Squeeze { axes: Vec<i32> },
    Transpose { perm: Vec<u32> },
    Unsqueeze { axes: Vec<i32> },
}
