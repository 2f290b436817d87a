//! Enum and union discriminants.
//!
//! Discriminants are `u8` newtypes rather than Rust enums so that a reader
//! can hold a value written by a newer schema without undefined behaviour.

use std::fmt;

macro_rules! schema_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident = $value:expr),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        #[repr(transparent)]
        pub struct $name(pub u8);

        #[allow(non_upper_case_globals)]
        impl $name {
            $(pub const $variant: Self = Self($value);)+

            pub const ENUM_VALUES: &'static [Self] = &[$(Self::$variant),+];

            /// Name of the variant as written in `model.fbs`, if known.
            pub fn variant_name(self) -> Option<&'static str> {
                match self {
                    $(Self::$variant => Some(stringify!($variant)),)+
                    _ => None,
                }
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self.variant_name() {
                    Some(name) => f.write_str(name),
                    None => write!(f, "<UNKNOWN {}>", self.0),
                }
            }
        }
    };
}

schema_enum!(
    /// Operator kind of an `OperatorNode`.
    OperatorType {
        Add = 0,
        AveragePool = 1,
        BatchNormalization = 2,
        Cast = 3,
        Clip = 4,
        Concat = 5,
        ConstantOfShape = 6,
        Conv = 7,
        ConvTranspose = 8,
        Cos = 9,
        Div = 10,
        Equal = 11,
        Erf = 12,
        Expand = 13,
        Gather = 14,
        Gemm = 15,
        GlobalAveragePool = 16,
        Identity = 17,
        LeakyRelu = 18,
        Less = 19,
        MatMul = 20,
        MaxPool = 21,
        Mul = 22,
        Pad = 23,
        Pow = 24,
        Range = 25,
        ReduceMean = 26,
        Relu = 27,
        Reshape = 28,
        Resize = 29,
        Shape = 30,
        Sigmoid = 31,
        Sin = 32,
        Slice = 33,
        Softmax = 34,
        Split = 35,
        Sqrt = 36,
        Squeeze = 37,
        Sub = 38,
        Transpose = 39,
        Unsqueeze = 40,
        Where = 41,
    }
);

schema_enum!(PadMode { Same = 0, Fixed = 1 });

schema_enum!(
    /// Element type targeted by a `Cast`.
    DataType { Int32 = 0, Float = 1 }
);

schema_enum!(ResizeMode { Nearest = 0, Linear = 1 });

schema_enum!(
    /// Union discriminant of `OperatorNode.attrs`.
    OperatorAttrs {
        NONE = 0,
        AveragePoolAttrs = 1,
        BatchNormalizationAttrs = 2,
        CastAttrs = 3,
        ClipAttrs = 4,
        ConcatAttrs = 5,
        ConstantOfShapeAttrs = 6,
        ConvAttrs = 7,
        ConvTransposeAttrs = 8,
        GatherAttrs = 9,
        GemmAttrs = 10,
        LeakyReluAttrs = 11,
        MaxPoolAttrs = 12,
        ReduceMeanAttrs = 13,
        ResizeAttrs = 14,
        SoftmaxAttrs = 15,
        SplitAttrs = 16,
        SqueezeAttrs = 17,
        TransposeAttrs = 18,
        UnsqueezeAttrs = 19,
    }
);

schema_enum!(
    /// Union discriminant of `ConstantOfShapeAttrs.value`.
    Scalar { NONE = 0, IntScalar = 1, FloatScalar = 2 }
);

schema_enum!(
    /// Union discriminant of `ConstantNode.data`.
    ConstantData { NONE = 0, FloatData = 1, IntData = 2 }
);

schema_enum!(
    /// Union discriminant of `Node.data`.
    NodeKind {
        NONE = 0,
        OperatorNode = 1,
        ConstantNode = 2,
        ValueNode = 3,
    }
);
