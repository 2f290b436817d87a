//! Vtable slot offsets for every table field in `model.fbs`.
//!
//! Field `n` of a table lives at byte offset `4 + 2 * n`. A union field uses
//! two consecutive slots: the `_TYPE` discriminant first, then the value.

use flatbuffers::VOffsetT;

pub mod model {
    use super::VOffsetT;
    pub const SCHEMA_VERSION: VOffsetT = 4;
    pub const GRAPH: VOffsetT = 6;
}

pub mod graph {
    use super::VOffsetT;
    pub const NODES: VOffsetT = 4;
    pub const INPUTS: VOffsetT = 6;
    pub const OUTPUTS: VOffsetT = 8;
}

pub mod node {
    use super::VOffsetT;
    pub const NAME: VOffsetT = 4;
    pub const DATA_TYPE: VOffsetT = 6;
    pub const DATA: VOffsetT = 8;
}

pub mod constant_node {
    use super::VOffsetT;
    pub const SHAPE: VOffsetT = 4;
    pub const DATA_TYPE: VOffsetT = 6;
    pub const DATA: VOffsetT = 8;
}

/// Shared by `FloatData` and `IntData`.
pub mod constant_data {
    use super::VOffsetT;
    pub const DATA: VOffsetT = 4;
}

pub mod operator_node {
    use super::VOffsetT;
    pub const TYPE: VOffsetT = 4;
    pub const ATTRS_TYPE: VOffsetT = 6;
    pub const ATTRS: VOffsetT = 8;
    pub const INPUTS: VOffsetT = 10;
    pub const OUTPUTS: VOffsetT = 12;
}

/// Shared by `AveragePoolAttrs` and `MaxPoolAttrs`.
pub mod pool_attrs {
    use super::VOffsetT;
    pub const KERNEL_SIZE: VOffsetT = 4;
    pub const PAD_MODE: VOffsetT = 6;
    pub const PADS: VOffsetT = 8;
    pub const STRIDE: VOffsetT = 10;
}

pub mod batch_normalization_attrs {
    use super::VOffsetT;
    pub const EPSILON: VOffsetT = 4;
}

pub mod cast_attrs {
    use super::VOffsetT;
    pub const TO: VOffsetT = 4;
}

pub mod clip_attrs {
    use super::VOffsetT;
    pub const MIN: VOffsetT = 4;
    pub const MAX: VOffsetT = 6;
}

pub mod concat_attrs {
    use super::VOffsetT;
    pub const DIM: VOffsetT = 4;
}

/// Shared by `IntScalar` and `FloatScalar`.
pub mod scalar {
    use super::VOffsetT;
    pub const VALUE: VOffsetT = 4;
}

pub mod constant_of_shape_attrs {
    use super::VOffsetT;
    pub const VALUE_TYPE: VOffsetT = 4;
    pub const VALUE: VOffsetT = 6;
}

pub mod conv_attrs {
    use super::VOffsetT;
    pub const GROUPS: VOffsetT = 4;
    pub const PAD_MODE: VOffsetT = 6;
    pub const PADS: VOffsetT = 8;
    pub const STRIDE: VOffsetT = 10;
}

pub mod conv_transpose_attrs {
    use super::VOffsetT;
    pub const STRIDE: VOffsetT = 4;
}

/// Shared by `GatherAttrs` and `SoftmaxAttrs`.
pub mod axis_attrs {
    use super::VOffsetT;
    pub const AXIS: VOffsetT = 4;
}

pub mod gemm_attrs {
    use super::VOffsetT;
    pub const ALPHA: VOffsetT = 4;
    pub const BETA: VOffsetT = 6;
    pub const TRANSPOSE_A: VOffsetT = 8;
    pub const TRANSPOSE_B: VOffsetT = 10;
}

pub mod leaky_relu_attrs {
    use super::VOffsetT;
    pub const ALPHA: VOffsetT = 4;
}

pub mod reduce_mean_attrs {
    use super::VOffsetT;
    pub const AXES: VOffsetT = 4;
    pub const KEEP_DIMS: VOffsetT = 6;
}

pub mod resize_attrs {
    use super::VOffsetT;
    pub const MODE: VOffsetT = 4;
}

pub mod split_attrs {
    use super::VOffsetT;
    pub const AXIS: VOffsetT = 4;
    pub const SPLIT: VOffsetT = 6;
}

/// Shared by `SqueezeAttrs` and `UnsqueezeAttrs`.
pub mod axes_attrs {
    use super::VOffsetT;
    pub const AXES: VOffsetT = 4;
}

pub mod transpose_attrs {
    use super::VOffsetT;
    pub const PERM: VOffsetT = 4;
}
