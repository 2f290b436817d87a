//! Read-only views over the tables of a finished model buffer.

use flatbuffers::{Follow, ForwardsUOffset, Table, VOffsetT, Vector};

use crate::{
    enums::{ConstantData, DataType, NodeKind, OperatorAttrs, OperatorType, PadMode, ResizeMode, Scalar},
    vt,
};

macro_rules! table {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy)]
        pub struct $name<'a> {
            pub _tab: Table<'a>,
        }

        impl<'a> Follow<'a> for $name<'a> {
            type Inner = $name<'a>;

            #[inline]
            unsafe fn follow(buf: &'a [u8], loc: usize) -> Self::Inner {
                Self {
                    _tab: Table::new(buf, loc),
                }
            }
        }

        impl<'a> $name<'a> {
            /// Wraps a table reached through a union slot.
            pub fn from_table(table: Table<'a>) -> Self {
                Self { _tab: table }
            }
        }
    };
}

// All accessors below go through these helpers. They are sound as long as the
// buffer was produced by a writer following `model.fbs`, which is the
// contract of `root_as_model_unchecked`.

fn scalar<'a, T>(tab: &Table<'a>, slot: VOffsetT, default: T) -> T
where
    T: Follow<'a, Inner = T> + Copy + 'a,
{
    unsafe { tab.get::<T>(slot, Some(default)) }.unwrap_or(default)
}

fn vector<'a, T: Follow<'a> + 'a>(tab: &Table<'a>, slot: VOffsetT) -> Option<Vector<'a, T>> {
    unsafe { tab.get::<ForwardsUOffset<Vector<'a, T>>>(slot, None) }
}

fn string<'a>(tab: &Table<'a>, slot: VOffsetT) -> Option<&'a str> {
    unsafe { tab.get::<ForwardsUOffset<&'a str>>(slot, None) }
}

fn union_table<'a>(tab: &Table<'a>, slot: VOffsetT) -> Option<Table<'a>> {
    unsafe { tab.get::<ForwardsUOffset<Table<'a>>>(slot, None) }
}

/// Interprets `buf` as a finished model buffer without verification.
///
/// # Safety
///
/// `buf` must hold a buffer written against `model.fbs`, such as the output
/// of the ONNX converter. Reading an arbitrary byte slice is undefined
/// behaviour.
pub unsafe fn root_as_model_unchecked(buf: &[u8]) -> Model<'_> {
    flatbuffers::root_unchecked::<Model>(buf)
}

table!(
    /// Root table.
    Model
);

impl<'a> Model<'a> {
    pub fn schema_version(&self) -> i32 {
        scalar(&self._tab, vt::model::SCHEMA_VERSION, 0)
    }

    pub fn graph(&self) -> Option<Graph<'a>> {
        unsafe { self._tab.get::<ForwardsUOffset<Graph<'a>>>(vt::model::GRAPH, None) }
    }
}

table!(Graph);

impl<'a> Graph<'a> {
    pub fn nodes(&self) -> Option<Vector<'a, ForwardsUOffset<Node<'a>>>> {
        vector(&self._tab, vt::graph::NODES)
    }

    pub fn inputs(&self) -> Option<Vector<'a, u32>> {
        vector(&self._tab, vt::graph::INPUTS)
    }

    pub fn outputs(&self) -> Option<Vector<'a, u32>> {
        vector(&self._tab, vt::graph::OUTPUTS)
    }
}

table!(Node);

impl<'a> Node<'a> {
    pub fn name(&self) -> Option<&'a str> {
        string(&self._tab, vt::node::NAME)
    }

    pub fn data_type(&self) -> NodeKind {
        NodeKind(scalar(&self._tab, vt::node::DATA_TYPE, 0))
    }

    pub fn data_as_operator_node(&self) -> Option<OperatorNode<'a>> {
        (self.data_type() == NodeKind::OperatorNode)
            .then(|| union_table(&self._tab, vt::node::DATA))
            .flatten()
            .map(OperatorNode::from_table)
    }

    pub fn data_as_constant_node(&self) -> Option<ConstantNode<'a>> {
        (self.data_type() == NodeKind::ConstantNode)
            .then(|| union_table(&self._tab, vt::node::DATA))
            .flatten()
            .map(ConstantNode::from_table)
    }

    pub fn data_as_value_node(&self) -> Option<ValueNode<'a>> {
        (self.data_type() == NodeKind::ValueNode)
            .then(|| union_table(&self._tab, vt::node::DATA))
            .flatten()
            .map(ValueNode::from_table)
    }
}

table!(
    /// Placeholder for a graph input, output or intermediate value.
    ValueNode
);

table!(ConstantNode);

impl<'a> ConstantNode<'a> {
    pub fn shape(&self) -> Option<Vector<'a, u32>> {
        vector(&self._tab, vt::constant_node::SHAPE)
    }

    pub fn data_type(&self) -> ConstantData {
        ConstantData(scalar(&self._tab, vt::constant_node::DATA_TYPE, 0))
    }

    pub fn data_as_float_data(&self) -> Option<FloatData<'a>> {
        (self.data_type() == ConstantData::FloatData)
            .then(|| union_table(&self._tab, vt::constant_node::DATA))
            .flatten()
            .map(FloatData::from_table)
    }

    pub fn data_as_int_data(&self) -> Option<IntData<'a>> {
        (self.data_type() == ConstantData::IntData)
            .then(|| union_table(&self._tab, vt::constant_node::DATA))
            .flatten()
            .map(IntData::from_table)
    }
}

table!(FloatData);

impl<'a> FloatData<'a> {
    pub fn data(&self) -> Option<Vector<'a, f32>> {
        vector(&self._tab, vt::constant_data::DATA)
    }
}

table!(IntData);

impl<'a> IntData<'a> {
    pub fn data(&self) -> Option<Vector<'a, i32>> {
        vector(&self._tab, vt::constant_data::DATA)
    }
}

table!(OperatorNode);

macro_rules! attrs_accessor {
    ($lt:lifetime, $fn_name:ident, $variant:ident) => {
        pub fn $fn_name(&self) -> Option<$variant<$lt>> {
            (self.attrs_type() == OperatorAttrs::$variant)
                .then(|| union_table(&self._tab, vt::operator_node::ATTRS))
                .flatten()
                .map($variant::from_table)
        }
    };
}

impl<'a> OperatorNode<'a> {
    pub fn type_(&self) -> OperatorType {
        OperatorType(scalar(&self._tab, vt::operator_node::TYPE, 0))
    }

    pub fn attrs_type(&self) -> OperatorAttrs {
        OperatorAttrs(scalar(&self._tab, vt::operator_node::ATTRS_TYPE, 0))
    }

    pub fn inputs(&self) -> Option<Vector<'a, u32>> {
        vector(&self._tab, vt::operator_node::INPUTS)
    }

    pub fn outputs(&self) -> Option<Vector<'a, u32>> {
        vector(&self._tab, vt::operator_node::OUTPUTS)
    }

    attrs_accessor!('a, attrs_as_average_pool_attrs, AveragePoolAttrs);
    attrs_accessor!('a, attrs_as_batch_normalization_attrs, BatchNormalizationAttrs);
    attrs_accessor!('a, attrs_as_cast_attrs, CastAttrs);
    attrs_accessor!('a, attrs_as_clip_attrs, ClipAttrs);
    attrs_accessor!('a, attrs_as_concat_attrs, ConcatAttrs);
    attrs_accessor!('a, attrs_as_constant_of_shape_attrs, ConstantOfShapeAttrs);
    attrs_accessor!('a, attrs_as_conv_attrs, ConvAttrs);
    attrs_accessor!('a, attrs_as_conv_transpose_attrs, ConvTransposeAttrs);
    attrs_accessor!('a, attrs_as_gather_attrs, GatherAttrs);
    attrs_accessor!('a, attrs_as_gemm_attrs, GemmAttrs);
    attrs_accessor!('a, attrs_as_leaky_relu_attrs, LeakyReluAttrs);
    attrs_accessor!('a, attrs_as_max_pool_attrs, MaxPoolAttrs);
    attrs_accessor!('a, attrs_as_reduce_mean_attrs, ReduceMeanAttrs);
    attrs_accessor!('a, attrs_as_resize_attrs, ResizeAttrs);
    attrs_accessor!('a, attrs_as_softmax_attrs, SoftmaxAttrs);
    attrs_accessor!('a, attrs_as_split_attrs, SplitAttrs);
    attrs_accessor!('a, attrs_as_squeeze_attrs, SqueezeAttrs);
    attrs_accessor!('a, attrs_as_transpose_attrs, TransposeAttrs);
    attrs_accessor!('a, attrs_as_unsqueeze_attrs, UnsqueezeAttrs);
}

macro_rules! pool_attrs {
    ($name:ident) => {
        table!($name);

        impl<'a> $name<'a> {
            pub fn kernel_size(&self) -> Option<Vector<'a, u32>> {
                vector(&self._tab, vt::pool_attrs::KERNEL_SIZE)
            }

            pub fn pad_mode(&self) -> PadMode {
                PadMode(scalar(&self._tab, vt::pool_attrs::PAD_MODE, 0))
            }

            pub fn pads(&self) -> Option<Vector<'a, u32>> {
                vector(&self._tab, vt::pool_attrs::PADS)
            }

            pub fn stride(&self) -> Option<Vector<'a, u32>> {
                vector(&self._tab, vt::pool_attrs::STRIDE)
            }
        }
    };
}

pool_attrs!(AveragePoolAttrs);
pool_attrs!(MaxPoolAttrs);

table!(BatchNormalizationAttrs);

impl BatchNormalizationAttrs<'_> {
    pub fn epsilon(&self) -> f32 {
        scalar(&self._tab, vt::batch_normalization_attrs::EPSILON, 0.0)
    }
}

table!(CastAttrs);

impl CastAttrs<'_> {
    pub fn to(&self) -> DataType {
        DataType(scalar(&self._tab, vt::cast_attrs::TO, 0))
    }
}

table!(ClipAttrs);

impl ClipAttrs<'_> {
    pub fn min(&self) -> f32 {
        scalar(&self._tab, vt::clip_attrs::MIN, 0.0)
    }

    pub fn max(&self) -> f32 {
        scalar(&self._tab, vt::clip_attrs::MAX, 0.0)
    }
}

table!(ConcatAttrs);

impl ConcatAttrs<'_> {
    pub fn dim(&self) -> i32 {
        scalar(&self._tab, vt::concat_attrs::DIM, 0)
    }
}

table!(IntScalar);

impl IntScalar<'_> {
    pub fn value(&self) -> i32 {
        scalar(&self._tab, vt::scalar::VALUE, 0)
    }
}

table!(FloatScalar);

impl FloatScalar<'_> {
    pub fn value(&self) -> f32 {
        scalar(&self._tab, vt::scalar::VALUE, 0.0)
    }
}

table!(ConstantOfShapeAttrs);

impl<'a> ConstantOfShapeAttrs<'a> {
    pub fn value_type(&self) -> Scalar {
        Scalar(scalar(&self._tab, vt::constant_of_shape_attrs::VALUE_TYPE, 0))
    }

    pub fn value_as_int_scalar(&self) -> Option<IntScalar<'a>> {
        (self.value_type() == Scalar::IntScalar)
            .then(|| union_table(&self._tab, vt::constant_of_shape_attrs::VALUE))
            .flatten()
            .map(IntScalar::from_table)
    }

    pub fn value_as_float_scalar(&self) -> Option<FloatScalar<'a>> {
        (self.value_type() == Scalar::FloatScalar)
            .then(|| union_table(&self._tab, vt::constant_of_shape_attrs::VALUE))
            .flatten()
            .map(FloatScalar::from_table)
    }
}

table!(ConvAttrs);

impl<'a> ConvAttrs<'a> {
    pub fn groups(&self) -> u32 {
        scalar(&self._tab, vt::conv_attrs::GROUPS, 0)
    }

    pub fn pad_mode(&self) -> PadMode {
        PadMode(scalar(&self._tab, vt::conv_attrs::PAD_MODE, 0))
    }

    pub fn pads(&self) -> Option<Vector<'a, u32>> {
        vector(&self._tab, vt::conv_attrs::PADS)
    }

    pub fn stride(&self) -> u32 {
        scalar(&self._tab, vt::conv_attrs::STRIDE, 0)
    }
}

table!(ConvTransposeAttrs);

impl ConvTransposeAttrs<'_> {
    pub fn stride(&self) -> u32 {
        scalar(&self._tab, vt::conv_transpose_attrs::STRIDE, 0)
    }
}

table!(GatherAttrs);

impl GatherAttrs<'_> {
    pub fn axis(&self) -> i32 {
        scalar(&self._tab, vt::axis_attrs::AXIS, 0)
    }
}

table!(GemmAttrs);

impl GemmAttrs<'_> {
    pub fn alpha(&self) -> f32 {
        scalar(&self._tab, vt::gemm_attrs::ALPHA, 0.0)
    }

    pub fn beta(&self) -> f32 {
        scalar(&self._tab, vt::gemm_attrs::BETA, 0.0)
    }

    pub fn transpose_a(&self) -> bool {
        scalar(&self._tab, vt::gemm_attrs::TRANSPOSE_A, false)
    }

    pub fn transpose_b(&self) -> bool {
        scalar(&self._tab, vt::gemm_attrs::TRANSPOSE_B, false)
    }
}

table!(LeakyReluAttrs);

impl LeakyReluAttrs<'_> {
    pub fn alpha(&self) -> f32 {
        scalar(&self._tab, vt::leaky_relu_attrs::ALPHA, 0.0)
    }
}

table!(ReduceMeanAttrs);

impl<'a> ReduceMeanAttrs<'a> {
    pub fn axes(&self) -> Option<Vector<'a, i32>> {
        vector(&self._tab, vt::reduce_mean_attrs::AXES)
    }

    pub fn keep_dims(&self) -> bool {
        scalar(&self._tab, vt::reduce_mean_attrs::KEEP_DIMS, false)
    }
}

table!(ResizeAttrs);

impl ResizeAttrs<'_> {
    pub fn mode(&self) -> ResizeMode {
        ResizeMode(scalar(&self._tab, vt::resize_attrs::MODE, 0))
    }
}

table!(SoftmaxAttrs);

impl SoftmaxAttrs<'_> {
    pub fn axis(&self) -> i32 {
        scalar(&self._tab, vt::axis_attrs::AXIS, 0)
    }
}

table!(SplitAttrs);

impl<'a> SplitAttrs<'a> {
    pub fn axis(&self) -> i32 {
        scalar(&self._tab, vt::split_attrs::AXIS, 0)
    }

    pub fn split(&self) -> Option<Vector<'a, u32>> {
        vector(&self._tab, vt::split_attrs::SPLIT)
    }
}

table!(SqueezeAttrs);

impl<'a> SqueezeAttrs<'a> {
    pub fn axes(&self) -> Option<Vector<'a, i32>> {
        vector(&self._tab, vt::axes_attrs::AXES)
    }
}

table!(UnsqueezeAttrs);

impl<'a> UnsqueezeAttrs<'a> {
    pub fn axes(&self) -> Option<Vector<'a, i32>> {
        vector(&self._tab, vt::axes_attrs::AXES)
    }
}

table!(TransposeAttrs);

impl<'a> TransposeAttrs<'a> {
    pub fn perm(&self) -> Option<Vector<'a, u32>> {
        vector(&self._tab, vt::transpose_attrs::PERM)
    }
}

#[cfg(test)]
mod tests {
    use flatbuffers::FlatBufferBuilder;

    use super::*;
    use crate::SCHEMA_VERSION;

    #[test]
    fn reads_minimal_model() {
        let mut fbb = FlatBufferBuilder::with_capacity(256);
        let name = fbb.create_string("x");
        let value = {
            let start = fbb.start_table();
            fbb.end_table(start)
        };
        let node = {
            let start = fbb.start_table();
            fbb.push_slot_always(vt::node::NAME, name);
            fbb.push_slot::<u8>(vt::node::DATA_TYPE, NodeKind::ValueNode.0, 0);
            fbb.push_slot_always(vt::node::DATA, value.as_union_value());
            fbb.end_table(start)
        };
        let nodes = fbb.create_vector(&[node]);
        let inputs = fbb.create_vector(&[0u32]);
        let graph = {
            let start = fbb.start_table();
            fbb.push_slot_always(vt::graph::NODES, nodes);
            fbb.push_slot_always(vt::graph::INPUTS, inputs);
            fbb.end_table(start)
        };
        let model = {
            let start = fbb.start_table();
            fbb.push_slot::<i32>(vt::model::SCHEMA_VERSION, SCHEMA_VERSION, 0);
            fbb.push_slot_always(vt::model::GRAPH, graph);
            fbb.end_table(start)
        };
        fbb.finish(model, None);

        let model = unsafe { root_as_model_unchecked(fbb.finished_data()) };
        assert_eq!(model.schema_version(), SCHEMA_VERSION);

        let graph = model.graph().unwrap();
        let nodes = graph.nodes().unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes.get(0).name(), Some("x"));
        assert!(nodes.get(0).data_as_value_node().is_some());
        assert!(nodes.get(0).data_as_constant_node().is_none());
        assert_eq!(graph.inputs().unwrap().iter().collect::<Vec<_>>(), vec![0]);
        assert!(graph.outputs().is_none());
    }
}
