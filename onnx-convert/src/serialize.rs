//! Serialization of the IR into the binary model format.

use flatbuffers::{FlatBufferBuilder, Push, TableFinishedWIPOffset, UnionWIPOffset, Vector, WIPOffset};
use itertools::Itertools;
use model_schema::{self as sg, vt};
use tracing::debug;

use crate::ir::{
    for_each_op_type, ConstantData, ConstantNode, DataType, Graph, Node, OpAttrs, OpType,
    OperatorNode, Padding, PoolAttrs, ResizeMode, Scalar,
};

type TableOffset = WIPOffset<TableFinishedWIPOffset>;

/// Serializes `graph` into a finished model buffer.
pub fn serialize_graph(graph: &Graph) -> Vec<u8> {
    let mut fbb = FlatBufferBuilder::with_capacity(1024);

    let nodes = graph
        .nodes
        .iter()
        .map(|node| build_node(&mut fbb, node))
        .collect_vec();
    let nodes = write_vec(&mut fbb, &nodes);
    let inputs = write_vec(&mut fbb, &graph.inputs);
    let outputs = write_vec(&mut fbb, &graph.outputs);

    let graph = table(&mut fbb, |fbb| {
        fbb.push_slot_always(vt::graph::NODES, nodes);
        fbb.push_slot_always(vt::graph::INPUTS, inputs);
        fbb.push_slot_always(vt::graph::OUTPUTS, outputs);
    });
    let model = table(&mut fbb, |fbb| {
        fbb.push_slot::<i32>(vt::model::SCHEMA_VERSION, sg::SCHEMA_VERSION, 0);
        fbb.push_slot_always(vt::model::GRAPH, graph);
    });
    fbb.finish(model, None);

    let data = fbb.finished_data().to_vec();
    debug!(bytes = data.len(), "serialized graph");
    data
}

/// Writes `items` as a vector, pushing elements back to front.
fn write_vec<'fbb, T: Push + Copy>(
    fbb: &mut FlatBufferBuilder<'fbb>,
    items: &[T],
) -> WIPOffset<Vector<'fbb, T>> {
    fbb.start_vector::<T>(items.len());
    for &item in items.iter().rev() {
        fbb.push(item);
    }
    fbb.end_vector(items.len())
}

fn table<'fbb>(
    fbb: &mut FlatBufferBuilder<'fbb>,
    fields: impl FnOnce(&mut FlatBufferBuilder<'fbb>),
) -> TableOffset {
    let start = fbb.start_table();
    fields(fbb);
    fbb.end_table(start)
}

fn build_node(fbb: &mut FlatBufferBuilder, node: &Node) -> TableOffset {
    let (kind, data) = match node {
        Node::Constant(constant) => (sg::NodeKind::ConstantNode, build_constant_node(fbb, constant)),
        Node::Operator(operator) => (sg::NodeKind::OperatorNode, build_operator_node(fbb, operator)),
        Node::Value(_) => (sg::NodeKind::ValueNode, table(fbb, |_| {})),
    };
    let name = fbb.create_string(node.name());
    table(fbb, |fbb| {
        fbb.push_slot_always(vt::node::NAME, name);
        fbb.push_slot::<u8>(vt::node::DATA_TYPE, kind.0, sg::NodeKind::NONE.0);
        fbb.push_slot_always(vt::node::DATA, data.as_union_value());
    })
}

fn build_constant_node(fbb: &mut FlatBufferBuilder, constant: &ConstantNode) -> TableOffset {
    let shape = write_vec(fbb, constant.shape());
    let (kind, data) = match constant.data() {
        ConstantData::Float(values) => {
            let values = write_vec(fbb, values);
            let data = table(fbb, |fbb| fbb.push_slot_always(vt::constant_data::DATA, values));
            (sg::ConstantData::FloatData, data)
        }
        ConstantData::Int(values) => {
            let values = write_vec(fbb, values);
            let data = table(fbb, |fbb| fbb.push_slot_always(vt::constant_data::DATA, values));
            (sg::ConstantData::IntData, data)
        }
    };
    table(fbb, |fbb| {
        fbb.push_slot_always(vt::constant_node::SHAPE, shape);
        fbb.push_slot::<u8>(vt::constant_node::DATA_TYPE, kind.0, sg::ConstantData::NONE.0);
        fbb.push_slot_always(vt::constant_node::DATA, data.as_union_value());
    })
}

fn build_operator_node(fbb: &mut FlatBufferBuilder, operator: &OperatorNode) -> TableOffset {
    let (attrs_type, attrs) = build_attrs(fbb, &operator.attrs);
    let inputs = write_vec(fbb, &operator.inputs);
    let outputs = write_vec(fbb, &operator.outputs);
    table(fbb, |fbb| {
        fbb.push_slot::<u8>(vt::operator_node::TYPE, operator_type(operator.op_type).0, 0);
        fbb.push_slot::<u8>(vt::operator_node::ATTRS_TYPE, attrs_type.0, sg::OperatorAttrs::NONE.0);
        if let Some(attrs) = attrs {
            fbb.push_slot_always(vt::operator_node::ATTRS, attrs);
        }
        fbb.push_slot_always(vt::operator_node::INPUTS, inputs);
        fbb.push_slot_always(vt::operator_node::OUTPUTS, outputs);
    })
}

macro_rules! define_operator_type {
    ($($name:ident),+ $(,)?) => {
        fn operator_type(op_type: OpType) -> sg::OperatorType {
            match op_type {
                $(OpType::$name => sg::OperatorType::$name,)+
            }
        }
    };
}

for_each_op_type!(define_operator_type);

fn pad_mode(padding: Padding) -> sg::PadMode {
    match padding {
        Padding::Same => sg::PadMode::Same,
        Padding::Fixed(_) => sg::PadMode::Fixed,
    }
}

/// Explicit pads, if any. `Same` padding is encoded by the pad mode alone.
fn write_pads<'fbb>(
    fbb: &mut FlatBufferBuilder<'fbb>,
    padding: Padding,
) -> Option<WIPOffset<Vector<'fbb, u32>>> {
    match padding {
        Padding::Same => None,
        Padding::Fixed(pads) => Some(write_vec(fbb, &pads)),
    }
}

/// Writes `values` unless empty, in which case the field is left out.
fn write_non_empty<'fbb, T: Push + Copy>(
    fbb: &mut FlatBufferBuilder<'fbb>,
    values: &[T],
) -> Option<WIPOffset<Vector<'fbb, T>>> {
    (!values.is_empty()).then(|| write_vec(fbb, values))
}

fn build_pool_attrs(fbb: &mut FlatBufferBuilder, attrs: &PoolAttrs) -> TableOffset {
    let kernel_size = write_vec(fbb, &attrs.kernel_size);
    let pads = write_pads(fbb, attrs.padding);
    let stride = write_vec(fbb, &attrs.stride);
    table(fbb, |fbb| {
        fbb.push_slot_always(vt::pool_attrs::KERNEL_SIZE, kernel_size);
        fbb.push_slot::<u8>(vt::pool_attrs::PAD_MODE, pad_mode(attrs.padding).0, 0);
        if let Some(pads) = pads {
            fbb.push_slot_always(vt::pool_attrs::PADS, pads);
        }
        fbb.push_slot_always(vt::pool_attrs::STRIDE, stride);
    })
}

fn build_attrs(
    fbb: &mut FlatBufferBuilder,
    attrs: &OpAttrs,
) -> (sg::OperatorAttrs, Option<WIPOffset<UnionWIPOffset>>) {
    let (kind, offset) = match attrs {
        OpAttrs::None => return (sg::OperatorAttrs::NONE, None),
        OpAttrs::AveragePool(pool) => (sg::OperatorAttrs::AveragePoolAttrs, build_pool_attrs(fbb, pool)),
        OpAttrs::MaxPool(pool) => (sg::OperatorAttrs::MaxPoolAttrs, build_pool_attrs(fbb, pool)),
        &OpAttrs::BatchNormalization { epsilon } => (
            sg::OperatorAttrs::BatchNormalizationAttrs,
            table(fbb, |fbb| {
                fbb.push_slot::<f32>(vt::batch_normalization_attrs::EPSILON, epsilon, 0.0)
            }),
        ),
        &OpAttrs::Cast { to } => {
            let to = match to {
                DataType::Int32 => sg::DataType::Int32,
                DataType::Float => sg::DataType::Float,
            };
            (
                sg::OperatorAttrs::CastAttrs,
                table(fbb, |fbb| fbb.push_slot::<u8>(vt::cast_attrs::TO, to.0, 0)),
            )
        }
        &OpAttrs::Clip { min, max } => (
            sg::OperatorAttrs::ClipAttrs,
            table(fbb, |fbb| {
                fbb.push_slot::<f32>(vt::clip_attrs::MIN, min, 0.0);
                fbb.push_slot::<f32>(vt::clip_attrs::MAX, max, 0.0);
            }),
        ),
        &OpAttrs::Concat { dim } => (
            sg::OperatorAttrs::ConcatAttrs,
            table(fbb, |fbb| fbb.push_slot::<i32>(vt::concat_attrs::DIM, dim, 0)),
        ),
        &OpAttrs::ConstantOfShape { value } => {
            let (value_type, value) = match value {
                Scalar::Int(v) => (
                    sg::Scalar::IntScalar,
                    table(fbb, |fbb| fbb.push_slot::<i32>(vt::scalar::VALUE, v, 0)),
                ),
                Scalar::Float(v) => (
                    sg::Scalar::FloatScalar,
                    table(fbb, |fbb| fbb.push_slot::<f32>(vt::scalar::VALUE, v, 0.0)),
                ),
            };
            (
                sg::OperatorAttrs::ConstantOfShapeAttrs,
                table(fbb, |fbb| {
                    fbb.push_slot::<u8>(vt::constant_of_shape_attrs::VALUE_TYPE, value_type.0, 0);
                    fbb.push_slot_always(vt::constant_of_shape_attrs::VALUE, value.as_union_value());
                }),
            )
        }
        OpAttrs::Conv(conv) => {
            let pads = write_pads(fbb, conv.padding);
            (
                sg::OperatorAttrs::ConvAttrs,
                table(fbb, |fbb| {
                    fbb.push_slot::<u32>(vt::conv_attrs::GROUPS, conv.groups, 0);
                    fbb.push_slot::<u8>(vt::conv_attrs::PAD_MODE, pad_mode(conv.padding).0, 0);
                    if let Some(pads) = pads {
                        fbb.push_slot_always(vt::conv_attrs::PADS, pads);
                    }
                    fbb.push_slot::<u32>(vt::conv_attrs::STRIDE, conv.stride, 0);
                }),
            )
        }
        &OpAttrs::ConvTranspose { stride } => (
            sg::OperatorAttrs::ConvTransposeAttrs,
            table(fbb, |fbb| fbb.push_slot::<u32>(vt::conv_transpose_attrs::STRIDE, stride, 0)),
        ),
        &OpAttrs::Gather { axis } => (
            sg::OperatorAttrs::GatherAttrs,
            table(fbb, |fbb| fbb.push_slot::<i32>(vt::axis_attrs::AXIS, axis, 0)),
        ),
        OpAttrs::Gemm(gemm) => (
            sg::OperatorAttrs::GemmAttrs,
            table(fbb, |fbb| {
                fbb.push_slot::<f32>(vt::gemm_attrs::ALPHA, gemm.alpha, 0.0);
                fbb.push_slot::<f32>(vt::gemm_attrs::BETA, gemm.beta, 0.0);
                fbb.push_slot::<bool>(vt::gemm_attrs::TRANSPOSE_A, gemm.transpose_a, false);
                fbb.push_slot::<bool>(vt::gemm_attrs::TRANSPOSE_B, gemm.transpose_b, false);
            }),
        ),
        &OpAttrs::LeakyRelu { alpha } => (
            sg::OperatorAttrs::LeakyReluAttrs,
            table(fbb, |fbb| fbb.push_slot::<f32>(vt::leaky_relu_attrs::ALPHA, alpha, 0.0)),
        ),
        OpAttrs::ReduceMean { axes, keep_dims } => {
            let axes = write_non_empty(fbb, axes.as_deref().unwrap_or_default());
            (
                sg::OperatorAttrs::ReduceMeanAttrs,
                table(fbb, |fbb| {
                    if let Some(axes) = axes {
                        fbb.push_slot_always(vt::reduce_mean_attrs::AXES, axes);
                    }
                    fbb.push_slot::<bool>(vt::reduce_mean_attrs::KEEP_DIMS, *keep_dims, false);
                }),
            )
        }
        &OpAttrs::Resize { mode } => {
            let mode = match mode {
                ResizeMode::Nearest => sg::ResizeMode::Nearest,
                ResizeMode::Linear => sg::ResizeMode::Linear,
            };
            (
                sg::OperatorAttrs::ResizeAttrs,
                table(fbb, |fbb| fbb.push_slot::<u8>(vt::resize_attrs::MODE, mode.0, 0)),
            )
        }
        &OpAttrs::Softmax { axis } => (
            sg::OperatorAttrs::SoftmaxAttrs,
            table(fbb, |fbb| fbb.push_slot::<i32>(vt::axis_attrs::AXIS, axis, 0)),
        ),
        OpAttrs::Split { axis, split } => {
            let split = write_non_empty(fbb, split);
            (
                sg::OperatorAttrs::SplitAttrs,
                table(fbb, |fbb| {
                    fbb.push_slot::<i32>(vt::split_attrs::AXIS, *axis, 0);
                    if let Some(split) = split {
                        fbb.push_slot_always(vt::split_attrs::SPLIT, split);
                    }
                }),
            )
        }
        OpAttrs::Squeeze { axes } => {
            let axes = write_non_empty(fbb, axes);
            (
                sg::OperatorAttrs::SqueezeAttrs,
                table(fbb, |fbb| {
                    if let Some(axes) = axes {
                        fbb.push_slot_always(vt::axes_attrs::AXES, axes);
                    }
                }),
            )
        }
        OpAttrs::Transpose { perm } => {
            let perm = write_non_empty(fbb, perm);
            (
                sg::OperatorAttrs::TransposeAttrs,
                table(fbb, |fbb| {
                    if let Some(perm) = perm {
                        fbb.push_slot_always(vt::transpose_attrs::PERM, perm);
                    }
                }),
            )
        }
        OpAttrs::Unsqueeze { axes } => {
            let axes = write_vec(fbb, axes);
            (
                sg::OperatorAttrs::UnsqueezeAttrs,
                table(fbb, |fbb| fbb.push_slot_always(vt::axes_attrs::AXES, axes)),
            )
        }
    };
    (kind, Some(offset.as_union_value()))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::ir::{ConvAttrs, GemmAttrs, ValueNode};

    fn value(name: &str) -> Node {
        Node::Value(ValueNode {
            name: name.to_string(),
        })
    }

    /// A graph with one operator reading "x" and writing "y".
    fn single_op(op_type: OpType, attrs: OpAttrs) -> Graph {
        Graph {
            nodes: vec![
                value("x"),
                value("y"),
                Node::Operator(OperatorNode {
                    name: "op".to_string(),
                    op_type,
                    attrs,
                    inputs: vec![0],
                    outputs: vec![1],
                }),
            ],
            inputs: vec![0],
            outputs: vec![1],
        }
    }

    fn with_operator<R>(buf: &[u8], check: impl FnOnce(sg::OperatorNode) -> R) -> R {
        let model = unsafe { sg::root_as_model_unchecked(buf) };
        let nodes = model.graph().unwrap().nodes().unwrap();
        check(nodes.get(2).data_as_operator_node().unwrap())
    }

    #[test]
    fn every_op_type_has_a_schema_counterpart() {
        for &op_type in OpType::ALL {
            assert_eq!(operator_type(op_type).variant_name(), Some(op_type.name()));
        }
    }

    #[rstest]
    #[case(OpType::Add, OpAttrs::None, sg::OperatorAttrs::NONE)]
    #[case(OpType::Reshape, OpAttrs::None, sg::OperatorAttrs::NONE)]
    #[case(
        OpType::AveragePool,
        OpAttrs::AveragePool(PoolAttrs { kernel_size: [2, 2], padding: Padding::Same, stride: [2, 2] }),
        sg::OperatorAttrs::AveragePoolAttrs
    )]
    #[case(
        OpType::BatchNormalization,
        OpAttrs::BatchNormalization { epsilon: 1e-5 },
        sg::OperatorAttrs::BatchNormalizationAttrs
    )]
    #[case(OpType::Cast, OpAttrs::Cast { to: DataType::Int32 }, sg::OperatorAttrs::CastAttrs)]
    #[case(OpType::Clip, OpAttrs::Clip { min: 0.0, max: 6.0 }, sg::OperatorAttrs::ClipAttrs)]
    #[case(OpType::Concat, OpAttrs::Concat { dim: 1 }, sg::OperatorAttrs::ConcatAttrs)]
    #[case(
        OpType::ConstantOfShape,
        OpAttrs::ConstantOfShape { value: Scalar::Int(0) },
        sg::OperatorAttrs::ConstantOfShapeAttrs
    )]
    #[case(
        OpType::Conv,
        OpAttrs::Conv(ConvAttrs { groups: 1, padding: Padding::Fixed([0; 4]), stride: 1 }),
        sg::OperatorAttrs::ConvAttrs
    )]
    #[case(OpType::ConvTranspose, OpAttrs::ConvTranspose { stride: 2 }, sg::OperatorAttrs::ConvTransposeAttrs)]
    #[case(OpType::Gather, OpAttrs::Gather { axis: 0 }, sg::OperatorAttrs::GatherAttrs)]
    #[case(
        OpType::Gemm,
        OpAttrs::Gemm(GemmAttrs { alpha: 1.0, beta: 1.0, transpose_a: false, transpose_b: true }),
        sg::OperatorAttrs::GemmAttrs
    )]
    #[case(OpType::LeakyRelu, OpAttrs::LeakyRelu { alpha: 0.01 }, sg::OperatorAttrs::LeakyReluAttrs)]
    #[case(
        OpType::MaxPool,
        OpAttrs::MaxPool(PoolAttrs { kernel_size: [3, 3], padding: Padding::Fixed([1; 4]), stride: [1, 1] }),
        sg::OperatorAttrs::MaxPoolAttrs
    )]
    #[case(
        OpType::ReduceMean,
        OpAttrs::ReduceMean { axes: None, keep_dims: true },
        sg::OperatorAttrs::ReduceMeanAttrs
    )]
    #[case(OpType::Resize, OpAttrs::Resize { mode: ResizeMode::Linear }, sg::OperatorAttrs::ResizeAttrs)]
    #[case(OpType::Softmax, OpAttrs::Softmax { axis: -1 }, sg::OperatorAttrs::SoftmaxAttrs)]
    #[case(OpType::Split, OpAttrs::Split { axis: 0, split: vec![] }, sg::OperatorAttrs::SplitAttrs)]
    #[case(OpType::Squeeze, OpAttrs::Squeeze { axes: vec![0] }, sg::OperatorAttrs::SqueezeAttrs)]
    #[case(OpType::Transpose, OpAttrs::Transpose { perm: vec![1, 0] }, sg::OperatorAttrs::TransposeAttrs)]
    #[case(OpType::Unsqueeze, OpAttrs::Unsqueeze { axes: vec![0] }, sg::OperatorAttrs::UnsqueezeAttrs)]
    fn single_operator_round_trip(
        #[case] op_type: OpType,
        #[case] attrs: OpAttrs,
        #[case] expected: sg::OperatorAttrs,
    ) {
        let buf = serialize_graph(&single_op(op_type, attrs));

        let model = unsafe { sg::root_as_model_unchecked(&buf) };
        assert_eq!(model.schema_version(), sg::SCHEMA_VERSION);
        let graph = model.graph().unwrap();
        assert_eq!(graph.nodes().unwrap().len(), 3);
        assert_eq!(graph.inputs().unwrap().iter().collect_vec(), vec![0]);
        assert_eq!(graph.outputs().unwrap().iter().collect_vec(), vec![1]);

        with_operator(&buf, |op| {
            assert_eq!(op.type_(), operator_type(op_type));
            assert_eq!(op.attrs_type(), expected);
            assert_eq!(op.inputs().unwrap().iter().collect_vec(), vec![0]);
            assert_eq!(op.outputs().unwrap().iter().collect_vec(), vec![1]);
        });
    }

    #[test]
    fn nodes_keep_order_and_kind() {
        let graph = Graph {
            nodes: vec![
                Node::Constant(
                    ConstantNode::new("w".to_string(), vec![2, 1], ConstantData::Float(vec![0.5, -1.0]))
                        .unwrap(),
                ),
                Node::Constant(
                    ConstantNode::new("shape".to_string(), vec![2], ConstantData::Int(vec![1, -1]))
                        .unwrap(),
                ),
                value("x"),
            ],
            inputs: vec![2],
            outputs: vec![],
        };
        let buf = serialize_graph(&graph);
        let model = unsafe { sg::root_as_model_unchecked(&buf) };
        let nodes = model.graph().unwrap().nodes().unwrap();

        let names = nodes.iter().map(|n| n.name().unwrap()).collect_vec();
        assert_eq!(names, vec!["w", "shape", "x"]);

        let w = nodes.get(0).data_as_constant_node().unwrap();
        assert_eq!(w.shape().unwrap().iter().collect_vec(), vec![2, 1]);
        assert_eq!(
            w.data_as_float_data().unwrap().data().unwrap().iter().collect_vec(),
            vec![0.5, -1.0]
        );
        assert!(w.data_as_int_data().is_none());

        let shape = nodes.get(1).data_as_constant_node().unwrap();
        assert_eq!(
            shape.data_as_int_data().unwrap().data().unwrap().iter().collect_vec(),
            vec![1, -1]
        );

        assert_eq!(nodes.get(2).data_type(), sg::NodeKind::ValueNode);
        assert!(nodes.get(2).data_as_value_node().is_some());
        assert!(model.graph().unwrap().outputs().unwrap().is_empty());
    }

    #[test]
    fn scalar_constant_has_empty_shape() {
        let graph = Graph {
            nodes: vec![Node::Constant(
                ConstantNode::new("s".to_string(), vec![], ConstantData::Int(vec![3])).unwrap(),
            )],
            ..Default::default()
        };
        let buf = serialize_graph(&graph);
        let model = unsafe { sg::root_as_model_unchecked(&buf) };
        let node = model.graph().unwrap().nodes().unwrap().get(0);
        let constant = node.data_as_constant_node().unwrap();
        assert!(constant.shape().unwrap().is_empty());
        assert_eq!(constant.data_as_int_data().unwrap().data().unwrap().get(0), 3);
    }

    #[test]
    fn padding_encoding() {
        let conv = |padding| {
            OpAttrs::Conv(ConvAttrs {
                groups: 2,
                padding,
                stride: 2,
            })
        };

        let buf = serialize_graph(&single_op(OpType::Conv, conv(Padding::Fixed([1, 2, 4, 3]))));
        with_operator(&buf, |op| {
            let attrs = op.attrs_as_conv_attrs().unwrap();
            assert_eq!(attrs.groups(), 2);
            assert_eq!(attrs.stride(), 2);
            assert_eq!(attrs.pad_mode(), sg::PadMode::Fixed);
            assert_eq!(attrs.pads().unwrap().iter().collect_vec(), vec![1, 2, 4, 3]);
        });

        let buf = serialize_graph(&single_op(OpType::Conv, conv(Padding::Same)));
        with_operator(&buf, |op| {
            let attrs = op.attrs_as_conv_attrs().unwrap();
            assert_eq!(attrs.pad_mode(), sg::PadMode::Same);
            assert!(attrs.pads().is_none());
        });

        let pool = OpAttrs::MaxPool(PoolAttrs {
            kernel_size: [3, 2],
            padding: Padding::Fixed([0, 1, 0, 1]),
            stride: [2, 1],
        });
        let buf = serialize_graph(&single_op(OpType::MaxPool, pool));
        with_operator(&buf, |op| {
            let attrs = op.attrs_as_max_pool_attrs().unwrap();
            assert_eq!(attrs.kernel_size().unwrap().iter().collect_vec(), vec![3, 2]);
            assert_eq!(attrs.pads().unwrap().iter().collect_vec(), vec![0, 1, 0, 1]);
            assert_eq!(attrs.stride().unwrap().iter().collect_vec(), vec![2, 1]);
        });
    }

    #[test]
    fn scalar_attribute_values() {
        let buf = serialize_graph(&single_op(
            OpType::Gemm,
            OpAttrs::Gemm(GemmAttrs {
                alpha: 0.5,
                beta: 0.0,
                transpose_a: true,
                transpose_b: false,
            }),
        ));
        with_operator(&buf, |op| {
            let gemm = op.attrs_as_gemm_attrs().unwrap();
            assert_eq!(gemm.alpha(), 0.5);
            assert_eq!(gemm.beta(), 0.0);
            assert!(gemm.transpose_a());
            assert!(!gemm.transpose_b());
        });

        let buf = serialize_graph(&single_op(
            OpType::ConstantOfShape,
            OpAttrs::ConstantOfShape {
                value: Scalar::Float(1.5),
            },
        ));
        with_operator(&buf, |op| {
            let attrs = op.attrs_as_constant_of_shape_attrs().unwrap();
            assert_eq!(attrs.value_type(), sg::Scalar::FloatScalar);
            assert_eq!(attrs.value_as_float_scalar().unwrap().value(), 1.5);
        });

        let buf = serialize_graph(&single_op(
            OpType::Cast,
            OpAttrs::Cast {
                to: DataType::Float,
            },
        ));
        with_operator(&buf, |op| {
            assert_eq!(op.attrs_as_cast_attrs().unwrap().to(), sg::DataType::Float);
        });
    }

    #[test]
    fn empty_lists_are_omitted() {
        let buf = serialize_graph(&single_op(
            OpType::ReduceMean,
            OpAttrs::ReduceMean {
                axes: Some(vec![]),
                keep_dims: false,
            },
        ));
        with_operator(&buf, |op| {
            let attrs = op.attrs_as_reduce_mean_attrs().unwrap();
            assert!(attrs.axes().is_none());
            assert!(!attrs.keep_dims());
        });

        let buf = serialize_graph(&single_op(
            OpType::ReduceMean,
            OpAttrs::ReduceMean {
                axes: Some(vec![-1]),
                keep_dims: true,
            },
        ));
        with_operator(&buf, |op| {
            let axes = op.attrs_as_reduce_mean_attrs().unwrap().axes().unwrap();
            assert_eq!(axes.iter().collect_vec(), vec![-1]);
        });

        let buf = serialize_graph(&single_op(OpType::Transpose, OpAttrs::Transpose { perm: vec![] }));
        with_operator(&buf, |op| {
            assert!(op.attrs_as_transpose_attrs().unwrap().perm().is_none());
        });

        let buf = serialize_graph(&single_op(
            OpType::Split,
            OpAttrs::Split {
                axis: 1,
                split: vec![],
            },
        ));
        with_operator(&buf, |op| {
            let attrs = op.attrs_as_split_attrs().unwrap();
            assert_eq!(attrs.axis(), 1);
            assert!(attrs.split().is_none());
        });

        // Unsqueeze always carries its axes.
        let buf = serialize_graph(&single_op(OpType::Unsqueeze, OpAttrs::Unsqueeze { axes: vec![] }));
        with_operator(&buf, |op| {
            let axes = op.attrs_as_unsqueeze_attrs().unwrap().axes().unwrap();
            assert!(axes.is_empty());
        });
    }
}
