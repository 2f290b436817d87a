//! Intermediate representation shared by the ONNX front end and the
//! serializer.

mod node;
mod ops;

pub use node::{ConstantData, ConstantNode, Graph, Node, NodeId, OperatorNode, Scalar, ValueNode};
pub(crate) use ops::for_each_op_type;
pub use ops::{ConvAttrs, DataType, GemmAttrs, OpAttrs, OpType, Padding, PoolAttrs, ResizeMode};
