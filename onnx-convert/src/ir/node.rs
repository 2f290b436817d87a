use crate::{error::ConvertError, ir::ops::{OpAttrs, OpType}};

/// Position of a node in [`Graph::nodes`].
pub type NodeId = u32;

/// A single value, as held by a 0-d constant or an operator attribute.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Scalar {
    Int(i32),
    Float(f32),
}

/// Element buffer of a constant. Only two element types survive conversion.
#[derive(Clone, Debug, PartialEq)]
pub enum ConstantData {
    Float(Vec<f32>),
    Int(Vec<i32>),
}

impl ConstantData {
    pub fn len(&self) -> usize {
        match self {
            ConstantData::Float(data) => data.len(),
            ConstantData::Int(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element at `index`, if in bounds.
    pub fn get(&self, index: usize) -> Option<Scalar> {
        match self {
            ConstantData::Float(data) => data.get(index).copied().map(Scalar::Float),
            ConstantData::Int(data) => data.get(index).copied().map(Scalar::Int),
        }
    }
}

/// Weights, biases and any other value known at conversion time.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstantNode {
    name: String,
    shape: Vec<u32>,
    data: ConstantData,
}

impl ConstantNode {
    /// Creates a constant, checking that `data` holds `product(shape)` elements.
    pub fn new(name: String, shape: Vec<u32>, data: ConstantData) -> Result<Self, ConvertError> {
        let Some(expected) = shape
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d as usize))
        else {
            return Err(ConvertError::InvalidTensorData {
                tensor: name,
                reason: format!("shape {shape:?} has too many elements"),
            });
        };
        if data.len() != expected {
            return Err(ConvertError::InvalidTensorData {
                tensor: name,
                reason: format!(
                    "shape {:?} requires {} elements, found {}",
                    shape,
                    expected,
                    data.len()
                ),
            });
        }
        Ok(Self { name, shape, data })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> &[u32] {
        &self.shape
    }

    pub fn data(&self) -> &ConstantData {
        &self.data
    }

    /// Returns the sole element of a 0-d constant. Any other shape, including
    /// `[1]`, is not a scalar.
    pub fn get_scalar(&self) -> Option<Scalar> {
        if !self.shape.is_empty() {
            return None;
        }
        self.data.get(0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct OperatorNode {
    pub name: String,
    pub op_type: OpType,
    pub attrs: OpAttrs,
    pub inputs: Vec<NodeId>,
    pub outputs: Vec<NodeId>,
}

/// Placeholder for a graph input, output or intermediate tensor.
#[derive(Clone, Debug, PartialEq)]
pub struct ValueNode {
    pub name: String,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Constant(ConstantNode),
    Operator(OperatorNode),
    Value(ValueNode),
}

impl Node {
    pub fn name(&self) -> &str {
        match self {
            Node::Constant(node) => node.name(),
            Node::Operator(node) => &node.name,
            Node::Value(node) => &node.name,
        }
    }

    pub fn as_constant(&self) -> Option<&ConstantNode> {
        match self {
            Node::Constant(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_operator(&self) -> Option<&OperatorNode> {
        match self {
            Node::Operator(node) => Some(node),
            _ => None,
        }
    }
}

/// Runtime-agnostic model graph. Nodes reference each other by index only.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Graph {
    pub nodes: Vec<Node>,
    /// Indices of nodes in `nodes` that are model inputs.
    pub inputs: Vec<NodeId>,
    /// Indices of nodes in `nodes` that are model outputs.
    pub outputs: Vec<NodeId>,
}
