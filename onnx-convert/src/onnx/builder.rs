use std::collections::{hash_map::Entry, HashMap};

use itertools::Itertools;
use tracing::{debug, info};
use tract_onnx::pb::{GraphProto, NodeProto};

use crate::{
    diagnostics::{Diagnostic, Diagnostics},
    error::ConvertError,
    ir::{ConstantNode, Graph, Node, NodeId, OpType, OperatorNode, ValueNode},
    onnx::{
        constant::{constant_from_constant_op, constant_from_tensor},
        reader::{AttributeReader, ConstantLookup},
        rules::attr_rule,
    },
};

const CONSTANT_OP: &str = "Constant";

/// Result of converting an ONNX graph into the IR.
#[derive(Debug)]
pub struct Conversion {
    pub graph: Graph,
    pub diagnostics: Vec<Diagnostic>,
}

/// Builds the IR for `graph`.
///
/// Nodes are appended in a fixed order: initializers, `Constant` operators,
/// graph inputs without an initializer, then each remaining operator preceded
/// by its output values. Operators can therefore only refer to nodes that
/// precede them.
pub fn build_graph(graph: &GraphProto) -> Result<Conversion, ConvertError> {
    let mut diagnostics = Diagnostics::new();
    let mut builder = GraphBuilder::default();

    for tensor in &graph.initializer {
        let constant = constant_from_tensor(tensor, &mut diagnostics)?;
        builder.add_node(Node::Constant(constant))?;
    }
    for node in graph.node.iter().filter(|node| node.op_type == CONSTANT_OP) {
        let constant = constant_from_constant_op(node, &mut diagnostics)?;
        builder.add_node(Node::Constant(constant))?;
    }
    for input in &graph.input {
        // Inputs that also appear as initializers are treated as constants.
        if !builder.index.contains_key(&input.name) {
            builder.add_node(Node::Value(ValueNode {
                name: input.name.clone(),
            }))?;
        }
    }
    for node in graph.node.iter().filter(|node| node.op_type != CONSTANT_OP) {
        for output in &node.output {
            builder.add_node(Node::Value(ValueNode {
                name: output.clone(),
            }))?;
        }
        let operator = builder.convert_operator(node, &mut diagnostics)?;
        builder.add_node(Node::Operator(operator))?;
    }

    let inputs = graph
        .input
        .iter()
        .map(|input| {
            builder
                .resolve(&input.name)
                .ok_or_else(|| ConvertError::UnknownGraphInput(input.name.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let outputs = graph
        .output
        .iter()
        .map(|output| {
            builder
                .resolve(&output.name)
                .ok_or_else(|| ConvertError::UnknownGraphOutput(output.name.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    info!(
        nodes = builder.nodes.len(),
        inputs = inputs.len(),
        outputs = outputs.len(),
        diagnostics = diagnostics.entries().len(),
        "built graph"
    );
    Ok(Conversion {
        graph: Graph {
            nodes: builder.nodes,
            inputs,
            outputs,
        },
        diagnostics: diagnostics.into_vec(),
    })
}

#[derive(Default)]
struct GraphBuilder {
    nodes: Vec<Node>,
    index: HashMap<String, NodeId>,
}

impl GraphBuilder {
    fn add_node(&mut self, node: Node) -> Result<NodeId, ConvertError> {
        let id = NodeId::try_from(self.nodes.len()).map_err(|_| ConvertError::TooManyNodes)?;
        match self.index.entry(node.name().to_string()) {
            Entry::Occupied(entry) => {
                return Err(ConvertError::DuplicateNodeName(entry.key().clone()))
            }
            Entry::Vacant(entry) => {
                entry.insert(id);
            }
        }
        self.nodes.push(node);
        Ok(id)
    }

    fn resolve(&self, name: &str) -> Option<NodeId> {
        self.index.get(name).copied()
    }

    fn convert_operator(
        &self,
        node: &NodeProto,
        diagnostics: &mut Diagnostics,
    ) -> Result<OperatorNode, ConvertError> {
        let inputs = node
            .input
            .iter()
            .map(|input| {
                self.resolve(input).ok_or_else(|| ConvertError::UnknownInput {
                    op: node.name.clone(),
                    input: input.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let outputs = node
            .output
            .iter()
            .map(|output| {
                self.resolve(output).ok_or_else(|| ConvertError::UnknownOutput {
                    op: node.name.clone(),
                    output: output.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let op_type =
            OpType::from_onnx(&node.op_type).ok_or_else(|| ConvertError::UnsupportedOperator {
                op: node.name.clone(),
                op_type: node.op_type.clone(),
            })?;

        let mut reader = AttributeReader::new(node, diagnostics);
        let attrs = attr_rule(op_type)(&mut reader, self)?;
        let unhandled = reader.unhandled().map(str::to_string).collect_vec();
        for attr in unhandled {
            diagnostics.push(Diagnostic::UnhandledAttribute {
                op: node.name.clone(),
                op_type: node.op_type.clone(),
                attr,
            });
        }

        debug!(op = %node.name, op_type = op_type.name(), ?inputs, ?outputs, "converted operator");
        Ok(OperatorNode {
            name: node.name.clone(),
            op_type,
            attrs,
            inputs,
            outputs,
        })
    }
}

impl ConstantLookup for GraphBuilder {
    fn constant(&self, name: &str) -> Option<&ConstantNode> {
        let id = self.resolve(name)?;
        self.nodes.get(id as usize)?.as_constant()
    }
}
