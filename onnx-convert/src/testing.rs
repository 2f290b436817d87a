//! Builders for ONNX protos, shared by unit tests, integration tests and
//! benchmarks.

use tract_onnx::pb::{
    attribute_proto::AttributeType, tensor_proto::DataType, AttributeProto, GraphProto, ModelProto,
    NodeProto, OperatorSetIdProto, TensorProto, ValueInfoProto,
};

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

pub fn node(
    op_type: &str,
    name: &str,
    inputs: &[&str],
    outputs: &[&str],
    attrs: Vec<AttributeProto>,
) -> NodeProto {
    NodeProto {
        op_type: op_type.to_string(),
        name: name.to_string(),
        input: strings(inputs),
        output: strings(outputs),
        attribute: attrs,
        ..Default::default()
    }
}

fn attr(name: &str, attr_type: AttributeType) -> AttributeProto {
    AttributeProto {
        name: name.to_string(),
        r#type: attr_type as i32,
        ..Default::default()
    }
}

pub fn attr_int(name: &str, value: i64) -> AttributeProto {
    AttributeProto {
        i: value,
        ..attr(name, AttributeType::Int)
    }
}

pub fn attr_float(name: &str, value: f32) -> AttributeProto {
    AttributeProto {
        f: value,
        ..attr(name, AttributeType::Float)
    }
}

pub fn attr_ints(name: &str, values: &[i64]) -> AttributeProto {
    AttributeProto {
        ints: values.to_vec(),
        ..attr(name, AttributeType::Ints)
    }
}

pub fn attr_string(name: &str, value: &str) -> AttributeProto {
    AttributeProto {
        s: value.as_bytes().to_vec(),
        ..attr(name, AttributeType::String)
    }
}

pub fn attr_tensor(name: &str, value: TensorProto) -> AttributeProto {
    AttributeProto {
        t: Some(value),
        ..attr(name, AttributeType::Tensor)
    }
}

pub fn float_tensor(name: &str, dims: &[i64], data: &[f32]) -> TensorProto {
    TensorProto {
        name: name.to_string(),
        dims: dims.to_vec(),
        data_type: DataType::Float as i32,
        float_data: data.to_vec(),
        ..Default::default()
    }
}

pub fn int64_tensor(name: &str, dims: &[i64], data: &[i64]) -> TensorProto {
    TensorProto {
        name: name.to_string(),
        dims: dims.to_vec(),
        data_type: DataType::Int64 as i32,
        int64_data: data.to_vec(),
        ..Default::default()
    }
}

/// A tensor whose payload is stored little-endian in `raw_data`.
pub fn raw_tensor(name: &str, dims: &[i64], data_type: DataType, raw: Vec<u8>) -> TensorProto {
    TensorProto {
        name: name.to_string(),
        dims: dims.to_vec(),
        data_type: data_type as i32,
        raw_data: raw,
        ..Default::default()
    }
}

pub fn value_info(name: &str) -> ValueInfoProto {
    ValueInfoProto {
        name: name.to_string(),
        ..Default::default()
    }
}

pub fn graph(
    nodes: Vec<NodeProto>,
    initializers: Vec<TensorProto>,
    inputs: &[&str],
    outputs: &[&str],
) -> GraphProto {
    GraphProto {
        name: "graph".to_string(),
        node: nodes,
        initializer: initializers,
        input: inputs.iter().map(|name| value_info(name)).collect(),
        output: outputs.iter().map(|name| value_info(name)).collect(),
        ..Default::default()
    }
}

pub fn model(graph: GraphProto) -> ModelProto {
    ModelProto {
        ir_version: 8,
        opset_import: vec![OperatorSetIdProto {
            domain: String::new(),
            version: 17,
        }],
        graph: Some(graph),
        ..Default::default()
    }
}

/// A small convolutional classifier: `depth` Conv/Relu blocks followed by
/// pooling and a fully connected layer.
pub fn conv_net(depth: usize, channels: i64) -> ModelProto {
    let mut nodes = Vec::new();
    let mut initializers = Vec::new();
    let mut input = "input".to_string();

    let kernel_len = (channels * channels * 9) as usize;
    for i in 0..depth {
        let (weight, bias) = (format!("conv{i}.weight"), format!("conv{i}.bias"));
        initializers.push(float_tensor(
            &weight,
            &[channels, channels, 3, 3],
            &vec![0.01; kernel_len],
        ));
        initializers.push(float_tensor(&bias, &[channels], &vec![0.0; channels as usize]));

        let (conv_out, relu_out) = (format!("conv{i}.out"), format!("relu{i}.out"));
        nodes.push(node(
            "Conv",
            &format!("conv{i}"),
            &[&input, &weight, &bias],
            &[&conv_out],
            vec![
                attr_ints("kernel_shape", &[3, 3]),
                attr_ints("pads", &[1, 1, 1, 1]),
                attr_ints("strides", &[1, 1]),
            ],
        ));
        nodes.push(node("Relu", &format!("relu{i}"), &[&conv_out], &[&relu_out], vec![]));
        input = relu_out;
    }

    initializers.push(int64_tensor("flat_shape", &[2], &[1, -1]));
    initializers.push(float_tensor("fc.weight", &[10, channels], &vec![0.1; 10 * channels as usize]));
    nodes.push(node("GlobalAveragePool", "pool", &[&input], &["pooled"], vec![]));
    nodes.push(node("Reshape", "flatten", &["pooled", "flat_shape"], &["flat"], vec![]));
    nodes.push(node(
        "Gemm",
        "fc",
        &["flat", "fc.weight"],
        &["logits"],
        vec![attr_int("transB", 1)],
    ));
    nodes.push(node("Softmax", "softmax", &["logits"], &["output"], vec![attr_int("axis", 1)]));

    model(graph(nodes, initializers, &["input"], &["output"]))
}
