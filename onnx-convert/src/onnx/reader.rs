//! Typed access to the attributes of a single ONNX operator.

use std::{
    collections::{HashMap, HashSet},
    fmt::{self, Debug, Display},
};

use tract_onnx::pb::{attribute_proto::AttributeType, AttributeProto, NodeProto, TensorProto};

use crate::{
    diagnostics::Diagnostics,
    error::ConvertError,
    ir::{ConstantNode, Scalar},
};

/// The attribute kinds operator rules know how to read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttrType {
    Int,
    Float,
    String,
    Ints,
    Tensor,
}

impl Display for AttrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AttrType::Int => "int",
            AttrType::Float => "float",
            AttrType::String => "string",
            AttrType::Ints => "ints",
            AttrType::Tensor => "tensor",
        })
    }
}

/// Decoded value of an ONNX attribute.
#[derive(Clone, Debug, PartialEq)]
pub enum AttrValue {
    Int(i64),
    Float(f32),
    String(String),
    Ints(Vec<i64>),
    Tensor(TensorProto),
}

impl AttrValue {
    /// Decodes `attr` according to its declared type. Returns `None` for the
    /// kinds no rule reads (graphs, float lists, ...).
    pub fn from_proto(attr: &AttributeProto) -> Option<AttrValue> {
        let value = match AttributeType::from_i32(attr.r#type)? {
            AttributeType::Int => AttrValue::Int(attr.i),
            AttributeType::Float => AttrValue::Float(attr.f),
            AttributeType::String => AttrValue::String(String::from_utf8_lossy(&attr.s).into_owned()),
            AttributeType::Ints => AttrValue::Ints(attr.ints.clone()),
            AttributeType::Tensor => AttrValue::Tensor(attr.t.clone()?),
            _ => return None,
        };
        Some(value)
    }

    pub fn attr_type(&self) -> AttrType {
        match self {
            AttrValue::Int(_) => AttrType::Int,
            AttrValue::Float(_) => AttrType::Float,
            AttrValue::String(_) => AttrType::String,
            AttrValue::Ints(_) => AttrType::Ints,
            AttrValue::Tensor(_) => AttrType::Tensor,
        }
    }
}

/// Rust types an attribute can be read as.
pub trait FromAttr: Sized {
    const TYPE: AttrType;

    fn from_attr(value: AttrValue) -> Option<Self>;

    /// Conversion from a 0-d constant input, for attributes that later opsets
    /// moved to inputs.
    fn from_scalar(_scalar: Scalar) -> Option<Self> {
        None
    }
}

impl FromAttr for i64 {
    const TYPE: AttrType = AttrType::Int;

    fn from_attr(value: AttrValue) -> Option<Self> {
        match value {
            AttrValue::Int(v) => Some(v),
            _ => None,
        }
    }

    fn from_scalar(scalar: Scalar) -> Option<Self> {
        match scalar {
            Scalar::Int(v) => Some(v.into()),
            Scalar::Float(_) => None,
        }
    }
}

impl FromAttr for f32 {
    const TYPE: AttrType = AttrType::Float;

    fn from_attr(value: AttrValue) -> Option<Self> {
        match value {
            AttrValue::Float(v) => Some(v),
            _ => None,
        }
    }

    fn from_scalar(scalar: Scalar) -> Option<Self> {
        match scalar {
            Scalar::Int(v) => Some(v as f32),
            Scalar::Float(v) => Some(v),
        }
    }
}

impl FromAttr for String {
    const TYPE: AttrType = AttrType::String;

    fn from_attr(value: AttrValue) -> Option<Self> {
        match value {
            AttrValue::String(v) => Some(v),
            _ => None,
        }
    }
}

impl FromAttr for Vec<i64> {
    const TYPE: AttrType = AttrType::Ints;

    fn from_attr(value: AttrValue) -> Option<Self> {
        match value {
            AttrValue::Ints(v) => Some(v),
            _ => None,
        }
    }
}

impl FromAttr for TensorProto {
    const TYPE: AttrType = AttrType::Tensor;

    fn from_attr(value: AttrValue) -> Option<Self> {
        match value {
            AttrValue::Tensor(v) => Some(v),
            _ => None,
        }
    }
}

/// Resolves operator input names to constants known at conversion time.
pub trait ConstantLookup {
    fn constant(&self, name: &str) -> Option<&ConstantNode>;
}

impl ConstantLookup for HashMap<String, ConstantNode> {
    fn constant(&self, name: &str) -> Option<&ConstantNode> {
        self.get(name)
    }
}

/// Reads the attributes of one operator and remembers which ones were
/// looked at, so that the rest can be reported as unhandled.
pub struct AttributeReader<'a> {
    node: &'a NodeProto,
    consumed: HashSet<String>,
    diagnostics: &'a mut Diagnostics,
}

impl<'a> AttributeReader<'a> {
    pub fn new(node: &'a NodeProto, diagnostics: &'a mut Diagnostics) -> Self {
        Self {
            node,
            consumed: HashSet::new(),
            diagnostics,
        }
    }

    /// Sink for findings made while materializing tensor attributes.
    pub fn diagnostics(&mut self) -> &mut Diagnostics {
        &mut *self.diagnostics
    }

    /// Returns attribute `name`, or `default` if the operator does not set it.
    pub fn get<T: FromAttr>(&mut self, name: &str, default: T) -> Result<T, ConvertError> {
        Ok(self.get_opt(name)?.unwrap_or(default))
    }

    pub fn get_opt<T: FromAttr>(&mut self, name: &str) -> Result<Option<T>, ConvertError> {
        self.ignore(name);
        self.node
            .attribute
            .iter()
            .find(|attr| attr.name == name)
            .map(read_attr::<T>)
            .transpose()
    }

    /// Marks `name` as handled without reading it.
    pub fn ignore(&mut self, name: &str) {
        self.consumed.insert(name.to_string());
    }

    pub fn require<T: FromAttr>(&mut self, name: &str) -> Result<T, ConvertError> {
        self.get_opt(name)?
            .ok_or_else(|| ConvertError::MissingRequiredAttribute(name.to_string()))
    }

    /// Reads a value that is an attribute in older opsets and input
    /// `input_index` in newer ones. An input must be a 0-d constant.
    pub fn require_or_input<T: FromAttr>(
        &mut self,
        name: &str,
        input_index: usize,
        constants: &dyn ConstantLookup,
    ) -> Result<T, ConvertError> {
        if let Some(value) = self.get_opt(name)? {
            return Ok(value);
        }
        let Some(input) = self.node.input.get(input_index) else {
            return Err(ConvertError::MissingRequiredAttributeOrInput(name.to_string()));
        };
        let constant = constants
            .constant(input)
            .ok_or_else(|| ConvertError::NotAConstant(name.to_string()))?;
        let scalar = constant
            .get_scalar()
            .ok_or_else(|| ConvertError::NotScalar(name.to_string()))?;
        T::from_scalar(scalar).ok_or_else(|| ConvertError::TypeMismatch {
            name: name.to_string(),
            expected: T::TYPE,
            actual: match scalar {
                Scalar::Int(_) => "int scalar".to_string(),
                Scalar::Float(_) => "float scalar".to_string(),
            },
        })
    }

    /// Fails if attribute `name` is set to anything other than `default`.
    pub fn check_default<T>(&mut self, name: &str, default: T) -> Result<(), ConvertError>
    where
        T: FromAttr + PartialEq + Debug + Clone,
    {
        let value = self.get(name, default.clone())?;
        if value != default {
            return Err(ConvertError::unsupported_value(
                name,
                value,
                format!("{default:?}"),
            ));
        }
        Ok(())
    }

    /// Names of the attributes nothing has read or ignored, in source order.
    pub fn unhandled(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.node
            .attribute
            .iter()
            .map(|attr| attr.name.as_str())
            .filter(|name| !self.consumed.contains(*name))
    }
}

fn read_attr<T: FromAttr>(attr: &AttributeProto) -> Result<T, ConvertError> {
    let mismatch = |actual: String| ConvertError::TypeMismatch {
        name: attr.name.clone(),
        expected: T::TYPE,
        actual,
    };
    match AttrValue::from_proto(attr) {
        Some(value) => {
            let actual = value.attr_type();
            T::from_attr(value).ok_or_else(|| mismatch(actual.to_string()))
        }
        None => Err(mismatch(proto_type_name(attr.r#type))),
    }
}

fn proto_type_name(attr_type: i32) -> String {
    match AttributeType::from_i32(attr_type) {
        Some(t) => format!("{t:?}").to_lowercase(),
        None => format!("unknown ({attr_type})"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ir::ConstantData,
        testing::{attr_float, attr_int, attr_ints, attr_string, attr_tensor, float_tensor, node},
    };

    fn clip_node(attrs: Vec<AttributeProto>) -> NodeProto {
        node("Clip", "clip", &["x", "min", "max"], &["y"], attrs)
    }

    fn constants(entries: Vec<ConstantNode>) -> HashMap<String, ConstantNode> {
        entries
            .into_iter()
            .map(|c| (c.name().to_string(), c))
            .collect()
    }

    fn scalar(name: &str, data: ConstantData) -> ConstantNode {
        ConstantNode::new(name.to_string(), vec![], data).unwrap()
    }

    #[test]
    fn get_returns_value_or_default() {
        let node = node("Gemm", "g", &[], &[], vec![attr_float("alpha", 0.5), attr_int("transA", 1)]);
        let mut diags = Diagnostics::new();
        let mut reader = AttributeReader::new(&node, &mut diags);

        assert_eq!(reader.get("alpha", 1.0f32).unwrap(), 0.5);
        assert_eq!(reader.get("beta", 1.0f32).unwrap(), 1.0);
        assert_eq!(reader.get("transA", 0i64).unwrap(), 1);
        assert_eq!(reader.get_opt::<Vec<i64>>("axes").unwrap(), None);
        assert_eq!(reader.unhandled().count(), 0);
    }

    #[test]
    fn strings_are_decoded() {
        let node = node("Resize", "r", &[], &[], vec![attr_string("mode", "linear")]);
        let mut diags = Diagnostics::new();
        let mut reader = AttributeReader::new(&node, &mut diags);
        assert_eq!(reader.get("mode", "nearest".to_string()).unwrap(), "linear");
    }

    #[test]
    fn type_mismatch_is_an_error() {
        let node = node("Gather", "g", &[], &[], vec![attr_float("axis", 1.0)]);
        let mut diags = Diagnostics::new();
        let mut reader = AttributeReader::new(&node, &mut diags);

        let err = reader.get("axis", 0i64).unwrap_err();
        assert_eq!(
            err,
            ConvertError::TypeMismatch {
                name: "axis".to_string(),
                expected: AttrType::Int,
                actual: "float".to_string(),
            }
        );
        // A failed read still counts as handled.
        assert_eq!(reader.unhandled().count(), 0);
    }

    #[test]
    fn unsupported_attribute_kind_is_a_mismatch() {
        let mut attr = attr_int("pads", 0);
        attr.r#type = AttributeType::Floats as i32;
        let node = node("Conv", "c", &[], &[], vec![attr]);
        let mut diags = Diagnostics::new();
        let mut reader = AttributeReader::new(&node, &mut diags);

        let err = reader.get("pads", vec![0i64; 4]).unwrap_err();
        assert!(matches!(err, ConvertError::TypeMismatch { actual, .. } if actual == "floats"));
    }

    #[test]
    fn require_reports_missing() {
        let node = node("Concat", "c", &[], &[], vec![]);
        let mut diags = Diagnostics::new();
        let mut reader = AttributeReader::new(&node, &mut diags);
        assert_eq!(
            reader.require::<i64>("axis").unwrap_err(),
            ConvertError::MissingRequiredAttribute("axis".to_string())
        );
    }

    #[test]
    fn require_reads_tensor() {
        let tensor = float_tensor("", &[1], &[3.0]);
        let node = node("ConstantOfShape", "c", &[], &[], vec![attr_tensor("value", tensor.clone())]);
        let mut diags = Diagnostics::new();
        let mut reader = AttributeReader::new(&node, &mut diags);
        assert_eq!(reader.require::<TensorProto>("value").unwrap(), tensor);
    }

    #[test]
    fn require_or_input_prefers_attribute() {
        let node = clip_node(vec![attr_float("min", -1.0)]);
        let mut diags = Diagnostics::new();
        let mut reader = AttributeReader::new(&node, &mut diags);
        let constants = constants(vec![scalar("min", ConstantData::Float(vec![-5.0]))]);

        assert_eq!(reader.require_or_input::<f32>("min", 1, &constants).unwrap(), -1.0);
    }

    #[test]
    fn require_or_input_reads_constant_scalars() {
        let node = clip_node(vec![]);
        let mut diags = Diagnostics::new();
        let mut reader = AttributeReader::new(&node, &mut diags);
        let constants = constants(vec![
            scalar("min", ConstantData::Int(vec![0])),
            scalar("max", ConstantData::Float(vec![6.0])),
        ]);

        assert_eq!(reader.require_or_input::<f32>("min", 1, &constants).unwrap(), 0.0);
        assert_eq!(reader.require_or_input::<f32>("max", 2, &constants).unwrap(), 6.0);
        assert_eq!(
            reader.require_or_input::<i64>("max", 2, &constants).unwrap_err(),
            ConvertError::TypeMismatch {
                name: "max".to_string(),
                expected: AttrType::Int,
                actual: "float scalar".to_string(),
            }
        );
    }

    #[test]
    fn require_or_input_failures() {
        let node = clip_node(vec![]);
        let mut diags = Diagnostics::new();
        let mut reader = AttributeReader::new(&node, &mut diags);

        let missing = constants(vec![]);
        assert_eq!(
            reader.require_or_input::<f32>("min", 1, &missing).unwrap_err(),
            ConvertError::NotAConstant("min".to_string())
        );

        let vector = constants(vec![
            ConstantNode::new("min".to_string(), vec![1], ConstantData::Float(vec![0.0])).unwrap(),
        ]);
        assert_eq!(
            reader.require_or_input::<f32>("min", 1, &vector).unwrap_err(),
            ConvertError::NotScalar("min".to_string())
        );

        assert_eq!(
            reader.require_or_input::<f32>("max", 5, &missing).unwrap_err(),
            ConvertError::MissingRequiredAttributeOrInput("max".to_string())
        );
    }

    #[test]
    fn check_default_rejects_other_values() {
        let node = node(
            "MaxPool",
            "p",
            &[],
            &[],
            vec![attr_int("ceil_mode", 0), attr_ints("dilations", &[2, 2])],
        );
        let mut diags = Diagnostics::new();
        let mut reader = AttributeReader::new(&node, &mut diags);

        reader.check_default("ceil_mode", 0i64).unwrap();
        reader.check_default("storage_order", 0i64).unwrap();
        let err = reader.check_default("dilations", vec![1i64, 1]).unwrap_err();
        assert!(matches!(
            err,
            ConvertError::UnsupportedAttributeValue { name, value, .. }
                if name == "dilations" && value == "[2, 2]"
        ));
    }

    #[test]
    fn unhandled_lists_unread_attributes_in_order() {
        let node = node(
            "Conv",
            "c",
            &[],
            &[],
            vec![
                attr_int("zeta", 1),
                attr_int("group", 1),
                attr_ints("kernel_shape", &[3, 3]),
                attr_int("alpha", 1),
            ],
        );
        let mut diags = Diagnostics::new();
        let mut reader = AttributeReader::new(&node, &mut diags);

        reader.get("group", 1i64).unwrap();
        reader.ignore("kernel_shape");
        assert_eq!(reader.unhandled().collect::<Vec<_>>(), vec!["zeta", "alpha"]);
    }
}
