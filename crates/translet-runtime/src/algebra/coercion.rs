//! Conversions between the value kinds (`string()`, `number()`, `boolean()` and the
//! node-set/result-tree casts compiled code performs on variable references).
use crate::algebra::numeric::{parse_number, write_number};
use crate::error::{Error, ErrorCode};
use crate::model::TreeNode;
use crate::node_set::NodeSet;
use crate::value::{ResultTreeFragment, Value, ValueKind};

/// String value of the first node in document order, or `""` for an empty set.
pub fn node_set_string<N: TreeNode>(set: &NodeSet<N>) -> String {
    set.first_in_document_order().map(TreeNode::string_value).unwrap_or_default()
}

pub fn string_of<N: TreeNode>(value: &Value<N>) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(d) => {
            let mut out = String::new();
            write_number(&mut out, *d);
            out
        }
        Value::Boolean(b) => if *b { "true" } else { "false" }.to_string(),
        Value::Node(n) => n.string_value(),
        Value::NodeSet(set) => node_set_string(set),
        Value::ResultTreeFragment(rtf) => rtf.string_value().to_string(),
    }
}

pub fn number_of<N: TreeNode>(value: &Value<N>) -> f64 {
    match value {
        Value::Number(d) => *d,
        Value::Boolean(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::String(s) => parse_number(s),
        Value::Node(n) => parse_number(&n.string_value()),
        Value::NodeSet(set) => parse_number(&node_set_string(set)),
        Value::ResultTreeFragment(rtf) => parse_number(rtf.string_value()),
    }
}

/// Numbers are true unless zero or NaN; strings and fragments unless empty; node-sets
/// unless empty. A single node is always true.
pub fn boolean_of<N: TreeNode>(value: &Value<N>) -> bool {
    match value {
        Value::Boolean(b) => *b,
        Value::Number(d) => *d != 0.0 && !d.is_nan(),
        Value::String(s) => !s.is_empty(),
        Value::Node(_) => true,
        Value::NodeSet(set) => !set.is_empty(),
        Value::ResultTreeFragment(rtf) => !rtf.string_value().is_empty(),
    }
}

/// XPath `not()`.
pub fn not<N: TreeNode>(value: &Value<N>) -> bool {
    !boolean_of(value)
}

fn conversion_error(from: ValueKind, to: ValueKind) -> Error {
    Error::from_code(ErrorCode::DATA_CONVERSION_ERR, [from.name(), to.name()])
}

/// Treat a value as a node-set. Only node-sets, single nodes and fragments backed by a
/// tree qualify; everything else raises `DATA_CONVERSION_ERR`.
pub fn to_node_set<N: TreeNode>(value: Value<N>) -> Result<NodeSet<N>, Error> {
    match value {
        Value::NodeSet(set) => Ok(set),
        Value::Node(n) => Ok(NodeSet::singleton(n)),
        Value::ResultTreeFragment(rtf) => match rtf.root() {
            Some(root) => Ok(NodeSet::singleton(root.clone())),
            None => Err(conversion_error(ValueKind::ResultTreeFragment, ValueKind::NodeSet)),
        },
        other => Err(conversion_error(other.kind(), ValueKind::NodeSet)),
    }
}

/// Treat a value as a single node: the first node of a set in document order.
pub fn to_node<N: TreeNode>(value: Value<N>) -> Result<N, Error> {
    let kind = value.kind();
    to_node_set(value)?
        .first_in_document_order()
        .cloned()
        .ok_or_else(|| conversion_error(kind, ValueKind::Node))
}

/// Treat a value as a result tree fragment; only fragments qualify.
pub fn to_result_tree<N: TreeNode>(value: Value<N>) -> Result<ResultTreeFragment<N>, Error> {
    match value {
        Value::ResultTreeFragment(rtf) => Ok(rtf),
        other => Err(conversion_error(other.kind(), ValueKind::ResultTreeFragment)),
    }
}
