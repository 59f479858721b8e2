//! The closed set of XPath 1.0 dynamic values.
use core::fmt;
use std::sync::Arc;

use crate::model::TreeNode;
use crate::node_set::NodeSet;

/// A materialized sub-tree produced by an earlier instruction (variable bodies,
/// `xsl:param` content). Only its string value takes part in the value algebra.
#[derive(Debug, Clone)]
pub struct ResultTreeFragment<N> {
    root: Option<N>,
    text: Arc<str>,
}

impl<N: TreeNode> ResultTreeFragment<N> {
    /// Fragment rooted at `root`; the string value is computed once, here.
    pub fn from_root(root: N) -> Self {
        let text: Arc<str> = Arc::from(root.string_value());
        Self { root: Some(root), text }
    }
}

impl<N> ResultTreeFragment<N> {
    /// Text-only fragment without a navigable tree.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self { root: None, text: Arc::from(text.into()) }
    }

    pub fn root(&self) -> Option<&N> {
        self.root.as_ref()
    }

    pub fn string_value(&self) -> &str {
        &self.text
    }
}

/// Discriminant of [`Value`], used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    NodeSet,
    Node,
    String,
    Number,
    Boolean,
    ResultTreeFragment,
}

impl ValueKind {
    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::NodeSet => "node-set",
            ValueKind::Node => "node",
            ValueKind::String => "string",
            ValueKind::Number => "number",
            ValueKind::Boolean => "boolean",
            ValueKind::ResultTreeFragment => "result-tree",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone)]
pub enum Value<N> {
    NodeSet(NodeSet<N>),
    Node(N),
    String(String),
    Number(f64),
    Boolean(bool),
    ResultTreeFragment(ResultTreeFragment<N>),
}

impl<N> Value<N> {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::NodeSet(_) => ValueKind::NodeSet,
            Value::Node(_) => ValueKind::Node,
            Value::String(_) => ValueKind::String,
            Value::Number(_) => ValueKind::Number,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::ResultTreeFragment(_) => ValueKind::ResultTreeFragment,
        }
    }

    /// Every kind except a raw node-set counts as "simple" for comparisons.
    pub fn is_simple(&self) -> bool {
        !matches!(self, Value::NodeSet(_))
    }
}

impl<N: TreeNode> PartialEq for Value<N> {
    /// Structural equality (same kind, same content). This is not the XPath `=` operator;
    /// use [`crate::algebra::compare`] for that.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::NodeSet(a), Value::NodeSet(b)) => a == b,
            (Value::Node(a), Value::Node(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::ResultTreeFragment(a), Value::ResultTreeFragment(b)) => {
                a.string_value() == b.string_value() && a.root() == b.root()
            }
            _ => false,
        }
    }
}

impl<N> From<bool> for Value<N> {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl<N> From<f64> for Value<N> {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl<N> From<i64> for Value<N> {
    #[allow(clippy::cast_precision_loss)]
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl<N> From<String> for Value<N> {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl<N> From<&str> for Value<N> {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl<N> From<NodeSet<N>> for Value<N> {
    fn from(set: NodeSet<N>) -> Self {
        Value::NodeSet(set)
    }
}

impl<N> From<ResultTreeFragment<N>> for Value<N> {
    fn from(rtf: ResultTreeFragment<N>) -> Self {
        Value::ResultTreeFragment(rtf)
    }
}
