//! XPath 1.0 general comparisons (`=`, `!=`, `<`, `<=`, `>`, `>=`) across all value kinds.
//!
//! Operands that are both "simple" (anything but a node-set) are converted pairwise.
//! A node-set on either side makes the comparison existential: it holds if it holds for
//! at least one node. The node-set side is always moved to the left, swapping the
//! operator so that `a < b` becomes `b > a`.
use crate::algebra::coercion::{boolean_of, number_of, string_of};
use crate::algebra::numeric::parse_number;
use crate::error::{Error, ErrorCode};
use crate::model::TreeNode;
use crate::node_set::{NodeIterator, NodeSet};
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
}

impl CompareOp {
    /// Decode the numeric operator tags emitted by the compiler (0..=5 in declaration order).
    pub fn from_code(code: i32) -> Result<Self, Error> {
        Ok(match code {
            0 => CompareOp::Eq,
            1 => CompareOp::Ne,
            2 => CompareOp::Gt,
            3 => CompareOp::Lt,
            4 => CompareOp::Ge,
            5 => CompareOp::Le,
            other => {
                return Err(Error::with_message(
                    ErrorCode::RUN_TIME_INTERNAL_ERR,
                    format!("unknown comparison operator {other}"),
                ));
            }
        })
    }

    /// Operator to use when the operands trade places. Applying it twice is the identity.
    pub fn swap(self) -> Self {
        match self {
            CompareOp::Gt => CompareOp::Lt,
            CompareOp::Lt => CompareOp::Gt,
            CompareOp::Ge => CompareOp::Le,
            CompareOp::Le => CompareOp::Ge,
            same => same,
        }
    }

    pub fn is_ordering(self) -> bool {
        !matches!(self, CompareOp::Eq | CompareOp::Ne)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "!=",
            CompareOp::Gt => ">",
            CompareOp::Lt => "<",
            CompareOp::Ge => ">=",
            CompareOp::Le => "<=",
        }
    }
}

/// IEEE comparison: every operator except `!=` is false when NaN is involved.
pub fn compare_numbers(lhs: f64, rhs: f64, op: CompareOp) -> bool {
    match op {
        CompareOp::Eq => lhs == rhs,
        CompareOp::Ne => lhs != rhs,
        CompareOp::Gt => lhs > rhs,
        CompareOp::Lt => lhs < rhs,
        CompareOp::Ge => lhs >= rhs,
        CompareOp::Le => lhs <= rhs,
    }
}

fn bool_number(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

fn compare_booleans(lhs: bool, rhs: bool, op: CompareOp) -> bool {
    compare_numbers(bool_number(lhs), bool_number(rhs), op)
}

/// Equality on strings, numeric conversion for the ordering operators.
fn compare_strings(lhs: &str, rhs: &str, op: CompareOp) -> bool {
    match op {
        CompareOp::Eq => lhs == rhs,
        CompareOp::Ne => lhs != rhs,
        _ => compare_numbers(parse_number(lhs), parse_number(rhs), op),
    }
}

pub fn compare<N: TreeNode>(lhs: &Value<N>, rhs: &Value<N>, op: CompareOp) -> bool {
    match (lhs, rhs) {
        (Value::NodeSet(left), _) => compare_node_set(left, rhs, op),
        (_, Value::NodeSet(right)) => compare_node_set(right, lhs, op.swap()),
        _ => compare_simple(lhs, rhs, op),
    }
}

fn compare_simple<N: TreeNode>(lhs: &Value<N>, rhs: &Value<N>, op: CompareOp) -> bool {
    if op.is_ordering() {
        return match (lhs, rhs) {
            (Value::Node(_), Value::Boolean(_)) | (Value::Boolean(_), Value::Node(_)) => {
                compare_booleans(boolean_of(lhs), boolean_of(rhs), op)
            }
            _ => compare_numbers(number_of(lhs), number_of(rhs), op),
        };
    }
    let equal = match (lhs, rhs) {
        (Value::Boolean(_), _) | (_, Value::Boolean(_)) => boolean_of(lhs) == boolean_of(rhs),
        (Value::Number(_), _) | (_, Value::Number(_)) => number_of(lhs) == number_of(rhs),
        _ => string_of(lhs) == string_of(rhs),
    };
    if op == CompareOp::Ne { !equal } else { equal }
}

/// `set op other` with the node-set on the left.
fn compare_node_set<N: TreeNode>(set: &NodeSet<N>, other: &Value<N>, op: CompareOp) -> bool {
    match other {
        Value::NodeSet(right) => compare_node_sets(set, right, op),
        Value::Node(n) => compare_node_sets(set, &NodeSet::singleton(n.clone()), op),
        Value::Boolean(b) => compare_booleans(!set.is_empty(), *b, op),
        Value::Number(d) => {
            let mut it = set.clone();
            it.reset();
            while let Some(n) = it.next() {
                if compare_numbers(parse_number(&n.string_value()), *d, op) {
                    return true;
                }
            }
            false
        }
        Value::String(s) => any_string(set, s, op),
        Value::ResultTreeFragment(rtf) => any_string(set, rtf.string_value(), op),
    }
}

fn any_string<N: TreeNode>(set: &NodeSet<N>, s: &str, op: CompareOp) -> bool {
    let mut it = set.clone();
    it.reset();
    while let Some(n) = it.next() {
        if compare_strings(&n.string_value(), s, op) {
            return true;
        }
    }
    false
}

/// Pairwise existential comparison. A node paired with itself satisfies `=` at once and
/// never satisfies `!=`; the ordering operators still compare its value with itself.
fn compare_node_sets<N: TreeNode>(left: &NodeSet<N>, right: &NodeSet<N>, op: CompareOp) -> bool {
    let mut outer = left.clone();
    let mut inner = right.clone();
    outer.reset();
    while let Some(l) = outer.next() {
        let lvalue = l.string_value();
        inner.reset();
        while let Some(r) = inner.next() {
            if l == r {
                match op {
                    CompareOp::Eq => return true,
                    CompareOp::Ne => continue,
                    _ => {}
                }
            }
            if compare_strings(&lvalue, &r.string_value(), op) {
                return true;
            }
        }
    }
    false
}
