//! The value algebra: stateless conversions, comparisons and core functions over
//! [`Value`](crate::value::Value). Nothing here touches the execution context.
pub mod coercion;
pub mod comparison;
pub mod copy;
pub mod names;
pub mod nodes;
pub mod numeric;
pub mod strings;

pub use coercion::{boolean_of, number_of, string_of, to_node, to_node_set, to_result_tree};
pub use comparison::{CompareOp, compare};
pub use copy::{PrefixGenerator, copy_value, start_element};
pub use names::{NamespaceResolver, check_attribute_qname, check_ncname, check_qname};
pub use numeric::{FormatBuffer, format_number, parse_number};
