//! Runtime support for compiled XSLT stylesheets ("translets").
//!
//! Two halves:
//! - [`algebra`]: the XPath 1.0 value algebra. Pure functions over [`Value`], safe to
//!   call from any thread.
//! - [`context`]: the per-transformation [`TransformContext`] holding template
//!   parameters, key indexes, secondary outputs and loaded documents.
//!
//! The input tree is supplied by the host through [`TreeNode`]; result events go to a
//! [`SerializationHandler`].
pub mod algebra;
pub mod consts;
pub mod context;
pub mod error;
pub mod functions;
pub mod model;
pub mod node_set;
pub mod serializer;
pub mod simple_node;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod translet;
pub mod value;

pub use algebra::{CompareOp, boolean_of, compare, number_of, string_of};
pub use context::{OutputHandle, TransformContext, TransformContextBuilder};
pub use error::{Error, ErrorCode, FaultClass};
pub use functions::{ExpandedName, ExternalFunctions};
pub use model::{NodeKind, QName, TreeNode};
pub use node_set::{NodeIterator, NodeSet};
pub use serializer::{HandlerFactory, OutputMethod, OutputSettings, SerializationHandler};
pub use simple_node::{SimpleNode, SimpleNodeBuilder, attr, doc as simple_doc, elem, ns, text};
pub use translet::CompiledTranslet;
pub use value::{ResultTreeFragment, Value, ValueKind};
