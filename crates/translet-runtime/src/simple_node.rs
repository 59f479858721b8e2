//! Simple in-memory tree implementing [`TreeNode`], used in tests and demos.
//!
//! Nodes are immutable once built; parent links are filled in exactly once when the
//! enclosing builder finishes, so the tree can be shared across threads freely.
//!
//! ```
//! use translet_runtime::simple_node::{attr, doc, elem, text};
//! use translet_runtime::TreeNode;
//!
//! // <root id="r"><child>Hello</child><child world="yes"/></root>
//! let document = doc()
//!     .child(
//!         elem("root")
//!             .attr(attr("id", "r"))
//!             .child(elem("child").child(text("Hello")))
//!             .child(elem("child").attr(attr("world", "yes"))),
//!     )
//!     .build();
//! let root = document.children()[0].clone();
//! assert_eq!(root.name().unwrap().local, "root");
//! assert_eq!(root.string_value(), "Hello");
//! ```
use std::fmt;
use std::sync::{Arc, OnceLock, Weak};

use crate::algebra::names::NamespaceResolver;
use crate::consts::XML_URI;
use crate::model::{NodeKind, QName, TreeNode};

struct Inner {
    kind: NodeKind,
    name: Option<QName>,
    value: Option<String>,
    parent: OnceLock<Weak<Inner>>,
    attributes: Vec<SimpleNode>,
    namespaces: Vec<SimpleNode>,
    children: Vec<SimpleNode>,
    // string value of elements and documents, computed when the node is built
    text: String,
}

#[derive(Clone)]
pub struct SimpleNode(Arc<Inner>);

impl PartialEq for SimpleNode {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for SimpleNode {}

impl std::hash::Hash for SimpleNode {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.0).hash(state);
    }
}

impl fmt::Debug for SimpleNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleNode")
            .field("kind", &self.0.kind)
            .field("name", &self.0.name.as_ref().map(QName::lexical))
            .field("value", &self.0.value)
            .finish()
    }
}

/// Split `prefix:local`; the `xml` prefix is pre-bound.
fn parse_name(name: &str) -> QName {
    match name.split_once(':') {
        Some((prefix, local)) => QName {
            prefix: Some(prefix.to_string()),
            local: local.to_string(),
            ns_uri: (prefix == "xml").then(|| XML_URI.to_string()),
        },
        None => QName::local(name),
    }
}

impl SimpleNode {
    fn leaf(kind: NodeKind, name: Option<QName>, value: &str) -> Self {
        SimpleNodeBuilder::new(kind, name, Some(value.to_string())).build()
    }

    pub fn document() -> SimpleNodeBuilder {
        SimpleNodeBuilder::new(NodeKind::Document, None, None)
    }

    pub fn element(name: &str) -> SimpleNodeBuilder {
        SimpleNodeBuilder::new(NodeKind::Element, Some(parse_name(name)), None)
    }

    pub fn attribute(name: &str, value: &str) -> SimpleNode {
        Self::leaf(NodeKind::Attribute, Some(parse_name(name)), value)
    }

    pub fn text(value: &str) -> SimpleNode {
        Self::leaf(NodeKind::Text, None, value)
    }

    pub fn comment(value: &str) -> SimpleNode {
        Self::leaf(NodeKind::Comment, None, value)
    }

    pub fn pi(target: &str, data: &str) -> SimpleNode {
        Self::leaf(NodeKind::ProcessingInstruction, Some(QName::local(target)), data)
    }

    pub fn namespace(prefix: &str, uri: &str) -> SimpleNode {
        let name = QName { prefix: Some(prefix.to_string()), local: prefix.to_string(), ns_uri: Some(uri.to_string()) };
        Self::leaf(NodeKind::Namespace, Some(name), uri)
    }

    /// Element with the given namespace URI attached to its name.
    pub fn element_ns(name: &str, ns_uri: &str) -> SimpleNodeBuilder {
        let mut q = parse_name(name);
        q.ns_uri = Some(ns_uri.to_string());
        SimpleNodeBuilder::new(NodeKind::Element, Some(q), None)
    }

    /// Resolve a namespace prefix by walking the ancestor chain (including self).
    pub fn lookup_namespace_uri(&self, prefix: &str) -> Option<String> {
        if prefix == "xml" {
            return Some(XML_URI.to_string());
        }
        let mut cur = Some(self.clone());
        while let Some(n) = cur {
            for ns in &n.0.namespaces {
                if ns.0.name.as_ref().and_then(|q| q.prefix.as_deref()) == Some(prefix) {
                    return ns.0.value.clone();
                }
            }
            cur = n.parent();
        }
        None
    }
}

impl NamespaceResolver for SimpleNode {
    fn resolve_prefix(&self, prefix: &str) -> Option<String> {
        self.lookup_namespace_uri(prefix)
    }
}

pub struct SimpleNodeBuilder {
    kind: NodeKind,
    name: Option<QName>,
    value: Option<String>,
    children: Vec<SimpleNode>,
    attrs: Vec<SimpleNode>,
    namespaces: Vec<SimpleNode>,
}

pub enum SimpleNodeOrBuilder {
    Built(SimpleNode),
    Builder(SimpleNodeBuilder),
}

impl From<SimpleNode> for SimpleNodeOrBuilder {
    fn from(n: SimpleNode) -> Self {
        SimpleNodeOrBuilder::Built(n)
    }
}

impl From<SimpleNodeBuilder> for SimpleNodeOrBuilder {
    fn from(b: SimpleNodeBuilder) -> Self {
        SimpleNodeOrBuilder::Builder(b)
    }
}

impl SimpleNodeOrBuilder {
    fn into_node(self) -> SimpleNode {
        match self {
            SimpleNodeOrBuilder::Built(n) => n,
            SimpleNodeOrBuilder::Builder(b) => b.build(),
        }
    }
}

impl SimpleNodeBuilder {
    fn new(kind: NodeKind, name: Option<QName>, value: Option<String>) -> Self {
        Self { kind, name, value, children: Vec::new(), attrs: Vec::new(), namespaces: Vec::new() }
    }

    pub fn child(mut self, child: impl Into<SimpleNodeOrBuilder>) -> Self {
        self.children.push(child.into().into_node());
        self
    }

    pub fn children<I: IntoIterator<Item = SimpleNodeOrBuilder>>(mut self, it: I) -> Self {
        self.children.extend(it.into_iter().map(SimpleNodeOrBuilder::into_node));
        self
    }

    pub fn attr(mut self, attr: SimpleNode) -> Self {
        debug_assert!(attr.kind() == NodeKind::Attribute);
        self.attrs.push(attr);
        self
    }

    pub fn namespace(mut self, ns: SimpleNode) -> Self {
        debug_assert!(ns.kind() == NodeKind::Namespace);
        self.namespaces.push(ns);
        self
    }

    pub fn build(self) -> SimpleNode {
        let text = match self.kind {
            NodeKind::Element | NodeKind::Document => {
                let mut out = String::new();
                for c in &self.children {
                    match c.0.kind {
                        NodeKind::Text => out.push_str(c.0.value.as_deref().unwrap_or_default()),
                        NodeKind::Element => out.push_str(&c.0.text),
                        _ => {}
                    }
                }
                out
            }
            _ => self.value.clone().unwrap_or_default(),
        };
        let node = SimpleNode(Arc::new(Inner {
            kind: self.kind,
            name: self.name,
            value: self.value,
            parent: OnceLock::new(),
            attributes: self.attrs,
            namespaces: self.namespaces,
            children: self.children,
            text,
        }));
        let weak = Arc::downgrade(&node.0);
        for n in node.0.attributes.iter().chain(&node.0.namespaces).chain(&node.0.children) {
            // a node handed to two builders keeps its first parent
            let _ = n.0.parent.set(weak.clone());
        }
        node
    }
}

pub fn elem(name: &str) -> SimpleNodeBuilder {
    SimpleNode::element(name)
}

pub fn text(v: &str) -> SimpleNode {
    SimpleNode::text(v)
}

pub fn attr(name: &str, v: &str) -> SimpleNode {
    SimpleNode::attribute(name, v)
}

pub fn comment(v: &str) -> SimpleNode {
    SimpleNode::comment(v)
}

pub fn ns(prefix: &str, uri: &str) -> SimpleNode {
    SimpleNode::namespace(prefix, uri)
}

pub fn doc() -> SimpleNodeBuilder {
    SimpleNode::document()
}

impl TreeNode for SimpleNode {
    fn kind(&self) -> NodeKind {
        self.0.kind
    }

    fn name(&self) -> Option<QName> {
        self.0.name.clone()
    }

    fn string_value(&self) -> String {
        self.0.text.clone()
    }

    fn parent(&self) -> Option<Self> {
        self.0.parent.get().and_then(Weak::upgrade).map(SimpleNode)
    }

    fn children(&self) -> Vec<Self> {
        self.0.children.clone()
    }

    fn attributes(&self) -> Vec<Self> {
        self.0.attributes.clone()
    }

    fn namespaces(&self) -> Vec<Self> {
        self.0.namespaces.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cmp::Ordering;

    #[test]
    fn string_value_concatenates_descendant_text_only() {
        let r = elem("r")
            .attr(attr("a", "ignored"))
            .child(text("x"))
            .child(comment("no"))
            .child(elem("c").child(text("y")))
            .build();
        assert_eq!(r.string_value(), "xy");
    }

    #[test]
    fn attributes_precede_children_in_document_order() {
        let r = elem("r").attr(attr("a", "1")).child(elem("c")).build();
        let a = r.attributes()[0].clone();
        let c = r.children()[0].clone();
        assert_eq!(a.compare_document_order(&c).unwrap(), Ordering::Less);
        assert_eq!(r.compare_document_order(&a).unwrap(), Ordering::Less);
    }

    #[test]
    fn xml_prefix_is_prebound() {
        let a = attr("xml:lang", "en");
        let q = a.name().unwrap();
        assert_eq!(q.local, "lang");
        assert_eq!(q.ns_uri.as_deref(), Some(XML_URI));
    }

    #[test]
    fn namespace_lookup_walks_ancestors() {
        let d = doc().child(elem("root").namespace(ns("p", "urn:one")).child(elem("inner"))).build();
        let inner = d.children()[0].children()[0].clone();
        assert_eq!(inner.lookup_namespace_uri("p").as_deref(), Some("urn:one"));
        assert_eq!(inner.lookup_namespace_uri("q"), None);
        assert_eq!(inner.root(), d);
    }
}
