//! Node-set functions: `count`, `sum`, `lang` and the name accessors.
use crate::algebra::numeric::parse_number;
use crate::consts::XML_URI;
use crate::model::{NodeKind, QName, TreeNode};
use crate::node_set::NodeSet;

pub fn count<N: Clone>(set: &NodeSet<N>) -> usize {
    set.len()
}

/// Sum of the numeric string values; a single non-numeric node makes the result NaN.
pub fn sum<N: TreeNode>(set: &NodeSet<N>) -> f64 {
    set.iter().map(|n| parse_number(&n.string_value())).sum()
}

fn node_name<N: TreeNode>(node: &N) -> Option<QName> {
    match node.kind() {
        NodeKind::Element | NodeKind::Attribute | NodeKind::ProcessingInstruction | NodeKind::Namespace => {
            node.name()
        }
        _ => None,
    }
}

/// Local part of the node's name; `""` for unnamed nodes. Namespace nodes report their prefix.
pub fn local_name<N: TreeNode>(node: &N) -> String {
    node_name(node).map(|q| q.local).unwrap_or_default()
}

/// Namespace URI of element and attribute names, `""` otherwise.
pub fn namespace_uri<N: TreeNode>(node: &N) -> String {
    match node.kind() {
        NodeKind::Element | NodeKind::Attribute => node.name().and_then(|q| q.ns_uri).unwrap_or_default(),
        _ => String::new(),
    }
}

/// Lexical `prefix:local` name.
pub fn name<N: TreeNode>(node: &N) -> String {
    match node.kind() {
        NodeKind::Namespace => local_name(node),
        _ => node_name(node).map(|q| q.lexical()).unwrap_or_default(),
    }
}

/// First node of the set in document order, for the name accessors' node-set forms.
pub fn first<N: TreeNode>(set: &NodeSet<N>) -> Option<&N> {
    set.first_in_document_order()
}

fn is_xml_lang(attr: &impl TreeNode) -> bool {
    attr.name().is_some_and(|q| q.local == "lang" && q.ns_uri.as_deref() == Some(XML_URI))
}

/// `lang(l)`: the nearest `xml:lang` on the node or an ancestor equals `l` or starts with
/// `l` followed by `-`, ignoring ASCII case.
pub fn lang<N: TreeNode>(node: &N, lang: &str) -> bool {
    let mut cur = Some(node.clone());
    while let Some(n) = cur {
        if let Some(a) = n.attributes().into_iter().find(is_xml_lang) {
            let value = a.string_value().to_ascii_lowercase();
            let wanted = lang.to_ascii_lowercase();
            return value == wanted
                || value.strip_prefix(wanted.as_str()).is_some_and(|rest| rest.starts_with('-'));
        }
        cur = n.parent();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simple_node::{SimpleNode, attr, doc, elem, ns, text};

    #[test]
    fn sum_and_count() {
        let r = elem("r").child(elem("a").child(text("1"))).child(elem("a").child(text("2.5"))).build();
        let set = NodeSet::new(r.children());
        assert_eq!(count(&set), 2);
        assert_eq!(sum(&set), 3.5);
        let bad = elem("r").child(elem("a").child(text("x"))).build();
        assert!(sum(&NodeSet::new(bad.children())).is_nan());
        assert_eq!(sum(&NodeSet::<SimpleNode>::empty()), 0.0);
    }

    #[test]
    fn names_of_elements_attributes_and_namespaces() {
        let e = SimpleNode::element_ns("p:item", "urn:x").attr(attr("xml:lang", "en")).namespace(ns("p", "urn:x")).build();
        assert_eq!(local_name(&e), "item");
        assert_eq!(namespace_uri(&e), "urn:x");
        assert_eq!(name(&e), "p:item");
        let a = e.attributes()[0].clone();
        assert_eq!(name(&a), "xml:lang");
        assert_eq!(namespace_uri(&a), XML_URI);
        let n = e.namespaces()[0].clone();
        assert_eq!(name(&n), "p");
        assert_eq!(namespace_uri(&n), "");
        assert_eq!(name(&text("t")), "");
    }

    #[test]
    fn lang_matches_sublanguages_case_insensitively() {
        let d = doc().child(elem("r").attr(attr("xml:lang", "en-US")).child(elem("p").child(text("x")))).build();
        let p = d.children()[0].children()[0].clone();
        assert!(lang(&p, "en"));
        assert!(lang(&p, "EN-us"));
        assert!(!lang(&p, "e"));
        assert!(!lang(&p, "de"));
        assert!(!lang(&d, "en"));
    }
}
