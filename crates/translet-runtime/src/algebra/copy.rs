//! Copying values to the result tree (`xsl:copy-of`) and building elements from
//! run-time names (`xsl:element`).
use std::sync::Arc;

use crate::algebra::coercion::string_of;
use crate::algebra::names::{NamespaceResolver, check_qname, split_qname};
use crate::error::{Error, ErrorCode};
use crate::model::{NodeKind, TreeNode};
use crate::serializer::SerializationHandler;
use crate::value::Value;

fn copy_error(e: Error) -> Error {
    Error::from_code(ErrorCode::RUN_TIME_COPY_ERR, Vec::<String>::new()).with_source(Some(
        Arc::new(e) as Arc<dyn std::error::Error + Send + Sync>,
    ))
}

/// Emit a deep copy of `node` (attributes and namespaces included).
pub fn copy_node<N: TreeNode>(node: &N, handler: &mut dyn SerializationHandler) -> Result<(), Error> {
    match node.kind() {
        NodeKind::Document => {
            for c in node.children() {
                copy_node(&c, handler)?;
            }
        }
        NodeKind::Element => {
            let name = node.name().unwrap_or_else(|| crate::model::QName::local(""));
            let qname = name.lexical();
            handler.start_element(name.ns_uri.as_deref(), Some(&name.local), &qname)?;
            for ns in node.namespaces() {
                copy_node(&ns, handler)?;
            }
            for a in node.attributes() {
                copy_node(&a, handler)?;
            }
            for c in node.children() {
                copy_node(&c, handler)?;
            }
            handler.end_element(&qname)?;
        }
        NodeKind::Attribute => {
            let qname = node.name().map(|q| q.lexical()).unwrap_or_default();
            handler.add_attribute(&qname, &node.string_value())?;
        }
        NodeKind::Namespace => {
            let prefix = node.name().map(|q| q.local).unwrap_or_default();
            handler.namespace_after_start_element(&prefix, &node.string_value())?;
        }
        NodeKind::Text => handler.characters(&node.string_value())?,
        NodeKind::Comment => handler.comment(&node.string_value())?,
        NodeKind::ProcessingInstruction => {
            let target = node.name().map(|q| q.local).unwrap_or_default();
            handler.processing_instruction(&target, &node.string_value())?;
        }
    }
    Ok(())
}

/// `xsl:copy-of`: node-sets are copied node by node in iteration order, fragments by
/// their tree (or text), everything else as its string value.
pub fn copy_value<N: TreeNode>(value: &Value<N>, handler: &mut dyn SerializationHandler) -> Result<(), Error> {
    let result = match value {
        Value::NodeSet(set) => set.iter().try_for_each(|n| copy_node(n, handler)),
        Value::Node(n) => copy_node(n, handler),
        Value::ResultTreeFragment(rtf) => match rtf.root() {
            Some(root) => copy_node(root, handler),
            None => handler.characters(rtf.string_value()),
        },
        atomic => handler.characters(&string_of(atomic)),
    };
    result.map_err(copy_error)
}

/// Source of generated prefixes (`ns0`, `ns1`, ...) for elements whose name has no
/// prefix but a namespace. One generator per execution context.
#[derive(Debug, Default, Clone)]
pub struct PrefixGenerator {
    next: usize,
}

impl PrefixGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generate(&mut self) -> String {
        let p = format!("ns{}", self.next);
        self.next += 1;
        p
    }
}

/// Start an element named at run time and return the qualified name actually used.
///
/// - `prefix:local` without an explicit namespace resolves the prefix through `resolver`;
///   an undeclared prefix raises `NAMESPACE_PREFIX_ERR`.
/// - An unprefixed name with a namespace gets a generated prefix.
/// - An unprefixed name without a namespace is started as is.
pub fn start_element(
    qname: &str,
    namespace: Option<&str>,
    handler: &mut dyn SerializationHandler,
    resolver: &dyn NamespaceResolver,
    prefixes: &mut PrefixGenerator,
) -> Result<String, Error> {
    check_qname(qname)?;
    let namespace = namespace.filter(|ns| !ns.is_empty());
    let (prefix, local) = split_qname(qname);
    if !prefix.is_empty() {
        let uri = match namespace {
            Some(ns) => ns.to_string(),
            None => resolver
                .resolve_prefix(prefix)
                .ok_or_else(|| Error::from_code(ErrorCode::NAMESPACE_PREFIX_ERR, [prefix]))?,
        };
        handler.start_element(Some(&uri), Some(local), qname)?;
        handler.namespace_after_start_element(prefix, &uri)?;
        Ok(qname.to_string())
    } else if let Some(ns) = namespace {
        let prefix = prefixes.generate();
        let generated = format!("{prefix}:{qname}");
        handler.start_element(Some(ns), Some(qname), &generated)?;
        handler.namespace_after_start_element(&prefix, ns)?;
        Ok(generated)
    } else {
        handler.start_element(None, None, qname)?;
        Ok(qname.to_string())
    }
}
