//! Tree collaborator interface.
//!
//! The runtime never owns the input tree. Hosts adapt their document model by
//! implementing [`TreeNode`] for a cheap, clonable node handle.
use core::cmp::Ordering;

use crate::error::{Error, ErrorCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Document,
    Element,
    Attribute,
    Text,
    Comment,
    ProcessingInstruction,
    Namespace,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    pub prefix: Option<String>,
    pub local: String,
    pub ns_uri: Option<String>,
}

impl QName {
    pub fn local(local: impl Into<String>) -> Self {
        Self { prefix: None, local: local.into(), ns_uri: None }
    }

    /// Lexical form `prefix:local` (or just `local`).
    pub fn lexical(&self) -> String {
        match &self.prefix {
            Some(p) if !p.is_empty() => format!("{}:{}", p, self.local),
            _ => self.local.clone(),
        }
    }
}

/// Fallback comparator for document order based on ancestry and sibling order.
///
/// - An ancestor precedes its descendants.
/// - Among siblings, attributes come first, then namespaces, then child nodes; within
///   each group the adapter's order is kept.
/// - Nodes under different roots cannot be ordered and yield `RUN_TIME_INTERNAL_ERR`.
///   Multi-root adapters must override [`TreeNode::compare_document_order`].
pub fn try_compare_by_ancestry<N: TreeNode>(a: &N, b: &N) -> Result<Ordering, Error> {
    if a == b {
        return Ok(Ordering::Equal);
    }
    fn path_to_root<N: TreeNode>(mut n: N) -> Vec<N> {
        let mut p = vec![n.clone()];
        while let Some(parent) = n.parent() {
            p.push(parent.clone());
            n = parent;
        }
        p.reverse();
        p
    }
    let pa = path_to_root(a.clone());
    let pb = path_to_root(b.clone());
    let len = pa.len().min(pb.len());
    let mut i = 0usize;
    while i < len && pa[i] == pb[i] {
        i += 1;
    }
    if i == len {
        return Ok(pa.len().cmp(&pb.len()));
    }
    if i == 0 {
        return Err(Error::with_message(
            ErrorCode::RUN_TIME_INTERNAL_ERR,
            "document order requires adapter: nodes from different roots",
        ));
    }
    let parent = &pa[i - 1];
    let mut sibs: Vec<N> = parent.attributes();
    sibs.extend(parent.namespaces());
    sibs.extend(parent.children());
    let posa = sibs.iter().position(|n| *n == pa[i]);
    let posb = sibs.iter().position(|n| *n == pb[i]);
    Ok(match (posa, posb) {
        (Some(x), Some(y)) => x.cmp(&y),
        _ => Ordering::Equal,
    })
}

pub trait TreeNode: Clone + Eq + core::fmt::Debug + Send + Sync {
    fn kind(&self) -> NodeKind;
    fn name(&self) -> Option<QName>;
    /// Computed string value (concatenated descendant text for elements and documents).
    fn string_value(&self) -> String;

    fn parent(&self) -> Option<Self>;
    fn children(&self) -> Vec<Self>;
    fn attributes(&self) -> Vec<Self>;
    fn namespaces(&self) -> Vec<Self> {
        Vec::new()
    }

    /// Topmost ancestor (the document node for attached nodes).
    fn root(&self) -> Self {
        let mut n = self.clone();
        while let Some(p) = n.parent() {
            n = p;
        }
        n
    }

    /// Returns an error for multi-root comparisons unless overridden by the adapter.
    fn compare_document_order(&self, other: &Self) -> Result<Ordering, Error> {
        try_compare_by_ancestry(self, other)
    }
}

/// Sort nodes into document order and drop duplicates.
///
/// Nodes are grouped by document first; documents keep the order in which they first
/// appear, and each group is sorted on its own so the comparator only ever sees nodes
/// sharing a root.
pub fn sort_document_order<N: TreeNode>(nodes: &mut Vec<N>) {
    let mut groups: Vec<(N, Vec<N>)> = Vec::new();
    for node in nodes.drain(..) {
        let root = node.root();
        match groups.iter_mut().find(|(r, _)| *r == root) {
            Some((_, group)) => group.push(node),
            None => groups.push((root, vec![node])),
        }
    }
    for (_, mut group) in groups {
        group.sort_by(|a, b| a.compare_document_order(b).unwrap_or(Ordering::Equal));
        group.dedup();
        nodes.append(&mut group);
    }
}
