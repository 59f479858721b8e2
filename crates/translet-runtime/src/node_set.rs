//! Node-set values and the iterator protocol compiled code drives them with.
use std::sync::Arc;

use crate::model::TreeNode;

/// Iterator protocol exposed by the tree collaborator's axis iterators.
///
/// `next` returns `None` once exhausted (the END marker); `reset` rewinds to the first
/// node. For reverse axes the nodes come in reverse document order and `is_reverse`
/// reports `true`.
pub trait NodeIterator<N> {
    fn reset(&mut self) -> &mut Self;
    fn next(&mut self) -> Option<N>;
    /// Number of nodes the iterator yields in total (the XPath `last()`).
    fn last(&self) -> usize;
    /// 1-based position of the node most recently returned by `next`.
    fn position(&self) -> usize;
    fn is_reverse(&self) -> bool;
}

/// Immutable node sequence with its own cursor.
///
/// Clones share the node storage but not the cursor, so handing a copy to the value
/// algebra never disturbs the caller's iteration.
#[derive(Debug, Clone)]
pub struct NodeSet<N> {
    nodes: Arc<[N]>,
    cursor: usize,
    reverse: bool,
}

impl<N> Default for NodeSet<N> {
    fn default() -> Self {
        Self { nodes: Arc::from(Vec::new()), cursor: 0, reverse: false }
    }
}

impl<N: Clone> NodeSet<N> {
    /// Nodes in document order.
    pub fn new(nodes: Vec<N>) -> Self {
        Self { nodes: Arc::from(nodes), cursor: 0, reverse: false }
    }

    /// Nodes as produced by a reverse axis (reverse document order).
    pub fn reversed(nodes: Vec<N>) -> Self {
        Self { nodes: Arc::from(nodes), cursor: 0, reverse: true }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn singleton(node: N) -> Self {
        Self::new(vec![node])
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in iteration order, independent of the cursor.
    pub fn nodes(&self) -> &[N] {
        &self.nodes
    }

    pub fn iter(&self) -> impl Iterator<Item = &N> + '_ {
        self.nodes.iter()
    }

    /// First node in document order, honoring the reverse flag.
    pub fn first_in_document_order(&self) -> Option<&N> {
        if self.reverse { self.nodes.last() } else { self.nodes.first() }
    }

    /// Nodes in document order.
    pub fn document_order(&self) -> Vec<N> {
        let mut v = self.nodes.to_vec();
        if self.reverse {
            v.reverse();
        }
        v
    }
}

impl<N: TreeNode> PartialEq for NodeSet<N> {
    fn eq(&self, other: &Self) -> bool {
        self.document_order() == other.document_order()
    }
}

impl<N: Clone> NodeIterator<N> for NodeSet<N> {
    fn reset(&mut self) -> &mut Self {
        self.cursor = 0;
        self
    }

    fn next(&mut self) -> Option<N> {
        let n = self.nodes.get(self.cursor)?.clone();
        self.cursor += 1;
        Some(n)
    }

    fn last(&self) -> usize {
        self.nodes.len()
    }

    fn position(&self) -> usize {
        self.cursor
    }

    fn is_reverse(&self) -> bool {
        self.reverse
    }
}

impl<N: Clone> From<Vec<N>> for NodeSet<N> {
    fn from(nodes: Vec<N>) -> Self {
        NodeSet::new(nodes)
    }
}

impl<N: Clone> FromIterator<N> for NodeSet<N> {
    fn from_iter<I: IntoIterator<Item = N>>(iter: I) -> Self {
        NodeSet::new(iter.into_iter().collect())
    }
}
