//! `xsl:key` and ID indexes.
//!
//! An index maps key values to the nodes carrying them. Two strategies sit behind
//! [`KeyIndex`]: an eager multimap filled while the document is scanned, and a lazy index
//! that asks the tree collaborator on every lookup.
use std::collections::HashMap;
use std::sync::Arc;

use itertools::Itertools;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::algebra::strings::is_xml_whitespace;
use crate::consts::{ID_INDEX_NAME, XML_URI};
use crate::model::{NodeKind, TreeNode, sort_document_order};

pub trait KeyIndex<N>: Send + Sync {
    /// Nodes indexed under `value`, restricted to the tree rooted at `root` when given.
    fn lookup(&self, value: &str, root: Option<&N>) -> Vec<N>;

    /// Eager indexes accept entries; lazy ones do not.
    fn as_eager_mut(&mut self) -> Option<&mut EagerKeyIndex<N>> {
        None
    }
}

/// Value to `(node, document root)` multimap.
#[derive(Debug)]
pub struct EagerKeyIndex<N> {
    entries: HashMap<String, Vec<(N, N)>>,
}

impl<N> Default for EagerKeyIndex<N> {
    fn default() -> Self {
        Self { entries: HashMap::new() }
    }
}

impl<N: TreeNode> EagerKeyIndex<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, value: &str, node: N) {
        let root = node.root();
        let bucket = self.entries.entry(value.to_string()).or_default();
        if !bucket.iter().any(|(n, _)| *n == node) {
            bucket.push((node, root));
        }
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: TreeNode> KeyIndex<N> for EagerKeyIndex<N> {
    fn lookup(&self, value: &str, root: Option<&N>) -> Vec<N> {
        self.entries
            .get(value)
            .map(|bucket| {
                bucket
                    .iter()
                    .filter(|(_, r)| root.is_none_or(|want| want == r))
                    .map(|(n, _)| n.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn as_eager_mut(&mut self) -> Option<&mut EagerKeyIndex<N>> {
        Some(self)
    }
}

/// Answers lookups directly from the tree.
pub trait KeySource<N>: Send + Sync {
    fn nodes_for(&self, value: &str) -> Vec<N>;
}

pub struct LazyKeyIndex<N> {
    source: Arc<dyn KeySource<N>>,
}

impl<N> LazyKeyIndex<N> {
    pub fn new(source: Arc<dyn KeySource<N>>) -> Self {
        Self { source }
    }
}

impl<N: TreeNode> KeyIndex<N> for LazyKeyIndex<N> {
    fn lookup(&self, value: &str, _root: Option<&N>) -> Vec<N> {
        self.source.nodes_for(value)
    }
}

fn is_id_attribute<N: TreeNode>(attr: &N) -> bool {
    attr.name().is_some_and(|q| {
        let xml_id = q.prefix.as_deref() == Some("xml") || q.ns_uri.as_deref() == Some(XML_URI);
        let plain_id = q.prefix.is_none() && q.ns_uri.is_none();
        q.local == "id" && (xml_id || plain_id)
    })
}

/// Elements of the tree under `root` with their `id` / `xml:id` values, in document order.
pub fn elements_with_ids<N: TreeNode>(root: &N) -> Vec<(String, N)> {
    let mut out = Vec::new();
    let mut stack = vec![root.clone()];
    while let Some(node) = stack.pop() {
        for c in node.children().into_iter().rev() {
            stack.push(c);
        }
        if node.kind() == NodeKind::Element {
            for a in node.attributes().iter().filter(|a| is_id_attribute(*a)) {
                out.push((a.string_value().trim_matches(is_xml_whitespace).to_string(), node.clone()));
            }
        }
    }
    out
}

/// Walks the document on each lookup for elements with a matching ID attribute.
pub struct TreeIdSource<N> {
    root: N,
}

impl<N: TreeNode> TreeIdSource<N> {
    pub fn new(document: &N) -> Self {
        Self { root: document.root() }
    }
}

impl<N: TreeNode> KeySource<N> for TreeIdSource<N> {
    fn nodes_for(&self, value: &str) -> Vec<N> {
        elements_with_ids(&self.root).into_iter().find(|(id, _)| id == value).map(|(_, n)| n).into_iter().collect()
    }
}

/// Named indexes of one execution context plus the root that scopes key lookups.
pub struct KeyIndexes<N> {
    indexes: HashMap<String, Box<dyn KeyIndex<N>>>,
    current_root: Option<N>,
}

impl<N> Default for KeyIndexes<N> {
    fn default() -> Self {
        Self { indexes: HashMap::new(), current_root: None }
    }
}

impl<N: TreeNode + 'static> KeyIndexes<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index `node` under `value` in the named index, creating an eager index on first use.
    /// Entries for a lazily backed index are ignored.
    pub fn build(&mut self, name: &str, node: N, value: &str) {
        let index = self.indexes.entry(name.to_string()).or_insert_with(|| Box::new(EagerKeyIndex::new()));
        match index.as_eager_mut() {
            Some(eager) => eager.add(value, node),
            None => trace!(index = name, value, "lazy index ignores explicit entries"),
        }
    }

    /// Register `source` as the lazy backing of the named index, replacing any entries.
    pub fn build_lazy(&mut self, name: &str, source: Arc<dyn KeySource<N>>) {
        debug!(index = name, "register lazy key index");
        self.indexes.insert(name.to_string(), Box::new(LazyKeyIndex::new(source)));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.indexes.contains_key(name)
    }

    /// Scope subsequent key lookups to the tree containing `node`.
    pub fn set_root(&mut self, node: &N) {
        self.current_root = Some(node.root());
    }

    /// Nodes with `value` in the named index, in document order. Unknown names give nothing.
    pub fn lookup(&self, name: &str, value: &str) -> Vec<N> {
        let Some(index) = self.indexes.get(name) else {
            return Vec::new();
        };
        let mut nodes = index.lookup(value, self.current_root.as_ref());
        sort_document_order(&mut nodes);
        nodes
    }

    /// `key(name, values)` for several values at once; the union in document order.
    pub fn lookup_all<'a, I>(&self, name: &str, values: I) -> Vec<N>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let Some(index) = self.indexes.get(name) else {
            return Vec::new();
        };
        let root = self.current_root.as_ref();
        let mut nodes: Vec<N> = values.into_iter().unique().flat_map(|v| index.lookup(v, root)).collect();
        sort_document_order(&mut nodes);
        nodes
    }

    /// `id(value)`: whitespace-separated tokens looked up in the ID index.
    pub fn lookup_id(&self, value: &str) -> Vec<N> {
        let tokens: SmallVec<[&str; 4]> = value.split(is_xml_whitespace).filter(|t| !t.is_empty()).collect();
        self.lookup_all(ID_INDEX_NAME, tokens)
    }

    pub fn clear(&mut self) {
        if !self.indexes.is_empty() {
            debug!(count = self.indexes.len(), "clear key indexes");
        }
        self.indexes.clear();
        self.current_root = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simple_node::{SimpleNode, attr, doc, elem};

    fn sample() -> SimpleNode {
        doc()
            .child(
                elem("r")
                    .child(elem("a").attr(attr("id", "one")))
                    .child(elem("b").attr(attr("xml:id", "two")))
                    .child(elem("c").attr(attr("id", " three "))),
            )
            .build()
    }

    #[test]
    fn key_lookups_return_every_node_in_document_order() {
        let d = sample();
        let kids = d.children()[0].children();
        let mut keys = KeyIndexes::new();
        keys.build("k", kids[2].clone(), "v");
        keys.build("k", kids[0].clone(), "v");
        keys.build("k", kids[0].clone(), "v");
        assert_eq!(keys.lookup("k", "v"), vec![kids[0].clone(), kids[2].clone()]);
        assert!(keys.lookup("k", "other").is_empty());
        assert!(keys.lookup("missing", "v").is_empty());
    }

    #[test]
    fn lookups_are_scoped_to_the_current_root() {
        let d1 = sample();
        let d2 = sample();
        let a1 = d1.children()[0].children()[0].clone();
        let a2 = d2.children()[0].children()[0].clone();
        let mut keys = KeyIndexes::new();
        keys.build("k", a1.clone(), "v");
        keys.build("k", a2.clone(), "v");
        keys.set_root(&a2);
        assert_eq!(keys.lookup("k", "v"), vec![a2]);
        keys.set_root(&d1);
        assert_eq!(keys.lookup("k", "v"), vec![a1]);
    }

    #[test]
    fn unscoped_lookups_keep_each_document_in_order() {
        let docs = [sample(), sample(), sample()];
        let kids: Vec<Vec<SimpleNode>> = docs.iter().map(|d| d.children()[0].children()).collect();
        let mut keys = KeyIndexes::new();
        for i in [2, 0, 1, 0] {
            for (d, k) in [(1, i), (0, i), (2, 2 - i.min(2))] {
                keys.build("k", kids[d][k].clone(), "v");
            }
        }
        let found = keys.lookup("k", "v");
        assert_eq!(found.len(), 9);
        for doc_kids in &kids {
            let in_doc: Vec<SimpleNode> = found.iter().filter(|n| doc_kids.contains(*n)).cloned().collect();
            assert_eq!(&in_doc, doc_kids);
        }
        assert_eq!(found[..3], kids[1][..]);
    }

    #[test]
    fn id_scan_finds_plain_and_xml_ids() {
        let ids: Vec<String> = elements_with_ids(&sample()).into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["one", "two", "three"]);
    }

    #[test]
    fn lazy_index_asks_the_tree_and_ignores_entries() {
        let d = sample();
        let kids = d.children()[0].children();
        let mut keys = KeyIndexes::new();
        keys.build_lazy(ID_INDEX_NAME, Arc::new(TreeIdSource::new(&d)));
        keys.build(ID_INDEX_NAME, kids[0].clone(), "bogus");
        assert!(keys.lookup_id("bogus").is_empty());
        assert_eq!(keys.lookup_id("three  one two one"), kids);
    }

    #[test]
    fn clear_drops_all_indexes() {
        let d = sample();
        let mut keys = KeyIndexes::new();
        keys.build("k", d.clone(), "v");
        keys.clear();
        assert!(!keys.contains("k"));
        assert!(keys.lookup("k", "v").is_empty());
    }
}
