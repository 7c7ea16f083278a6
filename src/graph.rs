//! An attributed, optionally directed graph with string node identities.
//!
//! This replaces the dict-of-dicts adjacency the builders would otherwise
//! juggle: node and edge existence is handled through `get_or_create_*`
//! accessors and attributes are plain typed fields, so no control flow
//! hinges on lookup failures.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Identifies one edge. For undirected graphs the endpoints are stored in
/// sorted order so `{a, b}` and `{b, a}` collapse to one key. The optional
/// `key` distinguishes parallel edges in multi-edge (one-mode) graphs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeKey {
    pub source: String,
    pub target: String,
    pub key: Option<String>,
}

/// Attributes attached to one node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Occurrence count, present only when counting was enabled.
    pub count: Option<u64>,

    /// Which tag spawned this node in two/N-mode graphs; serialized as
    /// the conventional `type` attribute.
    #[serde(rename = "type")]
    pub kind: Option<String>,

    /// Human-readable description captured at node creation.
    pub info: Option<String>,

    /// The full original citation string, when requested.
    pub full_cite: Option<String>,

    /// Whether the node matched a record of the working collection.
    pub in_core: Option<bool>,

    /// Caller-chosen extra attributes (one-mode node-attribute option).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Vec<String>>,
}

impl Node {
    /// Increments the occurrence count, starting it at 1.
    pub fn bump_count(&mut self) {
        self.count = Some(self.count.unwrap_or(0) + 1);
    }

    /// Appends values to an extra attribute, skipping ones already present.
    pub fn extend_extra<'a>(&mut self, attr: &str, values: impl IntoIterator<Item = &'a str>) {
        let slot = self.extra.entry(attr.to_string()).or_default();
        for v in values {
            if !slot.iter().any(|existing| existing == v) {
                slot.push(v.to_string());
            }
        }
    }
}

/// Attributes attached to one edge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Co-occurrence weight, absent for unit (unweighted) edges.
    pub weight: Option<u64>,
}

impl Edge {
    /// Increments the weight, starting it at 1.
    pub fn bump_weight(&mut self) {
        self.weight = Some(self.weight.unwrap_or(0) + 1);
    }
}

/// A weighted, attributed graph built by one network-builder invocation.
///
/// Node and edge maps are ordered so iteration is deterministic for a
/// given topology, whatever order the builder discovered them in.
/// Downstream exporters walk [`Graph::nodes`] and [`Graph::edges`]; the
/// graph itself has no serialized form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    directed: bool,
    nodes: BTreeMap<String, Node>,
    edges: BTreeMap<EdgeKey, Edge>,
}

impl Graph {
    /// Creates an empty graph.
    pub fn new(directed: bool) -> Self {
        Self {
            directed,
            nodes: BTreeMap::new(),
            edges: BTreeMap::new(),
        }
    }

    /// Whether edges are directed.
    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges (parallel keyed edges count individually).
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// True when a node with this identity exists.
    pub fn has_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Looks up a node's attributes.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Mutable access to a node's attributes.
    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    /// Returns the node, creating it with empty attributes if absent.
    pub fn get_or_create_node(&mut self, id: &str) -> &mut Node {
        self.nodes.entry(id.to_string()).or_default()
    }

    /// Inserts a node with the given attributes, replacing any existing
    /// attribute set.
    pub fn insert_node(&mut self, id: &str, node: Node) {
        self.nodes.insert(id.to_string(), node);
    }

    /// Iterates over `(identity, attributes)` pairs in identity order.
    pub fn nodes(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.nodes.iter().map(|(id, n)| (id.as_str(), n))
    }

    fn make_key(&self, a: &str, b: &str, key: Option<&str>) -> EdgeKey {
        let (source, target) = if !self.directed && b < a {
            (b.to_string(), a.to_string())
        } else {
            (a.to_string(), b.to_string())
        };
        EdgeKey {
            source,
            target,
            key: key.map(str::to_string),
        }
    }

    /// True when an edge (of any key) connects `a` and `b`.
    pub fn has_edge(&self, a: &str, b: &str) -> bool {
        let probe = self.make_key(a, b, None);
        self.edges.contains_key(&probe)
            || self
                .edges
                .keys()
                .any(|k| k.source == probe.source && k.target == probe.target)
    }

    /// Looks up the unkeyed edge between `a` and `b`.
    pub fn edge(&self, a: &str, b: &str) -> Option<&Edge> {
        self.edges.get(&self.make_key(a, b, None))
    }

    /// Looks up a keyed (parallel) edge.
    pub fn keyed_edge(&self, a: &str, b: &str, key: &str) -> Option<&Edge> {
        self.edges.get(&self.make_key(a, b, Some(key)))
    }

    /// Returns the unkeyed edge between `a` and `b`, creating a unit edge
    /// if absent. Endpoints are created as attribute-free nodes when new.
    pub fn get_or_create_edge(&mut self, a: &str, b: &str) -> &mut Edge {
        self.get_or_create_keyed_edge(a, b, None)
    }

    /// Keyed variant of [`Graph::get_or_create_edge`].
    pub fn get_or_create_keyed_edge(&mut self, a: &str, b: &str, key: Option<&str>) -> &mut Edge {
        self.nodes.entry(a.to_string()).or_default();
        self.nodes.entry(b.to_string()).or_default();
        let key = self.make_key(a, b, key);
        self.edges.entry(key).or_default()
    }

    /// Inserts an edge with the given attributes, replacing any existing
    /// edge under the same key.
    pub fn insert_edge(&mut self, a: &str, b: &str, key: Option<&str>, edge: Edge) {
        self.nodes.entry(a.to_string()).or_default();
        self.nodes.entry(b.to_string()).or_default();
        let key = self.make_key(a, b, key);
        self.edges.insert(key, edge);
    }

    /// Iterates over `(key, attributes)` pairs in key order.
    pub fn edges(&self) -> impl Iterator<Item = (&EdgeKey, &Edge)> {
        self.edges.iter()
    }

    /// Snapshot of all edges incident to `id`, cloned so callers can
    /// re-link while mutating the graph.
    pub fn edges_of(&self, id: &str) -> Vec<(EdgeKey, Edge)> {
        self.edges
            .iter()
            .filter(|(k, _)| k.source == id || k.target == id)
            .map(|(k, e)| (k.clone(), e.clone()))
            .collect()
    }

    /// The weight of the unkeyed edge between `a` and `b`, treating unit
    /// edges as weight 1 and absent edges as 0.
    pub fn weight(&self, a: &str, b: &str) -> u64 {
        match self.edge(a, b) {
            Some(e) => e.weight.unwrap_or(1),
            None => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undirected_edges_canonicalize() {
        let mut g = Graph::new(false);
        g.get_or_create_edge("b", "a").bump_weight();
        g.get_or_create_edge("a", "b").bump_weight();
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.weight("a", "b"), 2);
        assert_eq!(g.weight("b", "a"), 2);
    }

    #[test]
    fn test_directed_edges_keep_orientation() {
        let mut g = Graph::new(true);
        g.get_or_create_edge("a", "b");
        g.get_or_create_edge("b", "a");
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn test_edge_creates_endpoint_nodes() {
        let mut g = Graph::new(false);
        g.get_or_create_edge("x", "y");
        assert!(g.has_node("x"));
        assert!(g.has_node("y"));
        assert_eq!(g.node_count(), 2);
    }

    #[test]
    fn test_keyed_edges_are_parallel() {
        let mut g = Graph::new(false);
        g.get_or_create_keyed_edge("a", "b", Some("en")).bump_weight();
        g.get_or_create_keyed_edge("a", "b", Some("fr")).bump_weight();
        assert_eq!(g.edge_count(), 2);
        assert_eq!(g.keyed_edge("a", "b", "en").unwrap().weight, Some(1));
        assert!(g.has_edge("a", "b"));
    }

    #[test]
    fn test_node_count_bumping() {
        let mut g = Graph::new(false);
        g.get_or_create_node("n").bump_count();
        g.get_or_create_node("n").bump_count();
        assert_eq!(g.node("n").unwrap().count, Some(2));
    }

    #[test]
    fn test_edges_of_is_a_snapshot() {
        let mut g = Graph::new(false);
        g.get_or_create_edge("a", "b").bump_weight();
        g.get_or_create_edge("a", "c");
        g.get_or_create_edge("b", "c");
        let incident = g.edges_of("a");
        assert_eq!(incident.len(), 2);
        assert!(incident.iter().all(|(k, _)| k.source == "a" || k.target == "a"));
    }

    #[test]
    fn test_extend_extra_deduplicates() {
        let mut n = Node::default();
        n.extend_extra("lang", ["en", "fr"]);
        n.extend_extra("lang", ["fr", "de"]);
        assert_eq!(n.extra["lang"], vec!["en", "fr", "de"]);
    }
}
