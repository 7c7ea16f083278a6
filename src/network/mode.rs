//! Tag-driven occurrence networks: one-mode, two-mode and N-mode.
//!
//! Nodes come straight from record tag values (optionally normalized by a
//! caller-supplied stemmer), not from citations, so these builders work on
//! any tag: subject categories, languages, author keywords.

use itertools::Itertools;

use crate::collection::RecordCollection;
use crate::graph::Graph;
use crate::models::Record;
use crate::network::{build_order, bump_edge, bump_keyed_edge, cross_edges};

/// A pure node-id normalizer applied before keys enter the graph.
pub type Stemmer<'a> = &'a dyn Fn(&str) -> String;

fn tag_values(record: &Record, tag: &str, stemmer: Option<Stemmer<'_>>) -> Vec<String> {
    let raw = record.get(tag).map(|v| v.as_list()).unwrap_or_default();
    raw.into_iter()
        .map(|v| match stemmer {
            Some(stem) => stem(v),
            None => v.to_string(),
        })
        .collect()
}

fn bump_or_create(graph: &mut Graph, id: &str, kind: Option<&str>, count: bool) {
    if graph.has_node(id) {
        if count {
            if let Some(node) = graph.node_mut(id) {
                node.bump_count();
            }
        }
    } else {
        let node = graph.get_or_create_node(id);
        if count {
            node.count = Some(1);
        }
        node.kind = kind.map(str::to_string);
    }
}

/// Options for [`one_mode_network`].
#[derive(Clone, Copy)]
pub struct OneModeOptions<'a> {
    count: bool,
    weighted: bool,
    stemmer: Option<Stemmer<'a>>,
    edge_key_tag: Option<&'a str>,
    node_attribute: Option<&'a str>,
    deterministic: bool,
}

impl Default for OneModeOptions<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> OneModeOptions<'a> {
    pub fn new() -> Self {
        Self {
            count: true,
            weighted: true,
            stemmer: None,
            edge_key_tag: None,
            node_attribute: None,
            deterministic: false,
        }
    }

    pub fn count(mut self, yes: bool) -> Self {
        self.count = yes;
        self
    }

    pub fn weighted(mut self, yes: bool) -> Self {
        self.weighted = yes;
        self
    }

    /// Normalize every node id through this function before use.
    pub fn stemmer(mut self, stemmer: Stemmer<'a>) -> Self {
        self.stemmer = Some(stemmer);
        self
    }

    /// Produce parallel edges keyed by this tag's values: each value of
    /// the tag on the co-occurring record yields its own edge.
    pub fn edge_key_tag(mut self, tag: &'a str) -> Self {
        self.edge_key_tag = Some(tag);
        self
    }

    /// Accumulate this tag's values onto each node as an extra attribute.
    pub fn node_attribute(mut self, tag: &'a str) -> Self {
        self.node_attribute = Some(tag);
        self
    }

    pub fn deterministic(mut self, yes: bool) -> Self {
        self.deterministic = yes;
        self
    }
}

/// Builds an undirected co-occurrence graph over the values of `tags`,
/// treated as one pooled field per record. Bad records are skipped; each
/// value occurrence bumps its node count.
pub fn one_mode_network(
    collection: &RecordCollection,
    tags: &[&str],
    options: &OneModeOptions<'_>,
) -> Graph {
    let mut graph = Graph::new(false);
    for record in build_order(collection, options.deterministic) {
        if record.bad() {
            continue;
        }
        let mut values: Vec<String> = Vec::new();
        for tag in tags {
            values.extend(tag_values(record, tag, options.stemmer));
        }
        if values.is_empty() {
            continue;
        }
        for value in &values {
            bump_or_create(&mut graph, value, None, options.count);
            if let Some(attr_tag) = options.node_attribute {
                if let Some(attr_values) = record.get(attr_tag) {
                    if let Some(node) = graph.node_mut(value) {
                        node.extend_extra(attr_tag, attr_values.as_list());
                    }
                }
            }
        }
        let edge_keys: Option<Vec<String>> = options
            .edge_key_tag
            .map(|tag| tag_values(record, tag, None));
        for (a, b) in values.iter().tuple_combinations() {
            match &edge_keys {
                Some(keys) if !keys.is_empty() => {
                    for key in keys {
                        bump_keyed_edge(&mut graph, a, b, Some(key), options.weighted);
                    }
                }
                _ => bump_edge(&mut graph, a, b, options.weighted),
            }
        }
    }
    tracing::debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        ?tags,
        "built one-mode network"
    );
    graph
}

/// Options for [`two_mode_network`].
#[derive(Clone, Copy)]
pub struct TwoModeOptions<'a> {
    count: bool,
    weighted: bool,
    directed: bool,
    record_type: bool,
    stemmer_one: Option<Stemmer<'a>>,
    stemmer_two: Option<Stemmer<'a>>,
    deterministic: bool,
}

impl Default for TwoModeOptions<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> TwoModeOptions<'a> {
    pub fn new() -> Self {
        Self {
            count: true,
            weighted: true,
            directed: false,
            record_type: true,
            stemmer_one: None,
            stemmer_two: None,
            deterministic: false,
        }
    }

    pub fn count(mut self, yes: bool) -> Self {
        self.count = yes;
        self
    }

    pub fn weighted(mut self, yes: bool) -> Self {
        self.weighted = yes;
        self
    }

    /// Orient edges from the first tag's values to the second's.
    pub fn directed(mut self, yes: bool) -> Self {
        self.directed = yes;
        self
    }

    /// Tag each node with a `type` attribute naming its source tag.
    pub fn record_type(mut self, yes: bool) -> Self {
        self.record_type = yes;
        self
    }

    /// Normalize the first tag's values.
    pub fn stemmer_one(mut self, stemmer: Stemmer<'a>) -> Self {
        self.stemmer_one = Some(stemmer);
        self
    }

    /// Normalize the second tag's values.
    pub fn stemmer_two(mut self, stemmer: Stemmer<'a>) -> Self {
        self.stemmer_two = Some(stemmer);
        self
    }

    pub fn deterministic(mut self, yes: bool) -> Self {
        self.deterministic = yes;
        self
    }
}

/// Builds a bipartite graph between the values of two tags: edges connect
/// a first-tag value to a second-tag value co-occurring on one record,
/// never two values of the same tag.
pub fn two_mode_network(
    collection: &RecordCollection,
    tag_one: &str,
    tag_two: &str,
    options: &TwoModeOptions<'_>,
) -> Graph {
    let mut graph = Graph::new(options.directed);
    for record in build_order(collection, options.deterministic) {
        if record.bad() {
            continue;
        }
        let ones = tag_values(record, tag_one, options.stemmer_one);
        let twos = tag_values(record, tag_two, options.stemmer_two);
        for value in &ones {
            let kind = options.record_type.then_some(tag_one);
            bump_or_create(&mut graph, value, kind, options.count);
        }
        for value in &twos {
            let kind = options.record_type.then_some(tag_two);
            bump_or_create(&mut graph, value, kind, options.count);
        }
        cross_edges(&mut graph, &ones, &twos, options.weighted);
    }
    tracing::debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        tag_one,
        tag_two,
        "built two-mode network"
    );
    graph
}

/// Options for [`n_mode_network`].
#[derive(Debug, Clone, Copy)]
pub struct NModeOptions {
    count: bool,
    weighted: bool,
    record_type: bool,
    deterministic: bool,
}

impl Default for NModeOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl NModeOptions {
    pub fn new() -> Self {
        Self {
            count: true,
            weighted: true,
            record_type: true,
            deterministic: false,
        }
    }

    pub fn count(mut self, yes: bool) -> Self {
        self.count = yes;
        self
    }

    pub fn weighted(mut self, yes: bool) -> Self {
        self.weighted = yes;
        self
    }

    /// Tag each node with a `type` attribute naming its source tag. A
    /// value appearing under several tags keeps the type it was first
    /// created with.
    pub fn record_type(mut self, yes: bool) -> Self {
        self.record_type = yes;
        self
    }

    pub fn deterministic(mut self, yes: bool) -> Self {
        self.deterministic = yes;
        self
    }
}

/// Builds an undirected multipartite graph over N tags: edges join every
/// cross-tag value pair co-occurring on one record, never two values of
/// the same tag.
pub fn n_mode_network(
    collection: &RecordCollection,
    tags: &[&str],
    options: &NModeOptions,
) -> Graph {
    let mut graph = Graph::new(false);
    for record in build_order(collection, options.deterministic) {
        if record.bad() {
            continue;
        }
        let per_tag: Vec<(&str, Vec<String>)> = tags
            .iter()
            .map(|tag| (*tag, tag_values(record, tag, None)))
            .collect();
        for (tag, values) in &per_tag {
            for value in values {
                let kind = options.record_type.then_some(*tag);
                bump_or_create(&mut graph, value, kind, options.count);
            }
        }
        for ((_, left), (_, right)) in per_tag.iter().tuple_combinations() {
            cross_edges(&mut graph, left, right, options.weighted);
        }
    }
    tracing::debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        ?tags,
        "built n-mode network"
    );
    graph
}
