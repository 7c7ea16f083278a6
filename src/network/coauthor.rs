//! Co-authorship network: authors as nodes, shared papers as edges.

use crate::collection::RecordCollection;
use crate::graph::Graph;
use crate::models::{tags, Record};
use crate::network::{build_order, bump_edge};

/// Tags rendered into an author node's `info` attribute.
const AUTHOR_INFO_TAGS: &[&str] = &[
    tags::YEAR,
    tags::TITLE,
    tags::JOURNAL,
    tags::VOLUME,
    tags::BEGINNING_PAGE,
];

/// Options for [`coauthor_network`]. Defaults: counted, weighted, no
/// per-node info, all publication types, hash fold order.
#[derive(Debug, Clone)]
pub struct CoauthorOptions {
    count: bool,
    weighted: bool,
    node_info: bool,
    journals_only: bool,
    deterministic: bool,
}

impl Default for CoauthorOptions {
    fn default() -> Self {
        Self {
            count: true,
            weighted: true,
            node_info: false,
            journals_only: false,
            deterministic: false,
        }
    }
}

impl CoauthorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track how many records credit each author.
    pub fn count(mut self, yes: bool) -> Self {
        self.count = yes;
        self
    }

    /// Track how many records each author pair shares.
    pub fn weighted(mut self, yes: bool) -> Self {
        self.weighted = yes;
        self
    }

    /// Attach an `info` attribute describing one publication per author.
    ///
    /// The describing record is whichever one the fold visits first, which
    /// depends on hash order unless [`CoauthorOptions::deterministic`] is
    /// set.
    pub fn node_info(mut self, yes: bool) -> Self {
        self.node_info = yes;
        self
    }

    /// Skip records whose publication type is not `"J"`.
    pub fn journals_only(mut self, yes: bool) -> Self {
        self.journals_only = yes;
        self
    }

    /// Fold records in ascending id order so info capture is reproducible.
    pub fn deterministic(mut self, yes: bool) -> Self {
        self.deterministic = yes;
        self
    }
}

fn record_info(record: &Record) -> String {
    let mut parts: Vec<String> = Vec::new();
    for tag in AUTHOR_INFO_TAGS {
        if let Some(value) = record.get(tag).and_then(|v| v.first()) {
            parts.push(value.replace(',', ""));
        }
    }
    parts.join(", ")
}

/// Builds the undirected co-authorship graph: one node per credited
/// author, one edge per author pair sharing at least one record. Bad
/// records are skipped. Each record bumps an author's count once however
/// many co-authors it has.
pub fn coauthor_network(collection: &RecordCollection, options: &CoauthorOptions) -> Graph {
    let mut graph = Graph::new(false);
    for record in build_order(collection, options.deterministic) {
        if record.bad() {
            continue;
        }
        if options.journals_only {
            let is_journal = record
                .get(tags::PUB_TYPE)
                .and_then(|v| v.as_scalar())
                .map(|pt| pt.eq_ignore_ascii_case("J"))
                .unwrap_or(false);
            if !is_journal {
                continue;
            }
        }
        let authors = record.authors();
        if authors.is_empty() {
            continue;
        }
        for author in &authors {
            if graph.has_node(author) {
                if options.count {
                    if let Some(node) = graph.node_mut(author) {
                        node.bump_count();
                    }
                }
            } else {
                let node = graph.get_or_create_node(author);
                if options.count {
                    node.count = Some(1);
                }
                if options.node_info {
                    node.info = Some(record_info(record));
                }
            }
        }
        for i in 0..authors.len() {
            for j in (i + 1)..authors.len() {
                bump_edge(&mut graph, authors[i], authors[j], options.weighted);
            }
        }
    }
    tracing::debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "built co-authorship network"
    );
    graph
}
