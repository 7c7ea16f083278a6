//! Network builders: fold a record collection into a weighted, attributed
//! graph under one of several topological schemes.
//!
//! All builders share one aggregation substrate: nodes are created on first
//! occurrence and count-bumped afterwards, edges are created on first
//! co-occurrence and weight-bumped afterwards. Numeric aggregates are
//! therefore order-independent; only descriptive "info" text captured at
//! node creation depends on fold order, and each builder offers a
//! `deterministic` option that sorts records by id before folding.

pub mod coauthor;
pub mod cite;
pub mod expand;
pub mod filter;
pub mod mode;

pub use coauthor::{coauthor_network, CoauthorOptions};
pub use cite::{citation_network, cocitation_network, CiteNetOptions};
pub use expand::expand_core;
pub use filter::CiteFilter;
pub use mode::{
    n_mode_network, one_mode_network, two_mode_network, NModeOptions, OneModeOptions,
    TwoModeOptions,
};

use std::collections::HashMap;

use crate::collection::RecordCollection;
use crate::graph::{Edge, Graph, Node};
use crate::models::{tags, Citation, NodeMode, Record};

/// Tags rendered into a core node's `info` attribute, in render order.
const CORE_INFO_TAGS: &[&str] = &[
    tags::AUTHORS,
    tags::YEAR,
    tags::TITLE,
    tags::JOURNAL,
    tags::VOLUME,
    tags::BEGINNING_PAGE,
];

/// Index from self-citation identity to the record it belongs to.
///
/// Lookup goes through `Citation`'s partial-match equality, so a cited
/// reference missing its volume still finds the record it refers to.
#[derive(Debug, Default)]
pub struct CoreIndex {
    map: HashMap<Citation, Record>,
}

impl CoreIndex {
    /// Builds the index over every good record. With `expanded`, each
    /// record is indexed once per credited author instead of only under
    /// its first-author self-citation.
    pub fn build(collection: &RecordCollection, expanded: bool) -> Self {
        let mut map = HashMap::new();
        for record in collection.iter().filter(|r| !r.bad()) {
            if expanded {
                for cite in record.author_citations() {
                    map.insert(cite, record.clone());
                }
            } else {
                map.insert(record.self_citation(), record.clone());
            }
        }
        tracing::debug!(entries = map.len(), expanded, "built core index");
        Self { map }
    }

    /// True when the citation matches a collection member.
    pub fn contains(&self, cite: &Citation) -> bool {
        self.map.contains_key(cite)
    }

    /// The record a citation refers to, when it is a core citation.
    pub fn get(&self, cite: &Citation) -> Option<&Record> {
        self.map.get(cite)
    }

    /// Number of indexed identities.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// True when no records were indexed.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Renders a core record's tag values into one `info` string: the first
/// value of each known tag, commas stripped so the string stays splittable.
fn core_record_info(record: &Record) -> String {
    let mut parts: Vec<String> = Vec::new();
    for tag in CORE_INFO_TAGS {
        if let Some(value) = record.get(tag).and_then(|v| v.first()) {
            parts.push(value.replace(',', ""));
        }
    }
    parts.join(", ")
}

/// Derives one citation's node identity and attribute set for a build.
pub(crate) fn citation_node(
    cite: &Citation,
    mode: NodeMode,
    core: Option<&CoreIndex>,
    node_info: bool,
    full_info: bool,
    count: bool,
) -> (String, Node) {
    let id = cite.identity(mode);
    let mut node = Node::default();
    if node_info {
        match mode {
            NodeMode::Full | NodeMode::Original => match core {
                Some(core) => match core.get(cite) {
                    Some(record) => {
                        node.info = Some(core_record_info(record));
                        node.in_core = Some(true);
                    }
                    None => {
                        node.info = Some(cite.full_id());
                        node.in_core = Some(false);
                    }
                },
                None => node.info = Some(cite.full_id()),
            },
            NodeMode::Journal => {
                // Only a structural journal article gets a resolved name;
                // stray journal fields on other reference shapes stay "None".
                node.info = Some(if cite.is_journal() {
                    cite.full_journal_name()
                        .unwrap_or_else(|| "None".to_string())
                } else {
                    "None".to_string()
                });
            }
            NodeMode::Author | NodeMode::Year => node.info = Some(id.clone()),
        }
    }
    if full_info {
        node.full_cite = Some(cite.rendered());
    }
    if count {
        node.count = Some(1);
    }
    (id, node)
}

/// Folds one record's worth of citation nodes into the graph.
///
/// Cited nodes are created with their prepared attributes on first sight
/// and count-bumped on every later sight. The optional `head` (the citing
/// record's own identity, used by the citation network) is only ever
/// created, never count-bumped: its count reflects how often it is cited,
/// not how often it cites. With a head, edges run head to each cited node;
/// without one, edges join every pairwise combination of the group.
pub(crate) fn add_citation_group(
    graph: &mut Graph,
    head: Option<&(String, Node)>,
    cites: &[(String, Node)],
    weighted: bool,
    count: bool,
) {
    for (id, attrs) in cites {
        if graph.has_node(id) {
            if count {
                if let Some(node) = graph.node_mut(id) {
                    node.bump_count();
                }
            }
        } else {
            graph.insert_node(id, attrs.clone());
        }
    }
    match head {
        Some((head_id, head_attrs)) => {
            if !graph.has_node(head_id) {
                graph.insert_node(head_id, head_attrs.clone());
            }
            for (id, _) in cites {
                bump_edge(graph, head_id, id, weighted);
            }
        }
        None => {
            for i in 0..cites.len() {
                for j in (i + 1)..cites.len() {
                    bump_edge(graph, &cites[i].0, &cites[j].0, weighted);
                }
            }
        }
    }
}

pub(crate) fn bump_edge(graph: &mut Graph, a: &str, b: &str, weighted: bool) {
    let edge = graph.get_or_create_edge(a, b);
    if weighted {
        edge.bump_weight();
    }
}

/// Keyed-edge variant of [`bump_edge`] for one-mode parallel edges.
pub(crate) fn bump_keyed_edge(
    graph: &mut Graph,
    a: &str,
    b: &str,
    key: Option<&str>,
    weighted: bool,
) {
    let edge = graph.get_or_create_keyed_edge(a, b, key);
    if weighted {
        edge.bump_weight();
    }
}

/// The record fold order for a build: hash order by default, ascending id
/// order when the caller asked for deterministic info capture.
pub(crate) fn build_order<'a>(
    collection: &'a RecordCollection,
    deterministic: bool,
) -> Box<dyn Iterator<Item = &'a Record> + 'a> {
    if deterministic {
        Box::new(collection.iter_sorted())
    } else {
        Box::new(collection.iter())
    }
}

/// Links two node sets with a weighted edge per cross pair; used by the
/// two-mode and N-mode builders which never join values of the same tag.
pub(crate) fn cross_edges(graph: &mut Graph, left: &[String], right: &[String], weighted: bool) {
    for a in left {
        for b in right {
            bump_edge(graph, a, b, weighted);
        }
    }
}

pub(crate) fn unit_edge(weighted: bool) -> Edge {
    let mut edge = Edge::default();
    if weighted {
        edge.weight = Some(1);
    }
    edge
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordBuilder;

    fn collection() -> RecordCollection {
        RecordCollection::from_records(
            "core",
            [RecordBuilder::new("WOS:1")
                .authors(["SMITH J", "DOE K"])
                .year(2001)
                .journal("NATURE")
                .title("On Things")
                .tag(tags::VOLUME, "410")
                .tag(tags::BEGINNING_PAGE, "789")
                .build()],
        )
    }

    #[test]
    fn test_core_index_partial_match_lookup() {
        let core = CoreIndex::build(&collection(), false);
        assert_eq!(core.len(), 1);
        // Cited form lacks volume and page but still resolves.
        let probe = Citation::new("x").with_author("SMITH J").with_year(2001);
        assert!(core.contains(&probe));
        assert_eq!(core.get(&probe).unwrap().id(), "WOS:1");
    }

    #[test]
    fn test_expanded_core_indexes_every_author() {
        let core = CoreIndex::build(&collection(), true);
        assert_eq!(core.len(), 2);
        let second = Citation::new("x").with_author("DOE K").with_year(2001);
        assert!(core.contains(&second));
    }

    #[test]
    fn test_citation_node_core_info_and_flag() {
        let core = CoreIndex::build(&collection(), false);
        let cite = Citation::new("x").with_author("SMITH J").with_year(2001);
        let (_, node) = citation_node(&cite, NodeMode::Full, Some(&core), true, false, true);
        assert_eq!(node.in_core, Some(true));
        let info = node.info.unwrap();
        assert!(info.contains("On Things"));
        assert!(info.contains("2001"));
        assert_eq!(node.count, Some(1));

        let outside = Citation::parse("OLD K, 1990, SCIENCE, V250, P1");
        let (_, node) = citation_node(&outside, NodeMode::Full, Some(&core), true, false, true);
        assert_eq!(node.in_core, Some(false));
        assert_eq!(node.info.as_deref(), Some("OLD K, 1990, SCIENCE, V250, P1"));
    }

    #[test]
    fn test_citation_node_journal_mode_resolves_name() {
        let cite = Citation::parse("SMITH J, 2001, LANCET, V1, P2");
        let (id, node) = citation_node(&cite, NodeMode::Journal, None, true, false, false);
        assert_eq!(id, "LANCET");
        assert_eq!(node.info.as_deref(), Some("The Lancet"));
        assert_eq!(node.count, None);
    }

    #[test]
    fn test_citation_node_journal_mode_non_article_info_is_none() {
        // A journal field without volume or page is not structurally an
        // article; the node keeps the id but gets no resolved name.
        let cite = Citation::parse("SMITH J, 2001, LANCET");
        let (id, node) = citation_node(&cite, NodeMode::Journal, None, true, false, false);
        assert_eq!(id, "LANCET");
        assert_eq!(node.info.as_deref(), Some("None"));
    }

    #[test]
    fn test_add_group_head_is_never_count_bumped() {
        let mut g = Graph::new(true);
        let head = ("HEAD".to_string(), {
            let mut n = Node::default();
            n.count = Some(1);
            n
        });
        let cite = ("CITED".to_string(), {
            let mut n = Node::default();
            n.count = Some(1);
            n
        });
        add_citation_group(&mut g, Some(&head), std::slice::from_ref(&cite), true, true);
        add_citation_group(&mut g, Some(&head), std::slice::from_ref(&cite), true, true);
        assert_eq!(g.node("HEAD").unwrap().count, Some(1));
        assert_eq!(g.node("CITED").unwrap().count, Some(2));
        assert_eq!(g.weight("HEAD", "CITED"), 2);
    }

    #[test]
    fn test_add_group_pairwise_without_head() {
        let mut g = Graph::new(false);
        let group: Vec<(String, Node)> = ["A", "B", "C"]
            .iter()
            .map(|id| (id.to_string(), Node::default()))
            .collect();
        add_citation_group(&mut g, None, &group, true, false);
        assert_eq!(g.edge_count(), 3);
        assert_eq!(g.weight("A", "C"), 1);
    }
}
