//! Core expansion: split an aggregated record node into per-author nodes.

use crate::collection::RecordCollection;
use crate::graph::Graph;
use crate::models::NodeMode;
use crate::network::unit_edge;

/// For every record whose identity is already a node of `graph`, adds one
/// duplicate node per additional credited author, copying the original
/// node's attributes, re-linking all of its edges onto the duplicate and
/// joining the duplicates to each other.
///
/// Only nodes that are graph members expand: a record nothing cites stays
/// absent. An identity already present as its own node is left alone; its
/// attributes and edges are never overwritten. Copied edges keep their
/// orientation, so in a directed graph a citer of the original also points
/// at the duplicate. Repeated author identities on one record are skipped
/// rather than turned into self-loops, and a re-run finds every duplicate
/// already present, so the pass is idempotent in node and edge counts.
pub fn expand_core(
    graph: &mut Graph,
    collection: &RecordCollection,
    mode: NodeMode,
    weighted: bool,
) {
    let before_nodes = graph.node_count();
    for record in collection.iter().filter(|r| !r.bad()) {
        let identities: Vec<String> = record
            .author_citations()
            .iter()
            .map(|c| c.identity(mode))
            .collect();
        if identities.len() < 2 {
            continue;
        }
        for (i, id1) in identities.iter().enumerate() {
            if !graph.has_node(id1) {
                continue;
            }
            for id2 in &identities[i + 1..] {
                if id2 == id1 || graph.has_node(id2) {
                    continue;
                }
                let attrs = match graph.node(id1) {
                    Some(node) => node.clone(),
                    None => continue,
                };
                graph.insert_node(id2, attrs);
                graph.insert_edge(id1, id2, None, unit_edge(weighted));
                for (key, edge) in graph.edges_of(id1) {
                    if key.source == *id1 {
                        if key.target != *id1 && key.target != *id2 {
                            graph.insert_edge(id2, &key.target, key.key.as_deref(), edge);
                        }
                    } else if key.source != *id2 {
                        graph.insert_edge(&key.source, id2, key.key.as_deref(), edge);
                    }
                }
            }
        }
    }
    tracing::debug!(
        added = graph.node_count() - before_nodes,
        "expanded core nodes"
    );
}
