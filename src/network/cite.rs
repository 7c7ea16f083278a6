//! Co-citation and citation networks over the records' reference lists.

use crate::collection::RecordCollection;
use crate::graph::Graph;
use crate::models::NodeMode;
use crate::network::{
    add_citation_group, build_order, citation_node, expand_core, CiteFilter, CoreIndex,
};

/// Options shared by [`cocitation_network`] and [`citation_network`].
///
/// Defaults mirror the common analysis setup: full-identity nodes,
/// anonymous references dropped, generic node info, counted and weighted,
/// citation edges directed.
#[derive(Debug, Clone)]
pub struct CiteNetOptions {
    mode: NodeMode,
    drop_anonymous: bool,
    drop_non_journals: bool,
    keywords: Vec<String>,
    node_info: bool,
    full_info: bool,
    count: bool,
    weighted: bool,
    directed: bool,
    core_info: bool,
    core_only: bool,
    expanded_core: bool,
    deterministic: bool,
}

impl Default for CiteNetOptions {
    fn default() -> Self {
        Self {
            mode: NodeMode::Full,
            drop_anonymous: true,
            drop_non_journals: false,
            keywords: Vec::new(),
            node_info: true,
            full_info: false,
            count: true,
            weighted: true,
            directed: true,
            core_info: false,
            core_only: false,
            expanded_core: false,
            deterministic: false,
        }
    }
}

impl CiteNetOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identity scheme for citation nodes.
    pub fn mode(mut self, mode: NodeMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn drop_anonymous(mut self, yes: bool) -> Self {
        self.drop_anonymous = yes;
        self
    }

    pub fn drop_non_journals(mut self, yes: bool) -> Self {
        self.drop_non_journals = yes;
        self
    }

    /// Exclude citations whose rendered text contains any keyword.
    pub fn exclude_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Attach a descriptive `info` attribute to each node.
    pub fn node_info(mut self, yes: bool) -> Self {
        self.node_info = yes;
        self
    }

    /// Attach the full rendered citation as a `fullCite` attribute.
    pub fn full_info(mut self, yes: bool) -> Self {
        self.full_info = yes;
        self
    }

    pub fn count(mut self, yes: bool) -> Self {
        self.count = yes;
        self
    }

    pub fn weighted(mut self, yes: bool) -> Self {
        self.weighted = yes;
        self
    }

    /// Orient citation-network edges from citer to cited. Ignored by the
    /// co-citation builder, which is always undirected.
    pub fn directed(mut self, yes: bool) -> Self {
        self.directed = yes;
        self
    }

    /// Resolve citations against the collection and attach rich record
    /// info plus an `inCore` flag to matching nodes.
    pub fn core_info(mut self, yes: bool) -> Self {
        self.core_info = yes;
        self
    }

    /// Keep only citations that resolve to collection members.
    pub fn core_only(mut self, yes: bool) -> Self {
        self.core_only = yes;
        self
    }

    /// After the build, split each core node into per-author duplicates.
    pub fn expanded_core(mut self, yes: bool) -> Self {
        self.expanded_core = yes;
        self
    }

    /// Fold records in ascending id order so info capture is reproducible.
    pub fn deterministic(mut self, yes: bool) -> Self {
        self.deterministic = yes;
        self
    }

    fn core_index(&self, collection: &RecordCollection) -> Option<CoreIndex> {
        if self.core_info || self.core_only {
            Some(CoreIndex::build(collection, self.expanded_core))
        } else {
            None
        }
    }

    fn filter<'a>(&self, core: Option<&'a CoreIndex>) -> CiteFilter<'a> {
        let mut filter = CiteFilter::new()
            .drop_anonymous(self.drop_anonymous)
            .drop_non_journals(self.drop_non_journals)
            .exclude_keywords(&self.keywords);
        if self.core_only {
            if let Some(core) = core {
                filter = filter.core_only(core);
            }
        }
        filter
    }
}

/// Builds the undirected co-citation graph: nodes are cited works, an
/// edge joins two works every time one record cites both. The pairwise
/// step is quadratic in each record's reference-list length.
pub fn cocitation_network(collection: &RecordCollection, options: &CiteNetOptions) -> Graph {
    let core = options.core_index(collection);
    let filter = options.filter(core.as_ref());
    let mut graph = Graph::new(false);
    for record in build_order(collection, options.deterministic) {
        if record.bad() {
            continue;
        }
        let group: Vec<_> = record
            .citations()
            .iter()
            .filter(|c| filter.keep(c))
            .map(|c| {
                citation_node(
                    c,
                    options.mode,
                    core.as_ref(),
                    options.node_info,
                    options.full_info,
                    options.count,
                )
            })
            .collect();
        add_citation_group(&mut graph, None, &group, options.weighted, options.count);
    }
    if options.expanded_core {
        expand_core(&mut graph, collection, options.mode, options.weighted);
    }
    tracing::debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        mode = %options.mode,
        "built co-citation network"
    );
    graph
}

/// Builds the citation graph: edges run from each record's own identity
/// node to every work it cites. A record whose self-citation is itself
/// rejected by the filter contributes nothing, cited nodes included.
pub fn citation_network(collection: &RecordCollection, options: &CiteNetOptions) -> Graph {
    let core = options.core_index(collection);
    let filter = options.filter(core.as_ref());
    let mut graph = Graph::new(options.directed);
    for record in build_order(collection, options.deterministic) {
        if record.bad() {
            continue;
        }
        let self_cite = record.self_citation();
        if !filter.keep(&self_cite) {
            continue;
        }
        // The head carries no initial count: its count is bumped only by
        // being cited, so the tally is the same whichever record the fold
        // visits first.
        let head = citation_node(
            &self_cite,
            options.mode,
            core.as_ref(),
            options.node_info,
            options.full_info,
            false,
        );
        let group: Vec<_> = record
            .citations()
            .iter()
            .filter(|c| filter.keep(c))
            .map(|c| {
                citation_node(
                    c,
                    options.mode,
                    core.as_ref(),
                    options.node_info,
                    options.full_info,
                    options.count,
                )
            })
            .collect();
        add_citation_group(
            &mut graph,
            Some(&head),
            &group,
            options.weighted,
            options.count,
        );
    }
    if options.expanded_core {
        expand_core(&mut graph, collection, options.mode, options.weighted);
    }
    tracing::debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        mode = %options.mode,
        directed = options.directed,
        "built citation network"
    );
    graph
}
