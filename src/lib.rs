//! biblionet derives analytical graphs from sets of bibliographic records:
//! co-authorship, citation, co-citation and generalized tag-occurrence
//! networks, plus frequency statistics over the citation field.
//!
//! The crate operates entirely in memory on records supplied by an
//! external parsing layer through [`models::RecordBuilder`]. A
//! [`collection::RecordCollection`] behaves as a deduplicated set with
//! algebraic combination; the builders in [`network`] fold a collection
//! into a [`graph::Graph`] whose counts and weights are independent of
//! fold order.
//!
//! ```
//! use biblionet::{
//!     CiteNetOptions, RecordBuilder, RecordCollection, cocitation_network,
//! };
//!
//! let collection = RecordCollection::from_records(
//!     "demo",
//!     [
//!         RecordBuilder::new("WOS:1")
//!             .authors(["SMITH J"])
//!             .year(2020)
//!             .citations([
//!                 "OLD K, 1990, SCIENCE, V250, P1",
//!                 "DOE J, 2001, NATURE, V410, P789",
//!             ])
//!             .build(),
//!     ],
//! );
//! let graph = cocitation_network(&collection, &CiteNetOptions::new());
//! assert_eq!(graph.edge_count(), 1);
//! ```

/// Crate version, for embedding applications that report it.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod collection;
pub mod error;
pub mod graph;
pub mod models;
pub mod network;
pub mod stats;

pub use collection::{CiteField, RecordCollection};
pub use error::{Error, Result};
pub use graph::{Edge, EdgeKey, Graph, Node};
pub use models::{tags, Citation, NodeMode, Record, RecordBuilder, TagValue};
pub use network::{
    citation_network, coauthor_network, cocitation_network, expand_core, n_mode_network,
    one_mode_network, two_mode_network, CiteFilter, CiteNetOptions, CoauthorOptions, CoreIndex,
    NModeOptions, OneModeOptions, TwoModeOptions,
};
pub use stats::{cite_stats, StatsKey};
