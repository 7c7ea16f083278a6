//! Core data structures: records, citations and tag values.

pub mod citation;
pub mod record;

pub use citation::{Citation, NodeMode, ANONYMOUS, MISSING};
pub use record::{tags, Record, RecordBuilder, TagValue};
