//! Record model representing one parsed bibliographic entry.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::Citation;

/// Well-known tag names the engine itself reads. Any other tag is opaque
/// and only touched by the generic tag-network builders.
pub mod tags {
    /// Ordered list of credited authors.
    pub const AUTHORS: &str = "authorsFull";
    /// Publication year, a numeric scalar.
    pub const YEAR: &str = "year";
    /// Journal abbreviation.
    pub const JOURNAL: &str = "journal";
    /// Volume token.
    pub const VOLUME: &str = "volume";
    /// First page token.
    pub const BEGINNING_PAGE: &str = "beginningPage";
    /// Publication title.
    pub const TITLE: &str = "title";
    /// Publication type code, `"J"` for journal articles.
    pub const PUB_TYPE: &str = "pubType";
    /// Ordered list of raw citation strings.
    pub const CITATIONS: &str = "citations";
}

/// A tag value: a scalar or an ordered list of scalars.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
    Scalar(String),
    List(Vec<String>),
}

impl TagValue {
    /// The scalar value, `None` for lists.
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            TagValue::Scalar(s) => Some(s),
            TagValue::List(_) => None,
        }
    }

    /// The value as a list; scalars yield a single-element list.
    pub fn as_list(&self) -> Vec<&str> {
        match self {
            TagValue::Scalar(s) => vec![s.as_str()],
            TagValue::List(items) => items.iter().map(String::as_str).collect(),
        }
    }

    /// First element for lists, the value itself for scalars.
    pub fn first(&self) -> Option<&str> {
        match self {
            TagValue::Scalar(s) => Some(s),
            TagValue::List(items) => items.first().map(String::as_str),
        }
    }
}

impl From<&str> for TagValue {
    fn from(s: &str) -> Self {
        TagValue::Scalar(s.to_string())
    }
}

impl From<String> for TagValue {
    fn from(s: String) -> Self {
        TagValue::Scalar(s)
    }
}

impl From<Vec<String>> for TagValue {
    fn from(items: Vec<String>) -> Self {
        TagValue::List(items)
    }
}

/// One publication: a stable id, a tag map and a parse-failure marker.
///
/// Records are immutable after construction. Equality and hash cover the
/// full canonical form (id, ordered tag map, bad flag) so identical
/// publications obtained from different sources collapse to one set
/// element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
    id: String,
    tags: BTreeMap<String, TagValue>,
    bad: bool,
}

impl Record {
    /// The record's stable identifying string.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// True when the source parser flagged this record as malformed.
    pub fn bad(&self) -> bool {
        self.bad
    }

    /// Looks up a tag value.
    pub fn get(&self, tag: &str) -> Option<&TagValue> {
        self.tags.get(tag)
    }

    /// The set of tag names present on this record.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.tags.keys().map(String::as_str)
    }

    /// True when every listed tag is present.
    pub fn has_tags(&self, wanted: &[&str]) -> bool {
        wanted.iter().all(|t| self.tags.contains_key(*t))
    }

    /// Credited authors, in order. Empty when the tag is absent.
    pub fn authors(&self) -> Vec<&str> {
        self.get(tags::AUTHORS).map(|v| v.as_list()).unwrap_or_default()
    }

    /// The publication year as an integer.
    ///
    /// Fails with `TypeMismatch` when the year tag is absent or not
    /// numeric; year-range callers decide whether to drop or propagate.
    pub fn year(&self) -> Result<i32> {
        let value = self
            .get(tags::YEAR)
            .and_then(|v| v.as_scalar())
            .ok_or_else(|| {
                Error::TypeMismatch(format!("record '{}' has no year field", self.id))
            })?;
        value.trim().parse().map_err(|_| {
            Error::TypeMismatch(format!(
                "record '{}' has a non-numeric year '{value}'",
                self.id
            ))
        })
    }

    /// Parses the citation field into `Citation` values, in order. Empty
    /// when the record cites nothing.
    pub fn citations(&self) -> Vec<Citation> {
        self.get(tags::CITATIONS)
            .map(|v| v.as_list().iter().map(|raw| Citation::parse(raw)).collect())
            .unwrap_or_default()
    }

    /// This record's own identity as a citation: first author, year,
    /// journal, volume and first page.
    pub fn self_citation(&self) -> Citation {
        self.citation_for_author(self.authors().first().copied())
    }

    /// One citation per credited author, in author order. A record with no
    /// author list yields its single author-less self-citation.
    pub fn author_citations(&self) -> Vec<Citation> {
        let authors = self.authors();
        if authors.is_empty() {
            return vec![self.self_citation()];
        }
        authors
            .iter()
            .map(|a| self.citation_for_author(Some(a)))
            .collect()
    }

    fn citation_for_author(&self, author: Option<&str>) -> Citation {
        let mut cite = Citation::new("");
        cite.author = author.map(|a| a.to_string());
        cite.year = self.year().ok();
        cite.journal = self
            .get(tags::JOURNAL)
            .and_then(|v| v.first())
            .map(|j| j.to_string());
        cite.volume = self
            .get(tags::VOLUME)
            .and_then(|v| v.first())
            .map(|v| format!("V{}", v.trim_start_matches(['V', 'v'])));
        cite.page = self
            .get(tags::BEGINNING_PAGE)
            .and_then(|v| v.first())
            .map(|p| format!("P{}", p.trim_start_matches(['P', 'p'])));
        cite.original = cite.full_id();
        cite
    }
}

/// Builder for constructing `Record` values, the boundary through which
/// the (external) parsing layer supplies records.
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    record: Record,
}

impl RecordBuilder {
    /// Starts a record with its stable id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            record: Record {
                id: id.into(),
                tags: BTreeMap::new(),
                bad: false,
            },
        }
    }

    /// Sets an arbitrary tag.
    pub fn tag(mut self, name: impl Into<String>, value: impl Into<TagValue>) -> Self {
        self.record.tags.insert(name.into(), value.into());
        self
    }

    /// Sets the credited author list.
    pub fn authors<I, S>(self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let list: Vec<String> = authors.into_iter().map(Into::into).collect();
        self.tag(tags::AUTHORS, list)
    }

    /// Sets the publication year.
    pub fn year(self, year: i32) -> Self {
        self.tag(tags::YEAR, year.to_string())
    }

    /// Sets the journal abbreviation.
    pub fn journal(self, journal: impl Into<String>) -> Self {
        self.tag(tags::JOURNAL, journal.into())
    }

    /// Sets the title.
    pub fn title(self, title: impl Into<String>) -> Self {
        self.tag(tags::TITLE, title.into())
    }

    /// Sets the publication type code.
    pub fn pub_type(self, pt: impl Into<String>) -> Self {
        self.tag(tags::PUB_TYPE, pt.into())
    }

    /// Sets the raw citation strings.
    pub fn citations<I, S>(self, cites: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let list: Vec<String> = cites.into_iter().map(Into::into).collect();
        self.tag(tags::CITATIONS, list)
    }

    /// Marks the record as a parse failure.
    pub fn bad(mut self, bad: bool) -> Self {
        self.record.bad = bad;
        self
    }

    /// Builds the record; it is immutable from here on.
    pub fn build(self) -> Record {
        self.record
    }
}
