//! A deduplicated, hash-keyed container of records with set algebra.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{tags, Citation, Record};

/// Which citation component [`RecordCollection::cite_filter`] searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CiteField {
    /// The whole raw citation string.
    All,
    Author,
    Year,
    Journal,
    Volume,
    Page,
    Misc,
    /// Matches anonymous citations; the key string is ignored.
    Anonymous,
}

/// A deduplicated set of [`Record`]s.
///
/// The collection carries a provenance `name`, regenerated textually when
/// collections are combined algebraically, and a `bad`/`errors` side
/// channel describing source inputs that failed to parse. Combining
/// collections ORs the `bad` flags and unions the error maps.
///
/// Iteration order over the underlying hash set is unspecified; every
/// numeric aggregate downstream is order-independent, and the few places
/// that capture descriptive text from the "first" record seen say so.
/// [`RecordCollection::iter_sorted`] provides an id-ordered walk for
/// callers that want full determinism.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordCollection {
    name: String,
    bad: bool,
    errors: BTreeMap<String, String>,
    records: HashSet<Record>,
}

impl RecordCollection {
    /// Creates an empty collection with a provenance name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bad: false,
            errors: BTreeMap::new(),
            records: HashSet::new(),
        }
    }

    /// Creates a collection from records, deduplicating as it goes.
    pub fn from_records(
        name: impl Into<String>,
        records: impl IntoIterator<Item = Record>,
    ) -> Self {
        let mut rc = Self::new(name);
        for r in records {
            rc.add(r);
        }
        rc
    }

    /// The provenance name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True when any source input failed to parse.
    pub fn bad(&self) -> bool {
        self.bad
    }

    /// Per-source parse error messages.
    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    /// Records a source-level parse failure, marking the collection bad.
    /// This is the side channel the (external) parsing layer reports
    /// through instead of raising.
    pub fn record_error(&mut self, source: impl Into<String>, message: impl Into<String>) {
        self.bad = true;
        self.errors.insert(source.into(), message.into());
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the collection holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Membership test by record value.
    pub fn contains(&self, record: &Record) -> bool {
        self.records.contains(record)
    }

    /// Iterates in unspecified (hash) order.
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    /// Iterates in ascending record-id order; the deterministic fold used
    /// when builders run with their `deterministic` option.
    pub fn iter_sorted(&self) -> impl Iterator<Item = &Record> {
        let mut sorted: Vec<&Record> = self.records.iter().collect();
        sorted.sort_by(|a, b| a.id().cmp(b.id()));
        sorted.into_iter()
    }

    /// An arbitrary record, without removing it.
    pub fn first(&self) -> Option<&Record> {
        self.records.iter().next()
    }

    /// Inserts a record; duplicates collapse silently.
    pub fn add(&mut self, record: Record) {
        self.records.insert(record);
    }

    /// Removes a record, failing with `NotFound` when absent.
    pub fn remove(&mut self, record: &Record) -> Result<()> {
        if self.records.remove(record) {
            Ok(())
        } else {
            Err(Error::NotFound(format!(
                "record '{}' is not in collection '{}'",
                record.id(),
                self.name
            )))
        }
    }

    /// Removes a record if present; a no-op otherwise.
    pub fn discard(&mut self, record: &Record) -> bool {
        self.records.remove(record)
    }

    /// Drops every record and resets the bad flag and error map.
    pub fn clear(&mut self) {
        self.bad = false;
        self.errors.clear();
        self.records.clear();
    }

    //
    // Id-based lookup
    //

    /// Finds a record by its stable id.
    pub fn get_by_id(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.id() == id)
    }

    /// True when a record with this id is present.
    pub fn contains_id(&self, id: &str) -> bool {
        self.get_by_id(id).is_some()
    }

    /// Removes the record with this id, failing with `NotFound` when no
    /// record carries it.
    pub fn remove_by_id(&mut self, id: &str) -> Result<()> {
        match self.get_by_id(id).cloned() {
            Some(record) => {
                self.records.remove(&record);
                Ok(())
            }
            None => Err(Error::NotFound(format!(
                "no record with id '{id}' in collection '{}'",
                self.name
            ))),
        }
    }

    /// Removes the record with this id if present; a no-op otherwise.
    pub fn discard_by_id(&mut self, id: &str) {
        if let Some(record) = self.get_by_id(id).cloned() {
            self.records.remove(&record);
        }
    }

    //
    // Set algebra. Pure variants return a new collection with a
    // regenerated name; *_update variants mutate self. Both OR the bad
    // flags and union the error maps.
    //

    fn combine(
        &self,
        other: &Self,
        op: char,
        records: HashSet<Record>,
    ) -> Self {
        let mut errors = self.errors.clone();
        errors.extend(other.errors.iter().map(|(k, v)| (k.clone(), v.clone())));
        Self {
            name: format!("{} {op} {}", self.name, other.name),
            bad: self.bad || other.bad,
            errors,
            records,
        }
    }

    fn absorb_meta(&mut self, other: &Self) {
        if other.bad {
            self.bad = true;
        }
        self.errors
            .extend(other.errors.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    /// Records in either collection.
    pub fn union(&self, other: &Self) -> Self {
        let records = self.records.union(&other.records).cloned().collect();
        self.combine(other, '|', records)
    }

    /// Records in both collections.
    pub fn intersect(&self, other: &Self) -> Self {
        let records = self.records.intersection(&other.records).cloned().collect();
        self.combine(other, '&', records)
    }

    /// Records in `self` but not in `other`.
    pub fn difference(&self, other: &Self) -> Self {
        let records = self.records.difference(&other.records).cloned().collect();
        self.combine(other, '-', records)
    }

    /// Records in exactly one of the collections.
    pub fn symmetric_difference(&self, other: &Self) -> Self {
        let records = self
            .records
            .symmetric_difference(&other.records)
            .cloned()
            .collect();
        self.combine(other, '^', records)
    }

    /// In-place union.
    pub fn union_update(&mut self, other: &Self) {
        self.records.extend(other.records.iter().cloned());
        self.absorb_meta(other);
    }

    /// In-place intersection.
    pub fn intersect_update(&mut self, other: &Self) {
        self.records.retain(|r| other.records.contains(r));
        self.absorb_meta(other);
    }

    /// In-place difference.
    pub fn difference_update(&mut self, other: &Self) {
        self.records.retain(|r| !other.records.contains(r));
        self.absorb_meta(other);
    }

    /// In-place symmetric difference.
    pub fn symmetric_difference_update(&mut self, other: &Self) {
        let both: Vec<Record> = self
            .records
            .intersection(&other.records)
            .cloned()
            .collect();
        self.records.extend(other.records.iter().cloned());
        for r in both {
            self.records.remove(&r);
        }
        self.absorb_meta(other);
    }

    //
    // Filtering and splitting
    //

    /// Splits into `(good, bad)` collections by the records' bad flags,
    /// without touching this collection.
    pub fn partition_bad(&self) -> (Self, Self) {
        let good = self.iter().filter(|r| !r.bad()).cloned();
        let bad = self.iter().filter(|r| r.bad()).cloned();
        (
            Self::from_records(format!("{}_good", self.name), good),
            Self::from_records(format!("{}_bad", self.name), bad),
        )
    }

    /// Drops every record flagged bad.
    pub fn drop_bad(&mut self) {
        let before = self.records.len();
        self.records.retain(|r| !r.bad());
        tracing::debug!(
            collection = %self.name,
            dropped = before - self.records.len(),
            "dropped bad records"
        );
    }

    /// Retains records where `predicate(record.get(tag))` holds.
    pub fn filter_by_field<F>(&mut self, tag: &str, predicate: F)
    where
        F: Fn(Option<&crate::models::TagValue>) -> bool,
    {
        self.records.retain(|r| predicate(r.get(tag)));
    }

    /// Drops records whose publication-type tag differs from `pub_type`
    /// (or matches it, with `invert`). Bad records go too unless
    /// `keep_bad`.
    pub fn drop_non_journals(&mut self, pub_type: &str, keep_bad: bool, invert: bool) {
        if !keep_bad {
            self.drop_bad();
        }
        let wanted = pub_type.to_ascii_uppercase();
        self.records.retain(|r| {
            let matches = r
                .get(tags::PUB_TYPE)
                .and_then(|v| v.as_scalar())
                .map(|pt| pt.eq_ignore_ascii_case(&wanted))
                .unwrap_or(false);
            matches != invert
        });
    }

    /// The subset of records whose year lies in `[start, end]` inclusive.
    ///
    /// A record with a missing or non-numeric year fails the whole split
    /// with `TypeMismatch` unless `drop_missing`, in which case it is
    /// silently excluded.
    pub fn year_split(&self, start: i32, end: i32, drop_missing: bool) -> Result<Self> {
        let mut kept: Vec<Record> = Vec::new();
        for r in self.iter() {
            match r.year() {
                Ok(y) => {
                    if y >= start && y <= end {
                        kept.push(r.clone());
                    }
                }
                Err(e) => {
                    if !drop_missing {
                        return Err(e);
                    }
                }
            }
        }
        Ok(Self::from_records(
            format!("{}({start}-{end})", self.name),
            kept,
        ))
    }

    /// The subset of records carrying every listed tag.
    pub fn with_tags(&self, wanted: &[&str]) -> Self {
        let kept = self.iter().filter(|r| r.has_tags(wanted)).cloned();
        Self::from_records(format!("{}_tags({})", self.name, wanted.join(",")), kept)
    }

    /// Keeps records with at least one citation matching `key` in the
    /// chosen citation field (case-insensitive substring; equality for
    /// the year field). `invert` keeps the non-matching records instead.
    pub fn cite_filter(&self, key: &str, field: CiteField, invert: bool) -> Self {
        let needle = key.to_ascii_uppercase();
        let matches = |c: &Citation| -> bool {
            let probe: Option<String> = match field {
                CiteField::All => Some(c.rendered()),
                CiteField::Author => c.author.clone(),
                CiteField::Year => return c.year.map(|y| y.to_string()) == Some(key.to_string()),
                CiteField::Journal => c.journal.clone(),
                CiteField::Volume => c.volume.clone(),
                CiteField::Page => c.page.clone(),
                CiteField::Misc => c.misc.clone(),
                CiteField::Anonymous => return c.is_anonymous(),
            };
            probe
                .map(|v| v.to_ascii_uppercase().contains(&needle))
                .unwrap_or(false)
        };
        let kept = self
            .iter()
            .filter(|r| r.citations().iter().any(|c| matches(c)) != invert)
            .cloned();
        Self::from_records(self.name.clone(), kept)
    }

    /// Records whose reference list contains a citation equal (under
    /// partial matching) to `probe`.
    pub fn cites_of(&self, probe: &Citation) -> Self {
        let kept = self
            .iter()
            .filter(|r| r.citations().iter().any(|c| c == probe))
            .cloned();
        Self::from_records(format!("records_citing_{probe}"), kept)
    }
}

impl PartialEq for RecordCollection {
    fn eq(&self, other: &Self) -> bool {
        self.records == other.records
    }
}

impl Eq for RecordCollection {}

impl fmt::Display for RecordCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordCollection({})", self.name)
    }
}

impl FromIterator<Record> for RecordCollection {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self::from_records("", iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordBuilder;

    fn rec(id: &str) -> Record {
        RecordBuilder::new(id).build()
    }

    fn coll(name: &str, ids: &[&str]) -> RecordCollection {
        RecordCollection::from_records(name, ids.iter().map(|id| rec(id)))
    }

    #[test]
    fn test_add_deduplicates() {
        let mut rc = RecordCollection::new("t");
        rc.add(rec("a"));
        rc.add(rec("a"));
        assert_eq!(rc.len(), 1);
    }

    #[test]
    fn test_remove_absent_is_not_found() {
        let mut rc = coll("t", &["a"]);
        assert!(rc.remove(&rec("a")).is_ok());
        let err = rc.remove(&rec("a")).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        // discard is the silent variant
        assert!(!rc.discard(&rec("a")));
    }

    #[test]
    fn test_id_lookup() {
        let mut rc = coll("t", &["a", "b"]);
        assert!(rc.contains_id("a"));
        assert_eq!(rc.get_by_id("b").unwrap().id(), "b");
        rc.remove_by_id("a").unwrap();
        assert!(!rc.contains_id("a"));
        assert!(matches!(rc.remove_by_id("a"), Err(Error::NotFound(_))));
        rc.discard_by_id("missing"); // no-op
    }

    #[test]
    fn test_union_is_commutative() {
        let a = coll("a", &["1", "2"]);
        let b = coll("b", &["2", "3"]);
        assert_eq!(a.union(&b), b.union(&a));
        assert_eq!(a.union(&b).len(), 3);
    }

    #[test]
    fn test_intersection_is_subset_of_both() {
        let a = coll("a", &["1", "2"]);
        let b = coll("b", &["2", "3"]);
        let both = a.intersect(&b);
        assert!(both.iter().all(|r| a.contains(r) && b.contains(r)));
        assert_eq!(both.len(), 1);
    }

    #[test]
    fn test_self_difference_is_empty() {
        let a = coll("a", &["1", "2"]);
        assert!(a.difference(&a).is_empty());
    }

    #[test]
    fn test_union_with_empty_is_identity() {
        let a = coll("a", &["1", "2"]);
        let empty = RecordCollection::new("empty");
        assert_eq!(a.union(&empty), a);
    }

    #[test]
    fn test_symmetric_difference() {
        let a = coll("a", &["1", "2"]);
        let b = coll("b", &["2", "3"]);
        let sym = a.symmetric_difference(&b);
        assert_eq!(sym.len(), 2);
        assert!(sym.contains_id("1"));
        assert!(sym.contains_id("3"));
    }

    #[test]
    fn test_bad_flag_ors_and_errors_union() {
        let mut a = coll("a", &["1"]);
        a.record_error("fileA", "truncated header");
        let mut b = coll("b", &["2"]);
        b.record_error("fileB", "bad encoding");

        for combined in [a.union(&b), a.intersect(&b), a.difference(&b), a.symmetric_difference(&b)]
        {
            assert!(combined.bad());
            assert_eq!(combined.errors().len(), 2);
        }

        let clean = coll("c", &["3"]);
        assert!(a.union(&clean).bad());
        assert!(!clean.difference(&clean).bad());
    }

    #[test]
    fn test_in_place_variants_match_pure_ones() {
        let a = coll("a", &["1", "2"]);
        let b = coll("b", &["2", "3"]);

        let mut m = a.clone();
        m.union_update(&b);
        assert_eq!(m, a.union(&b));

        let mut m = a.clone();
        m.intersect_update(&b);
        assert_eq!(m, a.intersect(&b));

        let mut m = a.clone();
        m.difference_update(&b);
        assert_eq!(m, a.difference(&b));

        let mut m = a.clone();
        m.symmetric_difference_update(&b);
        assert_eq!(m, a.symmetric_difference(&b));
    }

    #[test]
    fn test_combined_name_is_regenerated() {
        let a = coll("left", &["1"]);
        let b = coll("right", &["2"]);
        assert_eq!(a.union(&b).name(), "left | right");
        assert_eq!(a.difference(&b).name(), "left - right");
    }

    #[test]
    fn test_partition_bad_leaves_original_intact() {
        let rc = RecordCollection::from_records(
            "t",
            [
                RecordBuilder::new("ok").build(),
                RecordBuilder::new("broken").bad(true).build(),
            ],
        );
        let (good, bad) = rc.partition_bad();
        assert_eq!(good.len(), 1);
        assert_eq!(bad.len(), 1);
        assert!(good.contains_id("ok"));
        assert!(bad.contains_id("broken"));
        assert_eq!(rc.len(), 2);
    }

    #[test]
    fn test_drop_bad_mutates() {
        let mut rc = RecordCollection::from_records(
            "t",
            [
                RecordBuilder::new("ok").build(),
                RecordBuilder::new("broken").bad(true).build(),
            ],
        );
        rc.drop_bad();
        assert_eq!(rc.len(), 1);
        assert!(rc.contains_id("ok"));
    }

    #[test]
    fn test_year_split_inclusive_bounds() {
        let rc = RecordCollection::from_records(
            "t",
            [
                RecordBuilder::new("1999").year(1999).build(),
                RecordBuilder::new("2000").year(2000).build(),
                RecordBuilder::new("2005").year(2005).build(),
                RecordBuilder::new("2006").year(2006).build(),
            ],
        );
        let split = rc.year_split(2000, 2005, false).unwrap();
        assert_eq!(split.len(), 2);
        assert!(split.contains_id("2000"));
        assert!(split.contains_id("2005"));
    }

    #[test]
    fn test_year_split_missing_year() {
        let rc = RecordCollection::from_records(
            "t",
            [
                RecordBuilder::new("dated").year(2003).build(),
                RecordBuilder::new("undated").build(),
            ],
        );
        let err = rc.year_split(2000, 2005, false).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch(_)));

        let split = rc.year_split(2000, 2005, true).unwrap();
        assert_eq!(split.len(), 1);
        assert!(split.contains_id("dated"));
    }

    #[test]
    fn test_filter_by_field() {
        let mut rc = RecordCollection::from_records(
            "t",
            [
                RecordBuilder::new("j").pub_type("J").build(),
                RecordBuilder::new("b").pub_type("B").build(),
                RecordBuilder::new("none").build(),
            ],
        );
        rc.filter_by_field(tags::PUB_TYPE, |v| {
            v.and_then(|v| v.as_scalar()) == Some("J")
        });
        assert_eq!(rc.len(), 1);
        assert!(rc.contains_id("j"));
    }

    #[test]
    fn test_drop_non_journals() {
        let mut rc = RecordCollection::from_records(
            "t",
            [
                RecordBuilder::new("j").pub_type("J").build(),
                RecordBuilder::new("b").pub_type("B").build(),
                RecordBuilder::new("broken").pub_type("J").bad(true).build(),
            ],
        );
        rc.drop_non_journals("J", false, false);
        assert_eq!(rc.len(), 1);
        assert!(rc.contains_id("j"));

        let mut rc = RecordCollection::from_records(
            "t",
            [
                RecordBuilder::new("j").pub_type("J").build(),
                RecordBuilder::new("b").pub_type("B").build(),
            ],
        );
        rc.drop_non_journals("J", false, true);
        assert_eq!(rc.len(), 1);
        assert!(rc.contains_id("b"));
    }

    #[test]
    fn test_with_tags() {
        let rc = RecordCollection::from_records(
            "t",
            [
                RecordBuilder::new("full").year(2000).journal("NATURE").build(),
                RecordBuilder::new("partial").year(2000).build(),
            ],
        );
        let tagged = rc.with_tags(&[tags::YEAR, tags::JOURNAL]);
        assert_eq!(tagged.len(), 1);
        assert!(tagged.contains_id("full"));
    }

    #[test]
    fn test_cite_filter_and_invert() {
        let rc = RecordCollection::from_records(
            "t",
            [
                RecordBuilder::new("cites-nature")
                    .citations(["SMITH J, 2001, NATURE, V410, P789"])
                    .build(),
                RecordBuilder::new("cites-science")
                    .citations(["DOE K, 1999, SCIENCE, V250, P1"])
                    .build(),
            ],
        );
        let hits = rc.cite_filter("nature", CiteField::Journal, false);
        assert_eq!(hits.len(), 1);
        assert!(hits.contains_id("cites-nature"));

        let misses = rc.cite_filter("nature", CiteField::Journal, true);
        assert_eq!(misses.len(), 1);
        assert!(misses.contains_id("cites-science"));

        let by_year = rc.cite_filter("1999", CiteField::Year, false);
        assert!(by_year.contains_id("cites-science"));
    }

    #[test]
    fn test_cites_of_partial_match() {
        let rc = RecordCollection::from_records(
            "t",
            [
                RecordBuilder::new("citer")
                    .citations(["SMITH J, 2001, NATURE, V410, P789"])
                    .build(),
                RecordBuilder::new("other")
                    .citations(["DOE K, 1999, SCIENCE, V250, P1"])
                    .build(),
            ],
        );
        // Probe carries only author and year; partial matching finds it.
        let probe = Citation::new("probe").with_author("SMITH J").with_year(2001);
        let citing = rc.cites_of(&probe);
        assert_eq!(citing.len(), 1);
        assert!(citing.contains_id("citer"));
    }
}
