//! Frequency tables over the citation field of a whole collection.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::collection::RecordCollection;
use crate::error::Error;
use crate::models::Citation;

/// What a citation occurrence is counted under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsKey {
    /// The full citation identity.
    Citation,
    /// Collapse to the journal field.
    Journal,
    /// Collapse to the year field.
    Year,
    /// Collapse to the author field.
    Author,
}

impl FromStr for StatsKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "citation" => Ok(StatsKey::Citation),
            "journal" => Ok(StatsKey::Journal),
            "year" => Ok(StatsKey::Year),
            "author" => Ok(StatsKey::Author),
            other => Err(Error::InvalidArgument(format!(
                "'{other}' is not an allowed stats key, expected one of \
                 'citation', 'journal', 'year' or 'author'"
            ))),
        }
    }
}

impl fmt::Display for StatsKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = match self {
            StatsKey::Citation => "citation",
            StatsKey::Journal => "journal",
            StatsKey::Year => "year",
            StatsKey::Author => "author",
        };
        write!(f, "{id}")
    }
}

fn key_of(cite: &Citation, key: StatsKey) -> Option<String> {
    match key {
        StatsKey::Citation => Some(cite.full_id()),
        StatsKey::Journal => cite.journal.clone(),
        StatsKey::Year => cite.year.map(|y| y.to_string()),
        StatsKey::Author => cite.author.clone(),
    }
}

/// Counts every citation occurrence across the collection's good records.
///
/// Collapsed keys (journal, year, author) skip citations missing that
/// field rather than zero-counting them. The result is keyed
/// deterministically whatever order the records were folded in.
pub fn cite_stats(collection: &RecordCollection, key: StatsKey) -> BTreeMap<String, u64> {
    let mut table: BTreeMap<String, u64> = BTreeMap::new();
    for record in collection.iter().filter(|r| !r.bad()) {
        for cite in record.citations() {
            if let Some(k) = key_of(&cite, key) {
                *table.entry(k).or_insert(0) += 1;
            }
        }
    }
    tracing::debug!(key = %key, entries = table.len(), "aggregated citation stats");
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordBuilder;

    fn collection() -> RecordCollection {
        RecordCollection::from_records(
            "t",
            [
                RecordBuilder::new("1")
                    .citations([
                        "SMITH J, 2001, NATURE, V410, P789",
                        "DOE K, 1999, SCIENCE, V250, P1",
                    ])
                    .build(),
                RecordBuilder::new("2")
                    .citations(["SMITH J, 2001, NATURE, V410, P789", "OLD K, 1990"])
                    .build(),
            ],
        )
    }

    #[test]
    fn test_full_citation_counts() {
        let table = cite_stats(&collection(), StatsKey::Citation);
        assert_eq!(table["SMITH J, 2001, NATURE, V410, P789"], 2);
        assert_eq!(table["DOE K, 1999, SCIENCE, V250, P1"], 1);
        assert_eq!(table["OLD K, 1990"], 1);
    }

    #[test]
    fn test_journal_collapse_skips_missing() {
        let table = cite_stats(&collection(), StatsKey::Journal);
        assert_eq!(table["NATURE"], 2);
        assert_eq!(table["SCIENCE"], 1);
        // "OLD K, 1990" has no journal and is skipped, not zero-counted.
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_year_and_author_collapse() {
        let by_year = cite_stats(&collection(), StatsKey::Year);
        assert_eq!(by_year["2001"], 2);
        assert_eq!(by_year["1990"], 1);

        let by_author = cite_stats(&collection(), StatsKey::Author);
        assert_eq!(by_author["SMITH J"], 2);
        assert_eq!(by_author["OLD K"], 1);
    }

    #[test]
    fn test_bad_records_excluded() {
        let mut coll = collection();
        coll.add(
            RecordBuilder::new("broken")
                .citations(["SMITH J, 2001, NATURE, V410, P789"])
                .bad(true)
                .build(),
        );
        let table = cite_stats(&coll, StatsKey::Citation);
        assert_eq!(table["SMITH J, 2001, NATURE, V410, P789"], 2);
    }

    #[test]
    fn test_key_parsing() {
        assert_eq!("journal".parse::<StatsKey>().unwrap(), StatsKey::Journal);
        let err = "doi".parse::<StatsKey>().unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(err.to_string().contains("doi"));
    }
}
