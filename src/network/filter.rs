//! Per-citation inclusion predicate shared by the citation-driven builders.

use crate::models::Citation;
use crate::network::CoreIndex;

/// Decides whether a citation participates in a build.
///
/// Checks compose by short-circuit AND: a citation is kept only when it
/// passes every enabled check. Keyword matching is an EXCLUSION: a
/// citation whose rendered text contains any keyword is dropped. All
/// checks are pure.
#[derive(Debug, Default)]
pub struct CiteFilter<'a> {
    drop_anonymous: bool,
    drop_non_journals: bool,
    keywords: Vec<String>,
    core: Option<&'a CoreIndex>,
}

impl<'a> CiteFilter<'a> {
    /// A filter that keeps everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop citations whose author is the anonymous token.
    pub fn drop_anonymous(mut self, yes: bool) -> Self {
        self.drop_anonymous = yes;
        self
    }

    /// Drop citations that are not structurally journal articles.
    pub fn drop_non_journals(mut self, yes: bool) -> Self {
        self.drop_non_journals = yes;
        self
    }

    /// Exclude citations whose rendered text contains any of these
    /// keywords (case-insensitive substring).
    pub fn exclude_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().to_ascii_uppercase())
            .collect();
        self
    }

    /// Keep only citations resolving to members of the core index.
    pub fn core_only(mut self, core: &'a CoreIndex) -> Self {
        self.core = Some(core);
        self
    }

    /// True when the citation passes every enabled check.
    pub fn keep(&self, cite: &Citation) -> bool {
        if self.drop_anonymous && cite.is_anonymous() {
            return false;
        }
        if self.drop_non_journals && !cite.is_journal() {
            return false;
        }
        if !self.keywords.is_empty() {
            let rendered = cite.rendered().to_ascii_uppercase();
            if self.keywords.iter().any(|k| rendered.contains(k)) {
                return false;
            }
        }
        if let Some(core) = self.core {
            if !core.contains(cite) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::RecordCollection;
    use crate::models::RecordBuilder;

    #[test]
    fn test_empty_filter_keeps_everything() {
        let f = CiteFilter::new();
        assert!(f.keep(&Citation::parse("[ANONYMOUS], 1999")));
        assert!(f.keep(&Citation::parse("SMITH J, 2001")));
    }

    #[test]
    fn test_drop_anonymous() {
        let f = CiteFilter::new().drop_anonymous(true);
        assert!(!f.keep(&Citation::parse("[ANONYMOUS], 1999, SCIENCE")));
        assert!(f.keep(&Citation::parse("SMITH J, 2001, NATURE, V410, P789")));
    }

    #[test]
    fn test_drop_non_journals() {
        let f = CiteFilter::new().drop_non_journals(true);
        assert!(f.keep(&Citation::parse("SMITH J, 2001, NATURE, V410, P789")));
        // No volume or page: not structurally a journal article.
        assert!(!f.keep(&Citation::parse("SMITH J, 2001, NATURE")));
    }

    #[test]
    fn test_keyword_match_excludes() {
        let f = CiteFilter::new().exclude_keywords(["nature"]);
        assert!(!f.keep(&Citation::parse("SMITH J, 2001, NATURE, V410, P789")));
        assert!(f.keep(&Citation::parse("DOE K, 1999, SCIENCE, V250, P1")));
    }

    #[test]
    fn test_core_only() {
        let coll = RecordCollection::from_records(
            "t",
            [RecordBuilder::new("WOS:1")
                .authors(["SMITH J"])
                .year(2001)
                .journal("NATURE")
                .build()],
        );
        let core = CoreIndex::build(&coll, false);
        let f = CiteFilter::new().core_only(&core);
        assert!(f.keep(&Citation::new("x").with_author("SMITH J").with_year(2001)));
        assert!(!f.keep(&Citation::parse("OLD K, 1990, SCIENCE, V250, P1")));
    }

    #[test]
    fn test_checks_compose_by_and() {
        let f = CiteFilter::new()
            .drop_anonymous(true)
            .exclude_keywords(["retracted"]);
        assert!(!f.keep(&Citation::parse("[ANONYMOUS], 1999, SCIENCE, V1, P1")));
        assert!(!f.keep(&Citation::parse("SMITH J, 2001, RETRACTED P, V1, P1")));
        assert!(f.keep(&Citation::parse("SMITH J, 2001, NATURE, V410, P789")));
    }
}
