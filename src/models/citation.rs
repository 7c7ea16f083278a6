//! Citation model: a reference extracted from a record's citation field.
//!
//! Citations carry only partial information. A reference may name an author
//! and a year but no journal, or a journal and volume with an anonymous
//! author. Equality is therefore a partial match: the fields populated on
//! both sides must agree, and at least one field must be shared. This makes
//! equality reflexive and symmetric but NOT transitive, which is intentional
//! and relied upon by the counting code downstream. Do not "fix" it.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The author token used for anonymous references.
pub const ANONYMOUS: &str = "[ANONYMOUS]";

/// The poolable sentinel returned by [`Citation::identity`] when the
/// requested single field is absent. All citations missing that field
/// collapse onto one node under this key.
pub const MISSING: &str = "[missing]";

/// Full names for common journal abbreviations. Lookups fall back to the
/// abbreviation itself, so the table only needs to cover frequent cases.
const JOURNAL_NAMES: &[(&str, &str)] = &[
    ("SCIENCE", "Science"),
    ("NATURE", "Nature"),
    ("PHYS REV LETT", "Physical Review Letters"),
    ("PHYS REV B", "Physical Review B"),
    ("J APPL PHYS", "Journal of Applied Physics"),
    ("APPL PHYS LETT", "Applied Physics Letters"),
    ("P NATL ACAD SCI USA", "Proceedings of the National Academy of Sciences"),
    ("AM J SOCIOL", "American Journal of Sociology"),
    ("ANNU REV SOCIOL", "Annual Review of Sociology"),
    ("SOC NETWORKS", "Social Networks"),
    ("SCIENTOMETRICS", "Scientometrics"),
    ("J AM SOC INF SCI", "Journal of the American Society for Information Science"),
    ("LANCET", "The Lancet"),
    ("NEW ENGL J MED", "New England Journal of Medicine"),
];

fn year_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{4}$").unwrap())
}

fn volume_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[Vv]\d+$").unwrap())
}

fn page_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[Pp][A-Za-z]?\d+$").unwrap())
}

/// The scheme used to derive a citation's graph-node identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeMode {
    /// Composite of every populated field, compared holistically.
    Full,
    /// The raw citation text verbatim.
    Original,
    /// The author field alone.
    Author,
    /// The journal field alone.
    Journal,
    /// The year field alone.
    Year,
}

impl NodeMode {
    /// Returns the mode identifier used in string-driven APIs.
    pub fn id(&self) -> &str {
        match self {
            NodeMode::Full => "full",
            NodeMode::Original => "original",
            NodeMode::Author => "author",
            NodeMode::Journal => "journal",
            NodeMode::Year => "year",
        }
    }
}

impl FromStr for NodeMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(NodeMode::Full),
            "original" => Ok(NodeMode::Original),
            "author" => Ok(NodeMode::Author),
            "journal" => Ok(NodeMode::Journal),
            "year" => Ok(NodeMode::Year),
            other => Err(Error::InvalidArgument(format!(
                "'{other}' is not an allowed node mode, expected one of \
                 'full', 'original', 'author', 'journal' or 'year'"
            ))),
        }
    }
}

impl fmt::Display for NodeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// A single bibliographic reference with partial identity fields.
///
/// Two citations are equal when every field populated on both sides
/// matches; a field missing on either side does not block the match. When
/// the citations share no populated field at all they are only equal if
/// their raw texts are identical (which also keeps equality reflexive for
/// field-free citations).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Citation {
    /// Cited author, usually "LAST, F" in source data.
    pub author: Option<String>,

    /// Publication year.
    pub year: Option<i32>,

    /// Journal abbreviation, resolvable via [`Citation::full_journal_name`].
    pub journal: Option<String>,

    /// Volume token as it appeared, e.g. "V12".
    pub volume: Option<String>,

    /// Page token as it appeared, e.g. "P345".
    pub page: Option<String>,

    /// Uncategorized remainder (DOIs and stray segments).
    pub misc: Option<String>,

    /// The original raw citation text.
    pub original: String,
}

impl Citation {
    /// Creates an empty citation carrying only its raw text.
    pub fn new(original: impl Into<String>) -> Self {
        Self {
            author: None,
            year: None,
            journal: None,
            volume: None,
            page: None,
            misc: None,
            original: original.into(),
        }
    }

    /// Parses a comma-separated reference string of the shape
    /// `Author, Year, Journal, Vnn, Pnn, DOI ...` into its fields.
    ///
    /// Segment order is flexible: the year is the first 4-digit segment,
    /// volume and page are recognized by their `V`/`P` prefixes, `DOI`
    /// segments and anything unclassifiable accumulate in `misc`. The first
    /// plain segment before the year becomes the author, the first plain
    /// segment after it the journal.
    pub fn parse(raw: &str) -> Self {
        let mut cite = Citation::new(raw.trim());
        let mut misc_parts: Vec<&str> = Vec::new();
        for segment in raw.split(',') {
            let seg = segment.trim();
            if seg.is_empty() {
                continue;
            }
            if cite.year.is_none() && year_re().is_match(seg) {
                cite.year = seg.parse().ok();
            } else if cite.volume.is_none() && volume_re().is_match(seg) {
                cite.volume = Some(seg.to_string());
            } else if cite.page.is_none() && page_re().is_match(seg) {
                cite.page = Some(seg.to_string());
            } else if seg.to_ascii_uppercase().starts_with("DOI") {
                misc_parts.push(seg);
            } else if cite.author.is_none() && cite.year.is_none() {
                cite.author = Some(seg.to_string());
            } else if cite.journal.is_none() {
                cite.journal = Some(seg.to_string());
            } else {
                misc_parts.push(seg);
            }
        }
        if !misc_parts.is_empty() {
            cite.misc = Some(misc_parts.join(", "));
        }
        cite
    }

    /// Sets the author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Sets the year.
    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    /// Sets the journal abbreviation.
    pub fn with_journal(mut self, journal: impl Into<String>) -> Self {
        self.journal = Some(journal.into());
        self
    }

    /// Sets the volume token.
    pub fn with_volume(mut self, volume: impl Into<String>) -> Self {
        self.volume = Some(volume.into());
        self
    }

    /// Sets the page token.
    pub fn with_page(mut self, page: impl Into<String>) -> Self {
        self.page = Some(page.into());
        self
    }

    /// True when the author field carries the anonymous-author token.
    pub fn is_anonymous(&self) -> bool {
        self.author
            .as_deref()
            .map(|a| a.trim().eq_ignore_ascii_case(ANONYMOUS))
            .unwrap_or(false)
    }

    /// True when the citation is structurally a journal article: it has a
    /// journal name and at least a volume or a page.
    pub fn is_journal(&self) -> bool {
        self.journal.is_some() && (self.volume.is_some() || self.page.is_some())
    }

    /// Resolves the journal abbreviation to a full name when the built-in
    /// table knows it, otherwise returns the abbreviation unchanged. `None`
    /// when the citation has no journal.
    pub fn full_journal_name(&self) -> Option<String> {
        let journal = self.journal.as_deref()?;
        let upper = journal.trim().to_ascii_uppercase();
        for (abbrev, full) in JOURNAL_NAMES {
            if *abbrev == upper {
                return Some((*full).to_string());
            }
        }
        Some(journal.to_string())
    }

    /// The author/year key the original used to bucket citations; also the
    /// basis of this type's `Hash`. Falls back to the raw text when both
    /// fields are missing.
    pub fn short_id(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if let Some(a) = &self.author {
            parts.push(a.trim().to_ascii_uppercase());
        }
        if let Some(y) = self.year {
            parts.push(y.to_string());
        }
        if parts.is_empty() {
            self.original.clone()
        } else {
            parts.join(", ")
        }
    }

    /// Composite of every populated field in the fixed order author, year,
    /// journal, volume, page. Falls back to the raw text when no field is
    /// populated.
    pub fn full_id(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if let Some(a) = &self.author {
            parts.push(a.trim().to_string());
        }
        if let Some(y) = self.year {
            parts.push(y.to_string());
        }
        if let Some(j) = &self.journal {
            parts.push(j.clone());
        }
        if let Some(v) = &self.volume {
            parts.push(v.clone());
        }
        if let Some(p) = &self.page {
            parts.push(p.clone());
        }
        if parts.is_empty() {
            self.original.clone()
        } else {
            parts.join(", ")
        }
    }

    /// Derives the canonical node identity key for the requested mode.
    ///
    /// Single-field modes return the [`MISSING`] sentinel when the field is
    /// absent; callers must treat it as a valid key, pooling every citation
    /// missing that field onto one node.
    pub fn identity(&self, mode: NodeMode) -> String {
        match mode {
            NodeMode::Full => self.full_id(),
            NodeMode::Original => self.original.clone(),
            NodeMode::Author => self
                .author
                .as_deref()
                .map(|a| a.trim().to_string())
                .unwrap_or_else(|| MISSING.to_string()),
            NodeMode::Journal => self
                .journal
                .as_deref()
                .map(|j| j.trim().to_string())
                .unwrap_or_else(|| MISSING.to_string()),
            NodeMode::Year => self
                .year
                .map(|y| y.to_string())
                .unwrap_or_else(|| MISSING.to_string()),
        }
    }

    /// The text the filter pipeline matches keywords against: the raw
    /// citation when present, the composite identity otherwise.
    pub fn rendered(&self) -> String {
        if self.original.is_empty() {
            self.full_id()
        } else {
            self.original.clone()
        }
    }
}

impl fmt::Display for Citation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rendered())
    }
}

fn str_field_eq(a: Option<&str>, b: Option<&str>) -> Option<bool> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.trim().eq_ignore_ascii_case(y.trim())),
        _ => None,
    }
}

impl PartialEq for Citation {
    fn eq(&self, other: &Self) -> bool {
        let mut shared = 0usize;
        let checks = [
            str_field_eq(self.author.as_deref(), other.author.as_deref()),
            match (self.year, other.year) {
                (Some(x), Some(y)) => Some(x == y),
                _ => None,
            },
            str_field_eq(self.journal.as_deref(), other.journal.as_deref()),
            str_field_eq(self.volume.as_deref(), other.volume.as_deref()),
            str_field_eq(self.page.as_deref(), other.page.as_deref()),
        ];
        for check in checks {
            match check {
                Some(false) => return false,
                Some(true) => shared += 1,
                None => {}
            }
        }
        if shared == 0 {
            // No fields in common besides the raw text: equal only to an
            // identical raw string (keeps Eq reflexive).
            return self.original == other.original;
        }
        true
    }
}

impl Eq for Citation {}

impl Hash for Citation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Partial-match equality cannot be perfectly consistent with any
        // field hash; hashing the author/year key reproduces the bucketing
        // the original's dict usage produced.
        self.short_id().hash(state);
    }
}
