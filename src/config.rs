use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use tracing::warn;

use crate::classify::Role;
use crate::error::AuditError;

/// Glyphs at least this many times the body size count as headings.
pub const HEADING_SIZE_FACTOR: f64 = 1.35;
/// Glyphs at most this many times the body size count as body text.
pub const BODY_SIZE_FACTOR: f64 = 1.05;
/// Share of a role's glyphs that must use the expected typeface.
pub const SUCCESS_THRESHOLD: f64 = 0.80;
/// Only the first page is inspected.
pub const DEFAULT_PAGE_INDEX: usize = 0;

// Subset-embedded fonts carry a six-or-more character tag before a `+`;
// CID fonts re-embedded by some producers lose their family name entirely.
pub const LIBERTINUS_SANS_PATTERNS: &[&str] = &[
    r"LibertinusSans",
    r"LibertinusSans-Regular",
    r"LibertinusSans-Bold",
    r"[A-Z0-9]{6,}\+LibertinusSans",
    r"[A-Z0-9]{6,}\+LibertinusSans-Bold",
    r"CIDFont[+.]F[0-9]+",
    r"/LibertinusSans",
];

pub const LIBERTINUS_SERIF_PATTERNS: &[&str] = &[
    r"LibertinusSerif",
    r"LibertinusSerif-Regular",
    r"LibertinusSerif-Italic",
    r"[A-Z0-9]{6,}\+LibertinusSerif",
    r"[A-Z0-9]{6,}\+LibertinusSerif-Regular",
    r"CIDFont[+.]F[0-9]+",
    r"/LibertinusSerif",
];

static LIBERTINUS_SANS: LazyLock<FontPatternSet> =
    LazyLock::new(|| FontPatternSet::lenient(LIBERTINUS_SANS_PATTERNS));
static LIBERTINUS_SERIF: LazyLock<FontPatternSet> =
    LazyLock::new(|| FontPatternSet::lenient(LIBERTINUS_SERIF_PATTERNS));

fn compile(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

/// An ordered list of case-insensitive font name patterns.
#[derive(Debug, Clone)]
pub struct FontPatternSet {
    patterns: Vec<Regex>,
}

impl FontPatternSet {
    /// Compile every pattern case-insensitively.
    pub fn new<I, S>(patterns: I) -> Result<Self, AuditError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| {
                let p = p.as_ref();
                compile(p).map_err(|source| AuditError::InvalidPattern {
                    pattern: p.to_owned(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(FontPatternSet { patterns })
    }

    /// Like [`FontPatternSet::new`], dropping patterns that fail to compile.
    fn lenient(patterns: &[&str]) -> Self {
        let patterns = patterns
            .iter()
            .filter_map(|p| match compile(p) {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!("dropping font pattern {:?}: {}", p, e);
                    None
                }
            })
            .collect();
        FontPatternSet { patterns }
    }

    /// The heading patterns, compiled once per process.
    pub fn libertinus_sans() -> Self {
        LIBERTINUS_SANS.clone()
    }

    /// The body patterns, compiled once per process.
    pub fn libertinus_serif() -> Self {
        LIBERTINUS_SERIF.clone()
    }

    /// True when any pattern is found anywhere in `fontname`.
    pub fn matches(&self, fontname: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(fontname))
    }

    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(Regex::as_str)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Expected typeface and size factor for one role.
#[derive(Debug, Clone)]
pub struct RoleConfig {
    pub patterns: FontPatternSet,
    pub size_factor: f64,
}

/// Everything the audit needs to know, fixed for the whole run.
///
/// The default checks the first page against the Libertinus pairing used
/// by the CEUR-ART template: Libertinus Sans headings over Libertinus Serif
/// body text.
#[derive(Debug, Clone)]
pub struct AuditConfig {
    pub heading: RoleConfig,
    pub body: RoleConfig,
    pub success_threshold: f64,
    pub page_index: usize,
}

impl AuditConfig {
    pub fn builder() -> AuditConfigBuilder {
        AuditConfigBuilder::new()
    }

    pub fn role(&self, role: Role) -> &RoleConfig {
        match role {
            Role::Heading => &self.heading,
            Role::Body => &self.body,
        }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        AuditConfig {
            heading: RoleConfig {
                patterns: FontPatternSet::libertinus_sans(),
                size_factor: HEADING_SIZE_FACTOR,
            },
            body: RoleConfig {
                patterns: FontPatternSet::libertinus_serif(),
                size_factor: BODY_SIZE_FACTOR,
            },
            success_threshold: SUCCESS_THRESHOLD,
            page_index: DEFAULT_PAGE_INDEX,
        }
    }
}

/// Builder for an [`AuditConfig`] that departs from the defaults.
///
/// # Examples
///
/// ```
/// use pdf_font_audit::AuditConfig;
///
/// let config = AuditConfig::builder()
///     .heading_patterns(["Inter"])
///     .body_patterns(["SourceSerif"])
///     .success_threshold(0.9)
///     .build()?;
/// assert!(config.heading.patterns.matches("ABCDEF+Inter-Bold"));
/// # Ok::<(), pdf_font_audit::AuditError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct AuditConfigBuilder {
    heading_patterns: Option<Vec<String>>,
    body_patterns: Option<Vec<String>>,
    heading_size_factor: Option<f64>,
    body_size_factor: Option<f64>,
    success_threshold: Option<f64>,
    page_index: Option<usize>,
}

impl AuditConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn heading_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.heading_patterns = Some(patterns.into_iter().map(Into::into).collect());
        self
    }

    pub fn body_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.body_patterns = Some(patterns.into_iter().map(Into::into).collect());
        self
    }

    pub fn heading_size_factor(mut self, factor: f64) -> Self {
        self.heading_size_factor = Some(factor);
        self
    }

    pub fn body_size_factor(mut self, factor: f64) -> Self {
        self.body_size_factor = Some(factor);
        self
    }

    pub fn success_threshold(mut self, threshold: f64) -> Self {
        self.success_threshold = Some(threshold);
        self
    }

    pub fn page_index(mut self, index: usize) -> Self {
        self.page_index = Some(index);
        self
    }

    /// Compile the patterns. Fails on the first pattern that is not a valid
    /// regular expression.
    pub fn build(self) -> Result<AuditConfig, AuditError> {
        let heading_patterns = match self.heading_patterns {
            Some(patterns) => FontPatternSet::new(patterns)?,
            None => FontPatternSet::libertinus_sans(),
        };
        let body_patterns = match self.body_patterns {
            Some(patterns) => FontPatternSet::new(patterns)?,
            None => FontPatternSet::libertinus_serif(),
        };
        Ok(AuditConfig {
            heading: RoleConfig {
                patterns: heading_patterns,
                size_factor: self.heading_size_factor.unwrap_or(HEADING_SIZE_FACTOR),
            },
            body: RoleConfig {
                patterns: body_patterns,
                size_factor: self.body_size_factor.unwrap_or(BODY_SIZE_FACTOR),
            },
            success_threshold: self.success_threshold.unwrap_or(SUCCESS_THRESHOLD),
            page_index: self.page_index.unwrap_or(DEFAULT_PAGE_INDEX),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_ignores_case() {
        let body = FontPatternSet::libertinus_serif();
        assert!(body.matches("LIBERTINUSSERIF-REGULAR"));
        assert!(body.matches("libertinusserif-italic"));
    }

    #[test]
    fn subset_prefix_matches_heading_patterns() {
        let heading = FontPatternSet::new([r"[A-Z0-9]{6,}\+LibertinusSans-Bold"]).unwrap();
        assert!(heading.matches("ABCDEF+LibertinusSans-Bold"));
        assert!(heading.matches("XY12ZW9+LibertinusSans-Bold"));
        assert!(!heading.matches("ABC+LibertinusSans-Bold"));
        assert!(FontPatternSet::libertinus_sans().matches("ABCDEF+LibertinusSans-Bold"));
    }

    #[test]
    fn generic_cid_names_match_both_roles() {
        let config = AuditConfig::default();
        assert!(config.heading.patterns.matches("CIDFont+F1"));
        assert!(config.body.patterns.matches("CIDFont+F12"));
        assert!(!config.body.patterns.matches("CIDFont+Fx"));
    }

    #[test]
    fn other_families_do_not_match() {
        let config = AuditConfig::default();
        assert!(!config.heading.patterns.matches("Helvetica-Bold"));
        assert!(!config.body.patterns.matches("ABCDEF+LibertinusSans-Regular"));
        assert!(!config.heading.patterns.matches("ABCDEF+LibertinusSerif-Regular"));
    }

    #[test]
    fn default_constants() {
        let config = AuditConfig::default();
        assert_eq!(config.heading.size_factor, 1.35);
        assert_eq!(config.body.size_factor, 1.05);
        assert_eq!(config.success_threshold, 0.80);
        assert_eq!(config.page_index, 0);
        assert_eq!(config.heading.patterns.len(), 7);
        assert_eq!(
            config.body.patterns.sources().next(),
            Some("LibertinusSerif")
        );
    }

    #[test]
    fn builder_overrides_only_what_is_set() {
        let config = AuditConfig::builder()
            .body_patterns(["Charter"])
            .success_threshold(0.5)
            .build()
            .unwrap();
        assert!(config.body.patterns.matches("XCharter-Roman"));
        assert!(config.heading.patterns.matches("LibertinusSans-Bold"));
        assert_eq!(config.success_threshold, 0.5);
        assert_eq!(config.body.size_factor, BODY_SIZE_FACTOR);
    }

    #[test]
    fn built_in_pattern_sets_compile_completely() {
        assert_eq!(FontPatternSet::libertinus_sans().len(), LIBERTINUS_SANS_PATTERNS.len());
        assert_eq!(FontPatternSet::libertinus_serif().len(), LIBERTINUS_SERIF_PATTERNS.len());
        let sources: Vec<&str> = LIBERTINUS_SERIF.sources().collect();
        assert_eq!(sources, LIBERTINUS_SERIF_PATTERNS);
    }

    #[test]
    fn lenient_compilation_drops_bad_patterns() {
        let set = FontPatternSet::lenient(&["Libertinus(", "Inter"]);
        assert_eq!(set.len(), 1);
        assert!(set.matches("ABCDEF+Inter-Bold"));
    }

    #[test]
    fn builder_with_both_pattern_sets_replaced() {
        let config = AuditConfig::builder()
            .heading_patterns(["Inter"])
            .body_patterns(["SourceSerif"])
            .build()
            .unwrap();
        assert_eq!(config.heading.patterns.len(), 1);
        assert!(!config.heading.patterns.matches("LibertinusSans-Bold"));
        assert_eq!(config.heading.size_factor, HEADING_SIZE_FACTOR);
        assert_eq!(config.page_index, DEFAULT_PAGE_INDEX);
    }

    #[test]
    fn builder_rejects_bad_pattern() {
        let err = AuditConfig::builder()
            .heading_patterns(["Libertinus(", "ok"])
            .build()
            .unwrap_err();
        match err {
            AuditError::InvalidPattern { pattern, .. } => assert_eq!(pattern, "Libertinus("),
            other => panic!("unexpected error {other}"),
        }
    }
}
