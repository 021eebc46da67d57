//! Font-usage classification of a page's glyphs.
//!
//! The body font size is estimated from the whole page first, because the
//! heading and body cut-offs are multiples of it. A second scan then picks
//! out the glyphs of one role and measures how many of them use the
//! expected typeface.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use tracing::debug;

use crate::config::AuditConfig;
use crate::glyphs::GlyphSource;

/// The two kinds of text the audit distinguishes by size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Heading,
    Body,
}

impl Role {
    /// The size cut-off for this role given the page's dominant size.
    pub fn threshold(self, dominant_size: f64, size_factor: f64) -> f64 {
        dominant_size * size_factor
    }

    /// Headings are at or above their threshold, body text at or below.
    pub fn qualifies(self, size: f64, threshold: f64) -> bool {
        match self {
            Role::Heading => size >= threshold,
            Role::Body => size <= threshold,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Heading => f.write_str("headings"),
            Role::Body => f.write_str("body"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    pub role: Role,
    pub passed: bool,
    pub usage_percentage: f64,
    pub total_classified: usize,
    pub matched: usize,
    pub dominant_size: Option<f64>,
    pub threshold: Option<f64>,
    pub all_font_names: BTreeSet<String>,
    pub role_font_names: BTreeSet<String>,
}

/// The most frequent value, if exactly one value has the highest count.
pub fn mode(values: &[f64]) -> Option<f64> {
    let mut counts: HashMap<u64, (f64, usize)> = HashMap::new();
    for &v in values {
        // -0.0 and 0.0 are the same size
        let key = if v == 0. { 0 } else { v.to_bits() };
        counts.entry(key).or_insert((v, 0)).1 += 1;
    }

    let top = counts.values().map(|&(_, n)| n).max()?;
    let mut winners = counts.values().filter(|&&(_, n)| n == top);
    let (value, _) = *winners.next()?;
    if winners.next().is_some() {
        return None;
    }
    Some(value)
}

/// The middle value, or the mean of the two middle values for an even
/// count. NaN sorts last.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) / 2.)
    }
}

/// Estimate the body font size: the unique mode, falling back to the median
/// when several sizes tie for most frequent.
pub fn dominant_size(sizes: &[f64]) -> Option<f64> {
    mode(sizes).or_else(|| median(sizes))
}

/// Measure how much of `role`'s text uses that role's expected typeface.
///
/// `source` is scanned twice: once for the dominant size and the set of
/// fonts on the page, once to count the glyphs of `role`. A page with no
/// glyphs of that role never passes.
pub fn classify<S>(source: &S, role: Role, config: &AuditConfig) -> ClassificationResult
where
    S: GlyphSource + ?Sized,
{
    let role_config = config.role(role);

    let mut sizes = Vec::new();
    let mut all_font_names = BTreeSet::new();
    for glyph in source.glyphs() {
        sizes.push(glyph.size);
        if !all_font_names.contains(&glyph.fontname) {
            all_font_names.insert(glyph.fontname.clone());
        }
    }

    let dominant = dominant_size(&sizes);
    let threshold = dominant.map(|size| role.threshold(size, role_config.size_factor));
    debug!(
        "{}: {} glyphs, dominant size {:?}, threshold {:?}",
        role,
        sizes.len(),
        dominant,
        threshold
    );

    let mut total_classified = 0;
    let mut matched = 0;
    let mut role_font_names = BTreeSet::new();
    if let Some(threshold) = threshold {
        for glyph in source.glyphs() {
            if !role.qualifies(glyph.size, threshold) {
                continue;
            }
            total_classified += 1;
            if !role_font_names.contains(&glyph.fontname) {
                role_font_names.insert(glyph.fontname.clone());
            }
            if role_config.patterns.matches(&glyph.fontname) {
                matched += 1;
            }
        }
    }

    let (passed, usage_percentage) = if total_classified == 0 {
        (false, 0.0)
    } else {
        let usage = matched as f64 / total_classified as f64;
        (usage >= config.success_threshold, usage)
    };
    debug!(
        "{}: {}/{} glyphs in expected font ({:.2}), passed: {}",
        role, matched, total_classified, usage_percentage, passed
    );

    ClassificationResult {
        role,
        passed,
        usage_percentage,
        total_classified,
        matched,
        dominant_size: dominant,
        threshold,
        all_font_names,
        role_font_names,
    }
}
