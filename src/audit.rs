use std::fmt;
use std::path::Path;

use tracing::debug;

use crate::classify::{ClassificationResult, Role, classify};
use crate::config::AuditConfig;
use crate::error::AuditError;
use crate::extract::PageDecoder;
use crate::glyphs::GlyphSource;

/// Exit code when the page could not be decoded at all.
pub const EXIT_DECODE_FAILURE: i32 = 4;
/// Exit code for a command line without a document path.
pub const EXIT_USAGE: i32 = 1;

/// Outcome of auditing both roles on one page.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub headings: ClassificationResult,
    pub body: ClassificationResult,
}

impl Verdict {
    pub fn passed(&self) -> bool {
        self.headings.passed && self.body.passed
    }

    /// 0 when both roles pass, 1 when only headings fail, 2 when only body
    /// text fails, 3 when both fail.
    pub fn exit_code(&self) -> i32 {
        match (self.headings.passed, self.body.passed) {
            (true, true) => 0,
            (false, true) => 1,
            (true, false) => 2,
            (false, false) => 3,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.headings.passed, self.body.passed) {
            (true, true) => write!(f, "PASS: headings and body text use the expected fonts"),
            (false, true) => write!(f, "FAIL: headings do not use the expected font"),
            (true, false) => write!(f, "FAIL: body text does not use the expected font"),
            (false, false) => write!(f, "FAIL: headings and body text do not use the expected fonts"),
        }
    }
}

/// Classify headings and body text of an already decoded page.
pub fn audit_page<S>(page: &S, config: &AuditConfig) -> Verdict
where
    S: GlyphSource + ?Sized,
{
    let headings = classify(page, Role::Heading, config);
    let body = classify(page, Role::Body, config);
    let verdict = Verdict { headings, body };
    debug!("verdict: exit code {}", verdict.exit_code());
    verdict
}

/// Decode `config.page_index` of the document at `path` and audit it.
pub fn audit_path<P: AsRef<Path>>(
    path: P,
    decoder: &PageDecoder,
    config: &AuditConfig,
) -> Result<Verdict, AuditError> {
    let page = decoder.decode_page(path, config.page_index)?;
    Ok(audit_page(&page, config))
}
