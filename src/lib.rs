//! Typeface compliance checks for PDF pages
//!
//! This library decodes a page of a PDF into glyphs, estimates the body text
//! size, and checks that headings and body text are set in their expected
//! typefaces (Libertinus Sans and Libertinus Serif by default).

mod audit;
mod classify;
mod config;
mod error;
mod extract;
mod fonts;
mod glyphs;
mod layout;
mod processor;
mod types;
mod utils;

// Re-export error type
pub use error::AuditError;

// Re-export decoding API
pub use extract::{PageDecoder, PageDecoderBuilder, decode_page, decode_page_from_bytes};

// Re-export classification and audit API
pub use audit::{EXIT_DECODE_FAILURE, EXIT_USAGE, Verdict, audit_page, audit_path};
pub use classify::{ClassificationResult, Role, classify, dominant_size, median, mode};
pub use config::{
    AuditConfig, AuditConfigBuilder, BODY_SIZE_FACTOR, DEFAULT_PAGE_INDEX, FontPatternSet,
    HEADING_SIZE_FACTOR, LIBERTINUS_SANS_PATTERNS, LIBERTINUS_SERIF_PATTERNS, RoleConfig,
    SUCCESS_THRESHOLD,
};

// Re-export public types
pub use glyphs::{GlyphSource, Glyphs};
pub use types::{ContainerKind, GlyphRecord, LayoutNode, MediaBox, PageLayout};
