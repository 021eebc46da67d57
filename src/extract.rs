use std::io::Read;
use std::path::Path;

use lopdf::{Dictionary, Document};
use tracing::debug;

use crate::error::AuditError;
use crate::layout::LayoutBuilder;
use crate::processor::Processor;
use crate::types::{MediaBox, PageLayout};
use crate::utils::get_inherited;

fn decode_page_from_doc(doc: &Document, index: usize) -> Result<PageLayout, AuditError> {
    let pages = doc.get_pages();
    let page_count = pages.len();
    let Some(&object_id) = pages.values().nth(index) else {
        return Err(AuditError::PageNotFound { index, page_count });
    };

    let empty_resources = Dictionary::new();
    let page_dict = doc.get_dictionary(object_id)?;
    let resources = get_inherited(doc, page_dict, b"Resources").unwrap_or(&empty_resources);
    let media_box = match get_inherited::<Vec<f32>>(doc, page_dict, b"MediaBox").as_deref() {
        Some(&[llx, lly, urx, ury]) => MediaBox { llx, lly, urx, ury },
        _ => MediaBox::LETTER,
    };
    debug!("page {} of {}: MediaBox {:?}", index, page_count, media_box);

    let content = doc.get_page_content(object_id)?;
    let mut output = LayoutBuilder::new();
    Processor::new().process_page(doc, &content, resources, &mut output, index)?;
    debug!("page {}: {} glyphs", index, output.glyph_count());

    Ok(PageLayout::new(index, media_box, output.into_nodes()))
}

/// Builder for configuring page decoding.
///
/// # Examples
///
/// ```no_run
/// use pdf_font_audit::PageDecoder;
///
/// let page = PageDecoder::builder()
///     .password("secret")
///     .build()
///     .decode_page("encrypted.pdf", 0)?;
/// # Ok::<(), pdf_font_audit::AuditError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct PageDecoderBuilder {
    password: Option<String>,
}

impl PageDecoderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the password for encrypted PDFs.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn build(self) -> PageDecoder {
        PageDecoder {
            password: self.password,
        }
    }
}

/// Decodes one page of a PDF into its layout tree.
///
/// # Examples
///
/// ```no_run
/// use pdf_font_audit::PageDecoder;
///
/// let page = PageDecoder::default().decode_page("paper.pdf", 0)?;
/// for glyph in page.glyphs() {
///     println!("{}", glyph);
/// }
/// # Ok::<(), pdf_font_audit::AuditError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct PageDecoder {
    password: Option<String>,
}

impl PageDecoder {
    pub fn builder() -> PageDecoderBuilder {
        PageDecoderBuilder::new()
    }

    /// Decode the page at zero-based `index` of the PDF file at `path`.
    pub fn decode_page<P: AsRef<Path>>(&self, path: P, index: usize) -> Result<PageLayout, AuditError> {
        let mut doc = Document::load(path)?;
        self.decode_from_document(&mut doc, index)
    }

    /// Decode a page of a PDF held in memory.
    pub fn decode_page_from_bytes(&self, bytes: &[u8], index: usize) -> Result<PageLayout, AuditError> {
        let mut doc = Document::load_mem(bytes)?;
        self.decode_from_document(&mut doc, index)
    }

    /// Decode a page of a PDF read to the end from `reader`.
    pub fn decode_page_from_reader<R: Read>(
        &self,
        mut reader: R,
        index: usize,
    ) -> Result<PageLayout, AuditError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        self.decode_page_from_bytes(&bytes, index)
    }

    fn decode_from_document(&self, doc: &mut Document, index: usize) -> Result<PageLayout, AuditError> {
        if doc.is_encrypted() {
            let password = self.password.as_deref().unwrap_or("");
            doc.decrypt(password)?;
        }
        decode_page_from_doc(doc, index)
    }
}

/// Decode page `index` of the PDF at `path` with default settings.
pub fn decode_page<P: AsRef<Path>>(path: P, index: usize) -> Result<PageLayout, AuditError> {
    PageDecoder::default().decode_page(path, index)
}

/// Decode page `index` of an in-memory PDF with default settings.
pub fn decode_page_from_bytes(bytes: &[u8], index: usize) -> Result<PageLayout, AuditError> {
    PageDecoder::default().decode_page_from_bytes(bytes, index)
}
