use std::fmt::{self, Debug};
use std::rc::Rc;
use std::slice::Iter;

use adobe_cmap_parser::{ByteMapping, CodeRange};
use lopdf::{Dictionary, Document, Object};
use tracing::{debug, warn};

use crate::utils::*;

pub(crate) type CharCode = u32;

/// Name reported for glyphs whose font carries no usable name.
pub(crate) const UNKNOWN_FONT_NAME: &str = "unknown";

/// Single-byte fonts: Type1, MMType1, TrueType and Type3.
pub(crate) struct PdfSimpleFont<'a> {
    font: &'a Dictionary,
    name: String,
}

/// Type0 composite fonts, whose codes are one to four bytes wide as laid out
/// by the encoding CMap's codespace ranges.
pub(crate) struct PdfCIDFont<'a> {
    font: &'a Dictionary,
    name: String,
    encoding: ByteMapping,
}

/// Stand-in for a `Tf` whose resource cannot be resolved.
#[derive(Debug)]
pub(crate) struct PdfUnknownFont;

pub(crate) struct PdfFontIter<'a> {
    i: Iter<'a, u8>,
    font: &'a dyn PdfFont,
}

impl<'a> Iterator for PdfFontIter<'a> {
    type Item = (CharCode, u8);
    fn next(&mut self) -> Option<(CharCode, u8)> {
        self.font.next_char(&mut self.i)
    }
}

pub(crate) trait PdfFont: Debug {
    fn next_char(&self, iter: &mut Iter<u8>) -> Option<(CharCode, u8)>;
    fn get_font_name(&self) -> &str;
}

impl<'a> dyn PdfFont + 'a {
    pub(crate) fn char_codes(&'a self, chars: &'a [u8]) -> PdfFontIter<'a> {
        PdfFontIter {
            i: chars.iter(),
            font: self,
        }
    }
}

pub(crate) fn make_font<'a>(doc: &'a Document, font: &'a Dictionary) -> Rc<dyn PdfFont + 'a> {
    let subtype = maybe_get_name_string(doc, font, b"Subtype").unwrap_or_default();
    debug!("MakeFont({})", subtype);
    if subtype == "Type0" {
        Rc::new(PdfCIDFont::new(doc, font))
    } else {
        Rc::new(PdfSimpleFont::new(doc, font))
    }
}

/// The name a glyph is attributed to: the descriptor's `FontName`, then
/// `BaseFont`, then [`UNKNOWN_FONT_NAME`]. Subset tags are kept.
fn font_name<'a>(doc: &'a Document, font: &'a Dictionary, descriptor_owner: &'a Dictionary) -> String {
    maybe_get::<&Dictionary>(doc, descriptor_owner, b"FontDescriptor")
        .and_then(|descriptor| maybe_get_name_string(doc, descriptor, b"FontName"))
        .or_else(|| maybe_get_name_string(doc, font, b"BaseFont"))
        .unwrap_or_else(|| UNKNOWN_FONT_NAME.to_owned())
}

impl<'a> PdfSimpleFont<'a> {
    fn new(doc: &'a Document, font: &'a Dictionary) -> PdfSimpleFont<'a> {
        let name = font_name(doc, font, font);
        debug!("simple font {}", name);
        PdfSimpleFont { font, name }
    }
}

impl<'a> PdfFont for PdfSimpleFont<'a> {
    fn next_char(&self, iter: &mut Iter<u8>) -> Option<(CharCode, u8)> {
        iter.next().map(|x| (*x as CharCode, 1))
    }

    fn get_font_name(&self) -> &str {
        &self.name
    }
}

impl<'a> fmt::Debug for PdfSimpleFont<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.font.fmt(f)
    }
}

fn identity_mapping() -> ByteMapping {
    ByteMapping {
        codespace: vec![CodeRange {
            width: 2,
            start: 0,
            end: 0xffff,
        }],
        cid: Vec::new(),
    }
}

impl<'a> PdfCIDFont<'a> {
    fn new(doc: &'a Document, font: &'a Dictionary) -> PdfCIDFont<'a> {
        let descendant = maybe_get_array(doc, font, b"DescendantFonts")
            .and_then(|descendants| descendants.first())
            .and_then(|d| <&Dictionary>::from_obj(doc, d));
        let name = font_name(doc, font, descendant.unwrap_or(font));

        let encoding = match maybe_get_obj(doc, font, b"Encoding") {
            Some(Object::Name(cmap)) => {
                let cmap = pdf_to_utf8(cmap);
                debug!("encoding {:?}", cmap);
                if cmap != "Identity-H" && cmap != "Identity-V" {
                    // Predefined CJK CMaps are not bundled; two-byte codes
                    // are the common case for them as well.
                    debug!("predefined cmap {} treated as two-byte", cmap);
                }
                identity_mapping()
            }
            Some(Object::Stream(stream)) => {
                let contents = get_contents(stream);
                match adobe_cmap_parser::get_byte_mapping(&contents) {
                    Ok(mapping) if !mapping.codespace.is_empty() => mapping,
                    Ok(_) => {
                        warn!("empty codespace in embedded cmap for {}", name);
                        identity_mapping()
                    }
                    Err(e) => {
                        warn!("unparsable embedded cmap for {}: {:?}", name, e);
                        identity_mapping()
                    }
                }
            }
            other => {
                warn!("unsupported encoding {:?} for {}", other, name);
                identity_mapping()
            }
        };
        debug!("cid font {} with {} codespace ranges", name, encoding.codespace.len());

        PdfCIDFont {
            font,
            name,
            encoding,
        }
    }
}

impl<'a> PdfFont for PdfCIDFont<'a> {
    fn next_char(&self, iter: &mut Iter<u8>) -> Option<(CharCode, u8)> {
        let mut c = *iter.next()? as u32;
        let mut code = None;
        'outer: for width in 1..=4 {
            for range in &self.encoding.codespace {
                if c >= range.start && c <= range.end && range.width == width {
                    code = Some((c, width));
                    break 'outer;
                }
            }
            if width == 4 {
                break;
            }
            let next = *iter.next()?;
            c = (c << 8) | next as u32;
        }
        // Bytes outside every codespace range still paint something;
        // consume them as one code.
        let (code, width) = code.unwrap_or((c, 4));
        Some((code, width as u8))
    }

    fn get_font_name(&self) -> &str {
        &self.name
    }
}

impl<'a> fmt::Debug for PdfCIDFont<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.font.fmt(f)
    }
}

impl PdfFont for PdfUnknownFont {
    fn next_char(&self, iter: &mut Iter<u8>) -> Option<(CharCode, u8)> {
        iter.next().map(|x| (*x as CharCode, 1))
    }

    fn get_font_name(&self) -> &str {
        UNKNOWN_FONT_NAME
    }
}
