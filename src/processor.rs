use std::collections::{HashMap, HashSet};
use std::marker::PhantomData;
use std::rc::Rc;

use euclid::{Transform2D, vec2};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use tracing::{debug, warn};

use crate::error::AuditError;
use crate::fonts::{PdfFont, PdfUnknownFont, make_font};
use crate::layout::LayoutBuilder;
use crate::types::{ContainerKind, GlyphRecord, Transform};
use crate::utils::*;

/// Forms painting forms painting forms; a chain of distinct forms deeper
/// than this is not followed.
const MAX_FORM_DEPTH: usize = 32;

#[derive(Clone)]
pub(crate) struct TextState<'a> {
    pub(crate) font: Option<Rc<dyn PdfFont + 'a>>,
    pub(crate) font_size: f32,
    pub(crate) leading: f32,
    pub(crate) tm: Transform,
}

#[derive(Clone)]
pub(crate) struct GraphicsState<'a> {
    pub(crate) ctm: Transform,
    pub(crate) ts: TextState<'a>,
}

/// Size of a glyph as it lands on the page: the font size measured along
/// the glyph's vertical axis after the text and graphics matrices.
fn rendered_size(gs: &GraphicsState) -> f32 {
    // Trm = Tm × CTM; horizontal scaling and rise do not change the height
    let trm = gs.ts.tm.then(&gs.ctm);
    let v = trm.transform_vector(vec2(0., gs.ts.font_size));
    v.x.hypot(v.y)
}

fn show_text(gs: &GraphicsState, s: &[u8], output: &mut LayoutBuilder) {
    let Some(font) = gs.ts.font.as_ref() else {
        warn!("text shown before any font was selected, skipping {} bytes", s.len());
        return;
    };
    let size = f64::from(rendered_size(gs));
    let name = font.get_font_name();
    for _ in font.char_codes(s) {
        output.output_glyph(GlyphRecord::new(size, name));
    }
}

fn operand_matrix(operands: &[Object]) -> Option<Transform> {
    match operands {
        [a, b, c, d, e, f] => Some(Transform2D::new(
            as_num(a)?,
            as_num(b)?,
            as_num(c)?,
            as_num(d)?,
            as_num(e)?,
            as_num(f)?,
        )),
        _ => None,
    }
}

fn operand_pair(operands: &[Object]) -> Option<(f32, f32)> {
    match operands {
        [x, y] => Some((as_num(x)?, as_num(y)?)),
        _ => None,
    }
}

#[derive(Debug)]
pub(crate) struct Processor<'a> {
    /// Form XObjects whose content is being interpreted right now.
    painting: HashSet<ObjectId>,
    _none: PhantomData<&'a ()>,
}

impl<'a> Processor<'a> {
    pub(crate) fn new() -> Processor<'a> {
        Processor {
            painting: HashSet::new(),
            _none: PhantomData,
        }
    }

    pub(crate) fn process_page(
        &mut self,
        doc: &'a Document,
        content: &[u8],
        resources: &'a Dictionary,
        output: &mut LayoutBuilder,
        page_index: usize,
    ) -> Result<(), AuditError> {
        let mut gs: GraphicsState = GraphicsState {
            ts: TextState {
                font: None,
                font_size: f32::NAN,
                leading: 0.,
                tm: Transform2D::identity(),
            },
            ctm: Transform2D::identity(),
        };
        self.process_stream(doc, content, resources, &mut gs, output, page_index, 0)
    }

    #[allow(clippy::too_many_arguments)]
    fn process_stream(
        &mut self,
        doc: &'a Document,
        content: &[u8],
        resources: &'a Dictionary,
        gs: &mut GraphicsState<'a>,
        output: &mut LayoutBuilder,
        page_index: usize,
        depth: usize,
    ) -> Result<(), AuditError> {
        let content = match Content::decode(content) {
            Ok(content) => content,
            Err(e) => {
                warn!(
                    "Failed to decode content stream for page {}: {}. Skipping this content.",
                    page_index, e
                );
                return Ok(());
            }
        };
        let mut font_table: HashMap<Vec<u8>, Rc<dyn PdfFont + 'a>> = HashMap::new();
        let mut gs_stack = Vec::new();
        let mut tlm: Transform = Transform2D::identity();

        for operation in &content.operations {
            match operation.operator.as_ref() {
                "BT" => {
                    tlm = Transform2D::identity();
                    gs.ts.tm = tlm;
                    output.begin(ContainerKind::TextObject);
                }
                "ET" => {
                    tlm = Transform2D::identity();
                    gs.ts.tm = tlm;
                    output.end(ContainerKind::TextObject);
                }
                "cm" => match operand_matrix(&operation.operands) {
                    Some(m) => {
                        gs.ctm = m.then(&gs.ctm);
                        debug!("matrix {:?}", gs.ctm);
                    }
                    None => debug!("malformed operands {:?}", operation),
                },
                "q" => {
                    gs_stack.push(gs.clone());
                }
                "Q" => {
                    if let Some(s) = gs_stack.pop() {
                        *gs = s;
                    } else {
                        warn!("No state to pop");
                    }
                }
                "Tf" => {
                    let (Some(name), Some(size)) = (
                        operation.operands.first().and_then(|o| o.as_name().ok()),
                        operation.operands.get(1).and_then(as_num),
                    ) else {
                        debug!("malformed operands {:?}", operation);
                        continue;
                    };
                    let font = font_table
                        .entry(name.to_owned())
                        .or_insert_with(|| Self::lookup_font(doc, resources, name))
                        .clone();
                    debug!(
                        "font {} size: {} ({})",
                        pdf_to_utf8(name),
                        size,
                        font.get_font_name()
                    );
                    gs.ts.font = Some(font);
                    gs.ts.font_size = size;
                }
                "TL" => {
                    if let Some(leading) = operation.operands.first().and_then(as_num) {
                        gs.ts.leading = leading;
                    }
                }
                "Tm" => {
                    match operand_matrix(&operation.operands) {
                        Some(m) => {
                            tlm = m;
                            gs.ts.tm = tlm;
                            debug!("Tm: matrix {:?}", gs.ts.tm);
                        }
                        None => debug!("malformed operands {:?}", operation),
                    }
                    output.end_line();
                }
                "Td" | "TD" => {
                    match operand_pair(&operation.operands) {
                        Some((tx, ty)) => {
                            if operation.operator == "TD" {
                                gs.ts.leading = -ty;
                            }
                            tlm = Transform2D::translation(tx, ty).then(&tlm);
                            gs.ts.tm = tlm;
                            debug!("{} matrix {:?}", operation.operator, gs.ts.tm);
                        }
                        None => debug!("malformed operands {:?}", operation),
                    }
                    output.end_line();
                }
                "T*" => {
                    self.next_line(gs, &mut tlm, output);
                }
                "Tj" => match operation.operands.first() {
                    Some(Object::String(s, _)) => show_text(gs, s, output),
                    _ => debug!("unexpected Tj operand {:?}", operation),
                },
                "'" => {
                    self.next_line(gs, &mut tlm, output);
                    match operation.operands.first() {
                        Some(Object::String(s, _)) => show_text(gs, s, output),
                        _ => debug!("unexpected ' operand {:?}", operation),
                    }
                }
                "\"" => {
                    self.next_line(gs, &mut tlm, output);
                    match operation.operands.get(2) {
                        Some(Object::String(s, _)) => show_text(gs, s, output),
                        _ => debug!("unexpected \" operand {:?}", operation),
                    }
                }
                "TJ" => match operation.operands.first() {
                    Some(Object::Array(array)) => {
                        for e in array {
                            match e {
                                Object::String(s, _) => show_text(gs, s, output),
                                // kerning adjustments only move the pen
                                Object::Integer(_) | Object::Real(_) => {}
                                _ => debug!("kind of {:?}", e),
                            }
                        }
                    }
                    _ => debug!("unexpected TJ operand {:?}", operation),
                },
                "BMC" | "BDC" => {
                    output.begin(ContainerKind::MarkedContent);
                }
                "EMC" => {
                    output.end(ContainerKind::MarkedContent);
                }
                "Do" => {
                    self.paint_xobject(doc, operation, resources, gs, output, page_index, depth)?;
                }
                _ => {
                    debug!("ignored operation {:?}", operation.operator);
                }
            }
        }
        Ok(())
    }

    fn next_line(&self, gs: &mut GraphicsState<'a>, tlm: &mut Transform, output: &mut LayoutBuilder) {
        *tlm = Transform2D::translation(0., -gs.ts.leading).then(tlm);
        gs.ts.tm = *tlm;
        debug!("T* matrix {:?}", gs.ts.tm);
        output.end_line();
    }

    fn lookup_font(doc: &'a Document, resources: &'a Dictionary, name: &[u8]) -> Rc<dyn PdfFont + 'a> {
        let font = maybe_get::<&Dictionary>(doc, resources, b"Font")
            .and_then(|fonts| maybe_get::<&Dictionary>(doc, fonts, name));
        match font {
            Some(font) => make_font(doc, font),
            None => {
                warn!("font resource {} not found", pdf_to_utf8(name));
                Rc::new(PdfUnknownFont)
            }
        }
    }

    /// `Do` on a form XObject processes the form's own content stream, with
    /// the form's resources and matrix, as a nested container. Images and
    /// other XObjects carry no text.
    #[allow(clippy::too_many_arguments)]
    fn paint_xobject(
        &mut self,
        doc: &'a Document,
        operation: &Operation,
        resources: &'a Dictionary,
        gs: &mut GraphicsState<'a>,
        output: &mut LayoutBuilder,
        page_index: usize,
        depth: usize,
    ) -> Result<(), AuditError> {
        let Some(name) = operation.operands.first().and_then(|o| o.as_name().ok()) else {
            debug!("malformed operands {:?}", operation);
            return Ok(());
        };
        let entry = maybe_get::<&Dictionary>(doc, resources, b"XObject")
            .and_then(|xobject| xobject.get(name).ok());
        let Some(xf) = entry.and_then(|o| <&Stream>::from_obj(doc, o)) else {
            warn!("xobject {} not found", pdf_to_utf8(name));
            return Ok(());
        };
        if maybe_get_name(doc, &xf.dict, b"Subtype") != Some(b"Form".as_slice()) {
            return Ok(());
        }
        if depth >= MAX_FORM_DEPTH {
            warn!("form xobject {} nested too deeply, skipping", pdf_to_utf8(name));
            return Ok(());
        }
        let id = match entry {
            Some(&Object::Reference(id)) => Some(id),
            _ => None,
        };
        if let Some(id) = id {
            if !self.painting.insert(id) {
                warn!("form xobject {} paints itself, skipping", pdf_to_utf8(name));
                return Ok(());
            }
        }

        let form_resources = maybe_get::<&Dictionary>(doc, &xf.dict, b"Resources").unwrap_or(resources);
        let mut form_gs = gs.clone();
        if let Some(matrix) = maybe_get_array(doc, &xf.dict, b"Matrix").and_then(|m| operand_matrix(m)) {
            form_gs.ctm = matrix.then(&form_gs.ctm);
        }
        let contents = get_contents(xf);

        output.begin(ContainerKind::Form);
        let result = self.process_stream(
            doc,
            &contents,
            form_resources,
            &mut form_gs,
            output,
            page_index,
            depth + 1,
        );
        if let Some(id) = id {
            self.painting.remove(&id);
        }
        result?;
        output.end(ContainerKind::Form);
        Ok(())
    }
}
