//! Builds small single-font-per-run PDFs in memory for the integration tests.

#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream, StringFormat, dictionary};

pub const SANS: &str = "ABCDEF+LibertinusSans-Bold";
pub const SERIF: &str = "GHIJKL+LibertinusSerif-Regular";

#[derive(Clone, Copy, PartialEq)]
enum FontKind {
    Simple,
    Composite,
}

pub struct Fixture {
    fonts: Vec<(String, String, FontKind)>,
    operations: Vec<Operation>,
    form_operations: Vec<Operation>,
    form_paints_itself: usize,
    extra_pages: usize,
    next_y: i64,
}

pub fn name(s: &str) -> Object {
    Object::Name(s.as_bytes().to_vec())
}

fn text_object(bytes: Vec<u8>, resource: &str, size: f32, tm: Option<[f32; 4]>, y: i64) -> Vec<Operation> {
    let position = match tm {
        Some([a, b, c, d]) => Operation::new(
            "Tm",
            vec![a.into(), b.into(), c.into(), d.into(), Object::Integer(72), y.into()],
        ),
        None => Operation::new("Td", vec![Object::Integer(72), y.into()]),
    };
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![name(resource), Object::Real(size)]),
        position,
        Operation::new("Tj", vec![Object::String(bytes, StringFormat::Hexadecimal)]),
        Operation::new("ET", vec![]),
    ]
}

impl Fixture {
    pub fn new() -> Self {
        Fixture {
            fonts: Vec::new(),
            operations: Vec::new(),
            form_operations: Vec::new(),
            form_paints_itself: 0,
            extra_pages: 0,
            next_y: 800,
        }
    }

    /// The usual pairing: `/FH` Libertinus Sans, `/FB` Libertinus Serif,
    /// `/HB` Helvetica-Bold and `/HR` Helvetica.
    pub fn with_standard_fonts() -> Self {
        Fixture::new()
            .font("FH", SANS)
            .font("FB", SERIF)
            .font("HB", "Helvetica-Bold")
            .font("HR", "Helvetica")
    }

    pub fn font(mut self, resource: &str, base_font: &str) -> Self {
        self.fonts
            .push((resource.into(), base_font.into(), FontKind::Simple));
        self
    }

    /// A Type0 font with `Identity-H` encoding: two bytes per glyph.
    pub fn cid_font(mut self, resource: &str, font_name: &str) -> Self {
        self.fonts
            .push((resource.into(), font_name.into(), FontKind::Composite));
        self
    }

    pub fn extra_pages(mut self, count: usize) -> Self {
        self.extra_pages = count;
        self
    }

    fn glyph_bytes(&self, resource: &str, count: usize) -> Vec<u8> {
        let kind = self
            .fonts
            .iter()
            .find(|(r, _, _)| r == resource)
            .map(|(_, _, k)| *k)
            .unwrap_or(FontKind::Simple);
        match kind {
            FontKind::Simple => (0..count).map(|i| b'a' + (i % 26) as u8).collect(),
            FontKind::Composite => (0..count).flat_map(|i| [0, 1 + (i % 200) as u8]).collect(),
        }
    }

    fn y(&mut self) -> i64 {
        let y = self.next_y;
        self.next_y -= 14;
        y
    }

    /// `count` glyphs of `resource` at `size` points.
    pub fn text(mut self, resource: &str, size: f32, count: usize) -> Self {
        let bytes = self.glyph_bytes(resource, count);
        let y = self.y();
        self.operations
            .extend(text_object(bytes, resource, size, None, y));
        self
    }

    /// `count` glyphs set with `Tf resource 1` and the size carried by the
    /// text matrix instead.
    pub fn scaled_text(mut self, resource: &str, size: f32, count: usize) -> Self {
        let bytes = self.glyph_bytes(resource, count);
        let y = self.y();
        self.operations.extend(text_object(
            bytes,
            resource,
            1.,
            Some([size, 0., 0., size]),
            y,
        ));
        self
    }

    /// Like [`Fixture::text`], wrapped in a `BDC`/`EMC` marked-content span.
    pub fn marked_text(mut self, resource: &str, size: f32, count: usize) -> Self {
        let bytes = self.glyph_bytes(resource, count);
        let y = self.y();
        self.operations.push(Operation::new(
            "BDC",
            vec![name("Span"), Object::Dictionary(Dictionary::new())],
        ));
        self.operations
            .extend(text_object(bytes, resource, size, None, y));
        self.operations.push(Operation::new("EMC", vec![]));
        self
    }

    /// Text drawn inside a form XObject painted once from the page, inside
    /// a marked-content span.
    pub fn form_text(mut self, resource: &str, size: f32, count: usize) -> Self {
        let bytes = self.glyph_bytes(resource, count);
        let y = self.y();
        self.form_operations
            .extend(text_object(bytes, resource, size, None, y));
        self
    }

    /// Make the form from [`Fixture::form_text`] list itself among its own
    /// XObject resources and paint itself `times` times after its text.
    pub fn form_paints_itself(mut self, times: usize) -> Self {
        self.form_paints_itself = times;
        self
    }

    /// Append operations to the page content as they are.
    pub fn raw(mut self, operations: impl IntoIterator<Item = Operation>) -> Self {
        self.operations.extend(operations);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut fonts = Dictionary::new();
        for (resource, base_font, kind) in &self.fonts {
            let id = match kind {
                FontKind::Simple => doc.add_object(dictionary! {
                    "Type" => "Font",
                    "Subtype" => "Type1",
                    "BaseFont" => name(base_font),
                }),
                FontKind::Composite => {
                    let descriptor = doc.add_object(dictionary! {
                        "Type" => "FontDescriptor",
                        "FontName" => name(base_font),
                    });
                    let descendant = doc.add_object(dictionary! {
                        "Type" => "Font",
                        "Subtype" => "CIDFontType2",
                        "BaseFont" => name(base_font),
                        "FontDescriptor" => descriptor,
                    });
                    doc.add_object(dictionary! {
                        "Type" => "Font",
                        "Subtype" => "Type0",
                        "BaseFont" => name(&format!("{base_font}-Identity-H")),
                        "Encoding" => "Identity-H",
                        "DescendantFonts" => vec![Object::Reference(descendant)],
                    })
                }
            };
            fonts.set(resource.as_str(), id);
        }

        let mut xobjects = Dictionary::new();
        let mut operations = self.operations.clone();
        if !self.form_operations.is_empty() {
            let mut form_operations = self.form_operations.clone();
            form_operations.extend((0..self.form_paints_itself).map(|_| Operation::new("Do", vec![name("Fm0")])));
            let form = Content {
                operations: form_operations,
            };
            let form_id = doc.new_object_id();
            let mut form_dict = dictionary! {
                "Type" => "XObject",
                "Subtype" => "Form",
                "BBox" => vec![Object::Integer(0), Object::Integer(0), Object::Integer(595), Object::Integer(842)],
            };
            if self.form_paints_itself > 0 {
                form_dict.set(
                    "Resources",
                    dictionary! {
                        "Font" => fonts.clone(),
                        "XObject" => dictionary! { "Fm0" => form_id },
                    },
                );
            }
            doc.objects.insert(
                form_id,
                Object::Stream(Stream::new(form_dict, form.encode().expect("encode form content"))),
            );
            xobjects.set("Fm0", form_id);
            operations.extend([
                Operation::new("BDC", vec![name("Figure"), Object::Dictionary(Dictionary::new())]),
                Operation::new("q", vec![]),
                Operation::new("Do", vec![name("Fm0")]),
                Operation::new("Q", vec![]),
                Operation::new("EMC", vec![]),
            ]);
        }

        let resources_id = doc.add_object(dictionary! {
            "Font" => fonts,
            "XObject" => xobjects,
        });

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode page content"),
        ));
        let mut kids = vec![Object::Reference(doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        }))];
        for _ in 0..self.extra_pages {
            let empty = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
            kids.push(Object::Reference(doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => empty,
            })));
        }

        // Resources and MediaBox live on the page tree and are inherited.
        let pages = dictionary! {
            "Type" => "Pages",
            "Count" => kids.len() as i64,
            "Kids" => kids,
            "Resources" => resources_id,
            "MediaBox" => vec![Object::Integer(0), Object::Integer(0), Object::Integer(595), Object::Integer(842)],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).expect("save fixture");
        bytes
    }

    pub fn write_to(&self, dir: &std::path::Path, file_name: &str) -> std::path::PathBuf {
        let path = dir.join(file_name);
        std::fs::write(&path, self.build()).expect("write fixture");
        path
    }
}

/// Heading and body text at 18pt and 10pt: `heading_total` heading glyphs of
/// which `heading_ok` are Libertinus Sans, `body_total` body glyphs of which
/// `body_ok` are Libertinus Serif.
pub fn two_role_page(heading_ok: usize, heading_total: usize, body_ok: usize, body_total: usize) -> Fixture {
    let mut fixture = Fixture::with_standard_fonts();
    if heading_ok > 0 {
        fixture = fixture.text("FH", 18., heading_ok);
    }
    if heading_total > heading_ok {
        fixture = fixture.text("HB", 18., heading_total - heading_ok);
    }
    if body_ok > 0 {
        fixture = fixture.text("FB", 10., body_ok);
    }
    if body_total > body_ok {
        fixture = fixture.text("HR", 10., body_total - body_ok);
    }
    fixture
}
