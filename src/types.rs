use std::fmt;

use euclid::Transform2D;

use crate::glyphs::Glyphs;

pub struct Space;
pub type Transform = Transform2D<f32, Space, Space>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaBox {
    pub llx: f32,
    pub lly: f32,
    pub urx: f32,
    pub ury: f32,
}

impl MediaBox {
    /// US Letter, used when a page carries no MediaBox at all.
    pub const LETTER: MediaBox = MediaBox {
        llx: 0.,
        lly: 0.,
        urx: 612.,
        ury: 792.,
    };
}

/// One rendered character code: its effective size in points and the name
/// of the font it was drawn with.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphRecord {
    pub size: f64,
    pub fontname: String,
}

impl GlyphRecord {
    pub fn new(size: f64, fontname: impl Into<String>) -> Self {
        GlyphRecord {
            size,
            fontname: fontname.into(),
        }
    }
}

impl fmt::Display for GlyphRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {:.2}pt", self.fontname, self.size)
    }
}

/// Which content-stream construct opened a container node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    /// A `BT` .. `ET` block.
    TextObject,
    /// Glyphs shown between two line-positioning operators.
    TextLine,
    /// A `BMC`/`BDC` .. `EMC` sequence.
    MarkedContent,
    /// A form XObject painted with `Do`.
    Form,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayoutNode {
    Glyph(GlyphRecord),
    Container {
        kind: ContainerKind,
        children: Vec<LayoutNode>,
    },
}

impl LayoutNode {
    pub fn container(kind: ContainerKind, children: Vec<LayoutNode>) -> Self {
        LayoutNode::Container { kind, children }
    }

    /// Flatten this node into its glyphs, in document order.
    pub fn glyphs(&self) -> Glyphs<'_> {
        Glyphs::new(std::slice::from_ref(self))
    }
}

impl From<GlyphRecord> for LayoutNode {
    fn from(glyph: GlyphRecord) -> Self {
        LayoutNode::Glyph(glyph)
    }
}

/// The decoded layout of a single page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    pub page_index: usize,
    pub media_box: MediaBox,
    pub nodes: Vec<LayoutNode>,
}

impl PageLayout {
    pub fn new(page_index: usize, media_box: MediaBox, nodes: Vec<LayoutNode>) -> Self {
        PageLayout {
            page_index,
            media_box,
            nodes,
        }
    }

    /// A fresh depth-first traversal over every glyph on the page.
    pub fn glyphs(&self) -> Glyphs<'_> {
        Glyphs::new(&self.nodes)
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs().next().is_none()
    }
}
