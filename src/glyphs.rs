//! Flattening of a page layout tree into a plain glyph sequence.

use std::iter::FusedIterator;
use std::slice::Iter;

use crate::types::{GlyphRecord, LayoutNode, PageLayout};

/// Depth-first iterator over the glyph leaves of a layout tree.
///
/// Containers of every kind are entered transparently. The traversal keeps
/// an explicit stack of child iterators, so deeply nested form XObjects do
/// not recurse on the call stack. Cloning the iterator restarts nothing: the
/// clone continues from the same position independently.
#[derive(Debug, Clone)]
pub struct Glyphs<'a> {
    stack: Vec<Iter<'a, LayoutNode>>,
}

impl<'a> Glyphs<'a> {
    pub fn new(nodes: &'a [LayoutNode]) -> Self {
        Glyphs {
            stack: vec![nodes.iter()],
        }
    }
}

impl<'a> Iterator for Glyphs<'a> {
    type Item = &'a GlyphRecord;

    fn next(&mut self) -> Option<&'a GlyphRecord> {
        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                Some(LayoutNode::Glyph(glyph)) => return Some(glyph),
                Some(LayoutNode::Container { children, .. }) => {
                    self.stack.push(children.iter());
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

impl FusedIterator for Glyphs<'_> {}

/// Anything that can hand out a fresh pass over a page's glyphs.
///
/// The classifier scans its source twice, so every call to `glyphs` must
/// start again from the first glyph.
pub trait GlyphSource {
    fn glyphs(&self) -> impl Iterator<Item = &GlyphRecord>;
}

impl GlyphSource for PageLayout {
    fn glyphs(&self) -> impl Iterator<Item = &GlyphRecord> {
        PageLayout::glyphs(self)
    }
}

impl GlyphSource for [LayoutNode] {
    fn glyphs(&self) -> impl Iterator<Item = &GlyphRecord> {
        Glyphs::new(self)
    }
}

impl GlyphSource for [GlyphRecord] {
    fn glyphs(&self) -> impl Iterator<Item = &GlyphRecord> {
        self.iter()
    }
}

impl GlyphSource for Vec<GlyphRecord> {
    fn glyphs(&self) -> impl Iterator<Item = &GlyphRecord> {
        self.iter()
    }
}
