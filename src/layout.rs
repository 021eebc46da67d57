use tracing::debug;

use crate::types::{ContainerKind, GlyphRecord, LayoutNode};

/// Receives content-stream events from the processor and assembles the
/// page's layout tree.
///
/// Content streams do not always nest marked content and text objects
/// properly, so closing a container also closes anything opened inside it,
/// and closing a container that is not open is ignored.
#[derive(Debug, Default)]
pub(crate) struct LayoutBuilder {
    root: Vec<LayoutNode>,
    open: Vec<(ContainerKind, Vec<LayoutNode>)>,
    glyph_count: usize,
}

impl LayoutBuilder {
    pub(crate) fn new() -> LayoutBuilder {
        LayoutBuilder::default()
    }

    fn children_mut(&mut self) -> &mut Vec<LayoutNode> {
        match self.open.last_mut() {
            Some((_, children)) => children,
            None => &mut self.root,
        }
    }

    fn close_top(&mut self) {
        if let Some((kind, children)) = self.open.pop() {
            if !children.is_empty() {
                self.children_mut()
                    .push(LayoutNode::Container { kind, children });
            }
        }
    }

    pub(crate) fn begin(&mut self, kind: ContainerKind) {
        self.open.push((kind, Vec::new()));
    }

    pub(crate) fn end(&mut self, kind: ContainerKind) {
        match self.open.iter().rposition(|(k, _)| *k == kind) {
            Some(pos) => {
                while self.open.len() > pos {
                    self.close_top();
                }
            }
            None => debug!("end of {:?} without a matching begin", kind),
        }
    }

    /// Close the current text line, if the innermost container is one.
    pub(crate) fn end_line(&mut self) {
        if let Some((ContainerKind::TextLine, _)) = self.open.last() {
            self.close_top();
        }
    }

    pub(crate) fn output_glyph(&mut self, glyph: GlyphRecord) {
        if let Some((ContainerKind::TextObject, _)) = self.open.last() {
            self.begin(ContainerKind::TextLine);
        }
        self.glyph_count += 1;
        self.children_mut().push(LayoutNode::Glyph(glyph));
    }

    pub(crate) fn glyph_count(&self) -> usize {
        self.glyph_count
    }

    pub(crate) fn into_nodes(mut self) -> Vec<LayoutNode> {
        while !self.open.is_empty() {
            self.close_top();
        }
        self.root
    }
}
