//! Fold region computation.
//!
//! Two passes over the tree: the first collects block regions (lists,
//! paragraphs, tables, block quotes, code fences), the second adds one
//! region per header covering its whole section.

use crate::error::MalformedRangeError;
use crate::line_index::LineNumbers;
use crate::placeholder::PlaceholderKind;
use crate::section::{SectionEnd, scan_section};
use crate::tree::{Document, NodeId, NodeKind, TextRange};
use crate::walker::{Visitor, Walk, walk};
use serde::Serialize;

/// A collapsible range of the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FoldRegion {
    /// Node the region was computed for
    pub node: NodeId,
    /// May extend past the node itself (header sections)
    pub range: TextRange,
    pub placeholder: PlaceholderKind,
}

/// Compute every fold region of `doc`, block regions first, then header sections.
///
/// Regions spanning a single line are dropped. A range the line service
/// rejects only drops that region.
pub fn compute_fold_regions(doc: &Document, lines: &dyn LineNumbers) -> Vec<FoldRegion> {
    let mut blocks = BlockRegions {
        sink: RegionSink::new(lines),
    };
    walk(doc, doc.root(), &mut blocks);

    let mut headers = HeaderRegions { sink: blocks.sink };
    walk(doc, doc.root(), &mut headers);

    log::debug!("computed {} fold regions", headers.sink.regions.len());
    headers.sink.regions
}

/// Regions are never collapsed until the user asks for it
pub fn is_collapsed_by_default(_region: &FoldRegion) -> bool {
    false
}

/// Range owned by `header`: from its start to the last non-blank node before
/// the next header of the same or a higher level (or the end of the document).
///
/// Returns `None` if `header` is not a header or its section is empty.
pub fn header_section_range(doc: &Document, header: NodeId) -> Option<TextRange> {
    if !doc.kind(header).is_header() {
        return None;
    }

    let end_node = match scan_section(doc, header).end {
        SectionEnd::Boundary(boundary) => skip_line_breaks_backward(doc, boundary),
        SectionEnd::DocumentEnd => {
            let last = doc.last_child(doc.root())?;
            if doc.kind(last) == NodeKind::EndOfLine {
                skip_line_breaks_backward(doc, last)
            } else {
                Some(last)
            }
        }
    };

    let Some(end_node) = end_node else {
        log::trace!("header {header:?} has an empty section");
        return None;
    };

    let start = doc.range(header).start;
    let end = doc.range(end_node).end;
    (end > start).then(|| TextRange::new(start, end))
}

/// Nearest previous sibling of `node` that is not a line break
fn skip_line_breaks_backward(doc: &Document, node: NodeId) -> Option<NodeId> {
    let mut current = doc.prev_sibling(node);
    while let Some(sibling) = current {
        if doc.kind(sibling) != NodeKind::EndOfLine {
            return Some(sibling);
        }
        current = doc.prev_sibling(sibling);
    }
    None
}

/// Whether `range` covers at least two lines; the end offset is exclusive
fn spans_multiple_lines(lines: &dyn LineNumbers, range: TextRange) -> Result<bool, MalformedRangeError> {
    if range.is_empty() {
        return Ok(false);
    }
    Ok(lines.line_number(range.start)? != lines.line_number(range.end - 1)?)
}

struct RegionSink<'a> {
    lines: &'a dyn LineNumbers,
    regions: Vec<FoldRegion>,
}

impl<'a> RegionSink<'a> {
    fn new(lines: &'a dyn LineNumbers) -> Self {
        Self {
            lines,
            regions: Vec::new(),
        }
    }

    fn add(&mut self, doc: &Document, node: NodeId, range: TextRange) {
        match spans_multiple_lines(self.lines, range) {
            Ok(true) => self.regions.push(FoldRegion {
                node,
                range,
                placeholder: PlaceholderKind::for_kind(doc.kind(node)),
            }),
            Ok(false) => {}
            Err(err) => log::debug!("skipping fold region for {node:?}: {err}"),
        }
    }

    fn add_node(&mut self, doc: &Document, node: NodeId) {
        self.add(doc, node, doc.range(node));
    }
}

struct BlockRegions<'a> {
    sink: RegionSink<'a>,
}

impl Visitor for BlockRegions<'_> {
    fn visit_list(&mut self, doc: &Document, id: NodeId) -> Walk {
        self.sink.add_node(doc, id);
        Walk::Descend
    }

    fn visit_paragraph(&mut self, doc: &Document, id: NodeId) -> Walk {
        // A lone paragraph in a block quote folds together with the quote
        if let Some(parent) = doc.parent(id)
            && doc.kind(parent) == NodeKind::BlockQuote
            && paragraph_count(doc, parent) <= 1
        {
            return Walk::Skip;
        }
        self.sink.add_node(doc, id);
        Walk::Descend
    }

    fn visit_table(&mut self, doc: &Document, id: NodeId) -> Walk {
        self.sink.add_node(doc, id);
        Walk::Descend
    }

    fn visit_block_quote(&mut self, doc: &Document, id: NodeId) -> Walk {
        self.sink.add_node(doc, id);
        Walk::Descend
    }

    fn visit_code_fence(&mut self, doc: &Document, id: NodeId) -> Walk {
        self.sink.add_node(doc, id);
        Walk::Descend
    }
}

fn paragraph_count(doc: &Document, node: NodeId) -> usize {
    doc.descendants(node)
        .into_iter()
        .filter(|&id| doc.kind(id) == NodeKind::Paragraph)
        .count()
}

struct HeaderRegions<'a> {
    sink: RegionSink<'a>,
}

impl Visitor for HeaderRegions<'_> {
    fn visit_header(&mut self, doc: &Document, id: NodeId) -> Walk {
        if let Some(range) = header_section_range(doc, id) {
            self.sink.add(doc, id, range);
        }
        Walk::Descend
    }
}
