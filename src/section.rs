//! Section scanning shared by folding and the outline.
//!
//! A header's section runs over its following siblings until a header of the
//! same or a higher level. Lists, list items and block quotes are
//! transparent: headers nested inside them still count as child headers.

use crate::tree::{Document, NodeId, NodeKind};

/// Where a section stops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionEnd {
    /// The next header at the same or a higher level
    Boundary(NodeId),
    DocumentEnd,
}

/// Result of scanning one node's section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionScan {
    /// Headers directly below the scanned node in the outline, in document order
    pub children: Vec<NodeId>,
    pub end: SectionEnd,
}

/// Scan the section owned by `node`.
///
/// * root: its children, with no level restriction
/// * header: its following siblings, stopping at a header of level <= its own;
///   when the container runs out the search climbs into the ancestors
/// * anything else: its own children, with no level restriction
pub fn scan_section(doc: &Document, node: NodeId) -> SectionScan {
    let mut children = Vec::new();

    let Some(level) = doc.kind(node).header_level() else {
        collect_children(doc, doc.children(node), &mut children);
        return SectionScan {
            children,
            end: SectionEnd::DocumentEnd,
        };
    };

    let mut from = node;
    let mut collecting = true;
    loop {
        let siblings = doc.following_siblings(from);
        let found = if collecting {
            scan_siblings(doc, siblings, Some(level), &mut children)
        } else {
            find_boundary(doc, siblings, level)
        };

        if let Some(boundary) = found {
            return SectionScan {
                children,
                end: SectionEnd::Boundary(boundary),
            };
        }

        // Only the header's own container contributes children
        collecting = false;
        match doc.parent(from) {
            Some(container) if container != doc.root() => from = container,
            _ => {
                log::trace!("section of {node:?} runs to the end of the document");
                return SectionScan {
                    children,
                    end: SectionEnd::DocumentEnd,
                };
            }
        }
    }
}

fn collect_children(doc: &Document, siblings: &[NodeId], children: &mut Vec<NodeId>) {
    scan_siblings(doc, siblings, None, children);
}

/// Walk `siblings` collecting child headers; returns the boundary header if one is met
fn scan_siblings(
    doc: &Document,
    siblings: &[NodeId],
    restriction: Option<u8>,
    children: &mut Vec<NodeId>,
) -> Option<NodeId> {
    let mut max_level: Option<u8> = None;

    for &sibling in siblings {
        let kind = doc.kind(sibling);
        if kind.is_transparent_container() && kind != NodeKind::Document {
            if max_level.is_none() {
                collect_children(doc, doc.children(sibling), children);
            }
            continue;
        }

        let Some(level) = kind.header_level() else {
            continue;
        };

        if restriction.is_some_and(|limit| level <= limit) {
            return Some(sibling);
        }

        if max_level.is_none_or(|max| level <= max) {
            max_level = Some(level);
            children.push(sibling);
        }
    }

    None
}

fn find_boundary(doc: &Document, siblings: &[NodeId], limit: u8) -> Option<NodeId> {
    siblings
        .iter()
        .copied()
        .find(|&sibling| doc.kind(sibling).header_level().is_some_and(|level| level <= limit))
}
