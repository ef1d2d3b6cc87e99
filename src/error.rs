//! Error types shared by the analysis passes.

use crate::tree::NodeId;

/// An offset handed to the line service lies outside the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("offset {offset} is outside the document (length {len})")]
pub struct MalformedRangeError {
    pub offset: usize,
    pub len: usize,
}

/// Violations of the tree invariants, reported by [`crate::tree::TreeBuilder`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// `finish_node` was called without a matching `start_node`, or nodes were left open
    #[error("unbalanced tree: {0}")]
    Unbalanced(&'static str),

    /// A range ends before it starts or runs past the end of the source
    #[error("range {start}..{end} is invalid for a source of length {len}")]
    InvalidRange { start: usize, end: usize, len: usize },

    /// A child range is not contained in its parent's range
    #[error("node at {start}..{end} escapes its parent {parent_start}..{parent_end}")]
    OutsideParent {
        start: usize,
        end: usize,
        parent_start: usize,
        parent_end: usize,
    },

    /// A child starts before its previous sibling ends
    #[error("node at {start} overlaps its previous sibling ending at {previous_end}")]
    OverlappingSiblings { start: usize, previous_end: usize },
}

/// Why a level-shift target was skipped.
///
/// Skips are per target: the remaining carets of a batch still apply.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShiftError {
    /// No node covers the caret or selection edge
    #[error("no node at offset {0}")]
    NoNodeAtOffset(usize),

    /// After skipping line breaks the selection start lies after its end
    #[error("selection collapses to nothing after skipping line breaks")]
    InvertedSelection,

    /// The selection has no common paragraph or header ancestor
    #[error("selection is not inside a paragraph or header")]
    NoStructuralAncestor,

    /// Multi-line paragraphs are never turned into headers
    #[error("paragraph spans lines {start_line}..={end_line}")]
    MultiLineParagraph { start_line: usize, end_line: usize },

    /// The target node is neither a header nor a text block
    #[error("node {0:?} is not a header or text block")]
    NotATextBlock(NodeId),

    /// Another target of the same batch already rewrote this node
    #[error("node {0:?} is already edited in this batch")]
    DuplicateTarget(NodeId),

    #[error(transparent)]
    MalformedRange(#[from] MalformedRangeError),
}
