pub mod config;
pub mod error;
pub mod folding;
pub mod header_shift;
pub mod heading;
pub mod line_index;
pub mod outline;
pub mod parse;
pub mod placeholder;
pub mod section;
pub mod tree;
pub mod walker;

pub use crate::config::{Config, ConfigError};
pub use crate::error::{MalformedRangeError, ShiftError, TreeError};
pub use crate::folding::{FoldRegion, compute_fold_regions, header_section_range, is_collapsed_by_default};
pub use crate::header_shift::{
    Caret, LevelShift, ShiftOutcome, TextEdit, apply_edits, resolve_caret, shift_carets, shift_header_level,
    shift_header_levels,
};
pub use crate::heading::HeaderRecord;
pub use crate::line_index::{LineIndex, LineNumbers};
pub use crate::outline::{ItemPresentation, MarkdownPresentation, OutlineNode, PresentationProvider, build_outline};
pub use crate::parse::parse_document;
pub use crate::placeholder::{DisplayNames, Labeler, PlaceholderKind};
pub use crate::tree::{Document, HeaderStyle, ListKind, NodeId, NodeKind, TextRange};

/// Placeholder shown for a collapsed `region`
pub fn placeholder_text(doc: &Document, region: &FoldRegion, labeler: &Labeler) -> String {
    labeler.placeholder_text(doc, region)
}

/// Parse `content` and compute its fold regions with a fresh line index
pub fn fold_markdown(content: &str) -> Result<(Document, Vec<FoldRegion>), TreeError> {
    let doc = parse_document(content)?;
    let lines = LineIndex::new(content);
    let regions = compute_fold_regions(&doc, &lines);
    Ok((doc, regions))
}
