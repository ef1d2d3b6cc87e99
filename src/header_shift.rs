//! Raising and lowering header levels.
//!
//! Levels wrap modulo 7: shifting past level 6 (or below level 1) turns a
//! header back into plain text, and shifting plain text creates a header.
//! Each target is handled on its own; a target that cannot be resolved is
//! skipped without affecting the others.

use crate::error::ShiftError;
use crate::heading::HeaderRecord;
use crate::line_index::LineNumbers;
use crate::tree::{Document, NodeId, NodeKind, TextRange};
use serde::Serialize;
use std::collections::HashSet;

/// How a level changes
#[derive(Debug, Clone, Copy)]
pub enum LevelShift {
    Increase,
    Decrease,
    /// Any level function; the result is reduced modulo 7
    Custom(fn(i32) -> i32),
}

impl LevelShift {
    pub fn apply(self, level: i32) -> i32 {
        match self {
            LevelShift::Increase => level + 1,
            LevelShift::Decrease => level - 1,
            LevelShift::Custom(f) => f(level),
        }
    }
}

/// Replace `range` of the source with `replacement`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextEdit {
    pub range: TextRange,
    pub replacement: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShiftOutcome {
    Applied { node: NodeId, edit: TextEdit },
    Skipped(ShiftError),
}

impl ShiftOutcome {
    pub fn edit(&self) -> Option<&TextEdit> {
        match self {
            ShiftOutcome::Applied { edit, .. } => Some(edit),
            ShiftOutcome::Skipped(_) => None,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, ShiftOutcome::Applied { .. })
    }
}

/// A caret, or a selection when `start != end`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caret {
    pub start: usize,
    pub end: usize,
}

impl Caret {
    pub fn at(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    pub fn selection(start: usize, end: usize) -> Self {
        Self {
            start: start.min(end),
            end: start.max(end),
        }
    }
}

/// Compute the replacement for one target.
///
/// A target inside a header rewrites the header; a paragraph or text run
/// without a header becomes a new ATX header.
pub fn shift_header_level(doc: &Document, node: NodeId, shift: LevelShift) -> Result<(NodeId, TextEdit), ShiftError> {
    if let Some(header) = doc.ancestor_matching(node, NodeKind::is_header) {
        let record = HeaderRecord::from_node(doc, header).ok_or(ShiftError::NotATextBlock(header))?;
        let level = shift.apply(i32::from(record.level)).rem_euclid(7) as usize;
        let edit = TextEdit {
            range: doc.range(header),
            replacement: render_header(&record, level),
        };
        return Ok((header, edit));
    }

    match doc.kind(node) {
        NodeKind::Paragraph | NodeKind::Text => {
            let text = doc.text(node);
            let level = shift.apply(0).rem_euclid(7) as usize;
            let replacement = if level == 0 {
                text.to_string()
            } else {
                atx(level, text)
            };
            Ok((
                node,
                TextEdit {
                    range: doc.range(node),
                    replacement,
                },
            ))
        }
        _ => Err(ShiftError::NotATextBlock(node)),
    }
}

fn render_header(record: &HeaderRecord, level: usize) -> String {
    match level {
        0 => record.name.clone(),
        1 | 2 if record.is_setext => {
            let marker = if level == 1 { "=" } else { "-" };
            let width = record
                .underline_len
                .unwrap_or_else(|| record.name.chars().count())
                .max(1);
            let prefix = record.underline_prefix.as_deref().unwrap_or_default();
            format!("{}\n{prefix}{}", record.name, marker.repeat(width))
        }
        _ => atx(level, &record.name),
    }
}

fn atx(level: usize, text: &str) -> String {
    format!("{} {}", "#".repeat(level), text)
}

/// Shift every target; one outcome per target, in input order
pub fn shift_header_levels(doc: &Document, targets: &[(NodeId, LevelShift)]) -> Vec<ShiftOutcome> {
    let mut edited = HashSet::new();
    targets
        .iter()
        .map(|&(node, shift)| match shift_header_level(doc, node, shift) {
            Ok((target, _)) if !edited.insert(target) => ShiftOutcome::Skipped(ShiftError::DuplicateTarget(target)),
            Ok((target, edit)) => ShiftOutcome::Applied { node: target, edit },
            Err(err) => {
                log::debug!("skipping level shift for {node:?}: {err}");
                ShiftOutcome::Skipped(err)
            }
        })
        .collect()
}

/// Resolve each caret to its target and shift it.
pub fn shift_carets(doc: &Document, lines: &dyn LineNumbers, carets: &[Caret], shift: LevelShift) -> Vec<ShiftOutcome> {
    let mut resolved = Vec::with_capacity(carets.len());
    let mut failures = Vec::new();
    for (idx, caret) in carets.iter().enumerate() {
        match resolve_caret(doc, lines, *caret) {
            Ok(node) => resolved.push((idx, node)),
            Err(err) => {
                log::debug!("caret {caret:?} has no target: {err}");
                failures.push((idx, err));
            }
        }
    }

    let targets: Vec<(NodeId, LevelShift)> = resolved.iter().map(|&(_, node)| (node, shift)).collect();
    let mut outcomes: Vec<Option<ShiftOutcome>> = vec![None; carets.len()];
    for ((idx, _), outcome) in resolved.iter().zip(shift_header_levels(doc, &targets)) {
        outcomes[*idx] = Some(outcome);
    }
    for (idx, err) in failures {
        outcomes[idx] = Some(ShiftOutcome::Skipped(err));
    }
    outcomes.into_iter().flatten().collect()
}

/// Find the paragraph or header a caret or selection refers to.
///
/// Paragraphs are only accepted when they fit on a single line.
pub fn resolve_caret(doc: &Document, lines: &dyn LineNumbers, caret: Caret) -> Result<NodeId, ShiftError> {
    let (first, second) = nodes_under_caret(doc, caret)?;

    let leaves = doc.leaves();
    let first = if doc.kind(first) == NodeKind::EndOfLine {
        next_visible_leaf(doc, &leaves, first)
    } else {
        Some(first)
    };
    let second = if doc.kind(second) == NodeKind::EndOfLine {
        prev_visible_leaf(doc, &leaves, second)
    } else {
        Some(second)
    };

    let (Some(first), Some(second)) = (first, second) else {
        return Err(ShiftError::InvertedSelection);
    };
    if doc.range(first).start > doc.range(second).start {
        return Err(ShiftError::InvertedSelection);
    }

    let common = doc.common_ancestor(first, second);
    let target = doc
        .ancestor_matching(common, |kind| kind == NodeKind::Paragraph || kind.is_header())
        .ok_or(ShiftError::NoStructuralAncestor)?;

    if doc.kind(target) != NodeKind::Paragraph {
        return Ok(target);
    }

    let range = doc.range(target);
    let start_line = lines.line_number(range.start)?;
    let end_line = lines.line_number(range.end)?;
    if start_line == end_line {
        Ok(target)
    } else {
        Err(ShiftError::MultiLineParagraph { start_line, end_line })
    }
}

fn nodes_under_caret(doc: &Document, caret: Caret) -> Result<(NodeId, NodeId), ShiftError> {
    if caret.start == caret.end {
        let node = node_at_caret(doc, caret.start)?;
        return Ok((node, node));
    }
    let first = doc.node_at(caret.start).ok_or(ShiftError::NoNodeAtOffset(caret.start))?;
    let last = caret.end - 1;
    let second = doc.node_at(last).ok_or(ShiftError::NoNodeAtOffset(last))?;
    Ok((first, second))
}

/// A caret at a line break (or the end of the text) belongs to the character before it
fn node_at_caret(doc: &Document, offset: usize) -> Result<NodeId, ShiftError> {
    let at = doc.node_at(offset);
    match at {
        Some(node) if doc.kind(node) != NodeKind::EndOfLine => Ok(node),
        _ => offset
            .checked_sub(1)
            .and_then(|prev| doc.node_at(prev))
            .or(at)
            .ok_or(ShiftError::NoNodeAtOffset(offset)),
    }
}

fn next_visible_leaf(doc: &Document, leaves: &[NodeId], node: NodeId) -> Option<NodeId> {
    let position = leaves.iter().position(|&leaf| leaf == node)?;
    leaves[position + 1..]
        .iter()
        .copied()
        .find(|&leaf| doc.kind(leaf) != NodeKind::EndOfLine)
}

fn prev_visible_leaf(doc: &Document, leaves: &[NodeId], node: NodeId) -> Option<NodeId> {
    let position = leaves.iter().position(|&leaf| leaf == node)?;
    leaves[..position]
        .iter()
        .rev()
        .copied()
        .find(|&leaf| doc.kind(leaf) != NodeKind::EndOfLine)
}

/// Apply non-overlapping edits to `source` in one pass, producing the new text.
///
/// An edit overlapping an earlier one (or running past the end) is dropped.
pub fn apply_edits<'e>(source: &str, edits: impl IntoIterator<Item = &'e TextEdit>) -> String {
    let mut sorted: Vec<&TextEdit> = edits.into_iter().collect();
    sorted.sort_by_key(|edit| (edit.range.start, edit.range.end));

    let mut result = String::with_capacity(source.len());
    let mut cursor = 0;
    for edit in sorted {
        if edit.range.start < cursor || edit.range.end > source.len() || edit.range.end < edit.range.start {
            log::warn!(
                "dropping edit at {}..{}: overlaps a previous edit or leaves the text",
                edit.range.start,
                edit.range.end
            );
            continue;
        }
        result.push_str(&source[cursor..edit.range.start]);
        result.push_str(&edit.replacement);
        cursor = edit.range.end;
    }
    result.push_str(&source[cursor..]);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line_index::LineIndex;
    use crate::parse::parse_document;
    use pretty_assertions::assert_eq;

    fn shift_first(content: &str, kind: fn(NodeKind) -> bool, shift: LevelShift) -> Result<String, ShiftError> {
        let doc = parse_document(content).unwrap();
        let node = doc
            .descendants(doc.root())
            .into_iter()
            .find(|&id| kind(doc.kind(id)))
            .unwrap();
        let (_, edit) = shift_header_level(&doc, node, shift)?;
        Ok(apply_edits(content, [&edit]))
    }

    #[test]
    fn test_increase_atx() {
        let result = shift_first("## Title\n", NodeKind::is_header, LevelShift::Increase).unwrap();
        assert_eq!(result, "### Title\n");
    }

    #[test]
    fn test_level_six_wraps_to_text() {
        let result = shift_first("###### Deep\n", NodeKind::is_header, LevelShift::Increase).unwrap();
        assert_eq!(result, "Deep\n");
    }

    #[test]
    fn test_level_one_decrease_to_text() {
        let result = shift_first("# Top\n", NodeKind::is_header, LevelShift::Decrease).unwrap();
        assert_eq!(result, "Top\n");
    }

    #[test]
    fn test_paragraph_becomes_header() {
        let is_paragraph = |kind: NodeKind| kind == NodeKind::Paragraph;
        assert_eq!(shift_first("plain\n", is_paragraph, LevelShift::Increase).unwrap(), "# plain\n");
        assert_eq!(shift_first("plain\n", is_paragraph, LevelShift::Decrease).unwrap(), "###### plain\n");
    }

    #[test]
    fn test_custom_zero_level_keeps_text() {
        let is_paragraph = |kind: NodeKind| kind == NodeKind::Paragraph;
        let result = shift_first("plain\n", is_paragraph, LevelShift::Custom(|_| 7)).unwrap();
        assert_eq!(result, "plain\n");
    }

    #[test]
    fn test_custom_extreme_levels_do_not_overflow() {
        let is_paragraph = |kind: NodeKind| kind == NodeKind::Paragraph;
        let result = shift_first("plain\n", is_paragraph, LevelShift::Custom(|_| i32::MAX)).unwrap();
        assert_eq!(result, "# plain\n");

        let result = shift_first("plain\n", is_paragraph, LevelShift::Custom(|_| i32::MIN)).unwrap();
        assert_eq!(result, "##### plain\n");
    }

    #[test]
    fn test_setext_round_trip_styles() {
        let result = shift_first("Title\n=======\n", NodeKind::is_header, LevelShift::Increase).unwrap();
        assert_eq!(result, "Title\n-------\n");

        let result = shift_first("Title\n---\n", NodeKind::is_header, LevelShift::Decrease).unwrap();
        assert_eq!(result, "Title\n===\n");

        let result = shift_first("Title\n---\n", NodeKind::is_header, LevelShift::Increase).unwrap();
        assert_eq!(result, "### Title\n");
    }

    #[test]
    fn test_code_fence_is_not_a_target() {
        let doc = parse_document("```\ncode\n```\n").unwrap();
        let fence = doc.first_child(doc.root()).unwrap();
        assert_eq!(
            shift_header_level(&doc, fence, LevelShift::Increase).unwrap_err(),
            ShiftError::NotATextBlock(fence)
        );
    }

    #[test]
    fn test_duplicate_targets_are_skipped() {
        let doc = parse_document("# A\n").unwrap();
        let header = doc.first_child(doc.root()).unwrap();
        let text = doc.first_child(header).unwrap();
        let outcomes = shift_header_levels(&doc, &[(header, LevelShift::Increase), (text, LevelShift::Increase)]);
        assert!(outcomes[0].is_applied());
        assert_eq!(outcomes[1], ShiftOutcome::Skipped(ShiftError::DuplicateTarget(header)));
    }

    #[test]
    fn test_resolve_caret_on_line_end() {
        let content = "# A\n\ntext\n";
        let doc = parse_document(content).unwrap();
        let lines = LineIndex::new(content);
        let target = resolve_caret(&doc, &lines, Caret::at(3)).unwrap();
        assert!(doc.kind(target).is_header());
    }

    #[test]
    fn test_resolve_caret_on_blank_line_fails() {
        let content = "# A\n\n\ntext\n";
        let doc = parse_document(content).unwrap();
        let lines = LineIndex::new(content);
        assert_eq!(
            resolve_caret(&doc, &lines, Caret::at(5)),
            Err(ShiftError::InvertedSelection)
        );
    }

    #[test]
    fn test_resolve_multi_line_paragraph_fails() {
        let content = "one\ntwo\n";
        let doc = parse_document(content).unwrap();
        let lines = LineIndex::new(content);
        assert_eq!(
            resolve_caret(&doc, &lines, Caret::at(1)),
            Err(ShiftError::MultiLineParagraph {
                start_line: 0,
                end_line: 1
            })
        );
    }

    #[test]
    fn test_apply_edits_drops_overlaps() {
        let edits = [
            TextEdit {
                range: TextRange::new(0, 3),
                replacement: "xyz".to_string(),
            },
            TextEdit {
                range: TextRange::new(2, 4),
                replacement: "!".to_string(),
            },
            TextEdit {
                range: TextRange::new(5, 6),
                replacement: "F".to_string(),
            },
        ];
        assert_eq!(apply_edits("abcdef", &edits), "xyzdeF");
    }
}
