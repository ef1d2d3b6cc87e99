//! Builds a [`Document`] from Markdown source using pulldown-cmark.
//!
//! Block-level tags become nodes; inline markup is ignored. The text between
//! child blocks is tokenised into `Text` runs and `EndOfLine` tokens, which
//! is what the folding code relies on when it skips trailing blank lines.

use crate::error::TreeError;
use crate::tree::{Document, HeaderStyle, ListKind, NodeKind, TextRange, TreeBuilder};
use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag};

/// Block collected from the event stream before it is laid out in the arena
#[derive(Debug)]
struct PendingBlock {
    kind: NodeKind,
    range: TextRange,
    children: Vec<PendingBlock>,
}

/// Parse `source` into a node tree.
///
/// Block ranges are trimmed of trailing whitespace and clamped into their
/// parent, so the returned tree always satisfies the arena invariants.
pub fn parse_document(source: &str) -> Result<Document, TreeError> {
    let blocks = collect_blocks(source);
    let mut builder = TreeBuilder::new(source);
    emit_blocks(&mut builder, source, TextRange::new(0, source.len()), blocks)?;
    builder.finish()
}

fn collect_blocks(source: &str) -> Vec<PendingBlock> {
    let options =
        Options::ENABLE_TABLES | Options::ENABLE_FOOTNOTES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;

    let mut top_level = Vec::new();
    // One entry per open tag; `None` marks inline or table-internal tags
    let mut stack: Vec<Option<PendingBlock>> = Vec::new();

    for (event, range) in Parser::new_ext(source, options).into_offset_iter() {
        match event {
            Event::Start(tag) => {
                let block = block_kind(source, &tag, range.start).map(|kind| PendingBlock {
                    kind,
                    range: TextRange::new(range.start, range.end),
                    children: Vec::new(),
                });
                stack.push(block);
            }
            Event::End(_) => {
                if let Some(Some(mut block)) = stack.pop() {
                    block.range.end = trimmed_end(source, block.range);
                    attach(&mut stack, &mut top_level, block);
                }
            }
            Event::Rule => {
                let range = TextRange::new(range.start, range.end);
                let block = PendingBlock {
                    kind: NodeKind::OtherBlock,
                    range: TextRange::new(range.start, trimmed_end(source, range)),
                    children: Vec::new(),
                };
                attach(&mut stack, &mut top_level, block);
            }
            _ => {}
        }
    }

    // pulldown-cmark balances its tags, but never lose blocks if it did not
    while let Some(entry) = stack.pop() {
        if let Some(mut block) = entry {
            block.range.end = trimmed_end(source, block.range);
            attach(&mut stack, &mut top_level, block);
        }
    }

    top_level
}

fn attach(stack: &mut [Option<PendingBlock>], top_level: &mut Vec<PendingBlock>, block: PendingBlock) {
    match stack.iter_mut().rev().find_map(Option::as_mut) {
        Some(parent) => parent.children.push(block),
        None => top_level.push(block),
    }
}

fn block_kind(source: &str, tag: &Tag<'_>, start: usize) -> Option<NodeKind> {
    let kind = match tag {
        Tag::Paragraph => NodeKind::Paragraph,
        Tag::Heading { level, .. } => NodeKind::Header {
            level: heading_level(*level),
            style: heading_style(source, start),
        },
        Tag::BlockQuote(_) => NodeKind::BlockQuote,
        Tag::CodeBlock(CodeBlockKind::Fenced(_)) => NodeKind::CodeFence,
        Tag::CodeBlock(CodeBlockKind::Indented) => NodeKind::OtherBlock,
        Tag::List(Some(_)) => NodeKind::List(ListKind::Ordered),
        Tag::List(None) => NodeKind::List(ListKind::Unordered),
        Tag::Item => NodeKind::ListItem,
        Tag::Table(_) => NodeKind::Table,
        Tag::HtmlBlock | Tag::FootnoteDefinition(_) => NodeKind::OtherBlock,
        _ => return None,
    };
    Some(kind)
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// ATX headings open with up to 3 spaces, 1-6 `#` and then a space, tab or line end
fn heading_style(source: &str, start: usize) -> HeaderStyle {
    let first_line = source.get(start..).unwrap_or_default().lines().next().unwrap_or_default();
    let after_indent = first_line.trim_start_matches(' ');
    let indent = first_line.len() - after_indent.len();
    let after_hashes = after_indent.trim_start_matches('#');
    let hashes = after_indent.len() - after_hashes.len();

    if indent <= 3 && (1..=6).contains(&hashes) && (after_hashes.is_empty() || after_hashes.starts_with([' ', '\t'])) {
        HeaderStyle::Atx
    } else {
        HeaderStyle::Setext
    }
}

fn trimmed_end(source: &str, range: TextRange) -> usize {
    let end = range.end.min(source.len());
    match source.get(range.start..end) {
        Some(text) => range.start + text.trim_end().len(),
        None => end,
    }
}

fn emit_blocks(
    builder: &mut TreeBuilder,
    source: &str,
    parent: TextRange,
    blocks: Vec<PendingBlock>,
) -> Result<(), TreeError> {
    let mut cursor = parent.start;

    for block in blocks {
        let start = block.range.start.max(cursor);
        let end = block.range.end.min(parent.end);
        if end < start {
            log::trace!("dropping block {:?} outside {}..{}", block.kind, cursor, parent.end);
            continue;
        }

        fill_gap(builder, source, cursor, start)?;
        builder.start_node(block.kind, start)?;
        emit_blocks(builder, source, TextRange::new(start, end), block.children)?;
        builder.finish_node(end)?;
        cursor = end;
    }

    fill_gap(builder, source, cursor, parent.end)
}

/// Tokenise uncovered text: one `EndOfLine` per line break, one `Text` per non-blank run
fn fill_gap(builder: &mut TreeBuilder, source: &str, from: usize, to: usize) -> Result<(), TreeError> {
    if from >= to {
        return Ok(());
    }

    let mut line_start = from;
    for (idx, byte) in source[from..to].bytes().enumerate() {
        if byte != b'\n' {
            continue;
        }
        let newline = from + idx;
        let eol_start = if newline > line_start && source.as_bytes()[newline - 1] == b'\r' {
            newline - 1
        } else {
            newline
        };
        push_text(builder, source, line_start, eol_start)?;
        builder.token(NodeKind::EndOfLine, TextRange::new(eol_start, newline + 1))?;
        line_start = newline + 1;
    }

    push_text(builder, source, line_start, to)
}

fn push_text(builder: &mut TreeBuilder, source: &str, from: usize, to: usize) -> Result<(), TreeError> {
    let segment = &source[from..to];
    let trimmed = segment.trim();
    if trimmed.is_empty() {
        return Ok(());
    }
    let start = from + (segment.len() - segment.trim_start().len());
    builder.token(NodeKind::Text, TextRange::new(start, start + trimmed.len()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::NodeId;

    fn kinds(doc: &Document, ids: &[NodeId]) -> Vec<NodeKind> {
        ids.iter().map(|&id| doc.kind(id)).collect()
    }

    #[test]
    fn test_top_level_layout() {
        let doc = parse_document("# Title\n\nBody text\n").unwrap();
        let children = doc.children(doc.root()).to_vec();
        assert_eq!(
            kinds(&doc, &children),
            vec![
                NodeKind::Header {
                    level: 1,
                    style: HeaderStyle::Atx
                },
                NodeKind::EndOfLine,
                NodeKind::EndOfLine,
                NodeKind::Paragraph,
                NodeKind::EndOfLine,
            ]
        );
        assert_eq!(doc.text(children[0]), "# Title");
        assert_eq!(doc.text(children[3]), "Body text");
    }

    #[test]
    fn test_setext_heading() {
        let doc = parse_document("Title\n=====\n\nSub\n---\n").unwrap();
        let headers: Vec<NodeKind> = doc
            .descendants(doc.root())
            .into_iter()
            .map(|id| doc.kind(id))
            .filter(|kind| kind.is_header())
            .collect();
        assert_eq!(
            headers,
            vec![
                NodeKind::Header {
                    level: 1,
                    style: HeaderStyle::Setext
                },
                NodeKind::Header {
                    level: 2,
                    style: HeaderStyle::Setext
                },
            ]
        );
    }

    #[test]
    fn test_heading_style_needs_space_after_hashes() {
        let doc = parse_document("#hashtag\n========\n\n# Real\n\n####### seven\n===\n").unwrap();
        let headers: Vec<NodeKind> = doc
            .descendants(doc.root())
            .into_iter()
            .map(|id| doc.kind(id))
            .filter(|kind| kind.is_header())
            .collect();
        assert_eq!(
            headers,
            vec![
                NodeKind::Header {
                    level: 1,
                    style: HeaderStyle::Setext
                },
                NodeKind::Header {
                    level: 1,
                    style: HeaderStyle::Atx
                },
                NodeKind::Header {
                    level: 1,
                    style: HeaderStyle::Setext
                },
            ]
        );
    }

    #[test]
    fn test_block_kinds() {
        let content = "1. one\n2. two\n\n> quoted\n\n```rust\nfn main() {}\n```\n\n| a | b |\n|---|---|\n| 1 | 2 |\n";
        let doc = parse_document(content).unwrap();
        let all = kinds(&doc, &doc.descendants(doc.root()));
        assert!(all.contains(&NodeKind::List(ListKind::Ordered)));
        assert!(all.contains(&NodeKind::ListItem));
        assert!(all.contains(&NodeKind::BlockQuote));
        assert!(all.contains(&NodeKind::CodeFence));
        assert!(all.contains(&NodeKind::Table));
    }

    #[test]
    fn test_paragraph_lines_are_tokenised() {
        let doc = parse_document("first line\nsecond line").unwrap();
        let paragraph = doc.first_child(doc.root()).unwrap();
        assert_eq!(doc.kind(paragraph), NodeKind::Paragraph);
        let tokens = doc.children(paragraph).to_vec();
        assert_eq!(
            kinds(&doc, &tokens),
            vec![NodeKind::Text, NodeKind::EndOfLine, NodeKind::Text]
        );
        assert_eq!(doc.text(tokens[2]), "second line");
    }

    #[test]
    fn test_crlf_line_breaks() {
        let doc = parse_document("# A\r\n\r\ntext\r\n").unwrap();
        let children = doc.children(doc.root()).to_vec();
        assert_eq!(doc.text(children[0]), "# A");
        assert_eq!(doc.kind(children[1]), NodeKind::EndOfLine);
        assert_eq!(doc.text(children[1]), "\r\n");
    }

    #[test]
    fn test_empty_document() {
        let doc = parse_document("").unwrap();
        assert!(doc.children(doc.root()).is_empty());
    }
}
