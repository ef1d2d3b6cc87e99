//! Derived view of a header node: level, text and Setext details.

use crate::tree::{Document, HeaderStyle, NodeId, NodeKind};

/// Heading information extracted from a `Header` node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderRecord {
    /// Heading level (1-6 for ATX, 1-2 for Setext)
    pub level: u8,
    /// The heading text without markers, trimmed
    pub name: String,
    pub is_setext: bool,
    /// Character length of the Setext underline marker run
    pub underline_len: Option<usize>,
    /// Container markers or indentation before the Setext underline, e.g. `"> "`
    pub underline_prefix: Option<String>,
}

impl HeaderRecord {
    /// Returns `None` when `id` is not a header
    pub fn from_node(doc: &Document, id: NodeId) -> Option<Self> {
        let NodeKind::Header { level, style } = doc.kind(id) else {
            return None;
        };
        let text = doc.text(id);

        Some(match style {
            HeaderStyle::Atx => Self {
                level,
                name: atx_text(text).to_string(),
                is_setext: false,
                underline_len: None,
                underline_prefix: None,
            },
            HeaderStyle::Setext => {
                let (content, underline) = match text.trim_end().rsplit_once('\n') {
                    Some((content, underline)) => (content, underline),
                    None => (text, ""),
                };
                let (prefix, marker_run) = split_underline(underline);
                let name = content
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ");
                Self {
                    level,
                    name,
                    is_setext: true,
                    underline_len: Some(marker_run.chars().count()),
                    underline_prefix: Some(prefix.to_string()),
                }
            }
        })
    }
}

/// Split an underline line into its leading prefix and the trailing `=`/`-` run
fn split_underline(line: &str) -> (&str, &str) {
    let line = line.trim_end();
    let Some(marker) = line.chars().last() else {
        return ("", "");
    };
    let prefix = line.trim_end_matches(marker);
    (prefix, &line[prefix.len()..])
}

/// Strip the opening `#` run and an optional closing sequence
fn atx_text(line: &str) -> &str {
    let content = line.trim().trim_start_matches('#').trim();
    let without_closing = content.trim_end_matches('#');
    if without_closing.is_empty() {
        ""
    } else if without_closing.ends_with(' ') || without_closing.ends_with('\t') {
        without_closing.trim_end()
    } else {
        content
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_document;

    fn first_header(content: &str) -> HeaderRecord {
        let doc = parse_document(content).unwrap();
        let id = doc
            .descendants(doc.root())
            .into_iter()
            .find(|&id| doc.kind(id).is_header())
            .unwrap();
        HeaderRecord::from_node(&doc, id).unwrap()
    }

    #[test]
    fn test_atx_record() {
        let record = first_header("### Installation Guide\n");
        assert_eq!(record.level, 3);
        assert_eq!(record.name, "Installation Guide");
        assert!(!record.is_setext);
        assert_eq!(record.underline_len, None);
    }

    #[test]
    fn test_atx_closing_sequence() {
        assert_eq!(first_header("## Title ##\n").name, "Title");
        assert_eq!(first_header("# C#\n").name, "C#");
    }

    #[test]
    fn test_setext_record() {
        let record = first_header("My Title\n========\n");
        assert_eq!(record.level, 1);
        assert_eq!(record.name, "My Title");
        assert!(record.is_setext);
        assert_eq!(record.underline_len, Some(8));
        assert_eq!(record.underline_prefix.as_deref(), Some(""));
    }

    #[test]
    fn test_setext_underline_in_block_quote() {
        let record = first_header("> Title\n> =====\n");
        assert_eq!(record.name, "Title");
        assert_eq!(record.underline_len, Some(5));
        assert_eq!(record.underline_prefix.as_deref(), Some("> "));
    }

    #[test]
    fn test_setext_with_leading_hash() {
        let record = first_header("#hashtag\n========\n");
        assert!(record.is_setext);
        assert_eq!(record.name, "#hashtag");
        assert_eq!(record.underline_len, Some(8));
    }

    #[test]
    fn test_non_header_is_none() {
        let doc = parse_document("plain\n").unwrap();
        let paragraph = doc.first_child(doc.root()).unwrap();
        assert_eq!(HeaderRecord::from_node(&doc, paragraph), None);
    }
}
