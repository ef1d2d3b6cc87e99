//! Placeholder labels shown in place of collapsed regions.

use crate::config::{Config, LabelConfig, PlaceholderConfig};
use crate::folding::FoldRegion;
use crate::tree::{Document, ListKind, NodeKind};
use serde::Serialize;
use std::collections::HashMap;

/// Label category of a fold region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PlaceholderKind {
    Header(u8),
    OrderedList,
    UnorderedList,
    BlockQuote,
    Table,
    CodeFence,
    /// No display name; the placeholder is the shortened text alone
    None,
}

impl PlaceholderKind {
    pub fn for_kind(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Header { level, .. } => PlaceholderKind::Header(level),
            NodeKind::List(ListKind::Ordered) => PlaceholderKind::OrderedList,
            NodeKind::List(ListKind::Unordered) => PlaceholderKind::UnorderedList,
            NodeKind::BlockQuote => PlaceholderKind::BlockQuote,
            NodeKind::Table => PlaceholderKind::Table,
            NodeKind::CodeFence => PlaceholderKind::CodeFence,
            _ => PlaceholderKind::None,
        }
    }
}

/// Display names per placeholder kind, built once and passed to the [`Labeler`]
#[derive(Debug, Clone, Default)]
pub struct DisplayNames {
    names: HashMap<PlaceholderKind, String>,
}

impl DisplayNames {
    /// A mapping with no names at all
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: PlaceholderKind, name: impl Into<String>) -> Self {
        self.names.insert(kind, name.into());
        self
    }

    pub fn get(&self, kind: PlaceholderKind) -> Option<&str> {
        self.names.get(&kind).map(String::as_str)
    }

    pub fn from_config(labels: &LabelConfig) -> Self {
        let headers = [
            &labels.h1, &labels.h2, &labels.h3, &labels.h4, &labels.h5, &labels.h6,
        ];
        let mut names = Self::empty();
        for (level, name) in (1u8..).zip(headers) {
            names = names.with(PlaceholderKind::Header(level), name.as_str());
        }
        names
            .with(PlaceholderKind::OrderedList, labels.ordered_list.as_str())
            .with(PlaceholderKind::UnorderedList, labels.unordered_list.as_str())
            .with(PlaceholderKind::BlockQuote, labels.block_quote.as_str())
            .with(PlaceholderKind::Table, labels.table.as_str())
            .with(PlaceholderKind::CodeFence, labels.code_fence.as_str())
    }
}

/// Produces `"<name>: <shortened text>"` placeholders
#[derive(Debug, Clone)]
pub struct Labeler {
    names: DisplayNames,
    max_length: usize,
    suffix_length: usize,
    ellipsis: String,
}

impl Default for Labeler {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl Labeler {
    pub fn new(names: DisplayNames, settings: &PlaceholderConfig) -> Self {
        Self {
            names,
            max_length: settings.max_length,
            suffix_length: settings.suffix_length,
            ellipsis: settings.ellipsis.clone(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(DisplayNames::from_config(&config.labels), &config.placeholder)
    }

    pub fn label(&self, kind: PlaceholderKind, text: &str) -> String {
        let shortened = shorten_with_ellipsis(text, self.max_length, self.suffix_length, &self.ellipsis);
        match self.names.get(kind) {
            Some(name) => format!("{name}: {shortened}"),
            None => shortened,
        }
    }

    /// Placeholder for `region`, built from its originating node's own text
    pub fn placeholder_text(&self, doc: &Document, region: &FoldRegion) -> String {
        self.label(region.placeholder, doc.text(region.node))
    }
}

/// Shorten `text` to `max_length` characters, keeping its last `suffix_length`
/// characters after the `ellipsis` marker. Shorter text is returned as is.
pub fn shorten_with_ellipsis(text: &str, max_length: usize, suffix_length: usize, ellipsis: &str) -> String {
    let char_count = text.chars().count();
    if char_count <= max_length {
        return text.to_string();
    }

    let prefix_length = max_length.saturating_sub(suffix_length + ellipsis.chars().count());
    let prefix: String = text.chars().take(prefix_length).collect();
    let suffix: String = text.chars().skip(char_count - suffix_length.min(char_count)).collect();
    format!("{prefix}{ellipsis}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_short_text_is_verbatim() {
        assert_eq!(shorten_with_ellipsis("short", 30, 5, "..."), "short");
        let exactly = "a".repeat(30);
        assert_eq!(shorten_with_ellipsis(&exactly, 30, 5, "..."), exactly);
    }

    #[test]
    fn test_long_text_keeps_prefix_and_suffix() {
        let text = "abcdefghijklmnopqrstuvwxyz0123456789ABCDEFGHIJKLMN";
        assert_eq!(text.chars().count(), 50);
        let shortened = shorten_with_ellipsis(text, 30, 5, "...");
        assert_eq!(shortened, "abcdefghijklmnopqrstuv...JKLMN");
        assert_eq!(shortened.chars().count(), 30);
    }

    #[test]
    fn test_multibyte_text() {
        let text = "é".repeat(40);
        let shortened = shorten_with_ellipsis(&text, 30, 5, "...");
        assert_eq!(shortened.chars().count(), 30);
        assert!(shortened.contains("..."));
    }

    #[test]
    fn test_label_prefix() {
        let labeler = Labeler::default();
        assert_eq!(labeler.label(PlaceholderKind::Header(2), "## Usage"), "Header 2: ## Usage");
        assert_eq!(labeler.label(PlaceholderKind::CodeFence, "```"), "Code fence: ```");
        assert_eq!(labeler.label(PlaceholderKind::None, "plain"), "plain");
    }

    #[test]
    fn test_injected_names() {
        let names = DisplayNames::empty().with(PlaceholderKind::Table, "Tabelle");
        let labeler = Labeler::new(names, &PlaceholderConfig::default());
        assert_eq!(labeler.label(PlaceholderKind::Table, "| a |"), "Tabelle: | a |");
        assert_eq!(labeler.label(PlaceholderKind::BlockQuote, "> q"), "> q");
    }
}
