//! Structure view: a lazily expanded tree of the document's headers.

use crate::heading::HeaderRecord;
use crate::line_index::{LineIndex, LineNumbers};
use crate::section::scan_section;
use crate::tree::{Document, NodeId, TextRange};
use std::cell::OnceCell;

/// Text shown for an outline entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPresentation {
    pub presentable_text: Option<String>,
    pub location_text: Option<String>,
}

/// Supplies presentation details for outline nodes
pub trait PresentationProvider {
    /// `None` falls back to an empty presentation
    fn presentation(&self, doc: &Document, node: NodeId) -> Option<ItemPresentation>;

    /// Name used for alphabetical sorting
    fn navigable_name(&self, doc: &Document, node: NodeId) -> Option<String>;

    fn can_navigate(&self, doc: &Document, node: NodeId) -> bool;
}

/// Presentation for Markdown documents: headers show their text and line.
pub struct MarkdownPresentation {
    document_name: Option<String>,
    lines: LineIndex,
}

impl MarkdownPresentation {
    pub fn new(doc: &Document, document_name: Option<String>) -> Self {
        Self {
            document_name,
            lines: LineIndex::new(doc.source()),
        }
    }
}

impl PresentationProvider for MarkdownPresentation {
    fn presentation(&self, doc: &Document, node: NodeId) -> Option<ItemPresentation> {
        if node == doc.root() {
            return Some(ItemPresentation {
                presentable_text: self.document_name.clone(),
                location_text: None,
            });
        }
        let record = HeaderRecord::from_node(doc, node)?;
        let location_text = self
            .lines
            .line_number(doc.range(node).start)
            .ok()
            .map(|line| format!("line {}", line + 1));
        Some(ItemPresentation {
            presentable_text: Some(record.name),
            location_text,
        })
    }

    fn navigable_name(&self, doc: &Document, node: NodeId) -> Option<String> {
        if node == doc.root() {
            return self.document_name.clone();
        }
        HeaderRecord::from_node(doc, node).map(|record| record.name)
    }

    fn can_navigate(&self, doc: &Document, node: NodeId) -> bool {
        node == doc.root() || doc.kind(node).is_header()
    }
}

/// One entry of the outline; children are computed on first access and cached
pub struct OutlineNode<'a> {
    doc: &'a Document,
    node: NodeId,
    provider: &'a dyn PresentationProvider,
    children: OnceCell<Vec<OutlineNode<'a>>>,
}

/// Outline root for `doc`
pub fn build_outline<'a>(doc: &'a Document, provider: &'a dyn PresentationProvider) -> OutlineNode<'a> {
    OutlineNode::new(doc, doc.root(), provider)
}

impl<'a> OutlineNode<'a> {
    fn new(doc: &'a Document, node: NodeId, provider: &'a dyn PresentationProvider) -> Self {
        Self {
            doc,
            node,
            provider,
            children: OnceCell::new(),
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn range(&self) -> TextRange {
        self.doc.range(self.node)
    }

    pub fn presentation(&self) -> ItemPresentation {
        self.provider.presentation(self.doc, self.node).unwrap_or_default()
    }

    pub fn presentable_text(&self) -> Option<String> {
        self.presentation().presentable_text
    }

    pub fn location_text(&self) -> Option<String> {
        self.presentation().location_text
    }

    pub fn can_navigate(&self) -> bool {
        self.provider.can_navigate(self.doc, self.node)
    }

    pub fn alpha_sort_key(&self) -> String {
        self.provider.navigable_name(self.doc, self.node).unwrap_or_default()
    }

    pub fn children(&self) -> &[OutlineNode<'a>] {
        self.children.get_or_init(|| {
            scan_section(self.doc, self.node)
                .children
                .into_iter()
                .map(|child| OutlineNode::new(self.doc, child, self.provider))
                .collect()
        })
    }

    /// Whether `children` has already been computed
    pub fn is_expanded(&self) -> bool {
        self.children.get().is_some()
    }
}

impl std::fmt::Debug for OutlineNode<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutlineNode")
            .field("node", &self.node)
            .field("presentation", &self.presentation())
            .finish()
    }
}
