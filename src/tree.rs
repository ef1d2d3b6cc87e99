//! Arena representation of a parsed Markdown document.
//!
//! Nodes live in a flat `Vec` and refer to each other by [`NodeId`], so a
//! [`Document`] is an immutable snapshot that can be handed to the analysis
//! passes without any shared ownership with the parser.

use crate::error::TreeError;
use serde::Serialize;

/// Index of a node inside its [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Half-open byte range `[start, end)` into the document source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn contains_range(&self, other: TextRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Whether `offset` falls inside the range (end exclusive)
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }
}

/// Heading syntax flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum HeaderStyle {
    /// `# Heading`
    Atx,
    /// Heading text underlined with `=` or `-`
    Setext,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ListKind {
    Ordered,
    Unordered,
}

/// The closed set of node kinds the analyzer understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeKind {
    Document,
    Header { level: u8, style: HeaderStyle },
    List(ListKind),
    ListItem,
    Paragraph,
    BlockQuote,
    Table,
    CodeFence,
    /// Thematic breaks, HTML blocks, indented code and other blocks with no special handling
    OtherBlock,
    Text,
    EndOfLine,
}

impl NodeKind {
    pub fn is_header(self) -> bool {
        matches!(self, NodeKind::Header { .. })
    }

    pub fn header_level(self) -> Option<u8> {
        match self {
            NodeKind::Header { level, .. } => Some(level),
            _ => None,
        }
    }

    /// Containers whose child headers belong to the enclosing section
    pub fn is_transparent_container(self) -> bool {
        matches!(
            self,
            NodeKind::Document | NodeKind::List(_) | NodeKind::ListItem | NodeKind::BlockQuote
        )
    }
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    range: TextRange,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A parsed document: the source text plus its node arena
#[derive(Debug, Clone)]
pub struct Document {
    source: String,
    nodes: Vec<NodeData>,
}

impl Document {
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.nodes[id.index()].kind
    }

    pub fn range(&self, id: NodeId) -> TextRange {
        self.nodes[id.index()].range
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    /// Source text covered by the node
    pub fn text(&self, id: NodeId) -> &str {
        let range = self.range(id);
        &self.source[range.start..range.end]
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).last().copied()
    }

    fn sibling_position(&self, id: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.parent(id)?;
        let position = self.children(parent).iter().position(|&child| child == id)?;
        Some((parent, position))
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (parent, position) = self.sibling_position(id)?;
        self.children(parent).get(position + 1).copied()
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        let (parent, position) = self.sibling_position(id)?;
        position.checked_sub(1).map(|prev| self.children(parent)[prev])
    }

    /// Siblings after `id`, in document order
    pub fn following_siblings(&self, id: NodeId) -> &[NodeId] {
        match self.sibling_position(id) {
            Some((parent, position)) => &self.children(parent)[position + 1..],
            None => &[],
        }
    }

    /// `id` followed by its ancestors up to the root
    pub fn ancestors_inclusive(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), move |&node| self.parent(node))
    }

    /// Nearest node of a matching kind, starting with `id` itself
    pub fn ancestor_matching(&self, id: NodeId, pred: impl Fn(NodeKind) -> bool) -> Option<NodeId> {
        self.ancestors_inclusive(id).find(|&node| pred(self.kind(node)))
    }

    /// All nodes below `id` in pre-order, excluding `id`
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    /// Deepest node whose range contains `offset`
    pub fn node_at(&self, offset: usize) -> Option<NodeId> {
        let mut current = self.root();
        if !self.range(current).contains(offset) {
            return None;
        }
        'descend: loop {
            for &child in self.children(current) {
                if self.range(child).contains(offset) {
                    current = child;
                    continue 'descend;
                }
            }
            return Some(current);
        }
    }

    /// Leaf nodes (no children) in document order, the root excluded
    pub fn leaves(&self) -> Vec<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .filter(|&node| self.children(node).is_empty())
            .collect()
    }

    /// Smallest node that is an ancestor of (or equal to) both `a` and `b`
    pub fn common_ancestor(&self, a: NodeId, b: NodeId) -> NodeId {
        let a_chain: Vec<NodeId> = self.ancestors_inclusive(a).collect();
        self.ancestors_inclusive(b)
            .find(|node| a_chain.contains(node))
            .unwrap_or_else(|| self.root())
    }
}

/// Incremental builder producing a validated [`Document`].
///
/// The root `Document` node is opened implicitly and spans the whole
/// source. Nodes must be added in document order.
pub struct TreeBuilder {
    source: String,
    nodes: Vec<NodeData>,
    open: Vec<NodeId>,
}

impl TreeBuilder {
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let root = NodeData {
            kind: NodeKind::Document,
            range: TextRange::new(0, source.len()),
            parent: None,
            children: Vec::new(),
        };
        Self {
            source,
            nodes: vec![root],
            open: vec![NodeId(0)],
        }
    }

    fn push(&mut self, kind: NodeKind, range: TextRange) -> Result<NodeId, TreeError> {
        let parent = *self.open.last().ok_or(TreeError::Unbalanced("node added after the root was closed"))?;
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData {
            kind,
            range,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.index()].children.push(id);
        Ok(id)
    }

    /// Open a node that will receive children; its end is set by [`Self::finish_node`]
    pub fn start_node(&mut self, kind: NodeKind, start: usize) -> Result<NodeId, TreeError> {
        let id = self.push(kind, TextRange::new(start, start))?;
        self.open.push(id);
        Ok(id)
    }

    pub fn finish_node(&mut self, end: usize) -> Result<NodeId, TreeError> {
        if self.open.len() <= 1 {
            return Err(TreeError::Unbalanced("finish_node without start_node"));
        }
        let id = self.open.pop().ok_or(TreeError::Unbalanced("finish_node without start_node"))?;
        self.nodes[id.index()].range.end = end;
        Ok(id)
    }

    /// Add a childless node
    pub fn token(&mut self, kind: NodeKind, range: TextRange) -> Result<NodeId, TreeError> {
        self.push(kind, range)
    }

    pub fn finish(self) -> Result<Document, TreeError> {
        if self.open.len() != 1 {
            return Err(TreeError::Unbalanced("nodes left open"));
        }
        let document = Document {
            source: self.source,
            nodes: self.nodes,
        };
        validate(&document)?;
        Ok(document)
    }
}

fn validate(document: &Document) -> Result<(), TreeError> {
    let len = document.source.len();
    for node in &document.nodes {
        let range = node.range;
        if range.end < range.start
            || range.end > len
            || !document.source.is_char_boundary(range.start)
            || !document.source.is_char_boundary(range.end)
        {
            return Err(TreeError::InvalidRange {
                start: range.start,
                end: range.end,
                len,
            });
        }
        let mut previous_end = range.start;
        for &child in &node.children {
            let child_range = document.range(child);
            if !range.contains_range(child_range) {
                return Err(TreeError::OutsideParent {
                    start: child_range.start,
                    end: child_range.end,
                    parent_start: range.start,
                    parent_end: range.end,
                });
            }
            if child_range.start < previous_end {
                return Err(TreeError::OverlappingSiblings {
                    start: child_range.start,
                    previous_end,
                });
            }
            previous_end = child_range.end;
        }
    }
    Ok(())
}
