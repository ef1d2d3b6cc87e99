//! Pre-order traversal over a [`Document`], dispatching on node kind.

use crate::tree::{Document, NodeId, NodeKind};

/// Whether the walker should enter the children of the node just visited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
    Descend,
    Skip,
}

/// Per-kind hooks. Every hook defaults to [`Visitor::visit_node`], which descends.
pub trait Visitor {
    fn visit_header(&mut self, doc: &Document, id: NodeId) -> Walk {
        self.visit_node(doc, id)
    }

    fn visit_list(&mut self, doc: &Document, id: NodeId) -> Walk {
        self.visit_node(doc, id)
    }

    fn visit_paragraph(&mut self, doc: &Document, id: NodeId) -> Walk {
        self.visit_node(doc, id)
    }

    fn visit_table(&mut self, doc: &Document, id: NodeId) -> Walk {
        self.visit_node(doc, id)
    }

    fn visit_block_quote(&mut self, doc: &Document, id: NodeId) -> Walk {
        self.visit_node(doc, id)
    }

    fn visit_code_fence(&mut self, doc: &Document, id: NodeId) -> Walk {
        self.visit_node(doc, id)
    }

    /// Fallback for every kind without a dedicated hook
    fn visit_node(&mut self, _doc: &Document, _id: NodeId) -> Walk {
        Walk::Descend
    }
}

/// Visit `start` and its descendants depth-first, pre-order.
pub fn walk<V: Visitor + ?Sized>(doc: &Document, start: NodeId, visitor: &mut V) {
    let mut stack = vec![start];
    while let Some(id) = stack.pop() {
        let decision = match doc.kind(id) {
            NodeKind::Header { .. } => visitor.visit_header(doc, id),
            NodeKind::List(_) => visitor.visit_list(doc, id),
            NodeKind::Paragraph => visitor.visit_paragraph(doc, id),
            NodeKind::Table => visitor.visit_table(doc, id),
            NodeKind::BlockQuote => visitor.visit_block_quote(doc, id),
            NodeKind::CodeFence => visitor.visit_code_fence(doc, id),
            _ => visitor.visit_node(doc, id),
        };
        if decision == Walk::Descend {
            stack.extend(doc.children(id).iter().rev().copied());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_document;

    #[derive(Default)]
    struct Recorder {
        seen: Vec<NodeId>,
        skip_lists: bool,
    }

    impl Visitor for Recorder {
        fn visit_list(&mut self, _doc: &Document, id: NodeId) -> Walk {
            self.seen.push(id);
            if self.skip_lists { Walk::Skip } else { Walk::Descend }
        }

        fn visit_node(&mut self, _doc: &Document, id: NodeId) -> Walk {
            self.seen.push(id);
            Walk::Descend
        }
    }

    #[test]
    fn test_visits_every_node_once_in_pre_order() {
        let doc = parse_document("# Title\n\n- a\n- b\n\ntext\n").unwrap();
        let mut recorder = Recorder::default();
        walk(&doc, doc.root(), &mut recorder);

        let mut expected = vec![doc.root()];
        expected.extend(doc.descendants(doc.root()));
        assert_eq!(recorder.seen, expected);
    }

    #[test]
    fn test_skip_prunes_subtree() {
        let doc = parse_document("- a\n- b\n").unwrap();
        let mut recorder = Recorder {
            skip_lists: true,
            ..Default::default()
        };
        walk(&doc, doc.root(), &mut recorder);

        assert!(recorder.seen.iter().all(|&id| doc.kind(id) != NodeKind::ListItem));
        assert!(recorder.seen.iter().any(|&id| matches!(doc.kind(id), NodeKind::List(_))));
    }
}
