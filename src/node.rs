use std::{collections::HashMap, sync::Arc};

use foldhash::fast::RandomState;

use crate::segment::SegmentKind;

/// Key of a node in the tree's arena.
pub(crate) type NodeKey = usize;

/// Tree vertex representing one registered segment.
///
/// Nodes are owned by the arena; `parent` is a plain key used only for introspection and ancestor
/// walks. `kind`, `text`, `stamp` and `parent` are fixed at creation, before the node is linked
/// into any parent.
#[derive(Debug)]
pub(crate) struct Node<T> {
    pub(crate) kind: SegmentKind,

    /// Raw pattern as registered, sigil included.
    pub(crate) text: Arc<str>,

    /// Unique creation stamp; distinguishes nodes that reuse an arena slot.
    pub(crate) stamp: u64,

    pub(crate) parent: Option<NodeKey>,

    pub(crate) handler: Option<T>,

    /// Literal children keyed by exact text.
    pub(crate) literals: HashMap<Arc<str>, NodeKey, RandomState>,

    /// Parameter children in insertion order. Names are unique.
    pub(crate) params: Vec<NodeKey>,

    /// Wildcard children in insertion order.
    pub(crate) wildcards: Vec<NodeKey>,

    /// Number of handler-bearing nodes in this subtree, this node included.
    pub(crate) size: usize,
}

impl<T> Node<T> {
    pub(crate) fn root() -> Self {
        Self::new(SegmentKind::Literal, Arc::from(""), 0, None)
    }

    pub(crate) fn new(
        kind: SegmentKind,
        text: Arc<str>,
        stamp: u64,
        parent: Option<NodeKey>,
    ) -> Self {
        Node {
            kind,
            text,
            stamp,
            parent,
            handler: None,
            literals: HashMap::default(),
            params: Vec::new(),
            wildcards: Vec::new(),
            size: 0,
        }
    }

    /// Binding name: pattern text without its sigil.
    pub(crate) fn name(&self) -> &str {
        match self.kind {
            SegmentKind::Literal => &self.text,
            SegmentKind::Param | SegmentKind::Wildcard => &self.text[1..],
        }
    }

    pub(crate) fn has_children(&self) -> bool {
        !(self.literals.is_empty() && self.params.is_empty() && self.wildcards.is_empty())
    }

    /// True when nothing in this subtree is live any more.
    pub(crate) fn is_prunable(&self) -> bool {
        self.size == 0 && self.handler.is_none() && !self.has_children()
    }

    /// Unlinks `child` from whichever collection holds it. Wildcards are matched by identity.
    pub(crate) fn unlink(&mut self, kind: SegmentKind, text: &str, child: NodeKey) {
        match kind {
            SegmentKind::Literal => {
                self.literals.remove(text);
            }
            SegmentKind::Param => self.params.retain(|&key| key != child),
            SegmentKind::Wildcard => self.wildcards.retain(|&key| key != child),
        }
    }

    /// All children in lookup order, literals sorted by text for a stable listing.
    pub(crate) fn children(&self) -> Vec<NodeKey> {
        let mut literals = self.literals.iter().collect::<Vec<_>>();
        literals.sort_unstable_by(|a, b| a.0.cmp(b.0));

        literals
            .into_iter()
            .map(|(_, &key)| key)
            .chain(self.params.iter().copied())
            .chain(self.wildcards.iter().copied())
            .collect()
    }
}
