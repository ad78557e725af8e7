use std::{
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};

use crate::{
    node::NodeKey,
    segment::SegmentKind,
    tree::{Inner, Shared},
};

/// Read-only reference to a node of a [`RadixTree`](crate::RadixTree).
///
/// Handles are returned by [`insert`](crate::RadixTree::insert) and
/// [`root`](crate::RadixTree::root). They keep the tree's shared state alive but never the node
/// itself: once every route below a node is removed the node is pruned and the handle becomes
/// _detached_. A detached handle still reports its own segment text, but has no parent, no
/// children and a size of zero.
///
/// Two handles compare equal when they refer to the same node of the same tree.
pub struct NodeHandle<T> {
    pub(crate) shared: Arc<Shared<T>>,
    pub(crate) key: NodeKey,
    pub(crate) stamp: u64,

    /// Immutable after node creation, so it can be read without the lock.
    pub(crate) text: Arc<str>,
}

impl<T> NodeHandle<T> {
    pub(crate) fn new(shared: Arc<Shared<T>>, key: NodeKey, stamp: u64, text: Arc<str>) -> Self {
        NodeHandle {
            shared,
            key,
            stamp,
            text,
        }
    }

    fn sibling(&self, inner: &Inner<T>, key: NodeKey) -> NodeHandle<T> {
        let node = &inner.nodes[key];
        NodeHandle::new(
            Arc::clone(&self.shared),
            key,
            node.stamp,
            Arc::clone(&node.text),
        )
    }

    /// Returns the node's segment pattern as registered, sigil included.
    ///
    /// The root node's pattern is empty.
    pub fn path_name(&self) -> &str {
        &self.text
    }

    /// Returns kind of the node's segment pattern. The root reports [`SegmentKind::Literal`].
    pub fn kind(&self) -> SegmentKind {
        SegmentKind::parse(&self.text).0
    }

    /// Returns a handle to the node's parent, or `None` for the root and for detached handles.
    pub fn parent(&self) -> Option<NodeHandle<T>> {
        let inner = self.shared.inner.read();
        let parent = inner.get(self.key, self.stamp)?.parent?;
        Some(self.sibling(&inner, parent))
    }

    /// Returns number of routes in this node's subtree, the node's own route included.
    pub fn size(&self) -> usize {
        let inner = self.shared.inner.read();
        inner
            .get(self.key, self.stamp)
            .map_or(0, |node| node.size)
    }

    /// Returns true if a route terminates at this node.
    pub fn has_handler(&self) -> bool {
        let inner = self.shared.inner.read();
        inner
            .get(self.key, self.stamp)
            .map_or(false, |node| node.handler.is_some())
    }

    /// Returns the segment patterns leading from the root to this node.
    ///
    /// The root's path is empty. A detached handle yields only its own pattern.
    pub fn path(&self) -> Vec<String> {
        let inner = self.shared.inner.read();

        let node = match inner.get(self.key, self.stamp) {
            Some(node) => node,
            None => return vec![self.text.to_string()],
        };

        let mut path = Vec::new();
        let mut current = node;
        while let Some(parent) = current.parent {
            path.push(current.text.to_string());
            current = &inner.nodes[parent];
        }

        path.reverse();
        path
    }

    /// Returns handles to the node's children in lookup order.
    ///
    /// Literal children come first, sorted by text, then parameters and wildcards in registration
    /// order.
    pub fn children(&self) -> Vec<NodeHandle<T>> {
        let inner = self.shared.inner.read();

        match inner.get(self.key, self.stamp) {
            Some(node) => node
                .children()
                .into_iter()
                .map(|child| self.sibling(&inner, child))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Returns false once the node has been pruned from the tree.
    pub fn is_attached(&self) -> bool {
        self.shared.inner.read().get(self.key, self.stamp).is_some()
    }
}

impl<T> Clone for NodeHandle<T> {
    fn clone(&self) -> Self {
        NodeHandle {
            shared: Arc::clone(&self.shared),
            key: self.key,
            stamp: self.stamp,
            text: Arc::clone(&self.text),
        }
    }
}

impl<T> PartialEq for NodeHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
            && self.key == other.key
            && self.stamp == other.stamp
    }
}

impl<T> Eq for NodeHandle<T> {}

impl<T> Hash for NodeHandle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.shared).hash(state);
        self.key.hash(state);
        self.stamp.hash(state);
    }
}

impl<T> fmt::Debug for NodeHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeHandle")
            .field("path_name", &self.text)
            .field("key", &self.key)
            .field("stamp", &self.stamp)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::RadixTree;

    static_assertions::assert_impl_all!(NodeHandle<String>: Send, Sync, Clone, Eq, Hash);

    #[test]
    fn path_and_parent() {
        let tree = RadixTree::new();
        let handle = tree.insert(&["users", ":id", "*rest"], ()).unwrap();

        assert_eq!(handle.path_name(), "*rest");
        assert_eq!(handle.kind(), SegmentKind::Wildcard);
        assert_eq!(handle.path(), ["users", ":id", "*rest"]);
        assert!(handle.has_handler());

        let id = handle.parent().unwrap();
        assert_eq!(id.path_name(), ":id");
        assert_eq!(id.kind(), SegmentKind::Param);
        assert_eq!(id.path(), ["users", ":id"]);
        assert!(!id.has_handler());

        let users = id.parent().unwrap();
        assert_eq!(users.kind(), SegmentKind::Literal);

        let root = users.parent().unwrap();
        assert_eq!(root, tree.root());
        assert_eq!(root.path_name(), "");
        assert!(root.path().is_empty());
        assert!(root.parent().is_none());
    }

    #[test]
    fn sizes() {
        let tree = RadixTree::new();
        let leaf = tree.insert(&["a", "b", "c"], 1).unwrap();
        tree.insert(&["a", "b"], 2).unwrap();
        tree.insert(&["a", "x"], 3).unwrap();

        assert_eq!(leaf.size(), 1);
        assert_eq!(leaf.parent().unwrap().size(), 2);
        assert_eq!(leaf.parent().unwrap().parent().unwrap().size(), 3);
        assert_eq!(tree.root().size(), 3);
    }

    #[test]
    fn equality() {
        let tree = RadixTree::new();
        let a = tree.insert(&["a"], 1).unwrap();
        let b = tree.insert(&["a", "b"], 2).unwrap();

        assert_eq!(b.parent().unwrap(), a);
        assert_ne!(a, b);
        assert_eq!(a, a.clone());

        let other = RadixTree::new();
        let other_a = other.insert(&["a"], 1).unwrap();
        assert_ne!(a, other_a);

        let set = [a.clone(), b.parent().unwrap(), b.clone()]
            .into_iter()
            .collect::<HashSet<_>>();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn children_listing() {
        let tree = RadixTree::new();
        tree.insert(&["*all"], 0).unwrap();
        tree.insert(&[":b"], 0).unwrap();
        tree.insert(&[":a"], 0).unwrap();
        tree.insert(&["z"], 0).unwrap();
        tree.insert(&["m"], 0).unwrap();

        let names = tree
            .root()
            .children()
            .iter()
            .map(|child| child.path_name().to_owned())
            .collect::<Vec<_>>();
        assert_eq!(names, ["m", "z", ":b", ":a", "*all"]);
    }

    #[test]
    fn detached() {
        let tree = RadixTree::new();
        let handle = tree.insert(&["a", ":b"], 1).unwrap();
        let parent = handle.parent().unwrap();

        tree.remove(&["a", ":b"]).unwrap();

        for handle in [&handle, &parent] {
            assert!(!handle.is_attached());
            assert_eq!(handle.size(), 0);
            assert!(handle.parent().is_none());
            assert!(handle.children().is_empty());
            assert!(!handle.has_handler());
        }

        assert_eq!(handle.path_name(), ":b");
        assert_eq!(handle.path(), [":b"]);
        assert_eq!(parent.path(), ["a"]);
    }
}
