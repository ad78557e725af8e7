use std::{fmt, marker::PhantomData, sync::Arc};

use parking_lot::RwLock;
use slab::Slab;
use tracing::{debug, trace};

use crate::{
    error::RouteError,
    handle::NodeHandle,
    node::{Node, NodeKey},
    route::{Binding, Bindings, Route, Routes},
    segment::SegmentKind,
};

/// Multi-match route tree.
///
/// Routes are registered as sequences of segment patterns (see [`SegmentKind`]) and looked up with
/// sequences of plain segments. Unlike a conventional router, [`lookup`](Self::lookup) returns
/// _every_ matching route, in a fixed priority order:
/// 1. the literal child matching the segment exactly;
/// 1. every parameter child, in registration order;
/// 1. every wildcard child, in registration order.
///
/// Splitting a raw path into segments and choosing among the returned matches are left to the
/// caller.
///
/// The tree is cheap to clone; clones share the same routes. All reads and writes go through a
/// single tree-wide lock, so lookups can run concurrently with insertions and removals from other
/// threads.
///
/// # Examples
/// ```
/// use multi_router::RadixTree;
///
/// let tree = RadixTree::new();
/// tree.insert(&["api", ":version"], "versioned").unwrap();
/// tree.insert(&["api", "*path"], "fallback").unwrap();
///
/// let routes = tree.lookup(&["api", "v1"]);
/// assert_eq!(routes.len(), 2);
/// assert_eq!(routes[0].handler, "versioned");
/// assert_eq!(routes[0].bindings.get_one("version"), Some("v1"));
/// assert_eq!(routes[1].handler, "fallback");
/// assert_eq!(routes[1].bindings.get("path").unwrap(), ["v1"]);
/// ```
pub struct RadixTree<T> {
    pub(crate) shared: Arc<Shared<T>>,
}

pub(crate) struct Shared<T> {
    pub(crate) inner: RwLock<Inner<T>>,
    config: TreeConfig,
}

#[derive(Debug, Clone, Copy)]
struct TreeConfig {
    allow_duplicate_wildcards: bool,
    allow_anonymous: bool,
}

impl Default for TreeConfig {
    fn default() -> Self {
        TreeConfig {
            allow_duplicate_wildcards: false,
            allow_anonymous: true,
        }
    }
}

impl TreeConfig {
    fn validate<S: AsRef<str>>(&self, segments: &[S]) -> Result<(), RouteError> {
        for (idx, segment) in segments.iter().enumerate() {
            let (kind, name) = SegmentKind::parse(segment.as_ref());

            if kind == SegmentKind::Wildcard && idx + 1 != segments.len() {
                return Err(RouteError::InvalidPattern);
            }

            if kind.is_dynamic() && name.is_empty() && !self.allow_anonymous {
                return Err(RouteError::InvalidPattern);
            }
        }

        Ok(())
    }
}

/// Arena holding every live node. Only accessed under the tree lock.
pub(crate) struct Inner<T> {
    pub(crate) nodes: Slab<Node<T>>,
    pub(crate) root: NodeKey,
    next_stamp: u64,
}

impl<T> Inner<T> {
    fn new() -> Self {
        let mut nodes = Slab::new();
        let root = nodes.insert(Node::root());

        Inner {
            nodes,
            root,
            next_stamp: 1,
        }
    }

    /// Returns node at `key` if it is still the node that was issued `stamp`.
    pub(crate) fn get(&self, key: NodeKey, stamp: u64) -> Option<&Node<T>> {
        self.nodes.get(key).filter(|node| node.stamp == stamp)
    }

    /// Finds the child of `key` registered under exactly `pattern`.
    ///
    /// Wildcards are compared by stored text; the first of several identical ones wins.
    fn child(&self, key: NodeKey, pattern: &str) -> Option<NodeKey> {
        let node = &self.nodes[key];

        match SegmentKind::parse(pattern) {
            (SegmentKind::Literal, _) => node.literals.get(pattern).copied(),
            (SegmentKind::Param, name) => node
                .params
                .iter()
                .copied()
                .find(|&child| self.nodes[child].name() == name),
            (SegmentKind::Wildcard, _) => node
                .wildcards
                .iter()
                .copied()
                .find(|&child| &*self.nodes[child].text == pattern),
        }
    }

    /// Builds a node completely, then links it under `parent`.
    fn create(&mut self, parent: NodeKey, kind: SegmentKind, pattern: &str) -> NodeKey {
        let stamp = self.next_stamp;
        self.next_stamp += 1;

        let text = Arc::<str>::from(pattern);
        let child = self
            .nodes
            .insert(Node::new(kind, Arc::clone(&text), stamp, Some(parent)));

        let parent = &mut self.nodes[parent];
        match kind {
            SegmentKind::Literal => {
                parent.literals.insert(text, child);
            }
            SegmentKind::Param => parent.params.push(child),
            SegmentKind::Wildcard => parent.wildcards.push(child),
        }

        child
    }

    fn insert<S: AsRef<str>>(
        &mut self,
        config: &TreeConfig,
        segments: &[S],
        handler: T,
    ) -> Result<NodeKey, RouteError> {
        config.validate(segments)?;

        let mut key = self.root;

        for segment in segments {
            let pattern = segment.as_ref();
            let (kind, _) = SegmentKind::parse(pattern);

            key = match kind {
                SegmentKind::Wildcard => {
                    if !config.allow_duplicate_wildcards && self.child(key, pattern).is_some() {
                        return Err(RouteError::DuplicateRoute);
                    }

                    self.create(key, kind, pattern)
                }

                SegmentKind::Literal | SegmentKind::Param => match self.child(key, pattern) {
                    Some(child) => child,
                    None => self.create(key, kind, pattern),
                },
            };
        }

        let node = &mut self.nodes[key];
        if node.handler.is_some() {
            return Err(RouteError::DuplicateRoute);
        }
        node.handler = Some(handler);

        let mut cursor = Some(key);
        while let Some(current) = cursor {
            let node = &mut self.nodes[current];
            node.size += 1;
            cursor = node.parent;
        }

        Ok(key)
    }

    fn locate<S: AsRef<str>>(&self, segments: &[S]) -> Result<NodeKey, RouteError> {
        segments.iter().try_fold(self.root, |key, segment| {
            self.child(key, segment.as_ref())
                .ok_or(RouteError::RouteNotFound)
        })
    }

    /// Unbinds the handler at `key`, fixes ancestor sizes and prunes nodes left empty.
    pub(crate) fn release(&mut self, key: NodeKey) -> Result<T, RouteError> {
        let handler = self.nodes[key]
            .handler
            .take()
            .ok_or(RouteError::EmptyPath)?;

        let mut cursor = Some(key);
        while let Some(current) = cursor {
            let node = &mut self.nodes[current];
            node.size -= 1;
            cursor = node.parent;
        }

        let mut current = key;
        while let Some(parent) = self.nodes[current].parent {
            if !self.nodes[current].is_prunable() {
                break;
            }

            let node = self.nodes.remove(current);
            self.nodes[parent].unlink(node.kind, &node.text, current);
            trace!(node = %node.text, "pruned empty node");

            current = parent;
        }

        Ok(handler)
    }

    fn lookup<S: AsRef<str>>(
        &self,
        key: NodeKey,
        segments: &[S],
        bindings: &mut Bindings,
        routes: &mut Routes<T>,
        first_only: bool,
    ) where
        T: Clone,
    {
        let node = &self.nodes[key];

        let (segment, rest) = match segments.split_first() {
            Some((segment, rest)) => (segment.as_ref(), rest),
            None => {
                if let Some(handler) = &node.handler {
                    routes.push(Route {
                        handler: handler.clone(),
                        bindings: bindings.clone(),
                    });
                }
                return;
            }
        };

        if let Some(&child) = node.literals.get(segment) {
            self.lookup(child, rest, bindings, routes, first_only);
        }

        for &child in &node.params {
            if first_only && !routes.is_empty() {
                return;
            }

            bindings.push(Binding::new(
                self.nodes[child].name(),
                vec![segment.to_owned()],
            ));
            self.lookup(child, rest, bindings, routes, first_only);
            bindings.pop();
        }

        for &child in &node.wildcards {
            if first_only && !routes.is_empty() {
                return;
            }

            let child = &self.nodes[child];

            if let Some(handler) = &child.handler {
                let mut bindings = bindings.clone();
                bindings.push(Binding::new(
                    child.name(),
                    segments.iter().map(|s| s.as_ref().to_owned()).collect(),
                ));

                routes.push(Route {
                    handler: handler.clone(),
                    bindings,
                });
            }
        }
    }
}

impl<T> RadixTree<T> {
    /// Constructs an empty tree with default policies.
    pub fn new() -> Self {
        Self::with_config(TreeConfig::default())
    }

    /// Constructs a [`TreeBuilder`] for configuring conflict policies.
    pub fn builder() -> TreeBuilder<T> {
        TreeBuilder {
            config: TreeConfig::default(),
            _phantom: PhantomData,
        }
    }

    fn with_config(config: TreeConfig) -> Self {
        RadixTree {
            shared: Arc::new(Shared {
                inner: RwLock::new(Inner::new()),
                config,
            }),
        }
    }

    /// Registers `handler` for the route described by `segments`.
    ///
    /// An empty segment list registers the root route. Missing nodes along the path are created;
    /// existing literal and parameter nodes are shared with routes already registered.
    ///
    /// Returns a handle to the node the route terminates at.
    ///
    /// # Errors
    /// - [`RouteError::InvalidPattern`] if a wildcard segment is not the last segment, or if an
    ///   anonymous segment is used while [anonymous segments are
    ///   disabled](TreeBuilder::allow_anonymous).
    /// - [`RouteError::DuplicateRoute`] if a handler is already bound to this pattern.
    pub fn insert<S: AsRef<str>>(
        &self,
        segments: &[S],
        handler: T,
    ) -> Result<NodeHandle<T>, RouteError> {
        let mut inner = self.shared.inner.write();

        match inner.insert(&self.shared.config, segments, handler) {
            Ok(key) => {
                trace!(path = %DisplayPath(segments), "route inserted");

                let node = &inner.nodes[key];
                Ok(NodeHandle::new(
                    Arc::clone(&self.shared),
                    key,
                    node.stamp,
                    Arc::clone(&node.text),
                ))
            }

            Err(err) => {
                debug!(path = %DisplayPath(segments), "route not inserted: {}", err);
                Err(err)
            }
        }
    }

    /// Removes the route registered with exactly `segments`.
    ///
    /// Wildcard segments are matched by their full stored pattern. Nodes left without routes are
    /// pruned.
    ///
    /// # Errors
    /// - [`RouteError::RouteNotFound`] if no node chain matches the pattern.
    /// - [`RouteError::EmptyPath`] if the node exists but has no handler bound.
    pub fn remove<S: AsRef<str>>(&self, segments: &[S]) -> Result<(), RouteError> {
        let mut inner = self.shared.inner.write();

        match inner.locate(segments).and_then(|key| inner.release(key)) {
            Ok(_) => {
                trace!(path = %DisplayPath(segments), "route removed");
                Ok(())
            }

            Err(err) => {
                debug!(path = %DisplayPath(segments), "route not removed: {}", err);
                Err(err)
            }
        }
    }

    /// Removes the route bound at exactly the node `handle` refers to, returning its handler.
    ///
    /// Unlike [`remove`](Self::remove), this can target one of several wildcard routes registered
    /// with identical patterns.
    ///
    /// # Errors
    /// - [`RouteError::RouteNotFound`] if the handle belongs to another tree or its node has been
    ///   pruned.
    /// - [`RouteError::EmptyPath`] if the node has no handler bound.
    pub fn remove_handle(&self, handle: &NodeHandle<T>) -> Result<T, RouteError> {
        if !Arc::ptr_eq(&self.shared, &handle.shared) {
            return Err(RouteError::RouteNotFound);
        }

        let mut inner = self.shared.inner.write();

        if inner.get(handle.key, handle.stamp).is_none() {
            return Err(RouteError::RouteNotFound);
        }

        let res = inner.release(handle.key);
        if res.is_ok() {
            trace!(node = %handle.text, "route removed by handle");
        }
        res
    }

    /// Removes every route.
    ///
    /// The root node is kept so existing root handles stay valid.
    pub fn clear(&self) {
        let mut inner = self.shared.inner.write();
        let root = inner.root;

        inner.nodes.retain(|key, _| key == root);

        let node = &mut inner.nodes[root];
        node.handler = None;
        node.literals.clear();
        node.params.clear();
        node.wildcards.clear();
        node.size = 0;

        trace!("all routes cleared");
    }

    /// Returns true if a handler is registered with exactly `segments` as its pattern.
    ///
    /// This compares patterns, not matches: `contains(&["users", ":id"])` checks for that
    /// parameter route, not for a route matching a user called ":id".
    pub fn contains<S: AsRef<str>>(&self, segments: &[S]) -> bool {
        let inner = self.shared.inner.read();

        inner
            .locate(segments)
            .map(|key| inner.nodes[key].handler.is_some())
            .unwrap_or(false)
    }

    /// Returns number of routes in the tree.
    pub fn size(&self) -> usize {
        let inner = self.shared.inner.read();
        inner.nodes[inner.root].size
    }

    /// Returns true if no routes are registered.
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Returns a handle to the root node.
    pub fn root(&self) -> NodeHandle<T> {
        let inner = self.shared.inner.read();
        let node = &inner.nodes[inner.root];

        NodeHandle::new(
            Arc::clone(&self.shared),
            inner.root,
            node.stamp,
            Arc::clone(&node.text),
        )
    }
}

impl<T: Clone> RadixTree<T> {
    /// Finds every route matching `segments`, highest priority first.
    ///
    /// Parameter bindings hold the single segment they matched; wildcard bindings hold every
    /// segment from their position to the end of the path. Returns an empty list when nothing
    /// matches.
    pub fn lookup<S: AsRef<str>>(&self, segments: &[S]) -> Routes<T> {
        self.lookup_inner(segments, false)
    }

    /// Finds the highest priority route matching `segments`.
    ///
    /// Stops exploring as soon as a match is found.
    pub fn lookup_first<S: AsRef<str>>(&self, segments: &[S]) -> Option<Route<T>> {
        self.lookup_inner(segments, true).into_iter().next()
    }

    fn lookup_inner<S: AsRef<str>>(&self, segments: &[S], first_only: bool) -> Routes<T> {
        let inner = self.shared.inner.read();

        let mut routes = Vec::new();
        let mut bindings = Bindings::new();
        inner.lookup(inner.root, segments, &mut bindings, &mut routes, first_only);

        routes
    }
}

impl<T> Clone for RadixTree<T> {
    fn clone(&self) -> Self {
        RadixTree {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> Default for RadixTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for RadixTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RadixTree")
            .field("size", &self.size())
            .field("config", &self.shared.config)
            .finish()
    }
}

/// Builder for a [`RadixTree`] with non-default conflict policies.
///
/// # Examples
/// ```
/// use multi_router::{RadixTree, RouteError};
///
/// let tree = RadixTree::builder()
///     .allow_duplicate_wildcards(true)
///     .allow_anonymous(false)
///     .build();
///
/// tree.insert(&["files", "*path"], 1).unwrap();
/// tree.insert(&["files", "*path"], 2).unwrap();
/// assert_eq!(tree.lookup(&["files", "a"]).len(), 2);
///
/// assert_eq!(tree.insert(&["users", ":"], 3).unwrap_err(), RouteError::InvalidPattern);
/// ```
pub struct TreeBuilder<T> {
    config: TreeConfig,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> TreeBuilder<T> {
    /// Accept wildcard routes whose pattern exactly repeats an existing sibling's.
    ///
    /// Disabled by default; a repeated wildcard is then rejected with
    /// [`RouteError::DuplicateRoute`]. Wildcards with different names are always accepted at the
    /// same position.
    pub fn allow_duplicate_wildcards(mut self, allow: bool) -> Self {
        self.config.allow_duplicate_wildcards = allow;
        self
    }

    /// Accept parameter and wildcard segments without a name (`":"`, `"*"`).
    ///
    /// Enabled by default; anonymous segments bind under the empty name.
    pub fn allow_anonymous(mut self, allow: bool) -> Self {
        self.config.allow_anonymous = allow;
        self
    }

    /// Finish configuration and create the tree.
    pub fn build(self) -> RadixTree<T> {
        RadixTree::with_config(self.config)
    }
}

impl<T> fmt::Debug for TreeBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeBuilder")
            .field("config", &self.config)
            .finish()
    }
}

/// Formats segments as a slash separated path for log output.
struct DisplayPath<'a, S>(&'a [S]);

impl<S: AsRef<str>> fmt::Display for DisplayPath<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }

        for segment in self.0 {
            write!(f, "/{}", segment.as_ref())?;
        }

        Ok(())
    }
}
