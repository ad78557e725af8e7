//! Segment-based route tree with multi-match lookup.
//!
//! Routes are registered as sequences of segment patterns:
//! - `users`: a literal segment, matched by exact text;
//! - `:id`: a parameter, matching any single segment;
//! - `*path`: a wildcard, matching the rest of the path. Only allowed as the last segment.
//!
//! A lookup returns every registered route that matches, literals before parameters before
//! wildcards, each with the values its dynamic segments captured. Splitting raw paths into
//! segments and picking one of the matches is up to the caller.
//!
//! ```
//! use multi_router::RadixTree;
//!
//! let tree = RadixTree::new();
//! tree.insert(&["users", ":id"], "show_user").unwrap();
//! tree.insert(&["users", ":id", "posts"], "user_posts").unwrap();
//! tree.insert(&["files", "*filepath"], "serve_file").unwrap();
//!
//! let routes = tree.lookup(&["users", "42"]);
//! assert_eq!(routes.len(), 1);
//! assert_eq!(routes[0].handler, "show_user");
//! assert_eq!(routes[0].bindings.get_one("id"), Some("42"));
//!
//! let routes = tree.lookup(&["files", "a", "b.txt"]);
//! assert_eq!(routes[0].bindings.get("filepath").unwrap(), ["a", "b.txt"]);
//!
//! assert!(tree.lookup(&["files"]).is_empty());
//! ```

#![deny(rust_2018_idioms, nonstandard_style)]
#![warn(future_incompatible)]

mod de;
mod error;
mod handle;
mod node;
mod route;
mod segment;
mod tree;

pub use self::de::BindingsDeserializer;
pub use self::error::RouteError;
pub use self::handle::NodeHandle;
pub use self::route::{Binding, Bindings, BindingsIter, Route, Routes};
pub use self::segment::SegmentKind;
pub use self::tree::{RadixTree, TreeBuilder};
