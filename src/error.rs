//! Route registration and removal errors.

use derive_more::{Display, Error};

/// Errors returned by [`RadixTree`](crate::RadixTree) mutations.
///
/// Lookups never fail; a path without matches simply yields no routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
#[non_exhaustive]
pub enum RouteError {
    /// The insertion target already has a bound handler.
    #[display("handler already exists for this path")]
    DuplicateRoute,

    /// The pattern is malformed, e.g. a wildcard segment that is not the last segment.
    #[display("invalid route pattern")]
    InvalidPattern,

    /// The removal target's segment chain does not exist.
    #[display("route not found")]
    RouteNotFound,

    /// The removal target exists but has no bound handler.
    #[display("no handler bound at this path")]
    EmptyPath,
}

#[cfg(test)]
mod tests {
    use super::*;

    static_assertions::assert_impl_all!(RouteError: std::error::Error, Send, Sync, Copy);

    #[test]
    fn display() {
        assert_eq!(
            RouteError::DuplicateRoute.to_string(),
            "handler already exists for this path"
        );
        assert_eq!(RouteError::InvalidPattern.to_string(), "invalid route pattern");
        assert_eq!(RouteError::RouteNotFound.to_string(), "route not found");
        assert_eq!(RouteError::EmptyPath.to_string(), "no handler bound at this path");
    }
}
