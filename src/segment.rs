/// Marker for a parameter segment, e.g. `:id`.
pub(crate) const PARAM_SIGIL: char = ':';

/// Marker for a wildcard segment, e.g. `*filepath`.
pub(crate) const WILDCARD_SIGIL: char = '*';

/// Kind of a registered segment pattern.
///
/// The kind is decided by the pattern's leading character:
/// - no sigil: [`Literal`](Self::Literal), matched by exact text equality;
/// - `:`: [`Param`](Self::Param), matches any single segment and binds it under the remaining
///   text as its name;
/// - `*`: [`Wildcard`](Self::Wildcard), matches the current and all remaining segments.
///
/// Names may be empty (`":"` or `"*"`), which registers an anonymous binding keyed by `""`.
///
/// # Examples
/// ```
/// use multi_router::SegmentKind;
///
/// assert_eq!(SegmentKind::parse("users"), (SegmentKind::Literal, "users"));
/// assert_eq!(SegmentKind::parse(":id"), (SegmentKind::Param, "id"));
/// assert_eq!(SegmentKind::parse("*path"), (SegmentKind::Wildcard, "path"));
/// assert_eq!(SegmentKind::parse(":"), (SegmentKind::Param, ""));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    /// Exact text segment.
    Literal,

    /// Single segment parameter.
    Param,

    /// Trailing catch-all. Always the last segment of a pattern.
    Wildcard,
}

impl SegmentKind {
    /// Splits a segment pattern into its kind and name.
    ///
    /// For literals the "name" is the full pattern text.
    pub fn parse(pattern: &str) -> (SegmentKind, &str) {
        if let Some(name) = pattern.strip_prefix(PARAM_SIGIL) {
            (SegmentKind::Param, name)
        } else if let Some(name) = pattern.strip_prefix(WILDCARD_SIGIL) {
            (SegmentKind::Wildcard, name)
        } else {
            (SegmentKind::Literal, pattern)
        }
    }

    /// Returns true for parameter and wildcard kinds.
    pub fn is_dynamic(self) -> bool {
        !matches!(self, SegmentKind::Literal)
    }
}
