//! Project identifiers.
//!
//! A project carries an external integer id that is distinct from whatever
//! native identifier the document store assigns. Older documents sometimes
//! stored that id as a string, so lookups accept a [`ProjectRef`] which keeps
//! both possibilities explicit.

use core::fmt;

use serde::{Deserialize, Serialize};

/// The external, sequential id of a project.
///
/// Serializes as a bare integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(i64);

impl ProjectId {
    /// Create a new ID from an i64 value.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the underlying i64 value.
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }

    /// The id that follows this one, or `None` past `i64::MAX`.
    #[must_use]
    pub const fn checked_next(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(id) => Some(Self(id)),
            None => None,
        }
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ProjectId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<ProjectId> for i64 {
    fn from(id: ProjectId) -> Self {
        id.0
    }
}

/// A reference to a project as it arrives from a URL or client.
///
/// Resolution order used by the repositories:
///
/// - `Numeric(n)`: stored `id == n` as a number, then `id == "n"` as a string.
/// - `Legacy(s)`: stored `id == s` as a string, then the store's own object id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProjectRef {
    /// An integer id, the normal case.
    Numeric(ProjectId),
    /// Anything that is not an integer: a legacy string id or a store object id.
    Legacy(String),
}

impl ProjectRef {
    /// Parse a path segment into a reference.
    ///
    /// Surrounding whitespace is ignored. Anything that parses as an `i64` is
    /// numeric; every other input is kept verbatim as a legacy reference.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        trimmed.parse::<i64>().map_or_else(
            |_| Self::Legacy(trimmed.to_owned()),
            |id| Self::Numeric(ProjectId::new(id)),
        )
    }

    /// Returns the numeric id, if this reference is numeric.
    #[must_use]
    pub const fn as_numeric(&self) -> Option<ProjectId> {
        match self {
            Self::Numeric(id) => Some(*id),
            Self::Legacy(_) => None,
        }
    }
}

impl fmt::Display for ProjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(id) => write!(f, "{id}"),
            Self::Legacy(raw) => f.write_str(raw),
        }
    }
}

impl From<ProjectId> for ProjectRef {
    fn from(id: ProjectId) -> Self {
        Self::Numeric(id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numeric() {
        assert_eq!(ProjectRef::parse("42"), ProjectRef::Numeric(ProjectId::new(42)));
        assert_eq!(ProjectRef::parse(" 7 "), ProjectRef::Numeric(ProjectId::new(7)));
        assert_eq!(ProjectRef::parse("-3"), ProjectRef::Numeric(ProjectId::new(-3)));
    }

    #[test]
    fn test_parse_legacy() {
        assert_eq!(
            ProjectRef::parse("my-project"),
            ProjectRef::Legacy("my-project".to_string())
        );
        assert_eq!(
            ProjectRef::parse("6f1c2a9e-0000-4000-8000-000000000000"),
            ProjectRef::Legacy("6f1c2a9e-0000-4000-8000-000000000000".to_string())
        );
        // Floats are not integer ids
        assert_eq!(ProjectRef::parse("1.5"), ProjectRef::Legacy("1.5".to_string()));
    }

    #[test]
    fn test_display_roundtrips_through_parse() {
        for raw in ["12", "legacy-id"] {
            assert_eq!(ProjectRef::parse(raw).to_string(), raw);
        }
    }

    #[test]
    fn test_project_id_serializes_as_integer() {
        let json = serde_json::to_string(&ProjectId::new(5)).unwrap();
        assert_eq!(json, "5");
    }

    #[test]
    fn test_checked_next_stops_at_max() {
        assert_eq!(ProjectId::new(5).checked_next(), Some(ProjectId::new(6)));
        assert_eq!(ProjectId::new(i64::MAX).checked_next(), None);
    }
}
