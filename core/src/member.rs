//! Member identity types and the community registry.
//!
//! The community is a small, fixed set of members loaded once at startup.
//! Members are never created or destroyed at runtime; every component that
//! needs the member list receives a [`MemberRegistry`] by value or reference
//! rather than consulting a global.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for [`MemberId`] parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid member ID: {0}")]
pub struct ParseMemberIdError(String);

/// Stable, unique identifier for a community member.
///
/// This is the identifier printed into the scannable token. For example:
/// - `"vecino_01"`
/// - `"vecino_09"`
///
/// # Validation
///
/// - `FromStr::from_str()`: Validates input (rejects empty strings)
/// - `From::from()` and `new()`: No validation (for internal use with trusted input)
///
/// Use `FromStr` when parsing external/scanned input. Use `new()` or `From`
/// when constructing ids from application-controlled data.
///
/// # Examples
///
/// ```
/// use llavero_core::member::MemberId;
///
/// let id = MemberId::new("vecino_03");
/// assert_eq!(id.as_str(), "vecino_03");
///
/// let parsed: MemberId = "vecino_03".parse().unwrap();
/// assert_eq!(parsed, id);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberId(String);

impl MemberId {
    /// Create a new `MemberId` from a string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the member ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for MemberId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for MemberId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl FromStr for MemberId {
    type Err = ParseMemberIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(ParseMemberIdError("empty member ID".to_string()));
        }
        Ok(Self(s.to_string()))
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered community member, eligible to be credited with usage events.
///
/// Member records are immutable configuration. The `color_tag` is a display
/// hint (hex color) carried through to dashboards and printed cards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Stable unique identifier, also encoded into the printed token
    pub id: MemberId,
    /// Name shown on dashboards and snapshotted into usage events
    pub display_name: String,
    /// Display color hint (e.g. `"#3B82F6"`)
    pub color_tag: String,
}

impl Member {
    /// Creates a new member record.
    #[must_use]
    pub fn new(
        id: impl Into<MemberId>,
        display_name: impl Into<String>,
        color_tag: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            color_tag: color_tag.into(),
        }
    }
}

/// Immutable, ordered registry of known members.
///
/// The order of the registry is significant: aggregation uses it as the
/// tie-break order for ranked output, and card printing follows it.
///
/// # Examples
///
/// ```
/// use llavero_core::member::MemberRegistry;
///
/// let registry = MemberRegistry::default_community();
/// assert_eq!(registry.len(), 9);
/// assert!(registry.find("vecino_03").is_some());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRegistry {
    members: Vec<Member>,
}

impl MemberRegistry {
    /// Builds a registry from an ordered list of members.
    #[must_use]
    pub const fn new(members: Vec<Member>) -> Self {
        Self { members }
    }

    /// The fixed community this system was deployed for.
    #[must_use]
    pub fn default_community() -> Self {
        Self::new(vec![
            Member::new("vecino_01", "Dina", "#3B82F6"),
            Member::new("vecino_02", "Suegra de Dina", "#10B981"),
            Member::new("vecino_03", "Japa", "#F59E0B"),
            Member::new("vecino_04", "Russel", "#EF4444"),
            Member::new("vecino_05", "Leoncio", "#8B5CF6"),
            Member::new("vecino_06", "Koki", "#EC4899"),
            Member::new("vecino_07", "Jose", "#6366F1"),
            Member::new("vecino_08", "Imperio", "#14B8A6"),
            Member::new("vecino_09", "Inocente", "#F97316"),
        ])
    }

    /// Looks up a member by exact id match.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.id.as_str() == id)
    }

    /// Whether the given id belongs to a known member.
    #[must_use]
    pub fn contains(&self, id: &MemberId) -> bool {
        self.find(id.as_str()).is_some()
    }

    /// Iterates members in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &Member> {
        self.members.iter()
    }

    /// Number of registered members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl<'a> IntoIterator for &'a MemberRegistry {
    type Item = &'a Member;
    type IntoIter = std::slice::Iter<'a, Member>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}
