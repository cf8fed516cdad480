//! Scanned payload resolution against the member registry.
//!
//! Scanned payloads arrive in two shapes: the structured JSON record printed
//! into camera tokens (`{"id":"vecino_03","name":"Japa"}`), and bare strings
//! typed by a USB keyboard-wedge scanner. Both are accepted: if the payload
//! does not parse as the structured record, the whole raw string is taken as
//! the identifier verbatim.
//!
//! Resolution failure is not an error. An unknown id yields
//! [`Resolution::Unresolved`], a first-class outcome the caller handles
//! (prompt for a rescan) without aborting the active scan session.

use crate::member::{Member, MemberRegistry};
use serde::{Deserialize, Serialize};

/// The structured record encoded into a printed token.
///
/// Only `id` is required for resolution; `name` is carried for human
/// inspection of the printed card and is never trusted for lookup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
    /// Member identifier, matched exactly against the registry
    pub id: String,
    /// Display name as printed, informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl TokenPayload {
    /// The payload to print into a member's token.
    #[must_use]
    pub fn for_member(member: &Member) -> Self {
        Self {
            id: member.id.as_str().to_string(),
            name: Some(member.display_name.clone()),
        }
    }

    /// Serializes the payload to the JSON string embedded in the token image.
    ///
    /// # Errors
    ///
    /// Returns a `serde_json::Error` if serialization fails, which cannot
    /// happen for this type in practice.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Outcome of resolving a scanned payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// The payload identified a registered member.
    Member(Member),
    /// The payload decoded but matched no registered member.
    ///
    /// The session stays active; the user may rescan.
    Unresolved {
        /// The identifier that failed to match, for the retry prompt
        raw_id: String,
    },
}

impl Resolution {
    /// The matched member, if any.
    #[must_use]
    pub const fn member(&self) -> Option<&Member> {
        match self {
            Self::Member(member) => Some(member),
            Self::Unresolved { .. } => None,
        }
    }
}

/// Resolves a scanned payload to a registered member.
///
/// Attempts to parse `raw_payload` as a [`TokenPayload`]; on parse failure
/// the entire raw string is used as the identifier. Lookup is by exact match.
///
/// # Examples
///
/// ```
/// use llavero_core::member::MemberRegistry;
/// use llavero_core::resolver::{resolve, Resolution};
///
/// let registry = MemberRegistry::default_community();
///
/// match resolve(&registry, r#"{"id":"vecino_03"}"#) {
///     Resolution::Member(m) => assert_eq!(m.display_name, "Japa"),
///     Resolution::Unresolved { .. } => unreachable!(),
/// }
///
/// assert!(matches!(
///     resolve(&registry, "vecino_99"),
///     Resolution::Unresolved { .. }
/// ));
/// ```
#[must_use]
pub fn resolve(registry: &MemberRegistry, raw_payload: &str) -> Resolution {
    let candidate_id = match serde_json::from_str::<TokenPayload>(raw_payload) {
        Ok(payload) => payload.id,
        Err(error) => {
            tracing::debug!(%error, "payload is not a structured token, using raw string as id");
            raw_payload.to_string()
        }
    };

    match registry.find(&candidate_id) {
        Some(member) => Resolution::Member(member.clone()),
        None => Resolution::Unresolved {
            raw_id: candidate_id,
        },
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

    use super::*;

    fn registry() -> MemberRegistry {
        MemberRegistry::default_community()
    }

    #[test]
    fn structured_payload_resolves_to_member() {
        let resolution = resolve(&registry(), r#"{"id":"vecino_03","name":"Japa"}"#);
        assert_eq!(
            resolution.member().map(|m| m.display_name.as_str()),
            Some("Japa")
        );
    }

    #[test]
    fn printed_name_is_not_trusted_for_lookup() {
        // A tampered token with a known id but wrong name still resolves by id.
        let resolution = resolve(&registry(), r#"{"id":"vecino_01","name":"Japa"}"#);
        assert_eq!(
            resolution.member().map(|m| m.display_name.as_str()),
            Some("Dina")
        );
    }

    #[test]
    fn raw_string_payload_resolves_verbatim() {
        let resolution = resolve(&registry(), "vecino_05");
        assert_eq!(
            resolution.member().map(|m| m.display_name.as_str()),
            Some("Leoncio")
        );
    }

    #[test]
    fn unknown_id_is_unresolved_not_error() {
        let resolution = resolve(&registry(), "vecino_99");
        assert_eq!(
            resolution,
            Resolution::Unresolved {
                raw_id: "vecino_99".to_string()
            }
        );
    }

    #[test]
    fn structured_payload_with_unknown_id_is_unresolved() {
        let resolution = resolve(&registry(), r#"{"id":"vecino_99"}"#);
        assert_eq!(
            resolution,
            Resolution::Unresolved {
                raw_id: "vecino_99".to_string()
            }
        );
    }

    #[test]
    fn garbage_json_falls_back_to_raw() {
        // Parseable as JSON but not as a token record: the raw text is the id.
        let resolution = resolve(&registry(), r#"{"user":"vecino_03"}"#);
        assert!(matches!(resolution, Resolution::Unresolved { .. }));
    }

    #[test]
    fn token_payload_encode_decode() {
        let member = registry().find("vecino_07").unwrap().clone();
        let payload = TokenPayload::for_member(&member);
        let encoded = payload.encode().unwrap();
        let decoded: TokenPayload = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded.id, "vecino_07");
        assert_eq!(decoded.name.as_deref(), Some("Jose"));
    }
}
