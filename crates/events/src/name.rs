//! Event name newtype.

use serde::{Deserialize, Serialize};

/// Stable event name/type identifier (e.g. `"case.defendant.added"`).
///
/// Historical producers were not consistent about casing, so all matching
/// against name sets is ASCII case-insensitive. The stored spelling is
/// preserved verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventName(String);

impl EventName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive name comparison, the matching rule used throughout
    /// the transformation pipeline.
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }

    /// Case-insensitive membership test against a set of names.
    pub fn matches_any<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> bool {
        names.into_iter().any(|n| self.matches(n))
    }

    /// Strip a case-insensitive suffix, if present.
    ///
    /// Used to undo temporary archival suffixes appended to names by an old
    /// release (e.g. `"hearing.resulted-ARCHIVED"` back to `"hearing.resulted"`).
    pub fn strip_suffix_ignore_case(&self, suffix: &str) -> Option<EventName> {
        let name = &self.0;
        let split = name.len().checked_sub(suffix.len())?;
        // A split landing inside a multi-byte character cannot be a suffix
        // match, and `split_at` would panic on it.
        if !name.is_char_boundary(split) {
            return None;
        }
        let (head, tail) = name.split_at(split);
        if tail.eq_ignore_ascii_case(suffix) {
            Some(EventName::new(head))
        } else {
            None
        }
    }
}

impl PartialEq for EventName {
    fn eq(&self, other: &Self) -> bool {
        self.matches(other.as_str())
    }
}

impl Eq for EventName {}

impl core::fmt::Display for EventName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EventName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for EventName {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_is_case_insensitive() {
        let name = EventName::new("Hearing.Resulted");
        assert!(name.matches("hearing.resulted"));
        assert!(name.matches_any(["other.event", "HEARING.RESULTED"]));
        assert!(!name.matches("hearing.adjourned"));
    }

    #[test]
    fn stored_spelling_is_preserved() {
        let name = EventName::new("Hearing.Resulted");
        assert_eq!(name.as_str(), "Hearing.Resulted");
    }

    #[test]
    fn archival_suffix_is_stripped_case_insensitively() {
        let name = EventName::new("hearing.resulted-ARCHIVED");
        let stripped = name.strip_suffix_ignore_case("-archived").unwrap();
        assert_eq!(stripped.as_str(), "hearing.resulted");

        assert!(EventName::new("hearing.resulted")
            .strip_suffix_ignore_case("-archived")
            .is_none());
    }

    #[test]
    fn suffix_stripping_handles_multibyte_names() {
        // The byte offset for a "-archived" suffix lands inside the é.
        let name = EventName::new("caféarchived");
        assert!(name.strip_suffix_ignore_case("-archived").is_none());

        // Shorter than the suffix is a plain miss, not an underflow.
        assert!(EventName::new("é").strip_suffix_ignore_case("-archived").is_none());

        // Multi-byte content before a genuine suffix still strips cleanly.
        let stripped = EventName::new("café.opened-ARCHIVED")
            .strip_suffix_ignore_case("-archived")
            .unwrap();
        assert_eq!(stripped.as_str(), "café.opened");
    }
}
