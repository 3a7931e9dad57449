//! Setting declarations.
//!
//! A [`ConfigEntry`] is what a provider declares during initialization: the
//! key, the [`EntryKind`], the default and (for selects) the legal tokens.
//! The entry also knows how to validate a candidate value, which is the only
//! place the per-kind rules live.

use serde::{Deserialize, Serialize};

/// The kind of a declared setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// `"true"` / `"false"`.
    Boolean,
    /// Free text.
    Text,
    /// One of the allowed tokens, stored as the token itself.
    Select,
    /// One of the allowed tokens, stored as its 0-based index.
    SelectIndex,
}

/// A single declared setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    /// Setting name, unique within a store.
    pub key: String,
    /// How values are validated and stored.
    pub kind: EntryKind,
    /// Default in stored form. Empty when the declared default was not a
    /// legal token.
    pub default: String,
    /// Legal tokens; empty for Boolean and Text.
    pub allowed_values: Vec<String>,
    /// Obfuscate at rest. Only honoured for Text.
    pub encrypted: bool,
}

impl ConfigEntry {
    /// Declare a boolean entry.
    pub fn boolean(key: impl Into<String>, default: bool) -> Self {
        Self {
            key: key.into(),
            kind: EntryKind::Boolean,
            default: default.to_string(),
            allowed_values: Vec::new(),
            encrypted: false,
        }
    }

    /// Declare a free-text entry, optionally obfuscated at rest.
    pub fn text(key: impl Into<String>, default: impl Into<String>, encrypted: bool) -> Self {
        Self {
            key: key.into(),
            kind: EntryKind::Text,
            default: default.into(),
            allowed_values: Vec::new(),
            encrypted,
        }
    }

    /// Declare a select entry. A default outside `allowed` leaves the
    /// default empty.
    pub fn select<S: AsRef<str>>(key: impl Into<String>, allowed: &[S], default: &str) -> Self {
        let allowed_values: Vec<String> = allowed.iter().map(|s| s.as_ref().to_string()).collect();
        let default = if allowed_values.iter().any(|v| v == default) {
            default.to_string()
        } else {
            String::new()
        };

        Self {
            key: key.into(),
            kind: EntryKind::Select,
            default,
            allowed_values,
            encrypted: false,
        }
    }

    /// Declare an index-addressed select entry. The default is stored as the
    /// index of `default_token`, or left empty if the token is unknown.
    pub fn select_index<S: AsRef<str>>(
        key: impl Into<String>,
        tokens: &[S],
        default_token: &str,
    ) -> Self {
        let allowed_values: Vec<String> = tokens.iter().map(|s| s.as_ref().to_string()).collect();
        let default = allowed_values
            .iter()
            .position(|t| t == default_token)
            .map(|idx| idx.to_string())
            .unwrap_or_default();

        Self {
            key: key.into(),
            kind: EntryKind::SelectIndex,
            default,
            allowed_values,
            encrypted: false,
        }
    }

    /// Whether this entry's value is obfuscated when persisted.
    pub fn is_encrypted(&self) -> bool {
        self.encrypted && self.kind == EntryKind::Text
    }

    /// Validate `value` against this declaration and return the form to
    /// store, or `None` if it must be rejected.
    pub fn normalize(&self, value: &str) -> Option<String> {
        match self.kind {
            EntryKind::Boolean => parse_bool(value).map(|b| b.to_string()),
            EntryKind::Text => Some(value.to_string()),
            EntryKind::Select => self
                .allowed_values
                .iter()
                .any(|v| v == value)
                .then(|| value.to_string()),
            EntryKind::SelectIndex => {
                // Tokens win over indices so a numeric token still resolves
                // to its own position.
                if let Some(idx) = self.allowed_values.iter().position(|t| t == value) {
                    return Some(idx.to_string());
                }
                self.parse_index(value).map(|idx| idx.to_string())
            }
        }
    }

    /// Validate a value that is already in stored form, as read back from a
    /// settings file or kept across a redeclaration.
    ///
    /// SelectIndex values must be an in-range index here; tokens are not
    /// resolved, so a numeric token can never shadow the persisted index.
    pub fn validate_stored(&self, stored: &str) -> Option<String> {
        match self.kind {
            EntryKind::SelectIndex => self.parse_index(stored).map(|idx| idx.to_string()),
            _ => self.normalize(stored),
        }
    }

    /// Canonical decimal index within the allowed tokens. Rejects forms
    /// such as `"+3"` or `"03"`.
    fn parse_index(&self, value: &str) -> Option<usize> {
        value
            .parse::<usize>()
            .ok()
            .filter(|idx| *idx < self.allowed_values.len() && idx.to_string() == value)
    }

    /// Token for a stored SelectIndex value.
    pub fn token_at(&self, stored: &str) -> Option<&str> {
        if self.kind != EntryKind::SelectIndex {
            return None;
        }
        let idx = self.parse_index(stored)?;
        self.allowed_values.get(idx).map(String::as_str)
    }
}

/// Case-insensitive `"true"` / `"false"`.
pub(crate) fn parse_bool(value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}
