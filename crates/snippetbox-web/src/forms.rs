//! Form validation.
//!
//! A `Validator` is a field-error map plus the `check_field` rule. Form
//! types embed one by value and run their checks through it. The predicate
//! helpers are free functions so any form can reuse them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use snippetbox_store::EXPIRY_CHOICES;

/// Maximum title length, in characters.
pub const TITLE_MAX_CHARS: usize = 100;

/// Expiry pre-selected on a blank create form.
pub const DEFAULT_EXPIRY_DAYS: i64 = 365;

/// Accumulates at most one error message per field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Validator {
    pub field_errors: BTreeMap<String, String>,
}

impl Validator {
    /// True when no field has an error.
    pub fn valid(&self) -> bool {
        self.field_errors.is_empty()
    }

    /// Record `message` for `key` unless the field already has an error.
    pub fn add_field_error(&mut self, key: &str, message: &str) {
        self.field_errors
            .entry(key.to_string())
            .or_insert_with(|| message.to_string());
    }

    /// Record `message` for `key` when `ok` is false.
    pub fn check_field(&mut self, ok: bool, key: &str, message: &str) {
        if !ok {
            self.add_field_error(key, message);
        }
    }

    #[cfg(test)]
    pub fn error(&self, key: &str) -> Option<&str> {
        self.field_errors.get(key).map(String::as_str)
    }
}

/// Non-empty once surrounding whitespace is removed.
pub fn not_blank(value: &str) -> bool {
    !value.trim().is_empty()
}

/// At most `n` characters (Unicode scalar values, not bytes).
pub fn max_chars(value: &str, n: usize) -> bool {
    value.chars().count() <= n
}

pub fn permitted_value<T: PartialEq>(value: &T, permitted: &[T]) -> bool {
    permitted.contains(value)
}

// ── Snippet create form ─────────────────────────────────────────

/// Raw `POST /snippet/create` body.
///
/// Missing text fields decode as empty so they fail validation instead of
/// parsing. A non-integer `expires` is a malformed body.
#[derive(Debug, Deserialize)]
pub struct SnippetCreateInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub expires: i64,
}

/// Create form values plus their validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnippetCreateForm {
    pub title: String,
    pub content: String,
    pub expires: i64,
    #[serde(flatten)]
    pub validator: Validator,
}

impl Default for SnippetCreateForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            content: String::new(),
            expires: DEFAULT_EXPIRY_DAYS,
            validator: Validator::default(),
        }
    }
}

impl From<SnippetCreateInput> for SnippetCreateForm {
    fn from(input: SnippetCreateInput) -> Self {
        Self {
            title: input.title,
            content: input.content,
            expires: input.expires,
            validator: Validator::default(),
        }
    }
}

impl SnippetCreateForm {
    /// Run every field check. Returns `valid()`.
    pub fn validate(&mut self) -> bool {
        let v = &mut self.validator;
        v.check_field(not_blank(&self.title), "title", "This field cannot be blank");
        v.check_field(
            max_chars(&self.title, TITLE_MAX_CHARS),
            "title",
            "This field cannot be more than 100 characters long",
        );
        v.check_field(not_blank(&self.content), "content", "This field cannot be blank");
        v.check_field(
            permitted_value(&self.expires, &EXPIRY_CHOICES),
            "expires",
            "This field must equal 1, 7 or 365",
        );
        v.valid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(title: &str, content: &str, expires: i64) -> SnippetCreateForm {
        SnippetCreateForm {
            title: title.to_string(),
            content: content.to_string(),
            expires,
            validator: Validator::default(),
        }
    }

    #[test]
    fn not_blank_trims_whitespace() {
        assert!(not_blank("x"));
        assert!(not_blank("  x  "));
        assert!(!not_blank(""));
        assert!(!not_blank(" \t\n "));
    }

    #[test]
    fn max_chars_counts_characters_not_bytes() {
        let exactly_100 = "é".repeat(100);
        let exactly_101 = "é".repeat(101);
        assert_eq!(exactly_100.len(), 200);
        assert!(max_chars(&exactly_100, 100));
        assert!(!max_chars(&exactly_101, 100));
        assert!(max_chars("", 0));
    }

    #[test]
    fn permitted_value_checks_membership() {
        assert!(permitted_value(&7, &EXPIRY_CHOICES));
        assert!(!permitted_value(&30, &EXPIRY_CHOICES));
        assert!(permitted_value(&"b", &["a", "b"]));
    }

    #[test]
    fn check_field_keeps_first_failure() {
        let mut v = Validator::default();
        v.check_field(false, "title", "first");
        v.check_field(false, "title", "second");
        v.check_field(true, "content", "never");
        assert_eq!(v.error("title"), Some("first"));
        assert_eq!(v.error("content"), None);
        assert!(!v.valid());
    }

    #[test]
    fn add_field_error_does_not_overwrite() {
        let mut v = Validator::default();
        v.add_field_error("expires", "one");
        v.add_field_error("expires", "two");
        assert_eq!(v.field_errors.len(), 1);
        assert_eq!(v.error("expires"), Some("one"));
    }

    #[test]
    fn valid_form_has_no_errors() {
        let mut f = form("Test", "Body", 7);
        assert!(f.validate());
        assert!(f.validator.field_errors.is_empty());
    }

    #[test]
    fn blank_title_wins_over_length() {
        let mut f = form("   ", "Body", 1);
        assert!(!f.validate());
        assert_eq!(f.validator.error("title"), Some("This field cannot be blank"));
    }

    #[test]
    fn long_multibyte_title_is_rejected() {
        let mut f = form(&"ü".repeat(101), "Body", 365);
        assert!(!f.validate());
        assert_eq!(
            f.validator.error("title"),
            Some("This field cannot be more than 100 characters long")
        );

        let mut f = form(&"ü".repeat(100), "Body", 365);
        assert!(f.validate());
    }

    #[test]
    fn every_failing_field_is_reported() {
        let mut f = form("", "", 30);
        assert!(!f.validate());
        let keys: Vec<_> = f.validator.field_errors.keys().cloned().collect();
        assert_eq!(keys, vec!["content", "expires", "title"]);
    }

    #[test]
    fn validation_is_idempotent() {
        let mut f = form("", "Body", 2);
        f.validate();
        let first = f.validator.clone();
        f.validate();
        assert_eq!(f.validator, first);
    }

    #[test]
    fn default_form_preselects_a_year() {
        assert_eq!(SnippetCreateForm::default().expires, 365);
    }

    #[test]
    fn form_serializes_field_errors_for_templates() {
        let mut f = form("", "Body", 7);
        f.validate();
        let value = serde_json::to_value(&f).unwrap();
        assert_eq!(value["content"], "Body");
        assert_eq!(value["field_errors"]["title"], "This field cannot be blank");
    }
}
