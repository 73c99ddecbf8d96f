//! The read surface the evaluator sees, and a plain record implementing it.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Read-only view of a todo record.
///
/// The evaluator depends on this capability surface and nothing else, so any
/// storage layer can run queries against its own record type without
/// converting to [`Todo`] first. The engine never mutates a todo.
pub trait TodoView {
    /// The free-text description.
    fn desc(&self) -> &str;

    /// Whether the todo is marked done.
    fn done(&self) -> bool;

    /// The creation date, when known.
    fn create_date(&self) -> Option<NaiveDate>;

    /// The completion date, when known.
    fn done_date(&self) -> Option<NaiveDate>;

    /// The priority letter (A-Z), when assigned.
    fn priority(&self) -> Option<char>;

    /// True if `word` is one of the todo's `@` context tags.
    fn has_context(&self, word: &str) -> bool;

    /// True if `word` is one of the todo's `+` project tags.
    fn has_project(&self, word: &str) -> bool;

    /// True if `word` is one of the todo's `#` hash tags.
    fn has_tag(&self, word: &str) -> bool;

    /// The value stored under `key`, when the key is present.
    fn metadata_value(&self, key: &str) -> Option<&str>;
}

/// A plain, owned todo record.
///
/// Storage and workflow layers typically have richer types; this one exists
/// for callers without them and for tests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// The free-text description.
    pub desc: String,

    /// Whether the todo is marked done.
    #[serde(default)]
    pub done: bool,

    /// The creation date, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_date: Option<NaiveDate>,

    /// The completion date, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done_date: Option<NaiveDate>,

    /// The priority letter (A-Z), when assigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<char>,

    /// `@` context tags.
    #[serde(default)]
    pub contexts: BTreeSet<String>,

    /// `+` project tags.
    #[serde(default)]
    pub projects: BTreeSet<String>,

    /// `#` hash tags.
    #[serde(default)]
    pub tags: BTreeSet<String>,

    /// `key=value` metadata annotations.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl TodoView for Todo {
    fn desc(&self) -> &str {
        &self.desc
    }

    fn done(&self) -> bool {
        self.done
    }

    fn create_date(&self) -> Option<NaiveDate> {
        self.create_date
    }

    fn done_date(&self) -> Option<NaiveDate> {
        self.done_date
    }

    fn priority(&self) -> Option<char> {
        self.priority
    }

    fn has_context(&self, word: &str) -> bool {
        self.contexts.contains(word)
    }

    fn has_project(&self, word: &str) -> bool {
        self.projects.contains(word)
    }

    fn has_tag(&self, word: &str) -> bool {
        self.tags.contains(word)
    }

    fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_todo_default_is_open_and_empty() {
        let todo = Todo::default();
        assert!(!todo.done());
        assert_eq!(todo.desc(), "");
        assert!(todo.create_date().is_none());
        assert!(todo.done_date().is_none());
        assert!(todo.priority().is_none());
        assert!(!todo.has_context("work"));
        assert!(!todo.has_project("side"));
        assert!(!todo.has_tag("misc"));
        assert!(todo.metadata_value("est").is_none());
    }

    #[test]
    fn test_todo_view_lookups() {
        let todo = Todo {
            desc: "Buy milk".to_string(),
            done: true,
            priority: Some('A'),
            contexts: ["home".to_string()].into(),
            projects: ["groceries".to_string()].into(),
            tags: ["errand".to_string()].into(),
            metadata: [("est".to_string(), "3".to_string())].into(),
            ..Todo::default()
        };

        assert!(todo.has_context("home"));
        assert!(!todo.has_context("work"));
        assert!(todo.has_project("groceries"));
        assert!(todo.has_tag("errand"));
        assert_eq!(todo.metadata_value("est"), Some("3"));
    }

    #[test]
    fn test_todo_serde_roundtrip() {
        let todo = Todo {
            desc: "Water the plants".to_string(),
            done: false,
            create_date: NaiveDate::from_ymd_opt(2024, 3, 1),
            priority: Some('B'),
            contexts: ["home".to_string()].into(),
            metadata: [("due".to_string(), "2024-03-08".to_string())].into(),
            ..Todo::default()
        };

        let json = serde_json::to_string(&todo).unwrap();
        let back: Todo = serde_json::from_str(&json).unwrap();
        assert_eq!(todo, back);
    }

    #[test]
    fn test_todo_serialize_skips_absent_fields() {
        let todo = Todo {
            desc: "Bare".to_string(),
            ..Todo::default()
        };
        let json = serde_json::to_string(&todo).unwrap();
        assert!(!json.contains("create_date"));
        assert!(!json.contains("done_date"));
        assert!(!json.contains("priority"));
    }
}
