use std::cmp::Ordering;

use serde_json::Value;

use super::store::{Document, ID_FIELD};

/// A single predicate on a stored document.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Field text equals the value.
    Eq(&'static str, String),
    /// Field text contains the needle, ignoring case.
    Contains(&'static str, String),
    IdIn(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sort {
    NewestFirst(&'static str),
    OldestFirst(&'static str),
    LongestFirst(&'static str),
}

/// Filter, ordering and limit for a collection lookup.
///
/// Fields are compared by their text rendering, the way PostgreSQL's `->>`
/// operator renders JSON. Documents without the field never match a
/// condition and sort after documents that have it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub conditions: Vec<Condition>,
    pub sort: Option<Sort>,
    pub limit: Option<i64>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn by_id(id: impl Into<String>) -> Self {
        Self::new().ids(vec![id.into()])
    }

    pub fn eq(mut self, field: &'static str, value: impl Into<String>) -> Self {
        self.conditions.push(Condition::Eq(field, value.into()));
        self
    }

    pub fn contains(mut self, field: &'static str, needle: impl Into<String>) -> Self {
        self.conditions.push(Condition::Contains(field, needle.into()));
        self
    }

    pub fn ids(mut self, ids: Vec<String>) -> Self {
        self.conditions.push(Condition::IdIn(ids));
        self
    }

    pub fn sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /** Returns whether a document (with `_id` set) passes every condition */
    pub fn matches(&self, doc: &Document) -> bool {
        self.conditions.iter().all(|condition| match condition {
            Condition::Eq(field, value) => field_text(doc, field).map_or(false, |t| &t == value),
            Condition::Contains(field, needle) => field_text(doc, field)
                .map_or(false, |t| t.to_lowercase().contains(&needle.to_lowercase())),
            Condition::IdIn(ids) => {
                field_text(doc, ID_FIELD).map_or(false, |id| ids.iter().any(|i| *i == id))
            }
        })
    }

    /// Orders and truncates already-filtered documents.
    pub fn arrange(&self, mut docs: Vec<Document>) -> Vec<Document> {
        if let Some(sort) = self.sort {
            docs.sort_by(|a, b| compare(sort, a, b));
        }
        if let Some(limit) = self.limit {
            docs.truncate(limit.max(0) as usize);
        }
        docs
    }
}

/// Text rendering of a top-level field, `None` for missing or null values.
pub fn field_text(doc: &Document, field: &str) -> Option<String> {
    match doc.get(field)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Escapes LIKE wildcards so the needle matches literally.
pub fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn compare(sort: Sort, a: &Document, b: &Document) -> Ordering {
    let (field, key): (&str, fn(String) -> SortKey) = match sort {
        Sort::NewestFirst(f) | Sort::OldestFirst(f) => (f, SortKey::Text),
        Sort::LongestFirst(f) => (f, |t| SortKey::Length(t.chars().count())),
    };
    let (a, b) = (field_text(a, field).map(key), field_text(b, field).map(key));

    match (a, b) {
        (Some(a), Some(b)) => match sort {
            Sort::OldestFirst(_) => a.cmp(&b),
            _ => b.cmp(&a),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[derive(PartialEq, Eq, PartialOrd, Ord)]
enum SortKey {
    Text(String),
    Length(usize),
}
