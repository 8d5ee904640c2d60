use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use super::{timestamp, user::UserProfile};
use crate::database::{
    query::{Query, Sort},
    store::Document,
};

pub const TITLE: &str = "title";
pub const CATEGORY: &str = "category";
pub const LONG_DESCRIPTION: &str = "long_description";
pub const PUBLISHED_AT: &str = "published_at";
pub const AUTHOR_EMAIL: &str = "author_email";
pub const AUTHOR_NAME: &str = "author_name";
pub const AUTHOR_IMAGE: &str = "author_image";

pub const DEFAULT_RECENT_LIMIT: i64 = 6;

/// `?category=&search=` filter shared by blog and wishlist search.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    pub category: Option<String>,
    pub search: Option<String>,
}

impl SearchParams {
    /// Adds an exact category match and a case-insensitive title match,
    /// skipping whichever parameter is blank.
    pub fn apply(&self, mut query: Query) -> Query {
        if let Some(category) = non_blank(&self.category) {
            query = query.eq(CATEGORY, category);
        }
        if let Some(text) = non_blank(&self.search) {
            query = query.contains(TITLE, text);
        }
        query
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

pub fn search(params: &SearchParams) -> Query {
    params.apply(Query::new()).sort(Sort::NewestFirst(PUBLISHED_AT))
}

pub fn recent(limit: i64) -> Query {
    Query::new()
        .sort(Sort::NewestFirst(PUBLISHED_AT))
        .limit(limit)
}

/** Blogs with the longest long-form description first */
pub fn top(limit: i64) -> Query {
    Query::new()
        .sort(Sort::LongestFirst(LONG_DESCRIPTION))
        .limit(limit)
}

/// Copies the author's details into a new blog and stamps the publish date
/// unless the caller supplied one.
pub fn prepare_new(mut doc: Document, author: &UserProfile, now: DateTime<Utc>) -> Document {
    doc.insert(AUTHOR_EMAIL.to_string(), Value::String(author.email.clone()));
    doc.insert(AUTHOR_NAME.to_string(), author.name.clone());
    doc.insert(AUTHOR_IMAGE.to_string(), author.photo_url.clone());
    doc.entry(PUBLISHED_AT.to_string())
        .or_insert_with(|| Value::String(timestamp(now)));
    doc
}
