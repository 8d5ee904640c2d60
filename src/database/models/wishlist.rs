use serde::{Deserialize, Serialize};

use crate::{
    app::AppError,
    database::{
        query::{field_text, Query},
        store::Document,
    },
};

pub const USER_EMAIL: &str = "user_email";
pub const BLOG_ID: &str = "blog_id";

#[derive(Debug, Deserialize)]
pub struct NewEntry {
    pub blog_id: String,
}

/// A (user, blog) pair. Uniqueness is only checked before insert.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct WishlistEntry {
    pub user_email: String,
    pub blog_id: String,
    pub added_at: String,
}

impl WishlistEntry {
    pub fn into_document(self) -> Result<Document, AppError> {
        match serde_json::to_value(self)? {
            serde_json::Value::Object(doc) => Ok(doc),
            _ => Err(AppError::InternalServerError),
        }
    }
}

pub fn for_user(email: &str) -> Query {
    Query::new().eq(USER_EMAIL, email)
}

pub fn entry(email: &str, blog_id: &str) -> Query {
    for_user(email).eq(BLOG_ID, blog_id)
}

/** Blog identifiers referenced by wishlist documents */
pub fn blog_ids(entries: &[Document]) -> Vec<String> {
    entries
        .iter()
        .filter_map(|entry| field_text(entry, BLOG_ID))
        .collect()
}
