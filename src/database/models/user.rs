use serde_json::Value;

use crate::database::{query::Query, store::Document};

pub const EMAIL: &str = "email";
pub const NAME: &str = "name";
pub const PHOTO_URL: &str = "photo_url";

/// The part of a user document other records copy from. Name and photo are
/// kept as stored, whatever their JSON type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserProfile {
    pub email: String,
    pub name: Value,
    pub photo_url: Value,
}

impl UserProfile {
    /// `email` is the address the document was looked up by.
    pub fn from_document(email: &str, doc: &Document) -> UserProfile {
        UserProfile {
            email: email.to_string(),
            name: doc.get(NAME).cloned().unwrap_or(Value::Null),
            photo_url: doc.get(PHOTO_URL).cloned().unwrap_or(Value::Null),
        }
    }
}

pub fn by_email(email: &str) -> Query {
    Query::new().eq(EMAIL, email)
}
