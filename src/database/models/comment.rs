use chrono::{DateTime, Utc};
use serde_json::Value;

use super::{timestamp, user::UserProfile};
use crate::database::{
    query::{Query, Sort},
    store::Document,
};

pub const BLOG_ID: &str = "blog_id";
pub const USER_EMAIL: &str = "user_email";
pub const USER_NAME: &str = "user_name";
pub const USER_IMAGE: &str = "user_image";
pub const POSTED_AT: &str = "posted_at";

pub fn for_blog(blog_id: &str) -> Query {
    Query::new()
        .eq(BLOG_ID, blog_id)
        .sort(Sort::OldestFirst(POSTED_AT))
}

/// Denormalizes the commenter onto the comment. Later profile changes are
/// not carried over.
pub fn prepare_new(mut doc: Document, commenter: &UserProfile, now: DateTime<Utc>) -> Document {
    doc.insert(USER_EMAIL.to_string(), Value::String(commenter.email.clone()));
    doc.insert(USER_NAME.to_string(), commenter.name.clone());
    doc.insert(USER_IMAGE.to_string(), commenter.photo_url.clone());
    doc.insert(POSTED_AT.to_string(), Value::String(timestamp(now)));
    doc
}
