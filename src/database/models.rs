pub mod blog;
pub mod comment;
pub mod user;
pub mod wishlist;

use chrono::{DateTime, SecondsFormat, Utc};

/// Fixed-width RFC 3339 text, so stored timestamps sort lexically.
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
