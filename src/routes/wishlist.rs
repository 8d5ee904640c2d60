use actix_web::{
    delete, get, post,
    web::{Data, Path, Query as QueryParams},
    HttpResponse,
};
use chrono::Utc;
use serde_json::json;

use crate::{
    app::{AppError, AppState},
    auth::AuthUser,
    database::{
        models::{
            blog::SearchParams,
            timestamp,
            wishlist::{self, NewEntry, WishlistEntry},
        },
        query::Query,
        store::{Collection, Document, DocumentStore},
    },
};

/// Blogs on `email`'s wishlist that also pass `filter`.
fn wishlisted_blogs(
    store: &dyn DocumentStore,
    email: &str,
    filter: Query,
) -> Result<Vec<Document>, AppError> {
    let entries = store.find(Collection::Wishlist, &wishlist::for_user(email))?;
    let ids = wishlist::blog_ids(&entries);
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    store.find(Collection::Blogs, &filter.ids(ids))
}

/// Pipe for listing the blogs on the logged in user's wishlist
/// - url: `{domain}/api/wishlist`
///
/// # HTTP request requirements
/// ## header
/// - cookie named `token` containing login token
#[get("/api/wishlist")]
pub async fn get_wishlist(auth: AuthUser, app_state: Data<AppState>) -> Result<HttpResponse, AppError> {
    let blogs = app_state
        .run(move |store| wishlisted_blogs(store, &auth.email, Query::new()))
        .await?;

    Ok(HttpResponse::Ok().json(blogs))
}

/// Pipe for filtering the wishlist like `/api/blogs/search` does
/// - url: `{domain}/api/wishlist/search?category={category}&search={text}`
///
/// # Response
/// ## Error
/// - Internal server error on any lookup failure
#[get("/api/wishlist/search")]
pub async fn search_wishlist(
    params: QueryParams<SearchParams>,
    auth: AuthUser,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let filter = params.apply(Query::new());

    let blogs = app_state
        .run(move |store| wishlisted_blogs(store, &auth.email, filter))
        .await
        .map_err(|err| {
            log::error!("wishlist search failed: {}", err);
            AppError::InternalServerError
        })?;

    Ok(HttpResponse::Ok().json(blogs))
}

#[get("/api/wishlist/check/{blog_id}")]
pub async fn check_wishlist(
    blog_id: Path<String>,
    auth: AuthUser,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let blog_id = blog_id.into_inner();

    let found = app_state
        .run(move |store| store.find_one(Collection::Wishlist, &wishlist::entry(&auth.email, &blog_id)))
        .await?;

    Ok(HttpResponse::Ok().json(json!({ "in_wishlist": found.is_some() })))
}

/// Pipe for adding a blog to the wishlist
/// - url: `{domain}/api/wishlist`
///
/// # HTTP request requirements
/// ## header
/// - cookie named `token` containing login token
/// ## body
/// - json formatted string containing the `blog_id` key
///
/// The duplicate check and the insert are separate queries, two concurrent
/// requests for the same blog can both succeed.
///
/// # Response
/// ## Ok
/// - insert result with the new entry id
/// ## Error
/// - Bad request (blog already on the wishlist, or malformed body)
/// - Forbidden
/// - Unauthorized
#[post("/api/wishlist")]
pub async fn add_to_wishlist(
    req_body: String,
    auth: AuthUser,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let new_entry = serde_json::from_str::<NewEntry>(&req_body)?;

    let inserted = app_state
        .run(move |store| {
            let existing = store.find_one(
                Collection::Wishlist,
                &wishlist::entry(&auth.email, &new_entry.blog_id),
            )?;
            if existing.is_some() {
                return Err(AppError::BadRequest);
            }

            let entry = WishlistEntry {
                user_email: auth.email,
                blog_id: new_entry.blog_id,
                added_at: timestamp(Utc::now()),
            };
            store.insert_one(Collection::Wishlist, entry.into_document()?)
        })
        .await?;

    Ok(HttpResponse::Ok().json(inserted))
}

#[delete("/api/wishlist/{blog_id}")]
pub async fn remove_from_wishlist(
    blog_id: Path<String>,
    auth: AuthUser,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let blog_id = blog_id.into_inner();

    let deleted = app_state
        .run(move |store| store.delete_many(Collection::Wishlist, &wishlist::entry(&auth.email, &blog_id)))
        .await?;

    Ok(HttpResponse::Ok().json(deleted))
}
