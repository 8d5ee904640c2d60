use actix_web::{
    delete, get, post, put,
    web::{Data, Path, Query as QueryParams},
    HttpRequest, HttpResponse,
};
use chrono::Utc;

use crate::{
    app::{AppError, AppState},
    auth::AuthUser,
    database::{
        models::{
            blog::{self, SearchParams},
            user::{self, UserProfile},
        },
        query::Query,
        store::{Collection, Document},
    },
};

#[get("/api/blogs")]
pub async fn get_blogs(app_state: Data<AppState>) -> Result<HttpResponse, AppError> {
    let blogs = app_state
        .run(|store| store.find(Collection::Blogs, &Query::new()))
        .await?;

    Ok(HttpResponse::Ok().json(blogs))
}

/// Pipe for filtering blogs
/// - url: `{domain}/api/blogs/search?category={category}&search={text}`
///
/// # HTTP request requirements
/// ## query
/// - `category` (optional) - exact category to keep
/// - `search` (optional) - text the title must contain, case is ignored
///
/// # Response
/// ## Ok
/// - json array of the matching [blogs](crate::database::models::blog), newest first
#[get("/api/blogs/search")]
pub async fn search_blogs(
    params: QueryParams<SearchParams>,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let query = blog::search(&params);

    let blogs = app_state
        .run(move |store| store.find(Collection::Blogs, &query))
        .await?;

    Ok(HttpResponse::Ok().json(blogs))
}

#[get("/api/blogs/recent")]
pub async fn recent_blogs(app_state: Data<AppState>) -> Result<HttpResponse, AppError> {
    find_blogs(&app_state, blog::recent(blog::DEFAULT_RECENT_LIMIT)).await
}

/// Pipe for getting the newest blogs
/// - url: `{domain}/api/blogs/recent/{limit}`
///
/// # Response
/// ## Ok
/// - json array of at most `{limit}` blogs, newest first
/// ## Error
/// - Bad request (limit is not a number)
#[get("/api/blogs/recent/{limit}")]
pub async fn recent_blogs_limited(
    req: HttpRequest,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let limit = req.match_info().query("limit").parse::<u32>()?;

    find_blogs(&app_state, blog::recent(limit as i64)).await
}

/// Pipe for getting the blogs with the longest description
/// - url: `{domain}/api/blogs/top/{limit}`
///
/// # Response
/// ## Ok
/// - json array of at most `{limit}` blogs
/// ## Error
/// - Bad request (limit is not a number)
#[get("/api/blogs/top/{limit}")]
pub async fn top_blogs(
    req: HttpRequest,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let limit = req.match_info().query("limit").parse::<u32>()?;

    find_blogs(&app_state, blog::top(limit as i64)).await
}

async fn find_blogs(app_state: &AppState, query: Query) -> Result<HttpResponse, AppError> {
    let blogs = app_state
        .run(move |store| store.find(Collection::Blogs, &query))
        .await?;

    Ok(HttpResponse::Ok().json(blogs))
}

#[get("/api/blogs/{id}")]
pub async fn get_blog(id: Path<String>, app_state: Data<AppState>) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();

    let found = app_state
        .run(move |store| store.find_one(Collection::Blogs, &Query::by_id(id)))
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(HttpResponse::Ok().json(found))
}

/// Pipe for creating a new blog
/// - url: `{domain}/api/blogs`
///
/// # HTTP request requirements
/// ## header
/// - cookie with name `token`, containing the login token
/// ## body
/// - json object of the blog fields (`title`, `category`, `long_description`, ...)
///
/// The author's email, name and image are copied from their user document.
/// `published_at` is set to now unless supplied.
///
/// # Response
/// ## Ok
/// ```text
/// { "acknowledged": true, "insertedId": "9f1c..." }
/// ```
/// ## Error
/// - Bad request
/// - Forbidden
/// - Unauthorized (also when the token owner no longer exists)
/// - Internal server error
#[post("/api/blogs")]
pub async fn create_blog(
    req_body: String,
    auth: AuthUser,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let doc = serde_json::from_str::<Document>(&req_body)?;

    let inserted = app_state
        .run(move |store| {
            let author = store
                .find_one(Collection::Users, &user::by_email(&auth.email))?
                .ok_or(AppError::UnauthorizedError)?;
            let author = UserProfile::from_document(&auth.email, &author);

            store.insert_one(Collection::Blogs, blog::prepare_new(doc, &author, Utc::now()))
        })
        .await?;

    Ok(HttpResponse::Ok().json(inserted))
}

#[put("/api/blogs/{id}")]
pub async fn update_blog(
    id: Path<String>,
    req_body: String,
    _auth: AuthUser,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let fields = serde_json::from_str::<Document>(&req_body)?;
    let id = id.into_inner();

    let updated = app_state
        .run(move |store| store.update_by_id(Collection::Blogs, &id, fields))
        .await?;

    Ok(HttpResponse::Ok().json(updated))
}

#[delete("/api/blogs/{id}")]
pub async fn delete_blog(
    id: Path<String>,
    _auth: AuthUser,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();

    let deleted = app_state
        .run(move |store| store.delete_many(Collection::Blogs, &Query::by_id(id)))
        .await?;

    Ok(HttpResponse::Ok().json(deleted))
}
