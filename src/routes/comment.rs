use actix_web::{
    delete, get, post, put,
    web::{Data, Path},
    HttpRequest, HttpResponse,
};
use chrono::Utc;

use crate::{
    app::{AppError, AppState},
    auth::AuthUser,
    database::{
        models::{
            comment,
            user::{self, UserProfile},
        },
        query::Query,
        store::{Collection, Document},
    },
};

/// Pipe for getting comments from blog
/// - url: `{domain}/api/comments/{blog_id}`
///
/// # Example
/// ```ignore
/// let request = actix_web::test::TestRequest::get()
///     .uri("localhost/api/comments/blog_id")
///     .to_request();
/// ```
///
/// # Response
/// ## Ok
/// - json formatted array of the blog's comments, oldest first
/// ```text
/// [
///     {
///         "_id":"ef7a71b8-53bf-4c01-a3ad-39c332adbb39",
///         "blog_id":"e60a0f7b-381c-46b7-8736-1f204b329727",
///         "text":"Comment body 1",
///         "user_email":"reader@blog.test",
///         "user_name":"Reader",
///         "user_image":"https://img.blog.test/reader.png",
///         "posted_at":"2024-08-12T06:05:31.097Z"
///     }
/// ]
/// ```
#[get("/api/comments/{blog_id}")]
pub async fn get_comments(
    req: HttpRequest,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let blog_id = req.match_info().query("blog_id").to_string();

    let comments = app_state
        .run(move |store| store.find(Collection::Comments, &comment::for_blog(&blog_id)))
        .await?;

    Ok(HttpResponse::Ok().json(comments))
}

/// Pipe for creating a comment
/// - url: `{domain}/api/comments`
///
/// # HTTP request requirements
/// ## header
/// - cookie named `token` containing login token
/// ## body
/// - json object with at least `blog_id` and `text`
///
/// The commenter's name and image are copied from their user document at
/// this point and are not updated afterwards.
///
/// # Response
/// ## Ok
/// - insert result with the new comment id
/// ## Error
/// - Forbidden
/// - Unauthorized
/// - Bad request
#[post("/api/comments")]
pub async fn create_comment(
    req_body: String,
    auth: AuthUser,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let doc = serde_json::from_str::<Document>(&req_body)?;

    let inserted = app_state
        .run(move |store| {
            let commenter = store
                .find_one(Collection::Users, &user::by_email(&auth.email))?
                .ok_or(AppError::UnauthorizedError)?;
            let commenter = UserProfile::from_document(&auth.email, &commenter);

            store.insert_one(
                Collection::Comments,
                comment::prepare_new(doc, &commenter, Utc::now()),
            )
        })
        .await?;

    Ok(HttpResponse::Ok().json(inserted))
}

#[put("/api/comments/{id}")]
pub async fn update_comment(
    id: Path<String>,
    req_body: String,
    _auth: AuthUser,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let fields = serde_json::from_str::<Document>(&req_body)?;
    let id = id.into_inner();

    let updated = app_state
        .run(move |store| store.update_by_id(Collection::Comments, &id, fields))
        .await?;

    Ok(HttpResponse::Ok().json(updated))
}

#[delete("/api/comments/{id}")]
pub async fn delete_comment(
    id: Path<String>,
    _auth: AuthUser,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();

    let deleted = app_state
        .run(move |store| store.delete_many(Collection::Comments, &Query::by_id(id)))
        .await?;

    Ok(HttpResponse::Ok().json(deleted))
}
