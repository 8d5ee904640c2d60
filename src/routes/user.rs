use actix_web::{
    delete, get, post, put,
    web::{Data, Path},
    HttpRequest, HttpResponse,
};
use serde_json::json;

use crate::{
    app::{AppError, AppState},
    auth::AuthUser,
    database::{
        models::user,
        query::Query,
        store::{Collection, Document},
    },
};

/// Pipe for checking whether an email is registered
/// - url: `{domain}/api/users/exists/{email}`
///
/// # Response
/// ## Ok
/// ```text
/// { "exists": true }
/// ```
#[get("/api/users/exists/{email}")]
pub async fn user_exists(
    email: Path<String>,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let email = email.into_inner();
    let found = app_state
        .run(move |store| store.find_one(Collection::Users, &user::by_email(&email)))
        .await?;

    Ok(HttpResponse::Ok().json(json!({ "exists": found.is_some() })))
}

/// Pipe for fetching the logged in user's document
/// - url: `{domain}/api/users/{email}`
///
/// # HTTP request requirements
/// - `{email}` must be the email the token was issued for
/// ## header
/// - cookie named `token` containing login token
///
/// # Response
/// ## Ok
/// - json of the user document
/// ## Error
/// - Forbidden (no token, or another user's email)
/// - Unauthorized
/// - Not found
#[get("/api/users/{email}")]
pub async fn get_user(
    req: HttpRequest,
    auth: AuthUser,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let email = req.match_info().query("email").to_string();
    if email != auth.email {
        return Err(AppError::Forbidden);
    }

    let found = app_state
        .run(move |store| store.find_one(Collection::Users, &user::by_email(&email)))
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(HttpResponse::Ok().json(found))
}

/// Pipe for creating an user, the body is stored as sent
/// - url: `{domain}/api/users`
///
/// # Response
/// ## Ok
/// ```text
/// { "acknowledged": true, "insertedId": "9f1c..." }
/// ```
/// ## Error
/// - Bad request
#[post("/api/users")]
pub async fn create_user(
    req_body: String,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let doc = serde_json::from_str::<Document>(&req_body)?;

    let inserted = app_state
        .run(move |store| store.insert_one(Collection::Users, doc))
        .await?;

    Ok(HttpResponse::Ok().json(inserted))
}

#[put("/api/users/{id}")]
pub async fn update_user(
    id: Path<String>,
    req_body: String,
    _auth: AuthUser,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let fields = serde_json::from_str::<Document>(&req_body)?;
    let id = id.into_inner();

    let updated = app_state
        .run(move |store| store.update_by_id(Collection::Users, &id, fields))
        .await?;

    Ok(HttpResponse::Ok().json(updated))
}

#[delete("/api/users/{id}")]
pub async fn delete_user(
    id: Path<String>,
    _auth: AuthUser,
    app_state: Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();

    let deleted = app_state
        .run(move |store| store.delete_many(Collection::Users, &Query::by_id(id)))
        .await?;

    Ok(HttpResponse::Ok().json(deleted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::testing::{init_app, insert, login_as};
    use actix_web::{
        cookie::CookieBuilder,
        test::{self, call_service},
    };
    use serde_json::Value;

    #[actix_rt::test]
    async fn test_user_exists() {
        let app_state = AppState::in_memory();
        insert(&app_state, Collection::Users, json!({ "email": "a@blog.test" }));
        let app = init_app(&app_state).await;

        let req = test::TestRequest::get()
            .uri("/api/users/exists/a@blog.test")
            .to_request();
        let body: Value = test::read_body_json(call_service(&app, req).await).await;
        pretty_assertions::assert_eq!(body, json!({ "exists": true }));

        let req = test::TestRequest::get()
            .uri("/api/users/exists/b@blog.test")
            .to_request();
        let body: Value = test::read_body_json(call_service(&app, req).await).await;
        pretty_assertions::assert_eq!(body, json!({ "exists": false }));
    }

    #[actix_rt::test]
    async fn test_get_user_requires_matching_token() {
        let app_state = AppState::in_memory();
        let cookie = login_as(&app_state, "a@blog.test", "Ann");
        login_as(&app_state, "b@blog.test", "Bob");
        let app = init_app(&app_state).await;

        let req = test::TestRequest::get().uri("/api/users/a@blog.test").to_request();
        pretty_assertions::assert_eq!(call_service(&app, req).await.status().as_u16(), 403);

        let tampered = CookieBuilder::new(crate::auth::TOKEN_COOKIE, "not.a.token").finish();
        let req = test::TestRequest::get()
            .uri("/api/users/a@blog.test")
            .cookie(tampered)
            .to_request();
        pretty_assertions::assert_eq!(call_service(&app, req).await.status().as_u16(), 401);

        let req = test::TestRequest::get()
            .uri("/api/users/b@blog.test")
            .cookie(cookie.clone())
            .to_request();
        pretty_assertions::assert_eq!(call_service(&app, req).await.status().as_u16(), 403);

        let req = test::TestRequest::get()
            .uri("/api/users/a@blog.test")
            .cookie(cookie)
            .to_request();
        let resp = call_service(&app, req).await;
        assert!(resp.status().is_success());
        let body: Value = test::read_body_json(resp).await;
        pretty_assertions::assert_eq!(body["name"], json!("Ann"));
    }

    #[actix_rt::test]
    async fn test_user_lifecycle() {
        let app_state = AppState::in_memory();
        let cookie = login_as(&app_state, "admin@blog.test", "Admin");
        let app = init_app(&app_state).await;

        let req = test::TestRequest::post()
            .uri("/api/users")
            .set_json(json!({ "email": "new@blog.test", "name": "New" }))
            .to_request();
        let body: Value = test::read_body_json(call_service(&app, req).await).await;
        let id = body["insertedId"].as_str().unwrap().to_string();

        let req = test::TestRequest::put()
            .uri(&format!("/api/users/{}", id))
            .cookie(cookie.clone())
            .set_json(json!({ "name": "Renamed" }))
            .to_request();
        let body: Value = test::read_body_json(call_service(&app, req).await).await;
        pretty_assertions::assert_eq!(body["modifiedCount"], json!(1));

        let stored = app_state
            .store
            .find_one(Collection::Users, &Query::by_id(id.clone()))
            .unwrap()
            .unwrap();
        pretty_assertions::assert_eq!(stored["name"], json!("Renamed"));

        let req = test::TestRequest::delete()
            .uri(&format!("/api/users/{}", id))
            .to_request();
        pretty_assertions::assert_eq!(call_service(&app, req).await.status().as_u16(), 403);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/users/{}", id))
            .cookie(cookie)
            .to_request();
        let body: Value = test::read_body_json(call_service(&app, req).await).await;
        pretty_assertions::assert_eq!(body["deletedCount"], json!(1));
    }
}
