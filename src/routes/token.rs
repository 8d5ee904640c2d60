use actix_web::{post, web::Data, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    app::{AppError, AppState},
    auth::{removal_cookie, token_cookie},
    database::{models::user, store::Collection},
};

#[derive(Deserialize, Serialize)]
struct Credentials {
    pub email: String,
}

/// Pipe for logging in as user
/// - url: `{domain}/api/login`
///
/// # HTTP request requirements
/// ## body
/// - json formatted string containing the `email` key
///
/// # Example
/// ```ignore
/// let data = "{ \"email\": \"reader@blog.test\" }";
/// let request = actix_web::test::TestRequest::post()
///     .uri("localhost/api/login")
///     .set_payload(data)
///     .to_request();
/// ```
///
/// # Response
/// ## Ok
/// - set cookie header containing the signed token
/// ## Error
/// - Bad request
/// - Unauthorized (no user with that email)
/// - Internal server error
#[post("/api/login")]
pub async fn login(req_body: String, app_state: Data<AppState>) -> Result<HttpResponse, AppError> {
    let credentials = serde_json::from_str::<Credentials>(req_body.trim())?;
    let email = credentials.email.trim().to_string();

    let lookup = email.clone();
    let found = app_state
        .run(move |store| store.find_one(Collection::Users, &user::by_email(&lookup)))
        .await?;
    if found.is_none() {
        log::info!("login refused for unknown email");
        return Err(AppError::UnauthorizedError);
    }

    let token = app_state.tokens.issue(&email)?;
    log::debug!("login accepted, token issued");

    Ok(HttpResponse::Ok()
        .cookie(token_cookie(&app_state.config, token))
        .json(json!({ "success": true })))
}

/// Pipe for logging out, the token itself stays valid until it expires
/// - url: `{domain}/api/logout`
///
/// # Response
/// ## Ok
/// - set cookie header removing the token cookie
#[post("/api/logout")]
pub async fn logout(app_state: Data<AppState>) -> HttpResponse {
    HttpResponse::Ok()
        .cookie(removal_cookie(&app_state.config))
        .json(json!({ "success": true }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::TOKEN_COOKIE,
        routes::testing::{init_app, login_as},
    };
    use actix_web::{
        cookie::Cookie,
        test::{self, call_service},
    };

    fn set_cookie(resp: &actix_web::dev::ServiceResponse) -> Option<Cookie<'static>> {
        resp.response()
            .cookies()
            .find(|c| c.name() == TOKEN_COOKIE)
            .map(|c| c.into_owned())
    }

    #[actix_rt::test]
    async fn test_login_with_known_email() {
        let app_state = AppState::in_memory();
        login_as(&app_state, "reader@blog.test", "Reader");
        let app = init_app(&app_state).await;

        let req = test::TestRequest::post()
            .uri("/api/login")
            .insert_header(actix_web::http::header::ContentType::json())
            .set_payload("{ \"email\": \"reader@blog.test\" }")
            .to_request();
        let resp = call_service(&app, req).await;
        pretty_assertions::assert_eq!(resp.status().as_u16(), 200);

        let cookie = set_cookie(&resp).unwrap();
        pretty_assertions::assert_eq!(cookie.http_only(), Some(true));
        pretty_assertions::assert_eq!(
            app_state.tokens.verify(cookie.value()).unwrap().email,
            "reader@blog.test"
        );

        let body: serde_json::Value = test::read_body_json(resp).await;
        pretty_assertions::assert_eq!(body, json!({ "success": true }));
    }

    #[actix_rt::test]
    async fn test_login_with_unknown_email() {
        let app_state = AppState::in_memory();
        let app = init_app(&app_state).await;

        let req = test::TestRequest::post()
            .uri("/api/login")
            .set_json(json!({ "email": "nobody@blog.test" }))
            .to_request();
        let resp = call_service(&app, req).await;

        pretty_assertions::assert_eq!(resp.status().as_u16(), 401);
        assert!(set_cookie(&resp).is_none());
    }

    #[actix_rt::test]
    async fn test_login_without_email() {
        let app = init_app(&AppState::in_memory()).await;

        let req = test::TestRequest::post()
            .uri("/api/login")
            .set_payload("{}")
            .to_request();
        pretty_assertions::assert_eq!(call_service(&app, req).await.status().as_u16(), 400);
    }

    #[actix_rt::test]
    async fn test_logout_clears_cookie() {
        let app = init_app(&AppState::in_memory()).await;

        let req = test::TestRequest::post().uri("/api/logout").to_request();
        let resp = call_service(&app, req).await;
        pretty_assertions::assert_eq!(resp.status().as_u16(), 200);

        let cookie = set_cookie(&resp).unwrap();
        pretty_assertions::assert_eq!(cookie.value(), "");
        pretty_assertions::assert_eq!(
            cookie.max_age(),
            Some(actix_web::cookie::time::Duration::ZERO)
        );
    }
}
