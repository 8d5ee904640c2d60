pub mod token;

use actix_web::{
    cookie::{time::Duration, Cookie, SameSite},
    dev::Payload,
    web::Data,
    FromRequest, HttpRequest,
};
use futures::future::{ready, Ready};

use crate::app::{config::Config, AppError, AppState};

pub const TOKEN_COOKIE: &str = "token";

/// The owner of a valid token cookie.
///
/// Extracting it is the authentication gate: a request without the cookie is
/// rejected with `Forbidden`, one whose token fails verification with
/// `UnauthorizedError`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub email: String,
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthUser, AppError> {
    let app_state = req
        .app_data::<Data<AppState>>()
        .ok_or(AppError::InternalServerError)?;

    let token = req.cookie(TOKEN_COOKIE).ok_or(AppError::Forbidden)?;
    let claims = app_state.tokens.verify(token.value())?;

    Ok(AuthUser {
        email: claims.email,
    })
}

/** Builds the cookie carrying a freshly issued token */
pub fn token_cookie(config: &Config, token: String) -> Cookie<'static> {
    let mut cookie = base_cookie(config, token);
    cookie.set_max_age(Duration::seconds(config.token_ttl_secs as i64));
    cookie
}

/** Builds a cookie instructing the browser to drop the token */
pub fn removal_cookie(config: &Config) -> Cookie<'static> {
    let mut cookie = base_cookie(config, String::new());
    cookie.make_removal();
    cookie
}

fn base_cookie(config: &Config, value: String) -> Cookie<'static> {
    Cookie::build(TOKEN_COOKIE, value)
        .path("/")
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(if config.cookie_secure {
            SameSite::None
        } else {
            SameSite::Strict
        })
        .finish()
}
