pub mod config;

use std::{fmt::Display, num::ParseIntError, sync::Arc};

use actix_web::{error::BlockingError, web, HttpResponse, ResponseError};
use serde_json::json;

use crate::{
    auth::token::TokenKeys,
    database::store::DocumentStore,
};
use config::Config;

/** Shared by every worker while handling requests */
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub tokens: Arc<TokenKeys>,
    pub config: Arc<Config>,
}

impl Clone for AppState {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            tokens: self.tokens.clone(),
            config: self.config.clone(),
        }
    }
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn DocumentStore>) -> Self {
        let tokens = TokenKeys::new(&config.token_secret, config.token_ttl_secs);

        Self {
            store,
            tokens: Arc::new(tokens),
            config: Arc::new(config),
        }
    }

    /// Runs a store operation on the blocking thread pool, the database
    /// driver is synchronous.
    pub async fn run<F, T>(&self, op: F) -> Result<T, AppError>
    where
        F: FnOnce(&dyn DocumentStore) -> Result<T, AppError> + Send + 'static,
        T: Send + 'static,
    {
        let store = self.store.clone();
        web::block(move || op(store.as_ref())).await?
    }

    #[cfg(test)]
    pub fn in_memory() -> Self {
        use crate::database::memory::MemoryStore;

        let config = Config {
            token_secret: "test-secret".to_string(),
            ..Config::default()
        };
        Self::new(config, Arc::new(MemoryStore::default()))
    }
}

/** Holds the errors we will use during request processing */
#[derive(Debug, PartialEq, Eq)]
pub enum AppError {
    UnauthorizedError,
    InternalServerError,
    BadRequest,
    Forbidden,
    NotFound,
}

impl Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::UnauthorizedError => f.write_str("Unauthorized"),
            AppError::InternalServerError => f.write_str("Internal server error"),
            AppError::BadRequest => f.write_str("Bad request"),
            AppError::Forbidden => f.write_str("Forbidden"),
            AppError::NotFound => f.write_str("Not found"),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        match self {
            AppError::UnauthorizedError => actix_web::http::StatusCode::UNAUTHORIZED,
            AppError::InternalServerError => actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest => actix_web::http::StatusCode::BAD_REQUEST,
            AppError::Forbidden => actix_web::http::StatusCode::FORBIDDEN,
            AppError::NotFound => actix_web::http::StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "message": self.to_string() }))
    }
}

impl From<diesel::result::Error> for AppError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => AppError::NotFound,
            other => {
                log::error!("database error: {}", other);
                AppError::InternalServerError
            }
        }
    }
}
impl From<diesel::r2d2::PoolError> for AppError {
    fn from(err: diesel::r2d2::PoolError) -> Self {
        log::error!("connection pool error: {}", err);
        AppError::InternalServerError
    }
}
impl From<BlockingError> for AppError {
    fn from(err: BlockingError) -> Self {
        log::error!("blocking task failed: {}", err);
        AppError::InternalServerError
    }
}
impl From<ParseIntError> for AppError {
    fn from(_: ParseIntError) -> Self {
        Self::BadRequest
    }
}
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        match err.classify() {
            serde_json::error::Category::Io => AppError::InternalServerError,
            _ => AppError::BadRequest,
        }
    }
}
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        log::debug!("rejected token: {}", err);
        AppError::UnauthorizedError
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body;

    #[actix_rt::test]
    async fn test_error_body_carries_message() {
        let resp = AppError::Forbidden.error_response();
        pretty_assertions::assert_eq!(resp.status().as_u16(), 403);

        let bytes = body::to_bytes(resp.into_body()).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        pretty_assertions::assert_eq!(value, json!({ "message": "Forbidden" }));
    }

    #[test]
    fn test_json_errors_are_bad_requests() {
        let err = serde_json::from_str::<serde_json::Value>("{ not json").unwrap_err();
        pretty_assertions::assert_eq!(AppError::from(err), AppError::BadRequest);
        pretty_assertions::assert_eq!(
            AppError::from("x".parse::<i64>().unwrap_err()),
            AppError::BadRequest
        );
    }
}
