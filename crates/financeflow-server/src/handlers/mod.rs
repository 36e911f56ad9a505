//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod analytics;
pub mod auth;
pub mod budgets;
pub mod categories;
pub mod goals;
pub mod transactions;

// Re-export all handlers for use in router
pub use analytics::*;
pub use auth::*;
pub use budgets::*;
pub use categories::*;
pub use goals::*;
pub use transactions::*;

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;

use crate::AppError;

/// `Json` extractor whose rejections keep their status but use the
/// `{"error": ...}` body
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(AppError::with_status(
                rejection.status(),
                &rejection.body_text(),
            )),
        }
    }
}

/// `Query` extractor with the same error shape; bad query strings are 400s
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => Err(AppError::with_status(
                rejection.status(),
                &rejection.body_text(),
            )),
        }
    }
}

/// Decode a JSON body into a request type, reporting shape errors as 400
pub(crate) fn parse_body<T: DeserializeOwned>(
    body: serde_json::Value,
    what: &str,
) -> Result<T, AppError> {
    serde_json::from_value(body)
        .map_err(|e| AppError::bad_request(&format!("Invalid {} data: {}", what, e)))
}
