//! Request extractors that report malformed input as field errors.

use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use axum::Json;
use guestbook_core::error::CoreError;
use guestbook_core::validation::validate_request;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::AppError;

/// JSON body that has been deserialized and passed its derived
/// [`Validate`] rules.
///
/// Unparseable bodies, missing fields, and rule violations are all rejected
/// with a `VALIDATION_ERROR` response listing the offending fields.
#[derive(Debug, Clone)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| CoreError::field("body", rejection.body_text()))?;

        validate_request(&value)?;
        Ok(Self(value))
    }
}

/// Query string parsed into `T`. A value that fails to parse (a bad date,
/// a non-numeric page) is a `VALIDATION_ERROR` on the `query` field.
#[derive(Debug, Clone)]
pub struct ValidQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| CoreError::field("query", rejection.body_text()))?;
        Ok(Self(value))
    }
}
