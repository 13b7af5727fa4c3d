//! Request extractors whose rejections render as [`AppError`].
//!
//! axum's own extractors answer malformed input with plain-text bodies.
//! These wrappers delegate to them and convert the rejection, so every
//! failure carries the JSON error envelope.

use axum::extract::{FromRequest, FromRequestParts, Multipart, Path, Query, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::AppError;
use crate::state::AppState;

/// A path parameter, e.g. the `{id}` of `/api/tours/{id}/`.
#[derive(Debug, Clone, Copy)]
pub struct AppPath<T>(pub T);

impl<T> FromRequestParts<AppState> for AppPath<T>
where
    T: DeserializeOwned + Send,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(AppPath(value))
    }
}

/// Query string parameters.
#[derive(Debug, Clone)]
pub struct AppQuery<T>(pub T);

impl<T> FromRequestParts<AppState> for AppQuery<T>
where
    T: DeserializeOwned + Send,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(AppQuery(value))
    }
}

/// A JSON body kept as a raw value.
///
/// Only syntax and content-type problems reject here; field types are
/// checked per field by [`crate::handlers::form::JsonForm`].
#[derive(Debug, Clone)]
pub struct AppJson(pub Value);

impl FromRequest<AppState> for AppJson {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state).await?;
        Ok(AppJson(value))
    }
}

/// A `multipart/form-data` body.
#[derive(Debug)]
pub struct AppMultipart(pub Multipart);

impl FromRequest<AppState> for AppMultipart {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let multipart = Multipart::from_request(req, state).await?;
        Ok(AppMultipart(multipart))
    }
}
