//! Request extractors whose rejections render through `ApiError`, so a bad
//! body, id or query string gets the same `{"error": ..}` 400 as any other
//! validation failure.

use axum::extract::{FromRequest, FromRequestParts};

use crate::interfaces::web::error::ApiError;

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);
