use crate::server::ServerError;
use axum::extract::{FromRequestParts, Query as AxumQuery};

/// Query-string extractor routing rejections through [`ServerError`] so
/// malformed parameters produce the standard error body.
#[derive(FromRequestParts, Debug, Clone, Copy, Default)]
#[from_request(via(AxumQuery), rejection(ServerError))]
pub struct Query<T>(pub T);
