use axum::{
    Router,
    extract::{
        FromRef, Request,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use axum_extra::typed_header::TypedHeaderRejection;
use fellwerk_common::model::{
    Id,
    notice::{InvalidNoticeCategoryError, InvalidSexError, NoticeMarker},
};
use fellwerk_db::client::{DbClient, DbError};
use json::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

pub mod auth;
mod json;
mod query;
mod routes;

pub type ServerRouter = Router<ServerState>;

#[derive(Clone, Debug, FromRef)]
pub struct ServerState {
    pub db_client: Arc<DbClient>,
}

pub fn routes() -> ServerRouter {
    routes::routes().fallback(fallback)
}

pub async fn fallback(request: Request) -> ServerError {
    ServerError::UnknownRoute(request.into_parts().0.uri)
}

pub type Result<T, E = ServerError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Unknown route requested: {0}")]
    UnknownRoute(Uri),
    #[error("Path rejected: {0}")]
    PathRejection(#[from] PathRejection),
    #[error("Query parameters rejected: {0}")]
    QueryRejection(#[from] QueryRejection),
    #[error("Incoming JSON rejected: {0}")]
    JsonRejection(#[from] JsonRejection),
    #[error("JSON response could not be serialized: {0}")]
    JsonResponse(#[from] serde_json::Error),
    #[error("Authorization header was missing or invalid: {0}")]
    InvalidAuthorizationHeader(TypedHeaderRejection),
    #[error("Provided token was invalid")]
    InvalidToken,
    #[error(transparent)]
    Database(#[from] DbError),
    #[error(transparent)]
    InvalidCategory(#[from] InvalidNoticeCategoryError),
    #[error(transparent)]
    InvalidSex(#[from] InvalidSexError),
    #[error("Search requires both a non-empty query and a category")]
    MissingSearchParams,
    #[error("Image not found")]
    ImageNotFound,
    #[error("Notice with id {0} was not found")]
    NoticeByIdNotFound(Id<NoticeMarker>),
    #[error("No notices matched the requested criteria")]
    NoMatchingNotices,
    #[error("Favorite notices list is empty")]
    NoFavorites,
    #[error("Notice with id {0} is already a favorite")]
    AlreadyFavorite(Id<NoticeMarker>),
    #[error("Notice with id {0} is not a favorite")]
    NotFavorite(Id<NoticeMarker>),
    #[error("Notice with id {0} belongs to another user")]
    NotNoticeOwner(Id<NoticeMarker>),
}

impl ServerError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::UnknownRoute(_)
            | ServerError::PathRejection(_)
            | ServerError::ImageNotFound
            | ServerError::NoticeByIdNotFound(_)
            | ServerError::NoMatchingNotices
            | ServerError::NoFavorites => StatusCode::NOT_FOUND,
            ServerError::InvalidAuthorizationHeader(rejection) if rejection.is_missing() => {
                StatusCode::UNAUTHORIZED
            }
            ServerError::InvalidToken => StatusCode::UNAUTHORIZED,
            ServerError::QueryRejection(_)
            | ServerError::JsonRejection(_)
            | ServerError::InvalidAuthorizationHeader(_)
            | ServerError::InvalidCategory(_)
            | ServerError::InvalidSex(_)
            | ServerError::MissingSearchParams
            | ServerError::AlreadyFavorite(_)
            | ServerError::NotFavorite(_) => StatusCode::BAD_REQUEST,
            ServerError::NotNoticeOwner(_) => StatusCode::FORBIDDEN,
            ServerError::JsonResponse(_) | ServerError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl Default for ServerError {
    fn default() -> Self {
        ServerError::UnknownRoute(Uri::default())
    }
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
struct ErrorResponse {
    message: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();

        error!(error = %self, %status, "Replying with error");

        let error_response = ErrorResponse {
            message: self.to_string(),
        };
        (status, Json(error_response)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use crate::server::ServerError;
    use axum::http::StatusCode;

    #[test]
    fn validation_failures_are_bad_requests() {
        assert_eq!(
            ServerError::MissingSearchParams.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServerError::AlreadyFavorite(1.into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServerError::NotFavorite(1.into()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn missing_entities_are_not_found() {
        assert_eq!(
            ServerError::NoticeByIdNotFound(5.into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(ServerError::NoMatchingNotices.status(), StatusCode::NOT_FOUND);
        assert_eq!(ServerError::NoFavorites.status(), StatusCode::NOT_FOUND);
        assert_eq!(ServerError::ImageNotFound.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn ownership_violations_are_forbidden() {
        assert_eq!(
            ServerError::NotNoticeOwner(5.into()).status(),
            StatusCode::FORBIDDEN
        );
    }
}
