use crate::server::ServerError;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::TypedHeader;
use fellwerk_common::model::{
    Id,
    user::{FavoriteSet, UserMarker},
};
use fellwerk_db::client::DbClient;
use headers::{Authorization, authorization::Bearer};
use std::sync::Arc;

type AuthorizationHeader = TypedHeader<Authorization<Bearer>>;

/// The caller's resolved identity: id plus a snapshot of the favorite
/// set, taken when the bearer token was looked up.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash)]
pub struct AuthenticatedUser {
    id: Id<UserMarker>,
    favorite: FavoriteSet,
}

impl AuthenticatedUser {
    #[must_use]
    pub fn user_id(&self) -> Id<UserMarker> {
        self.id
    }

    #[must_use]
    pub fn favorite(&self) -> &FavoriteSet {
        &self.favorite
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    Arc<DbClient>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let header = AuthorizationHeader::from_request_parts(parts, state)
            .await
            .map_err(ServerError::InvalidAuthorizationHeader)?;

        let identity = Arc::<DbClient>::from_ref(state)
            .fetch_identity_by_token(header.token())
            .await?
            .ok_or(ServerError::InvalidToken)?;

        Ok(Self {
            id: identity.id,
            favorite: identity.favorite,
        })
    }
}
