use crate::server::ServerRouter;
use axum::Router;

mod notices;

pub fn routes() -> ServerRouter {
    Router::new().merge(notices::routes())
}
