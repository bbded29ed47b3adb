//! Product API 模块

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/products", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        // Fixed paths must be registered before /{id}
        .route("/all", get(handler::list_all))
        .route("/top", get(handler::top_rated))
        .route("/new", get(handler::newest))
        .route("/slug/{slug}", get(handler::get_by_slug))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route("/{id}/reviews", post(handler::add_review))
        .route("/{id}/serials", get(handler::list_serials))
}
