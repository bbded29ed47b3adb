//! User API 模块

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/users", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::register))
        .route("/register", post(handler::register))
        .route("/login", post(handler::login))
        .route("/profile", get(handler::profile))
}
