//! Order API 模块

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        // Fixed paths must be registered before /{id}
        .route("/mine", get(handler::my_orders))
        .route("/total-order", get(handler::total_orders))
        .route("/total-sales", get(handler::total_sales))
        .route("/total-sales-by-date", get(handler::sales_by_date))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/pay", put(handler::pay))
        .route("/{id}/deliver", put(handler::deliver))
}
