//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查接口
//! - [`users`] - 注册 / 登录 / 个人资料接口
//! - [`categories`] - 分类管理接口
//! - [`products`] - 商品与评价接口
//! - [`orders`] - 下单、订单状态与销售统计接口

use std::time::Duration;

use axum::Router;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

pub mod health;
pub mod users;

// Data models API
pub mod categories;
pub mod orders;
pub mod products;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        // Order API - authentication required per-handler
        .merge(orders::router())
        // Catalog API - public reads, admin writes
        .merge(products::router())
        .merge(categories::router())
        // User API - register/login public
        .merge(users::router())
        // Health API - public route
        .merge(health::router())
}

/// Build a fully configured application with all middleware
pub fn build_app(state: &ServerState) -> Router<ServerState> {
    build_router()
        // ========== Tower HTTP Middleware ==========
        // CORS - Handle cross-origin requests
        .layer(CorsLayer::permissive())
        // Timeout - 408 for requests exceeding the configured budget
        .layer(TimeoutLayer::new(Duration::from_millis(
            state.config.request_timeout_ms,
        )))
        // Backpressure - cap concurrent in-flight requests
        .layer(GlobalConcurrencyLimitLayer::new(1024))
        // Trace - Request tracing (logs at INFO level)
        .layer(TraceLayer::new_for_http())
}
