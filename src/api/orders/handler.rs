//! Order API Handlers
//!
//! 下单与查询自己的订单要求登录；管理列表要求管理员；
//! 订单详情与支付只开放给订单所有者或管理员。销售统计公开。

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Serialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Order, OrderCreate, OrderSummary};
use crate::db::repository::{
    order::{DailySales, OrderPageQuery},
    record_id, OrderRepository,
};
use crate::fulfillment::FulfillmentEngine;
use crate::utils::{page_count, AppError, AppResult};

/// Admin listing page
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPage {
    pub orders: Vec<OrderSummary>,
    pub page: i64,
    pub pages: i64,
    pub total: i64,
}

/// POST /api/orders - 下单
///
/// 库存扣减、序列号占用与订单落库在同一事务内完成。
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<OrderCreate>,
) -> AppResult<(StatusCode, Json<Order>)> {
    let engine = FulfillmentEngine::new(state.db.clone());
    let order = engine
        .create_order(record_id("user", &user.id), payload)
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /api/orders - 订单列表 (管理员，支持搜索/排序/分页)
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
    Query(query): Query<OrderPageQuery>,
) -> AppResult<Json<OrderPage>> {
    user.require_admin()?;

    let page = query.page.unwrap_or(1).max(1);
    let page_size = query.page_size.unwrap_or(10).max(1);

    let repo = OrderRepository::new(state.db.clone());
    let (orders, total) = repo.find_page(query).await?;

    Ok(Json(OrderPage {
        orders,
        page,
        pages: page_count(total, page_size),
        total,
    }))
}

/// GET /api/orders/mine - 当前用户的订单
pub async fn my_orders(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<Order>>> {
    let repo = OrderRepository::new(state.db.clone());
    let orders = repo.find_by_user(record_id("user", &user.id)).await?;
    Ok(Json(orders))
}

/// GET /api/orders/total-order - 订单总数
pub async fn total_orders(State(state): State<ServerState>) -> AppResult<Json<i64>> {
    let repo = OrderRepository::new(state.db.clone());
    Ok(Json(repo.count_all().await?))
}

/// GET /api/orders/total-sales - 销售总额
pub async fn total_sales(State(state): State<ServerState>) -> AppResult<Json<f64>> {
    let repo = OrderRepository::new(state.db.clone());
    Ok(Json(repo.total_sales().await?))
}

/// GET /api/orders/total-sales-by-date - 按付款日期汇总销售额
pub async fn sales_by_date(State(state): State<ServerState>) -> AppResult<Json<Vec<DailySales>>> {
    let repo = OrderRepository::new(state.db.clone());
    Ok(Json(repo.sales_by_date().await?))
}

/// GET /api/orders/:id - 订单详情 (所有者或管理员)
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    let repo = OrderRepository::new(state.db.clone());
    let order = repo.find_by_id(&id).await?;
    require_owner_or_admin(&user, &order)?;
    Ok(Json(order))
}

/// PUT /api/orders/:id/pay - 标记已付款 (所有者或管理员，幂等)
pub async fn pay(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<(StatusCode, Json<Order>)> {
    let repo = OrderRepository::new(state.db.clone());
    let order = repo.find_by_id(&id).await?;
    require_owner_or_admin(&user, &order)?;

    let order = repo.mark_paid(&id).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// PUT /api/orders/:id/deliver - 标记已发货 (管理员，只允许已付款订单)
pub async fn deliver(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<(StatusCode, Json<Order>)> {
    user.require_admin()?;
    let repo = OrderRepository::new(state.db.clone());
    let order = repo.mark_delivered(&id).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

fn require_owner_or_admin(user: &CurrentUser, order: &Order) -> Result<(), AppError> {
    if user.is_admin() || order.user == record_id("user", &user.id) {
        Ok(())
    } else {
        Err(AppError::Forbidden("Not your order".into()))
    }
}
