//! Product API Handlers
//!
//! 商品读接口公开；创建/更新/删除和序列号查看要求管理员。

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Product, ProductInput, ReviewInput, Serial};
use crate::db::repository::product::PAGE_SIZE;
use crate::db::repository::{record_id, ProductRepository, SerialRepository};
use crate::utils::{page_count, AppResult};

#[derive(Debug, Deserialize)]
pub struct ProductListQuery {
    pub keyword: Option<String>,
    pub page: Option<i64>,
}

/// Storefront listing page
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub page: i64,
    pub pages: i64,
}

/// GET /api/products - 分页商品列表 (支持关键字搜索)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ProductListQuery>,
) -> AppResult<Json<ProductPage>> {
    let repo = ProductRepository::new(state.db.clone());
    let page = query.page.unwrap_or(1).max(1);
    let (products, total) = repo.find_page(query.keyword.as_deref(), page).await?;
    Ok(Json(ProductPage {
        products,
        page,
        pages: page_count(total, PAGE_SIZE),
    }))
}

/// GET /api/products/all - 全部商品 (管理端列表)
pub async fn list_all(State(state): State<ServerState>) -> AppResult<Json<Vec<Product>>> {
    let repo = ProductRepository::new(state.db.clone());
    let products = repo.find_all_newest().await?;
    Ok(Json(products))
}

/// GET /api/products/top - 评分最高的商品
pub async fn top_rated(State(state): State<ServerState>) -> AppResult<Json<Vec<Product>>> {
    let repo = ProductRepository::new(state.db.clone());
    let products = repo.find_top().await?;
    Ok(Json(products))
}

/// GET /api/products/new - 最新上架的商品
pub async fn newest(State(state): State<ServerState>) -> AppResult<Json<Vec<Product>>> {
    let repo = ProductRepository::new(state.db.clone());
    let products = repo.find_new().await?;
    Ok(Json(products))
}

/// GET /api/products/:id - 按 id 获取商品
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Product>> {
    let repo = ProductRepository::new(state.db.clone());
    let product = repo.find_by_id(&id).await?;
    Ok(Json(product))
}

/// GET /api/products/slug/:slug - 按 slug 获取商品
pub async fn get_by_slug(
    State(state): State<ServerState>,
    Path(slug): Path<String>,
) -> AppResult<Json<Product>> {
    let repo = ProductRepository::new(state.db.clone());
    let product = repo.find_by_slug(&slug).await?;
    Ok(Json(product))
}

/// POST /api/products - 创建商品 (管理员)
///
/// 序列号跟踪的分类必须同时提交与数量一致的序列号集合。
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<ProductInput>,
) -> AppResult<Json<Product>> {
    user.require_admin()?;
    let repo = ProductRepository::new(state.db.clone());
    let product = repo.create(payload).await?;
    Ok(Json(product))
}

/// PUT /api/products/:slug - 按 slug 整体更新商品 (管理员)
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(slug): Path<String>,
    Json(payload): Json<ProductInput>,
) -> AppResult<Json<Product>> {
    user.require_admin()?;
    let repo = ProductRepository::new(state.db.clone());
    let product = repo.update_by_slug(&slug, payload).await?;
    Ok(Json(product))
}

/// DELETE /api/products/:id - 删除商品及其序列号 (管理员)
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    user.require_admin()?;
    let repo = ProductRepository::new(state.db.clone());
    repo.delete(&id).await?;
    Ok(Json(true))
}

/// POST /api/products/:id/reviews - 提交评价 (登录用户，每人一次)
pub async fn add_review(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<ReviewInput>,
) -> AppResult<Json<Product>> {
    let repo = ProductRepository::new(state.db.clone());
    let product = repo
        .add_review(
            &id,
            record_id("user", &user.id),
            user.username.clone(),
            payload,
        )
        .await?;
    Ok(Json(product))
}

/// GET /api/products/:id/serials - 商品的序列号清单 (管理员)
pub async fn list_serials(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<Serial>>> {
    user.require_admin()?;
    let repo = SerialRepository::new(state.db.clone());
    let serials = repo.find_by_product(record_id("product", &id)).await?;
    Ok(Json(serials))
}
