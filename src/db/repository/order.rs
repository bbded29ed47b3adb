//! Order Repository
//!
//! 订单的创建走 `fulfillment` 的事务脚本；这里只负责查询、
//! 管理端统计和状态推进。状态推进用条件更新实现，天然幂等。

use serde::Deserialize;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::category::CountRow;
use super::{record_id, BaseRepository, RepoError, RepoResult};
use crate::db::models::{Order, OrderSummary};

/// 管理端订单列表页大小上限
const MAX_PAGE_SIZE: i64 = 50;

/// Admin listing query
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderPageQuery {
    pub page: Option<i64>,
    #[serde(alias = "pageSize")]
    pub page_size: Option<i64>,
    /// JSON object, e.g. `{"totalPrice": -1}`
    pub sort: Option<String>,
    /// Free text: numeric matches total exactly, otherwise matches
    /// username / payment method
    pub search: Option<String>,
}

/// One row of the sales-by-date report
#[derive(Debug, Clone, serde::Serialize, Deserialize)]
pub struct DailySales {
    pub date: String,
    pub total: f64,
}

#[derive(Debug, Deserialize)]
struct TotalRow {
    total: f64,
}

/// Order repository
#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    // ========== 查询 ==========

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Order> {
        let order: Option<Order> = self.base.db().select(record_id("order", id)).await?;
        order.ok_or_else(|| RepoError::NotFound(format!("Order {id} not found")))
    }

    /// Orders placed by a user, newest first
    pub async fn find_by_user(&self, user: RecordId) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM order WHERE user = $uid ORDER BY created_at DESC")
            .bind(("uid", user))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// Paginated admin listing with search and sort
    pub async fn find_page(&self, query: OrderPageQuery) -> RepoResult<(Vec<OrderSummary>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let page_size = query.page_size.unwrap_or(10).clamp(1, MAX_PAGE_SIZE);
        let start = (page - 1) * page_size;

        let search = query
            .search
            .as_deref()
            .unwrap_or("")
            .trim()
            .to_lowercase();
        // 数值输入按订单总额精确匹配；-1 作为哨兵永不命中
        let price: f64 = search.parse().unwrap_or(-1.0);

        let (sort_field, sort_dir) = parse_sort(query.sort.as_deref());

        let filter = "$search = '' \
             OR total_price = $price \
             OR string::lowercase(payment_method) CONTAINS $search \
             OR string::lowercase(user.username) CONTAINS $search";

        // 排序字段经白名单校验后插值
        let select = format!(
            "SELECT id, user.username AS user_name, payment_method, total_price, \
                    status, created_at, paid_at, delivered_at \
             FROM order WHERE {filter} \
             ORDER BY {sort_field} {sort_dir} LIMIT $limit START $start"
        );
        let count = format!("SELECT count() FROM order WHERE {filter} GROUP ALL");

        let mut response = self
            .base
            .db()
            .query(select)
            .query(count)
            .bind(("search", search))
            .bind(("price", price))
            .bind(("limit", page_size))
            .bind(("start", start))
            .await?;

        let orders: Vec<OrderSummary> = response.take(0)?;
        let counts: Vec<CountRow> = response.take(1)?;
        let total = counts.first().map(|c| c.count).unwrap_or(0);
        Ok((orders, total))
    }

    // ========== 统计 ==========

    pub async fn count_all(&self) -> RepoResult<i64> {
        let counts: Vec<CountRow> = self
            .base
            .db()
            .query("SELECT count() FROM order GROUP ALL")
            .await?
            .take(0)?;
        Ok(counts.first().map(|c| c.count).unwrap_or(0))
    }

    /// Sum of all order totals
    pub async fn total_sales(&self) -> RepoResult<f64> {
        let rows: Vec<TotalRow> = self
            .base
            .db()
            .query("SELECT math::sum(total_price) AS total FROM order GROUP ALL")
            .await?
            .take(0)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0.0))
    }

    /// Paid revenue grouped by payment date, ascending
    pub async fn sales_by_date(&self) -> RepoResult<Vec<DailySales>> {
        let mut rows: Vec<DailySales> = self
            .base
            .db()
            .query(
                "SELECT time::format(paid_at, '%Y-%m-%d') AS date, \
                        math::sum(total_price) AS total \
                 FROM order WHERE status IN ['paid', 'delivered'] \
                 GROUP BY date",
            )
            .await?
            .take(0)?;
        rows.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(rows)
    }

    // ========== 状态推进 ==========

    /// Mark an order paid
    ///
    /// 条件更新：只有 `created` 状态的订单会被改写。已付款/已发货的
    /// 重复请求按幂等处理，原样返回。
    pub async fn mark_paid(&self, id: &str) -> RepoResult<Order> {
        let oid = record_id("order", id);

        let mut response = self
            .base
            .db()
            .query(
                "UPDATE $oid SET status = 'paid', paid_at = time::now() \
                 WHERE status = 'created' RETURN AFTER",
            )
            .bind(("oid", oid))
            .await?;
        let updated: Option<Order> = response.take(0)?;

        match updated {
            Some(order) => Ok(order),
            None => {
                let order = self.find_by_id(id).await?;
                if order.status.is_paid() {
                    Ok(order)
                } else {
                    Err(RepoError::InvalidTransition(format!(
                        "Order cannot be marked paid from status {}",
                        order.status.as_str()
                    )))
                }
            }
        }
    }

    /// Mark an order delivered
    ///
    /// 只允许从 `paid` 进入；未付款的订单拒绝发货。
    pub async fn mark_delivered(&self, id: &str) -> RepoResult<Order> {
        let oid = record_id("order", id);

        let mut response = self
            .base
            .db()
            .query(
                "UPDATE $oid SET status = 'delivered', delivered_at = time::now() \
                 WHERE status = 'paid' RETURN AFTER",
            )
            .bind(("oid", oid))
            .await?;
        let updated: Option<Order> = response.take(0)?;

        match updated {
            Some(order) => Ok(order),
            None => {
                let order = self.find_by_id(id).await?;
                if order.status.is_delivered() {
                    Ok(order)
                } else {
                    Err(RepoError::InvalidTransition(
                        "Order must be paid before it can be delivered".into(),
                    ))
                }
            }
        }
    }
}

/// Parse the sort parameter into a whitelisted (field, direction) pair
///
/// 默认按创建时间倒序。
fn parse_sort(sort: Option<&str>) -> (&'static str, &'static str) {
    let default = ("created_at", "DESC");

    let Some(raw) = sort else {
        return default;
    };
    let Ok(map) = serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(raw) else {
        return default;
    };
    let Some((key, value)) = map.into_iter().next() else {
        return default;
    };

    let field = match key.as_str() {
        "createdAt" | "created_at" | "_id" | "id" => "created_at",
        "totalPrice" | "total_price" => "total_price",
        "paymentMethod" | "payment_method" => "payment_method",
        "status" => "status",
        _ => return default,
    };
    let dir = if value.as_i64().unwrap_or(-1) >= 0 {
        "ASC"
    } else {
        "DESC"
    };
    (field, dir)
}
