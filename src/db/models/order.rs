//! Order Model
//!
//! 订单创建后行项目与金额不可变；仅状态 (付款/发货) 允许单向推进。

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use surrealdb::sql::Datetime;

pub type OrderId = RecordId;

/// Order lifecycle state
///
/// 显式状态机替代 isPaid/isDelivered 两个布尔位：
/// `Created → Paid → Delivered`，单向推进，`Delivered` 只能从 `Paid` 进入。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Created,
    Paid,
    Delivered,
}

impl OrderStatus {
    /// Whether a transition to `next` is allowed
    ///
    /// Re-marking the current state is treated as an idempotent no-op by
    /// callers, not as a transition.
    pub fn can_transition(self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Created, OrderStatus::Paid) | (OrderStatus::Paid, OrderStatus::Delivered)
        )
    }

    pub fn is_paid(self) -> bool {
        matches!(self, OrderStatus::Paid | OrderStatus::Delivered)
    }

    pub fn is_delivered(self) -> bool {
        matches!(self, OrderStatus::Delivered)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Created => "created",
            OrderStatus::Paid => "paid",
            OrderStatus::Delivered => "delivered",
        }
    }
}

/// Snapshotted line item
///
/// 价格在下单时从商品快照而来，之后不再重算。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub name: String,
    #[serde(default)]
    pub image: String,
    pub price: f64,
    pub qty: i64,
    /// Reference back to the product (informational; snapshot is authoritative)
    pub product: RecordId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

/// Order model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<OrderId>,
    pub order_items: Vec<OrderItem>,
    pub user: RecordId,
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
    pub items_price: f64,
    pub tax_price: f64,
    pub shipping_price: f64,
    pub total_price: f64,
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<Datetime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<Datetime>,
    pub created_at: Datetime,
}

/// One cart line as submitted by the client
///
/// 客户端提交的价格不可信，履约引擎只取 `product` + `qty`。
#[derive(Debug, Clone, Deserialize)]
pub struct CartLine {
    /// Product id ("product:xyz" or bare key)
    pub product: String,
    pub qty: i64,
}

/// Order creation payload
#[derive(Debug, Clone, Deserialize)]
pub struct OrderCreate {
    pub order_items: Vec<CartLine>,
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
}

/// Admin listing row (user resolved to a display name)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSummary {
    pub id: RecordId,
    #[serde(default)]
    pub user_name: Option<String>,
    pub payment_method: String,
    pub total_price: f64,
    pub status: OrderStatus,
    pub created_at: Datetime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<Datetime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<Datetime>,
}
