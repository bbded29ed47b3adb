//! Fulfillment Module
//!
//! 下单履约引擎。一次下单 = 校验购物车 → 快照行项目与定价 →
//! 单事务内完成库存条件扣减、序列号占用和订单落库。
//!
//! 事务脚本的每一步失败都通过 THROW 中止，整个事务回滚：
//! 不存在"扣了库存但没建订单"的中间态。

use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use crate::db::models::{
    Category, Order, OrderCreate, OrderItem, OrderStatus, Product,
};
use crate::db::repository::{
    check_transaction, new_record_id, record_id, RepoError, RepoResult, SerialRepository,
    MARKER_NO_SERIALS, MARKER_OUT_OF_STOCK,
};
use crate::pricing::calc_totals;

/// Fulfillment engine
#[derive(Clone)]
pub struct FulfillmentEngine {
    db: Surreal<Db>,
}

/// One resolved cart line, ready for the transaction script
struct ResolvedLine {
    product_id: RecordId,
    name: String,
    image: String,
    price: f64,
    qty: i64,
    serial_tracked: bool,
}

impl FulfillmentEngine {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    /// Place an order for a user
    ///
    /// 价格以服务端商品快照为准，客户端提交的金额一律忽略。
    pub async fn create_order(&self, user: RecordId, input: OrderCreate) -> RepoResult<Order> {
        if input.order_items.is_empty() {
            return Err(RepoError::Validation("No order items".into()));
        }
        if input.payment_method.trim().is_empty() {
            return Err(RepoError::Validation("Payment method is required".into()));
        }

        let lines = self.resolve_lines(&input).await?;

        let totals = calc_totals(
            &lines
                .iter()
                .map(|l| (l.price, l.qty))
                .collect::<Vec<_>>(),
        );

        let oid = new_record_id("order");
        let order = Order {
            id: None,
            order_items: lines
                .iter()
                .map(|l| OrderItem {
                    name: l.name.clone(),
                    image: l.image.clone(),
                    price: l.price,
                    qty: l.qty,
                    product: l.product_id.clone(),
                })
                .collect(),
            user: user.clone(),
            shipping_address: input.shipping_address,
            payment_method: input.payment_method,
            items_price: totals.items_price,
            tax_price: totals.tax_price,
            shipping_price: totals.shipping_price,
            total_price: totals.total_price,
            status: OrderStatus::Created,
            paid_at: None,
            delivered_at: None,
            created_at: surrealdb::sql::Datetime::default(),
        };

        self.run_fulfillment(&oid, user, &order, &lines).await?;

        let created: Option<Order> = self.db.select(oid.clone()).await?;
        created.ok_or_else(|| RepoError::Database("Order vanished after commit".into()))
    }

    /// Resolve cart lines against current products, validating early
    ///
    /// 早期校验给出友好错误；真正的并发安全由事务脚本的条件更新兜底。
    async fn resolve_lines(&self, input: &OrderCreate) -> RepoResult<Vec<ResolvedLine>> {
        let mut lines = Vec::with_capacity(input.order_items.len());

        for cart_line in &input.order_items {
            if cart_line.qty < 1 {
                return Err(RepoError::Validation(format!(
                    "Quantity must be at least 1 for {}",
                    cart_line.product
                )));
            }

            let pid = record_id("product", &cart_line.product);
            let product: Option<Product> = self.db.select(pid.clone()).await?;
            let product = product.ok_or_else(|| {
                RepoError::NotFound(format!("Product {} not found", cart_line.product))
            })?;

            if product.count_in_stock < cart_line.qty {
                return Err(RepoError::InsufficientStock(product.name));
            }

            let category: Option<Category> = self.db.select(product.category.clone()).await?;
            let serial_tracked = category.map(|c| c.is_serial_tracked).unwrap_or(false);

            if serial_tracked {
                let serials = SerialRepository::new(self.db.clone());
                if serials.count_available(pid.clone()).await? < cart_line.qty {
                    return Err(RepoError::InsufficientSerials(product.name));
                }
            }

            lines.push(ResolvedLine {
                product_id: pid,
                name: product.name,
                image: product.image,
                price: product.price,
                qty: cart_line.qty,
                serial_tracked,
            });
        }

        Ok(lines)
    }

    /// Execute the fulfillment transaction
    ///
    /// 脚本结构 (每个购物车行重复一段)：
    /// 1. 条件扣减：`WHERE count_in_stock >= qty`，空结果说明并发下被
    ///    抢完，THROW 回滚
    /// 2. 序列号占用：取恰好 qty 个 available 序列号置为 assigned，
    ///    不足则 THROW 回滚
    /// 3. 最后落库订单
    async fn run_fulfillment(
        &self,
        oid: &RecordId,
        user: RecordId,
        order: &Order,
        lines: &[ResolvedLine],
    ) -> RepoResult<()> {
        let mut script = String::from("BEGIN TRANSACTION; ");

        for (i, line) in lines.iter().enumerate() {
            script.push_str(&format!(
                "LET $dec{i} = (UPDATE $pid{i} \
                     SET count_in_stock -= $qty{i}, quantity -= $qty{i} \
                     WHERE count_in_stock >= $qty{i} RETURN AFTER); \
                 IF array::len($dec{i}) == 0 {{ THROW '{MARKER_OUT_OF_STOCK}' + $name{i}; }}; "
            ));

            if line.serial_tracked {
                script.push_str(&format!(
                    "LET $avail{i} = (SELECT VALUE id FROM serial \
                         WHERE product = $pid{i} AND status = 'available' LIMIT $qty{i}); \
                     IF array::len($avail{i}) < $qty{i} {{ \
                         THROW '{MARKER_NO_SERIALS}' + $name{i}; \
                     }}; \
                     UPDATE $avail{i} SET status = 'assigned', assigned_to = $uid; "
                ));
            }
        }

        script.push_str("CREATE $oid CONTENT $order; COMMIT TRANSACTION;");

        let mut query = self
            .db
            .query(script)
            .bind(("oid", oid.clone()))
            .bind(("uid", user))
            .bind(("order", order.clone()));

        for (i, line) in lines.iter().enumerate() {
            query = query
                .bind((format!("pid{i}"), line.product_id.clone()))
                .bind((format!("qty{i}"), line.qty))
                .bind((format!("name{i}"), line.name.clone()));
        }

        check_transaction(query.await?)?;
        Ok(())
    }
}
