//! Serial Repository
//!
//! 只读查询。序列号的写入 (整体替换、下单占用) 全部发生在
//! ProductRepository / FulfillmentEngine 的事务脚本内。

use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{BaseRepository, RepoResult};
use crate::db::models::Serial;

/// Serial repository
#[derive(Clone)]
pub struct SerialRepository {
    base: BaseRepository,
}

impl SerialRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All serials registered to a product
    pub async fn find_by_product(&self, product: RecordId) -> RepoResult<Vec<Serial>> {
        let serials: Vec<Serial> = self
            .base
            .db()
            .query("SELECT * FROM serial WHERE product = $pid ORDER BY serial_number ASC")
            .bind(("pid", product))
            .await?
            .take(0)?;
        Ok(serials)
    }

    /// Count of serials still available for a product
    pub async fn count_available(&self, product: RecordId) -> RepoResult<i64> {
        let mut response = self
            .base
            .db()
            .query(
                "SELECT count() FROM serial \
                 WHERE product = $pid AND status = 'available' GROUP ALL",
            )
            .bind(("pid", product))
            .await?;
        let counts: Vec<super::category::CountRow> = response.take(0)?;
        Ok(counts.first().map(|c| c.count).unwrap_or(0))
    }

    /// Serials assigned to a user (what they bought)
    pub async fn find_assigned_to(&self, user: RecordId) -> RepoResult<Vec<Serial>> {
        let serials: Vec<Serial> = self
            .base
            .db()
            .query("SELECT * FROM serial WHERE assigned_to = $uid ORDER BY serial_number ASC")
            .bind(("uid", user))
            .await?
            .take(0)?;
        Ok(serials)
    }
}
