//! Repository Module
//!
//! Provides CRUD operations for SurrealDB tables.
//!
//! 事务型写入 (下单扣减、序列号重建) 使用单条多语句
//! `BEGIN TRANSACTION ... COMMIT TRANSACTION` 脚本；事务内的业务失败通过
//! `THROW "<MARKER>:<detail>"` 中止事务，由 [`RepoError::from`] 解析回类型化错误。

pub mod category;
pub mod order;
pub mod product;
pub mod serial;
pub mod user;

pub use category::CategoryRepository;
pub use order::OrderRepository;
pub use product::ProductRepository;
pub use serial::SerialRepository;
pub use user::UserRepository;

use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};
use thiserror::Error;

// ========== 事务中止标记 ==========
// THROW 的错误串前缀，冒号后跟人类可读细节 (商品名 / 序列号)

pub(crate) const MARKER_NOT_FOUND: &str = "PRODUCT_NOT_FOUND:";
pub(crate) const MARKER_OUT_OF_STOCK: &str = "OUT_OF_STOCK:";
pub(crate) const MARKER_NO_SERIALS: &str = "NO_SERIALS:";
pub(crate) const MARKER_SERIAL_TAKEN: &str = "SERIAL_TAKEN:";

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),

    #[error("Insufficient serial numbers: {0}")]
    InsufficientSerials(String),

    #[error("Serial number already registered: {0}")]
    SerialExists(String),

    #[error("Invalid status transition: {0}")]
    InvalidTransition(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        let msg = err.to_string();

        // 事务内 THROW 的业务错误
        if let Some(detail) = marker_detail(&msg, MARKER_NOT_FOUND) {
            return RepoError::NotFound(format!("Product {detail} not found"));
        }
        if let Some(detail) = marker_detail(&msg, MARKER_OUT_OF_STOCK) {
            return RepoError::InsufficientStock(detail);
        }
        if let Some(detail) = marker_detail(&msg, MARKER_NO_SERIALS) {
            return RepoError::InsufficientSerials(detail);
        }
        if let Some(detail) = marker_detail(&msg, MARKER_SERIAL_TAKEN) {
            return RepoError::SerialExists(detail);
        }

        // UNIQUE 索引冲突
        if msg.contains("already contains") {
            return RepoError::Duplicate(msg);
        }

        RepoError::Database(msg)
    }
}

/// Extract the detail following a THROW marker, if present
fn marker_detail(msg: &str, marker: &str) -> Option<String> {
    msg.split_once(marker)
        .map(|(_, rest)| rest.trim_end_matches(['\'', '"']).trim().to_string())
}

/// Check a multi-statement transaction response
///
/// 事务被 THROW 中止后，首条语句挂的是笼统的 "failed transaction" 错误，
/// 业务标记在 THROW 所在语句上。逐条扫描所有语句错误，优先返回
/// 类型化错误，扫不到才退回 [`RepoError::Database`]。
pub(crate) fn check_transaction(mut response: surrealdb::Response) -> RepoResult<()> {
    let mut errors: Vec<(usize, surrealdb::Error)> =
        response.take_errors().into_iter().collect();
    if errors.is_empty() {
        return Ok(());
    }
    errors.sort_by_key(|(index, _)| *index);

    let mut fallback: Option<RepoError> = None;
    for (_, err) in errors {
        match RepoError::from(err) {
            RepoError::Database(msg) => {
                if fallback.is_none() {
                    fallback = Some(RepoError::Database(msg));
                }
            }
            typed => return Err(typed),
        }
    }
    Err(fallback.unwrap_or_else(|| RepoError::Database("Transaction failed".into())))
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Build a RecordId from a client-supplied id
///
/// Accepts both "table:key" and bare "key" forms.
pub fn record_id(table: &str, id: &str) -> RecordId {
    let prefix = format!("{table}:");
    let key = id.strip_prefix(&prefix).unwrap_or(id);
    // 去掉 SurrealDB 字符串形式可能携带的尖括号包装
    let key = key.trim_matches(['⟨', '⟩']);
    RecordId::from_table_key(table, key)
}

/// Generate a fresh RecordId for a table
pub fn new_record_id(table: &str) -> RecordId {
    RecordId::from_table_key(table, uuid::Uuid::new_v4().simple().to_string())
}

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}
