//! Database Module
//!
//! 嵌入式 SurrealDB 初始化与 schema 定义

pub mod models;
pub mod repository;

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};

use crate::utils::AppError;

const NAMESPACE: &str = "storefront";
const DATABASE: &str = "main";

/// Database service — owns an embedded SurrealDB instance
#[derive(Clone, Debug)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Create a new database service backed by RocksDB at the given path
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        let db = Surreal::new::<RocksDb>(db_path)
            .await
            .map_err(|e| AppError::Database(format!("Failed to open database: {e}")))?;

        Self::prepare(db).await
    }

    /// Create an in-memory database service (tests)
    pub async fn new_memory() -> Result<Self, AppError> {
        let db = Surreal::new::<Mem>(())
            .await
            .map_err(|e| AppError::Database(format!("Failed to open in-memory database: {e}")))?;

        Self::prepare(db).await
    }

    async fn prepare(db: Surreal<Db>) -> Result<Self, AppError> {
        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| AppError::Database(format!("Failed to select namespace: {e}")))?;

        define_schema(&db).await?;

        tracing::info!("Database connection established (SurrealDB embedded)");
        Ok(Self { db })
    }
}

/// Define unique indexes
///
/// 唯一性约束在存储层声明，而不是靠应用代码检查：
/// - `serial.serial_number` 全局唯一 (跨商品，见序列号注册表不变量)
/// - `category.name` / `product.slug` / `user.email` 各自唯一
async fn define_schema(db: &Surreal<Db>) -> Result<(), AppError> {
    db.query(
        "
        DEFINE TABLE IF NOT EXISTS category;
        DEFINE TABLE IF NOT EXISTS product;
        DEFINE TABLE IF NOT EXISTS serial;
        DEFINE TABLE IF NOT EXISTS order;
        DEFINE TABLE IF NOT EXISTS user;
        DEFINE INDEX IF NOT EXISTS unique_category_name ON TABLE category COLUMNS name UNIQUE;
        DEFINE INDEX IF NOT EXISTS unique_product_slug ON TABLE product COLUMNS slug UNIQUE;
        DEFINE INDEX IF NOT EXISTS unique_serial_number ON TABLE serial COLUMNS serial_number UNIQUE;
        DEFINE INDEX IF NOT EXISTS unique_user_email ON TABLE user COLUMNS email UNIQUE;
        DEFINE INDEX IF NOT EXISTS serial_product_status ON TABLE serial COLUMNS product, status;
        ",
    )
    .await
    .map_err(|e| AppError::Database(format!("Failed to define schema: {e}")))?
    .check()
    .map_err(|e| AppError::Database(format!("Failed to define schema: {e}")))?;

    Ok(())
}
