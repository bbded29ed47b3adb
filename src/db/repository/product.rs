//! Product Repository
//!
//! 商品与其序列号集合的一致性由单事务保证：
//! 创建/更新商品和重建序列号要么全部生效，要么全部回滚。

use serde::Serialize;
use surrealdb::engine::local::Db;
use surrealdb::sql::Datetime;
use surrealdb::{RecordId, Surreal};

use super::category::CountRow;
use super::{check_transaction, new_record_id, record_id, BaseRepository, RepoError, RepoResult};
use crate::db::models::{Category, Product, ProductInput, Review, ReviewInput, SerialPlan};
use crate::utils::slug::{resolve_collision, slugify};

/// 商品列表页大小
pub const PAGE_SIZE: i64 = 6;

/// Product repository
#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

/// Fields replaced on update (reviews and rating are kept)
#[derive(Debug, Clone, Serialize)]
struct ProductPatch {
    slug: String,
    name: String,
    description: String,
    price: f64,
    category: RecordId,
    quantity: i64,
    count_in_stock: i64,
    brand: String,
    image: String,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    // ========== 查询 ==========

    /// Paginated keyword search, newest first
    ///
    /// Returns (products, total match count).
    pub async fn find_page(
        &self,
        keyword: Option<&str>,
        page: i64,
    ) -> RepoResult<(Vec<Product>, i64)> {
        let kw = keyword.unwrap_or("").trim().to_lowercase();
        let page = page.max(1);
        let start = (page - 1) * PAGE_SIZE;

        let mut response = self
            .base
            .db()
            .query(
                "SELECT * FROM product \
                 WHERE $kw = '' OR string::lowercase(name) CONTAINS $kw \
                 ORDER BY created_at DESC LIMIT $limit START $start",
            )
            .query(
                "SELECT count() FROM product \
                 WHERE $kw = '' OR string::lowercase(name) CONTAINS $kw GROUP ALL",
            )
            .bind(("kw", kw))
            .bind(("limit", PAGE_SIZE))
            .bind(("start", start))
            .await?;

        let products: Vec<Product> = response.take(0)?;
        let counts: Vec<CountRow> = response.take(1)?;
        let total = counts.first().map(|c| c.count).unwrap_or(0);
        Ok((products, total))
    }

    /// All products with resolved category name, newest first (admin listing)
    pub async fn find_all_newest(&self) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query(
                "SELECT *, category.name AS category_name \
                 FROM product ORDER BY created_at DESC",
            )
            .await?
            .take(0)?;
        Ok(products)
    }

    /// Top rated products (carousel)
    pub async fn find_top(&self) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM product ORDER BY rating DESC LIMIT 3")
            .await?
            .take(0)?;
        Ok(products)
    }

    /// Newest products
    pub async fn find_new(&self) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM product ORDER BY created_at DESC LIMIT 3")
            .await?
            .take(0)?;
        Ok(products)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Product> {
        let product: Option<Product> = self.base.db().select(record_id("product", id)).await?;
        product.ok_or_else(|| RepoError::NotFound(format!("Product {id} not found")))
    }

    pub async fn find_by_slug(&self, slug: &str) -> RepoResult<Product> {
        let mut response = self
            .base
            .db()
            .query("SELECT * FROM product WHERE slug = $slug LIMIT 1")
            .bind(("slug", slug.to_string()))
            .await?;
        let product: Option<Product> = response.take(0)?;
        product.ok_or_else(|| RepoError::NotFound(format!("Product {slug} not found")))
    }

    // ========== 写入 ==========

    /// Create a product, registering its serial numbers atomically
    pub async fn create(&self, input: ProductInput) -> RepoResult<Product> {
        input.validate().map_err(RepoError::Validation)?;

        let category = self.load_category(&input.category).await?;
        let plan = self.plan_for(&category, &input)?;

        let pid = new_record_id("product");
        let slug = self.resolve_slug(&input.name, None).await?;

        // id 由 CREATE $pid 指定，payload 内不再携带
        let product = Product {
            id: None,
            slug,
            name: input.name,
            description: input.description,
            price: input.price,
            category: category
                .id
                .ok_or_else(|| RepoError::Database("Category record without id".into()))?,
            category_name: None,
            quantity: input.quantity,
            count_in_stock: input.quantity,
            brand: input.brand,
            image: input.image,
            reviews: Vec::new(),
            rating: 0.0,
            num_reviews: 0,
            created_at: Datetime::default(),
        };

        self.write_with_serials(&pid, "CREATE $pid CONTENT $product", &product, &plan)
            .await?;

        self.find_by_id(&pid.key().to_string()).await
    }

    /// Full-replace update by slug, rebuilding the serial set atomically
    ///
    /// 更新重置 `count_in_stock = quantity`：管理员盘点后的数量即为在库数。
    pub async fn update_by_slug(&self, slug: &str, input: ProductInput) -> RepoResult<Product> {
        input.validate().map_err(RepoError::Validation)?;

        let existing = self.find_by_slug(slug).await?;
        let pid = existing
            .id
            .ok_or_else(|| RepoError::Database("Product record without id".into()))?;

        let category = self.load_category(&input.category).await?;
        let plan = self.plan_for(&category, &input)?;

        let new_slug = if existing.name == input.name {
            existing.slug
        } else {
            self.resolve_slug(&input.name, Some(&pid)).await?
        };

        let patch = ProductPatch {
            slug: new_slug,
            name: input.name,
            description: input.description,
            price: input.price,
            category: category
                .id
                .ok_or_else(|| RepoError::Database("Category record without id".into()))?,
            quantity: input.quantity,
            count_in_stock: input.quantity,
            brand: input.brand,
            image: input.image,
        };

        self.write_with_serials(&pid, "UPDATE $pid MERGE $product", &patch, &plan)
            .await?;

        self.find_by_id(&pid.key().to_string()).await
    }

    /// Delete a product and its serial registrations
    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        let pid = record_id("product", id);

        let existing: Option<Product> = self.base.db().select(pid.clone()).await?;
        if existing.is_none() {
            return Err(RepoError::NotFound(format!("Product {id} not found")));
        }

        let response = self
            .base
            .db()
            .query(
                "BEGIN TRANSACTION; \
                 DELETE serial WHERE product = $pid; \
                 DELETE $pid; \
                 COMMIT TRANSACTION;",
            )
            .bind(("pid", pid))
            .await?;
        check_transaction(response)?;

        Ok(())
    }

    /// Append a review and refresh the aggregate rating
    ///
    /// 每个用户对同一商品只能评价一次。
    pub async fn add_review(
        &self,
        id: &str,
        user: RecordId,
        user_name: String,
        input: ReviewInput,
    ) -> RepoResult<Product> {
        if !(1..=5).contains(&input.rating) {
            return Err(RepoError::Validation(
                "Rating must be between 1 and 5".into(),
            ));
        }

        let mut product = self.find_by_id(id).await?;
        if product.reviews.iter().any(|r| r.user == user) {
            return Err(RepoError::Duplicate("Product already reviewed".into()));
        }

        product.reviews.push(Review {
            user,
            name: user_name,
            rating: input.rating,
            comment: input.comment,
            created_at: Datetime::default(),
        });
        let num_reviews = product.reviews.len() as i64;
        let rating =
            product.reviews.iter().map(|r| r.rating).sum::<i64>() as f64 / num_reviews as f64;

        let pid = record_id("product", id);
        let updated: Option<Product> = self
            .base
            .db()
            .update(pid)
            .merge(serde_json::json!({
                "reviews": product.reviews,
                "rating": rating,
                "num_reviews": num_reviews,
            }))
            .await?;

        updated.ok_or_else(|| RepoError::NotFound(format!("Product {id} not found")))
    }

    // ========== 内部 ==========

    async fn load_category(&self, id: &str) -> RepoResult<Category> {
        let category: Option<Category> = self.base.db().select(record_id("category", id)).await?;
        category.ok_or_else(|| RepoError::Validation(format!("Category {id} not found")))
    }

    fn plan_for(&self, category: &Category, input: &ProductInput) -> RepoResult<SerialPlan> {
        if category.is_serial_tracked {
            SerialPlan::parse(input.serial_numbers.as_ref(), input.quantity)
        } else {
            Ok(SerialPlan::Untracked)
        }
    }

    /// Next free slug for a name, skipping the product being updated
    async fn resolve_slug(&self, name: &str, exclude: Option<&RecordId>) -> RepoResult<String> {
        let base = slugify(name);

        let taken: Vec<String> = match exclude {
            Some(pid) => {
                self.base
                    .db()
                    .query(
                        "SELECT VALUE slug FROM product \
                         WHERE string::starts_with(slug, $base) AND id != $pid",
                    )
                    .bind(("base", base.clone()))
                    .bind(("pid", pid.clone()))
                    .await?
                    .take(0)?
            }
            None => {
                self.base
                    .db()
                    .query("SELECT VALUE slug FROM product WHERE string::starts_with(slug, $base)")
                    .bind(("base", base.clone()))
                    .await?
                    .take(0)?
            }
        };

        Ok(resolve_collision(&base, &taken))
    }

    /// Run the product write and the serial rebuild as one transaction
    ///
    /// `write_stmt` 持有 `$pid` / `$product` 两个绑定位。
    /// 跨商品序列号占用在事务内检查，命中即 THROW 回滚整个事务。
    async fn write_with_serials<T>(
        &self,
        pid: &RecordId,
        write_stmt: &str,
        product: &T,
        plan: &SerialPlan,
    ) -> RepoResult<()>
    where
        T: Serialize + Clone + Send + Sync + 'static,
    {
        let script = match plan {
            SerialPlan::Untracked => format!(
                "BEGIN TRANSACTION; \
                 DELETE serial WHERE product = $pid; \
                 {write_stmt}; \
                 COMMIT TRANSACTION;"
            ),
            SerialPlan::Replace(_) => format!(
                "BEGIN TRANSACTION; \
                 LET $taken = (SELECT VALUE serial_number FROM serial \
                     WHERE serial_number IN $serials AND product != $pid); \
                 IF array::len($taken) > 0 {{ \
                     THROW '{marker}' + array::join($taken, ', '); \
                 }}; \
                 DELETE serial WHERE product = $pid; \
                 FOR $sn IN $serials {{ \
                     CREATE serial CONTENT {{ \
                         serial_number: $sn, \
                         product: $pid, \
                         status: 'available' \
                     }}; \
                 }}; \
                 {write_stmt}; \
                 COMMIT TRANSACTION;",
                marker = super::MARKER_SERIAL_TAKEN,
            ),
        };

        let response = self
            .base
            .db()
            .query(script)
            .bind(("pid", pid.clone()))
            .bind(("product", product.clone()))
            .bind(("serials", plan.serials().to_vec()))
            .await?;
        check_transaction(response)?;

        Ok(())
    }
}
