//! Category Repository

use surrealdb::engine::local::Db;
use surrealdb::Surreal;

use super::{record_id, BaseRepository, RepoError, RepoResult};
use crate::db::models::{Category, CategoryCreate, CategoryUpdate};

/// Category repository
///
/// `is_serial_tracked` 决定该分类下的商品是否强制登记序列号。
#[derive(Clone)]
pub struct CategoryRepository {
    base: BaseRepository,
}

impl CategoryRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Create a category (name is unique)
    pub async fn create(&self, input: CategoryCreate) -> RepoResult<Category> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(RepoError::Validation("Category name is required".into()));
        }

        let category = Category {
            id: None,
            name,
            is_serial_tracked: input.is_serial_tracked.unwrap_or(false),
        };

        let created: Option<Category> = self
            .base
            .db()
            .create("category")
            .content(category)
            .await?;

        created.ok_or_else(|| RepoError::Database("Failed to create category".into()))
    }

    /// Find all categories, alphabetically
    pub async fn find_all(&self) -> RepoResult<Vec<Category>> {
        let categories: Vec<Category> = self
            .base
            .db()
            .query("SELECT * FROM category ORDER BY name ASC")
            .await?
            .take(0)?;
        Ok(categories)
    }

    /// Find a category by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Category> {
        let category: Option<Category> = self.base.db().select(record_id("category", id)).await?;
        category.ok_or_else(|| RepoError::NotFound(format!("Category {id} not found")))
    }

    /// Partial update
    pub async fn update(&self, id: &str, input: CategoryUpdate) -> RepoResult<Category> {
        if let Some(name) = &input.name
            && name.trim().is_empty()
        {
            return Err(RepoError::Validation("Category name is required".into()));
        }

        let updated: Option<Category> = self
            .base
            .db()
            .update(record_id("category", id))
            .merge(input)
            .await?;

        updated.ok_or_else(|| RepoError::NotFound(format!("Category {id} not found")))
    }

    /// Delete a category
    ///
    /// 仍被商品引用的分类拒绝删除。
    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        let cid = record_id("category", id);

        let mut response = self
            .base
            .db()
            .query("SELECT count() FROM product WHERE category = $cid GROUP ALL")
            .bind(("cid", cid.clone()))
            .await?;
        let counts: Vec<CountRow> = response.take(0)?;
        if counts.first().map(|c| c.count).unwrap_or(0) > 0 {
            return Err(RepoError::Validation(
                "Cannot delete a category that still has products".into(),
            ));
        }

        let deleted: Option<Category> = self.base.db().delete(cid).await?;
        deleted
            .map(|_| ())
            .ok_or_else(|| RepoError::NotFound(format!("Category {id} not found")))
    }
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct CountRow {
    pub count: i64,
}
