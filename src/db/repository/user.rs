//! User Repository

use surrealdb::engine::local::Db;
use surrealdb::Surreal;
use surrealdb::sql::Datetime;

use super::{record_id, BaseRepository, RepoError, RepoResult};
use crate::db::models::{Role, User};

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Create a user (email is unique)
    ///
    /// 密码必须已在调用方哈希完成，这里不接触明文。
    pub async fn create(
        &self,
        username: String,
        email: String,
        password_hash: String,
        role: Role,
    ) -> RepoResult<User> {
        let user = User {
            id: None,
            username,
            email: email.to_lowercase(),
            password_hash,
            role,
            created_at: Datetime::default(),
        };

        let created: Option<User> = self.base.db().create("user").content(user).await.map_err(
            |e| match RepoError::from(e) {
                RepoError::Duplicate(_) => {
                    RepoError::Duplicate("A user with this email already exists".into())
                }
                other => other,
            },
        )?;

        created.ok_or_else(|| RepoError::Database("Failed to create user".into()))
    }

    /// Find a user by email (case-insensitive)
    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let mut response = self
            .base
            .db()
            .query("SELECT * FROM user WHERE email = $email LIMIT 1")
            .bind(("email", email.to_lowercase()))
            .await?;
        let user: Option<User> = response.take(0)?;
        Ok(user)
    }

    /// Find a user by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<User> {
        let user: Option<User> = self.base.db().select(record_id("user", id)).await?;
        user.ok_or_else(|| RepoError::NotFound(format!("User {id} not found")))
    }
}
