//! 持久化集成测试
//!
//! 验证 RocksDB 后端重开后数据仍在，且唯一索引随库一起恢复。

use storefront_server::db::DbService;
use storefront_server::db::models::CategoryCreate;
use storefront_server::db::repository::{CategoryRepository, RepoError};

#[tokio::test(flavor = "multi_thread")]
async fn test_data_survives_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("store.db");
    let path = path.to_string_lossy().to_string();

    {
        let db = DbService::new(&path).await.expect("open").db;
        CategoryRepository::new(db)
            .create(CategoryCreate {
                name: "Phones".into(),
                is_serial_tracked: Some(true),
            })
            .await
            .expect("create");
        // 作用域结束释放 RocksDB 锁
    }

    let db = DbService::new(&path).await.expect("reopen").db;
    let repo = CategoryRepository::new(db);

    let all = repo.find_all().await.expect("list");
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].name, "Phones");
    assert!(all[0].is_serial_tracked);

    // 唯一索引在重开后仍然生效
    let err = repo
        .create(CategoryCreate {
            name: "Phones".into(),
            is_serial_tracked: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Duplicate(_)));
}
