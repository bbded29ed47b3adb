//! 商品目录集成测试
//!
//! 覆盖序列号整体替换 (reconciliation)、跨商品序列号唯一性、
//! slug 生成与冲突、评价聚合、分类删除保护。

use storefront_server::db::DbService;
use storefront_server::db::models::{
    Category, CategoryCreate, CategoryUpdate, ProductInput, ReviewInput, SerialNumbersInput,
    SerialStatus,
};
use storefront_server::db::repository::{
    record_id, CategoryRepository, ProductRepository, RepoError, SerialRepository,
};
use surrealdb::engine::local::Db;
use surrealdb::Surreal;

async fn setup() -> Surreal<Db> {
    DbService::new_memory().await.expect("in-memory db").db
}

async fn tracked_category(db: &Surreal<Db>, name: &str) -> Category {
    CategoryRepository::new(db.clone())
        .create(CategoryCreate {
            name: name.into(),
            is_serial_tracked: Some(true),
        })
        .await
        .expect("category")
}

fn input(name: &str, category: &Category, qty: i64, serials: &[&str]) -> ProductInput {
    ProductInput {
        name: name.into(),
        description: "desc".into(),
        price: 10.0,
        category: category.id.as_ref().expect("category id").to_string(),
        quantity: qty,
        brand: "Acme".into(),
        image: "/img/x.png".into(),
        serial_numbers: if serials.is_empty() {
            None
        } else {
            Some(SerialNumbersInput::List(
                serials.iter().map(|s| s.to_string()).collect(),
            ))
        },
    }
}

#[tokio::test]
async fn test_create_registers_serials_as_available() {
    let db = setup().await;
    let category = tracked_category(&db, "Phones").await;

    let products = ProductRepository::new(db.clone());
    let product = products
        .create(input("Phone X", &category, 2, &["A1", "A2"]))
        .await
        .expect("create");
    assert_eq!(product.count_in_stock, 2);

    let serials = SerialRepository::new(db.clone());
    let all = serials
        .find_by_product(product.id.expect("id"))
        .await
        .expect("serials");
    assert_eq!(all.len(), 2);
    assert!(all.iter().all(|s| s.status == SerialStatus::Available));
}

#[tokio::test]
async fn test_serial_count_mismatch_rejected() {
    let db = setup().await;
    let category = tracked_category(&db, "Phones").await;

    let products = ProductRepository::new(db.clone());
    let err = products
        .create(input("Phone X", &category, 3, &["A1", "A2"]))
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));

    // 商品不应存在
    assert!(products.find_all_newest().await.expect("list").is_empty());
}

#[tokio::test]
async fn test_update_replaces_serial_set() {
    let db = setup().await;
    let category = tracked_category(&db, "Phones").await;

    let products = ProductRepository::new(db.clone());
    let product = products
        .create(input("Phone X", &category, 2, &["A1", "A2"]))
        .await
        .expect("create");
    let slug = product.slug.clone();
    let pid = product.id.expect("id");

    // 整体替换: A1/A2 → B1/B2/B3
    let updated = products
        .update_by_slug(&slug, input("Phone X", &category, 3, &["B1", "B2", "B3"]))
        .await
        .expect("update");
    assert_eq!(updated.count_in_stock, 3);

    let serials = SerialRepository::new(db.clone());
    let all = serials.find_by_product(pid.clone()).await.expect("serials");
    let numbers: Vec<&str> = all.iter().map(|s| s.serial_number.as_str()).collect();
    assert_eq!(numbers, vec!["B1", "B2", "B3"]);

    // 幂等: 同一集合再提交一次, 结果不变
    products
        .update_by_slug(&slug, input("Phone X", &category, 3, &["B1", "B2", "B3"]))
        .await
        .expect("idempotent update");
    let again = serials.find_by_product(pid).await.expect("serials");
    assert_eq!(again.len(), 3);
}

#[tokio::test]
async fn test_cross_product_serial_rejected_and_rolls_back() {
    let db = setup().await;
    let category = tracked_category(&db, "Phones").await;

    let products = ProductRepository::new(db.clone());
    products
        .create(input("Phone X", &category, 2, &["A1", "A2"]))
        .await
        .expect("first product");

    // A2 已属于 Phone X
    let err = products
        .create(input("Phone Y", &category, 2, &["A2", "C1"]))
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::SerialExists(_)));

    // 第二个商品与它的 C1 序列号都不应存在
    let all = products.find_all_newest().await.expect("list");
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].name, "Phone X");
}

#[tokio::test]
async fn test_untracked_category_ignores_serials() {
    let db = setup().await;
    let categories = CategoryRepository::new(db.clone());
    let category = categories
        .create(CategoryCreate {
            name: "Misc".into(),
            is_serial_tracked: None,
        })
        .await
        .expect("category");

    let products = ProductRepository::new(db.clone());
    let product = products
        .create(input("Socks", &category, 5, &[]))
        .await
        .expect("create");

    let serials = SerialRepository::new(db.clone());
    let all = serials
        .find_by_product(product.id.expect("id"))
        .await
        .expect("serials");
    assert!(all.is_empty());
}

#[tokio::test]
async fn test_slug_collision_gets_suffix() {
    let db = setup().await;
    let category = tracked_category(&db, "Phones").await;

    let products = ProductRepository::new(db.clone());
    let first = products
        .create(input("Phone X", &category, 1, &["S1"]))
        .await
        .expect("first");
    let second = products
        .create(input("Phone X", &category, 1, &["S2"]))
        .await
        .expect("second");

    assert_eq!(first.slug, "phone-x");
    assert_eq!(second.slug, "phone-x-2");
}

#[tokio::test]
async fn test_delete_product_removes_serials() {
    let db = setup().await;
    let category = tracked_category(&db, "Phones").await;

    let products = ProductRepository::new(db.clone());
    let product = products
        .create(input("Phone X", &category, 2, &["A1", "A2"]))
        .await
        .expect("create");
    let pid = product.id.expect("id");

    products
        .delete(&pid.key().to_string())
        .await
        .expect("delete");

    let serials = SerialRepository::new(db.clone());
    let all = serials.find_by_product(pid).await.expect("serials");
    assert!(all.is_empty());

    // 序列号释放后可以被其它商品使用
    products
        .create(input("Phone Z", &category, 2, &["A1", "A2"]))
        .await
        .expect("reuse serials");
}

#[tokio::test]
async fn test_one_review_per_user() {
    let db = setup().await;
    let category = tracked_category(&db, "Phones").await;

    let products = ProductRepository::new(db.clone());
    let product = products
        .create(input("Phone X", &category, 1, &["S1"]))
        .await
        .expect("create");
    let id = product.id.expect("id").key().to_string();

    let reviewer = record_id("user", "alice");
    let reviewed = products
        .add_review(
            &id,
            reviewer.clone(),
            "alice".into(),
            ReviewInput {
                rating: 4,
                comment: "Nice".into(),
            },
        )
        .await
        .expect("review");
    assert_eq!(reviewed.num_reviews, 1);
    assert_eq!(reviewed.rating, 4.0);

    let err = products
        .add_review(
            &id,
            reviewer,
            "alice".into(),
            ReviewInput {
                rating: 1,
                comment: "Changed my mind".into(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Duplicate(_)));

    // 第二个用户拉低平均分
    let other = products
        .add_review(
            &id,
            record_id("user", "bob"),
            "bob".into(),
            ReviewInput {
                rating: 2,
                comment: "Meh".into(),
            },
        )
        .await
        .expect("second review");
    assert_eq!(other.num_reviews, 2);
    assert_eq!(other.rating, 3.0);
}

#[tokio::test]
async fn test_category_with_products_cannot_be_deleted() {
    let db = setup().await;
    let categories = CategoryRepository::new(db.clone());
    let category = tracked_category(&db, "Phones").await;
    let cid = category.id.as_ref().expect("id").key().to_string();

    let products = ProductRepository::new(db.clone());
    products
        .create(input("Phone X", &category, 1, &["S1"]))
        .await
        .expect("create");

    let err = categories.delete(&cid).await.unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));

    // 改名不受影响
    let renamed = categories
        .update(
            &cid,
            CategoryUpdate {
                name: Some("Smartphones".into()),
                is_serial_tracked: None,
            },
        )
        .await
        .expect("rename");
    assert_eq!(renamed.name, "Smartphones");

    // 重名分类被唯一索引拒绝
    let err = categories
        .create(CategoryCreate {
            name: "Smartphones".into(),
            is_serial_tracked: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Duplicate(_)));
}
