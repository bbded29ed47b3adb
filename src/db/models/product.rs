//! Product Model

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;
use surrealdb::sql::Datetime;

pub type ProductId = RecordId;

/// Product model
///
/// # 不变量
///
/// `count_in_stock` 与 `quantity` 在下单时同步扣减，且不允许为负
/// (扣减由履约引擎的条件更新保证，见 `fulfillment`)。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ProductId>,
    /// Unique URL slug derived from name
    pub slug: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    /// Record link to category
    pub category: RecordId,
    /// Resolved category name (admin listing projection only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    pub quantity: i64,
    pub count_in_stock: i64,
    pub brand: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub reviews: Vec<Review>,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub num_reviews: i64,
    pub created_at: Datetime,
}

/// Embedded product review
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    /// Reviewer user id
    pub user: RecordId,
    pub name: String,
    pub rating: i64,
    pub comment: String,
    pub created_at: Datetime,
}

/// Review submission payload
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewInput {
    pub rating: i64,
    pub comment: String,
}

/// Serial numbers as submitted by the admin UI
///
/// 既接受逗号拼接的字符串，也接受字符串数组。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SerialNumbersInput {
    Joined(String),
    List(Vec<String>),
}

/// Create/update payload (full-replace semantics on update)
#[derive(Debug, Clone, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub price: f64,
    /// Category id ("category:xyz" or bare key)
    pub category: String,
    pub quantity: i64,
    pub brand: String,
    pub image: String,
    /// Required when the category is serial-tracked
    #[serde(default)]
    pub serial_numbers: Option<SerialNumbersInput>,
}

impl ProductInput {
    /// Field-presence validation, mirrors the admin form contract
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Name is required".into());
        }
        if self.description.trim().is_empty() {
            return Err("Description is required".into());
        }
        if self.price < 0.0 || !self.price.is_finite() {
            return Err("Price must be a non-negative number".into());
        }
        if self.category.trim().is_empty() {
            return Err("Category is required".into());
        }
        if self.quantity < 0 {
            return Err("Quantity must be non-negative".into());
        }
        if self.brand.trim().is_empty() {
            return Err("Brand is required".into());
        }
        if self.image.trim().is_empty() {
            return Err("Image is required".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> ProductInput {
        ProductInput {
            name: "iPhone 15".into(),
            description: "A phone".into(),
            price: 999.0,
            category: "category:phones".into(),
            quantity: 3,
            brand: "Apple".into(),
            image: "/img/iphone.png".into(),
            serial_numbers: None,
        }
    }

    #[test]
    fn test_valid_input() {
        assert!(input().validate().is_ok());
    }

    #[test]
    fn test_missing_fields_rejected() {
        let mut i = input();
        i.name = "  ".into();
        assert_eq!(i.validate().unwrap_err(), "Name is required");

        let mut i = input();
        i.brand = String::new();
        assert_eq!(i.validate().unwrap_err(), "Brand is required");
    }

    #[test]
    fn test_negative_price_rejected() {
        let mut i = input();
        i.price = -1.0;
        assert!(i.validate().is_err());
    }
}
