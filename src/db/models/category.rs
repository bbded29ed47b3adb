//! Category Model

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

pub type CategoryId = RecordId;

/// Category model
///
/// `is_serial_tracked` 决定该分类下的商品是否需要逐件登记序列号。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<CategoryId>,
    pub name: String,
    #[serde(default)]
    pub is_serial_tracked: bool,
}

impl Category {
    pub fn new(name: String) -> Self {
        Self {
            id: None,
            name,
            is_serial_tracked: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCreate {
    pub name: String,
    pub is_serial_tracked: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_serial_tracked: Option<bool>,
}
