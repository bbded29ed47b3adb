//! Data Models
//!
//! 数据库文档模型与 API DTO：
//! - [`Category`] - 商品分类 (含序列号跟踪标记)
//! - [`Product`] - 商品 (含评价、库存计数)
//! - [`Serial`] - 序列号注册表单元 (available/assigned/sold)
//! - [`Order`] - 订单 (创建后行项目不可变)
//! - [`User`] - 用户账户

pub mod category;
pub mod order;
pub mod product;
pub mod serial;
pub mod user;

pub use category::{Category, CategoryCreate, CategoryUpdate};
pub use order::{
    CartLine, Order, OrderCreate, OrderItem, OrderStatus, OrderSummary, ShippingAddress,
};
pub use product::{Product, ProductInput, Review, ReviewInput, SerialNumbersInput};
pub use serial::{Serial, SerialPlan, SerialStatus};
pub use user::{LoginRequest, RegisterRequest, Role, User, UserView};
