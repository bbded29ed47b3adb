//! Storefront Server - 电商门店后端
//!
//! # 架构概述
//!
//! 本模块是 Storefront Server 的主入口，提供以下核心功能：
//!
//! - **商品目录** (`db`): 嵌入式 SurrealDB 存储 (商品、分类、序列号、订单、用户)
//! - **订单履约** (`fulfillment`): 校验、库存预留、序列号分配、原子化落单
//! - **定价** (`pricing`): rust_decimal 精确金额计算
//! - **认证** (`auth`): JWT + Argon2 认证体系
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! src/
//! ├── core/          # 配置、状态、错误
//! ├── auth/          # JWT 认证、角色
//! ├── db/            # 数据库层 (models + repository)
//! ├── pricing/       # 定价计算器
//! ├── fulfillment/   # 订单履约引擎
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 工具函数
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod fulfillment;
pub mod pricing;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use fulfillment::FulfillmentEngine;
pub use utils::{AppError, AppResponse, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

pub fn print_banner() {
    println!(
        r#"
   _____ __                  ____                 __
  / ___// /_____  ________  / __/________  ____  / /_
  \__ \/ __/ __ \/ ___/ _ \/ /_/ ___/ __ \/ __ \/ __/
 ___/ / /_/ /_/ / /  /  __/ __/ /  / /_/ / / / / /_
/____/\__/\____/_/   \___/_/ /_/   \____/_/ /_/\__/
    "#
    );
}
