//! 工具模块 - 通用工具函数和类型
//!
//! # 内容
//!
//! - [`AppError`] - 应用错误类型
//! - [`AppResponse`] - API 响应结构
//! - [`slug`] - URL slug 生成
//! - 日志等工具

pub mod error;
pub mod logger;
pub mod slug;

pub use error::{AppError, AppResult};

/// API 响应结构
///
/// ```json
/// { "success": true, "data": { ... } }
/// ```
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> AppResponse<T> {
    /// 创建成功响应
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    /// 创建错误响应
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }
}

/// Number of pages needed for `total` rows at `page_size` rows per page
pub fn page_count(total: i64, page_size: i64) -> i64 {
    if page_size <= 0 {
        return 0;
    }
    (total + page_size - 1) / page_size
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_count_rounds_up() {
        assert_eq!(page_count(0, 6), 0);
        assert_eq!(page_count(6, 6), 1);
        assert_eq!(page_count(7, 6), 2);
        assert_eq!(page_count(13, 10), 2);
    }

    #[test]
    fn test_page_count_guards_zero_size() {
        assert_eq!(page_count(10, 0), 0);
    }

    #[test]
    fn test_response_envelope_shapes() {
        let ok = serde_json::to_value(AppResponse::success(5)).expect("json");
        assert_eq!(ok, serde_json::json!({"success": true, "data": 5}));

        let err = serde_json::to_value(AppResponse::<()>::error("nope")).expect("json");
        assert_eq!(err, serde_json::json!({"success": false, "message": "nope"}));
    }
}
