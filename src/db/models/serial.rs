//! Serial Model
//!
//! 序列号注册表：每个物理单元对应一条 Serial 记录。
//! `serial_number` 在整个注册表内全局唯一 (存储层 UNIQUE 索引 + 跨商品检查)。

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::product::SerialNumbersInput;
use crate::db::repository::{RepoError, RepoResult};

/// Serial lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SerialStatus {
    /// 在库，可分配
    Available,
    /// 已分配给某个订单的用户
    Assigned,
    /// 已售出 (预留状态，当前流程不写入)
    Sold,
}

/// Serial model — one record per physical unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Serial {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub serial_number: String,
    /// Owning product (exclusive ownership; transfer = delete + recreate)
    pub product: RecordId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<RecordId>,
    pub status: SerialStatus,
}

/// Validated serial set for a product create/update
///
/// 解析阶段是纯函数：不触库，仅做数量/重复校验。
/// 跨商品重复检查发生在事务内 (见 ProductRepository)。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SerialPlan {
    /// 分类不跟踪序列号：清空该商品的序列号集合
    Untracked,
    /// 分类跟踪序列号：用这组序列号整体替换
    Replace(Vec<String>),
}

impl SerialPlan {
    /// Parse the requested serial numbers for a serial-tracked product
    ///
    /// Accepts either a comma-joined string or a list; entries are trimmed
    /// and empty entries dropped. The resulting set must contain exactly
    /// `quantity` distinct entries.
    pub fn parse(requested: Option<&SerialNumbersInput>, quantity: i64) -> RepoResult<Self> {
        let raw: Vec<String> = match requested {
            None => Vec::new(),
            Some(SerialNumbersInput::Joined(s)) => s
                .split(',')
                .map(|sn| sn.trim().to_string())
                .filter(|sn| !sn.is_empty())
                .collect(),
            Some(SerialNumbersInput::List(list)) => list
                .iter()
                .map(|sn| sn.trim().to_string())
                .filter(|sn| !sn.is_empty())
                .collect(),
        };

        if raw.len() as i64 != quantity {
            return Err(RepoError::Validation(format!(
                "Please provide exactly {} serial numbers (got {})",
                quantity,
                raw.len()
            )));
        }

        let mut seen = std::collections::HashSet::new();
        for sn in &raw {
            if !seen.insert(sn.as_str()) {
                return Err(RepoError::Validation(format!(
                    "Duplicate serial number in input: {sn}"
                )));
            }
        }

        Ok(SerialPlan::Replace(raw))
    }

    /// The serial numbers to insert, if any
    pub fn serials(&self) -> &[String] {
        match self {
            SerialPlan::Untracked => &[],
            SerialPlan::Replace(list) => list,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_joined_string() {
        let input = SerialNumbersInput::Joined(" A1, B2 ,C3 ".to_string());
        let plan = SerialPlan::parse(Some(&input), 3).expect("parse");
        assert_eq!(
            plan,
            SerialPlan::Replace(vec!["A1".into(), "B2".into(), "C3".into()])
        );
    }

    #[test]
    fn test_parse_list_form() {
        let input = SerialNumbersInput::List(vec!["X1 ".into(), " X2".into()]);
        let plan = SerialPlan::parse(Some(&input), 2).expect("parse");
        assert_eq!(plan.serials(), &["X1".to_string(), "X2".to_string()]);
    }

    #[test]
    fn test_count_mismatch_rejected() {
        let input = SerialNumbersInput::List(vec!["A".into(), "B".into(), "C".into()]);
        let err = SerialPlan::parse(Some(&input), 5).unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
    }

    #[test]
    fn test_duplicate_input_rejected() {
        let input = SerialNumbersInput::List(vec!["A".into(), "A".into(), "B".into()]);
        let err = SerialPlan::parse(Some(&input), 3).unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
    }

    #[test]
    fn test_missing_input_is_count_mismatch() {
        let err = SerialPlan::parse(None, 2).unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
    }

    #[test]
    fn test_empty_entries_dropped() {
        let input = SerialNumbersInput::Joined("A1,,B2,".to_string());
        let plan = SerialPlan::parse(Some(&input), 2).expect("parse");
        assert_eq!(plan.serials().len(), 2);
    }
}
