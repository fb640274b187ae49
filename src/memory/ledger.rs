//! 变更账本：只追加的 ChangeRecord 序列
//!
//! 仅 log_change 工具向其追加；记录一经写入不再修改，长度在一次运行内单调不减。
//! 账本归 Session 所有，显式传给调度器与报告生成器，不存在进程级全局状态。

use chrono::{DateTime, Local};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// 变更类别（封闭集合）；线上名称与指令文档保持一致，短横线形式作为别名接受
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
pub enum ChangeCategory {
    #[serde(rename = "BUILD_CONFIG", alias = "build-config")]
    BuildConfig,
    #[serde(rename = "CODE_MODERNIZATION", alias = "modernization")]
    Modernization,
    #[serde(rename = "DEPENDENCY", alias = "dependency")]
    Dependency,
    #[serde(rename = "SPRING_BOOT", alias = "framework-migration")]
    FrameworkMigration,
    #[serde(rename = "BUG_FIX", alias = "bug-fix")]
    BugFix,
    #[serde(rename = "TEST_FIX", alias = "test-fix")]
    TestFix,
}

impl ChangeCategory {
    /// 报告中的固定展示顺序
    pub const DISPLAY_ORDER: [ChangeCategory; 6] = [
        ChangeCategory::BuildConfig,
        ChangeCategory::Modernization,
        ChangeCategory::Dependency,
        ChangeCategory::FrameworkMigration,
        ChangeCategory::BugFix,
        ChangeCategory::TestFix,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::BuildConfig => "build-config",
            Self::Modernization => "modernization",
            Self::Dependency => "dependency",
            Self::FrameworkMigration => "framework-migration",
            Self::BugFix => "bug-fix",
            Self::TestFix => "test-fix",
        }
    }
}

impl std::fmt::Display for ChangeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// 单条变更记录
#[derive(Clone, Debug, PartialEq)]
pub struct ChangeRecord {
    pub category: ChangeCategory,
    pub file: String,
    pub change_type: String,
    pub description: String,
    pub before: Option<String>,
    pub after: Option<String>,
    pub timestamp: DateTime<Local>,
}

/// 只追加账本：不提供任何修改或删除已有记录的接口
#[derive(Debug, Default)]
pub struct ChangeLedger {
    records: Vec<ChangeRecord>,
}

impl ChangeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一条记录，返回追加后的总数
    pub fn append(&mut self, record: ChangeRecord) -> usize {
        tracing::info!(
            category = %record.category,
            file = %record.file,
            change_type = %record.change_type,
            "change logged"
        );
        self.records.push(record);
        self.records.len()
    }

    pub fn records(&self) -> &[ChangeRecord] {
        &self.records
    }

    /// 某一类别下的记录，保持插入顺序
    pub fn by_category(&self, category: ChangeCategory) -> impl Iterator<Item = &ChangeRecord> {
        self.records.iter().filter(move |r| r.category == category)
    }

    /// 去重并排序后的变更文件路径
    pub fn changed_files(&self) -> Vec<&str> {
        let mut files: Vec<&str> = self.records.iter().map(|r| r.file.as_str()).collect();
        files.sort_unstable();
        files.dedup();
        files
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(category: ChangeCategory, file: &str) -> ChangeRecord {
        ChangeRecord {
            category,
            file: file.to_string(),
            change_type: "Record Class".to_string(),
            description: "converted POJO".to_string(),
            before: None,
            after: None,
            timestamp: Local::now(),
        }
    }

    #[test]
    fn test_append_returns_running_total() {
        let mut ledger = ChangeLedger::new();
        assert_eq!(ledger.append(record(ChangeCategory::Dependency, "pom.xml")), 1);
        assert_eq!(ledger.append(record(ChangeCategory::BugFix, "A.java")), 2);
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_existing_entries_unchanged_after_append() {
        let mut ledger = ChangeLedger::new();
        ledger.append(record(ChangeCategory::BuildConfig, "pom.xml"));
        let first = ledger.records()[0].clone();
        ledger.append(record(ChangeCategory::TestFix, "ATest.java"));
        assert_eq!(ledger.records()[0], first);
    }

    #[test]
    fn test_changed_files_sorted_and_distinct() {
        let mut ledger = ChangeLedger::new();
        ledger.append(record(ChangeCategory::Modernization, "src/B.java"));
        ledger.append(record(ChangeCategory::BuildConfig, "pom.xml"));
        ledger.append(record(ChangeCategory::Modernization, "src/B.java"));
        assert_eq!(ledger.changed_files(), vec!["pom.xml", "src/B.java"]);
    }

    #[test]
    fn test_category_accepts_wire_names_and_aliases() {
        let wire: ChangeCategory = serde_json::from_str("\"SPRING_BOOT\"").unwrap();
        let alias: ChangeCategory = serde_json::from_str("\"framework-migration\"").unwrap();
        assert_eq!(wire, ChangeCategory::FrameworkMigration);
        assert_eq!(alias, ChangeCategory::FrameworkMigration);
        assert!(serde_json::from_str::<ChangeCategory>("\"REFACTOR\"").is_err());
    }
}
