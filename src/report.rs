//! 迁移报告
//!
//! render 是纯函数：账本 + 运行事实 -> Markdown 文本。类别按固定顺序分节、组内保持插入顺序，
//! 空类别整节省略。save_report 先写检出目录，失败时退回备用路径。

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::core::AgentError;
use crate::memory::{ChangeCategory, ChangeLedger, ChangeRecord};
use crate::react::LoopOutcome;

/// 渲染报告所需的全部输入
#[derive(Debug)]
pub struct ReportInput<'a> {
    pub source: &'a str,
    pub ledger: &'a ChangeLedger,
    pub outcome: LoopOutcome,
    pub tests_passed: bool,
    pub generated_at: DateTime<Local>,
}

/// 报告中各类别的小节标题
pub fn section_title(category: ChangeCategory) -> &'static str {
    match category {
        ChangeCategory::BuildConfig => "## A — Build Configuration",
        ChangeCategory::Modernization => "## B — Code Modernization",
        ChangeCategory::Dependency => "## C — Dependency Upgrades",
        ChangeCategory::FrameworkMigration => "## D — Spring Boot 2→3 Migration",
        ChangeCategory::BugFix => "## Bug Fixes",
        ChangeCategory::TestFix => "## Test Fixes",
    }
}

pub fn render(input: &ReportInput<'_>) -> String {
    let mut out = String::new();
    let ledger = input.ledger;

    let _ = writeln!(out, "# Java 11 → 21 Migration Report\n");
    let _ = writeln!(out, "**Repository:** {}  ", input.source);
    let _ = writeln!(out, "**Date:** {}  ", input.generated_at.format("%Y-%m-%d %H:%M"));
    let _ = writeln!(out, "**Status:** {}  ", input.outcome.status());
    let _ = writeln!(
        out,
        "**Tests Passed:** {}  ",
        if input.tests_passed { "YES" } else { "NO / Not run" }
    );
    let _ = writeln!(out, "**Total Changes:** {}\n", ledger.len());
    let _ = writeln!(out, "---\n");

    if ledger.is_empty() {
        let _ = writeln!(out, "No changes were logged.\n");
    }

    for category in ChangeCategory::DISPLAY_ORDER {
        let mut entries = ledger.by_category(category).peekable();
        if entries.peek().is_none() {
            continue;
        }
        let _ = writeln!(out, "{}\n", section_title(category));
        for record in entries {
            render_entry(&mut out, record);
        }
    }

    out.push_str("---\n\n");
    out.push_str("## How to Revert All Changes\n\n");
    out.push_str("```bash\n");
    out.push_str("git diff HEAD          # see all changes\n");
    out.push_str("git diff HEAD -- file  # see one file\n");
    out.push_str("git checkout .         # revert everything\n");
    out.push_str("git checkout -- file   # revert one file\n");
    out.push_str("```\n\n");
    out.push_str("## Changed Files\n\n");
    for file in ledger.changed_files() {
        let _ = writeln!(out, "- `{}`", file);
    }
    out
}

fn render_entry(out: &mut String, record: &ChangeRecord) {
    let name = Path::new(&record.file)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| record.file.clone());
    let _ = writeln!(out, "### `{}`: {}\n", name, record.change_type);
    let _ = writeln!(out, "**File:** `{}`  ", record.file);
    let _ = writeln!(out, "**Time:** {}\n", record.timestamp.format("%H:%M:%S"));
    let _ = writeln!(out, "{}\n", record.description);
    if let Some(before) = &record.before {
        let _ = writeln!(out, "**Before:**\n```java\n{}\n```\n", before);
    }
    if let Some(after) = &record.after {
        let _ = writeln!(out, "**After:**\n```java\n{}\n```\n", after);
    }
}

/// 写入 `<dir>/<file_name>`；目录缺失或写入失败时改写 fallback，返回实际路径
pub fn save_report(
    contents: &str,
    dir: Option<&Path>,
    file_name: &str,
    fallback: &Path,
) -> Result<PathBuf, AgentError> {
    if let Some(dir) = dir {
        let primary = dir.join(file_name);
        match std::fs::write(&primary, contents) {
            Ok(()) => return Ok(primary),
            Err(e) => {
                tracing::warn!(path = %primary.display(), error = %e, "report write failed, using fallback");
            }
        }
    }
    std::fs::write(fallback, contents).map_err(|source| AgentError::ReportWriteFailed {
        path: fallback.to_path_buf(),
        source,
    })?;
    Ok(fallback.to_path_buf())
}

/// 终端摘要（纯文本行）
pub fn summary_lines(
    input: &ReportInput<'_>,
    report_path: Option<&Path>,
    checkout_dir: Option<&Path>,
) -> Vec<String> {
    let mut lines = vec!["Migration Summary".to_string(), String::new()];
    if input.ledger.is_empty() {
        lines.push("No changes were logged.".to_string());
    } else {
        for category in ChangeCategory::DISPLAY_ORDER {
            let count = input.ledger.by_category(category).count();
            if count > 0 {
                lines.push(format!("  {:<20} {}", category.label(), count));
            }
        }
    }
    lines.push(String::new());
    lines.push(format!("Status:         {}", input.outcome.status()));
    lines.push(format!("Total changes:  {}", input.ledger.len()));
    lines.push(format!(
        "Tests:          {}",
        if input.tests_passed { "PASSED" } else { "FAILED / Not run" }
    ));
    if let Some(path) = report_path {
        lines.push(format!("Report saved:   {}", path.display()));
    }
    if let Some(dir) = checkout_dir {
        let dir = dir.display();
        lines.push(String::new());
        lines.push(format!("See all changes:    git -C {} diff HEAD", dir));
        lines.push(format!("List changed files: git -C {} diff --name-only HEAD", dir));
        lines.push(format!("Revert all:         git -C {} checkout .", dir));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(category: ChangeCategory, file: &str, change_type: &str) -> ChangeRecord {
        ChangeRecord {
            category,
            file: file.to_string(),
            change_type: change_type.to_string(),
            description: format!("{} in {}", change_type, file),
            before: None,
            after: None,
            timestamp: Local.with_ymd_and_hms(2026, 3, 4, 9, 5, 7).unwrap(),
        }
    }

    fn input(ledger: &ChangeLedger) -> ReportInput<'_> {
        ReportInput {
            source: "https://github.com/acme/app",
            ledger,
            outcome: LoopOutcome::Completed,
            tests_passed: true,
            generated_at: Local.with_ymd_and_hms(2026, 3, 4, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_empty_ledger_renders_placeholder() {
        let ledger = ChangeLedger::new();
        let text = render(&input(&ledger));
        assert!(text.contains("No changes were logged."));
        assert!(text.contains("**Total Changes:** 0"));
        assert!(!text.contains("## A — Build Configuration"));
        assert!(text.contains("git checkout -- file"));
    }

    #[test]
    fn test_sections_in_fixed_order_entries_in_insertion_order() {
        let mut ledger = ChangeLedger::new();
        ledger.append(record(ChangeCategory::TestFix, "src/test/AppTest.java", "Mockito 5"));
        ledger.append(record(ChangeCategory::BuildConfig, "pom.xml", "Java 21"));
        ledger.append(record(ChangeCategory::Modernization, "src/Point.java", "Record Class"));
        ledger.append(record(ChangeCategory::BuildConfig, "pom.xml", "Compiler 3.12.1"));

        let text = render(&input(&ledger));
        let a = text.find("## A — Build Configuration").unwrap();
        let b = text.find("## B — Code Modernization").unwrap();
        let t = text.find("## Test Fixes").unwrap();
        assert!(a < b && b < t);
        assert!(!text.contains("## C — Dependency Upgrades"));

        let first = text.find("### `pom.xml`: Java 21").unwrap();
        let second = text.find("### `pom.xml`: Compiler 3.12.1").unwrap();
        assert!(first < second);
        assert!(text.contains("**Time:** 09:05:07"));
        assert!(text.contains("**Status:** Complete"));
    }

    #[test]
    fn test_before_after_blocks_and_changed_files() {
        let mut ledger = ChangeLedger::new();
        let mut rec = record(ChangeCategory::FrameworkMigration, "src/User.java", "javax->jakarta");
        rec.before = Some("import javax.persistence.Entity;".into());
        rec.after = Some("import jakarta.persistence.Entity;".into());
        ledger.append(rec);
        ledger.append(record(ChangeCategory::Dependency, "pom.xml", "Lombok"));

        let text = render(&input(&ledger));
        assert!(text.contains("**Before:**\n```java\nimport javax.persistence.Entity;\n```"));
        assert!(text.contains("**After:**\n```java\nimport jakarta.persistence.Entity;\n```"));
        let files = text.split("## Changed Files").nth(1).unwrap();
        assert!(files.find("- `pom.xml`").unwrap() < files.find("- `src/User.java`").unwrap());
    }

    #[test]
    fn test_render_is_deterministic() {
        let mut ledger = ChangeLedger::new();
        ledger.append(record(ChangeCategory::BugFix, "A.java", "NPE"));
        assert_eq!(render(&input(&ledger)), render(&input(&ledger)));
    }

    #[test]
    fn test_save_report_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let fallback = dir.path().join("fallback.md");

        let primary = save_report("# r", Some(dir.path()), "MIGRATION_REPORT.md", &fallback).unwrap();
        assert_eq!(primary, dir.path().join("MIGRATION_REPORT.md"));

        let missing = dir.path().join("does/not/exist");
        let used = save_report("# r", Some(&missing), "MIGRATION_REPORT.md", &fallback).unwrap();
        assert_eq!(used, fallback);
        assert_eq!(std::fs::read_to_string(&fallback).unwrap(), "# r");
    }

    #[test]
    fn test_summary_lines_show_counts_and_git_commands() {
        let mut ledger = ChangeLedger::new();
        ledger.append(record(ChangeCategory::Dependency, "pom.xml", "Surefire"));
        ledger.append(record(ChangeCategory::Dependency, "pom.xml", "Lombok"));
        let lines = summary_lines(
            &input(&ledger),
            Some(Path::new("/tmp/app/MIGRATION_REPORT.md")),
            Some(Path::new("/tmp/app")),
        );
        assert!(lines.iter().any(|l| l.trim_start().starts_with("dependency") && l.ends_with('2')));
        assert!(lines.iter().any(|l| l.contains("git -C /tmp/app diff HEAD")));
        assert!(lines.iter().any(|l| l == "Tests:          PASSED"));
    }
}
