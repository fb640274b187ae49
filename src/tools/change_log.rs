//! log_change：向账本追加一条带时间戳的变更记录

use chrono::Local;

use crate::memory::{ChangeLedger, ChangeRecord};
use crate::tools::registry::{LogChangeArgs, ToolOutput, ToolResult};

pub fn log_change(args: &LogChangeArgs, ledger: &mut ChangeLedger) -> ToolResult {
    let non_empty = |s: &Option<String>| s.as_ref().filter(|v| !v.trim().is_empty()).cloned();
    let total = ledger.append(ChangeRecord {
        category: args.category,
        file: args.file.clone(),
        change_type: args.change_type.clone(),
        description: args.description.clone(),
        before: non_empty(&args.before),
        after: non_empty(&args.after),
        timestamp: Local::now(),
    });
    ToolResult::ok(ToolOutput::Logged {
        logged: true,
        total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::ChangeCategory;

    #[test]
    fn test_log_change_reports_running_total() {
        let mut ledger = ChangeLedger::new();
        let args = LogChangeArgs {
            category: ChangeCategory::Dependency,
            file: "pom.xml".into(),
            change_type: "Surefire 3.2.5".into(),
            description: "upgrade surefire".into(),
            before: Some("".into()),
            after: Some("<version>3.2.5</version>".into()),
        };
        let first = log_change(&args, &mut ledger);
        let second = log_change(&args, &mut ledger);
        assert_eq!(first.output, ToolOutput::Logged { logged: true, total: 1 });
        assert_eq!(second.output, ToolOutput::Logged { logged: true, total: 2 });
        assert_eq!(ledger.records()[0].before, None);
        assert_eq!(ledger.records()[0].after.as_deref(), Some("<version>3.2.5</version>"));
    }
}
