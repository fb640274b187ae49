//! 提示词：迁移指令文档、种子消息与续接消息
//!
//! 指令文档默认内置（编译期 include_str!），可由配置 `app.instructions_path` 指向外部文件覆盖。

use std::path::Path;

use crate::core::AgentError;

/// 内置迁移指令文档
pub const MIGRATION_INSTRUCTIONS: &str = include_str!("../config/prompts/migration.md");

/// 服务错误或限流后的续接消息
pub const CONTINUE_AFTER_ERROR: &str = "Please continue the migration from where you left off.";

/// 空回复后的续接消息
pub const CONTINUE_AFTER_EMPTY: &str =
    "Please continue the migration. Focus on making mvn test pass.";

/// 种子 user 轮：指明仓库并概述四个迁移方面
pub fn seed_message(repo: &str) -> String {
    format!(
        "Please fully migrate this Java 11 repository to Java 21: {repo}\n\n\
         Cover all four areas:\n\
         \x20 A) Build config: update the Java version in pom.xml/build.gradle, validate after each edit\n\
         \x20 B) Modernize Java code: records, text blocks, pattern matching, switch expressions\n\
         \x20 C) Upgrade dependencies: surefire, compiler plugin, lombok, mockito\n\
         \x20 D) Spring Boot 2 to 3: if detected, move javax to jakarta and bump the Boot version\n\n\
         Run the tests after all changes, fix any failures and log every change.\n\
         Start by cloning the repository with clone_repository."
    )
}

/// 读取指令文档；未配置覆盖路径时返回内置版本
pub fn load_instructions(path: Option<&Path>) -> Result<String, AgentError> {
    match path {
        Some(p) => std::fs::read_to_string(p).map_err(|source| AgentError::InstructionsUnreadable {
            path: p.to_path_buf(),
            source,
        }),
        None => Ok(MIGRATION_INSTRUCTIONS.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_instructions_name_every_category() {
        for wire in ["BUILD_CONFIG", "CODE_MODERNIZATION", "DEPENDENCY", "SPRING_BOOT", "BUG_FIX", "TEST_FIX"] {
            assert!(MIGRATION_INSTRUCTIONS.contains(wire), "missing {}", wire);
        }
    }

    #[test]
    fn test_seed_mentions_repo() {
        let seed = seed_message("https://github.com/acme/app");
        assert!(seed.contains("https://github.com/acme/app"));
        assert!(seed.contains("clone_repository"));
    }

    #[test]
    fn test_load_override_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.md");
        std::fs::write(&path, "Only do area A.").unwrap();
        assert_eq!(load_instructions(Some(&path)).unwrap(), "Only do area A.");

        let missing = dir.path().join("nope.md");
        assert!(matches!(
            load_instructions(Some(&missing)),
            Err(AgentError::InstructionsUnreadable { .. })
        ));
        assert_eq!(load_instructions(None).unwrap(), MIGRATION_INSTRUCTIONS);
    }
}
