//! 文件工具：read_file / write_file / list_directory
//!
//! read_file 超过 read_limit 字符时截断并附加说明（含真实总行数）；
//! write_file 覆盖前先把旧内容无损复制到 `<path>.bak`（单一备份槽，后写覆盖先写），并自动创建父目录；
//! list_directory 按深度遍历、跳过版本控制与构建产物目录、按字典序排序后截断。

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::config::ToolsSection;
use crate::tools::registry::{
    ListDirectoryArgs, ReadFileArgs, ToolOutput, ToolResult, WriteFileArgs,
};
use crate::tools::EXCLUDED_DIRS;

pub fn read_file(args: &ReadFileArgs, limits: &ToolsSection) -> Result<ToolResult, String> {
    tracing::info!(path = %args.path, "read_file tool execute");
    let bytes = std::fs::read(&args.path).map_err(|e| format!("Read failed: {}", e))?;
    let content = String::from_utf8_lossy(&bytes);
    let lines = content.lines().count();

    let (content, truncated) = if content.chars().count() > limits.read_limit {
        let head: String = content.chars().take(limits.read_limit).collect();
        (
            format!(
                "{}\n... (truncated, {} total lines, showing first {} chars)",
                head, lines, limits.read_limit
            ),
            true,
        )
    } else {
        (content.into_owned(), false)
    };

    Ok(ToolResult::ok(ToolOutput::FileContent {
        content,
        lines,
        truncated,
    }))
}

/// `<path>.bak`，与原文件同目录
pub fn backup_path(path: &Path) -> PathBuf {
    let mut raw: OsString = path.as_os_str().to_owned();
    raw.push(".bak");
    PathBuf::from(raw)
}

pub fn write_file(args: &WriteFileArgs) -> Result<ToolResult, String> {
    tracing::info!(path = %args.path, bytes = args.content.len(), "write_file tool execute");
    let path = Path::new(&args.path);

    let backup = if path.is_file() {
        let bak = backup_path(path);
        std::fs::copy(path, &bak).map_err(|e| format!("Backup failed: {}", e))?;
        Some(bak.display().to_string())
    } else {
        None
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create parent directory: {}", e))?;
    }
    std::fs::write(path, &args.content).map_err(|e| format!("Failed to write file: {}", e))?;

    Ok(ToolResult::ok(ToolOutput::Written {
        bytes: args.content.len(),
        backup,
    }))
}

pub fn list_directory(args: &ListDirectoryArgs, limits: &ToolsSection) -> Result<ToolResult, String> {
    let depth = args
        .max_depth
        .map(|d| d as usize)
        .unwrap_or(limits.list_depth);
    tracing::info!(path = %args.path, depth, "list_directory tool execute");

    let root = Path::new(&args.path);
    if !root.is_dir() {
        return Err(format!("Directory not found: {}", args.path));
    }

    let mut entries: Vec<String> = walkdir::WalkDir::new(root)
        .max_depth(depth)
        .into_iter()
        .filter_entry(|e| !is_excluded(e))
        .filter_map(|e| e.ok())
        .map(|e| e.path().display().to_string())
        .collect();
    entries.sort();

    let total = entries.len();
    let truncated = total > limits.list_limit;
    entries.truncate(limits.list_limit);

    Ok(ToolResult::ok(ToolOutput::Listing {
        tree: entries.join("\n"),
        entries: total,
        truncated,
    }))
}

/// 根目录本身永不排除
pub(crate) fn is_excluded(entry: &walkdir::DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    EXCLUDED_DIRS.iter().any(|d| *d == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content_of(result: &ToolResult) -> (&str, usize, bool) {
        match &result.output {
            ToolOutput::FileContent {
                content,
                lines,
                truncated,
            } => (content.as_str(), *lines, *truncated),
            other => panic!("Expected FileContent, got {:?}", other),
        }
    }

    #[test]
    fn test_read_small_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("App.java");
        std::fs::write(&path, "class App {}\n").unwrap();
        let args = ReadFileArgs {
            path: path.display().to_string(),
        };
        let result = read_file(&args, &ToolsSection::default()).unwrap();
        let (content, lines, truncated) = content_of(&result);
        assert_eq!(content, "class App {}\n");
        assert_eq!(lines, 1);
        assert!(!truncated);
    }

    #[test]
    fn test_read_large_file_truncated_with_note() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Big.java");
        let line = "x".repeat(99);
        let full_text: String = (0..100).map(|_| format!("{}\n", line)).collect();
        std::fs::write(&path, &full_text).unwrap();

        let args = ReadFileArgs {
            path: path.display().to_string(),
        };
        let result = read_file(&args, &ToolsSection::default()).unwrap();
        let (content, lines, truncated) = content_of(&result);
        assert!(truncated);
        assert_eq!(lines, 100);
        let expected_head: String = full_text.chars().take(6000).collect();
        assert!(content.starts_with(&expected_head));
        assert_eq!(
            &content[expected_head.len()..],
            "\n... (truncated, 100 total lines, showing first 6000 chars)"
        );
    }

    #[test]
    fn test_read_missing_file_is_error() {
        let args = ReadFileArgs {
            path: "/definitely/not/here.java".into(),
        };
        assert!(read_file(&args, &ToolsSection::default()).is_err());
    }

    #[test]
    fn test_write_existing_file_keeps_backup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Foo.java");
        std::fs::write(&path, "A").unwrap();

        let args = WriteFileArgs {
            path: path.display().to_string(),
            content: "record Foo() {}".into(),
        };
        let result = write_file(&args).unwrap();
        assert!(result.success);
        match &result.output {
            ToolOutput::Written { bytes, backup } => {
                assert_eq!(*bytes, 15);
                assert_eq!(backup.as_deref(), Some(backup_path(&path).to_str().unwrap()));
            }
            other => panic!("Expected Written, got {:?}", other),
        }
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "record Foo() {}");
        assert_eq!(std::fs::read_to_string(backup_path(&path)).unwrap(), "A");
    }

    #[test]
    fn test_second_write_overwrites_backup_slot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Foo.java");
        std::fs::write(&path, "v1").unwrap();
        for content in ["v2", "v3"] {
            write_file(&WriteFileArgs {
                path: path.display().to_string(),
                content: content.into(),
            })
            .unwrap();
        }
        assert_eq!(std::fs::read_to_string(backup_path(&path)).unwrap(), "v2");
    }

    #[test]
    fn test_write_creates_parent_dirs_without_backup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("src/main/java/New.java");
        let result = write_file(&WriteFileArgs {
            path: path.display().to_string(),
            content: "record New() {}".into(),
        })
        .unwrap();
        assert!(matches!(result.output, ToolOutput::Written { backup: None, .. }));
        assert!(path.is_file());
        assert!(!backup_path(&path).exists());
    }

    #[test]
    fn test_list_directory_sorted_and_excludes_build_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        for sub in ["src/main", ".git/objects", "target/classes", "build/libs"] {
            std::fs::create_dir_all(root.join(sub)).unwrap();
        }
        std::fs::write(root.join("pom.xml"), "").unwrap();
        std::fs::write(root.join("src/main/App.java"), "").unwrap();
        std::fs::write(root.join("target/classes/App.class"), "").unwrap();

        let args = ListDirectoryArgs {
            path: root.display().to_string(),
            max_depth: None,
        };
        let result = list_directory(&args, &ToolsSection::default()).unwrap();
        let ToolOutput::Listing { tree, truncated, .. } = &result.output else {
            panic!("Expected Listing");
        };
        let lines: Vec<&str> = tree.lines().collect();
        let mut sorted = lines.clone();
        sorted.sort();
        assert_eq!(lines, sorted);
        assert!(!truncated);
        let prefix = root.display().to_string();
        let relative: Vec<&str> = lines
            .iter()
            .map(|l| l.strip_prefix(prefix.as_str()).unwrap_or(*l))
            .collect();
        assert!(relative.iter().any(|l| l.ends_with("App.java")));
        assert!(relative.iter().any(|l| l.ends_with("pom.xml")));
        for excluded in [".git", "target", "build"] {
            assert!(!relative.iter().any(|l| l.contains(excluded)), "{} listed", excluded);
        }
    }

    #[test]
    fn test_list_directory_depth_and_entry_cap() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("a/b/c")).unwrap();
        for i in 0..10 {
            std::fs::write(root.join(format!("f{}.txt", i)), "").unwrap();
        }
        let limits = ToolsSection {
            list_limit: 5,
            ..ToolsSection::default()
        };
        let args = ListDirectoryArgs {
            path: root.display().to_string(),
            max_depth: Some(1),
        };
        let result = list_directory(&args, &limits).unwrap();
        let ToolOutput::Listing { tree, entries, truncated } = &result.output else {
            panic!("Expected Listing");
        };
        assert_eq!(tree.lines().count(), 5);
        // 根目录 + a + 10 个文件
        assert_eq!(*entries, 12);
        assert!(*truncated);
        assert!(!tree.contains("a/b"));
    }
}
