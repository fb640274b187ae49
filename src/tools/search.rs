//! 跨文件正则搜索
//!
//! 递归遍历目录（跳过版本控制与构建产物目录），按扩展名过滤文件，逐行正则匹配；
//! 返回最多 search_limit 条 `path:line:text`，以及截断前的全部匹配行数。
//! 文件按行流式读取，非 UTF-8 字节做有损替换（旧代码常见 Latin-1 注释）。

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use regex::Regex;

use crate::config::ToolsSection;
use crate::tools::filesystem::is_excluded;
use crate::tools::registry::{SearchInFilesArgs, ToolOutput, ToolResult};

pub fn search_in_files(args: &SearchInFilesArgs, limits: &ToolsSection) -> Result<ToolResult, String> {
    let re = Regex::new(&args.pattern).map_err(|e| format!("Invalid regex pattern: {}", e))?;
    let extension = args
        .file_extension
        .as_deref()
        .unwrap_or(&limits.default_extension);
    let include = glob::Pattern::new(&format!("*{}", glob::Pattern::escape(extension)))
        .map_err(|e| format!("Invalid file extension: {}", e))?;
    tracing::info!(directory = %args.directory, pattern = %args.pattern, extension, "search_in_files tool execute");

    let root = Path::new(&args.directory);
    if !root.exists() {
        return Err(format!("Directory not found: {}", args.directory));
    }

    let mut matches = Vec::new();
    let mut count = 0usize;

    for entry in walkdir::WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_excluded(e))
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy();
        if !include.matches(&file_name) {
            continue;
        }
        let Ok(file) = File::open(entry.path()) else {
            continue;
        };
        for (idx, raw) in BufReader::new(file).split(b'\n').enumerate() {
            let Ok(raw) = raw else {
                break;
            };
            let line = String::from_utf8_lossy(&raw);
            let line = line.strip_suffix('\r').unwrap_or(&line);
            if re.is_match(line) {
                count += 1;
                if matches.len() < limits.search_limit {
                    matches.push(format!("{}:{}:{}", entry.path().display(), idx + 1, line));
                }
            }
        }
    }

    Ok(ToolResult::ok(ToolOutput::Matches { matches, count }))
}
