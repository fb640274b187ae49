//! clone_repository：克隆仓库并在结构化结果中显式返回检出目录
//!
//! 目标目录默认 `<clone_root>/<仓库名>`；若目标下已有 .git 则视为已克隆，直接成功返回。

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::tools::registry::{CloneRepositoryArgs, ToolOutput, ToolResult};
use crate::tools::truncate_chars;

/// 从 URL 推出仓库目录名：取最后一段并去掉 .git 后缀
pub fn repo_name(url: &str) -> String {
    let name = url
        .trim_end_matches('/')
        .rsplit(['/', ':'])
        .next()
        .unwrap_or("")
        .trim_end_matches(".git");
    if name.is_empty() {
        "repository".to_string()
    } else {
        name.to_string()
    }
}

pub async fn clone_repository(
    args: &CloneRepositoryArgs,
    clone_root: &Path,
    timeout_secs: u64,
    stderr_limit: usize,
) -> ToolResult {
    let destination = args
        .destination
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(|| clone_root.join(repo_name(&args.url)));
    let directory = destination.display().to_string();
    tracing::info!(url = %args.url, directory = %directory, "clone_repository tool execute");

    if destination.join(".git").is_dir() {
        return ToolResult::ok(ToolOutput::Cloned {
            directory,
            already_present: true,
        });
    }

    let mut cmd = Command::new("git");
    cmd.arg("clone")
        .arg(&args.url)
        .arg(&destination)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let failure = |stderr: String, returncode: i32| {
        ToolResult::failed(ToolOutput::Shell {
            stdout: String::new(),
            stderr,
            returncode,
        })
    };

    match tokio::time::timeout(Duration::from_secs(timeout_secs), cmd.output()).await {
        Ok(Ok(output)) if output.status.success() => ToolResult::ok(ToolOutput::Cloned {
            directory,
            already_present: false,
        }),
        Ok(Ok(output)) => failure(
            truncate_chars(&String::from_utf8_lossy(&output.stderr), stderr_limit),
            output.status.code().unwrap_or(-1),
        ),
        Ok(Err(e)) => failure(format!("Execution failed: {}", e), -1),
        Err(_) => failure(format!("Timed out after {}s", timeout_secs), -1),
    }
}
