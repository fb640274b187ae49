//! Shell 执行：同步等待、限时、截断输出
//!
//! 通过 sh -c / cmd /C 执行；stdout 截断到 stdout_limit 字符、stderr 截断到 stderr_limit 字符；
//! 超时后终止整个进程组并返回 success=false、returncode=-1，调用方总能观察到超时结果。
//! 命令内容本身不做白名单校验，只做时间与体积上的约束。

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::config::ToolsSection;
use crate::tools::registry::{RunShellArgs, ToolOutput, ToolResult};
use crate::tools::truncate_chars;

pub async fn run_shell(args: &RunShellArgs, limits: &ToolsSection) -> ToolResult {
    let timeout_secs = args.timeout.unwrap_or(limits.shell_timeout_secs);
    tracing::info!(command = %args.command, timeout_secs, "shell tool execute");

    let mut cmd = if cfg!(target_os = "windows") {
        let mut c = Command::new("cmd");
        c.args(["/C", &args.command]);
        c
    } else {
        let mut c = Command::new("sh");
        c.args(["-c", &args.command]);
        c
    };
    if let Some(dir) = &args.working_dir {
        cmd.current_dir(dir);
    }
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    #[cfg(unix)]
    cmd.process_group(0);

    let child = match cmd.spawn() {
        Ok(c) => c,
        Err(e) => return shell_failure(format!("Execution failed: {}", e)),
    };
    let pid = child.id();

    match tokio::time::timeout(Duration::from_secs(timeout_secs), child.wait_with_output()).await {
        Ok(Ok(output)) => {
            let returncode = output.status.code().unwrap_or(-1);
            let stdout = String::from_utf8_lossy(&output.stdout);
            let stderr = String::from_utf8_lossy(&output.stderr);
            let out = ToolOutput::Shell {
                stdout: truncate_chars(&stdout, limits.stdout_limit),
                stderr: truncate_chars(&stderr, limits.stderr_limit),
                returncode,
            };
            if returncode == 0 {
                ToolResult::ok(out)
            } else {
                ToolResult::failed(out)
            }
        }
        Ok(Err(e)) => shell_failure(format!("Execution failed: {}", e)),
        Err(_) => {
            kill_process_group(pid);
            tracing::warn!(command = %args.command, timeout_secs, "shell command timed out");
            shell_failure(format!("Timed out after {}s", timeout_secs))
        }
    }
}

fn shell_failure(stderr: String) -> ToolResult {
    ToolResult::failed(ToolOutput::Shell {
        stdout: String::new(),
        stderr,
        returncode: -1,
    })
}

/// 子进程本身由 kill_on_drop 终止；这里再清理它派生出的同组进程
#[cfg(unix)]
fn kill_process_group(pid: Option<u32>) {
    if let Some(pid) = pid {
        let _ = std::process::Command::new("kill")
            .args(["-KILL", &format!("-{}", pid)])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: Option<u32>) {}
