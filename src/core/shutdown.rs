//! 优雅中断
//!
//! 第一次 Ctrl+C / SIGTERM 取消 token 并记录原因；编排循环在每轮开始与退避等待中观察它，
//! 中断后仍会生成报告。第二次信号直接以 130 退出进程（例如卡在长时间的 `mvn test` 上）。

use std::sync::{Arc, OnceLock};

use tokio_util::sync::CancellationToken;

/// 强制退出码（128 + SIGINT）
pub const FORCE_EXIT_CODE: i32 = 130;

#[derive(Clone, Default)]
pub struct ShutdownManager {
    token: CancellationToken,
    reason: Arc<OnceLock<ShutdownReason>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// Ctrl+C
    UserInitiated,
    /// SIGTERM
    Signal,
}

impl ShutdownReason {
    pub fn describe(&self) -> &'static str {
        match self {
            Self::UserInitiated => "interrupted by user (Ctrl+C)",
            Self::Signal => "terminated by SIGTERM",
        }
    }
}

impl ShutdownManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// 交给编排循环的取消 token
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// 记录原因并取消；只保留第一次的原因
    pub fn shutdown(&self, reason: ShutdownReason) {
        let _ = self.reason.set(reason);
        self.token.cancel();
    }

    pub fn reason(&self) -> Option<ShutdownReason> {
        self.reason.get().copied()
    }

    /// 安装 Ctrl+C / SIGTERM 处理
    pub fn install_signal_handlers(&self) {
        let manager = self.clone();
        tokio::spawn(async move {
            #[cfg(unix)]
            let mut sigterm =
                tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()).ok();

            loop {
                #[cfg(unix)]
                let next = next_signal(&mut sigterm).await;
                #[cfg(not(unix))]
                let next = next_signal().await;

                let Some(reason) = next else {
                    return;
                };
                if manager.token.is_cancelled() {
                    tracing::error!(?reason, "second signal received, exiting immediately");
                    std::process::exit(FORCE_EXIT_CODE);
                }
                tracing::warn!(
                    ?reason,
                    "stopping after the current step (signal again to force quit)"
                );
                manager.shutdown(reason);
            }
        });
    }
}

#[cfg(unix)]
async fn next_signal(sigterm: &mut Option<tokio::signal::unix::Signal>) -> Option<ShutdownReason> {
    let terminate = async {
        match sigterm {
            Some(s) => s.recv().await,
            None => std::future::pending::<Option<()>>().await,
        }
    };
    tokio::select! {
        r = tokio::signal::ctrl_c() => r.ok().map(|_| ShutdownReason::UserInitiated),
        r = terminate => r.map(|_| ShutdownReason::Signal),
    }
}

#[cfg(not(unix))]
async fn next_signal() -> Option<ShutdownReason> {
    tokio::signal::ctrl_c()
        .await
        .ok()
        .map(|_| ShutdownReason::UserInitiated)
}
