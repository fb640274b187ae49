//! 可观测性：tracing 订阅器（日志写 stderr，stdout 留给终端摘要）

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// 默认 info，RUST_LOG 可覆盖
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
