//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `MIGRATOR__*` 覆盖（双下划线表示嵌套，如 `MIGRATOR__LLM__MODEL=gemini-2.5-pro`）。
//! API Key 只从环境变量 `GEMINI_API_KEY` 读取，不进入配置文件。

use std::path::PathBuf;

use serde::Deserialize;

/// 模型服务凭据所在的环境变量
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub llm: LlmSection,
    pub tools: ToolsSection,
    pub recovery: RecoverySection,
    pub report: ReportSection,
}

/// [app] 段：迭代上限、克隆根目录、指令文档覆盖路径
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppSection {
    pub max_iterations: usize,
    pub clone_root: PathBuf,
    /// 未设置时使用内置指令文档
    pub instructions_path: Option<PathBuf>,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            max_iterations: 80,
            clone_root: PathBuf::from("/tmp"),
            instructions_path: None,
        }
    }
}

/// [llm] 段：模型、端点、采样温度与请求超时
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub request_timeout_secs: u64,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            temperature: 0.1,
            request_timeout_secs: 300,
        }
    }
}

/// [tools] 段：各工具的时间与体积上限
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToolsSection {
    /// run_shell 未指定 timeout 时的默认值（秒）
    pub shell_timeout_secs: u64,
    pub stdout_limit: usize,
    pub stderr_limit: usize,
    /// read_file 返回内容的最大字符数
    pub read_limit: usize,
    pub list_depth: usize,
    pub list_limit: usize,
    pub search_limit: usize,
    pub default_extension: String,
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            shell_timeout_secs: 300,
            stdout_limit: 8000,
            stderr_limit: 4000,
            read_limit: 6000,
            list_depth: 4,
            list_limit: 300,
            search_limit: 100,
            default_extension: ".java".to_string(),
        }
    }
}

/// [recovery] 段
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RecoverySection {
    /// 限流后等待秒数
    pub rate_limit_backoff_secs: u64,
}

impl Default for RecoverySection {
    fn default() -> Self {
        Self {
            rate_limit_backoff_secs: 30,
        }
    }
}

/// [report] 段：报告文件名与写入失败时的备用路径
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportSection {
    pub file_name: String,
    pub fallback_path: PathBuf,
}

impl Default for ReportSection {
    fn default() -> Self {
        Self {
            file_name: "MIGRATION_REPORT.md".to_string(),
            fallback_path: PathBuf::from("/tmp/MIGRATION_REPORT.md"),
        }
    }
}

/// 从 config 目录加载配置，环境变量 MIGRATOR__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 MIGRATOR__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("MIGRATOR")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}
