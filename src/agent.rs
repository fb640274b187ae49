//! 无头迁移运行时
//!
//! create_agent_components 从配置构建调度器、恢复策略与指令文档；
//! run_migration 对单个仓库跑完整的编排循环，然后渲染并落盘报告。
//! 模型客户端由调用方注入（真实服务或 ScriptedClient）。

use std::path::PathBuf;
use std::time::Duration;

use chrono::Local;
use tokio_util::sync::CancellationToken;

use crate::config::AppConfig;
use crate::core::{AgentError, RecoveryEngine, Session};
use crate::llm::{GeminiClient, ModelClient};
use crate::prompts::{load_instructions, seed_message};
use crate::react::{LoopOutcome, Orchestrator};
use crate::report::{render, save_report, summary_lines, ReportInput};
use crate::tools::ToolDispatcher;

/// 预构建的运行组件：工具调度器、恢复引擎、指令文档
pub struct AgentComponents {
    pub dispatcher: ToolDispatcher,
    pub recovery: RecoveryEngine,
    pub instructions: String,
}

pub fn create_agent_components(config: &AppConfig) -> Result<AgentComponents, AgentError> {
    Ok(AgentComponents {
        dispatcher: ToolDispatcher::new(config.tools.clone(), config.app.clone_root.clone()),
        recovery: RecoveryEngine::new(Duration::from_secs(config.recovery.rate_limit_backoff_secs)),
        instructions: load_instructions(config.app.instructions_path.as_deref())?,
    })
}

/// 由配置与凭据构建真实模型客户端
pub fn create_model_client(config: &AppConfig, api_key: &str) -> Result<GeminiClient, AgentError> {
    Ok(GeminiClient::new(
        &config.llm.base_url,
        &config.llm.model,
        api_key,
        config.llm.request_timeout_secs,
    )?)
}

/// 一次运行的结果
#[derive(Debug)]
pub struct MigrationRun {
    pub outcome: LoopOutcome,
    pub report: String,
    pub report_path: PathBuf,
    pub summary: Vec<String>,
    pub changes: usize,
    pub tests_passed: bool,
}

/// 跑完整次迁移：编排循环 -> 报告渲染 -> 落盘（中断后同样生成报告）
pub async fn run_migration(
    client: &dyn ModelClient,
    config: &AppConfig,
    repo: &str,
    cancel_token: CancellationToken,
) -> Result<MigrationRun, AgentError> {
    let components = create_agent_components(config)?;
    let mut session = Session::new(repo, seed_message(repo));
    tracing::info!(session = %session.id(), repo, "migration started");

    let orchestrator = Orchestrator::new(
        client,
        &components.dispatcher,
        &components.recovery,
        &components.instructions,
    )
    .with_cancel_token(cancel_token)
    .with_temperature(config.llm.temperature)
    .with_max_iterations(config.app.max_iterations);
    let outcome = orchestrator.run(&mut session).await;

    let input = ReportInput {
        source: session.source(),
        ledger: session.ledger(),
        outcome,
        tests_passed: session.tests_passed(),
        generated_at: Local::now(),
    };
    let report = render(&input);
    let report_path = save_report(
        &report,
        session.checkout_dir(),
        &config.report.file_name,
        &config.report.fallback_path,
    )?;
    let summary = summary_lines(&input, Some(&report_path), session.checkout_dir());

    let (prompt, completion, total) = client.token_usage();
    tracing::info!(
        outcome = ?outcome,
        iterations = session.iteration(),
        resets = session.resets(),
        changes = session.ledger().len(),
        prompt_tokens = prompt,
        completion_tokens = completion,
        total_tokens = total,
        report = %report_path.display(),
        "migration finished"
    );

    Ok(MigrationRun {
        outcome,
        changes: session.ledger().len(),
        tests_passed: session.tests_passed(),
        report,
        report_path,
        summary,
    })
}
