//! Migrator - Java 11 → 21 迁移智能体
//!
//! 入口：检查凭据、初始化日志与配置、安装中断处理，跑一次迁移并打印摘要。

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use migrator::agent::{create_model_client, run_migration};
use migrator::config::{load_config, AppConfig, API_KEY_ENV};
use migrator::core::ShutdownManager;

#[derive(Parser)]
#[command(name = "migrator")]
#[command(version, about = "Migrate a Java 11 repository to Java 21 with a tool-using model agent")]
struct Cli {
    /// Repository URL (or local checkout path) to migrate
    repo: Option<String>,

    /// Extra config file layered over config/default.toml
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let Some(repo) = cli.repo else {
        Cli::command().print_help()?;
        println!();
        return Ok(ExitCode::SUCCESS);
    };

    let api_key = match std::env::var(API_KEY_ENV) {
        Ok(key) if !key.trim().is_empty() => key,
        _ => {
            eprintln!("{} is not set.", API_KEY_ENV);
            eprintln!("Get a key at https://aistudio.google.com/apikey, then:");
            eprintln!("  export {}=YOUR-KEY", API_KEY_ENV);
            return Ok(ExitCode::from(1));
        }
    };

    migrator::observability::init();

    let config = load_config(cli.config).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "config load failed, using defaults");
        AppConfig::default()
    });

    let client = create_model_client(&config, &api_key).context("Failed to build model client")?;

    let shutdown = ShutdownManager::new();
    shutdown.install_signal_handlers();

    println!("Repository: {}", repo);
    println!("Migration:  Java 11 → Java 21");
    println!("Model:      {}", client.model());
    println!();

    let run = run_migration(&client, &config, &repo, shutdown.token())
        .await
        .context("Migration run failed")?;

    println!();
    if let Some(reason) = shutdown.reason() {
        tracing::warn!(?reason, outcome = run.outcome.status(), "run stopped early");
        println!("Stopped: {}", reason.describe());
    }
    for line in &run.summary {
        println!("{}", line);
    }

    Ok(ExitCode::SUCCESS)
}
