//! Endpoint Vitals 主程序入口
//!
//! HTTP端点健康检测工具

use anyhow::{Context, Result};
use clap::Parser;
use endpoint_vitals::cli::{command_for, Args, Commands};
use endpoint_vitals::config::TomlConfigLoader;
use endpoint_vitals::logging::{LogConfig, LoggingSystem};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // 解析命令行参数
    let args = Args::parse();

    // 初始化日志系统
    let log_config = resolve_log_config(&args).await?;
    let _logging_system = LoggingSystem::setup_logging(log_config).context("初始化日志系统失败")?;

    info!("Endpoint Vitals v{} 启动", endpoint_vitals::VERSION);

    // 执行命令
    let command = command_for(&args);
    if let Err(e) = command.execute(&args).await {
        error!("命令执行失败: {}", e);
        eprintln!("错误: {e}");
        std::process::exit(1);
    }

    Ok(())
}

/// 确定日志配置
///
/// 命令行参数优先，其次是配置文件中的 `log_level` / `log_file`。
/// 配置文件在这里读取失败不报错，由命令自身加载时报告。
async fn resolve_log_config(args: &Args) -> Result<LogConfig> {
    let mut level = "info".to_string();
    let mut log_file = None;

    if !matches!(args.command, Commands::Init { .. }) {
        let path = match &args.command {
            Commands::Validate {
                config_path: Some(path),
            } => path.clone(),
            _ => args.get_config_path(),
        };
        if let Ok(config) = TomlConfigLoader::new(true).read_file(&path).await {
            level = config.log_level;
            log_file = config.log_file;
        }
    }

    if let Some(cli_level) = args.log_level {
        level = cli_level.to_string();
    }
    if let Some(ref cli_file) = args.log_file {
        log_file = Some(cli_file.clone());
    }

    LogConfig::from_settings(&level, log_file)
}
