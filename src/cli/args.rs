//! 命令行参数定义
//!
//! 使用clap定义应用程序的命令行接口

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Endpoint Vitals - HTTP端点健康检测工具
#[derive(Parser, Debug, Clone)]
#[command(
    name = "endpoint-vitals",
    version = crate::VERSION,
    about = crate::APP_DESCRIPTION,
    long_about = None
)]
pub struct Args {
    /// 配置文件路径
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "配置文件路径",
        env = "ENDPOINT_VITALS_CONFIG",
        global = true
    )]
    pub config: Option<PathBuf>,

    /// 日志级别（覆盖配置文件）
    #[arg(
        short,
        long,
        value_enum,
        help = "日志级别",
        env = "ENDPOINT_VITALS_LOG_LEVEL",
        global = true
    )]
    pub log_level: Option<LogLevel>,

    /// 日志文件（覆盖配置文件）
    #[arg(long, value_name = "FILE", help = "日志文件路径", global = true)]
    pub log_file: Option<PathBuf>,

    /// 通知服务（覆盖配置文件）
    #[arg(
        short,
        long,
        value_name = "NAME",
        help = "通知服务 (email, slack)",
        env = "ENDPOINT_VITALS_NOTIFY",
        global = true
    )]
    pub notify: Option<String>,

    /// 请求超时（秒，覆盖配置文件）
    #[arg(long, value_name = "SECONDS", help = "请求超时时间（秒）", global = true)]
    pub timeout: Option<u64>,

    /// 最大并发检测数（覆盖配置文件）
    #[arg(
        long,
        value_name = "COUNT",
        help = "最大并发检测数",
        env = "ENDPOINT_VITALS_MAX_CONCURRENT",
        global = true
    )]
    pub max_concurrent: Option<usize>,

    /// 子命令
    #[command(subcommand)]
    pub command: Commands,
}

/// 日志级别枚举
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum LogLevel {
    /// 调试级别
    Debug,
    /// 信息级别
    Info,
    /// 警告级别
    Warn,
    /// 错误级别
    Error,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// 子命令定义
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// 执行一个检测周期
    Run {
        /// 只调用通知后端的模拟发送
        #[arg(short, long, help = "模拟发送通知")]
        mock: bool,
    },

    /// 生成默认配置文件
    Init {
        /// 配置文件路径
        #[arg(
            value_name = "FILE",
            help = "配置文件路径",
            default_value = "config.toml"
        )]
        config_path: PathBuf,

        /// 是否覆盖现有文件
        #[arg(short, long, help = "覆盖现有文件")]
        force: bool,
    },

    /// 验证配置文件
    Validate {
        /// 配置文件路径
        #[arg(value_name = "FILE", help = "配置文件路径")]
        config_path: Option<PathBuf>,
    },

    /// 测试通知后端配置
    TestNotification,
}

impl Args {
    /// 获取配置文件路径
    pub fn get_config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(crate::config::get_default_config_path)
    }

    /// 将命令行覆盖项应用到配置
    pub fn apply_overrides(&self, config: &mut crate::config::Config) {
        if let Some(level) = self.log_level {
            config.log_level = level.to_string();
        }
        if let Some(ref log_file) = self.log_file {
            config.log_file = Some(log_file.clone());
        }
        if let Some(ref notify) = self.notify {
            config.notify_service = notify.clone();
        }
        if let Some(timeout) = self.timeout {
            config.timeout_seconds = timeout;
        }
        if let Some(max_concurrent) = self.max_concurrent {
            config.max_concurrent_checks = max_concurrent;
        }
    }
}
