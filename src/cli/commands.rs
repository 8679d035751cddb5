//! 命令处理逻辑
//!
//! 实现各种CLI命令的处理逻辑

use crate::cli::args::{Args, Commands};
use crate::config::{write_default_config, Config, ConfigLoader, TomlConfigLoader};
use crate::error::Result;
use crate::monitor::{CycleReport, MonitorRegistry};
use crate::notification::{DispatchOutcome, NotifierRegistry};
use async_trait::async_trait;
use std::path::Path;
use tracing::info;

/// 命令处理器trait
#[async_trait]
pub trait Command: Send + Sync {
    /// 执行命令
    async fn execute(&self, args: &Args) -> Result<()>;
}

/// 按命令行参数选择命令处理器
pub fn command_for(args: &Args) -> Box<dyn Command> {
    match &args.command {
        Commands::Run { .. } => Box::new(RunCommand),
        Commands::Init { .. } => Box::new(InitCommand),
        Commands::Validate { .. } => Box::new(ValidateCommand),
        Commands::TestNotification => Box::new(TestNotificationCommand),
    }
}

/// 加载配置文件，应用命令行覆盖后再验证
///
/// 验证在任何网络请求之前完成，失败即为致命错误。
pub async fn load_config(args: &Args, path: &Path) -> Result<Config> {
    let loader = TomlConfigLoader::new(true);
    let mut config = loader.read_file(path).await?;
    args.apply_overrides(&mut config);
    loader.validate(&config)?;

    info!(
        "配置加载完成: {}，端点数量: {}，通知服务: {}",
        path.display(),
        config.monitored_services.http.len(),
        config.notify_service
    );
    Ok(config)
}

/// 执行一个检测周期
pub struct RunCommand;

#[async_trait]
impl Command for RunCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        let mock = matches!(args.command, Commands::Run { mock: true });
        let report = self.run_once(args, mock).await?;

        println!("{}", summarize(&report));
        Ok(())
    }
}

impl RunCommand {
    /// 加载配置、构造通知后端和监控器，执行一个周期
    pub async fn run_once(&self, args: &Args, mock: bool) -> Result<CycleReport> {
        let config = load_config(args, &args.get_config_path()).await?;

        let notifier = NotifierRegistry::with_builtin()
            .configure(&config.notify_service, &config.notification_services)?;
        let monitor = MonitorRegistry::with_builtin().build(&config)?;

        info!(
            monitor = monitor.kind(),
            notifier = notifier.type_name(),
            interval_seconds = config.interval_seconds,
            "开始执行检测"
        );

        Ok(monitor.run_cycle(notifier.as_ref(), mock).await)
    }
}

/// 周期结果的文本摘要
fn summarize(report: &CycleReport) -> String {
    let mut lines: Vec<String> = report
        .snapshot
        .statuses
        .iter()
        .map(|status| {
            let icon = if status.healthy { "✓" } else { "✗" };
            format!("{icon} {status}")
        })
        .collect();

    lines.push(match &report.outcome {
        DispatchOutcome::AllHealthy => "全部端点健康，未发送通知".to_string(),
        DispatchOutcome::Sent { url } => format!("已发送通知 ({url})"),
        DispatchOutcome::Mocked { url } => format!("已模拟发送通知 ({url})"),
        DispatchOutcome::Failed { url, error } => format!("通知发送失败 ({url}): {error}"),
    });
    lines.join("\n")
}

/// 初始化命令
pub struct InitCommand;

#[async_trait]
impl Command for InitCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        if let Commands::Init { config_path, force } = &args.command {
            write_default_config(config_path, *force).await?;
            println!("配置文件已创建: {}", config_path.display());
            println!("请编辑配置文件以添加您的端点和通知配置");
        }
        Ok(())
    }
}

/// 验证命令
pub struct ValidateCommand;

#[async_trait]
impl Command for ValidateCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        if let Commands::Validate { config_path } = &args.command {
            let config_file = config_path
                .clone()
                .unwrap_or_else(|| args.get_config_path());

            self.validate_config_file(args, &config_file).await
        } else {
            Ok(())
        }
    }
}

impl ValidateCommand {
    /// 验证配置文件，并确认通知后端和监控器可以构造
    async fn validate_config_file(&self, args: &Args, config_path: &Path) -> Result<()> {
        println!("验证配置文件: {}", config_path.display());

        let config = load_config(args, config_path).await?;
        let notifier = NotifierRegistry::with_builtin()
            .configure(&config.notify_service, &config.notification_services)?;
        let monitor = MonitorRegistry::with_builtin().build(&config)?;

        println!("✓ 配置文件验证通过");
        println!("✓ 监控类型: {}", monitor.kind());
        println!("✓ 通知服务: {}", notifier.type_name());
        println!("✓ 检测间隔: {}秒", config.interval_seconds);
        println!("✓ 请求超时: {}秒", config.timeout_seconds);
        println!("✓ 找到 {} 个端点:", monitor.endpoints().len());
        for (i, endpoint) in monitor.endpoints().iter().enumerate() {
            println!(
                "  {}. {} (期望: {:?})",
                i + 1,
                endpoint.url,
                endpoint.expected_substring
            );
        }

        Ok(())
    }
}

/// 测试通知命令
pub struct TestNotificationCommand;

#[async_trait]
impl Command for TestNotificationCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        let config = load_config(args, &args.get_config_path()).await?;
        let notifier = NotifierRegistry::with_builtin()
            .configure(&config.notify_service, &config.notification_services)?;

        println!("测试 {} 通知后端...", notifier.type_name());
        notifier.send_mockup().await?;
        println!("✓ 通知后端配置正常");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, VitalsError};
    use clap::Parser;
    use tempfile::TempDir;

    fn args(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[tokio::test]
    async fn test_init_then_validate() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vitals").join("config.toml");
        let path_str = path.to_str().unwrap();

        let init = args(&["endpoint-vitals", "init", path_str]);
        command_for(&init).execute(&init).await.unwrap();
        assert!(path.exists());

        let validate = args(&["endpoint-vitals", "validate", path_str]);
        command_for(&validate).execute(&validate).await.unwrap();
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "# keep").unwrap();
        let path_str = path.to_str().unwrap();

        let init = args(&["endpoint-vitals", "init", path_str]);
        let err = command_for(&init).execute(&init).await.unwrap_err();
        assert!(matches!(err, VitalsError::Config(ConfigError::FileExists { .. })));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# keep");

        let forced = args(&["endpoint-vitals", "init", path_str, "--force"]);
        command_for(&forced).execute(&forced).await.unwrap();
        assert_ne!(std::fs::read_to_string(&path).unwrap(), "# keep");
    }

    #[tokio::test]
    async fn test_unknown_notifier_fails_validation() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        write_default_config(&path, false).await.unwrap();
        let path_str = path.to_str().unwrap();

        let validate = args(&["endpoint-vitals", "--notify", "pager", "validate", path_str]);
        let err = command_for(&validate).execute(&validate).await.unwrap_err();
        assert!(matches!(
            err,
            VitalsError::Config(ConfigError::UnknownNotifier { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_config_file() {
        let run = args(&["endpoint-vitals", "-c", "/nonexistent/vitals.toml", "run"]);
        let err = command_for(&run).execute(&run).await.unwrap_err();
        assert!(matches!(err, VitalsError::Config(ConfigError::FileNotFound { .. })));
    }

    #[tokio::test]
    async fn test_mock_run_against_live_server() {
        let mut server = mockito::Server::new_async().await;
        let _down = server
            .mock("GET", "/health")
            .with_body("maintenance")
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            format!(
                r#"
notify_service = "slack"

[[monitored_services.http]]
endpoint = "{}/health"
expected_response = "OK"

[notification_services.slack]
webhook = "https://hooks.slack.com/services/T/B/X"
"#,
                server.url()
            ),
        )
        .unwrap();

        let run = args(&["endpoint-vitals", "-c", path.to_str().unwrap(), "run", "--mock"]);
        let report = RunCommand.run_once(&run, true).await.unwrap();

        assert_eq!(report.snapshot.unhealthy_count(), 1);
        assert!(matches!(report.outcome, DispatchOutcome::Mocked { .. }));
        assert!(summarize(&report).contains("NOT-HEALTHY"));
    }
}
