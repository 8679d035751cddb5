//! 配置管理模块
//!
//! 提供配置文件解析、验证和默认配置生成功能

pub mod loader;
pub mod types;

// 重新导出主要类型
pub use loader::{get_default_config_path, write_default_config, ConfigLoader, TomlConfigLoader};
pub use types::{
    validate_config, Config, EmailSettings, HttpMonitorConfig, MonitoredServices,
    NotificationServices, SlackSettings,
};
