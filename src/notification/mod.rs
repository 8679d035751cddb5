//! 通知模块
//!
//! 提供通知后端抽象、邮件/Slack实现、消息模板和每周期一次的通知分发

pub mod dispatcher;
pub mod email;
pub mod registry;
pub mod sender;
pub mod slack;
pub mod template;

// 重新导出主要类型
pub use dispatcher::{dispatch, DispatchOutcome};
pub use email::{EmailNotifier, MailTransport, SmtpMailTransport};
pub use registry::{NotifierFactory, NotifierRegistry};
pub use sender::NotifierBackend;
pub use slack::SlackNotifier;
pub use template::ReportTemplate;
