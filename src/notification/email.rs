//! 邮件通知后端
//!
//! 将周期快照渲染为HTML报告并通过SMTP发送

use crate::config::EmailSettings;
use crate::error::{ConfigError, NotificationError};
use crate::health::CycleSnapshot;
use crate::notification::sender::NotifierBackend;
use crate::notification::template::ReportTemplate;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Mailbox, Message};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use std::sync::Arc;
use tracing::{debug, info};

/// SMTPS（隐式TLS）端口
const SMTPS_PORT: u16 = 465;

/// 邮件投递trait，隔离SMTP连接细节
#[async_trait]
pub trait MailTransport: Send + Sync + std::fmt::Debug {
    /// 投递一封已构建好的邮件
    async fn deliver(&self, message: Message) -> Result<(), NotificationError>;
}

/// 基于 lettre 的SMTP投递实现
pub struct SmtpMailTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    server: String,
    port: u16,
}

impl std::fmt::Debug for SmtpMailTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpMailTransport")
            .field("server", &self.server)
            .field("port", &self.port)
            .finish()
    }
}

impl SmtpMailTransport {
    /// 根据邮件配置创建SMTP连接器
    ///
    /// 465端口使用隐式TLS，其他端口在服务器支持时升级为STARTTLS。
    /// 仅在启用认证时携带凭据。
    pub fn new(settings: &EmailSettings) -> Result<Self, ConfigError> {
        let tls_parameters = TlsParameters::new(settings.smtp_server.clone())
            .map_err(|e| ConfigError::ValidationError(format!("SMTP TLS参数无效: {e}")))?;
        let tls = if settings.smtp_port == SMTPS_PORT {
            Tls::Wrapper(tls_parameters)
        } else {
            Tls::Opportunistic(tls_parameters)
        };

        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(settings.smtp_server.as_str())
                .port(settings.smtp_port)
                .tls(tls);

        if settings.use_auth {
            let user = settings.auth_user.clone().unwrap_or_default();
            let pass = settings.auth_pass.clone().unwrap_or_default();
            builder = builder.credentials(Credentials::new(user, pass));
        }

        Ok(Self {
            transport: builder.build(),
            server: settings.smtp_server.clone(),
            port: settings.smtp_port,
        })
    }
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn deliver(&self, message: Message) -> Result<(), NotificationError> {
        debug!("连接SMTP服务器 {}:{}", self.server, self.port);
        self.transport
            .send(message)
            .await
            .map(|_| ())
            .map_err(|e| NotificationError::SendError(format!("could not send email: {e}")))
    }
}

/// 邮件通知后端
pub struct EmailNotifier {
    settings: EmailSettings,
    template: ReportTemplate,
    transport: Arc<dyn MailTransport>,
}

impl std::fmt::Debug for EmailNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailNotifier")
            .field("to", &self.settings.to)
            .field("smtp_server", &self.settings.smtp_server)
            .field("smtp_port", &self.settings.smtp_port)
            .field("use_auth", &self.settings.use_auth)
            .field("transport", &self.transport)
            .finish()
    }
}

impl EmailNotifier {
    /// 根据配置创建邮件通知后端，使用真实SMTP投递
    pub fn configure(settings: &EmailSettings) -> Result<Self, ConfigError> {
        let settings = Self::normalize(settings)?;
        let transport = Arc::new(SmtpMailTransport::new(&settings)?);
        Self::build(settings, transport)
    }

    /// 根据配置创建邮件通知后端，使用指定的投递实现
    pub fn with_transport(
        settings: &EmailSettings,
        transport: Arc<dyn MailTransport>,
    ) -> Result<Self, ConfigError> {
        let settings = Self::normalize(settings)?;
        Self::build(settings, transport)
    }

    fn build(settings: EmailSettings, transport: Arc<dyn MailTransport>) -> Result<Self, ConfigError> {
        let template = ReportTemplate::new()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

        debug!("email config successfully initialized");
        Ok(Self {
            settings,
            template,
            transport,
        })
    }

    /// 校验并补全邮件配置
    ///
    /// 收件人不能为空；启用认证时缺省用户回落为发件人地址，缺少密码视为致命错误。
    pub fn normalize(settings: &EmailSettings) -> Result<EmailSettings, ConfigError> {
        let mut settings = settings.clone();

        settings.to.retain(|to| !to.trim().is_empty());
        settings.cc.retain(|cc| !cc.trim().is_empty());
        settings.bcc.retain(|bcc| !bcc.trim().is_empty());

        if settings.to.is_empty() {
            return Err(ConfigError::ValidationError(
                "email TO field not defined".to_string(),
            ));
        }

        if settings.use_auth {
            if settings.auth_user.as_deref().is_none_or(|user| user.is_empty()) {
                settings.auth_user = Some(settings.from.clone());
            }

            if settings.auth_pass.as_deref().is_none_or(|pass| pass.is_empty()) {
                return Err(ConfigError::ValidationError(
                    "smtp auth password not provided".to_string(),
                ));
            }
        }

        Ok(settings)
    }

    /// 当前生效的邮件配置
    pub fn settings(&self) -> &EmailSettings {
        &self.settings
    }

    /// 构建通知邮件
    pub fn build_message(&self, snapshot: &CycleSnapshot) -> Result<Message, NotificationError> {
        let body = match self.settings.body.as_deref() {
            Some(body) if !body.is_empty() => body.to_string(),
            _ => self.template.render(snapshot)?,
        };

        let mut builder = Message::builder()
            .from(parse_mailbox(&self.settings.from)?)
            .subject(self.settings.subject.clone())
            .header(ContentType::TEXT_HTML);

        for to in &self.settings.to {
            builder = builder.to(parse_mailbox(to)?);
        }
        for cc in &self.settings.cc {
            builder = builder.cc(parse_mailbox(cc)?);
        }
        for bcc in &self.settings.bcc {
            builder = builder.bcc(parse_mailbox(bcc)?);
        }

        builder
            .body(body)
            .map_err(|e| NotificationError::MessageError(e.to_string()))
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, NotificationError> {
    address
        .trim()
        .parse::<Mailbox>()
        .map_err(|e| NotificationError::MessageError(format!("无效的邮件地址 {address}: {e}")))
}

#[async_trait]
impl NotifierBackend for EmailNotifier {
    fn type_name(&self) -> &'static str {
        "email"
    }

    async fn send(&self, snapshot: &CycleSnapshot) -> Result<(), NotificationError> {
        debug!("构建通知邮件，周期 {}", snapshot.id);
        let message = self.build_message(snapshot)?;
        self.transport.deliver(message).await?;
        info!("email notification successfully sent");
        Ok(())
    }

    async fn send_mockup(&self) -> Result<(), NotificationError> {
        info!(to = ?self.settings.to, "Sending...");
        Ok(())
    }
}
