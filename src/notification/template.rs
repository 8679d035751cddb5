//! 消息模板模块
//!
//! 使用 Handlebars 将周期快照渲染为HTML报告

use crate::error::NotificationError;
use crate::health::CycleSnapshot;
use handlebars::Handlebars;
use serde::Serialize;

/// 报告中响应体摘录的最大字符数
pub const BODY_EXCERPT_CHARS: usize = 1024;

const REPORT_TEMPLATE_NAME: &str = "report";

/// 默认的HTML报告模板
pub const DEFAULT_REPORT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<body>
<h2>Endpoint health report</h2>
<p>Cycle {{cycle_id}} started at {{started_at}}: {{unhealthy}} of {{total}} endpoint(s) NOT-HEALTHY.</p>
<table border="1" cellpadding="4" cellspacing="0">
<tr><th>Endpoint</th><th>Health</th><th>HTTP</th><th>Time</th><th>Result</th></tr>
{{#each rows}}
<tr>
<td>{{url}}</td>
<td>{{#if healthy}}<b style="color:green">HEALTHY</b>{{else}}<b style="color:red">NOT-HEALTHY</b>{{/if}}</td>
<td>{{#if status_code}}{{status_code}}{{else}}N/A{{/if}}</td>
<td>{{response_time_ms}}ms</td>
<td>{{#if error}}<i>{{error}}</i>{{else}}<pre>{{body}}</pre>{{/if}}</td>
</tr>
{{/each}}
</table>
</body>
</html>
"#;

/// 模板上下文中的一行
#[derive(Debug, Clone, Serialize)]
pub struct ReportRow {
    pub url: String,
    pub healthy: bool,
    pub status_code: Option<u16>,
    pub response_time_ms: u64,
    pub error: Option<String>,
    pub body: String,
}

/// 模板上下文数据
#[derive(Debug, Clone, Serialize)]
pub struct ReportContext {
    pub cycle_id: String,
    pub started_at: String,
    pub total: usize,
    pub unhealthy: usize,
    pub rows: Vec<ReportRow>,
}

impl ReportContext {
    /// 从快照构建模板上下文
    pub fn from_snapshot(snapshot: &CycleSnapshot) -> Self {
        let rows = snapshot
            .entries()
            .map(|(status, result)| ReportRow {
                url: status.url.clone(),
                healthy: status.healthy,
                status_code: result.and_then(|r| r.status_code),
                response_time_ms: result.map(|r| r.response_time_ms()).unwrap_or(0),
                error: result.and_then(|r| r.error.as_ref().map(|e| e.to_string())),
                body: result
                    .map(|r| excerpt(&r.body, BODY_EXCERPT_CHARS))
                    .unwrap_or_default(),
            })
            .collect();

        Self {
            cycle_id: snapshot.id.to_string(),
            started_at: snapshot.started_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            total: snapshot.statuses.len(),
            unhealthy: snapshot.unhealthy_count(),
            rows,
        }
    }
}

/// 截取前 `max_chars` 个字符，超出部分以省略号结尾
pub fn excerpt(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => format!("{}…", &text[..byte_index]),
        None => text.to_string(),
    }
}

/// HTML报告渲染器
pub struct ReportTemplate {
    registry: Handlebars<'static>,
}

impl std::fmt::Debug for ReportTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportTemplate").finish_non_exhaustive()
    }
}

impl ReportTemplate {
    /// 使用默认模板创建渲染器
    pub fn new() -> Result<Self, NotificationError> {
        Self::with_template(DEFAULT_REPORT_TEMPLATE)
    }

    /// 使用自定义模板创建渲染器
    pub fn with_template(template: &str) -> Result<Self, NotificationError> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(false);
        registry
            .register_template_string(REPORT_TEMPLATE_NAME, template)
            .map_err(|e| NotificationError::TemplateError(e.to_string()))?;
        Ok(Self { registry })
    }

    /// 渲染快照
    pub fn render(&self, snapshot: &CycleSnapshot) -> Result<String, NotificationError> {
        let context = ReportContext::from_snapshot(snapshot);
        self.registry
            .render(REPORT_TEMPLATE_NAME, &context)
            .map_err(|e| NotificationError::TemplateError(e.to_string()))
    }
}
