//! 进程内置的通知网关实现
//!
//! 真实的SMTP/短信供应商适配器属于外部协作方，这里提供只写日志的
//! 实现，用于本地运行和演练环境。投递永远报告成功。

use async_trait::async_trait;
use tracing::info;

use automation_core::traits::{EmailNotifier, SmsNotifier};

/// 把邮件内容写入日志的网关
pub struct LogEmailGateway;

#[async_trait]
impl EmailNotifier for LogEmailGateway {
    async fn send_email(&self, to: &str, subject: &str, _body: &str, is_html: bool) -> bool {
        info!("发送邮件 -> {} [{}] (html: {})", to, subject, is_html);
        true
    }
}

/// 把短信内容写入日志的网关
pub struct LogSmsGateway;

#[async_trait]
impl SmsNotifier for LogSmsGateway {
    async fn send_sms(&self, to: &str, body: &str) -> bool {
        info!("发送短信 -> {}: {}", to, body);
        true
    }
}
