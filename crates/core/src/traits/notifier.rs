use async_trait::async_trait;

/// 邮件通知网关
///
/// 每次调用只尝试一次投递，投递失败返回 `false` 而不是错误，
/// 重试由调度层负责。具体实现（SMTP、第三方API等）由外部协作方提供。
#[async_trait]
pub trait EmailNotifier: Send + Sync {
    /// 发送一封邮件，`is_html` 为真时正文按 HTML 渲染
    async fn send_email(&self, to: &str, subject: &str, body: &str, is_html: bool) -> bool;
}

/// 短信通知网关
///
/// 投递语义与 [`EmailNotifier`] 一致：单次尝试，失败返回 `false`。
#[async_trait]
pub trait SmsNotifier: Send + Sync {
    /// 发送一条短信
    async fn send_sms(&self, to: &str, body: &str) -> bool;
}
