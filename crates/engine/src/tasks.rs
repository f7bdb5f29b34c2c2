use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use automation_core::{
    traits::{EmailNotifier, SmsNotifier},
    AutomationResult,
};

use crate::context::WorkflowContext;
use crate::templates;

/// 单个任务的执行结果记录
///
/// 输入缺失和投递失败都体现在 `success` 上，不作为错误向上传播；
/// 额外的业务字段放在 `detail` 中。
#[derive(Debug, Clone, Serialize)]
pub struct TaskResult {
    pub success: bool,
    pub task: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "serde_json::Value::is_null")]
    pub detail: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl TaskResult {
    /// 成功结果
    pub fn ok(task: &str, detail: serde_json::Value) -> Self {
        Self {
            success: true,
            task: task.to_string(),
            error: None,
            detail,
            timestamp: Utc::now(),
        }
    }

    /// 带业务字段的失败结果
    pub fn failed(task: &str, detail: serde_json::Value) -> Self {
        Self {
            success: false,
            task: task.to_string(),
            error: None,
            detail,
            timestamp: Utc::now(),
        }
    }

    /// 携带错误描述的失败结果
    pub fn error(task: &str, error: impl Into<String>) -> Self {
        Self {
            success: false,
            task: task.to_string(),
            error: Some(error.into()),
            detail: serde_json::Value::Null,
            timestamp: Utc::now(),
        }
    }
}

/// 工作流任务
///
/// 一个任务是一段无状态的业务自动化逻辑，只通过共享上下文读写数据。
/// `execute` 返回 `Err` 表示未预期错误，由工作流边界捕获转换为失败记录；
/// 可预期的失败（缺数据、投递失败）应返回 `success = false` 的结果。
#[async_trait]
pub trait WorkflowTask: Send + Sync {
    async fn execute(&self, context: &WorkflowContext) -> AutomationResult<TaskResult>;

    fn name(&self) -> &str;
}

/// 发送预约确认邮件
pub struct SendAppointmentConfirmationTask {
    email: Arc<dyn EmailNotifier>,
    practice_name: String,
}

impl SendAppointmentConfirmationTask {
    pub fn new(email: Arc<dyn EmailNotifier>, practice_name: String) -> Self {
        Self {
            email,
            practice_name,
        }
    }
}

#[async_trait]
impl WorkflowTask for SendAppointmentConfirmationTask {
    async fn execute(&self, context: &WorkflowContext) -> AutomationResult<TaskResult> {
        let (Some(customer), Some(appointment)) = (&context.customer, &context.appointment) else {
            return Ok(TaskResult::error(self.name(), "缺少客户或预约数据"));
        };

        let customer = customer.read().await;
        let appointment = appointment.read().await;

        let (subject, body) =
            templates::confirmation_email(&customer, &appointment, &self.practice_name);
        let sent = self
            .email
            .send_email(&customer.email, &subject, &body, true)
            .await;

        let mut result = TaskResult::ok(self.name(), json!({ "email_sent": sent }));
        result.success = sent;
        Ok(result)
    }

    fn name(&self) -> &str {
        "SendAppointmentConfirmation"
    }
}

/// 发送预约提醒
///
/// 邮件始终发送；配置了短信通道时同时发送短信，整体成功要求
/// 两个通道都成功（未配置短信通道视为成功）。
pub struct SendAppointmentReminderTask {
    email: Arc<dyn EmailNotifier>,
    sms: Option<Arc<dyn SmsNotifier>>,
    practice_name: String,
}

impl SendAppointmentReminderTask {
    pub fn new(
        email: Arc<dyn EmailNotifier>,
        sms: Option<Arc<dyn SmsNotifier>>,
        practice_name: String,
    ) -> Self {
        Self {
            email,
            sms,
            practice_name,
        }
    }
}

#[async_trait]
impl WorkflowTask for SendAppointmentReminderTask {
    async fn execute(&self, context: &WorkflowContext) -> AutomationResult<TaskResult> {
        let (Some(customer), Some(appointment)) = (&context.customer, &context.appointment) else {
            return Ok(TaskResult::error(self.name(), "缺少客户或预约数据"));
        };
        let hours_before = context.hours_before.unwrap_or(24);

        let customer = customer.read().await;
        let appointment = appointment.read().await;

        let (subject, body) =
            templates::reminder_email(&customer, &appointment, hours_before, &self.practice_name);
        let email_sent = self
            .email
            .send_email(&customer.email, &subject, &body, true)
            .await;

        let sms_sent = match &self.sms {
            Some(sms) => {
                let message = templates::reminder_sms(&appointment);
                sms.send_sms(&customer.phone, &message).await
            }
            // 未配置短信通道时不影响整体结果
            None => true,
        };

        let mut result = TaskResult::ok(
            self.name(),
            json!({
                "email_sent": email_sent,
                "sms_sent": sms_sent,
                "hours_before": hours_before,
            }),
        );
        result.success = email_sent && sms_sent;
        Ok(result)
    }

    fn name(&self) -> &str {
        "SendAppointmentReminder"
    }
}

/// 常见工单的固定回复表
///
/// 按表内顺序匹配，命中第一个关键词即停止，顺序就是关键词
/// 重叠时的裁决规则。
const CANNED_RESPONSES: [(&str, &str); 4] = [
    (
        "hours",
        "Our practice hours are Monday-Friday 8am-5pm, Saturday 9am-1pm, and we're closed on Sundays.",
    ),
    (
        "payment",
        "We accept all major credit cards, cash, and insurance. Please contact our billing department for payment plans.",
    ),
    (
        "cancellation",
        "To cancel an appointment, please call us at least 24 hours in advance.",
    ),
    (
        "emergency",
        "For dental emergencies, please call our emergency line available 24/7.",
    ),
];

/// 自动处理常见客服工单
pub struct ResolveSupportTicketTask {
    email: Arc<dyn EmailNotifier>,
    practice_name: String,
}

impl ResolveSupportTicketTask {
    pub fn new(email: Arc<dyn EmailNotifier>, practice_name: String) -> Self {
        Self {
            email,
            practice_name,
        }
    }

    /// 在固定回复表中查找工单描述命中的第一条回复
    fn match_response(description: &str) -> Option<(&'static str, &'static str)> {
        let description = description.to_lowercase();
        CANNED_RESPONSES
            .iter()
            .find(|(keyword, _)| description.contains(keyword))
            .copied()
    }
}

#[async_trait]
impl WorkflowTask for ResolveSupportTicketTask {
    async fn execute(&self, context: &WorkflowContext) -> AutomationResult<TaskResult> {
        let (Some(ticket), Some(customer)) = (&context.ticket, &context.customer) else {
            return Ok(TaskResult::error(self.name(), "缺少工单或客户数据"));
        };

        let ticket = ticket.read().await;
        let customer = customer.read().await;

        match Self::match_response(&ticket.description) {
            Some((keyword, response)) => {
                let (subject, body) = templates::ticket_response_email(
                    &customer,
                    &ticket,
                    response,
                    &self.practice_name,
                );
                let sent = self
                    .email
                    .send_email(&customer.email, &subject, &body, true)
                    .await;

                debug!("工单 {} 命中关键词 {}", ticket.id, keyword);

                let mut result = TaskResult::ok(
                    self.name(),
                    json!({
                        "auto_resolved": true,
                        "response_sent": sent,
                        "matched_keyword": keyword,
                    }),
                );
                result.success = sent;
                Ok(result)
            }
            None => Ok(TaskResult::failed(
                self.name(),
                json!({
                    "auto_resolved": false,
                    "message": "工单需要人工处理",
                }),
            )),
        }
    }

    fn name(&self) -> &str {
        "ResolveSupportTicket"
    }
}

/// 预约后更新客户积分
///
/// 积分按服务类型查表，表内没有的服务使用默认积分，
/// 直接累加到注册表中的客户实体上。
pub struct UpdateLoyaltyPointsTask;

#[async_trait]
impl WorkflowTask for UpdateLoyaltyPointsTask {
    async fn execute(&self, context: &WorkflowContext) -> AutomationResult<TaskResult> {
        let (Some(customer), Some(appointment)) = (&context.customer, &context.appointment) else {
            return Ok(TaskResult::error(self.name(), "缺少客户或预约数据"));
        };

        let service_type = appointment.read().await.service_type.clone();
        let points_earned = context
            .points_per_service
            .get(&service_type)
            .copied()
            .unwrap_or(context.default_points);

        let mut customer = customer.write().await;
        customer.loyalty_points += points_earned;

        Ok(TaskResult::ok(
            self.name(),
            json!({
                "points_earned": points_earned,
                "total_points": customer.loyalty_points,
            }),
        ))
    }

    fn name(&self) -> &str {
        "UpdateLoyaltyPoints"
    }
}

/// 向员工邮箱发送预约通知
pub struct NotifyStaffTask {
    email: Arc<dyn EmailNotifier>,
}

impl NotifyStaffTask {
    pub fn new(email: Arc<dyn EmailNotifier>) -> Self {
        Self { email }
    }
}

#[async_trait]
impl WorkflowTask for NotifyStaffTask {
    async fn execute(&self, context: &WorkflowContext) -> AutomationResult<TaskResult> {
        let (Some(appointment), Some(staff_email)) = (&context.appointment, &context.staff_email)
        else {
            return Ok(TaskResult::error(self.name(), "缺少预约数据或员工邮箱"));
        };
        let notification_type = context.notification_type.as_deref().unwrap_or("appointment");

        let appointment = appointment.read().await;
        let (subject, body) = templates::staff_notification(&appointment, notification_type);
        let sent = self.email.send_email(staff_email, &subject, &body, false).await;

        let mut result = TaskResult::ok(self.name(), json!({ "notification_sent": sent }));
        result.success = sent;
        Ok(result)
    }

    fn name(&self) -> &str {
        "NotifyStaff"
    }
}
