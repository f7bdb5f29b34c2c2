use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 预约信息
///
/// `customer_id` 应指向客户注册表中已存在的客户，由调用方保证。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub customer_id: String,
    pub service_type: String,
    pub scheduled_time: DateTime<Utc>,
    pub duration_minutes: u32,
    pub status: AppointmentStatus,
    pub dentist: Option<String>,
    pub notes: Option<String>,
    /// 已发送的提醒任务ID列表
    pub reminders_sent: Vec<String>,
}

/// 预约状态
///
/// 本组件不强制状态迁移规则，任务可以按业务需要直接设置状态。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    Completed,
    Cancelled,
    NoShow,
    PendingConfirmation,
}

impl Appointment {
    /// 创建新预约，初始状态为已排期
    pub fn new(
        id: String,
        customer_id: String,
        service_type: String,
        scheduled_time: DateTime<Utc>,
        duration_minutes: u32,
    ) -> Self {
        Self {
            id,
            customer_id,
            service_type,
            scheduled_time,
            duration_minutes,
            status: AppointmentStatus::Scheduled,
            dentist: None,
            notes: None,
            reminders_sent: Vec::new(),
        }
    }

    /// 检查预约是否已取消
    pub fn is_cancelled(&self) -> bool {
        matches!(self.status, AppointmentStatus::Cancelled)
    }
}
