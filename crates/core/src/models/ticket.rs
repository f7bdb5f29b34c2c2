use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 客服工单
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportTicket {
    pub id: String,
    pub customer_id: String,
    pub subject: String,
    pub description: String,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub assigned_to: Option<String>,
    pub priority: TicketPriority,
    pub messages: Vec<TicketMessage>,
}

/// 工单状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
    Pending,
}

/// 工单优先级
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TicketPriority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

/// 工单消息记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketMessage {
    pub sender: String,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

impl SupportTicket {
    /// 创建新工单，初始状态为打开
    pub fn new(id: String, customer_id: String, subject: String, description: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            customer_id,
            subject,
            description,
            status: TicketStatus::Open,
            created_at: now,
            updated_at: now,
            assigned_to: None,
            priority: TicketPriority::Normal,
            messages: Vec::new(),
        }
    }

    /// 检查工单是否处于打开状态
    pub fn is_open(&self) -> bool {
        matches!(self.status, TicketStatus::Open | TicketStatus::Pending)
    }
}
