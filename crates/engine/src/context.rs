use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use automation_core::models::{Appointment, Customer, SupportTicket};

/// 注册表中共享的实体句柄，任务通过它就地读写实体
pub type SharedCustomer = Arc<RwLock<Customer>>;
pub type SharedAppointment = Arc<RwLock<Appointment>>;
pub type SharedTicket = Arc<RwLock<SupportTicket>>;

/// 工作流执行上下文
///
/// 一次工作流执行期间所有任务共享的数据。实体字段持有注册表内的
/// 共享句柄，任务对实体的修改（如积分累加）直接反映到注册表。
/// 工作流内任务严格按顺序执行，不存在对同一上下文的并发写入。
#[derive(Clone, Default)]
pub struct WorkflowContext {
    pub customer: Option<SharedCustomer>,
    pub appointment: Option<SharedAppointment>,
    pub ticket: Option<SharedTicket>,
    /// 各服务类型对应的积分
    pub points_per_service: HashMap<String, u32>,
    /// 积分表未覆盖的服务类型使用的默认积分
    pub default_points: u32,
    pub staff_email: Option<String>,
    /// 提醒提前量（小时）
    pub hours_before: Option<i64>,
    pub notification_type: Option<String>,
}

impl WorkflowContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_customer(mut self, customer: SharedCustomer) -> Self {
        self.customer = Some(customer);
        self
    }

    pub fn with_appointment(mut self, appointment: SharedAppointment) -> Self {
        self.appointment = Some(appointment);
        self
    }

    pub fn with_ticket(mut self, ticket: SharedTicket) -> Self {
        self.ticket = Some(ticket);
        self
    }

    pub fn with_points(mut self, table: HashMap<String, u32>, default_points: u32) -> Self {
        self.points_per_service = table;
        self.default_points = default_points;
        self
    }

    pub fn with_staff_email(mut self, staff_email: String) -> Self {
        self.staff_email = Some(staff_email);
        self
    }

    pub fn with_hours_before(mut self, hours_before: i64) -> Self {
        self.hours_before = Some(hours_before);
        self
    }
}
