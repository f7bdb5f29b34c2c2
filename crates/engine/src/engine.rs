use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::info;

use automation_core::{
    models::{Appointment, Customer, SupportTicket},
    traits::{EmailNotifier, SmsNotifier},
    AutomationError, AutomationResult, EngineConfig, NotificationConfig,
};

use crate::context::{SharedAppointment, SharedCustomer, SharedTicket, WorkflowContext};
use crate::tasks::{
    NotifyStaffTask, ResolveSupportTicketTask, SendAppointmentConfirmationTask,
    SendAppointmentReminderTask, UpdateLoyaltyPointsTask, WorkflowTask,
};
use crate::workflow::{Workflow, WorkflowStatus, WorkflowSummary};

/// 系统运行统计
#[derive(Debug, Clone, Serialize)]
pub struct EngineStatistics {
    pub total_customers: usize,
    pub total_appointments: usize,
    pub total_support_tickets: usize,
    pub total_workflows_executed: usize,
    pub successful_workflows: usize,
    pub failed_workflows: usize,
}

/// 工作流引擎
///
/// 持有客户、预约、工单三个注册表，负责把业务事件映射为任务列表、
/// 组装上下文并同步执行工作流，执行摘要追加到只增的历史记录中。
/// 注册表与历史都以读写锁保护，外部调用方可以并发进入。
pub struct WorkflowEngine {
    customers: RwLock<HashMap<String, SharedCustomer>>,
    appointments: RwLock<HashMap<String, SharedAppointment>>,
    tickets: RwLock<HashMap<String, SharedTicket>>,
    history: RwLock<Vec<WorkflowSummary>>,
    email: Arc<dyn EmailNotifier>,
    sms: Option<Arc<dyn SmsNotifier>>,
    config: EngineConfig,
    notification: NotificationConfig,
}

impl WorkflowEngine {
    pub fn new(
        email: Arc<dyn EmailNotifier>,
        sms: Option<Arc<dyn SmsNotifier>>,
        config: EngineConfig,
        notification: NotificationConfig,
    ) -> Self {
        Self {
            customers: RwLock::new(HashMap::new()),
            appointments: RwLock::new(HashMap::new()),
            tickets: RwLock::new(HashMap::new()),
            history: RwLock::new(Vec::new()),
            email,
            sms,
            config,
            notification,
        }
    }

    /// 添加或更新客户（按ID幂等覆盖）
    pub async fn add_customer(&self, customer: Customer) {
        let mut customers = self.customers.write().await;
        info!("客户已登记: {} (ID: {})", customer.name, customer.id);
        match customers.get(&customer.id) {
            // 已存在时就地更新，外部持有的句柄同步看到新值
            Some(existing) => *existing.write().await = customer,
            None => {
                customers.insert(customer.id.clone(), Arc::new(RwLock::new(customer)));
            }
        }
    }

    /// 添加或更新预约（按ID幂等覆盖）
    pub async fn add_appointment(&self, appointment: Appointment) {
        let mut appointments = self.appointments.write().await;
        info!("预约已登记: {}", appointment.id);
        match appointments.get(&appointment.id) {
            Some(existing) => *existing.write().await = appointment,
            None => {
                appointments.insert(appointment.id.clone(), Arc::new(RwLock::new(appointment)));
            }
        }
    }

    /// 添加或更新工单（按ID幂等覆盖）
    pub async fn add_ticket(&self, ticket: SupportTicket) {
        let mut tickets = self.tickets.write().await;
        info!("工单已登记: {}", ticket.id);
        match tickets.get(&ticket.id) {
            Some(existing) => *existing.write().await = ticket,
            None => {
                tickets.insert(ticket.id.clone(), Arc::new(RwLock::new(ticket)));
            }
        }
    }

    pub async fn get_customer(&self, id: &str) -> Option<SharedCustomer> {
        self.customers.read().await.get(id).cloned()
    }

    pub async fn get_appointment(&self, id: &str) -> Option<SharedAppointment> {
        self.appointments.read().await.get(id).cloned()
    }

    pub async fn get_ticket(&self, id: &str) -> Option<SharedTicket> {
        self.tickets.read().await.get(id).cloned()
    }

    /// 新预约事件：确认邮件 + 积分累加 + 员工通知
    pub async fn schedule_appointment_workflow(
        &self,
        customer_id: &str,
        appointment_id: &str,
    ) -> AutomationResult<WorkflowSummary> {
        let customer = self.require_customer(customer_id).await?;
        let appointment = self.require_appointment(appointment_id).await?;

        let tasks: Vec<Box<dyn WorkflowTask>> = vec![
            Box::new(SendAppointmentConfirmationTask::new(
                self.email.clone(),
                self.notification.practice_name.clone(),
            )),
            Box::new(UpdateLoyaltyPointsTask),
            Box::new(NotifyStaffTask::new(self.email.clone())),
        ];

        let context = WorkflowContext::new()
            .with_customer(customer)
            .with_appointment(appointment)
            .with_points(
                self.config.points_per_service.clone(),
                self.config.default_points,
            )
            .with_staff_email(self.config.staff_email.clone());

        self.run_workflow("AppointmentScheduled", tasks, &context)
            .await
    }

    /// 预约提醒事件：邮件提醒，配置了短信通道时加发短信
    pub async fn schedule_reminder_workflow(
        &self,
        customer_id: &str,
        appointment_id: &str,
        hours_before: Option<i64>,
    ) -> AutomationResult<WorkflowSummary> {
        let customer = self.require_customer(customer_id).await?;
        let appointment = self.require_appointment(appointment_id).await?;

        let tasks: Vec<Box<dyn WorkflowTask>> = vec![Box::new(SendAppointmentReminderTask::new(
            self.email.clone(),
            self.sms.clone(),
            self.notification.practice_name.clone(),
        ))];

        let context = WorkflowContext::new()
            .with_customer(customer)
            .with_appointment(appointment)
            .with_hours_before(hours_before.unwrap_or(self.config.default_reminder_hours));

        self.run_workflow("AppointmentReminder", tasks, &context)
            .await
    }

    /// 新工单事件：尝试按关键词自动回复
    pub async fn handle_support_ticket_workflow(
        &self,
        customer_id: &str,
        ticket_id: &str,
    ) -> AutomationResult<WorkflowSummary> {
        let customer = self.require_customer(customer_id).await?;
        let ticket = self
            .get_ticket(ticket_id)
            .await
            .ok_or_else(|| AutomationError::TicketNotFound {
                id: ticket_id.to_string(),
            })?;

        let tasks: Vec<Box<dyn WorkflowTask>> = vec![Box::new(ResolveSupportTicketTask::new(
            self.email.clone(),
            self.notification.practice_name.clone(),
        ))];

        let context = WorkflowContext::new()
            .with_customer(customer)
            .with_ticket(ticket);

        self.run_workflow("SupportTicketHandling", tasks, &context)
            .await
    }

    /// 获取执行历史（按时间顺序）
    pub async fn get_workflow_history(&self) -> Vec<WorkflowSummary> {
        self.history.read().await.clone()
    }

    /// 获取运行统计
    pub async fn get_statistics(&self) -> EngineStatistics {
        let history = self.history.read().await;
        EngineStatistics {
            total_customers: self.customers.read().await.len(),
            total_appointments: self.appointments.read().await.len(),
            total_support_tickets: self.tickets.read().await.len(),
            total_workflows_executed: history.len(),
            successful_workflows: history
                .iter()
                .filter(|s| s.status == WorkflowStatus::Completed)
                .count(),
            failed_workflows: history
                .iter()
                .filter(|s| s.status == WorkflowStatus::Failed)
                .count(),
        }
    }

    async fn require_customer(&self, id: &str) -> AutomationResult<SharedCustomer> {
        self.get_customer(id)
            .await
            .ok_or_else(|| AutomationError::CustomerNotFound { id: id.to_string() })
    }

    async fn require_appointment(&self, id: &str) -> AutomationResult<SharedAppointment> {
        self.get_appointment(id)
            .await
            .ok_or_else(|| AutomationError::AppointmentNotFound { id: id.to_string() })
    }

    async fn run_workflow(
        &self,
        name: &str,
        tasks: Vec<Box<dyn WorkflowTask>>,
        context: &WorkflowContext,
    ) -> AutomationResult<WorkflowSummary> {
        let mut workflow = Workflow::new(name, tasks);
        let summary = workflow.execute(context).await;
        self.history.write().await.push(summary.clone());
        Ok(summary)
    }
}
