use std::collections::HashSet;
use std::sync::Arc;

use chrono::Duration;
use tokio::sync::RwLock;
use tracing::info;

use automation_core::{AutomationError, AutomationResult};
use automation_engine::WorkflowEngine;

use crate::scheduler::TaskScheduler;
use crate::task::{ScheduledTask, TaskStatusSnapshot};

/// 预约提醒调度
///
/// 按预约时间减去提前量计算触发时间，注册一次性任务，到点回调
/// 重新进入工作流引擎执行提醒工作流。只追踪自己注册的任务ID，
/// 取消时同时从任务调度器移除。
pub struct ReminderScheduler {
    scheduler: Arc<TaskScheduler>,
    engine: Arc<WorkflowEngine>,
    reminders: RwLock<HashSet<String>>,
}

impl ReminderScheduler {
    pub fn new(scheduler: Arc<TaskScheduler>, engine: Arc<WorkflowEngine>) -> Self {
        Self {
            scheduler,
            engine,
            reminders: RwLock::new(HashSet::new()),
        }
    }

    /// 为预约注册一条提醒，返回提醒任务ID
    ///
    /// 提前量以分钟计（默认场景为1440，即提前24小时），回调触发时
    /// 换算为小时传给提醒工作流。
    pub async fn schedule_reminder(
        &self,
        appointment_id: &str,
        customer_id: &str,
        reminder_minutes_before: i64,
    ) -> AutomationResult<String> {
        let appointment = self
            .engine
            .get_appointment(appointment_id)
            .await
            .ok_or_else(|| AutomationError::AppointmentNotFound {
                id: appointment_id.to_string(),
            })?;
        let customer = self
            .engine
            .get_customer(customer_id)
            .await
            .ok_or_else(|| AutomationError::CustomerNotFound {
                id: customer_id.to_string(),
            })?;

        let (scheduled_time, service_type) = {
            let appointment = appointment.read().await;
            (appointment.scheduled_time, appointment.service_type.clone())
        };
        let customer_name = customer.read().await.name.clone();

        let reminder_time = scheduled_time - Duration::minutes(reminder_minutes_before);
        let reminder_id = format!("reminder_{appointment_id}_{reminder_minutes_before}");

        let engine = self.engine.clone();
        let callback_customer_id = customer_id.to_string();
        let callback_appointment_id = appointment_id.to_string();
        let hours_before = reminder_minutes_before / 60;

        let task = ScheduledTask::once(
            reminder_id.clone(),
            format!("Reminder for {customer_name} - {service_type}"),
            reminder_time,
            move || {
                let engine = engine.clone();
                let customer_id = callback_customer_id.clone();
                let appointment_id = callback_appointment_id.clone();
                async move {
                    engine
                        .schedule_reminder_workflow(
                            &customer_id,
                            &appointment_id,
                            Some(hours_before),
                        )
                        .await
                        .map(|_| ())
                }
            },
        );

        self.scheduler.add_task(task).await;
        self.reminders.write().await.insert(reminder_id.clone());
        info!("已为 {} 安排提醒，触发时间 {}", customer_name, reminder_time);

        Ok(reminder_id)
    }

    /// 取消提醒，同时从任务调度器移除
    pub async fn cancel_reminder(&self, reminder_id: &str) -> bool {
        if self.reminders.write().await.remove(reminder_id) {
            self.scheduler.remove_task(reminder_id).await;
            info!("提醒已取消: {}", reminder_id);
            return true;
        }
        false
    }

    /// 列出本调度器注册的所有提醒的状态
    pub async fn get_scheduled_reminders(&self) -> Vec<TaskStatusSnapshot> {
        let reminders = self.reminders.read().await;
        let mut snapshots = Vec::with_capacity(reminders.len());
        for reminder_id in reminders.iter() {
            if let Some(snapshot) = self.scheduler.get_task_status(reminder_id).await {
                snapshots.push(snapshot);
            }
        }
        snapshots
    }
}
