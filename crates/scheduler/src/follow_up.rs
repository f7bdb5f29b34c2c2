use std::collections::HashSet;
use std::sync::Arc;

use chrono::Duration;
use tokio::sync::RwLock;
use tracing::info;

use automation_core::{
    traits::EmailNotifier, AutomationError, AutomationResult,
};
use automation_engine::{templates, WorkflowEngine};

use crate::scheduler::TaskScheduler;
use crate::task::{ScheduledTask, TaskStatusSnapshot};

/// 术后回访调度
///
/// 在预约时间之后的若干天注册一次性任务，到点发送回访邮件。
pub struct FollowUpScheduler {
    scheduler: Arc<TaskScheduler>,
    engine: Arc<WorkflowEngine>,
    email: Arc<dyn EmailNotifier>,
    practice_name: String,
    follow_ups: RwLock<HashSet<String>>,
}

impl FollowUpScheduler {
    pub fn new(
        scheduler: Arc<TaskScheduler>,
        engine: Arc<WorkflowEngine>,
        email: Arc<dyn EmailNotifier>,
        practice_name: String,
    ) -> Self {
        Self {
            scheduler,
            engine,
            email,
            practice_name,
            follow_ups: RwLock::new(HashSet::new()),
        }
    }

    /// 为预约注册一次回访，返回回访任务ID
    pub async fn schedule_follow_up(
        &self,
        appointment_id: &str,
        customer_id: &str,
        days_after: i64,
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

        let scheduled_time = appointment.read().await.scheduled_time;
        let customer_name = customer.read().await.name.clone();

        let follow_up_time = scheduled_time + Duration::days(days_after);
        let follow_up_id = format!("followup_{appointment_id}_{days_after}d");

        let email = self.email.clone();
        let practice_name = self.practice_name.clone();

        let task = ScheduledTask::once(
            follow_up_id.clone(),
            format!("Follow-up for {customer_name}"),
            follow_up_time,
            move || {
                let email = email.clone();
                let practice_name = practice_name.clone();
                let customer = customer.clone();
                let appointment = appointment.clone();
                async move {
                    let customer = customer.read().await;
                    let appointment = appointment.read().await;
                    let (subject, body) =
                        templates::follow_up_email(&customer, &appointment, &practice_name);
                    // 投递失败交给调度器的重试机制
                    if email.send_email(&customer.email, &subject, &body, true).await {
                        Ok(())
                    } else {
                        Err(AutomationError::TaskExecution(format!(
                            "回访邮件发送失败: {}",
                            customer.email
                        )))
                    }
                }
            },
        );

        self.scheduler.add_task(task).await;
        self.follow_ups.write().await.insert(follow_up_id.clone());
        info!(
            "已为 {} 安排回访，触发时间 {}",
            customer_name, follow_up_time
        );

        Ok(follow_up_id)
    }

    /// 取消回访，同时从任务调度器移除
    pub async fn cancel_follow_up(&self, follow_up_id: &str) -> bool {
        if self.follow_ups.write().await.remove(follow_up_id) {
            self.scheduler.remove_task(follow_up_id).await;
            info!("回访已取消: {}", follow_up_id);
            return true;
        }
        false
    }

    /// 列出本调度器注册的所有回访的状态
    pub async fn get_scheduled_follow_ups(&self) -> Vec<TaskStatusSnapshot> {
        let follow_ups = self.follow_ups.read().await;
        let mut snapshots = Vec::with_capacity(follow_ups.len());
        for follow_up_id in follow_ups.iter() {
            if let Some(snapshot) = self.scheduler.get_task_status(follow_up_id).await {
                snapshots.push(snapshot);
            }
        }
        snapshots
    }
}
