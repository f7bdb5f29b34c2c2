use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use automation_core::{AutomationError, AutomationResult};

use crate::scheduler::TaskScheduler;
use crate::task::{ScheduledTask, TaskStatusSnapshot};

/// 系统维护任务调度
///
/// 注册周期性的维护任务：固定间隔的数据备份，以及锚定到每天
/// 固定钟点的清理任务。
pub struct MaintenanceScheduler {
    scheduler: Arc<TaskScheduler>,
    maintenance_tasks: RwLock<HashSet<String>>,
}

impl MaintenanceScheduler {
    pub fn new(scheduler: Arc<TaskScheduler>) -> Self {
        Self {
            scheduler,
            maintenance_tasks: RwLock::new(HashSet::new()),
        }
    }

    /// 注册周期性数据备份，首次执行在一个周期之后
    pub async fn schedule_database_backup<F, Fut>(
        &self,
        backup: F,
        interval_hours: i64,
    ) -> String
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AutomationResult<()>> + Send + 'static,
    {
        let backup_id = format!("backup_{}", Uuid::new_v4().simple());
        let first_run = Utc::now() + Duration::hours(interval_hours);

        let task = ScheduledTask::interval(
            backup_id.clone(),
            "Database Backup".to_string(),
            first_run,
            interval_hours * 3600,
            backup,
        );

        self.scheduler.add_task(task).await;
        self.maintenance_tasks.write().await.insert(backup_id.clone());
        info!("数据备份已注册，每 {} 小时执行一次", interval_hours);

        backup_id
    }

    /// 注册每天固定钟点执行的取消预约清理
    ///
    /// `run_time` 为 "HH:MM"；当天该时刻已过时锚定到明天。
    pub async fn schedule_cleanup_cancelled_appointments<F, Fut>(
        &self,
        cleanup: F,
        run_time: &str,
    ) -> AutomationResult<String>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AutomationResult<()>> + Send + 'static,
    {
        let (hour, minute) = parse_time_of_day(run_time)?;

        let now = Utc::now();
        let mut execute_at = now
            .date_naive()
            .and_hms_opt(hour, minute, 0)
            .ok_or_else(|| AutomationError::InvalidTimeOfDay(run_time.to_string()))?
            .and_utc();
        if execute_at < now {
            execute_at += Duration::days(1);
        }

        let cleanup_id = format!("cleanup_{}", Uuid::new_v4().simple());
        let task = ScheduledTask::daily(
            cleanup_id.clone(),
            "Cleanup Cancelled Appointments".to_string(),
            execute_at,
            cleanup,
        );

        self.scheduler.add_task(task).await;
        self.maintenance_tasks
            .write()
            .await
            .insert(cleanup_id.clone());
        info!("取消预约清理已注册，每天 {} 执行", run_time);

        Ok(cleanup_id)
    }

    /// 取消维护任务，同时从任务调度器移除
    pub async fn cancel_maintenance_task(&self, task_id: &str) -> bool {
        if self.maintenance_tasks.write().await.remove(task_id) {
            self.scheduler.remove_task(task_id).await;
            info!("维护任务已取消: {}", task_id);
            return true;
        }
        false
    }

    /// 列出本调度器注册的所有维护任务的状态
    pub async fn get_maintenance_status(&self) -> Vec<TaskStatusSnapshot> {
        let maintenance_tasks = self.maintenance_tasks.read().await;
        let mut snapshots = Vec::with_capacity(maintenance_tasks.len());
        for task_id in maintenance_tasks.iter() {
            if let Some(snapshot) = self.scheduler.get_task_status(task_id).await {
                snapshots.push(snapshot);
            }
        }
        snapshots
    }
}

/// 解析 "HH:MM" 钟点
fn parse_time_of_day(value: &str) -> AutomationResult<(u32, u32)> {
    let invalid = || AutomationError::InvalidTimeOfDay(value.to_string());

    let (hour, minute) = value.split_once(':').ok_or_else(invalid)?;
    let hour: u32 = hour.parse().map_err(|_| invalid())?;
    let minute: u32 = minute.parse().map_err(|_| invalid())?;

    if hour >= 24 || minute >= 60 {
        return Err(invalid());
    }
    Ok((hour, minute))
}
