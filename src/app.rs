use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use automation_core::traits::SmsNotifier;
use automation_core::AppConfig;
use automation_engine::WorkflowEngine;
use automation_scheduler::{
    FollowUpScheduler, MaintenanceScheduler, ReminderScheduler, TaskScheduler,
};

use crate::gateways::{LogEmailGateway, LogSmsGateway};

/// 应用组装根
///
/// 按配置装配通知网关、工作流引擎、任务调度器和各业务调度器，
/// 并负责它们的启动与优雅停止。
pub struct Application {
    pub engine: Arc<WorkflowEngine>,
    pub scheduler: Arc<TaskScheduler>,
    pub reminders: Arc<ReminderScheduler>,
    pub follow_ups: Arc<FollowUpScheduler>,
    pub maintenance: Arc<MaintenanceScheduler>,
}

impl Application {
    pub fn new(config: &AppConfig) -> Self {
        let email = Arc::new(LogEmailGateway);
        let sms: Option<Arc<dyn SmsNotifier>> = if config.notification.sms_enabled {
            Some(Arc::new(LogSmsGateway))
        } else {
            None
        };

        let engine = Arc::new(WorkflowEngine::new(
            email.clone(),
            sms,
            config.engine.clone(),
            config.notification.clone(),
        ));
        let scheduler = Arc::new(TaskScheduler::new(&config.scheduler));

        let reminders = Arc::new(ReminderScheduler::new(scheduler.clone(), engine.clone()));
        let follow_ups = Arc::new(FollowUpScheduler::new(
            scheduler.clone(),
            engine.clone(),
            email,
            config.notification.practice_name.clone(),
        ));
        let maintenance = Arc::new(MaintenanceScheduler::new(scheduler.clone()));

        Self {
            engine,
            scheduler,
            reminders,
            follow_ups,
            maintenance,
        }
    }

    /// 启动调度循环并注册常规维护任务
    pub async fn start(&self) -> Result<()> {
        self.scheduler.start().await?;

        let engine = self.engine.clone();
        self.maintenance
            .schedule_cleanup_cancelled_appointments(
                move || {
                    let engine = engine.clone();
                    async move {
                        let stats = engine.get_statistics().await;
                        info!(
                            "例行清理检查完成，当前共 {} 个预约",
                            stats.total_appointments
                        );
                        Ok(())
                    }
                },
                "02:00",
            )
            .await?;

        info!("自动化服务已启动");
        Ok(())
    }

    /// 优雅停止，等待执行中的任务收尾
    pub async fn shutdown(&self) {
        info!("开始停止自动化服务");
        self.scheduler.stop().await;
        info!("自动化服务已停止");
    }
}
