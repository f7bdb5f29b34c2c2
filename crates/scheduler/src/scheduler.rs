use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, error, info, warn};

use automation_core::{AutomationError, AutomationResult, SchedulerConfig};

use crate::task::{ScheduledTask, TaskCallback, TaskStatusSnapshot};

/// 后台任务调度器
///
/// 持有以ID为键的任务表，启动后以固定周期轮询，执行所有到期的
/// 活跃任务并推进其下次执行时间。重复启动会被拒绝；`stop` 会等待
/// 当前轮询中的任务执行完毕后才返回。
#[derive(Clone)]
pub struct TaskScheduler {
    tasks: Arc<RwLock<HashMap<String, ScheduledTask>>>,
    is_running: Arc<RwLock<bool>>,
    shutdown_tx: Arc<RwLock<Option<broadcast::Sender<()>>>>,
    loop_handle: Arc<RwLock<Option<JoinHandle<()>>>>,
    poll_interval: Duration,
    error_backoff: Duration,
}

impl TaskScheduler {
    pub fn new(config: &SchedulerConfig) -> Self {
        Self {
            tasks: Arc::new(RwLock::new(HashMap::new())),
            is_running: Arc::new(RwLock::new(false)),
            shutdown_tx: Arc::new(RwLock::new(None)),
            loop_handle: Arc::new(RwLock::new(None)),
            poll_interval: Duration::from_secs(config.poll_interval_seconds),
            error_backoff: Duration::from_secs(config.loop_error_backoff_seconds),
        }
    }

    /// 添加任务，相同ID静默覆盖。不校验 `execute_at` 是否在未来，
    /// 过期的任务会在下一个轮询周期执行
    pub async fn add_task(&self, task: ScheduledTask) {
        let mut tasks = self.tasks.write().await;
        if tasks.contains_key(&task.id) {
            debug!("任务 {} 已存在，覆盖旧条目", task.id);
        }
        info!("任务已添加: {} (ID: {})", task.name, task.id);
        tasks.insert(task.id.clone(), task);
    }

    /// 移除任务，返回该ID是否存在。不会中断本轮已取出待执行的回调
    pub async fn remove_task(&self, task_id: &str) -> bool {
        let removed = self.tasks.write().await.remove(task_id).is_some();
        if removed {
            info!("任务已移除: {}", task_id);
        }
        removed
    }

    /// 暂停任务，不改变其 `execute_at`
    pub async fn pause_task(&self, task_id: &str) -> bool {
        let mut tasks = self.tasks.write().await;
        match tasks.get_mut(task_id) {
            Some(task) => {
                task.is_active = false;
                info!("任务已暂停: {}", task_id);
                true
            }
            None => false,
        }
    }

    /// 恢复任务，不改变其 `execute_at`
    pub async fn resume_task(&self, task_id: &str) -> bool {
        let mut tasks = self.tasks.write().await;
        match tasks.get_mut(task_id) {
            Some(task) => {
                task.is_active = true;
                info!("任务已恢复: {}", task_id);
                true
            }
            None => false,
        }
    }

    /// 查询单个任务的状态快照，未知ID返回 `None`
    pub async fn get_task_status(&self, task_id: &str) -> Option<TaskStatusSnapshot> {
        self.tasks
            .read()
            .await
            .get(task_id)
            .map(ScheduledTask::snapshot)
    }

    /// 查询全部任务的状态快照
    pub async fn get_all_tasks_status(&self) -> Vec<TaskStatusSnapshot> {
        self.tasks
            .read()
            .await
            .values()
            .map(ScheduledTask::snapshot)
            .collect()
    }

    /// 启动调度循环
    ///
    /// 已在运行时返回错误，不会出现两个并行的轮询循环。
    pub async fn start(&self) -> AutomationResult<()> {
        let mut is_running = self.is_running.write().await;
        if *is_running {
            return Err(AutomationError::Internal("调度器已在运行".to_string()));
        }

        info!(
            "任务调度器启动，轮询间隔 {} 秒",
            self.poll_interval.as_secs()
        );

        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        *self.shutdown_tx.write().await = Some(shutdown_tx);

        let scheduler = self.clone();
        let handle = tokio::spawn(async move {
            scheduler.run_loop(shutdown_rx).await;
        });
        *self.loop_handle.write().await = Some(handle);

        *is_running = true;
        Ok(())
    }

    /// 停止调度循环，等待当前轮询内的任务执行完毕
    pub async fn stop(&self) {
        let mut is_running = self.is_running.write().await;
        if !*is_running {
            return;
        }

        info!("停止任务调度器");

        if let Some(shutdown_tx) = self.shutdown_tx.write().await.take() {
            let _ = shutdown_tx.send(());
        }
        if let Some(handle) = self.loop_handle.write().await.take() {
            if let Err(e) = handle.await {
                error!("等待调度循环退出失败: {}", e);
            }
        }

        *is_running = false;
        info!("任务调度器已停止");
    }

    async fn run_loop(&self, mut shutdown_rx: broadcast::Receiver<()>) {
        let mut tick = interval(self.poll_interval);

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    // 单次轮询失败不结束循环，退避后进入下一轮
                    if let Err(e) = self.poll_once().await {
                        error!("调度循环出错: {}", e);
                        tokio::time::sleep(self.error_backoff).await;
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("调度循环收到停止信号");
                    break;
                }
            }
        }
    }

    /// 执行一轮轮询：取出所有到期的活跃任务，依次执行并结算状态。
    /// 返回本轮执行的任务数
    pub async fn poll_once(&self) -> AutomationResult<usize> {
        let now = Utc::now();
        // 先收集回调再释放锁，回调执行期间任务表对外保持可用
        let due: Vec<(String, String, TaskCallback)> = self
            .tasks
            .read()
            .await
            .values()
            .filter(|task| task.is_active && task.execute_at <= now)
            .map(|task| (task.id.clone(), task.name.clone(), task.callback.clone()))
            .collect();

        let fired = due.len();
        for (task_id, task_name, callback) in due {
            info!("执行任务: {}", task_name);
            let outcome = callback().await;
            self.settle_execution(&task_id, &task_name, outcome).await;
        }

        Ok(fired)
    }

    /// 结算一次执行：成功清零重试计数，失败累加并在达到上限时停用，
    /// 然后按调度类型推进下次执行时间
    async fn settle_execution(
        &self,
        task_id: &str,
        task_name: &str,
        outcome: AutomationResult<()>,
    ) {
        let now = Utc::now();
        let mut tasks = self.tasks.write().await;
        let Some(task) = tasks.get_mut(task_id) else {
            // 执行期间被移除，结果不再记录
            debug!("任务 {} 在执行期间被移除", task_id);
            return;
        };

        match outcome {
            Ok(()) => {
                task.last_executed = Some(now);
                task.retry_count = 0;
                info!("任务完成: {}", task_name);
            }
            Err(e) => {
                task.retry_count += 1;
                error!(
                    "任务失败: {} - {} (第 {}/{} 次尝试)",
                    task_name, e, task.retry_count, task.max_retries
                );
                if task.retry_count >= task.max_retries {
                    task.is_active = false;
                    warn!("任务连续失败 {} 次后停用: {}", task.max_retries, task_name);
                }
            }
        }

        task.advance_schedule(now);
    }
}
