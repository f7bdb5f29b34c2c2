use std::fmt;
use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tracing::warn;

use automation_core::AutomationResult;

/// 定时任务回调
///
/// 同步和异步逻辑在构造时统一包装成返回 boxed future 的闭包，
/// 执行循环不需要区分回调种类。回调只应捕获自己拥有的数据。
pub type TaskCallback = Arc<dyn Fn() -> BoxFuture<'static, AutomationResult<()>> + Send + Sync>;

/// 调度类型
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleType {
    /// 只执行一次，执行后停用
    Once,
    /// 每天执行，下次时间在上次计划时间上加1天
    Daily,
    /// 每周执行，下次时间在上次计划时间上加7天
    Weekly,
    /// 每月执行。按固定30天累加，不感知日历月长度
    Monthly,
    /// 按固定间隔执行，下次时间锚定在本次执行完成时刻（会漂移）
    Interval,
}

/// 定时任务条目
///
/// 由任务调度器的任务表独占持有，按ID唯一；重复添加相同ID会
/// 静默覆盖。`execute_at` 允许是过去的时间，过期条目会在下一个
/// 轮询周期被执行。
#[derive(Clone)]
pub struct ScheduledTask {
    pub id: String,
    pub name: String,
    pub callback: TaskCallback,
    pub schedule_type: ScheduleType,
    pub execute_at: DateTime<Utc>,
    pub interval_seconds: Option<i64>,
    pub is_active: bool,
    pub last_executed: Option<DateTime<Utc>>,
    pub retry_count: u32,
    pub max_retries: u32,
}

/// 任务状态快照，用于状态查询接口
#[derive(Debug, Clone, Serialize)]
pub struct TaskStatusSnapshot {
    pub id: String,
    pub name: String,
    pub schedule_type: ScheduleType,
    pub is_active: bool,
    pub execute_at: DateTime<Utc>,
    pub last_executed: Option<DateTime<Utc>>,
    pub retry_count: u32,
    pub max_retries: u32,
}

impl ScheduledTask {
    fn with_schedule<F, Fut>(
        id: String,
        name: String,
        schedule_type: ScheduleType,
        execute_at: DateTime<Utc>,
        interval_seconds: Option<i64>,
        callback: F,
    ) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AutomationResult<()>> + Send + 'static,
    {
        Self {
            id,
            name,
            callback: Arc::new(move || callback().boxed()),
            schedule_type,
            execute_at,
            interval_seconds,
            is_active: true,
            last_executed: None,
            retry_count: 0,
            max_retries: 3,
        }
    }

    /// 一次性任务
    pub fn once<F, Fut>(id: String, name: String, execute_at: DateTime<Utc>, callback: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AutomationResult<()>> + Send + 'static,
    {
        Self::with_schedule(id, name, ScheduleType::Once, execute_at, None, callback)
    }

    /// 每日任务
    pub fn daily<F, Fut>(id: String, name: String, first_run: DateTime<Utc>, callback: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AutomationResult<()>> + Send + 'static,
    {
        Self::with_schedule(id, name, ScheduleType::Daily, first_run, None, callback)
    }

    /// 每周任务
    pub fn weekly<F, Fut>(id: String, name: String, first_run: DateTime<Utc>, callback: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AutomationResult<()>> + Send + 'static,
    {
        Self::with_schedule(id, name, ScheduleType::Weekly, first_run, None, callback)
    }

    /// 每月任务（固定30天周期）
    pub fn monthly<F, Fut>(id: String, name: String, first_run: DateTime<Utc>, callback: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AutomationResult<()>> + Send + 'static,
    {
        Self::with_schedule(id, name, ScheduleType::Monthly, first_run, None, callback)
    }

    /// 固定间隔任务，间隔秒数为必填
    pub fn interval<F, Fut>(
        id: String,
        name: String,
        first_run: DateTime<Utc>,
        interval_seconds: i64,
        callback: F,
    ) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AutomationResult<()>> + Send + 'static,
    {
        Self::with_schedule(
            id,
            name,
            ScheduleType::Interval,
            first_run,
            Some(interval_seconds),
            callback,
        )
    }

    /// 覆盖最大重试次数
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// 生成状态快照
    pub fn snapshot(&self) -> TaskStatusSnapshot {
        TaskStatusSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            schedule_type: self.schedule_type,
            is_active: self.is_active,
            execute_at: self.execute_at,
            last_executed: self.last_executed,
            retry_count: self.retry_count,
            max_retries: self.max_retries,
        }
    }

    /// 一次执行后推进下次执行时间
    ///
    /// 周期类型从上次计划时间累加，间隔类型锚定到当前时刻。
    /// 缺少间隔秒数的间隔任务退化为一次性任务。
    pub(crate) fn advance_schedule(&mut self, now: DateTime<Utc>) {
        match self.schedule_type {
            ScheduleType::Once => self.is_active = false,
            ScheduleType::Daily => self.execute_at += Duration::days(1),
            ScheduleType::Weekly => self.execute_at += Duration::weeks(1),
            ScheduleType::Monthly => self.execute_at += Duration::days(30),
            ScheduleType::Interval => match self.interval_seconds {
                Some(seconds) => self.execute_at = now + Duration::seconds(seconds),
                None => {
                    warn!("间隔任务 {} 缺少间隔秒数，执行一次后停用", self.id);
                    self.is_active = false;
                }
            },
        }
    }
}

impl fmt::Debug for ScheduledTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduledTask")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("schedule_type", &self.schedule_type)
            .field("execute_at", &self.execute_at)
            .field("interval_seconds", &self.interval_seconds)
            .field("is_active", &self.is_active)
            .field("last_executed", &self.last_executed)
            .field("retry_count", &self.retry_count)
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}
