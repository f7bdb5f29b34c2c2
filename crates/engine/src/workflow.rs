use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::context::WorkflowContext;
use crate::tasks::{TaskResult, WorkflowTask};

/// 工作流执行状态
///
/// `Failed` 只在引擎级缺陷（错误逃出单任务边界之外）时出现；
/// 任务级失败只标记在对应的结果记录上，工作流本身仍以 `Completed`
/// 收尾，调用方通过 `tasks_successful` 判断细粒度结果。
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Paused,
}

/// 工作流
///
/// 按固定顺序对共享上下文执行一组任务的一次性执行体：
/// 构造、执行一次、归档到历史，不可重复执行。
pub struct Workflow {
    pub name: String,
    tasks: Vec<Box<dyn WorkflowTask>>,
    pub status: WorkflowStatus,
    results: Vec<TaskResult>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// 工作流执行摘要
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowSummary {
    pub workflow_name: String,
    pub status: WorkflowStatus,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub duration_seconds: Option<f64>,
    pub tasks_executed: usize,
    pub tasks_successful: usize,
    pub results: Vec<TaskResult>,
}

impl Workflow {
    pub fn new(name: impl Into<String>, tasks: Vec<Box<dyn WorkflowTask>>) -> Self {
        Self {
            name: name.into(),
            tasks,
            status: WorkflowStatus::Pending,
            results: Vec::new(),
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
        }
    }

    /// 顺序执行所有任务
    ///
    /// 单个任务的失败或未预期错误都不会中断后续任务，顺序始终保持
    /// 与任务列表一致。
    pub async fn execute(&mut self, context: &WorkflowContext) -> WorkflowSummary {
        self.status = WorkflowStatus::Running;
        self.started_at = Some(Utc::now());
        self.results.clear();

        info!("开始执行工作流: {}", self.name);

        for task in &self.tasks {
            info!("执行任务: {}", task.name());

            let result = match task.execute(context).await {
                Ok(result) => {
                    if !result.success {
                        warn!(
                            "任务 {} 失败: {}",
                            task.name(),
                            result.error.as_deref().unwrap_or("未知原因")
                        );
                    }
                    result
                }
                Err(e) => {
                    error!("任务 {} 出现未预期错误: {}", task.name(), e);
                    TaskResult::error(task.name(), e.to_string())
                }
            };
            self.results.push(result);
        }

        self.status = WorkflowStatus::Completed;
        self.completed_at = Some(Utc::now());
        info!("工作流 {} 执行完成", self.name);

        self.summary()
    }

    /// 生成执行摘要
    pub fn summary(&self) -> WorkflowSummary {
        let duration_seconds = match (self.started_at, self.completed_at) {
            (Some(started), Some(completed)) => {
                Some((completed - started).num_milliseconds() as f64 / 1000.0)
            }
            _ => None,
        };

        WorkflowSummary {
            workflow_name: self.name.clone(),
            status: self.status,
            created_at: self.created_at,
            started_at: self.started_at,
            completed_at: self.completed_at,
            duration_seconds,
            tasks_executed: self.results.len(),
            tasks_successful: self.results.iter().filter(|r| r.success).count(),
            results: self.results.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use automation_core::{AutomationError, AutomationResult};

    /// 固定返回成功/失败/错误三种行为之一的任务替身
    struct ScriptedTask {
        task_name: &'static str,
        behavior: Behavior,
    }

    enum Behavior {
        Succeed,
        Fail,
        Error,
    }

    #[async_trait]
    impl WorkflowTask for ScriptedTask {
        async fn execute(&self, _context: &WorkflowContext) -> AutomationResult<TaskResult> {
            match self.behavior {
                Behavior::Succeed => Ok(TaskResult::ok(self.task_name, serde_json::Value::Null)),
                Behavior::Fail => Ok(TaskResult::error(self.task_name, "投递失败")),
                Behavior::Error => Err(AutomationError::Internal("测试错误".to_string())),
            }
        }

        fn name(&self) -> &str {
            self.task_name
        }
    }

    fn scripted(task_name: &'static str, behavior: Behavior) -> Box<dyn WorkflowTask> {
        Box::new(ScriptedTask {
            task_name,
            behavior,
        })
    }

    #[tokio::test]
    async fn test_failed_task_does_not_abort_workflow() {
        let mut workflow = Workflow::new(
            "TestFlow",
            vec![
                scripted("A", Behavior::Succeed),
                scripted("B", Behavior::Fail),
                scripted("C", Behavior::Succeed),
            ],
        );

        let summary = workflow.execute(&WorkflowContext::new()).await;

        // 三个任务全部执行，顺序与任务列表一致
        assert_eq!(summary.tasks_executed, 3);
        assert_eq!(summary.tasks_successful, 2);
        let names: Vec<&str> = summary.results.iter().map(|r| r.task.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert!(!summary.results[1].success);
        assert!(summary.results[2].success);
        assert_eq!(summary.status, WorkflowStatus::Completed);
    }

    #[tokio::test]
    async fn test_unexpected_error_converted_to_failure_record() {
        let mut workflow = Workflow::new(
            "TestFlow",
            vec![
                scripted("A", Behavior::Error),
                scripted("B", Behavior::Succeed),
            ],
        );

        let summary = workflow.execute(&WorkflowContext::new()).await;

        assert_eq!(summary.tasks_executed, 2);
        assert_eq!(summary.tasks_successful, 1);
        assert!(!summary.results[0].success);
        assert!(summary.results[0]
            .error
            .as_deref()
            .unwrap()
            .contains("测试错误"));
        // 任务级错误不会把工作流置为失败
        assert_eq!(summary.status, WorkflowStatus::Completed);
    }

    #[tokio::test]
    async fn test_summary_counts_and_duration() {
        let mut workflow = Workflow::new("TestFlow", vec![scripted("A", Behavior::Succeed)]);
        let summary = workflow.execute(&WorkflowContext::new()).await;

        assert_eq!(summary.workflow_name, "TestFlow");
        assert!(summary.started_at.is_some());
        assert!(summary.completed_at.is_some());
        assert!(summary.duration_seconds.unwrap() >= 0.0);
    }
}
