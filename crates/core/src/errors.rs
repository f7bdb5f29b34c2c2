use thiserror::Error;

/// 自动化系统错误类型定义
#[derive(Debug, Error)]
pub enum AutomationError {
    #[error("客户未找到: {id}")]
    CustomerNotFound { id: String },

    #[error("预约未找到: {id}")]
    AppointmentNotFound { id: String },

    #[error("工单未找到: {id}")]
    TicketNotFound { id: String },

    #[error("定时任务未找到: {id}")]
    TaskNotFound { id: String },

    #[error("工作流上下文缺少数据: {0}")]
    MissingContextData(String),

    #[error("无效的时间格式: {0}，应为 HH:MM")]
    InvalidTimeOfDay(String),

    #[error("配置错误: {0}")]
    Configuration(String),

    #[error("任务执行错误: {0}")]
    TaskExecution(String),

    #[error("内部错误: {0}")]
    Internal(String),
}
