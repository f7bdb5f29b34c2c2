use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 客户信息
///
/// 诊所的注册客户，由工作流引擎的客户注册表持有。
///
/// # 字段说明
///
/// - `id`: 客户的唯一标识符
/// - `name`: 客户姓名
/// - `email`: 邮箱地址，用于发送确认、提醒和工单回复
/// - `phone`: 手机号，用于发送短信提醒
/// - `created_at`: 客户创建时间
/// - `last_visit`: 最近一次到店时间
/// - `loyalty_points`: 积分余额，仅由积分更新任务累加
/// - `preferences`: 客户偏好设置，自由键值对
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
    pub last_visit: Option<DateTime<Utc>>,
    pub loyalty_points: u32,
    pub preferences: HashMap<String, serde_json::Value>,
}

impl Customer {
    /// 创建新客户
    pub fn new(id: String, name: String, email: String, phone: String) -> Self {
        Self {
            id,
            name,
            email,
            phone,
            created_at: Utc::now(),
            last_visit: None,
            loyalty_points: 0,
            preferences: HashMap::new(),
        }
    }
}
