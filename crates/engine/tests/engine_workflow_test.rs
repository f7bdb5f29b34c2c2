use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::sync::Mutex;

use automation_core::{
    models::{Appointment, Customer, SupportTicket},
    traits::{EmailNotifier, SmsNotifier},
    AutomationError, EngineConfig, NotificationConfig,
};
use automation_engine::{WorkflowEngine, WorkflowStatus};

/// 记录投递调用的网关替身
#[derive(Default)]
struct FakeGateway {
    emails: Mutex<Vec<(String, String)>>,
    sms: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl EmailNotifier for FakeGateway {
    async fn send_email(&self, to: &str, subject: &str, _body: &str, _is_html: bool) -> bool {
        self.emails
            .lock()
            .await
            .push((to.to_string(), subject.to_string()));
        true
    }
}

#[async_trait]
impl SmsNotifier for FakeGateway {
    async fn send_sms(&self, to: &str, body: &str) -> bool {
        self.sms
            .lock()
            .await
            .push((to.to_string(), body.to_string()));
        true
    }
}

fn new_engine(gateway: Arc<FakeGateway>, with_sms: bool) -> WorkflowEngine {
    let sms: Option<Arc<dyn SmsNotifier>> = if with_sms {
        Some(gateway.clone())
    } else {
        None
    };
    WorkflowEngine::new(
        gateway,
        sms,
        EngineConfig::default(),
        NotificationConfig::default(),
    )
}

fn customer(id: &str) -> Customer {
    Customer::new(
        id.to_string(),
        "Thandi Mokoena".to_string(),
        "thandi@example.com".to_string(),
        "+27820000001".to_string(),
    )
}

fn appointment(id: &str, customer_id: &str, service_type: &str) -> Appointment {
    Appointment::new(
        id.to_string(),
        customer_id.to_string(),
        service_type.to_string(),
        Utc.with_ymd_and_hms(2025, 1, 10, 10, 0, 0).unwrap(),
        45,
    )
}

#[tokio::test]
async fn test_appointment_scheduled_workflow_end_to_end() {
    let gateway = Arc::new(FakeGateway::default());
    let engine = new_engine(gateway.clone(), false);

    engine.add_customer(customer("c1")).await;
    engine
        .add_appointment(appointment("a1", "c1", "Teeth Cleaning"))
        .await;

    let summary = engine
        .schedule_appointment_workflow("c1", "a1")
        .await
        .unwrap();

    assert_eq!(summary.workflow_name, "AppointmentScheduled");
    assert_eq!(summary.status, WorkflowStatus::Completed);
    assert_eq!(summary.tasks_executed, 3);
    assert_eq!(summary.tasks_successful, 3);

    // Teeth Cleaning 在默认积分表中是15分
    let stored = engine.get_customer("c1").await.unwrap();
    assert_eq!(stored.read().await.loyalty_points, 15);

    // 确认邮件发给客户，员工通知发给员工邮箱
    let emails = gateway.emails.lock().await;
    assert_eq!(emails.len(), 2);
    assert_eq!(emails[0].0, "thandi@example.com");
    assert_eq!(emails[1].0, "staff@makhanda-smiles.com");
}

#[tokio::test]
async fn test_add_customer_is_idempotent_upsert() {
    let gateway = Arc::new(FakeGateway::default());
    let engine = new_engine(gateway, false);

    engine.add_customer(customer("c1")).await;
    let mut updated = customer("c1");
    updated.name = "Thandi M.".to_string();
    updated.loyalty_points = 99;
    engine.add_customer(updated).await;

    let stats = engine.get_statistics().await;
    assert_eq!(stats.total_customers, 1);

    let stored = engine.get_customer("c1").await.unwrap();
    let stored = stored.read().await;
    assert_eq!(stored.name, "Thandi M.");
    assert_eq!(stored.loyalty_points, 99);
}

#[tokio::test]
async fn test_reminder_workflow_uses_both_channels() {
    let gateway = Arc::new(FakeGateway::default());
    let engine = new_engine(gateway.clone(), true);

    engine.add_customer(customer("c1")).await;
    engine
        .add_appointment(appointment("a1", "c1", "Root Canal"))
        .await;

    let summary = engine
        .schedule_reminder_workflow("c1", "a1", Some(2))
        .await
        .unwrap();

    assert_eq!(summary.tasks_executed, 1);
    assert_eq!(summary.tasks_successful, 1);
    assert_eq!(gateway.emails.lock().await.len(), 1);
    assert_eq!(gateway.sms.lock().await.len(), 1);

    let emails = gateway.emails.lock().await;
    assert!(emails[0].1.contains("in 2 hours"));
}

#[tokio::test]
async fn test_support_ticket_auto_resolution() {
    let gateway = Arc::new(FakeGateway::default());
    let engine = new_engine(gateway.clone(), false);

    engine.add_customer(customer("c1")).await;
    engine
        .add_ticket(SupportTicket::new(
            "t1".to_string(),
            "c1".to_string(),
            "Opening times".to_string(),
            "What are your hours?".to_string(),
        ))
        .await;

    let summary = engine
        .handle_support_ticket_workflow("c1", "t1")
        .await
        .unwrap();

    assert_eq!(summary.tasks_executed, 1);
    assert_eq!(summary.tasks_successful, 1);
    assert_eq!(summary.results[0].detail["auto_resolved"], true);
    assert_eq!(gateway.emails.lock().await.len(), 1);
}

#[tokio::test]
async fn test_support_ticket_without_keyword_is_left_for_manual_review() {
    let gateway = Arc::new(FakeGateway::default());
    let engine = new_engine(gateway.clone(), false);

    engine.add_customer(customer("c1")).await;
    engine
        .add_ticket(SupportTicket::new(
            "t1".to_string(),
            "c1".to_string(),
            "Pain".to_string(),
            "My tooth hurts really badly, unrelated to listed keywords".to_string(),
        ))
        .await;

    let summary = engine
        .handle_support_ticket_workflow("c1", "t1")
        .await
        .unwrap();

    // 工作流正常收尾，失败只体现在任务结果上
    assert_eq!(summary.status, WorkflowStatus::Completed);
    assert_eq!(summary.tasks_successful, 0);
    assert_eq!(summary.results[0].detail["auto_resolved"], false);
    assert_eq!(gateway.emails.lock().await.len(), 0);
}

#[tokio::test]
async fn test_workflow_entry_points_reject_unknown_ids() {
    let gateway = Arc::new(FakeGateway::default());
    let engine = new_engine(gateway, false);

    engine.add_customer(customer("c1")).await;

    let err = engine
        .schedule_appointment_workflow("c1", "missing")
        .await
        .unwrap_err();
    assert!(matches!(err, AutomationError::AppointmentNotFound { .. }));

    let err = engine
        .schedule_appointment_workflow("missing", "a1")
        .await
        .unwrap_err();
    assert!(matches!(err, AutomationError::CustomerNotFound { .. }));
}

#[tokio::test]
async fn test_statistics_and_history_accumulate() {
    let gateway = Arc::new(FakeGateway::default());
    let engine = new_engine(gateway, false);

    engine.add_customer(customer("c1")).await;
    engine
        .add_appointment(appointment("a1", "c1", "General Checkup"))
        .await;

    engine
        .schedule_appointment_workflow("c1", "a1")
        .await
        .unwrap();
    engine
        .schedule_reminder_workflow("c1", "a1", None)
        .await
        .unwrap();

    let stats = engine.get_statistics().await;
    assert_eq!(stats.total_customers, 1);
    assert_eq!(stats.total_appointments, 1);
    assert_eq!(stats.total_workflows_executed, 2);
    assert_eq!(stats.successful_workflows, 2);
    assert_eq!(stats.failed_workflows, 0);

    let history = engine.get_workflow_history().await;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].workflow_name, "AppointmentScheduled");
    assert_eq!(history[1].workflow_name, "AppointmentReminder");
}
