//! 测试用的通知网关替身与实体构造辅助

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::sync::Mutex;

use automation_core::{
    models::{Appointment, Customer, SupportTicket},
    traits::{EmailNotifier, SmsNotifier},
};

use crate::context::{SharedAppointment, SharedCustomer, SharedTicket};

#[derive(Debug, Clone)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub is_html: bool,
}

#[derive(Debug, Clone)]
pub struct SentSms {
    pub to: String,
    pub body: String,
}

/// 记录所有投递调用的网关替身，可配置单通道投递失败
#[derive(Default)]
pub struct RecordingGateway {
    emails: Mutex<Vec<SentEmail>>,
    sms: Mutex<Vec<SentSms>>,
    fail_email: Mutex<bool>,
    fail_sms: Mutex<bool>,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn fail_email(&self, fail: bool) {
        *self.fail_email.lock().await = fail;
    }

    pub async fn fail_sms(&self, fail: bool) {
        *self.fail_sms.lock().await = fail;
    }

    pub async fn sent_emails(&self) -> Vec<SentEmail> {
        self.emails.lock().await.clone()
    }

    pub async fn sent_sms(&self) -> Vec<SentSms> {
        self.sms.lock().await.clone()
    }
}

#[async_trait]
impl EmailNotifier for RecordingGateway {
    async fn send_email(&self, to: &str, subject: &str, body: &str, is_html: bool) -> bool {
        self.emails.lock().await.push(SentEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
            is_html,
        });
        !*self.fail_email.lock().await
    }
}

#[async_trait]
impl SmsNotifier for RecordingGateway {
    async fn send_sms(&self, to: &str, body: &str) -> bool {
        self.sms.lock().await.push(SentSms {
            to: to.to_string(),
            body: body.to_string(),
        });
        !*self.fail_sms.lock().await
    }
}

pub fn shared_customer(id: &str, loyalty_points: u32) -> SharedCustomer {
    let mut customer = Customer::new(
        id.to_string(),
        "Alice Smith".to_string(),
        "alice@example.com".to_string(),
        "+27831234567".to_string(),
    );
    customer.loyalty_points = loyalty_points;
    Arc::new(tokio::sync::RwLock::new(customer))
}

pub fn shared_appointment(id: &str, customer_id: &str, service_type: &str) -> SharedAppointment {
    let appointment = Appointment::new(
        id.to_string(),
        customer_id.to_string(),
        service_type.to_string(),
        Utc.with_ymd_and_hms(2025, 1, 10, 10, 0, 0).unwrap(),
        30,
    );
    Arc::new(tokio::sync::RwLock::new(appointment))
}

pub fn shared_ticket(id: &str, customer_id: &str, description: &str) -> SharedTicket {
    let ticket = SupportTicket::new(
        id.to_string(),
        customer_id.to_string(),
        "Question".to_string(),
        description.to_string(),
    );
    Arc::new(tokio::sync::RwLock::new(ticket))
}
