//! 面向客户和员工的通知文案渲染
//!
//! 邮件正文为简单的内联 HTML，短信为纯文本。文案内容面向客户，
//! 保持英文；这里只做拼装，投递由通知网关负责。

use automation_core::models::{Appointment, Customer, SupportTicket};

/// 预约确认邮件，返回 (主题, HTML正文)
pub fn confirmation_email(
    customer: &Customer,
    appointment: &Appointment,
    practice: &str,
) -> (String, String) {
    let subject = format!("Appointment Confirmation - {}", appointment.service_type);
    let dentist_line = match &appointment.dentist {
        Some(dentist) => format!("<li><strong>Dentist:</strong> {dentist}</li>"),
        None => String::new(),
    };
    let body = format!(
        "<html>\
            <body style=\"font-family: Arial, sans-serif;\">\
                <h2>Appointment Confirmation</h2>\
                <p>Dear {name},</p>\
                <p>Your appointment has been confirmed:</p>\
                <ul>\
                    <li><strong>Service:</strong> {service}</li>\
                    <li><strong>Date &amp; Time:</strong> {time}</li>\
                    <li><strong>Duration:</strong> {duration} minutes</li>\
                    {dentist_line}\
                </ul>\
                <p>If you need to reschedule, please contact us at least 24 hours before your appointment.</p>\
                <p>Best regards,<br>{practice}</p>\
            </body>\
        </html>",
        name = customer.name,
        service = appointment.service_type,
        time = appointment.scheduled_time.format("%Y-%m-%d %H:%M"),
        duration = appointment.duration_minutes,
    );
    (subject, body)
}

/// 预约提醒邮件
pub fn reminder_email(
    customer: &Customer,
    appointment: &Appointment,
    hours_before: i64,
    practice: &str,
) -> (String, String) {
    let subject = format!("Reminder: Your appointment is in {hours_before} hours");
    let body = format!(
        "<html>\
            <body style=\"font-family: Arial, sans-serif;\">\
                <h2>Appointment Reminder</h2>\
                <p>Dear {name},</p>\
                <p>This is a friendly reminder about your upcoming appointment:</p>\
                <ul>\
                    <li><strong>Service:</strong> {service}</li>\
                    <li><strong>Date &amp; Time:</strong> {time}</li>\
                    <li><strong>Duration:</strong> {duration} minutes</li>\
                </ul>\
                <p>Please arrive 10 minutes early. If you need to cancel or reschedule, contact us immediately.</p>\
                <p>Best regards,<br>{practice}</p>\
            </body>\
        </html>",
        name = customer.name,
        service = appointment.service_type,
        time = appointment.scheduled_time.format("%Y-%m-%d %H:%M"),
        duration = appointment.duration_minutes,
    );
    (subject, body)
}

/// 预约提醒短信
pub fn reminder_sms(appointment: &Appointment) -> String {
    format!(
        "Reminder: Your {} appointment is on {}. Reply CONFIRM to confirm or CANCEL to cancel.",
        appointment.service_type,
        appointment.scheduled_time.format("%m/%d at %H:%M"),
    )
}

/// 工单自动回复邮件
pub fn ticket_response_email(
    customer: &Customer,
    ticket: &SupportTicket,
    response: &str,
    practice: &str,
) -> (String, String) {
    let subject = format!("Re: {} - Support Ticket #{}", ticket.subject, ticket.id);
    let body = format!(
        "<html>\
            <body style=\"font-family: Arial, sans-serif;\">\
                <h2>Support Ticket Response</h2>\
                <p>Dear {name},</p>\
                <p>Thank you for contacting us. Here's our response:</p>\
                <div style=\"background-color: #f5f5f5; padding: 15px; border-left: 4px solid #007bff; margin: 20px 0;\">\
                    {response}\
                </div>\
                <p>If you have any further questions, please reply to this email.</p>\
                <p>Best regards,<br>Support Team - {practice}</p>\
            </body>\
        </html>",
        name = customer.name,
    );
    (subject, body)
}

/// 术后回访邮件
pub fn follow_up_email(
    customer: &Customer,
    appointment: &Appointment,
    practice: &str,
) -> (String, String) {
    let subject = format!("How was your {} appointment?", appointment.service_type);
    let body = format!(
        "<html>\
            <body style=\"font-family: Arial, sans-serif;\">\
                <h2>Follow-up</h2>\
                <p>Dear {name},</p>\
                <p>We hope your {service} appointment went well!</p>\
                <p>If you have any questions or concerns, please don't hesitate to contact us.</p>\
                <p>We'd love to hear your feedback. Please reply to this email or call us.</p>\
                <p>Best regards,<br>{practice}</p>\
            </body>\
        </html>",
        name = customer.name,
        service = appointment.service_type,
    );
    (subject, body)
}

/// 员工通知邮件，纯文本正文
pub fn staff_notification(appointment: &Appointment, notification_type: &str) -> (String, String) {
    let subject = format!(
        "Staff Notification: {} - {}",
        capitalize(notification_type),
        appointment.service_type
    );
    let body = format!(
        "Appointment ID: {}\nService: {}\nTime: {}",
        appointment.id,
        appointment.service_type,
        appointment.scheduled_time.format("%Y-%m-%d %H:%M:%S UTC"),
    );
    (subject, body)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sample_customer() -> Customer {
        Customer::new(
            "c1".to_string(),
            "Alice Smith".to_string(),
            "alice@example.com".to_string(),
            "+27831234567".to_string(),
        )
    }

    fn sample_appointment() -> Appointment {
        Appointment::new(
            "a1".to_string(),
            "c1".to_string(),
            "Teeth Cleaning".to_string(),
            Utc.with_ymd_and_hms(2025, 1, 10, 10, 0, 0).unwrap(),
            30,
        )
    }

    #[test]
    fn test_confirmation_email_includes_appointment_facts() {
        let (subject, body) = confirmation_email(&sample_customer(), &sample_appointment(), "Makhanda Smiles");
        assert_eq!(subject, "Appointment Confirmation - Teeth Cleaning");
        assert!(body.contains("Dear Alice Smith"));
        assert!(body.contains("2025-01-10 10:00"));
        assert!(body.contains("30 minutes"));
        // 未指定牙医时不渲染对应条目
        assert!(!body.contains("Dentist"));
    }

    #[test]
    fn test_confirmation_email_renders_dentist_when_present() {
        let mut appointment = sample_appointment();
        appointment.dentist = Some("Dr. Naidoo".to_string());
        let (_, body) = confirmation_email(&sample_customer(), &appointment, "Makhanda Smiles");
        assert!(body.contains("Dr. Naidoo"));
    }

    #[test]
    fn test_reminder_sms_format() {
        let sms = reminder_sms(&sample_appointment());
        assert!(sms.contains("Teeth Cleaning"));
        assert!(sms.contains("01/10 at 10:00"));
    }

    #[test]
    fn test_staff_notification_capitalizes_type() {
        let (subject, _) = staff_notification(&sample_appointment(), "appointment");
        assert!(subject.starts_with("Staff Notification: Appointment"));
    }
}
