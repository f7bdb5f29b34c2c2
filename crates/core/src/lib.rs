pub mod config;
pub mod errors;
pub mod models;
pub mod traits;

pub use config::{AppConfig, EngineConfig, NotificationConfig, SchedulerConfig};
pub use errors::*;
pub use models::{
    Appointment, AppointmentStatus, Customer, SupportTicket, TicketMessage, TicketPriority,
    TicketStatus,
};
pub use traits::{EmailNotifier, SmsNotifier};

/// 统一的Result类型
pub type AutomationResult<T> = std::result::Result<T, AutomationError>;
