pub mod context;
pub mod engine;
pub mod tasks;
pub mod templates;
pub mod workflow;

#[cfg(test)]
pub mod test_utils;

pub use context::{SharedAppointment, SharedCustomer, SharedTicket, WorkflowContext};
pub use engine::{EngineStatistics, WorkflowEngine};
pub use tasks::{
    NotifyStaffTask, ResolveSupportTicketTask, SendAppointmentConfirmationTask,
    SendAppointmentReminderTask, TaskResult, UpdateLoyaltyPointsTask, WorkflowTask,
};
pub use workflow::{Workflow, WorkflowStatus, WorkflowSummary};
