pub mod follow_up;
pub mod maintenance;
pub mod reminder;
pub mod scheduler;
pub mod task;

pub use follow_up::FollowUpScheduler;
pub use maintenance::MaintenanceScheduler;
pub use reminder::ReminderScheduler;
pub use scheduler::TaskScheduler;
pub use task::{ScheduleType, ScheduledTask, TaskCallback, TaskStatusSnapshot};
