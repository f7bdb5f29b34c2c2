pub mod appointment;
pub mod customer;
pub mod ticket;

pub use appointment::{Appointment, AppointmentStatus};
pub use customer::Customer;
pub use ticket::{SupportTicket, TicketMessage, TicketPriority, TicketStatus};
