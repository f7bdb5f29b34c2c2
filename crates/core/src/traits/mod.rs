pub mod notifier;

pub use notifier::{EmailNotifier, SmsNotifier};
