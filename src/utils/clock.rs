use chrono::{DateTime, Local};

/// Represents an entity responsible for providing the current moment across
/// the application. This allows it to be swapped out for testing.
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}
