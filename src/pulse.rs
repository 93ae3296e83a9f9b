use std::time::{Duration, SystemTime};

/// A transient flag with a deadline: set, auto-clears on the next tick past
/// its duration, and can be cancelled outright when its screen goes away.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pulse {
    deadline: Option<SystemTime>,
}

impl Pulse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the pulse for `duration` starting now
    pub fn fire(&mut self, duration: Duration) {
        self.deadline = Some(SystemTime::now() + duration);
    }

    pub fn is_active(&self) -> bool {
        self.deadline.is_some()
    }

    /// Clear the pulse once its deadline has passed
    pub fn expire(&mut self, now: SystemTime) {
        if let Some(deadline) = self.deadline {
            if now >= deadline {
                self.deadline = None;
            }
        }
    }

    /// Unconditional clear; used on any transition that leaves the screen
    /// the pulse was feeding
    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}
