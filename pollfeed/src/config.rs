//! Store configuration.

use std::time::Duration;

/// Default pause between data arriving and the state revealing it.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(2500);

/// Default capacity of the event broadcast channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

pub const DEFAULT_PAGE_TITLE: &str = "Discover";

#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// How long the loading placeholder stays visible after a load
    /// completes. Zero applies the final state immediately.
    pub settle_delay: Duration,
    /// Title of the list page.
    pub page_title: String,
    /// Buffered events per subscriber before slow readers start lagging.
    pub event_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            settle_delay: DEFAULT_SETTLE_DELAY,
            page_title: DEFAULT_PAGE_TITLE.to_string(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl StoreConfig {
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// No settling delay; state transitions land as soon as data does.
    pub fn immediate() -> Self {
        Self::default().with_settle_delay(Duration::ZERO)
    }
}
