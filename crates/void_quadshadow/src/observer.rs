//! Quadrant Switch Observers
//!
//! Hooks invoked when the viewer moves into a different quadrant. Nothing is
//! reported unless an observer is registered on the allocator.

use parking_lot::Mutex;
use serde::{Serialize, Deserialize};

use crate::quadrant::QUADRANT_COUNT;

/// Emitted when the high-resolution quadrant changes
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuadrantSwitch {
    /// Frame number the switch happened on
    pub frame: u64,
    /// Previously active quadrant
    pub from: usize,
    /// Newly active quadrant
    pub to: usize,
    /// Quadrant rendered by each slot after the switch
    pub slot_quadrants: [usize; QUADRANT_COUNT],
}

/// Receives quadrant switch events
pub trait QuadrantObserver: Send + Sync {
    /// Called after the new frustum assignment is in place
    fn on_quadrant_switch(&self, event: &QuadrantSwitch);
}

/// Forwards switch events to the `log` facade at debug level
#[derive(Clone, Copy, Debug, Default)]
pub struct LogObserver;

impl QuadrantObserver for LogObserver {
    fn on_quadrant_switch(&self, event: &QuadrantSwitch) {
        log::debug!(
            "Frame {}: high-resolution quadrant {} -> {} (slots {:?})",
            event.frame, event.from, event.to, event.slot_quadrants
        );
    }
}

/// Keeps every switch event in memory
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<QuadrantSwitch>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the recorded events
    pub fn events(&self) -> Vec<QuadrantSwitch> {
        self.events.lock().clone()
    }

    /// Number of recorded events
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// True if nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Drop recorded events
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl QuadrantObserver for RecordingObserver {
    fn on_quadrant_switch(&self, event: &QuadrantSwitch) {
        self.events.lock().push(event.clone());
    }
}

// Lets callers keep a handle to an observer they registered
impl<T: QuadrantObserver + ?Sized> QuadrantObserver for std::sync::Arc<T> {
    fn on_quadrant_switch(&self, event: &QuadrantSwitch) {
        (**self).on_quadrant_switch(event);
    }
}
