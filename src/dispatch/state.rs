//! Mirror of the state last applied to the strip.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;

/// What the dispatcher believes the strip is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DeviceState {
    pub is_on: bool,
    pub brightness: u8,
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at brightness {}",
            if self.is_on { "on" } else { "off" },
            self.brightness
        )
    }
}

/// Read-only handle on the dispatcher's `DeviceState`.
///
/// The dispatcher publishes into it after each applied change; the write lock
/// is only held for a copy, never across a transmission.
#[derive(Debug, Clone, Default)]
pub struct StateView {
    inner: Arc<RwLock<DeviceState>>,
}

impl StateView {
    /// Current state, copied out
    pub fn snapshot(&self) -> DeviceState {
        *self.inner.read()
    }

    pub(crate) fn publish(&self, state: DeviceState) {
        *self.inner.write() = state;
    }
}
