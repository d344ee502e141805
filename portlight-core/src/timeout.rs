//! Activity timeouts
//!
//! A timeout is either idle or running from a start timestamp. It only
//! advances when polled; there is no background timer. Timestamps come
//! from a free-running millisecond counter and may wrap.

/// One-shot inactivity timeout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timeout {
    /// Window length; 0 disables expiry
    duration_ms: u32,
    /// Start of the current window, `None` when idle
    started_ms: Option<u32>,
}

impl Default for Timeout {
    fn default() -> Self {
        Self::disabled()
    }
}

impl Timeout {
    /// A timeout that never expires
    pub const fn disabled() -> Self {
        Self::new(0)
    }

    /// Create an idle timeout with the given window
    pub const fn new(duration_ms: u32) -> Self {
        Self {
            duration_ms,
            started_ms: None,
        }
    }

    /// Change the window length
    pub fn set_duration(&mut self, duration_ms: u32) {
        self.duration_ms = duration_ms;
    }

    /// Start or restart the window at `now_ms`
    pub fn start(&mut self, now_ms: u32) {
        self.started_ms = Some(now_ms);
    }

    /// Check if a window is open
    pub fn is_running(&self) -> bool {
        self.started_ms.is_some()
    }

    /// Check for expiry at `now_ms`
    ///
    /// Returns true exactly once per window, when more than `duration_ms`
    /// has elapsed; the timeout is idle afterwards.
    pub fn poll_expired(&mut self, now_ms: u32) -> bool {
        if self.duration_ms == 0 {
            return false;
        }
        let Some(started) = self.started_ms else {
            return false;
        };

        if now_ms.wrapping_sub(started) > self.duration_ms {
            self.started_ms = None;
            true
        } else {
            false
        }
    }
}
