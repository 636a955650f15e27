//! Sliding-window click rate cap.

use std::collections::VecDeque;

/// Clicks are counted over this trailing window.
pub const WINDOW_MS: f64 = 1000.0;

/// Timestamps of clicks accepted within the last [`WINDOW_MS`].
#[derive(Debug, Default)]
pub struct ClickThrottle {
    accepted: VecDeque<f64>,
}

impl ClickThrottle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept a click at `now_ms` if fewer than `cap` clicks were accepted in
    /// the trailing window. Accepted clicks are recorded; rejected ones are not.
    pub fn try_accept(&mut self, now_ms: f64, cap: u32) -> bool {
        self.evict(now_ms);
        if self.accepted.len() >= cap as usize {
            return false;
        }
        self.accepted.push_back(now_ms);
        true
    }

    /// Accepted clicks still inside the window at `now_ms`.
    #[cfg(test)]
    fn recent(&mut self, now_ms: f64) -> usize {
        self.evict(now_ms);
        self.accepted.len()
    }

    /// Drop clicks older than the window. One exactly `WINDOW_MS` old still
    /// counts.
    fn evict(&mut self, now_ms: f64) {
        let cutoff = now_ms - WINDOW_MS;
        while self.accepted.front().is_some_and(|&t| t < cutoff) {
            self.accepted.pop_front();
        }
    }
}
