//! Frame clock: turns the variable-rate `draw_web()` callback into discrete
//! ticks plus a monotonically advancing millisecond timestamp.
//!
//! Ticks drive visual timers (flashes). The millisecond timestamp drives
//! everything measured in real time: the click throttle window, mine
//! schedules and the save debounce.

pub struct FrameClock {
    ms_per_tick: f64,
    /// Milliseconds not yet consumed as whole ticks.
    carry: f64,
    last_ms: Option<f64>,
    pub total_ticks: u64,
}

/// One frame's worth of elapsed time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    pub now_ms: f64,
    pub delta_ms: f64,
    pub ticks: u32,
}

/// Visual timers stop advancing past this gap (backgrounded tab).
const MAX_TICK_DELTA_MS: f64 = 500.0;

impl FrameClock {
    pub fn new(ticks_per_sec: u32) -> Self {
        Self {
            ms_per_tick: 1000.0 / ticks_per_sec.max(1) as f64,
            carry: 0.0,
            last_ms: None,
            total_ticks: 0,
        }
    }

    /// Feed the current timestamp (`performance.now()`).
    ///
    /// `delta_ms` is the real gap since the previous frame and is never
    /// negative. Ticks are derived from a clamped gap so a long-hidden tab
    /// does not replay minutes of animation in one frame; real-time
    /// consumers use `now_ms` directly and do their own catch-up.
    pub fn advance(&mut self, now_ms: f64) -> FrameTime {
        let delta_ms = match self.last_ms {
            Some(prev) => (now_ms - prev).max(0.0),
            None => 0.0,
        };
        self.last_ms = Some(now_ms);

        self.carry += delta_ms.min(MAX_TICK_DELTA_MS);
        let ticks = (self.carry / self.ms_per_tick) as u32;
        self.carry -= ticks as f64 * self.ms_per_tick;
        self.total_ticks += ticks as u64;

        FrameTime {
            now_ms,
            delta_ms,
            ticks,
        }
    }
}

/// Current high-resolution timestamp in milliseconds.
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    use std::sync::OnceLock;
    use std::time::Instant;

    static START: OnceLock<Instant> = OnceLock::new();
    START.get_or_init(Instant::now).elapsed().as_secs_f64() * 1000.0
}

/// Wall-clock epoch milliseconds, stamped into saves.
#[cfg(target_arch = "wasm32")]
pub fn epoch_ms() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn epoch_ms() -> f64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as f64)
        .unwrap_or(0.0)
}
