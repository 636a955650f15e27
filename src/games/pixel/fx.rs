//! Click pulse: a short colour fade over the pixel after an accepted click.

use std::cell::{Cell, RefCell};

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::style::Color;
use ratzilla::ratatui::Frame;
use tachyonfx::{fx, Duration, Effect, EffectRenderer, Interpolation};

/// Length of one pulse.
const PULSE_MS: u32 = 300;

/// Rendering runs through `&self`, so the effect and the time it owes are
/// kept in cells.
#[derive(Default)]
pub struct ClickPulse {
    effect: RefCell<Option<Effect>>,
    /// Milliseconds elapsed since the effect was last processed.
    pending_ms: Cell<f64>,
}

impl ClickPulse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restart the pulse, fading in from `color`.
    pub fn trigger(&mut self, color: Color) {
        *self.effect.get_mut() = Some(fx::fade_from_fg(color, (PULSE_MS, Interpolation::QuadOut)));
        self.pending_ms.set(0.0);
    }

    /// Accumulate frame time; it is consumed at the next render.
    pub fn advance(&mut self, delta_ms: f64) {
        if self.effect.get_mut().is_some() {
            let pending = self.pending_ms.get() + delta_ms.max(0.0);
            self.pending_ms.set(pending.min(PULSE_MS as f64));
        }
    }

    #[cfg(test)]
    pub fn is_active(&self) -> bool {
        self.effect.borrow().is_some()
    }

    /// Apply the running effect to what was just drawn in `area`.
    pub fn render(&self, f: &mut Frame, area: Rect) {
        let mut slot = self.effect.borrow_mut();
        let Some(effect) = slot.as_mut() else {
            return;
        };
        let elapsed = self.pending_ms.replace(0.0);
        f.render_effect(effect, area, Duration::from_millis(elapsed.round() as _));
        if effect.done() {
            *slot = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_until_triggered() {
        let mut pulse = ClickPulse::new();
        assert!(!pulse.is_active());
        pulse.advance(50.0);
        assert_eq!(pulse.pending_ms.get(), 0.0);
        pulse.trigger(Color::White);
        assert!(pulse.is_active());
    }

    #[test]
    fn pending_time_is_capped_at_one_pulse() {
        let mut pulse = ClickPulse::new();
        pulse.trigger(Color::Yellow);
        pulse.advance(10_000.0);
        assert_eq!(pulse.pending_ms.get(), PULSE_MS as f64);
    }

    #[test]
    fn retrigger_resets_pending_time() {
        let mut pulse = ClickPulse::new();
        pulse.trigger(Color::Yellow);
        pulse.advance(120.0);
        pulse.trigger(Color::Yellow);
        assert_eq!(pulse.pending_ms.get(), 0.0);
    }
}
