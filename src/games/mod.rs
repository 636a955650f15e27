/// Game trait implemented by the game shell.

pub mod pixel;

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::Frame;

use crate::input::{ClickState, InputEvent};
use crate::time::FrameTime;

/// Trait that all games implement.
pub trait Game {
    /// Handle an input event. Returns true if the event was consumed.
    fn handle_input(&mut self, event: &InputEvent) -> bool;

    /// Advance game logic to the frame's timestamp.
    fn tick(&mut self, frame: FrameTime);

    /// Render the game into the given area.
    fn render(&self, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>);

    /// Persist immediately, bypassing any debounce (page hide / unload).
    fn flush_save(&mut self);
}
