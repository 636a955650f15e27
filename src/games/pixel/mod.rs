/// Pixel Clicker: click a pixel, unlock a shop, buy your way into features.

pub mod actions;
pub mod catalog;
pub mod fx;
pub mod logic;
pub mod mines;
pub mod render;
pub mod save;
pub mod state;
pub mod throttle;

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::Frame;
use tracing::{debug, info, warn};

use crate::config::GameConfig;
use crate::games::Game;
use crate::input::{ClickState, InputEvent};
use crate::time::FrameTime;

use actions::*;
use fx::ClickPulse;
use save::SaveQueue;
use state::{PixelState, Theme, View};

pub struct PixelGame {
    pub state: PixelState,
    config: GameConfig,
    save_queue: SaveQueue,
    pulse: ClickPulse,
    /// Timestamp of the latest frame, used to stamp input.
    now_ms: f64,
}

impl PixelGame {
    pub fn new(config: GameConfig, seed: u64) -> Self {
        Self {
            state: PixelState::new(seed),
            save_queue: SaveQueue::new(config.save_debounce_ms),
            config,
            pulse: ClickPulse::new(),
            now_ms: 0.0,
        }
    }

    /// Restore a stored game, if any.
    #[cfg(target_arch = "wasm32")]
    pub fn load(&mut self) -> bool {
        save::load_game(&mut self.state)
    }

    fn queue_save(&mut self) {
        self.save_queue.queue(self.now_ms);
    }

    fn click(&mut self) {
        if logic::click(&mut self.state, &self.config, self.now_ms) {
            let color = render::theme_color(self.state.profile().theme);
            self.pulse.trigger(color);
            self.queue_save();
        }
    }

    fn toggle_shop(&mut self) {
        let was_unlocked = self.state.shop_unlocked();
        match logic::toggle_shop(&mut self.state) {
            Ok(()) if !was_unlocked => self.queue_save(),
            Ok(()) => {}
            Err(e) => self.state.add_log(&e.to_string(), false),
        }
    }

    fn buy(&mut self, result: Result<(), crate::error::PurchaseError>) {
        match result {
            Ok(()) => self.queue_save(),
            Err(e) => {
                debug!(error = %e, "purchase refused");
                self.state.add_log(&e.to_string(), false);
            }
        }
    }

    fn profile_result<T>(&mut self, result: Result<T, crate::error::ProfileError>) {
        match result {
            Ok(_) => self.queue_save(),
            Err(e) => self.state.add_log(&e.to_string(), false),
        }
    }

    fn set_theme(&mut self, index: usize) {
        let Some(&theme) = Theme::all().get(index) else {
            return;
        };
        if logic::set_theme(&mut self.state, theme) {
            self.queue_save();
        } else {
            self.state.add_log(&format!("{} is locked.", theme.name()), false);
        }
    }

    fn handle_click(&mut self, id: u16) -> bool {
        match id {
            CLICK_PIXEL => self.click(),
            TOGGLE_SHOP => self.toggle_shop(),
            OPEN_MENU => {
                logic::open_menu(&mut self.state);
            }
            BACK => logic::go_back(&mut self.state),
            SHOP_PREV => logic::move_cursor(&mut self.state, -1),
            SHOP_NEXT => logic::move_cursor(&mut self.state, 1),
            OPEN_PROFILES => {
                logic::open_screen(&mut self.state, View::Profiles);
            }
            OPEN_CUSTOMIZE => {
                logic::open_screen(&mut self.state, View::Customize);
            }
            NEW_PROFILE => {
                let r = logic::create_profile(&mut self.state);
                self.profile_result(r);
            }
            DELETE_PROFILE => {
                let active = self.state.active;
                let r = logic::delete_profile(&mut self.state, active);
                self.profile_result(r);
            }
            id if (SELECT_PROFILE_BASE..SELECT_PROFILE_BASE + state::MAX_PROFILES as u16)
                .contains(&id) =>
            {
                let r = logic::select_profile(&mut self.state, (id - SELECT_PROFILE_BASE) as usize);
                self.profile_result(r);
            }
            id if (BUY_ITEM_BASE..BUY_ITEM_BASE + catalog::CATALOG.len() as u16).contains(&id) => {
                let idx = (id - BUY_ITEM_BASE) as usize;
                if let Some(pos) = logic::visible_items(&self.state)
                    .iter()
                    .position(|(i, _)| *i == idx)
                {
                    self.state.shop_cursor = pos;
                }
                let r = logic::buy_item(&mut self.state, catalog::CATALOG[idx].id);
                self.buy(r);
            }
            id if (SELECT_THEME_BASE..SELECT_THEME_BASE + Theme::all().len() as u16)
                .contains(&id) =>
            {
                self.set_theme((id - SELECT_THEME_BASE) as usize);
            }
            _ => return false,
        }
        true
    }

    fn handle_key(&mut self, key: char) -> bool {
        // Keys that work everywhere.
        match key {
            'c' | ' ' => {
                self.click();
                return true;
            }
            's' => {
                if logic::can_see_shop_button(&self.state) {
                    self.toggle_shop();
                }
                return true;
            }
            'm' => {
                match self.state.view {
                    View::Menu | View::Profiles | View::Customize => logic::go_back(&mut self.state),
                    _ => {
                        logic::open_menu(&mut self.state);
                    }
                }
                return true;
            }
            _ => {}
        }

        match self.state.view {
            View::Shop => match key {
                'j' => logic::move_cursor(&mut self.state, 1),
                'k' => logic::move_cursor(&mut self.state, -1),
                'b' => {
                    let r = logic::buy_at_cursor(&mut self.state);
                    self.buy(r);
                }
                _ => return false,
            },
            View::Menu => match key {
                'p' => {
                    logic::open_screen(&mut self.state, View::Profiles);
                }
                't' => {
                    logic::open_screen(&mut self.state, View::Customize);
                }
                _ => return false,
            },
            View::Profiles => match key {
                '1'..='5' => {
                    let r = logic::select_profile(&mut self.state, (key as u8 - b'1') as usize);
                    self.profile_result(r);
                }
                'n' => {
                    let r = logic::create_profile(&mut self.state);
                    self.profile_result(r);
                }
                'd' => {
                    let active = self.state.active;
                    let r = logic::delete_profile(&mut self.state, active);
                    self.profile_result(r);
                }
                _ => return false,
            },
            View::Customize => match key {
                '1'..='4' => self.set_theme((key as u8 - b'1') as usize),
                _ => return false,
            },
            View::Game => return false,
        }
        true
    }
}

impl Game for PixelGame {
    fn handle_input(&mut self, event: &InputEvent) -> bool {
        match event {
            InputEvent::Key(c) => self.handle_key(*c),
            InputEvent::Click(id) => self.handle_click(*id),
            InputEvent::Back => {
                logic::go_back(&mut self.state);
                true
            }
            InputEvent::Up if self.state.view == View::Shop => {
                logic::move_cursor(&mut self.state, -1);
                true
            }
            InputEvent::Down if self.state.view == View::Shop => {
                logic::move_cursor(&mut self.state, 1);
                true
            }
            InputEvent::Confirm if self.state.view == View::Shop => {
                let r = logic::buy_at_cursor(&mut self.state);
                self.buy(r);
                true
            }
            InputEvent::Up | InputEvent::Down | InputEvent::Confirm => false,
        }
    }

    fn tick(&mut self, frame: FrameTime) {
        self.now_ms = frame.now_ms;
        logic::tick_flashes(&mut self.state, frame.ticks);
        self.pulse.advance(frame.delta_ms);

        let reports = mines::poll_mines(&mut self.state, &self.config, frame.now_ms);
        let mut paid = false;
        for report in reports.iter().filter(|r| r.credited > 0) {
            let name = self.state.profiles[report.profile].name.clone();
            let text = format!(
                "Mine: {}/{} heads, +{} cash ({name})",
                report.heads,
                report.coins,
                logic::format_number(report.credited)
            );
            self.state.add_log(&text, false);
            debug!(profile = %name, heads = report.heads, credited = report.credited, "mine round");
            paid = true;
        }
        if paid {
            self.queue_save();
        }

        if self.save_queue.take_due(frame.now_ms) {
            self.write_save();
        }
    }

    fn render(&self, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
        render::render(&self.state, &self.config, &self.pulse, f, area, click_state);
    }

    fn flush_save(&mut self) {
        self.save_queue.clear();
        self.write_save();
        info!("saved on page hide");
    }
}

impl PixelGame {
    #[cfg(target_arch = "wasm32")]
    fn write_save(&mut self) {
        if let Err(e) = save::save_game(&self.state) {
            warn!("save failed: {e}");
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn write_save(&mut self) {
        warn!("no storage on this target; save skipped");
    }
}
