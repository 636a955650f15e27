mod config;
mod error;
mod games;
mod input;
mod logging;
mod time;
mod widgets;

use std::{cell::RefCell, io, rc::Rc};

use games::pixel::PixelGame;
use games::Game;
use input::{ClickState, InputEvent};
use ratzilla::event::{KeyCode, MouseButton, MouseEventKind};
use ratzilla::ratatui::Terminal;
use ratzilla::{DomBackend, WebRenderer};
use time::FrameClock;
use tracing::{debug, info};

/// Query the grid container's bounding rect and convert a pointer position
/// to a terminal cell.
fn dom_pixel_to_cell(mouse_x: u32, mouse_y: u32, cs: &ClickState) -> Option<(u16, u16)> {
    let window = web_sys::window()?;
    let document = window.document()?;

    // DomBackend creates a <div> as the grid container inside <body>.
    let grid = document.query_selector("body > div").ok()??;
    let rect = grid.get_bounding_client_rect();

    let offset = (mouse_x as f64 - rect.left(), mouse_y as f64 - rect.top());
    cs.pixel_to_cell(offset, (rect.width(), rect.height()))
}

/// Write the save right away when the tab is hidden or the page unloads.
#[cfg(target_arch = "wasm32")]
fn install_page_hide_save(game: &Rc<RefCell<PixelGame>>) {
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::JsCast;

    let Some(window) = web_sys::window() else {
        return;
    };
    let Some(document) = window.document() else {
        return;
    };

    // Skip if a handler is already mid-update; the debounced save covers it.
    let flush = {
        let game = game.clone();
        move || {
            if let Ok(mut g) = game.try_borrow_mut() {
                g.flush_save();
            }
        }
    };

    let on_visibility = Closure::<dyn FnMut(web_sys::Event)>::new({
        let flush = flush.clone();
        let document = document.clone();
        move |_: web_sys::Event| {
            if document.visibility_state() == web_sys::VisibilityState::Hidden {
                flush();
            }
        }
    });
    if let Err(e) = document
        .add_event_listener_with_callback("visibilitychange", on_visibility.as_ref().unchecked_ref())
    {
        tracing::warn!("visibilitychange listener failed: {e:?}");
    }
    on_visibility.forget();

    let on_unload = Closure::<dyn FnMut(web_sys::Event)>::new(move |_: web_sys::Event| flush());
    if let Err(e) =
        window.add_event_listener_with_callback("beforeunload", on_unload.as_ref().unchecked_ref())
    {
        tracing::warn!("beforeunload listener failed: {e:?}");
    }
    on_unload.forget();
}

fn main() -> io::Result<()> {
    console_error_panic_hook::set_once();

    let config = config::load();
    logging::init(&config.log_level);
    info!(?config, "starting");

    let clock = RefCell::new(FrameClock::new(config.ticks_per_sec));
    let pixel = PixelGame::new(config, time::epoch_ms() as u64);
    #[cfg(target_arch = "wasm32")]
    let pixel = {
        let mut pixel = pixel;
        pixel.load();
        pixel
    };
    let game = Rc::new(RefCell::new(pixel));
    let click_state = Rc::new(RefCell::new(ClickState::new()));

    #[cfg(target_arch = "wasm32")]
    install_page_hide_save(&game);

    let backend = DomBackend::new()?;
    let terminal = Terminal::new(backend)?;

    // Mouse/touch click handler
    terminal.on_mouse_event({
        let game = game.clone();
        let click_state = click_state.clone();
        move |mouse_event| {
            if mouse_event.event != MouseEventKind::Pressed
                || mouse_event.button != MouseButton::Left
            {
                return;
            }

            let cs = click_state.borrow();
            if cs.terminal_rows == 0 || cs.terminal_cols == 0 {
                return;
            }
            let Some((col, row)) = dom_pixel_to_cell(mouse_event.x, mouse_event.y, &cs) else {
                return;
            };
            let action = cs.hit_test(col, row);
            drop(cs);

            debug!(col, row, ?action, "pointer");
            if let Some(id) = action {
                game.borrow_mut().handle_input(&InputEvent::Click(id));
            }
        }
    });

    // Keyboard handler
    terminal.on_key_event({
        let game = game.clone();
        move |key_event| {
            let event = match key_event.code {
                KeyCode::Char(c) => InputEvent::Key(c.to_ascii_lowercase()),
                KeyCode::Esc => InputEvent::Back,
                KeyCode::Enter => InputEvent::Confirm,
                KeyCode::Up => InputEvent::Up,
                KeyCode::Down => InputEvent::Down,
                _ => return,
            };
            game.borrow_mut().handle_input(&event);
        }
    });

    terminal.draw_web(move |f| {
        let frame = clock.borrow_mut().advance(time::now_ms());
        let mut g = game.borrow_mut();
        g.tick(frame);

        let area = f.area();
        click_state.borrow_mut().reset(area);
        g.render(f, area, &click_state);
    });

    Ok(())
}
