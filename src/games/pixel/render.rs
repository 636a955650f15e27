//! Pixel Clicker rendering.

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratzilla::ratatui::Frame;

use crate::config::GameConfig;
use crate::input::{is_narrow_layout, ClickState};
use crate::widgets::{Button, ClickableList};

use super::actions::*;
use super::catalog::{self, Feature, SHOP_FEATURE_COST};
use super::fx::ClickPulse;
use super::logic::{self, format_number};
use super::mines;
use super::state::{PixelState, Theme, View, MAX_PROFILES};

/// Pixel colour for each theme.
pub fn theme_color(theme: Theme) -> Color {
    match theme {
        Theme::Classic => Color::Cyan,
        Theme::Mono => Color::White,
        Theme::Neon => Color::Magenta,
        Theme::Gold => Color::Yellow,
    }
}

pub fn render(
    state: &PixelState,
    config: &GameConfig,
    pulse: &ClickPulse,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // header
            Constraint::Length(3), // shop / menu buttons
            Constraint::Min(6),    // view body
            Constraint::Length(1), // key help
        ])
        .split(area);

    render_header(state, config, f, chunks[0]);
    render_nav_buttons(state, f, chunks[1], click_state);

    // Log panel to the right on wide screens, below the body otherwise.
    let (body, log_area) = if !is_narrow_layout(area.width) {
        let h = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
            .split(chunks[2]);
        (h[0], h[1])
    } else {
        let v = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(6), Constraint::Length(5)])
            .split(chunks[2]);
        (v[0], v[1])
    };

    match state.view {
        View::Game => render_pixel(state, config, pulse, f, body, click_state),
        View::Shop => render_shop(state, f, body, click_state),
        View::Menu => render_menu(state, f, body, click_state),
        View::Profiles => render_profiles(state, f, body, click_state),
        View::Customize => render_customize(state, f, body, click_state),
    }
    render_log(state, f, log_area);
    render_help(state, f, chunks[3]);
}

fn render_header(state: &PixelState, config: &GameConfig, f: &mut Frame, area: Rect) {
    let profile = state.profile();
    let cash_style = if state.purchase_flash > 0 {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Green)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    };

    let mut status = vec![Span::styled(
        format!(" {} ", profile.name),
        Style::default().fg(Color::Cyan),
    )];
    status.push(Span::styled(
        format!(" {}/s cap ", logic::click_rate_cap(state, config)),
        Style::default().fg(Color::DarkGray),
    ));
    if state.throttle_flash > 0 {
        status.push(Span::styled(
            " Too fast! ",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
    }

    let lines = vec![
        Line::from(Span::styled(
            format!(" Cash: {}", format_number(profile.cash)),
            cash_style,
        )),
        Line::from(status),
    ];
    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Pixel Clicker "),
    );
    f.render_widget(widget, area);
}

/// Shop toggle on the left, menu on the right once owned.
fn render_nav_buttons(
    state: &PixelState,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let show_shop = logic::can_see_shop_button(state);
    let show_menu = logic::has_feature(state, Feature::Menu);
    if !show_shop && !show_menu {
        return;
    }

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    let mut cs = click_state.borrow_mut();

    if show_shop {
        let label = if !state.shop_unlocked() {
            format!("🔒 Unlock Shop ({SHOP_FEATURE_COST} cash)")
        } else if state.view == View::Shop {
            "Close Shop".to_string()
        } else {
            "Open Shop".to_string()
        };
        Button::new(label, TOGGLE_SHOP)
            .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            .border_style(Style::default().fg(Color::Yellow))
            .render(f, cols[0], &mut cs);
    }
    if show_menu {
        let active = matches!(state.view, View::Menu | View::Profiles | View::Customize);
        let (label, action) = if active { ("Close Menu", BACK) } else { ("Menu", OPEN_MENU) };
        Button::new(label, action)
            .style(Style::default().fg(Color::Cyan))
            .border_style(Style::default().fg(Color::Cyan))
            .render(f, cols[1], &mut cs);
    }
}

fn render_pixel(
    state: &PixelState,
    config: &GameConfig,
    pulse: &ClickPulse,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let profile = state.profile();
    let coins = mines::coin_count(profile, &state.global_unlocks);
    let stats_rows = if coins > 0 { 3 } else { 2 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(stats_rows)])
        .split(area);

    let color = theme_color(profile.theme);
    let (fill, text) = if state.click_flash > 0 {
        (Color::White, Color::Black)
    } else {
        (color, Color::Black)
    };
    let pixel_area = chunks[0];
    {
        let mut cs = click_state.borrow_mut();
        Button::new("█ CLICK █", CLICK_PIXEL)
            .style(Style::default().fg(text).bg(fill).add_modifier(Modifier::BOLD))
            .border_style(Style::default().fg(color))
            .render(f, pixel_area, &mut cs);
    }
    pulse.render(f, pixel_area);

    let mut lines = vec![Line::from(Span::styled(
        format!(
            " Clicks: {}   Earned: {}",
            format_number(profile.total_clicks),
            format_number(profile.lifetime_cash)
        ),
        Style::default().fg(Color::DarkGray),
    ))];
    if coins > 0 {
        let interval = mines::interval_ms(profile, &state.global_unlocks, config);
        let payout = mines::payout_per_head(profile, &state.global_unlocks, config);
        lines.push(Line::from(Span::styled(
            format!(
                " Mine: {coins} coin(s) every {:.1}s, {} per head",
                interval / 1000.0,
                format_number(payout)
            ),
            Style::default().fg(Color::Yellow),
        )));
    }
    if !logic::can_see_shop_button(state) {
        let needed = SHOP_FEATURE_COST.saturating_sub(profile.cash);
        lines.push(Line::from(Span::styled(
            format!(" {needed} more cash until something happens."),
            Style::default().fg(Color::DarkGray),
        )));
    }
    f.render_widget(Paragraph::new(lines), chunks[1]);
}

fn render_shop(
    state: &PixelState,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let visible = logic::visible_items(state);
    let cash = state.profile().cash;
    let mut cl = ClickableList::new();
    // First and one-past-last line of each card, separator excluded.
    let mut cards = Vec::with_capacity(visible.len());

    for (pos, &(idx, item)) in visible.iter().enumerate() {
        let first = cl.next_index();
        let owned = logic::is_owned(state, item);
        let affordable = cash >= item.cost;
        let selected = pos == state.shop_cursor;
        let action = BUY_ITEM_BASE + idx as u16;

        let marker = if selected { "▶ " } else { "  " };
        let name_style = if owned {
            Style::default().fg(Color::DarkGray)
        } else if selected {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
        };
        let mut title = vec![Span::styled(format!("{marker}{}", item.name), name_style)];
        if item.scope == catalog::Scope::Global {
            title.push(Span::styled(" (all profiles)", Style::default().fg(Color::Cyan)));
        }
        cl.push(Line::from(title));
        cl.push(Line::from(Span::styled(
            format!("    {}", item.blurb),
            Style::default().fg(Color::Gray),
        )));
        cl.push(Line::from(vec![
            Span::styled(
                format!("    Cost: {} cash", format_number(item.cost)),
                Style::default().fg(Color::Green),
            ),
            Span::styled(
                format!("   Unlocks: {}", catalog::unlock_names(item)),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
        if owned {
            cl.push(Line::from(Span::styled(
                "    ✓ Owned",
                Style::default().fg(Color::DarkGray),
            )));
        } else if affordable {
            cl.push_clickable(
                Line::from(Span::styled(
                    format!("    ▸ Buy ({} cash)", format_number(item.cost)),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                )),
                action,
            );
        } else {
            cl.push(Line::from(Span::styled(
                format!("    Buy ({} cash)", format_number(item.cost)),
                Style::default().fg(Color::DarkGray),
            )));
        }
        cards.push((first, cl.next_index()));
        cl.push("");
    }
    if visible.is_empty() {
        cl.push(Line::from(Span::styled(
            " The shelves are empty.",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let (list_area, pager) = if visible.len() > 1 {
        let v = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .split(area);
        (v[0], Some(v[1]))
    } else {
        (area, None)
    };

    let border_color = if state.purchase_flash > 0 { Color::Green } else { Color::Yellow };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(format!(" Shop ({} items) ", visible.len()));

    // Keep the highlighted card on screen, measured in wrapped rows.
    let inner = block.inner(list_area);
    let starts = cl.line_starts(inner.width);
    let scroll = cards
        .get(state.shop_cursor)
        .map_or(0, |&(first, end)| {
            card_scroll(starts[first], starts[end], inner.height as usize)
        });

    let mut cs = click_state.borrow_mut();
    cl.render(f, list_area, block, scroll, &mut cs);
    if let Some(pager) = pager {
        render_shop_pager(f, pager, &mut cs);
    }
}

/// Scroll offset that shows a card's bottom row, or its top row if the card
/// is taller than the viewport.
fn card_scroll(top: usize, bottom: usize, viewport: usize) -> u16 {
    bottom.saturating_sub(viewport).min(top) as u16
}

/// Previous/next card targets under the shop list for pointer players.
fn render_shop_pager(f: &mut Frame, area: Rect, cs: &mut ClickState) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    let style = Style::default().fg(Color::Yellow);
    f.render_widget(Paragraph::new(Span::styled(" ▲ Previous", style)), halves[0]);
    f.render_widget(Paragraph::new(Span::styled("▼ Next ", style)).alignment(Alignment::Right), halves[1]);
    cs.add_click_target(halves[0], SHOP_PREV);
    cs.add_click_target(halves[1], SHOP_NEXT);
}

fn render_menu(
    state: &PixelState,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let mut cl = ClickableList::new();
    cl.push("");
    if logic::has_feature(state, Feature::Profiles) {
        cl.push_clickable(
            Line::from(Span::styled(" ▸ Save Profiles", Style::default().fg(Color::Cyan))),
            OPEN_PROFILES,
        );
    }
    if logic::has_feature(state, Feature::Customize) {
        cl.push_clickable(
            Line::from(Span::styled(" ▸ Customize", Style::default().fg(Color::Magenta))),
            OPEN_CUSTOMIZE,
        );
    }
    if !logic::has_feature(state, Feature::Profiles) && !logic::has_feature(state, Feature::Customize) {
        cl.push(Line::from(Span::styled(
            " Nothing here yet. The shop may help.",
            Style::default().fg(Color::DarkGray),
        )));
    }
    cl.push("");
    cl.push_clickable(
        Line::from(Span::styled(" ◂ Back", Style::default().fg(Color::DarkGray))),
        BACK,
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Menu ");
    let mut cs = click_state.borrow_mut();
    cl.render(f, area, block, 0, &mut cs);
}

fn render_profiles(
    state: &PixelState,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let mut cl = ClickableList::new();
    for (i, profile) in state.profiles.iter().enumerate() {
        let active = i == state.active;
        let style = if active {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        let mut spans = vec![
            Span::styled(format!(" {}. {}", i + 1, profile.name), style),
            Span::styled(
                format!("  {} cash", format_number(profile.cash)),
                Style::default().fg(Color::Green),
            ),
        ];
        if active {
            spans.push(Span::styled("  ◀ playing", Style::default().fg(Color::Cyan)));
        }
        cl.push_clickable(Line::from(spans), SELECT_PROFILE_BASE + i as u16);
    }
    cl.push("");
    if state.profiles.len() < MAX_PROFILES {
        cl.push_clickable(
            Line::from(Span::styled(" + New profile", Style::default().fg(Color::Green))),
            NEW_PROFILE,
        );
    } else {
        cl.push(Line::from(Span::styled(
            format!(" All {MAX_PROFILES} slots in use."),
            Style::default().fg(Color::DarkGray),
        )));
    }
    if state.profiles.len() > 1 {
        cl.push_clickable(
            Line::from(Span::styled(
                format!(" ✕ Delete {}", state.profile().name),
                Style::default().fg(Color::Red),
            )),
            DELETE_PROFILE,
        );
    }
    cl.push(Line::from(Span::styled(
        " Unlocks bought with \"all profiles\" are shared.",
        Style::default().fg(Color::DarkGray),
    )));
    cl.push("");
    cl.push_clickable(
        Line::from(Span::styled(" ◂ Back", Style::default().fg(Color::DarkGray))),
        BACK,
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" Profiles {}/{MAX_PROFILES} ", state.profiles.len()));
    let mut cs = click_state.borrow_mut();
    cl.render(f, area, block, 0, &mut cs);
}

fn render_customize(
    state: &PixelState,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let current = state.profile().theme;
    let mut cl = ClickableList::new();
    for (i, &theme) in Theme::all().iter().enumerate() {
        let unlocked = logic::theme_unlocked(state, theme);
        let swatch = Span::styled("██ ", Style::default().fg(theme_color(theme)));
        if unlocked {
            let mut spans = vec![
                Span::raw(format!(" {}. ", i + 1)),
                swatch,
                Span::styled(theme.name(), Style::default().fg(Color::White)),
            ];
            if theme == current {
                spans.push(Span::styled("  ✓", Style::default().fg(Color::Green)));
            }
            cl.push_clickable(Line::from(spans), SELECT_THEME_BASE + i as u16);
        } else {
            let needs: Vec<&str> = theme
                .requires()
                .iter()
                .filter_map(|id| catalog::item_by_id(id).map(|item| item.name))
                .collect();
            cl.push(Line::from(vec![
                Span::styled(format!(" {}. 🔒 {}", i + 1, theme.name()), Style::default().fg(Color::DarkGray)),
                Span::styled(format!("  needs {}", needs.join(", ")), Style::default().fg(Color::Red)),
            ]));
        }
    }
    cl.push("");
    cl.push_clickable(
        Line::from(Span::styled(" ◂ Back", Style::default().fg(Color::DarkGray))),
        BACK,
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta))
        .title(" Customize ");
    let mut cs = click_state.borrow_mut();
    cl.render(f, area, block, 0, &mut cs);
}

fn render_log(state: &PixelState, f: &mut Frame, area: Rect) {
    let visible_height = area.height.saturating_sub(2) as usize;

    // Newest first.
    let lines: Vec<Line> = state
        .log
        .iter()
        .rev()
        .take(visible_height)
        .enumerate()
        .map(|(i, entry)| {
            let style = match (entry.is_important, i < 3) {
                (true, true) => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                (true, false) => Style::default().fg(Color::Yellow),
                (false, true) => Style::default().fg(Color::White),
                (false, false) => Style::default().fg(Color::DarkGray),
            };
            Line::from(Span::styled(entry.text.as_str(), style))
        })
        .collect();

    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" Log "),
        );
    f.render_widget(widget, area);
}

fn render_help(state: &PixelState, f: &mut Frame, area: Rect) {
    let text = match state.view {
        View::Game => " c/space: click  s: shop  m: menu",
        View::Shop => " j/k: move  Enter/b: buy  s/Esc: close",
        View::Menu => " Esc: back",
        View::Profiles => " 1-5: select  n: new  d: delete  Esc: back",
        View::Customize => " 1-4: theme  Esc: back",
    };
    f.render_widget(
        Paragraph::new(Span::styled(text, Style::default().fg(Color::DarkGray))),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratzilla::ratatui::backend::TestBackend;
    use ratzilla::ratatui::Terminal;

    fn stocked_shop() -> PixelState {
        let mut state = PixelState::new(1);
        state.global_unlocks.insert(catalog::SHOP_FEATURE_ID);
        state.profile_mut().purchased.push("shop-choices");
        state.profile_mut().cash = 1_000_000;
        state.view = View::Shop;
        state
    }

    /// Draw one frame and return the click targets plus the screen text by row.
    fn draw(state: &PixelState, width: u16, height: u16) -> (ClickState, Vec<String>) {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        let click_state = Rc::new(RefCell::new(ClickState::new()));
        let pulse = ClickPulse::new();
        terminal
            .draw(|f| {
                let area = f.area();
                click_state.borrow_mut().reset(area);
                render(state, &GameConfig::default(), &pulse, f, area, &click_state);
            })
            .unwrap();
        let buffer = terminal.backend().buffer();
        let rows = (0..height)
            .map(|y| {
                (0..width)
                    .filter_map(|x| buffer.cell((x, y)).map(|c| c.symbol().to_string()))
                    .collect()
            })
            .collect();
        let cs = click_state.replace(ClickState::new());
        (cs, rows)
    }

    #[test]
    fn highlighted_card_stays_visible_on_narrow_screens() {
        let mut state = stocked_shop();
        let visible = logic::visible_items(&state);
        assert!(visible.len() > 5);

        for cursor in 0..visible.len() {
            state.shop_cursor = cursor;
            let (cs, rows) = draw(&state, 40, 30);
            let (idx, item) = visible[cursor];

            let marker = format!("▶ {}", item.name);
            assert!(
                rows.iter().any(|r| r.contains(&marker)),
                "cursor {cursor}: {marker:?} not on screen"
            );
            if !logic::is_owned(&state, item) {
                let buy = BUY_ITEM_BASE + idx as u16;
                assert!(
                    cs.targets.iter().any(|t| t.action_id == buy),
                    "cursor {cursor}: buy row for {} not clickable",
                    item.id
                );
            }
        }
    }

    #[test]
    fn shop_pager_is_clickable() {
        let state = stocked_shop();
        let (cs, rows) = draw(&state, 40, 30);
        let prev = cs.targets.iter().find(|t| t.action_id == SHOP_PREV).unwrap();
        let next = cs.targets.iter().find(|t| t.action_id == SHOP_NEXT).unwrap();
        assert_eq!(prev.rect.y, next.rect.y);
        assert!(rows[prev.rect.y as usize].contains("Next"));
    }

    #[test]
    fn no_pager_for_a_single_card() {
        let mut state = PixelState::new(1);
        state.global_unlocks.insert(catalog::SHOP_FEATURE_ID);
        state.view = View::Shop;
        assert_eq!(logic::visible_items(&state).len(), 1);
        let (cs, _) = draw(&state, 80, 30);
        assert!(!cs.targets.iter().any(|t| t.action_id == SHOP_NEXT));
    }

    #[test]
    fn card_scroll_prefers_the_bottom_then_the_top() {
        // Fits already.
        assert_eq!(card_scroll(0, 5, 10), 0);
        // Bottom just past the viewport.
        assert_eq!(card_scroll(8, 14, 10), 4);
        // Taller than the viewport: pin the top.
        assert_eq!(card_scroll(8, 30, 10), 8);
    }

    #[test]
    fn every_theme_has_a_distinct_color() {
        let colors: Vec<Color> = Theme::all().iter().map(|t| theme_color(*t)).collect();
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
