//! Clickable UI building blocks.
//!
//! Each component renders itself and registers the click targets for what
//! it drew, so layout changes can never leave a stale hit region behind.

use ratzilla::ratatui::layout::{Alignment, Rect};
use ratzilla::ratatui::style::Style;
use ratzilla::ratatui::text::Line;
use ratzilla::ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratzilla::ratatui::Frame;

use crate::input::ClickState;

// ── Button ─────────────────────────────────────────────────────

/// A bordered, centered label whose whole box is one click target.
pub struct Button<'a> {
    label: Line<'a>,
    style: Style,
    border_style: Style,
    action_id: u16,
}

impl<'a> Button<'a> {
    pub fn new(label: impl Into<Line<'a>>, action_id: u16) -> Self {
        Self {
            label: label.into(),
            style: Style::default(),
            border_style: Style::default(),
            action_id,
        }
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn border_style(mut self, style: Style) -> Self {
        self.border_style = style;
        self
    }

    pub fn render(self, f: &mut Frame, area: Rect, cs: &mut ClickState) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.border_style);
        // Vertically center single-line labels in tall boxes.
        let pad = area.height.saturating_sub(3) / 2;
        let mut lines: Vec<Line> = (0..pad).map(|_| Line::from("")).collect();
        lines.push(self.label);
        let widget = Paragraph::new(lines)
            .style(self.style)
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(widget, area);
        cs.add_click_target(area, self.action_id);
    }
}

// ── ClickableList ──────────────────────────────────────────────

/// Lines for a [`Paragraph`] where some lines carry an action.
///
/// Targets are bound to line positions, so inserting a header above a
/// clickable line moves its target along with it.
pub struct ClickableList<'a> {
    lines: Vec<Line<'a>>,
    /// `(line_index, action_id)`
    actions: Vec<(usize, u16)>,
}

impl<'a> ClickableList<'a> {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            actions: Vec::new(),
        }
    }

    pub fn push(&mut self, line: impl Into<Line<'a>>) {
        self.lines.push(line.into());
    }

    pub fn push_clickable(&mut self, line: impl Into<Line<'a>>, action_id: u16) {
        self.actions.push((self.lines.len(), action_id));
        self.lines.push(line.into());
    }

    /// Index the next pushed line will get.
    pub fn next_index(&self) -> usize {
        self.lines.len()
    }

    /// Visual row at which each line starts when word-wrapped at `width`,
    /// followed by the total height. Uses the same wrapper as rendering, so
    /// long lines that break early at word boundaries are counted correctly.
    pub fn line_starts(&self, width: u16) -> Vec<usize> {
        let mut starts = Vec::with_capacity(self.lines.len() + 1);
        let mut row = 0usize;
        for line in &self.lines {
            starts.push(row);
            row += if width == 0 {
                1
            } else {
                Paragraph::new(line.clone())
                    .wrap(Wrap { trim: false })
                    .line_count(width)
                    .max(1)
            };
        }
        starts.push(row);
        starts
    }

    /// Render inside `block`, scrolled by `scroll` visual rows, and register
    /// a target on every visible row of every clickable line.
    pub fn render(self, f: &mut Frame, area: Rect, block: Block<'a>, scroll: u16, cs: &mut ClickState) {
        let inner = block.inner(area);
        self.register_targets(inner, scroll, cs);
        let widget = Paragraph::new(self.lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0));
        f.render_widget(widget, area);
    }

    /// Register targets for content drawn into `inner` (the area inside any
    /// borders).
    pub fn register_targets(&self, inner: Rect, scroll: u16, cs: &mut ClickState) {
        let starts = self.line_starts(inner.width);

        for &(idx, action_id) in &self.actions {
            let (Some(&start), Some(&end)) = (starts.get(idx), starts.get(idx + 1)) else {
                continue;
            };
            for visual in start..end {
                let Some(offset) = visual.checked_sub(scroll as usize) else {
                    continue;
                };
                if offset >= inner.height as usize {
                    break;
                }
                cs.add_row_target(inner, inner.y + offset as u16, action_id);
            }
        }
    }
}
