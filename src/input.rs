//! Input normalization and click-target hit testing.
//!
//! Keyboard, mouse and touch all end up as [`InputEvent`]s. Clicks are
//! resolved against the [`ClickTarget`]s registered during the last render,
//! so whatever is on screen is exactly what can be tapped.

use ratzilla::ratatui::layout::Rect;

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// A printable key.
    Key(char),
    /// A tap on a registered target, carrying its semantic action ID.
    Click(u16),
    /// Esc: leave the current screen.
    Back,
    /// Enter: confirm the highlighted entry.
    Confirm,
    /// Arrow up.
    Up,
    /// Arrow down.
    Down,
}

/// A tappable rectangle in terminal cell coordinates.
#[derive(Debug, Clone)]
pub struct ClickTarget {
    pub rect: Rect,
    pub action_id: u16,
}

/// Targets registered by the renderer plus the terminal size they belong to.
pub struct ClickState {
    pub targets: Vec<ClickTarget>,
    pub terminal_cols: u16,
    pub terminal_rows: u16,
}

impl ClickState {
    pub fn new() -> Self {
        Self {
            targets: Vec::new(),
            terminal_cols: 0,
            terminal_rows: 0,
        }
    }

    /// Start a new frame at the given terminal size.
    pub fn reset(&mut self, area: Rect) {
        self.targets.clear();
        self.terminal_cols = area.width;
        self.terminal_rows = area.height;
    }

    pub fn add_click_target(&mut self, rect: Rect, action_id: u16) {
        if rect.width > 0 && rect.height > 0 {
            self.targets.push(ClickTarget { rect, action_id });
        }
    }

    /// Register one full-width row of `area`; rows outside `area` are dropped.
    pub fn add_row_target(&mut self, area: Rect, row: u16, action_id: u16) {
        if row >= area.y && row < area.y.saturating_add(area.height) {
            self.add_click_target(Rect::new(area.x, row, area.width, 1), action_id);
        }
    }

    /// The topmost target under a cell. Later registrations are drawn on top.
    pub fn hit_test(&self, col: u16, row: u16) -> Option<u16> {
        self.targets
            .iter()
            .rev()
            .find(|t| {
                let r = t.rect;
                col >= r.x && col < r.x + r.width && row >= r.y && row < r.y + r.height
            })
            .map(|t| t.action_id)
    }

    /// Map a pixel position inside the grid element to a cell.
    ///
    /// `offset` is the pointer position relative to the grid's top-left
    /// corner and `size` the grid's rendered pixel size.
    pub fn pixel_to_cell(&self, offset: (f64, f64), size: (f64, f64)) -> Option<(u16, u16)> {
        let col = pixel_to_index(offset.0, size.0, self.terminal_cols)?;
        let row = pixel_to_index(offset.1, size.1, self.terminal_rows)?;
        Some((col, row))
    }
}

/// Convert one pixel coordinate to a cell index along that axis.
fn pixel_to_index(pos: f64, extent: f64, cells: u16) -> Option<u16> {
    if extent <= 0.0 || cells == 0 || pos < 0.0 {
        return None;
    }
    let index = (pos / (extent / cells as f64)) as u16;
    (index < cells).then_some(index)
}

/// Narrow layouts stack panels instead of placing them side by side.
pub fn is_narrow_layout(width: u16) -> bool {
    width < 60
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sized(cols: u16, rows: u16) -> ClickState {
        let mut cs = ClickState::new();
        cs.reset(Rect::new(0, 0, cols, rows));
        cs
    }

    #[test]
    fn hit_test_finds_row_targets() {
        let mut cs = sized(80, 30);
        let area = Rect::new(0, 10, 80, 5);
        cs.add_row_target(area, 11, 1);
        cs.add_row_target(area, 12, 2);
        assert_eq!(cs.hit_test(40, 11), Some(1));
        assert_eq!(cs.hit_test(40, 12), Some(2));
        assert_eq!(cs.hit_test(40, 13), None);
    }

    #[test]
    fn row_outside_area_is_ignored() {
        let mut cs = sized(80, 30);
        let area = Rect::new(0, 10, 80, 2);
        cs.add_row_target(area, 9, 1);
        cs.add_row_target(area, 12, 2);
        assert!(cs.targets.is_empty());
    }

    #[test]
    fn empty_rect_is_not_registered() {
        let mut cs = sized(80, 30);
        cs.add_click_target(Rect::new(3, 3, 0, 1), 7);
        assert!(cs.targets.is_empty());
    }

    #[test]
    fn later_target_wins_on_overlap() {
        let mut cs = sized(80, 30);
        cs.add_click_target(Rect::new(0, 5, 80, 3), 1);
        cs.add_click_target(Rect::new(10, 6, 5, 1), 2);
        assert_eq!(cs.hit_test(12, 6), Some(2));
        assert_eq!(cs.hit_test(2, 6), Some(1));
        assert_eq!(cs.hit_test(12, 7), Some(1));
    }

    #[test]
    fn reset_clears_targets_and_records_size() {
        let mut cs = sized(80, 30);
        cs.add_click_target(Rect::new(0, 0, 1, 1), 1);
        cs.reset(Rect::new(0, 0, 40, 20));
        assert!(cs.targets.is_empty());
        assert_eq!((cs.terminal_cols, cs.terminal_rows), (40, 20));
    }

    #[test]
    fn pixel_to_cell_maps_both_axes() {
        let cs = sized(80, 30);
        // 10px wide, 15px tall cells
        assert_eq!(cs.pixel_to_cell((0.0, 0.0), (800.0, 450.0)), Some((0, 0)));
        assert_eq!(cs.pixel_to_cell((15.0, 16.0), (800.0, 450.0)), Some((1, 1)));
        assert_eq!(cs.pixel_to_cell((799.0, 449.0), (800.0, 450.0)), Some((79, 29)));
    }

    #[test]
    fn pixel_to_cell_rejects_outside_points() {
        let cs = sized(80, 30);
        assert_eq!(cs.pixel_to_cell((-1.0, 5.0), (800.0, 450.0)), None);
        assert_eq!(cs.pixel_to_cell((5.0, 450.0), (800.0, 450.0)), None);
        assert_eq!(cs.pixel_to_cell((5.0, 5.0), (0.0, 450.0)), None);
    }

    #[test]
    fn pixel_to_cell_needs_a_known_size() {
        let cs = ClickState::new();
        assert_eq!(cs.pixel_to_cell((5.0, 5.0), (800.0, 450.0)), None);
    }

    #[test]
    fn tap_in_middle_of_each_row_hits_that_row() {
        let mut cs = sized(37, 50);
        let area = Rect::new(0, 0, 37, 50);
        for row in 0..50 {
            cs.add_row_target(area, row, 100 + row);
        }
        let cell_h = 15.0;
        for row in 0..50u16 {
            let y = row as f64 * cell_h + cell_h / 2.0;
            let (col, r) = cs.pixel_to_cell((3.0, y), (37.0 * 9.0, 50.0 * cell_h)).unwrap();
            assert_eq!(cs.hit_test(col, r), Some(100 + row));
        }
    }

    #[test]
    fn narrow_layout_threshold() {
        assert!(is_narrow_layout(59));
        assert!(!is_narrow_layout(60));
    }
}
