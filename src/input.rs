//! Input plumbing: normalized events, click targets, pixel → cell mapping.

use ratzilla::ratatui::layout::Rect;

/// Keyboard, mouse and touch input after normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// A printable key.
    Key(char),
    /// A tap on a registered target, identified by its action ID.
    Click(u16),
    Backspace,
    Enter,
    Tab,
    Escape,
}

/// A screen region bound to an action ID.
#[derive(Debug, Clone)]
pub struct ClickTarget {
    pub rect: Rect,
    pub action_id: u16,
}

/// Click targets registered during the last render, shared with the
/// mouse handler.
#[derive(Debug, Default)]
pub struct ClickState {
    pub targets: Vec<ClickTarget>,
    pub terminal_cols: u16,
    pub terminal_rows: u16,
}

impl ClickState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new frame at the given terminal size.
    pub fn reset(&mut self, area: Rect) {
        self.terminal_cols = area.width;
        self.terminal_rows = area.height;
        self.targets.clear();
    }

    pub fn add_click_target(&mut self, rect: Rect, action_id: u16) {
        self.targets.push(ClickTarget { rect, action_id });
    }

    /// Make `row` of `area` clickable across its full width.
    /// Rows outside `area` are ignored.
    pub fn add_row_target(&mut self, area: Rect, row: u16, action_id: u16) {
        if (area.y..area.y + area.height).contains(&row) {
            self.add_click_target(Rect::new(area.x, row, area.width, 1), action_id);
        }
    }

    /// The action under `(col, row)`. Later targets sit on top.
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
}

/// Below this width the game screen stacks its panels.
pub fn is_narrow_layout(width: u16) -> bool {
    width < 70
}

/// Map a pixel offset inside the grid to a cell index along one axis.
/// `None` outside the grid or for degenerate sizes.
fn pixel_to_cell(offset: f64, extent: f64, cells: u16) -> Option<u16> {
    if extent <= 0.0 || cells == 0 || offset < 0.0 {
        return None;
    }
    let cell = (offset / (extent / f64::from(cells))) as u16;
    (cell < cells).then_some(cell)
}

pub fn pixel_y_to_row(click_y: f64, grid_height: f64, terminal_rows: u16) -> Option<u16> {
    pixel_to_cell(click_y, grid_height, terminal_rows)
}

pub fn pixel_x_to_col(click_x: f64, grid_width: f64, terminal_cols: u16) -> Option<u16> {
    pixel_to_cell(click_x, grid_width, terminal_cols)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_test_finds_target() {
        let mut cs = ClickState::new();
        cs.add_click_target(Rect::new(0, 3, 20, 1), 7);
        cs.add_click_target(Rect::new(0, 4, 20, 2), 8);
        assert_eq!(cs.hit_test(5, 3), Some(7));
        assert_eq!(cs.hit_test(5, 5), Some(8));
        assert_eq!(cs.hit_test(5, 6), None);
        assert_eq!(cs.hit_test(20, 3), None);
    }

    #[test]
    fn later_target_wins_on_overlap() {
        let mut cs = ClickState::new();
        cs.add_click_target(Rect::new(0, 0, 40, 1), 1);
        cs.add_click_target(Rect::new(10, 0, 5, 1), 2);
        assert_eq!(cs.hit_test(12, 0), Some(2));
        assert_eq!(cs.hit_test(2, 0), Some(1));
    }

    #[test]
    fn row_target_clipped_to_area() {
        let mut cs = ClickState::new();
        let area = Rect::new(2, 10, 30, 3);
        cs.add_row_target(area, 9, 1);
        cs.add_row_target(area, 13, 2);
        cs.add_row_target(area, 11, 3);
        assert_eq!(cs.targets.len(), 1);
        assert_eq!(cs.hit_test(2, 11), Some(3));
        assert_eq!(cs.hit_test(1, 11), None);
    }

    #[test]
    fn reset_clears_and_records_size() {
        let mut cs = ClickState::new();
        cs.add_click_target(Rect::new(0, 0, 1, 1), 1);
        cs.reset(Rect::new(0, 0, 100, 40));
        assert!(cs.targets.is_empty());
        assert_eq!((cs.terminal_cols, cs.terminal_rows), (100, 40));
    }

    #[test]
    fn narrow_threshold() {
        assert!(is_narrow_layout(69));
        assert!(!is_narrow_layout(70));
    }

    #[test]
    fn pixel_mapping() {
        assert_eq!(pixel_y_to_row(0.0, 450.0, 30), Some(0));
        assert_eq!(pixel_y_to_row(15.0, 450.0, 30), Some(1));
        assert_eq!(pixel_y_to_row(449.0, 450.0, 30), Some(29));
        assert_eq!(pixel_y_to_row(450.0, 450.0, 30), None);
        assert_eq!(pixel_y_to_row(-1.0, 450.0, 30), None);
        assert_eq!(pixel_x_to_col(799.0, 800.0, 80), Some(79));
        assert_eq!(pixel_x_to_col(10.0, 0.0, 80), None);
        assert_eq!(pixel_x_to_col(10.0, 800.0, 0), None);
    }

    #[test]
    fn click_pipeline_reaches_target() {
        let mut cs = ClickState::new();
        cs.reset(Rect::new(0, 0, 80, 30));
        cs.add_row_target(Rect::new(0, 0, 80, 30), 12, 42);
        let cell_h = 450.0 / 30.0;
        let row = pixel_y_to_row(12.0 * cell_h + 3.0, 450.0, cs.terminal_rows).unwrap();
        let col = pixel_x_to_col(400.0, 800.0, cs.terminal_cols).unwrap();
        assert_eq!(cs.hit_test(col, row), Some(42));
    }
}
