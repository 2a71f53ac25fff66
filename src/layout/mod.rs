//! # Layout State
//!
//! The cursor of a rendering pass. Elements read and move it as they are
//! emitted; nothing is ever laid out twice. `max_y` tracks the lowest point
//! reached in the current container, which becomes that container's height
//! once its content has been streamed.
//!
//! Invariant: `max_y >= y` after every operation.

pub mod page_break;

pub use page_break::PAGE_GAP;

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutState {
    x: f64,
    y: f64,
    max_y: f64,
    page_number: u32,
    current_style: String,
    /// Height of the last cell laid out beside its successor, so a row of
    /// cells ends up with a common height.
    last_cell_height: f64,
}

impl Default for LayoutState {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutState {
    pub fn new() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            max_y: 0.0,
            page_number: 1,
            current_style: String::new(),
            last_cell_height: 0.0,
        }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn max_y(&self) -> f64 {
        self.max_y
    }

    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    pub fn last_cell_height(&self) -> f64 {
        self.last_cell_height
    }

    /// Remember the height of a cell that the next one sits beside; 0 ends
    /// the row.
    pub fn set_last_cell_height(&mut self, height: f64) {
        self.last_cell_height = height;
    }

    pub fn current_style(&self) -> &str {
        &self.current_style
    }

    pub fn set_current_style(&mut self, name: &str) {
        if self.current_style != name {
            self.current_style = name.to_string();
        }
    }

    pub fn clear_current_style(&mut self) {
        self.current_style.clear();
    }

    pub fn set_x(&mut self, x: f64) {
        self.x = x;
    }

    pub fn set_y(&mut self, y: f64) {
        self.y = y;
        self.record_max_y(y);
    }

    pub fn set_xy(&mut self, x: f64, y: f64) {
        self.set_x(x);
        self.set_y(y);
    }

    /// Raise `max_y` without moving the cursor.
    pub fn record_max_y(&mut self, y: f64) {
        if self.max_y < y {
            self.max_y = y;
        }
    }

    /// Start a new container: cursor to the top, extent forgotten.
    pub fn reset_container(&mut self) {
        self.y = 0.0;
        self.max_y = 0.0;
    }

    /// Like [`reset_container`](Self::reset_container), also returning to the left edge.
    pub fn reset_origin(&mut self) {
        self.x = 0.0;
        self.reset_container();
    }

    /// Simulate a page break.
    pub fn page_break(&mut self) {
        let next = page_break::resolve(self.y, self.max_y);
        self.page_number += 1;
        self.y = next.y;
        self.max_y = next.max_y;
        log::debug!("Page break: page {} starts at y={}", self.page_number, self.y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_y_raises_max_y() {
        let mut state = LayoutState::new();
        state.set_y(40.0);
        assert_eq!(state.max_y(), 40.0);
        state.set_y(10.0);
        assert_eq!(state.y(), 10.0);
        assert_eq!(state.max_y(), 40.0);
    }

    #[test]
    fn max_y_never_below_y() {
        let mut state = LayoutState::new();
        let ops: [(u8, f64); 10] = [
            (0, 12.0),
            (1, 30.0),
            (2, 5.0),
            (3, 80.0),
            (1, 200.0),
            (0, 400.0),
            (2, 150.0),
            (3, 10.0),
            (1, 0.0),
            (2, 999.0),
        ];
        for (op, v) in ops {
            match op {
                0 => state.set_x(v),
                1 => state.set_y(v),
                2 => state.set_xy(v, v / 2.0),
                _ => state.record_max_y(v),
            }
            assert!(state.max_y() >= state.y(), "after op {op} with {v}");
        }
    }

    #[test]
    fn record_max_y_keeps_cursor() {
        let mut state = LayoutState::new();
        state.set_xy(5.0, 20.0);
        state.record_max_y(120.0);
        assert_eq!((state.x(), state.y(), state.max_y()), (5.0, 20.0, 120.0));
        state.record_max_y(50.0);
        assert_eq!(state.max_y(), 120.0);
    }

    #[test]
    fn page_number_counts_breaks_only() {
        let mut state = LayoutState::new();
        assert_eq!(state.page_number(), 1);
        state.set_xy(10.0, 10.0);
        state.reset_origin();
        assert_eq!(state.page_number(), 1);
        for expected in 2..=6 {
            state.page_break();
            assert_eq!(state.page_number(), expected);
            assert!(state.max_y() >= state.y());
        }
    }

    #[test]
    fn last_cell_height_survives_cursor_moves() {
        let mut state = LayoutState::new();
        state.set_last_cell_height(42.0);
        state.set_xy(100.0, 0.0);
        state.page_break();
        assert_eq!(state.last_cell_height(), 42.0);
        state.set_last_cell_height(0.0);
        assert_eq!(state.last_cell_height(), 0.0);
    }

    #[test]
    fn reset_origin_returns_to_top_left() {
        let mut state = LayoutState::new();
        state.set_xy(30.0, 60.0);
        state.reset_container();
        assert_eq!((state.x(), state.y(), state.max_y()), (30.0, 0.0, 0.0));
        state.set_xy(30.0, 60.0);
        state.reset_origin();
        assert_eq!((state.x(), state.y(), state.max_y()), (0.0, 0.0, 0.0));
    }
}
