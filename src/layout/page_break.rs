//! # Simulated Page Breaks
//!
//! The output has no pages, so a page break is a nudge: leave a small gap
//! below everything laid out so far and continue from there. The page
//! counter still advances so `#PAGENUM#` and image collision checks see a
//! new page.

/// Gap left between the simulated pages, in points.
pub const PAGE_GAP: f64 = 10.0;

/// Cursor position after a break.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreakPosition {
    pub y: f64,
    pub max_y: f64,
}

/// Decide where content continues after a break, given the cursor and the
/// lowest point reached so far.
pub fn resolve(y: f64, max_y: f64) -> BreakPosition {
    let max_y = max_y + PAGE_GAP;
    if max_y < y {
        // The cursor is already further down than anything drawn.
        BreakPosition { y, max_y: y }
    } else {
        // Continue below everything, so nothing gets drawn over.
        BreakPosition { y: max_y, max_y }
    }
}
