/// Fallback container height when the host has not measured one yet.
pub const DEFAULT_CONTAINER_HEIGHT: u32 = 500;

/// Row-height presets. Heights are logical units, the same units as
/// `scroll_top` and column widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Density {
    Compact,
    #[default]
    Normal,
    Comfortable,
}

impl Density {
    pub fn row_height(&self) -> u32 {
        match self {
            Density::Compact => 32,
            Density::Normal => 44,
            Density::Comfortable => 56,
        }
    }

    pub fn cycle(&self) -> Self {
        match self {
            Density::Compact => Density::Normal,
            Density::Normal => Density::Comfortable,
            Density::Comfortable => Density::Compact,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Density::Compact => "compact",
            Density::Normal => "normal",
            Density::Comfortable => "comfortable",
        }
    }
}

/// The materialized slice of a virtualized grid: which contiguous run of rows
/// to render and where to place it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewportWindow {
    /// First row to materialize (inclusive).
    pub start_index: usize,
    /// One past the last row to materialize.
    pub end_index: usize,
    /// Offset of the rendered slice from the top of the scroll space.
    pub offset_y: u64,
    /// Height of the full scroll space.
    pub total_height: u64,
}

impl ViewportWindow {
    pub fn len(&self) -> usize {
        self.end_index - self.start_index
    }

    pub fn is_empty(&self) -> bool {
        self.start_index == self.end_index
    }
}

/// Compute the minimal window of rows to materialize for a scroll position.
///
/// O(1): pure arithmetic over a uniform row height. Called directly from
/// every scroll event, un-debounced, so the slice never lags the scroll
/// position. Malformed input clamps instead of panicking: negative scroll
/// reads as zero, a zero row height as one, a missing container height as
/// `DEFAULT_CONTAINER_HEIGHT`.
pub fn compute_window(
    scroll_top: i64,
    container_height: Option<u32>,
    row_height: u32,
    overscan: usize,
    total_rows: usize,
) -> ViewportWindow {
    let row_height = row_height.max(1) as u64;
    let container_height = container_height.unwrap_or(DEFAULT_CONTAINER_HEIGHT) as u64;
    let scroll_top = scroll_top.max(0) as u64;

    let total_height = total_rows as u64 * row_height;

    if total_rows == 0 {
        return ViewportWindow::default();
    }

    let first_visible = (scroll_top / row_height) as usize;
    let start_index = first_visible.saturating_sub(overscan).min(total_rows);

    let visible_count = container_height.div_ceil(row_height) as usize + 2 * overscan;
    let end_index = (start_index + visible_count).min(total_rows);

    ViewportWindow {
        start_index,
        end_index,
        offset_y: start_index as u64 * row_height,
        total_height,
    }
}

/// Largest scroll offset that still shows a full container of rows.
pub fn max_scroll_top(container_height: Option<u32>, row_height: u32, total_rows: usize) -> i64 {
    let row_height = row_height.max(1) as i64;
    let container = container_height.unwrap_or(DEFAULT_CONTAINER_HEIGHT) as i64;
    (total_rows as i64 * row_height - container).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_matches_scroll_arithmetic() {
        let w = compute_window(4400, Some(500), 44, 5, 1000);
        assert_eq!(w.start_index, 95);
        assert_eq!(w.offset_y, 4180);
        assert_eq!(w.total_height, 44_000);
        // ceil(500/44) = 12 visible + 10 overscan
        assert_eq!(w.end_index, 95 + 22);
    }

    #[test]
    fn start_clamps_at_zero_near_the_top() {
        let w = compute_window(0, Some(500), 44, 5, 1000);
        assert_eq!(w.start_index, 0);
        assert_eq!(w.offset_y, 0);
    }

    #[test]
    fn end_clamps_at_total_rows() {
        let w = compute_window(i64::MAX / 2, Some(500), 44, 5, 100);
        assert!(w.end_index <= 100);
        assert!(w.start_index <= w.end_index);
    }

    #[test]
    fn empty_table_yields_empty_window() {
        let w = compute_window(123, Some(500), 44, 5, 0);
        assert_eq!(w, ViewportWindow::default());
        assert_eq!(w.total_height, 0);
    }

    #[test]
    fn malformed_input_clamps() {
        // Negative scroll reads as zero
        let w = compute_window(-999, Some(500), 44, 2, 10);
        assert_eq!(w.start_index, 0);

        // Zero row height clamps to one instead of dividing by zero
        let w = compute_window(10, Some(500), 0, 0, 10);
        assert_eq!(w.start_index, 10.min(w.end_index));

        // Unknown container height falls back to the default
        let w = compute_window(0, None, 44, 0, 1000);
        assert_eq!(w.end_index, (500u32.div_ceil(44)) as usize);
    }

    #[test]
    fn density_presets() {
        assert_eq!(Density::Compact.row_height(), 32);
        assert_eq!(Density::Normal.row_height(), 44);
        assert_eq!(Density::Comfortable.row_height(), 56);
        assert_eq!(Density::Comfortable.cycle(), Density::Compact);
    }

    #[test]
    fn max_scroll_leaves_one_full_container() {
        assert_eq!(max_scroll_top(Some(500), 44, 1000), 44_000 - 500);
        assert_eq!(max_scroll_top(Some(500), 44, 5), 0);
    }
}
