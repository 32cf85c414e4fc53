use crate::zones::{WorldGrid, ZONES_PER_PARSANG};

use super::transform::{ScreenRect, Vec2, ViewportTransform};

/// Below this on-screen cell size parsang grid lines turn into noise.
pub const GRID_LINE_MIN_CELL_PX: f64 = 4.0;
pub const AXIS_LABEL_MIN_CELL_PX: f64 = 6.0;
pub const GRID_LINE_THICKNESS_PX: f64 = 1.0;

/// Half-open cell-index rectangle `[start_x, end_x) x [start_y, end_y)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub start_x: u32,
    pub end_x: u32,
    pub start_y: u32,
    pub end_y: u32,
}

impl CellRange {
    pub const EMPTY: CellRange = CellRange {
        start_x: 0,
        end_x: 0,
        start_y: 0,
        end_y: 0,
    };

    pub fn is_empty(&self) -> bool {
        self.start_x >= self.end_x || self.start_y >= self.end_y
    }

    pub fn contains(&self, grid_x: u32, grid_y: u32) -> bool {
        (self.start_x..self.end_x).contains(&grid_x) && (self.start_y..self.end_y).contains(&grid_y)
    }

    pub fn cell_count(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        (self.end_x - self.start_x) as usize * (self.end_y - self.start_y) as usize
    }

    /// Row-major iteration over `(grid_x, grid_y)`.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> {
        let range = if self.is_empty() { CellRange::EMPTY } else { *self };
        (range.start_y..range.end_y)
            .flat_map(move |grid_y| (range.start_x..range.end_x).map(move |grid_x| (grid_x, grid_y)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AxisLabel {
    pub axis: Axis,
    pub parsang: u32,
    pub text: String,
    /// Screen position of the label's anchor: the top edge for columns, the left edge for rows.
    pub position: Vec2,
}

/// The minimal cell range whose complement is fully off-screen.
pub fn visible_cell_range(
    transform: &ViewportTransform,
    screen: &ScreenRect,
    base_cell_size: f64,
    grid: &WorldGrid,
) -> CellRange {
    if base_cell_size <= 0.0 || screen.width <= 0.0 || screen.height <= 0.0 {
        return CellRange::EMPTY;
    }
    let top_left = transform.screen_to_world(Vec2::new(screen.x, screen.y));
    let bottom_right = transform.screen_to_world(Vec2::new(screen.right(), screen.bottom()));

    let range = CellRange {
        start_x: clamp_index((top_left.x / base_cell_size).floor(), grid.cells_x()),
        end_x: clamp_index((bottom_right.x / base_cell_size).ceil(), grid.cells_x()),
        start_y: clamp_index((top_left.y / base_cell_size).floor(), grid.cells_y()),
        end_y: clamp_index((bottom_right.y / base_cell_size).ceil(), grid.cells_y()),
    };
    if range.is_empty() {
        CellRange::EMPTY
    } else {
        range
    }
}

fn clamp_index(value: f64, limit: u32) -> u32 {
    if value.is_nan() {
        return 0;
    }
    value.clamp(0.0, limit as f64) as u32
}

pub fn grid_lines_visible(zoom: f64, base_cell_size: f64) -> bool {
    base_cell_size * zoom >= GRID_LINE_MIN_CELL_PX
}

pub fn axis_labels_visible(zoom: f64, base_cell_size: f64) -> bool {
    base_cell_size * zoom >= AXIS_LABEL_MIN_CELL_PX
}

/// Screen rectangles of the parsang boundaries crossing `cells`, clipped to
/// the world extent. Empty when the grid would not be legible.
pub fn parsang_grid_lines(
    transform: &ViewportTransform,
    cells: CellRange,
    base_cell_size: f64,
    grid: &WorldGrid,
) -> Vec<ScreenRect> {
    if cells.is_empty() || !grid_lines_visible(transform.zoom(), base_cell_size) {
        return Vec::new();
    }
    let parsang_px = base_cell_size * ZONES_PER_PARSANG as f64;
    let top = transform.world_to_screen(Vec2::new(0.0, cells.start_y as f64 * base_cell_size));
    let bottom = transform.world_to_screen(Vec2::new(0.0, cells.end_y as f64 * base_cell_size));
    let left = transform.world_to_screen(Vec2::new(cells.start_x as f64 * base_cell_size, 0.0));
    let right = transform.world_to_screen(Vec2::new(cells.end_x as f64 * base_cell_size, 0.0));

    let mut lines = Vec::new();
    for parsang in parsang_span(cells.start_x, cells.end_x, grid.parsangs_x) {
        let x = transform
            .world_to_screen(Vec2::new(parsang as f64 * parsang_px, 0.0))
            .x;
        lines.push(ScreenRect {
            x: x.floor(),
            y: top.y,
            width: GRID_LINE_THICKNESS_PX,
            height: bottom.y - top.y,
        });
    }
    for parsang in parsang_span(cells.start_y, cells.end_y, grid.parsangs_y) {
        let y = transform
            .world_to_screen(Vec2::new(0.0, parsang as f64 * parsang_px))
            .y;
        lines.push(ScreenRect {
            x: left.x,
            y: y.floor(),
            width: right.x - left.x,
            height: GRID_LINE_THICKNESS_PX,
        });
    }
    lines
}

/// Parsang boundary indices touching the half-open cell span, both outer edges included.
fn parsang_span(start_cell: u32, end_cell: u32, parsang_limit: u32) -> std::ops::RangeInclusive<u32> {
    let first = start_cell.div_ceil(ZONES_PER_PARSANG);
    let last = (end_cell / ZONES_PER_PARSANG).min(parsang_limit);
    first..=last
}

/// Parsang indices along the top and left screen edges.
pub fn axis_labels(
    transform: &ViewportTransform,
    cells: CellRange,
    base_cell_size: f64,
    screen: &ScreenRect,
) -> Vec<AxisLabel> {
    if cells.is_empty() || !axis_labels_visible(transform.zoom(), base_cell_size) {
        return Vec::new();
    }
    let parsang_px = base_cell_size * ZONES_PER_PARSANG as f64;
    let first_x = cells.start_x / ZONES_PER_PARSANG;
    let last_x = (cells.end_x - 1) / ZONES_PER_PARSANG;
    let first_y = cells.start_y / ZONES_PER_PARSANG;
    let last_y = (cells.end_y - 1) / ZONES_PER_PARSANG;

    let mut labels = Vec::new();
    for parsang in first_x..=last_x {
        let center = transform.world_to_screen(Vec2::new((parsang as f64 + 0.5) * parsang_px, 0.0));
        labels.push(AxisLabel {
            axis: Axis::Horizontal,
            parsang,
            text: parsang.to_string(),
            position: Vec2::new(center.x, screen.y),
        });
    }
    for parsang in first_y..=last_y {
        let center = transform.world_to_screen(Vec2::new(0.0, (parsang as f64 + 0.5) * parsang_px));
        labels.push(AxisLabel {
            axis: Axis::Vertical,
            parsang,
            text: parsang.to_string(),
            position: Vec2::new(screen.x, center.y),
        });
    }
    labels
}
