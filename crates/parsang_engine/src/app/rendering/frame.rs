use crate::zones::{CurrentLocation, Rgb, WorldGrid, ZoneCoordinate, ZoneStateStore};

use super::culling::{axis_labels, parsang_grid_lines, visible_cell_range, AxisLabel, CellRange};
use super::transform::{ScreenRect, Vec2, ViewportTransform};

/// Inputs that come from the zone state rather than the viewport.
#[derive(Debug, Clone, Copy)]
pub struct FrameRequest<'a> {
    pub store: &'a ZoneStateStore,
    pub level: u32,
    pub location: CurrentLocation,
    pub grid: WorldGrid,
    pub base_cell_size: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisibleCell {
    pub coord: ZoneCoordinate,
    pub color: Rgb,
    pub is_current: bool,
    pub screen_rect: ScreenRect,
}

/// Everything the rasterizer needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameModel {
    pub range: CellRange,
    pub cells: Vec<VisibleCell>,
    pub grid_lines: Vec<ScreenRect>,
    pub axis_labels: Vec<AxisLabel>,
    pub location: CurrentLocation,
    pub current_outline_px: u32,
}

pub fn build_frame(
    request: &FrameRequest<'_>,
    transform: &ViewportTransform,
    screen: &ScreenRect,
) -> FrameModel {
    let cell_size = request.base_cell_size;
    let range = visible_cell_range(transform, screen, cell_size, &request.grid);
    let view = request.store.query(Some(request.level));
    let effective = transform.effective_cell_size(cell_size);

    let mut cells = Vec::with_capacity(range.cell_count());
    for (grid_x, grid_y) in range.iter() {
        let coord = ZoneCoordinate::from_grid(grid_x, grid_y, request.level);
        let record = view.get(&coord);
        let top_left =
            transform.world_to_screen(Vec2::new(grid_x as f64 * cell_size, grid_y as f64 * cell_size));
        cells.push(VisibleCell {
            coord,
            color: record.resolved_color(),
            is_current: record.is_current,
            screen_rect: ScreenRect {
                x: top_left.x,
                y: top_left.y,
                width: effective,
                height: effective,
            },
        });
    }

    FrameModel {
        range,
        cells,
        grid_lines: parsang_grid_lines(transform, range, cell_size, &request.grid),
        axis_labels: axis_labels(transform, range, cell_size, screen),
        location: request.location,
        current_outline_px: current_outline_px(transform.zoom()),
    }
}

pub fn current_outline_px(zoom: f64) -> u32 {
    ((2.0 * zoom) as u32).max(1)
}

/// The cell under a screen point, if it lies inside the world.
pub fn cell_at_screen(
    transform: &ViewportTransform,
    screen_point: Vec2,
    base_cell_size: f64,
    grid: &WorldGrid,
    level: u32,
) -> Option<ZoneCoordinate> {
    let world = transform.screen_to_world(screen_point);
    let grid_x = (world.x / base_cell_size).floor();
    let grid_y = (world.y / base_cell_size).floor();
    if !(0.0..grid.cells_x() as f64).contains(&grid_x) || !(0.0..grid.cells_y() as f64).contains(&grid_y) {
        return None;
    }
    Some(ZoneCoordinate::from_grid(grid_x as u32, grid_y as u32, level))
}
