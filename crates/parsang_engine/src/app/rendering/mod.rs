mod culling;
mod frame;
mod glyphs;
mod raster;
mod renderer;
mod transform;

pub use culling::{
    axis_labels, axis_labels_visible, grid_lines_visible, parsang_grid_lines, visible_cell_range,
    Axis, AxisLabel, CellRange, AXIS_LABEL_MIN_CELL_PX, GRID_LINE_MIN_CELL_PX,
};
pub use frame::{
    build_frame, cell_at_screen, current_outline_px, FrameModel, FrameRequest, VisibleCell,
};
pub use glyphs::{draw_text, glyph_advance, has_glyph, line_advance, text_width};
pub use raster::{Canvas, Rgba};
pub use renderer::Renderer;
pub use transform::{ScreenRect, Vec2, Viewport, ViewportTransform, ZoomDirection, ZoomLimits};
