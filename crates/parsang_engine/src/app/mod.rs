mod input;
mod loop_runner;
mod metrics;
mod overlay;
mod rendering;
mod view_state;

pub use input::{FrameInput, ViewerKey};
pub use loop_runner::{run_viewer, AppError, LoopConfig, DEFAULT_WINDOW_TITLE};
pub use metrics::LoopMetricsSnapshot;
pub use overlay::HudData;
pub use rendering::{
    axis_labels, axis_labels_visible, build_frame, cell_at_screen, current_outline_px,
    grid_lines_visible, has_glyph, parsang_grid_lines, text_width, visible_cell_range, Axis,
    AxisLabel, CellRange, FrameModel, FrameRequest, Renderer, ScreenRect, Vec2, Viewport,
    ViewportTransform, VisibleCell, ZoomDirection, ZoomLimits, AXIS_LABEL_MIN_CELL_PX,
    GRID_LINE_MIN_CELL_PX,
};
pub use view_state::ViewState;
