use tracing::{debug, info};

use crate::config::MapConfig;
use crate::zones::{WorldGrid, ZoneCoordinate};

use super::input::FrameInput;
use super::rendering::{Vec2, Viewport, ViewportTransform};

/// Viewer-side state that input mutates: the transform, displayed level and HUD flag.
#[derive(Debug, Clone)]
pub struct ViewState {
    transform: ViewportTransform,
    level: u32,
    level_aware: bool,
    hud_visible: bool,
    pan_step_px: f64,
    cell_size_px: f64,
    grid: WorldGrid,
}

impl ViewState {
    pub fn new(map: &MapConfig) -> Self {
        Self {
            transform: ViewportTransform::new(map.zoom),
            level: map.surface_level,
            level_aware: map.level_aware,
            hud_visible: true,
            pan_step_px: map.pan_step_px,
            cell_size_px: map.cell_size_px,
            grid: map.grid,
        }
    }

    pub fn transform(&self) -> &ViewportTransform {
        &self.transform
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn level_aware(&self) -> bool {
        self.level_aware
    }

    pub fn hud_visible(&self) -> bool {
        self.hud_visible
    }

    pub fn apply_input(&mut self, input: &FrameInput, viewport: Viewport) {
        if input.reset_view {
            self.transform.reset();
            info!(zoom = self.transform.zoom(), "view_reset");
        }
        if input.toggle_hud {
            self.hud_visible = !self.hud_visible;
            info!(hud_visible = self.hud_visible, "hud_toggled");
        }
        if input.level_steps != 0 {
            self.step_level(input.level_steps);
        }

        if input.wheel_zoom_steps != 0 {
            let anchor = input
                .wheel_anchor
                .or(input.cursor)
                .unwrap_or_else(|| viewport.center());
            self.transform.zoom_steps_at(anchor, input.wheel_zoom_steps);
        }
        if input.key_zoom_steps != 0 {
            self.transform
                .zoom_steps_at(viewport.center(), input.key_zoom_steps);
        }

        // Dragging moves the map with the cursor, so the pan offset moves the other way.
        self.transform
            .pan_by(Vec2::new(-input.drag_delta.x, -input.drag_delta.y));
        self.transform.pan_by(Vec2::new(
            input.key_pan.x * self.pan_step_px,
            input.key_pan.y * self.pan_step_px,
        ));
    }

    fn step_level(&mut self, steps: i32) {
        if !self.level_aware {
            debug!(steps, level = self.level, "level_step_ignored");
            return;
        }
        let next = if steps > 0 {
            self.level.saturating_add(steps.unsigned_abs())
        } else {
            self.level.saturating_sub(steps.unsigned_abs())
        };
        if next != self.level {
            self.level = next;
            info!(level = self.level, "level_changed");
        }
    }

    /// Shows `coord`'s level (when level-aware) and centers the view on it.
    pub fn focus(&mut self, coord: ZoneCoordinate, viewport: Viewport) {
        if self.level_aware {
            self.level = coord.level();
        }
        let (grid_x, grid_y) = coord.grid_position();
        let center = Vec2::new(
            (grid_x as f64 + 0.5) * self.cell_size_px,
            (grid_y as f64 + 0.5) * self.cell_size_px,
        );
        self.transform.center_on(center, viewport.center());
    }

    pub fn cell_size_px(&self) -> f64 {
        self.cell_size_px
    }

    pub fn grid(&self) -> WorldGrid {
        self.grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Viewport = Viewport {
        width: 1280,
        height: 800,
    };

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn wheel_zoom_anchors_at_cursor() {
        let mut view = ViewState::new(&MapConfig::default());
        let cursor = Vec2::new(200.0, 150.0);
        let before = view.transform().screen_to_world(cursor);
        view.apply_input(
            &FrameInput {
                wheel_zoom_steps: 3,
                cursor: Some(cursor),
                ..FrameInput::default()
            },
            VIEWPORT,
        );
        let after = view.transform().screen_to_world(cursor);

        assert!(view.transform().zoom() > 1.0);
        assert!(approx_eq(before.x, after.x) && approx_eq(before.y, after.y));
    }

    #[test]
    fn wheel_zoom_prefers_the_scroll_position_over_the_final_cursor() {
        let mut view = ViewState::new(&MapConfig::default());
        let anchor = Vec2::new(320.0, 240.0);
        let before = view.transform().screen_to_world(anchor);
        view.apply_input(
            &FrameInput {
                wheel_zoom_steps: 2,
                wheel_anchor: Some(anchor),
                cursor: Some(Vec2::new(900.0, 700.0)),
                ..FrameInput::default()
            },
            VIEWPORT,
        );
        let after = view.transform().screen_to_world(anchor);
        assert!(approx_eq(before.x, after.x) && approx_eq(before.y, after.y));
    }

    #[test]
    fn key_zoom_anchors_at_viewport_center() {
        let mut view = ViewState::new(&MapConfig::default());
        let center = VIEWPORT.center();
        let before = view.transform().screen_to_world(center);
        view.apply_input(
            &FrameInput {
                key_zoom_steps: -2,
                cursor: Some(Vec2::new(3.0, 3.0)),
                ..FrameInput::default()
            },
            VIEWPORT,
        );
        let after = view.transform().screen_to_world(center);
        assert!(view.transform().zoom() < 1.0);
        assert!(approx_eq(before.x, after.x) && approx_eq(before.y, after.y));
    }

    #[test]
    fn drag_moves_the_map_with_the_cursor() {
        let mut view = ViewState::new(&MapConfig::default());
        let world = Vec2::new(80.0, 80.0);
        let before = view.transform().world_to_screen(world);
        view.apply_input(
            &FrameInput {
                drag_delta: Vec2::new(30.0, -12.0),
                ..FrameInput::default()
            },
            VIEWPORT,
        );
        let after = view.transform().world_to_screen(world);
        assert!(approx_eq(after.x - before.x, 30.0));
        assert!(approx_eq(after.y - before.y, -12.0));
    }

    #[test]
    fn arrow_pan_uses_configured_step() {
        let map = MapConfig {
            pan_step_px: 40.0,
            ..MapConfig::default()
        };
        let mut view = ViewState::new(&map);
        view.apply_input(
            &FrameInput {
                key_pan: Vec2::new(1.0, -1.0),
                ..FrameInput::default()
            },
            VIEWPORT,
        );
        assert_eq!(view.transform().pan(), Vec2::new(40.0, -40.0));
    }

    #[test]
    fn level_steps_only_in_level_aware_mode() {
        let mut view = ViewState::new(&MapConfig::default());
        let up = FrameInput {
            level_steps: 2,
            ..FrameInput::default()
        };
        view.apply_input(&up, VIEWPORT);
        assert_eq!(view.level(), 12);

        let fixed = MapConfig {
            level_aware: false,
            surface_level: 7,
            ..MapConfig::default()
        };
        let mut fixed_view = ViewState::new(&fixed);
        fixed_view.apply_input(&up, VIEWPORT);
        assert_eq!(fixed_view.level(), 7);
    }

    #[test]
    fn level_never_goes_below_zero() {
        let map = MapConfig {
            surface_level: 1,
            ..MapConfig::default()
        };
        let mut view = ViewState::new(&map);
        view.apply_input(
            &FrameInput {
                level_steps: -5,
                ..FrameInput::default()
            },
            VIEWPORT,
        );
        assert_eq!(view.level(), 0);
    }

    #[test]
    fn reset_and_hud_toggle() {
        let mut view = ViewState::new(&MapConfig::default());
        view.apply_input(
            &FrameInput {
                wheel_zoom_steps: 4,
                drag_delta: Vec2::new(10.0, 10.0),
                cursor: Some(Vec2::new(10.0, 10.0)),
                ..FrameInput::default()
            },
            VIEWPORT,
        );
        view.apply_input(
            &FrameInput {
                reset_view: true,
                toggle_hud: true,
                ..FrameInput::default()
            },
            VIEWPORT,
        );
        assert_eq!(view.transform().zoom(), 1.0);
        assert_eq!(view.transform().pan(), Vec2::ZERO);
        assert!(!view.hud_visible());
    }

    #[test]
    fn focus_centers_on_the_zone_and_switches_level() {
        let mut view = ViewState::new(&MapConfig::default());
        let joppa = ZoneCoordinate::new(11, 22, 1, 1, 10);
        view.focus(ZoneCoordinate::new(11, 22, 1, 1, 14), VIEWPORT);
        assert_eq!(view.level(), 14);

        view.focus(joppa, VIEWPORT);
        let (grid_x, grid_y) = joppa.grid_position();
        let center = view.transform().world_to_screen(Vec2::new(
            (grid_x as f64 + 0.5) * 8.0,
            (grid_y as f64 + 0.5) * 8.0,
        ));
        assert!(approx_eq(center.x, 640.0) && approx_eq(center.y, 400.0));
        assert_eq!(view.level(), 10);
    }
}
