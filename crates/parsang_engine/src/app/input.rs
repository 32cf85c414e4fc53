use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta};
use winit::keyboard::{KeyCode, PhysicalKey};

use super::rendering::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewerKey {
    ZoomIn,
    ZoomOut,
    PanUp,
    PanDown,
    PanLeft,
    PanRight,
    LevelUp,
    LevelDown,
    ResetView,
    ToggleHud,
    Quit,
}

const KEY_COUNT: usize = 11;

impl ViewerKey {
    pub fn from_physical(key: PhysicalKey) -> Option<Self> {
        let PhysicalKey::Code(code) = key else {
            return None;
        };
        match code {
            KeyCode::Equal | KeyCode::NumpadAdd => Some(ViewerKey::ZoomIn),
            KeyCode::Minus | KeyCode::NumpadSubtract => Some(ViewerKey::ZoomOut),
            KeyCode::ArrowUp => Some(ViewerKey::PanUp),
            KeyCode::ArrowDown => Some(ViewerKey::PanDown),
            KeyCode::ArrowLeft => Some(ViewerKey::PanLeft),
            KeyCode::ArrowRight => Some(ViewerKey::PanRight),
            KeyCode::PageUp => Some(ViewerKey::LevelUp),
            KeyCode::PageDown => Some(ViewerKey::LevelDown),
            KeyCode::Home => Some(ViewerKey::ResetView),
            KeyCode::F3 => Some(ViewerKey::ToggleHud),
            KeyCode::Escape => Some(ViewerKey::Quit),
            _ => None,
        }
    }

    const fn index(self) -> usize {
        match self {
            ViewerKey::ZoomIn => 0,
            ViewerKey::ZoomOut => 1,
            ViewerKey::PanUp => 2,
            ViewerKey::PanDown => 3,
            ViewerKey::PanLeft => 4,
            ViewerKey::PanRight => 5,
            ViewerKey::LevelUp => 6,
            ViewerKey::LevelDown => 7,
            ViewerKey::ResetView => 8,
            ViewerKey::ToggleHud => 9,
            ViewerKey::Quit => 10,
        }
    }
}

/// Everything the view needs from one frame's worth of input.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
    /// Wheel steps, anchored at `wheel_anchor`. Positive zooms in.
    pub wheel_zoom_steps: i32,
    /// Cursor position when the first wheel step of the frame arrived.
    pub wheel_anchor: Option<Vec2>,
    /// `+`/`-` presses, anchored at the viewport center.
    pub key_zoom_steps: i32,
    /// Middle-drag movement in screen pixels.
    pub drag_delta: Vec2,
    /// Arrow-key presses as unit directions; scaled by the configured pan step.
    pub key_pan: Vec2,
    pub level_steps: i32,
    pub reset_view: bool,
    pub toggle_hud: bool,
    pub cursor: Option<Vec2>,
}

/// Collects window events between frames. Key presses are edge-triggered:
/// holding a key counts once until it is released.
#[derive(Debug, Default)]
pub(crate) struct InputCollector {
    pub(crate) quit_requested: bool,
    keys_down: [bool; KEY_COUNT],
    pending: FrameInput,
    cursor_position_px: Option<Vec2>,
    middle_mouse_is_down: bool,
}

impl InputCollector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn mark_quit_requested(&mut self) {
        self.quit_requested = true;
    }

    pub(crate) fn handle_keyboard_input(&mut self, key_event: &KeyEvent) {
        self.handle_key(key_event.physical_key, key_event.state);
    }

    pub(crate) fn handle_key(&mut self, key: PhysicalKey, state: ElementState) {
        let Some(key) = ViewerKey::from_physical(key) else {
            return;
        };
        let slot = &mut self.keys_down[key.index()];
        match state {
            ElementState::Pressed => {
                let was_down = *slot;
                *slot = true;
                if !was_down {
                    self.on_key_pressed(key);
                }
            }
            ElementState::Released => *slot = false,
        }
    }

    fn on_key_pressed(&mut self, key: ViewerKey) {
        let pending = &mut self.pending;
        match key {
            ViewerKey::ZoomIn => pending.key_zoom_steps = pending.key_zoom_steps.saturating_add(1),
            ViewerKey::ZoomOut => pending.key_zoom_steps = pending.key_zoom_steps.saturating_sub(1),
            ViewerKey::PanUp => pending.key_pan.y -= 1.0,
            ViewerKey::PanDown => pending.key_pan.y += 1.0,
            ViewerKey::PanLeft => pending.key_pan.x -= 1.0,
            ViewerKey::PanRight => pending.key_pan.x += 1.0,
            ViewerKey::LevelUp => pending.level_steps = pending.level_steps.saturating_add(1),
            ViewerKey::LevelDown => pending.level_steps = pending.level_steps.saturating_sub(1),
            ViewerKey::ResetView => pending.reset_view = true,
            ViewerKey::ToggleHud => pending.toggle_hud = !pending.toggle_hud,
            ViewerKey::Quit => self.quit_requested = true,
        }
    }

    pub(crate) fn handle_mouse_input(&mut self, button: MouseButton, state: ElementState) {
        if button == MouseButton::Middle {
            self.middle_mouse_is_down = state == ElementState::Pressed;
        }
    }

    pub(crate) fn handle_mouse_wheel(&mut self, delta: MouseScrollDelta) {
        let steps = zoom_steps_from_scroll_delta(delta);
        if steps == 0 {
            return;
        }
        if self.pending.wheel_anchor.is_none() {
            self.pending.wheel_anchor = self.cursor_position_px;
        }
        self.pending.wheel_zoom_steps = self.pending.wheel_zoom_steps.saturating_add(steps);
    }

    pub(crate) fn set_cursor_position_px(&mut self, x: f64, y: f64) {
        let position = Vec2::new(x, y);
        if self.middle_mouse_is_down {
            if let Some(previous) = self.cursor_position_px {
                self.pending.drag_delta.x += position.x - previous.x;
                self.pending.drag_delta.y += position.y - previous.y;
            }
        }
        self.cursor_position_px = Some(position);
    }

    pub(crate) fn clear_cursor_position(&mut self) {
        self.cursor_position_px = None;
    }

    pub(crate) fn take_frame_input(&mut self) -> FrameInput {
        let mut input = std::mem::take(&mut self.pending);
        input.cursor = self.cursor_position_px;
        input
    }
}

pub(crate) fn zoom_steps_from_scroll_delta(delta: MouseScrollDelta) -> i32 {
    let y = match delta {
        MouseScrollDelta::LineDelta(_, y) => return y.round() as i32,
        MouseScrollDelta::PixelDelta(position) => position.y,
    };
    if y > 0.0 {
        1
    } else if y < 0.0 {
        -1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(input: &mut InputCollector, code: KeyCode) {
        input.handle_key(PhysicalKey::Code(code), ElementState::Pressed);
    }

    fn release(input: &mut InputCollector, code: KeyCode) {
        input.handle_key(PhysicalKey::Code(code), ElementState::Released);
    }

    #[test]
    fn held_keys_do_not_repeat() {
        let mut input = InputCollector::new();
        press(&mut input, KeyCode::Equal);
        press(&mut input, KeyCode::Equal);
        assert_eq!(input.take_frame_input().key_zoom_steps, 1);
        press(&mut input, KeyCode::Equal);
        assert_eq!(input.take_frame_input().key_zoom_steps, 0);

        release(&mut input, KeyCode::Equal);
        press(&mut input, KeyCode::Equal);
        press(&mut input, KeyCode::Minus);
        assert_eq!(input.take_frame_input().key_zoom_steps, 0);
    }

    #[test]
    fn hud_toggle_and_reset_are_single_frame_edges() {
        let mut input = InputCollector::new();
        press(&mut input, KeyCode::F3);
        press(&mut input, KeyCode::Home);
        let first = input.take_frame_input();
        let second = input.take_frame_input();

        assert!(first.toggle_hud);
        assert!(first.reset_view);
        assert!(!second.toggle_hud);
        assert!(!second.reset_view);
    }

    #[test]
    fn arrows_and_page_keys_accumulate_until_taken() {
        let mut input = InputCollector::new();
        press(&mut input, KeyCode::ArrowLeft);
        press(&mut input, KeyCode::ArrowDown);
        press(&mut input, KeyCode::PageUp);
        release(&mut input, KeyCode::PageUp);
        press(&mut input, KeyCode::PageUp);

        let frame = input.take_frame_input();
        assert_eq!(frame.key_pan, Vec2::new(-1.0, 1.0));
        assert_eq!(frame.level_steps, 2);
    }

    #[test]
    fn escape_requests_quit() {
        let mut input = InputCollector::new();
        press(&mut input, KeyCode::Escape);
        assert!(input.quit_requested);
    }

    #[test]
    fn middle_drag_accumulates_cursor_motion_only_while_held() {
        let mut input = InputCollector::new();
        input.set_cursor_position_px(100.0, 100.0);
        input.set_cursor_position_px(110.0, 90.0);
        assert_eq!(input.take_frame_input().drag_delta, Vec2::ZERO);

        input.handle_mouse_input(MouseButton::Middle, ElementState::Pressed);
        input.set_cursor_position_px(120.0, 95.0);
        input.set_cursor_position_px(125.0, 80.0);
        input.handle_mouse_input(MouseButton::Middle, ElementState::Released);
        input.set_cursor_position_px(300.0, 300.0);

        let frame = input.take_frame_input();
        assert_eq!(frame.drag_delta, Vec2::new(15.0, -10.0));
        assert_eq!(frame.cursor, Some(Vec2::new(300.0, 300.0)));
    }

    #[test]
    fn left_button_does_not_drag() {
        let mut input = InputCollector::new();
        input.set_cursor_position_px(0.0, 0.0);
        input.handle_mouse_input(MouseButton::Left, ElementState::Pressed);
        input.set_cursor_position_px(50.0, 50.0);
        assert_eq!(input.take_frame_input().drag_delta, Vec2::ZERO);
    }

    #[test]
    fn wheel_steps_sum_and_reset() {
        let mut input = InputCollector::new();
        input.handle_mouse_wheel(MouseScrollDelta::LineDelta(0.0, 1.0));
        input.handle_mouse_wheel(MouseScrollDelta::LineDelta(0.0, 2.0));
        input.handle_mouse_wheel(MouseScrollDelta::PixelDelta(
            winit::dpi::PhysicalPosition::new(0.0, -12.5),
        ));
        assert_eq!(input.take_frame_input().wheel_zoom_steps, 2);
        assert_eq!(input.take_frame_input().wheel_zoom_steps, 0);
    }

    #[test]
    fn wheel_anchor_is_where_the_cursor_was_when_scrolling() {
        let mut input = InputCollector::new();
        input.set_cursor_position_px(40.0, 30.0);
        input.handle_mouse_wheel(MouseScrollDelta::LineDelta(0.0, 0.0));
        input.set_cursor_position_px(100.0, 80.0);
        input.handle_mouse_wheel(MouseScrollDelta::LineDelta(0.0, 1.0));
        input.set_cursor_position_px(250.0, 200.0);
        input.handle_mouse_wheel(MouseScrollDelta::LineDelta(0.0, 1.0));
        input.set_cursor_position_px(300.0, 260.0);

        let frame = input.take_frame_input();
        assert_eq!(frame.wheel_zoom_steps, 2);
        assert_eq!(frame.wheel_anchor, Some(Vec2::new(100.0, 80.0)));
        assert_eq!(frame.cursor, Some(Vec2::new(300.0, 260.0)));
        assert_eq!(input.take_frame_input().wheel_anchor, None);
    }

    #[test]
    fn pixel_delta_maps_to_one_step() {
        let step = |y: f64| {
            zoom_steps_from_scroll_delta(MouseScrollDelta::PixelDelta(
                winit::dpi::PhysicalPosition::new(0.0, y),
            ))
        };
        assert_eq!(step(40.0), 1);
        assert_eq!(step(-0.5), -1);
        assert_eq!(step(0.0), 0);
    }

    #[test]
    fn cursor_leaving_clears_position() {
        let mut input = InputCollector::new();
        input.set_cursor_position_px(5.0, 5.0);
        input.clear_cursor_position();
        assert_eq!(input.take_frame_input().cursor, None);
    }
}
