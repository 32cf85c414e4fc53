use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width as f64 * 0.5, self.height as f64 * 0.5)
    }

    pub fn screen_rect(&self) -> ScreenRect {
        ScreenRect {
            x: 0.0,
            y: 0.0,
            width: self.width as f64,
            height: self.height as f64,
        }
    }
}

/// Axis-aligned rectangle in screen pixels; `x`/`y` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ScreenRect {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    pub fn intersects(&self, other: &ScreenRect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ZoomLimits {
    pub min: f64,
    pub max: f64,
    /// Each zoom step multiplies or divides by `1 + speed`.
    pub speed: f64,
    pub initial: f64,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            min: 0.2,
            max: 10.0,
            speed: 0.1,
            initial: 1.0,
        }
    }
}

impl ZoomLimits {
    pub fn clamp(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min, self.max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

impl ZoomDirection {
    pub fn from_steps(steps: i32) -> Option<Self> {
        match steps.signum() {
            1 => Some(ZoomDirection::In),
            -1 => Some(ZoomDirection::Out),
            _ => None,
        }
    }
}

/// Zoom and pan over world-pixel space.
///
/// `screen = world * zoom - pan + origin`. `pan` is unconstrained; `zoom`
/// never leaves the configured limits, and the limits keep it above zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportTransform {
    zoom: f64,
    pan: Vec2,
    origin: Vec2,
    limits: ZoomLimits,
}

impl ViewportTransform {
    pub fn new(limits: ZoomLimits) -> Self {
        Self {
            zoom: limits.clamp(limits.initial),
            pan: Vec2::ZERO,
            origin: Vec2::ZERO,
            limits,
        }
    }

    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn pan(&self) -> Vec2 {
        self.pan
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn limits(&self) -> ZoomLimits {
        self.limits
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        Vec2::new(
            world.x * self.zoom - self.pan.x + self.origin.x,
            world.y * self.zoom - self.pan.y + self.origin.y,
        )
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        Vec2::new(
            (screen.x - self.origin.x + self.pan.x) / self.zoom,
            (screen.y - self.origin.y + self.pan.y) / self.zoom,
        )
    }

    /// Steps the zoom once, keeping the world point under `anchor` fixed on screen.
    pub fn zoom_at(&mut self, anchor: Vec2, direction: ZoomDirection) {
        let factor = 1.0 + self.limits.speed;
        let requested = match direction {
            ZoomDirection::In => self.zoom * factor,
            ZoomDirection::Out => self.zoom / factor,
        };

        let before = self.screen_to_world(anchor);
        self.zoom = self.limits.clamp(requested);
        let after = self.screen_to_world(anchor);
        self.pan.x -= (after.x - before.x) * self.zoom;
        self.pan.y -= (after.y - before.y) * self.zoom;
    }

    /// Applies `steps` zoom steps; positive zooms in.
    pub fn zoom_steps_at(&mut self, anchor: Vec2, steps: i32) {
        let Some(direction) = ZoomDirection::from_steps(steps) else {
            return;
        };
        for _ in 0..steps.unsigned_abs() {
            self.zoom_at(anchor, direction);
        }
    }

    pub fn pan_by(&mut self, delta_screen: Vec2) {
        self.pan.x += delta_screen.x;
        self.pan.y += delta_screen.y;
    }

    /// Back to the initial zoom with the world origin at the screen origin.
    pub fn reset(&mut self) {
        self.zoom = self.limits.clamp(self.limits.initial);
        self.pan = Vec2::ZERO;
    }

    /// Pans so that `world` lands on `screen`.
    pub fn center_on(&mut self, world: Vec2, screen: Vec2) {
        self.pan.x = world.x * self.zoom + self.origin.x - screen.x;
        self.pan.y = world.y * self.zoom + self.origin.y - screen.y;
    }

    pub fn effective_cell_size(&self, base_cell_size: f64) -> f64 {
        base_cell_size * self.zoom
    }
}
