use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use crate::app::overlay::{draw_hud, HudData};
use crate::zones::BACKGROUND_RGB;

use super::culling::Axis;
use super::frame::FrameModel;
use super::glyphs::{draw_text, text_width, GLYPH_ROWS};
use super::raster::{opaque, snap_span, Canvas, Rgba};
use super::transform::Viewport;

const CLEAR_COLOR: Rgba = [BACKGROUND_RGB[0], BACKGROUND_RGB[1], BACKGROUND_RGB[2], 255];
const CURRENT_OUTLINE_COLOR: Rgba = [255, 255, 0, 255];
const PARSANG_GRID_COLOR: Rgba = [80, 80, 80, 255];
const AXIS_LABEL_COLOR: Rgba = [176, 198, 220, 255];
const AXIS_LABEL_SCALE: i32 = 2;

pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    viewport: Viewport,
}

impl Renderer {
    pub fn new(window: Arc<Window>) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            viewport: Viewport {
                width: size.width,
                height: size.height,
            },
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.viewport = Viewport { width, height };
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub(crate) fn render(&mut self, model: &FrameModel, hud: Option<&HudData>) -> Result<(), Error> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Ok(());
        }

        let mut canvas = Canvas::new(
            self.pixels.frame_mut(),
            self.viewport.width,
            self.viewport.height,
        );
        paint_frame(&mut canvas, model, hud);

        self.pixels.render()
    }
}

/// Rasterizes a frame: cells, the current-zone border, parsang grid, axis labels, then the HUD.
pub(crate) fn paint_frame(canvas: &mut Canvas<'_>, model: &FrameModel, hud: Option<&HudData>) {
    canvas.clear(CLEAR_COLOR);

    for cell in &model.cells {
        if cell.color == BACKGROUND_RGB {
            continue;
        }
        let (x, width) = snap_span(cell.screen_rect.x, cell.screen_rect.width);
        let (y, height) = snap_span(cell.screen_rect.y, cell.screen_rect.height);
        canvas.fill_rect(x, y, width, height, opaque(cell.color));
    }

    // Outline after all fills so neighbouring cells never paint over it.
    for cell in model.cells.iter().filter(|cell| cell.is_current) {
        let (x, width) = snap_span(cell.screen_rect.x, cell.screen_rect.width);
        let (y, height) = snap_span(cell.screen_rect.y, cell.screen_rect.height);
        let thickness = i32::try_from(model.current_outline_px).unwrap_or(i32::MAX);
        canvas.outline_rect(x, y, width, height, thickness, CURRENT_OUTLINE_COLOR);
    }

    for line in &model.grid_lines {
        let (x, width) = snap_span(line.x, line.width);
        let (y, height) = snap_span(line.y, line.height);
        canvas.fill_rect(x, y, width, height, PARSANG_GRID_COLOR);
    }

    for label in &model.axis_labels {
        let x = label.position.x.round() as i32;
        let y = label.position.y.round() as i32;
        let (x, y) = match label.axis {
            Axis::Horizontal => (x - text_width(&label.text, AXIS_LABEL_SCALE) / 2, y),
            Axis::Vertical => (x, y - GLYPH_ROWS * AXIS_LABEL_SCALE / 2),
        };
        draw_text(canvas, x, y, &label.text, AXIS_LABEL_SCALE, AXIS_LABEL_COLOR);
    }

    if let Some(data) = hud {
        draw_hud(canvas, data);
    }
}
