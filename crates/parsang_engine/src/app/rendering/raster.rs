use crate::zones::Rgb;

pub type Rgba = [u8; 4];

pub fn opaque(rgb: Rgb) -> Rgba {
    [rgb[0], rgb[1], rgb[2], 255]
}

/// An RGBA8 frame buffer with clipped drawing. Writes outside the buffer are dropped.
pub struct Canvas<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
}

impl<'a> Canvas<'a> {
    pub fn new(frame: &'a mut [u8], width: u32, height: u32) -> Self {
        Self {
            frame,
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn clear(&mut self, color: Rgba) {
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&color);
        }
    }

    pub fn put_pixel(&mut self, x: i32, y: i32, color: Rgba) {
        if let Some(range) = self.pixel_range(x, y) {
            self.frame[range].copy_from_slice(&color);
        }
    }

    /// Alpha-blends `color` over the existing pixel.
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: Rgba) {
        let Some(range) = self.pixel_range(x, y) else {
            return;
        };
        let alpha = color[3] as u32;
        let pixel = &mut self.frame[range];
        for channel in 0..3 {
            let src = color[channel] as u32;
            let dst = pixel[channel] as u32;
            pixel[channel] = ((src * alpha + dst * (255 - alpha)) / 255) as u8;
        }
        pixel[3] = 255;
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, rect_width: i32, rect_height: i32, color: Rgba) {
        let Some((x0, y0, x1, y1)) = self.clip(x, y, rect_width, rect_height) else {
            return;
        };
        for py in y0..y1 {
            for px in x0..x1 {
                self.put_pixel(px, py, color);
            }
        }
    }

    pub fn blend_rect(&mut self, x: i32, y: i32, rect_width: i32, rect_height: i32, color: Rgba) {
        let Some((x0, y0, x1, y1)) = self.clip(x, y, rect_width, rect_height) else {
            return;
        };
        for py in y0..y1 {
            for px in x0..x1 {
                self.blend_pixel(px, py, color);
            }
        }
    }

    /// Draws a border `thickness` pixels wide inside the rectangle.
    pub fn outline_rect(
        &mut self,
        x: i32,
        y: i32,
        rect_width: i32,
        rect_height: i32,
        thickness: i32,
        color: Rgba,
    ) {
        if rect_width <= 0 || rect_height <= 0 || thickness <= 0 {
            return;
        }
        let t = thickness.min(rect_width).min(rect_height);
        self.fill_rect(x, y, rect_width, t, color);
        self.fill_rect(x, y + rect_height - t, rect_width, t, color);
        self.fill_rect(x, y, t, rect_height, color);
        self.fill_rect(x + rect_width - t, y, t, rect_height, color);
    }

    fn clip(&self, x: i32, y: i32, rect_width: i32, rect_height: i32) -> Option<(i32, i32, i32, i32)> {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = x.saturating_add(rect_width).min(self.width as i32);
        let y1 = y.saturating_add(rect_height).min(self.height as i32);
        (x1 > x0 && y1 > y0).then_some((x0, y0, x1, y1))
    }

    fn pixel_range(&self, x: i32, y: i32) -> Option<std::ops::Range<usize>> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        let pixel_offset = (y as usize)
            .checked_mul(self.width as usize)?
            .checked_add(x as usize)?;
        let start = pixel_offset.checked_mul(4)?;
        let end = start.checked_add(4)?;
        (end <= self.frame.len()).then_some(start..end)
    }
}

/// Snaps a floating screen span to whole pixels so adjacent spans share edges without gaps.
pub fn snap_span(start: f64, length: f64) -> (i32, i32) {
    let first = start.floor();
    let last = (start + length).floor();
    (first as i32, (last - first).max(1.0) as i32)
}
