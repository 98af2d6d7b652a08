use crate::assets::{AssetCatalog, AssetKey};
use crate::draw::{DrawContext, Rgba, TextAlign};
use crate::geometry::{Rect, Vec2};

use super::font::{glyph_rows, text_width_px, GLYPH_ADVANCE, GLYPH_HEIGHT, GLYPH_WIDTH, TEXT_SCALE};
use super::store::AssetStore;

/// 2D affine transform `(x, y) -> (a*x + c*y + e, b*x + d*y + f)`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Affine {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Affine {
    const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    fn apply(&self, point: Vec2) -> Vec2 {
        Vec2::new(
            self.a * point.x + self.c * point.y + self.e,
            self.b * point.x + self.d * point.y + self.f,
        )
    }

    fn inverse(&self) -> Option<Self> {
        let det = self.a * self.d - self.b * self.c;
        if !det.is_finite() || det.abs() < f32::EPSILON {
            return None;
        }
        let inv = det.recip();
        Some(Self {
            a: self.d * inv,
            b: -self.b * inv,
            c: -self.c * inv,
            d: self.a * inv,
            e: (self.c * self.f - self.d * self.e) * inv,
            f: (self.b * self.e - self.a * self.f) * inv,
        })
    }

    fn translated(self, dx: f32, dy: f32) -> Self {
        Self {
            e: self.e + self.a * dx + self.c * dy,
            f: self.f + self.b * dx + self.d * dy,
            ..self
        }
    }

    fn scaled(self, sx: f32, sy: f32) -> Self {
        Self {
            a: self.a * sx,
            b: self.b * sx,
            c: self.c * sy,
            d: self.d * sy,
            ..self
        }
    }

    fn rotated(self, radians: f32) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self {
            a: self.a * cos + self.c * sin,
            b: self.b * cos + self.d * sin,
            c: self.c * cos - self.a * sin,
            d: self.d * cos - self.b * sin,
            ..self
        }
    }

    fn linear_scale(&self) -> f32 {
        (self.a * self.d - self.b * self.c).abs().sqrt()
    }
}

/// Software rasterizer over an RGBA8 frame buffer.
pub(crate) struct PixelCanvas<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
    images: &'a AssetStore,
    transform: Affine,
    saved: Vec<Affine>,
}

impl<'a> PixelCanvas<'a> {
    pub(crate) fn new(frame: &'a mut [u8], width: u32, height: u32, images: &'a AssetStore) -> Self {
        Self {
            frame,
            width,
            height,
            images,
            transform: Affine::IDENTITY,
            saved: Vec::new(),
        }
    }

    pub(crate) fn clear(&mut self, color: Rgba) {
        for pixel in self.frame.chunks_exact_mut(4) {
            pixel.copy_from_slice(&color);
        }
    }

    /// Covers every frame pixel whose center maps inside `rect` under the current transform.
    fn raster_rect(&mut self, rect: Rect, mut shade: impl FnMut(f32, f32) -> Option<Rgba>) {
        if rect.width <= 0.0 || rect.height <= 0.0 || self.width == 0 || self.height == 0 {
            return;
        }
        let Some(inverse) = self.transform.inverse() else {
            return;
        };
        let corners = [
            self.transform.apply(Vec2::new(rect.x, rect.y)),
            self.transform.apply(Vec2::new(rect.right(), rect.y)),
            self.transform.apply(Vec2::new(rect.x, rect.bottom())),
            self.transform.apply(Vec2::new(rect.right(), rect.bottom())),
        ];
        let (min_x, max_x, min_y, max_y) = corners.iter().fold(
            (f32::MAX, f32::MIN, f32::MAX, f32::MIN),
            |(min_x, max_x, min_y, max_y), corner| {
                (
                    min_x.min(corner.x),
                    max_x.max(corner.x),
                    min_y.min(corner.y),
                    max_y.max(corner.y),
                )
            },
        );
        let Some((left, right)) = clip_span(min_x, max_x, self.width) else {
            return;
        };
        let Some((top, bottom)) = clip_span(min_y, max_y, self.height) else {
            return;
        };

        for py in top..bottom {
            for px in left..right {
                let local = inverse.apply(Vec2::new(px as f32 + 0.5, py as f32 + 0.5));
                if local.x < rect.x
                    || local.x >= rect.right()
                    || local.y < rect.y
                    || local.y >= rect.bottom()
                {
                    continue;
                }
                if let Some(color) = shade(local.x, local.y) {
                    blend_pixel(self.frame, self.width, px, py, color);
                }
            }
        }
    }

    fn draw_glyph(&mut self, ch: char, origin_x: i32, origin_y: i32, color: Rgba) {
        for (row_index, bits) in glyph_rows(ch).iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                    continue;
                }
                let x0 = origin_x + col * TEXT_SCALE;
                let y0 = origin_y + row_index as i32 * TEXT_SCALE;
                for sy in 0..TEXT_SCALE {
                    for sx in 0..TEXT_SCALE {
                        let (x, y) = (x0 + sx, y0 + sy);
                        if x >= 0 && y >= 0 {
                            blend_pixel(self.frame, self.width, x as u32, y as u32, color);
                        }
                    }
                }
            }
        }
    }
}

impl DrawContext for PixelCanvas<'_> {
    fn viewport_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn image_size(&self, key: &AssetKey) -> Option<(u32, u32)> {
        self.images.image_size(key)
    }

    fn draw_image_region(&mut self, key: &AssetKey, src: Rect, dst: Rect) {
        let images = self.images;
        let Some(image) = images.get(key) else {
            return;
        };
        if dst.width <= 0.0 || dst.height <= 0.0 {
            return;
        }
        let scale_x = src.width / dst.width;
        let scale_y = src.height / dst.height;
        self.raster_rect(dst, |lx, ly| {
            let sx = src.x + (lx - dst.x) * scale_x;
            let sy = src.y + (ly - dst.y) * scale_y;
            if sx < 0.0 || sy < 0.0 {
                return None;
            }
            let texel = image.sample(sx.floor() as u32, sy.floor() as u32);
            (texel[3] > 0).then_some(texel)
        });
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        self.raster_rect(rect, |_, _| Some(color));
    }

    fn stroke_rect(&mut self, rect: Rect, color: Rgba) {
        let line = self.transform.linear_scale().max(f32::EPSILON).recip();
        self.fill_rect(Rect::new(rect.x, rect.y, rect.width, line), color);
        self.fill_rect(Rect::new(rect.x, rect.bottom() - line, rect.width, line), color);
        self.fill_rect(Rect::new(rect.x, rect.y, line, rect.height), color);
        self.fill_rect(Rect::new(rect.right() - line, rect.y, line, rect.height), color);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        let center = self.transform.apply(center);
        let radius = radius * self.transform.linear_scale();
        if radius <= 0.0 {
            return;
        }
        let Some((left, right)) = clip_span(center.x - radius, center.x + radius, self.width) else {
            return;
        };
        let Some((top, bottom)) = clip_span(center.y - radius, center.y + radius, self.height)
        else {
            return;
        };
        let radius_sq = radius * radius;
        for py in top..bottom {
            for px in left..right {
                let dx = px as f32 + 0.5 - center.x;
                let dy = py as f32 + 0.5 - center.y;
                if dx * dx + dy * dy <= radius_sq {
                    blend_pixel(self.frame, self.width, px, py, color);
                }
            }
        }
    }

    /// `position` is the baseline anchor; text is not affected by scale or rotation.
    fn draw_text(&mut self, text: &str, position: Vec2, align: TextAlign, color: Rgba) {
        let anchor = self.transform.apply(position);
        let width = text_width_px(text);
        let mut x = match align {
            TextAlign::Left => anchor.x.round() as i32,
            TextAlign::Center => anchor.x.round() as i32 - width / 2,
            TextAlign::Right => anchor.x.round() as i32 - width,
        };
        let y = anchor.y.round() as i32 - GLYPH_HEIGHT * TEXT_SCALE;
        for ch in text.chars() {
            self.draw_glyph(ch, x, y, color);
            x += GLYPH_ADVANCE;
        }
    }

    fn save(&mut self) {
        self.saved.push(self.transform);
    }

    fn restore(&mut self) {
        if let Some(transform) = self.saved.pop() {
            self.transform = transform;
        }
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.transform = self.transform.translated(dx, dy);
    }

    fn rotate(&mut self, radians: f32) {
        self.transform = self.transform.rotated(radians);
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        self.transform = self.transform.scaled(sx, sy);
    }
}

/// Pixel index range `[start, end)` covering `[min, max]`, clipped to `[0, limit)`.
fn clip_span(min: f32, max: f32, limit: u32) -> Option<(u32, u32)> {
    if !min.is_finite() || !max.is_finite() {
        return None;
    }
    let start = min.floor().max(0.0);
    let end = max.ceil().min(limit as f32);
    (start < end).then(|| (start as u32, end as u32))
}

fn blend_pixel(frame: &mut [u8], width: u32, x: u32, y: u32, color: Rgba) {
    if x >= width {
        return;
    }
    let offset = (y as usize * width as usize + x as usize) * 4;
    let Some(dst) = frame.get_mut(offset..offset + 4) else {
        return;
    };
    match color[3] {
        0 => {}
        255 => dst.copy_from_slice(&color),
        alpha => {
            let alpha = u16::from(alpha);
            for channel in 0..3 {
                let src = u16::from(color[channel]);
                let base = u16::from(dst[channel]);
                dst[channel] = ((src * alpha + base * (255 - alpha)) / 255) as u8;
            }
            dst[3] = 255;
        }
    }
}
