use crate::assets::{AssetCatalog, AssetKey, ImageSizes};
use crate::geometry::{Rect, Vec2};

/// Straight (non-premultiplied) RGBA.
pub type Rgba = [u8; 4];

pub const WHITE: Rgba = [255, 255, 255, 255];
pub const BLACK: Rgba = [0, 0, 0, 255];
pub const YELLOW: Rgba = [255, 255, 0, 255];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Immediate-mode 2D drawing surface with a save/restore transform stack.
///
/// Image draws for keys that are not loaded are silently ignored by implementations.
pub trait DrawContext {
    fn viewport_size(&self) -> (u32, u32);
    fn image_size(&self, key: &AssetKey) -> Option<(u32, u32)>;
    fn draw_image_region(&mut self, key: &AssetKey, src: Rect, dst: Rect);
    fn fill_rect(&mut self, rect: Rect, color: Rgba);
    fn stroke_rect(&mut self, rect: Rect, color: Rgba);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba);
    fn draw_text(&mut self, text: &str, position: Vec2, align: TextAlign, color: Rgba);
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, dx: f32, dy: f32);
    fn rotate(&mut self, radians: f32);
    fn scale(&mut self, sx: f32, sy: f32);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Image { key: AssetKey, src: Rect, dst: Rect },
    FillRect { rect: Rect, color: Rgba },
    StrokeRect { rect: Rect, color: Rgba },
    FillCircle { center: Vec2, radius: f32, color: Rgba },
    Text {
        text: String,
        position: Vec2,
        align: TextAlign,
        color: Rgba,
    },
    Save,
    Restore,
    Translate { dx: f32, dy: f32 },
    Rotate { radians: f32 },
    Scale { sx: f32, sy: f32 },
}

/// A [`DrawContext`] that records commands instead of rasterizing.
///
/// Image draws for unknown keys are dropped, matching the software canvas.
#[derive(Debug, Clone)]
pub struct RecordingContext {
    width: u32,
    height: u32,
    images: ImageSizes,
    commands: Vec<DrawCommand>,
}

impl RecordingContext {
    pub fn new(width: u32, height: u32, images: ImageSizes) -> Self {
        Self {
            width,
            height,
            images,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn images_drawn(&self) -> impl Iterator<Item = (&AssetKey, Rect)> + '_ {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Image { key, dst, .. } => Some((key, *dst)),
            _ => None,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> + '_ {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }
}

impl DrawContext for RecordingContext {
    fn viewport_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn image_size(&self, key: &AssetKey) -> Option<(u32, u32)> {
        self.images.image_size(key)
    }

    fn draw_image_region(&mut self, key: &AssetKey, src: Rect, dst: Rect) {
        if self.images.is_loaded(key) {
            self.push(DrawCommand::Image {
                key: key.clone(),
                src,
                dst,
            });
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        self.push(DrawCommand::FillRect { rect, color });
    }

    fn stroke_rect(&mut self, rect: Rect, color: Rgba) {
        self.push(DrawCommand::StrokeRect { rect, color });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        self.push(DrawCommand::FillCircle {
            center,
            radius,
            color,
        });
    }

    fn draw_text(&mut self, text: &str, position: Vec2, align: TextAlign, color: Rgba) {
        self.push(DrawCommand::Text {
            text: text.to_string(),
            position,
            align,
            color,
        });
    }

    fn save(&mut self) {
        self.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        self.push(DrawCommand::Restore);
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.push(DrawCommand::Translate { dx, dy });
    }

    fn rotate(&mut self, radians: f32) {
        self.push(DrawCommand::Rotate { radians });
    }

    fn scale(&mut self, sx: f32, sy: f32) {
        self.push(DrawCommand::Scale { sx, sy });
    }
}
