use crate::assets::AssetKey;
use crate::draw::DrawContext;
use crate::geometry::{Rect, Size, Vec2};

/// Where a door leads: a room index plus a named entry point in that room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoorLink {
    pub target_room: usize,
    pub entry_point: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Decoration {
    pub kind: String,
    pub position: Vec2,
    /// Unscaled source size in pixels; the whole image is drawn.
    pub size: Size,
    pub image: AssetKey,
    pub solid: bool,
    pub scale: f32,
    pub door: Option<DoorLink>,
}

impl Decoration {
    /// Solid, unscaled, not a door.
    pub fn new(kind: impl Into<String>, position: Vec2, size: Size, image: AssetKey) -> Self {
        Self {
            kind: kind.into(),
            position,
            size,
            image,
            solid: true,
            scale: 1.0,
            door: None,
        }
    }

    pub fn passable(mut self) -> Self {
        self.solid = false;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_door(mut self, target_room: usize, entry_point: impl Into<String>) -> Self {
        self.door = Some(DoorLink {
            target_room,
            entry_point: entry_point.into(),
        });
        self
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.size.width * self.scale,
            self.size.height * self.scale,
        )
    }

    pub fn is_door(&self) -> bool {
        self.door.is_some()
    }

    pub fn render(&self, ctx: &mut dyn DrawContext, viewport_origin: Vec2) {
        let Some((width, height)) = ctx.image_size(&self.image) else {
            return;
        };
        let src = Rect::new(0.0, 0.0, width as f32, height as f32);
        let dst = self.bounds().translated(-viewport_origin);
        ctx.draw_image_region(&self.image, src, dst);
    }
}
