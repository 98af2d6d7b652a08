use tracing::{debug, warn};

use crate::assets::{AssetCatalog, AssetKey};
use crate::draw::{DrawContext, TextAlign, WHITE};
use crate::geometry::{Rect, Size, Vec2};
use crate::world::World;

mod animation;
mod facing;

pub use animation::{FrameTable, FrameTableError, SheetLayout, WALK_CYCLE_LEN};
pub use facing::{Facing, SpriteRow};

pub const ANIMATION_FRAME_MS: f32 = 150.0;
pub const GREETING_DURATION_MS: f32 = 2000.0;
pub const GREETING_FRAME_COUNT: u32 = 5;
/// Greeting strip is drawn this far above the sprite's top edge.
pub const GREETING_OFFSET_PX: f32 = 50.0;
pub const CLOSE_DISTANCE_PX: f32 = 150.0;
const NAME_LABEL_OFFSET_PX: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnimationState {
    #[default]
    Idle,
    Walking,
    Greeting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GreetingSide {
    Left,
    Right,
}

#[derive(Debug, Clone)]
pub struct ActorConfig {
    pub name: String,
    pub sprite_sheet: AssetKey,
    pub greeting_left: AssetKey,
    pub greeting_right: AssetKey,
    pub layout: SheetLayout,
    pub frame_size: Option<(u32, u32)>,
    pub scale: f32,
    pub position: Vec2,
    /// Pixels per tick.
    pub speed: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Greeting {
    side: GreetingSide,
    frame: u32,
    frame_timer_ms: f32,
    elapsed_ms: f32,
}

impl Greeting {
    fn new(side: GreetingSide) -> Self {
        Self {
            side,
            frame: 0,
            frame_timer_ms: 0.0,
            elapsed_ms: 0.0,
        }
    }
}

/// A sprite character. Other actors are only visible through the `others` slice handed to
/// [`Actor::update`].
#[derive(Debug, Clone)]
pub struct Actor {
    config: ActorConfig,
    position: Vec2,
    facing: Facing,
    state: AnimationState,
    walk_cursor: usize,
    frame_timer_ms: f32,
    frames: Option<FrameTable>,
    sheet_rejected: bool,
    greeting: Option<Greeting>,
    pending_greeting: Option<GreetingSide>,
}

impl Actor {
    pub fn new(config: ActorConfig) -> Self {
        Self {
            position: config.position,
            config,
            facing: Facing::Front,
            state: AnimationState::Idle,
            walk_cursor: 0,
            frame_timer_ms: 0.0,
            frames: None,
            sheet_rejected: false,
            greeting: None,
            pending_greeting: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn speed(&self) -> f32 {
        self.config.speed
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    pub fn walk_cursor(&self) -> usize {
        self.walk_cursor
    }

    pub fn is_greeting(&self) -> bool {
        self.greeting.is_some()
    }

    pub fn greeting_side(&self) -> Option<GreetingSide> {
        self.greeting.map(|greeting| greeting.side)
    }

    pub fn has_pending_greeting(&self) -> bool {
        self.pending_greeting.is_some()
    }

    pub fn frames(&self) -> Option<&FrameTable> {
        self.frames.as_ref()
    }

    pub fn asset_keys(&self) -> [AssetKey; 3] {
        [
            self.config.sprite_sheet.clone(),
            self.config.greeting_left.clone(),
            self.config.greeting_right.clone(),
        ]
    }

    /// Resolves the frame table once the sheet is available and starts a pending greeting
    /// once its overlay is. Cheap to call every tick.
    pub fn sync_assets(&mut self, assets: &dyn AssetCatalog) {
        if self.frames.is_none() && !self.sheet_rejected {
            if let Some(image_size) = assets.image_size(&self.config.sprite_sheet) {
                match FrameTable::resolve(image_size, self.config.layout, self.config.frame_size) {
                    Ok(table) => {
                        debug!(
                            actor = %self.config.name,
                            frame_width = table.frame_size().0,
                            frame_height = table.frame_size().1,
                            "sprite_frames_resolved"
                        );
                        self.frames = Some(table);
                    }
                    Err(err) => {
                        warn!(actor = %self.config.name, error = %err, "sprite_sheet_rejected");
                        self.sheet_rejected = true;
                    }
                }
            }
        }

        if let Some(side) = self.pending_greeting {
            if assets.is_loaded(self.greeting_key(side)) {
                self.pending_greeting = None;
                self.begin_greeting(side);
            }
        }
    }

    /// No-op while a greeting is already showing.
    pub fn start_greeting(&mut self, side: GreetingSide, assets: &dyn AssetCatalog) {
        if self.greeting.is_some() {
            return;
        }
        if assets.is_loaded(self.greeting_key(side)) {
            self.pending_greeting = None;
            self.begin_greeting(side);
        } else {
            self.pending_greeting = Some(side);
        }
    }

    fn begin_greeting(&mut self, side: GreetingSide) {
        self.greeting = Some(Greeting::new(side));
        self.state = AnimationState::Greeting;
    }

    fn greeting_key(&self, side: GreetingSide) -> &AssetKey {
        match side {
            GreetingSide::Left => &self.config.greeting_left,
            GreetingSide::Right => &self.config.greeting_right,
        }
    }

    /// Scaled on-screen size of one frame; zero until the sheet resolves unless the
    /// frame size was configured.
    pub fn scaled_size(&self) -> Size {
        let frame = self
            .frames
            .as_ref()
            .map(FrameTable::frame_size)
            .or(self.config.frame_size)
            .unwrap_or((0, 0));
        Size::new(
            frame.0 as f32 * self.config.scale,
            frame.1 as f32 * self.config.scale,
        )
    }

    pub fn sprite_bounds(&self) -> Rect {
        Rect::from_origin_size(self.position, self.scaled_size())
    }

    pub fn center(&self) -> Vec2 {
        self.sprite_bounds().center()
    }

    pub fn collision_box(&self) -> Rect {
        self.collision_box_at(self.position)
    }

    /// Feet box: the lower-middle strip of the sprite.
    pub fn collision_box_at(&self, position: Vec2) -> Rect {
        let size = self.scaled_size();
        Rect::new(
            position.x + size.width * 0.2,
            position.y + size.height * 0.6,
            size.width * 0.6,
            size.height * 0.3,
        )
    }

    pub fn is_close_to(&self, other: &Actor) -> bool {
        self.center().distance(other.center()) < CLOSE_DISTANCE_PX
    }

    /// Advances animation and attempts one movement step.
    ///
    /// `direction` is not normalized; diagonal input moves `speed` on both axes.
    pub fn update(
        &mut self,
        direction: Vec2,
        dt_ms: f32,
        bounds: Size,
        others: &[&Actor],
        world: Option<&World>,
    ) {
        let dt_ms = if dt_ms.is_finite() { dt_ms.max(0.0) } else { 0.0 };

        if let Some(greeting) = self.greeting.as_mut() {
            greeting.elapsed_ms += dt_ms;
            greeting.frame_timer_ms += dt_ms;
            if greeting.frame_timer_ms >= ANIMATION_FRAME_MS {
                greeting.frame = (greeting.frame + 1) % GREETING_FRAME_COUNT;
                greeting.frame_timer_ms = 0.0;
            }
            if greeting.elapsed_ms >= GREETING_DURATION_MS {
                self.greeting = None;
                self.state = AnimationState::Idle;
            }
            return;
        }

        let direction = if direction.is_finite() {
            direction
        } else {
            Vec2::ZERO
        };
        if direction.is_zero() {
            self.state = AnimationState::Idle;
        } else {
            self.state = AnimationState::Walking;
            if let Some(facing) = Facing::from_direction(direction) {
                self.facing = facing;
            }
        }

        self.frame_timer_ms += dt_ms;
        if self.frame_timer_ms >= ANIMATION_FRAME_MS {
            self.walk_cursor = match self.state {
                AnimationState::Walking => (self.walk_cursor + 1) % WALK_CYCLE_LEN,
                _ => 0,
            };
            self.frame_timer_ms = 0.0;
        }

        if direction.is_zero() {
            return;
        }

        let size = self.scaled_size();
        let mut candidate = self.position + direction * self.config.speed;
        candidate.x = candidate.x.max(0.0).min(bounds.width - size.width);
        candidate.y = candidate.y.max(0.0).min(bounds.height - size.height);

        let feet = self.collision_box_at(candidate);
        if others
            .iter()
            .any(|other| feet.intersects(&other.collision_box()))
        {
            return;
        }
        if let Some(world) = world {
            let blocked = !world.is_walkable(feet.x, feet.bottom())
                || !world.is_walkable(feet.right(), feet.bottom())
                || world.check_decoration_collision(&feet);
            if blocked {
                return;
            }
        }

        self.position = candidate;
    }

    /// World position projected into screen space. The world position is left untouched.
    pub fn screen_position(&self, camera_offset: Vec2) -> Vec2 {
        self.position - camera_offset
    }

    pub fn render(&self, ctx: &mut dyn DrawContext, camera_offset: Vec2) {
        let Some(frames) = self.frames.as_ref() else {
            return;
        };
        let screen = self.screen_position(camera_offset);
        let size = self.scaled_size();

        if let Some(greeting) = self.greeting {
            self.render_greeting(ctx, greeting, screen);
        }

        let src = match self.state {
            AnimationState::Walking => frames.walking(self.facing, self.walk_cursor),
            _ => frames.idle(self.facing),
        };
        if self.facing.sprite_row().mirror {
            ctx.save();
            ctx.scale(-1.0, 1.0);
            ctx.draw_image_region(
                &self.config.sprite_sheet,
                src,
                Rect::new(-screen.x - size.width, screen.y, size.width, size.height),
            );
            ctx.restore();
        } else {
            ctx.draw_image_region(
                &self.config.sprite_sheet,
                src,
                Rect::from_origin_size(screen, size),
            );
        }

        ctx.draw_text(
            &self.config.name,
            Vec2::new(screen.x + size.width / 2.0, screen.y - NAME_LABEL_OFFSET_PX),
            TextAlign::Center,
            WHITE,
        );
    }

    fn render_greeting(&self, ctx: &mut dyn DrawContext, greeting: Greeting, screen: Vec2) {
        let key = self.greeting_key(greeting.side);
        let Some((width, height)) = ctx.image_size(key) else {
            return;
        };
        let frame_width = (width / GREETING_FRAME_COUNT) as f32;
        if frame_width <= 0.0 {
            return;
        }
        let src = Rect::new(
            greeting.frame as f32 * frame_width,
            0.0,
            frame_width,
            height as f32,
        );
        let dst = Rect::new(
            screen.x,
            screen.y - GREETING_OFFSET_PX,
            frame_width * self.config.scale,
            height as f32 * self.config.scale,
        );
        ctx.draw_image_region(key, src, dst);
    }
}
