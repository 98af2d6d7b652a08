use ark_engine::{DrawContext, Rect, Rgba, Size, Vec2, WHITE};

pub(crate) const MINIMAP_SIZE_PX: f32 = 150.0;
const MINIMAP_MARGIN_PX: f32 = 10.0;
const DOT_RADIUS_PX: f32 = 3.0;

const BACKGROUND: Rgba = [0, 0, 0, 128];
const VIEWPORT_OUTLINE: Rgba = [255, 255, 255, 204];
pub(crate) const PLAYER_DOT: Rgba = [0, 0, 255, 255];
pub(crate) const NPC_DOT: Rgba = [128, 0, 128, 255];

/// One frame's worth of minimap inputs, all in world pixels.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MinimapView {
    pub(crate) world: Size,
    pub(crate) camera: Rect,
    pub(crate) player: Vec2,
    /// `None` when the NPC is in another room.
    pub(crate) npc: Option<Vec2>,
}

pub(crate) fn minimap_scale(world: Size) -> f32 {
    if world.width <= 0.0 || world.height <= 0.0 {
        return 0.0;
    }
    (MINIMAP_SIZE_PX / world.width).min(MINIMAP_SIZE_PX / world.height)
}

/// Top-right corner, inset by the margin.
pub(crate) fn minimap_origin(screen_width: u32) -> Vec2 {
    Vec2::new(
        screen_width as f32 - MINIMAP_SIZE_PX - MINIMAP_MARGIN_PX,
        MINIMAP_MARGIN_PX,
    )
}

pub(crate) fn draw_minimap(ctx: &mut dyn DrawContext, view: &MinimapView) {
    let (screen_width, _) = ctx.viewport_size();
    let origin = minimap_origin(screen_width);
    let frame = Rect::new(origin.x, origin.y, MINIMAP_SIZE_PX, MINIMAP_SIZE_PX);
    ctx.fill_rect(frame, BACKGROUND);
    ctx.stroke_rect(frame, WHITE);

    let scale = minimap_scale(view.world);
    let project = |point: Vec2| origin + point * scale;

    let camera_origin = project(view.camera.origin());
    ctx.stroke_rect(
        Rect::new(
            camera_origin.x,
            camera_origin.y,
            view.camera.width * scale,
            view.camera.height * scale,
        ),
        VIEWPORT_OUTLINE,
    );

    ctx.fill_circle(project(view.player), DOT_RADIUS_PX, PLAYER_DOT);
    if let Some(npc) = view.npc {
        ctx.fill_circle(project(npc), DOT_RADIUS_PX, NPC_DOT);
    }
}
