use ark_engine::{Rect, Size, Vec2};

/// Fraction of the remaining distance covered each tick.
pub(crate) const CAMERA_SMOOTHING: f32 = 0.1;

/// Top-left corner of the view in world pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct Camera {
    position: Vec2,
}

impl Camera {
    pub(crate) fn position(&self) -> Vec2 {
        self.position
    }

    /// Centres `focus` in the view, clamped so the view stays inside the world.
    /// A world smaller than the view pins that axis to 0.
    pub(crate) fn target_for(focus: Vec2, view: Size, world: Size) -> Vec2 {
        Vec2::new(
            clamp_axis(focus.x - view.width / 2.0, view.width, world.width),
            clamp_axis(focus.y - view.height / 2.0, view.height, world.height),
        )
    }

    pub(crate) fn follow(&mut self, target: Vec2) {
        self.position += (target - self.position) * CAMERA_SMOOTHING;
    }

    pub(crate) fn snap_to(&mut self, target: Vec2) {
        self.position = target;
    }

    pub(crate) fn viewport(&self, view: Size) -> Rect {
        Rect::from_origin_size(self.position, view)
    }
}

fn clamp_axis(value: f32, view: f32, world: f32) -> f32 {
    value.min(world - view).max(0.0)
}
