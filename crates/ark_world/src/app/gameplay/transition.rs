use ark_engine::{DoorLink, DrawContext, Rect};

/// Ticks for a full fade in one direction (alpha step 0.05).
pub(crate) const FADE_FRAMES: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Out,
    In,
}

/// What the orchestrator must do after advancing the fade one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FadeStep {
    Continue,
    /// Screen is fully black: swap rooms now.
    Swap(DoorLink),
    Finished,
}

/// Black fade to and from a door's destination room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Transition {
    door: DoorLink,
    phase: Phase,
    frame: u32,
}

impl Transition {
    pub(crate) fn begin(door: DoorLink) -> Self {
        Self {
            door,
            phase: Phase::Out,
            frame: 0,
        }
    }

    pub(crate) fn alpha(&self) -> f32 {
        self.frame as f32 / FADE_FRAMES as f32
    }

    pub(crate) fn is_fading_in(&self) -> bool {
        self.phase == Phase::In
    }

    pub(crate) fn advance(&mut self) -> FadeStep {
        match self.phase {
            Phase::Out => {
                self.frame += 1;
                if self.frame >= FADE_FRAMES {
                    self.frame = FADE_FRAMES;
                    self.phase = Phase::In;
                    return FadeStep::Swap(self.door.clone());
                }
                FadeStep::Continue
            }
            Phase::In => {
                self.frame = self.frame.saturating_sub(1);
                if self.frame == 0 {
                    FadeStep::Finished
                } else {
                    FadeStep::Continue
                }
            }
        }
    }

    pub(crate) fn render(&self, ctx: &mut dyn DrawContext) {
        let (width, height) = ctx.viewport_size();
        let alpha = (self.alpha().clamp(0.0, 1.0) * 255.0).round() as u8;
        ctx.fill_rect(
            Rect::new(0.0, 0.0, width as f32, height as f32),
            [0, 0, 0, alpha],
        );
    }
}
