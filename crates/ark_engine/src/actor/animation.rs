use thiserror::Error;
use tracing::warn;

use crate::geometry::Rect;

use super::facing::Facing;

/// Walk cycles advance through this many cursor positions regardless of sequence length.
pub const WALK_CYCLE_LEN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetLayout {
    pub cols: u32,
    pub rows: u32,
}

impl SheetLayout {
    pub const fn new(cols: u32, rows: u32) -> Self {
        Self { cols, rows }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameTableError {
    #[error("sprite sheet layout must have at least one column and row (got {cols}x{rows})")]
    EmptyLayout { cols: u32, rows: u32 },
    #[error("sprite sheet {width}x{height} yields zero-sized frames for a {cols}x{rows} layout")]
    ZeroSizedFrames {
        width: u32,
        height: u32,
        cols: u32,
        rows: u32,
    },
}

/// Source rectangles per facing, resolved once from the sheet's pixel size.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameTable {
    frame_width: u32,
    frame_height: u32,
    idle: [Rect; 4],
    walking: [Vec<Rect>; 4],
}

impl FrameTable {
    /// `frame_size` overrides the size derived from `image / layout`.
    pub fn resolve(
        image_size: (u32, u32),
        layout: SheetLayout,
        frame_size: Option<(u32, u32)>,
    ) -> Result<Self, FrameTableError> {
        if layout.cols == 0 || layout.rows == 0 {
            return Err(FrameTableError::EmptyLayout {
                cols: layout.cols,
                rows: layout.rows,
            });
        }
        let (image_width, image_height) = image_size;
        let (frame_width, frame_height) =
            frame_size.unwrap_or((image_width / layout.cols, image_height / layout.rows));
        if frame_width == 0 || frame_height == 0 {
            return Err(FrameTableError::ZeroSizedFrames {
                width: image_width,
                height: image_height,
                cols: layout.cols,
                rows: layout.rows,
            });
        }

        let fits = |cells: u32, frame: u32, image: u32| {
            cells.checked_mul(frame).is_some_and(|extent| extent <= image)
        };
        let in_bounds = |col: u32, row: u32| {
            fits(col + 1, frame_width, image_width) && fits(row + 1, frame_height, image_height)
        };
        let frame = |col: u32, row: u32| {
            Rect::new(
                (col * frame_width) as f32,
                (row * frame_height) as f32,
                frame_width as f32,
                frame_height as f32,
            )
        };

        let mut dropped = 0usize;
        let mut idle = [Rect::default(); 4];
        let mut walking: [Vec<Rect>; 4] = Default::default();
        for facing in Facing::ALL {
            let row = facing.sprite_row().row;
            let idle_frame = if in_bounds(0, row) {
                frame(0, row)
            } else {
                dropped += 1;
                frame(0, 0)
            };

            let columns = match facing {
                Facing::Back => 2..=4,
                _ => 1..=4,
            };
            let mut sequence = Vec::with_capacity(WALK_CYCLE_LEN);
            for col in columns {
                if in_bounds(col, row) {
                    sequence.push(frame(col, row));
                } else {
                    dropped += 1;
                }
            }
            if sequence.is_empty() {
                sequence.push(idle_frame);
            }

            idle[facing.index()] = idle_frame;
            walking[facing.index()] = sequence;
        }

        if dropped > 0 {
            warn!(
                image_width,
                image_height,
                cols = layout.cols,
                rows = layout.rows,
                dropped_frames = dropped,
                "sprite_frames_out_of_bounds"
            );
        }

        Ok(Self {
            frame_width,
            frame_height,
            idle,
            walking,
        })
    }

    pub fn frame_size(&self) -> (u32, u32) {
        (self.frame_width, self.frame_height)
    }

    pub fn idle(&self, facing: Facing) -> Rect {
        self.idle[facing.index()]
    }

    pub fn walking(&self, facing: Facing, cursor: usize) -> Rect {
        let sequence = &self.walking[facing.index()];
        sequence[cursor % sequence.len()]
    }

    pub fn walking_len(&self, facing: Facing) -> usize {
        self.walking[facing.index()].len()
    }
}
