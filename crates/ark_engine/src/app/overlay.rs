use crate::draw::{DrawContext, Rgba, TextAlign};
use crate::geometry::{Rect, Vec2};

use super::metrics::LoopMetricsSnapshot;
use super::rendering::{GLYPH_ADVANCE, LINE_ADVANCE};

const OVERLAY_ORIGIN: Vec2 = Vec2::new(10.0, 10.0);
const OVERLAY_PADDING: f32 = 8.0;
const OVERLAY_TEXT_PRIMARY_COLOR: Rgba = [244, 248, 252, 255];
const OVERLAY_TEXT_DIM_COLOR: Rgba = [176, 198, 220, 255];
const OVERLAY_PANEL_BG_COLOR: Rgba = [10, 12, 16, 210];
const OVERLAY_PANEL_BORDER_COLOR: Rgba = [92, 106, 126, 255];

/// F3 debug panel contents, gathered by the loop once per presented frame.
#[derive(Debug, Clone)]
pub(crate) struct OverlayData {
    pub(crate) metrics: LoopMetricsSnapshot,
    pub(crate) render_fps_cap: Option<u32>,
    pub(crate) slow_frame_delay_ms: u64,
    pub(crate) assets_loaded: usize,
    pub(crate) assets_attempted: usize,
    pub(crate) scene_lines: Vec<String>,
}

pub(crate) fn draw_overlay(ctx: &mut dyn DrawContext, data: &OverlayData) {
    let lines = build_overlay_lines(data);
    let widest = lines.iter().map(|line| line.chars().count()).max().unwrap_or(0);
    let panel = Rect::new(
        OVERLAY_ORIGIN.x,
        OVERLAY_ORIGIN.y,
        widest as f32 * GLYPH_ADVANCE as f32 + OVERLAY_PADDING * 2.0,
        lines.len() as f32 * LINE_ADVANCE as f32 + OVERLAY_PADDING * 2.0,
    );
    ctx.fill_rect(panel, OVERLAY_PANEL_BG_COLOR);
    ctx.stroke_rect(panel, OVERLAY_PANEL_BORDER_COLOR);

    for (index, line) in lines.iter().enumerate() {
        let baseline = panel.y + OVERLAY_PADDING + (index as f32 + 1.0) * LINE_ADVANCE as f32;
        ctx.draw_text(
            line,
            Vec2::new(panel.x + OVERLAY_PADDING, baseline),
            TextAlign::Left,
            overlay_line_color(index),
        );
    }
}

fn build_overlay_lines(data: &OverlayData) -> Vec<String> {
    let mut lines = vec![
        format_fps_line(data.metrics.fps, data.render_fps_cap, data.slow_frame_delay_ms),
        format!("TPS: {:.1}", data.metrics.tps),
        format!("Frame: {:.2} ms", data.metrics.frame_time_ms),
        format!("Images: {}/{}", data.assets_loaded, data.assets_attempted),
    ];
    lines.extend(data.scene_lines.iter().cloned());
    lines
}

fn overlay_line_color(index: usize) -> Rgba {
    if index < 4 {
        OVERLAY_TEXT_PRIMARY_COLOR
    } else {
        OVERLAY_TEXT_DIM_COLOR
    }
}

fn format_fps_line(current_fps: f32, cap: Option<u32>, slow_frame_delay_ms: u64) -> String {
    let cap_text = cap.map_or_else(|| "off".to_string(), |value| value.to_string());
    if slow_frame_delay_ms > 0 {
        format!("FPS: {current_fps:.1} (cap: {cap_text}, slow: {slow_frame_delay_ms} ms)")
    } else {
        format!("FPS: {current_fps:.1} (cap: {cap_text})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::ImageSizes;
    use crate::draw::RecordingContext;

    fn sample_data() -> OverlayData {
        OverlayData {
            metrics: LoopMetricsSnapshot {
                fps: 59.94,
                tps: 60.0,
                frame_time_ms: 16.5,
            },
            render_fps_cap: None,
            slow_frame_delay_ms: 0,
            assets_loaded: 3,
            assets_attempted: 4,
            scene_lines: vec!["Room: Outdoor".to_string()],
        }
    }

    #[test]
    fn fps_line_formats_cap_and_slow_frame_delay() {
        assert_eq!(format_fps_line(59.94, None, 0), "FPS: 59.9 (cap: off)");
        assert_eq!(
            format_fps_line(30.0, Some(30), 12),
            "FPS: 30.0 (cap: 30, slow: 12 ms)"
        );
    }

    #[test]
    fn overlay_draws_panel_then_loop_and_scene_lines() {
        let mut ctx = RecordingContext::new(800, 600, ImageSizes::new());
        draw_overlay(&mut ctx, &sample_data());
        let texts: Vec<_> = ctx.texts().collect();
        assert_eq!(
            texts,
            vec![
                "FPS: 59.9 (cap: off)",
                "TPS: 60.0",
                "Frame: 16.50 ms",
                "Images: 3/4",
                "Room: Outdoor"
            ]
        );
    }
}
