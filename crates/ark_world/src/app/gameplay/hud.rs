use ark_engine::{AiStatus, DrawContext, Rect, Rgba, TaskKind, TextAlign, Vec2, WHITE, YELLOW};

const PROMPT_BOTTOM_OFFSET_PX: f32 = 30.0;

const PANEL_ORIGIN: Vec2 = Vec2::new(10.0, 10.0);
const PANEL_WIDTH_PX: f32 = 230.0;
const PANEL_PADDING_PX: f32 = 10.0;
const PANEL_LINE_PX: f32 = 16.0;
const PANEL_BACKGROUND: Rgba = [0, 0, 0, 160];
const PROGRESS_BAR_HEIGHT_PX: f32 = 8.0;
const PROGRESS_TRACK: Rgba = [60, 60, 60, 255];
const MUTED_TEXT: Rgba = [200, 200, 200, 255];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DoorAction {
    Enter,
    Exit,
}

/// The single instruction line shown at the bottom of the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Prompt {
    Door(DoorAction),
    Approach,
    Greet,
}

impl Prompt {
    pub(crate) fn text(self) -> &'static str {
        match self {
            Self::Door(DoorAction::Enter) => "Press E to enter",
            Self::Door(DoorAction::Exit) => "Press E to exit",
            Self::Approach => "Use arrow keys to move Gary close to Orb",
            Self::Greet => "Press SPACE to greet!",
        }
    }

    fn color(self) -> Rgba {
        match self {
            Self::Approach => WHITE,
            Self::Door(_) | Self::Greet => YELLOW,
        }
    }
}

pub(crate) fn draw_prompt(ctx: &mut dyn DrawContext, prompt: Prompt) {
    let (width, height) = ctx.viewport_size();
    ctx.draw_text(
        prompt.text(),
        Vec2::new(width as f32 / 2.0, height as f32 - PROMPT_BOTTOM_OFFSET_PX),
        TextAlign::Center,
        prompt.color(),
    );
}

pub(crate) fn task_kind_color(kind: TaskKind) -> Rgba {
    match kind {
        TaskKind::Idle => [128, 128, 128, 255],
        TaskKind::Explore => [0, 120, 255, 255],
        TaskKind::Gather => [0, 200, 0, 255],
        TaskKind::Rest => [160, 80, 200, 255],
        TaskKind::Socialize => [255, 220, 0, 255],
    }
}

/// `explore_house` -> `Explore House`.
pub(crate) fn title_case_id(id: &str) -> String {
    id.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// NPC task panel: current task with progress bar, then the completed list.
pub(crate) fn draw_task_panel(ctx: &mut dyn DrawContext, status: &AiStatus) {
    let line_count = 4 + status.completed.len();
    let panel = Rect::new(
        PANEL_ORIGIN.x,
        PANEL_ORIGIN.y,
        PANEL_WIDTH_PX,
        PANEL_PADDING_PX * 2.0 + PANEL_LINE_PX * line_count as f32 + PROGRESS_BAR_HEIGHT_PX,
    );
    ctx.fill_rect(panel, PANEL_BACKGROUND);

    let left = PANEL_ORIGIN.x + PANEL_PADDING_PX;
    let mut baseline = PANEL_ORIGIN.y + PANEL_PADDING_PX + PANEL_LINE_PX;
    ctx.draw_text(
        &format!("{}'s Tasks", status.actor),
        Vec2::new(left, baseline),
        TextAlign::Left,
        YELLOW,
    );
    baseline += PANEL_LINE_PX;

    match status.task.as_ref() {
        Some(task) => {
            ctx.draw_text(
                &format!("{} ({:.0}%)", task.name, task.progress),
                Vec2::new(left, baseline),
                TextAlign::Left,
                WHITE,
            );
            let bar_width = PANEL_WIDTH_PX - PANEL_PADDING_PX * 2.0;
            let bar_y = baseline + 4.0;
            ctx.fill_rect(
                Rect::new(left, bar_y, bar_width, PROGRESS_BAR_HEIGHT_PX),
                PROGRESS_TRACK,
            );
            let filled = bar_width * (task.progress / 100.0).clamp(0.0, 1.0);
            ctx.fill_rect(
                Rect::new(left, bar_y, filled, PROGRESS_BAR_HEIGHT_PX),
                task_kind_color(task.kind),
            );
            baseline += PANEL_LINE_PX + PROGRESS_BAR_HEIGHT_PX;
            ctx.draw_text(
                &task.description,
                Vec2::new(left, baseline),
                TextAlign::Left,
                MUTED_TEXT,
            );
        }
        None => {
            baseline += PROGRESS_BAR_HEIGHT_PX;
            ctx.draw_text(
                "No active task",
                Vec2::new(left, baseline),
                TextAlign::Left,
                MUTED_TEXT,
            );
        }
    }
    baseline += PANEL_LINE_PX;

    ctx.draw_text(
        &format!("Completed Tasks ({})", status.completed.len()),
        Vec2::new(left, baseline),
        TextAlign::Left,
        WHITE,
    );
    for id in &status.completed {
        baseline += PANEL_LINE_PX;
        ctx.draw_text(
            &title_case_id(id),
            Vec2::new(left, baseline),
            TextAlign::Left,
            MUTED_TEXT,
        );
    }
}
