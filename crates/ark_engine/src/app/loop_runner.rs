use std::env;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use crate::content::ContentError;
use crate::{AppPaths, StartupError};

use super::clock::FrameClock;
use super::input::ActionStates;
use super::metrics::LoopMetrics;
use super::overlay::OverlayData;
use super::rendering::Renderer;
use super::{InputAction, InputSnapshot, Scene};

pub const SLOW_FRAME_ENV_VAR: &str = "ARK_SLOW_FRAME_MS";

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
    pub simulated_slow_frame_ms: u64,
    pub max_render_fps: Option<u32>,
    pub overlay_visible: bool,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Ark World".to_string(),
            window_width: 800,
            window_height: 600,
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval: Duration::from_secs(1),
            simulated_slow_frame_ms: 0,
            max_render_fps: None,
            overlay_visible: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error("failed to load content: {0}")]
    Content(#[from] ContentError),
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

/// Opens the window and drives `scene` with a fixed-step simulation until the window closes.
pub fn run_app(
    config: LoopConfig,
    app_paths: &AppPaths,
    mut scene: Box<dyn Scene>,
) -> Result<(), AppError> {
    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let window_for_loop = Arc::clone(&window);
    let mut renderer =
        Renderer::new(window, app_paths.asset_dir.clone()).map_err(AppError::CreateRenderer)?;

    let required_assets = scene.required_assets();
    renderer.load_assets(&required_assets);
    let (assets_loaded, assets_attempted) = renderer.asset_counts();
    info!(
        asset_dir = %app_paths.asset_dir.display(),
        assets_loaded,
        assets_attempted,
        "assets_loaded"
    );

    event_loop.set_control_flow(ControlFlow::Poll);

    let mut clock = FrameClock::new(&config);
    let slow_frame_delay = slow_frame_delay_from_env(config.simulated_slow_frame_ms);
    let window_size = window_for_loop.inner_size();
    let mut input_collector = InputCollector::new(window_size.width, window_size.height);

    info!(
        step_ms = clock.step_ms(),
        max_frame_delta_ms = clock.max_frame().as_millis() as u64,
        max_ticks_per_frame = clock.max_steps(),
        slow_frame_delay_ms = slow_frame_delay.as_millis() as u64,
        render_fps_cap = ?clock.render_cap(),
        "loop_config"
    );

    let mut last_frame_instant = Instant::now();
    let mut last_present_instant = Instant::now();
    let mut metrics = LoopMetrics::new(config.metrics_log_interval);
    let mut last_applied_title: Option<String> = None;
    let mut overlay_visible = config.overlay_visible;

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window_for_loop.id() => {
                match event {
                    WindowEvent::CloseRequested => {
                        input_collector.mark_quit_requested();
                        info!(reason = "window_close", "shutdown_requested");
                        window_target.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        input_collector.set_window_size(new_size.width, new_size.height);
                        if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                            warn!(error = %error, "renderer_resize_failed");
                            window_target.exit();
                        }
                    }
                    WindowEvent::ScaleFactorChanged { .. } => {
                        let size = window_for_loop.inner_size();
                        input_collector.set_window_size(size.width, size.height);
                        if let Err(error) = renderer.resize(size.width, size.height) {
                            warn!(error = %error, "renderer_resize_failed");
                            window_target.exit();
                        }
                    }
                    WindowEvent::KeyboardInput { event, .. } => {
                        input_collector.handle_keyboard_input(&event);
                        if input_collector.quit_requested {
                            info!(reason = "escape_key", "shutdown_requested");
                            window_target.exit();
                        }
                    }
                    WindowEvent::RedrawRequested => {
                        if input_collector.overlay_toggle.take_pressed() {
                            overlay_visible = !overlay_visible;
                            info!(overlay_visible, "overlay_toggled");
                        }

                        if slow_frame_delay > Duration::ZERO {
                            // Debug perturbation only; not the FPS cap.
                            thread::sleep(slow_frame_delay);
                        }

                        let now = Instant::now();
                        let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
                        last_frame_instant = now;

                        let frame = clock.begin_frame(raw_frame_dt);
                        for _ in 0..frame.steps {
                            let sim_time_ms = clock.advance();
                            let input_snapshot = input_collector.snapshot_for_tick();
                            scene.update(sim_time_ms, &input_snapshot, renderer.assets());
                            metrics.tick();
                        }
                        if !frame.dropped.is_zero() {
                            warn!(
                                dropped_backlog_ms = frame.dropped.as_millis() as u64,
                                max_ticks_per_frame = clock.max_steps(),
                                "sim_clamp_triggered"
                            );
                        }

                        let wait = clock.present_wait(
                            Instant::now().saturating_duration_since(last_present_instant),
                        );
                        if !wait.is_zero() {
                            thread::sleep(wait);
                        }

                        let overlay = overlay_visible.then(|| {
                            let (assets_loaded, assets_attempted) = renderer.asset_counts();
                            OverlayData {
                                metrics: metrics.latest(),
                                render_fps_cap: clock.render_cap(),
                                slow_frame_delay_ms: slow_frame_delay.as_millis() as u64,
                                assets_loaded,
                                assets_attempted,
                                scene_lines: scene.debug_lines(),
                            }
                        });
                        if let Err(error) = renderer.render_scene(scene.as_mut(), overlay.as_ref())
                        {
                            warn!(error = %error, "renderer_draw_failed");
                            window_target.exit();
                        }
                        last_present_instant = Instant::now();

                        let next_title = scene.debug_title();
                        if next_title != last_applied_title {
                            match &next_title {
                                Some(title) => window_for_loop.set_title(title),
                                None => window_for_loop.set_title(&config.window_title),
                            }
                            last_applied_title = next_title;
                        }
                        metrics.frame(raw_frame_dt);
                        if let Some(snapshot) = metrics.roll(now) {
                            info!(
                                fps = snapshot.fps,
                                tps = snapshot.tps,
                                frame_time_ms = snapshot.frame_time_ms,
                                sim_time_ms = clock.sim_time_ms(),
                                "loop_metrics"
                            );
                        }
                    }
                    _ => {}
                }
            }
            Event::AboutToWait => {
                window_for_loop.request_redraw();
            }
            Event::LoopExiting => {
                info!(sim_time_ms = clock.sim_time_ms(), "shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

/// Press/release tracking for a key whose press must be seen exactly once.
#[derive(Debug, Default, Clone, Copy)]
struct EdgeKey {
    is_down: bool,
    pressed_edge: bool,
}

impl EdgeKey {
    fn handle(&mut self, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if !self.is_down {
                    self.pressed_edge = true;
                }
                self.is_down = true;
            }
            ElementState::Released => self.is_down = false,
        }
    }

    fn take_pressed(&mut self) -> bool {
        std::mem::take(&mut self.pressed_edge)
    }
}

#[derive(Debug, Default)]
struct InputCollector {
    quit_requested: bool,
    greet: EdgeKey,
    interact: EdgeKey,
    overlay_toggle: EdgeKey,
    action_states: ActionStates,
    window_width: u32,
    window_height: u32,
}

impl InputCollector {
    fn new(window_width: u32, window_height: u32) -> Self {
        Self {
            window_width,
            window_height,
            ..Self::default()
        }
    }

    fn mark_quit_requested(&mut self) {
        self.quit_requested = true;
    }

    fn handle_keyboard_input(&mut self, key_event: &KeyEvent) {
        self.handle_physical_key(key_event.physical_key, key_event.state);
    }

    fn handle_physical_key(&mut self, key: PhysicalKey, state: ElementState) {
        let is_pressed = state == ElementState::Pressed;
        let PhysicalKey::Code(code) = key else {
            return;
        };
        match code {
            KeyCode::KeyW | KeyCode::ArrowUp => {
                self.action_states.set(InputAction::MoveUp, is_pressed);
            }
            KeyCode::KeyS | KeyCode::ArrowDown => {
                self.action_states.set(InputAction::MoveDown, is_pressed);
            }
            KeyCode::KeyA | KeyCode::ArrowLeft => {
                self.action_states.set(InputAction::MoveLeft, is_pressed);
            }
            KeyCode::KeyD | KeyCode::ArrowRight => {
                self.action_states.set(InputAction::MoveRight, is_pressed);
            }
            KeyCode::Space => {
                self.action_states.set(InputAction::Greet, is_pressed);
                self.greet.handle(state);
            }
            KeyCode::KeyE => {
                self.action_states.set(InputAction::Interact, is_pressed);
                self.interact.handle(state);
            }
            KeyCode::F3 => self.overlay_toggle.handle(state),
            KeyCode::Escape => {
                self.action_states.set(InputAction::Quit, is_pressed);
                if is_pressed {
                    self.mark_quit_requested();
                }
            }
            _ => {}
        }
    }

    fn snapshot_for_tick(&mut self) -> InputSnapshot {
        InputSnapshot::new(
            self.quit_requested,
            self.action_states,
            self.greet.take_pressed(),
            self.interact.take_pressed(),
            self.window_width,
            self.window_height,
        )
    }

    fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_width = width;
        self.window_height = height;
    }
}

/// `ARK_SLOW_FRAME_MS` wins over the configured delay when it parses.
fn slow_frame_delay_from_env(configured_ms: u64) -> Duration {
    let configured = Duration::from_millis(configured_ms);
    let Ok(value) = env::var(SLOW_FRAME_ENV_VAR) else {
        return configured;
    };
    parse_slow_frame_ms(&value).unwrap_or_else(|| {
        warn!(
            env_var = SLOW_FRAME_ENV_VAR,
            value = value.as_str(),
            "slow_frame_env_invalid"
        );
        configured
    })
}

fn parse_slow_frame_ms(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(input: &mut InputCollector, code: KeyCode) {
        input.handle_physical_key(PhysicalKey::Code(code), ElementState::Pressed);
    }

    fn release(input: &mut InputCollector, code: KeyCode) {
        input.handle_physical_key(PhysicalKey::Code(code), ElementState::Released);
    }

    #[test]
    fn slow_frame_value_parses_millis_or_rejects() {
        assert_eq!(parse_slow_frame_ms(" 12 "), Some(Duration::from_millis(12)));
        assert_eq!(parse_slow_frame_ms("fast"), None);
    }

    #[test]
    fn greet_press_is_edge_triggered_for_single_tick() {
        let mut input = InputCollector::default();
        press(&mut input, KeyCode::Space);
        let first = input.snapshot_for_tick();
        let second = input.snapshot_for_tick();
        assert!(first.greet_pressed());
        assert!(!second.greet_pressed());
        assert!(second.is_down(InputAction::Greet));
    }

    #[test]
    fn held_interact_does_not_spam_press_edges() {
        let mut input = InputCollector::default();
        press(&mut input, KeyCode::KeyE);
        let first = input.snapshot_for_tick();
        press(&mut input, KeyCode::KeyE);
        let second = input.snapshot_for_tick();
        release(&mut input, KeyCode::KeyE);
        press(&mut input, KeyCode::KeyE);
        let third = input.snapshot_for_tick();

        assert!(first.interact_pressed());
        assert!(!second.interact_pressed());
        assert!(third.interact_pressed());
    }

    #[test]
    fn wasd_and_arrow_keys_map_to_movement() {
        let mut input = InputCollector::default();
        press(&mut input, KeyCode::KeyW);
        press(&mut input, KeyCode::ArrowLeft);
        let snapshot = input.snapshot_for_tick();
        assert!(snapshot.is_down(InputAction::MoveUp));
        assert!(snapshot.is_down(InputAction::MoveLeft));

        release(&mut input, KeyCode::KeyW);
        let snapshot = input.snapshot_for_tick();
        assert!(!snapshot.is_down(InputAction::MoveUp));
        assert!(snapshot.is_down(InputAction::MoveLeft));
    }

    #[test]
    fn f3_toggle_is_edge_triggered() {
        let mut input = InputCollector::default();
        press(&mut input, KeyCode::F3);
        assert!(input.overlay_toggle.take_pressed());
        press(&mut input, KeyCode::F3);
        assert!(!input.overlay_toggle.take_pressed());
        release(&mut input, KeyCode::F3);
        press(&mut input, KeyCode::F3);
        assert!(input.overlay_toggle.take_pressed());
    }

    #[test]
    fn escape_requests_quit_and_snapshot_carries_window_size() {
        let mut input = InputCollector::new(800, 600);
        press(&mut input, KeyCode::Escape);
        let snapshot = input.snapshot_for_tick();
        assert!(snapshot.quit_requested());
        assert_eq!(snapshot.window_size(), (800, 600));
    }
}
