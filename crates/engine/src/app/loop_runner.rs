use std::sync::Arc;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{debug, info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use super::input::ActionStates;
use super::metrics::LoopMetrics;
use super::{InputAction, InputSnapshot, Renderer, Scene, SceneCommand};

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Tile Quest".to_string(),
            window_width: 960,
            window_height: 720,
            canvas_width: 800,
            canvas_height: 600,
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

pub fn run_app(config: LoopConfig, mut scene: Box<dyn Scene>) -> Result<(), AppError> {
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
    let mut renderer = Renderer::new(
        Arc::clone(&window),
        config.canvas_width,
        config.canvas_height,
    )
    .map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let target_tps = config.target_tps.max(1);
    let mut step = FixedStep::new(
        Duration::from_secs_f64(1.0 / f64::from(target_tps)),
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250)),
        config.max_ticks_per_frame.max(1),
        Instant::now(),
    );
    let fixed_dt_seconds = step.fixed_dt.as_secs_f32();
    let metrics_window =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(1));
    let mut metrics = LoopMetrics::new(metrics_window, Instant::now());
    let mut input_collector = InputCollector::default();
    let mut last_applied_title: Option<String> = None;

    scene.load();
    info!(
        target_tps,
        max_frame_delta_ms = step.max_frame_delta.as_millis() as u64,
        max_ticks_per_frame = step.max_ticks_per_frame,
        canvas_width = config.canvas_width,
        canvas_height = config.canvas_height,
        "loop_config"
    );

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    info!(reason = "window_close", "shutdown_requested");
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::ScaleFactorChanged { .. } => {
                    let size = window.inner_size();
                    if let Err(error) = renderer.resize(size.width, size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::Focused(false) => {
                    input_collector.release_all();
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    input_collector.handle_key(
                        event.physical_key,
                        event.state,
                        event.text.as_deref(),
                    );
                }
                WindowEvent::RedrawRequested => {
                    let now = Instant::now();
                    let (frame_time, plan) = step.begin_frame(now);

                    let mut ticks_run = 0;
                    while ticks_run < plan.ticks_to_run {
                        ticks_run += 1;
                        let input_snapshot = input_collector.snapshot_for_tick();
                        if scene.update(fixed_dt_seconds, &input_snapshot) == SceneCommand::Quit {
                            info!(reason = "scene_quit", "shutdown_requested");
                            window_target.exit();
                            break;
                        }
                    }
                    metrics.record_ticks(ticks_run);

                    let clamped = plan.dropped_backlog > Duration::ZERO;
                    if clamped {
                        debug!(
                            dropped_backlog_ms = plan.dropped_backlog.as_millis() as u64,
                            max_ticks_per_frame = step.max_ticks_per_frame,
                            "sim_clamp_triggered"
                        );
                    }

                    if let Err(error) = renderer.render_scene(scene.as_mut()) {
                        warn!(error = %error, "renderer_draw_failed");
                        window_target.exit();
                    }
                    let next_title = scene.debug_title();
                    if next_title != last_applied_title {
                        window.set_title(next_title.as_deref().unwrap_or(config.window_title.as_str()));
                        last_applied_title = next_title;
                    }

                    metrics.record_frame(frame_time, clamped);
                    if let Some(snapshot) = metrics.take_snapshot(now) {
                        debug!(
                            fps = snapshot.fps,
                            tps = snapshot.tps,
                            avg_frame_ms = snapshot.avg_frame_ms,
                            worst_frame_ms = snapshot.worst_frame_ms,
                            clamped_frames = snapshot.clamped_frames,
                            "loop_metrics"
                        );
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                window.request_redraw();
            }
            Event::LoopExiting => {
                scene.unload();
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

/// Folds raw key events into per-tick snapshots. A press edge is recorded
/// only on the transition from released to pressed, so OS key repeat never
/// produces extra edges; repeated text is still collected.
#[derive(Debug, Default)]
struct InputCollector {
    down: ActionStates,
    pressed: ActionStates,
    typed_text: String,
}

impl InputCollector {
    fn handle_key(&mut self, key: PhysicalKey, state: ElementState, text: Option<&str>) {
        let is_pressed = state == ElementState::Pressed;
        if let Some(action) = action_for_key(key) {
            if is_pressed && !self.down.is_down(action) {
                self.pressed.set(action, true);
            }
            self.down.set(action, is_pressed);
        }
        if is_pressed {
            if let Some(text) = text {
                self.typed_text
                    .extend(text.chars().filter(|ch| !ch.is_control()));
            }
        }
    }

    fn release_all(&mut self) {
        self.down.clear();
    }

    fn snapshot_for_tick(&mut self) -> InputSnapshot {
        let snapshot =
            InputSnapshot::new(self.down, self.pressed, std::mem::take(&mut self.typed_text));
        self.pressed.clear();
        snapshot
    }
}

fn action_for_key(key: PhysicalKey) -> Option<InputAction> {
    let PhysicalKey::Code(code) = key else {
        return None;
    };
    match code {
        KeyCode::KeyW | KeyCode::ArrowUp => Some(InputAction::MoveUp),
        KeyCode::KeyS | KeyCode::ArrowDown => Some(InputAction::MoveDown),
        KeyCode::KeyA | KeyCode::ArrowLeft => Some(InputAction::MoveLeft),
        KeyCode::KeyD | KeyCode::ArrowRight => Some(InputAction::MoveRight),
        KeyCode::Space => Some(InputAction::Confirm),
        KeyCode::Enter | KeyCode::NumpadEnter => Some(InputAction::Submit),
        KeyCode::Backspace => Some(InputAction::Erase),
        KeyCode::Escape => Some(InputAction::Back),
        KeyCode::KeyB => Some(InputAction::Brief),
        KeyCode::F1 => Some(InputAction::ToggleGodMode),
        KeyCode::F2 => Some(InputAction::WarpNext),
        _ => None,
    }
}

/// Fixed-timestep bookkeeping: wall-clock frame time feeds an accumulator
/// drained in `fixed_dt` ticks.
#[derive(Debug)]
struct FixedStep {
    fixed_dt: Duration,
    max_frame_delta: Duration,
    max_ticks_per_frame: u32,
    accumulator: Duration,
    last_frame: Instant,
}

impl FixedStep {
    fn new(
        fixed_dt: Duration,
        max_frame_delta: Duration,
        max_ticks_per_frame: u32,
        now: Instant,
    ) -> Self {
        Self {
            fixed_dt,
            max_frame_delta,
            max_ticks_per_frame,
            accumulator: Duration::ZERO,
            last_frame: now,
        }
    }

    /// Returns the raw frame time and the ticks owed for it.
    fn begin_frame(&mut self, now: Instant) -> (Duration, StepPlan) {
        let frame_time = now.saturating_duration_since(self.last_frame);
        self.last_frame = now;
        let owed = self
            .accumulator
            .saturating_add(clamp_frame_delta(frame_time, self.max_frame_delta));
        let plan = plan_sim_steps(owed, self.fixed_dt, self.max_ticks_per_frame);
        self.accumulator = plan.remaining_accumulator;
        (frame_time, plan)
    }
}

#[derive(Debug, Clone, Copy)]
struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

fn plan_sim_steps(owed: Duration, fixed_dt: Duration, max_ticks_per_frame: u32) -> StepPlan {
    let affordable = (owed.as_nanos() / fixed_dt.as_nanos().max(1)).min(u128::from(u32::MAX)) as u32;
    let ticks_to_run = affordable.min(max_ticks_per_frame);
    let remaining = owed.saturating_sub(fixed_dt * ticks_to_run);
    if remaining >= fixed_dt {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: Duration::ZERO,
            dropped_backlog: remaining,
        }
    } else {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: remaining,
            dropped_backlog: Duration::ZERO,
        }
    }
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(input: &mut InputCollector, code: KeyCode, text: Option<&str>) {
        input.handle_key(PhysicalKey::Code(code), ElementState::Pressed, text);
    }

    fn release(input: &mut InputCollector, code: KeyCode) {
        input.handle_key(PhysicalKey::Code(code), ElementState::Released, None);
    }

    #[test]
    fn clamp_frame_delta_caps_large_frame() {
        let clamped = clamp_frame_delta(Duration::from_millis(900), Duration::from_millis(250));
        assert_eq!(clamped, Duration::from_millis(250));
    }

    #[test]
    fn plan_sim_steps_runs_expected_ticks_without_drop() {
        let fixed_dt = Duration::from_millis(16);
        let plan = plan_sim_steps(Duration::from_millis(40), fixed_dt, 5);
        assert_eq!(plan.ticks_to_run, 2);
        assert_eq!(plan.remaining_accumulator, Duration::from_millis(8));
        assert_eq!(plan.dropped_backlog, Duration::ZERO);
    }

    #[test]
    fn plan_sim_steps_drops_backlog_when_tick_cap_hit() {
        let fixed_dt = Duration::from_millis(10);
        let plan = plan_sim_steps(Duration::from_millis(100), fixed_dt, 3);
        assert_eq!(plan.ticks_to_run, 3);
        assert_eq!(plan.remaining_accumulator, Duration::ZERO);
        assert_eq!(plan.dropped_backlog, Duration::from_millis(70));
    }

    #[test]
    fn fixed_step_carries_remainder_between_frames() {
        let start = Instant::now();
        let mut step = FixedStep::new(
            Duration::from_millis(10),
            Duration::from_millis(250),
            5,
            start,
        );
        let (frame_time, plan) = step.begin_frame(start + Duration::from_millis(15));
        assert_eq!(frame_time, Duration::from_millis(15));
        assert_eq!(plan.ticks_to_run, 1);

        let (_, plan) = step.begin_frame(start + Duration::from_millis(20));
        assert_eq!(plan.ticks_to_run, 1);
        assert_eq!(step.accumulator, Duration::ZERO);
    }

    #[test]
    fn fixed_step_clamps_long_stalls() {
        let start = Instant::now();
        let mut step = FixedStep::new(
            Duration::from_millis(10),
            Duration::from_millis(250),
            5,
            start,
        );
        let (_, plan) = step.begin_frame(start + Duration::from_secs(3));
        assert_eq!(plan.ticks_to_run, 5);
        assert_eq!(plan.dropped_backlog, Duration::from_millis(200));
        assert_eq!(step.accumulator, Duration::ZERO);
    }

    #[test]
    fn wasd_and_arrow_keys_map_to_move_actions() {
        for (code, action) in [
            (KeyCode::KeyW, InputAction::MoveUp),
            (KeyCode::ArrowUp, InputAction::MoveUp),
            (KeyCode::KeyS, InputAction::MoveDown),
            (KeyCode::ArrowDown, InputAction::MoveDown),
            (KeyCode::KeyA, InputAction::MoveLeft),
            (KeyCode::ArrowLeft, InputAction::MoveLeft),
            (KeyCode::KeyD, InputAction::MoveRight),
            (KeyCode::ArrowRight, InputAction::MoveRight),
        ] {
            assert_eq!(action_for_key(PhysicalKey::Code(code)), Some(action));
        }
        assert_eq!(action_for_key(PhysicalKey::Code(KeyCode::KeyQ)), None);
    }

    #[test]
    fn press_edge_lasts_single_tick_while_hold_persists() {
        let mut input = InputCollector::default();
        press(&mut input, KeyCode::ArrowLeft, None);

        let first = input.snapshot_for_tick();
        let second = input.snapshot_for_tick();

        assert!(first.was_pressed(InputAction::MoveLeft));
        assert!(first.is_down(InputAction::MoveLeft));
        assert!(!second.was_pressed(InputAction::MoveLeft));
        assert!(second.is_down(InputAction::MoveLeft));
    }

    #[test]
    fn key_repeat_does_not_retrigger_edge() {
        let mut input = InputCollector::default();
        press(&mut input, KeyCode::Space, Some(" "));
        assert!(input.snapshot_for_tick().was_pressed(InputAction::Confirm));
        press(&mut input, KeyCode::Space, Some(" "));
        assert!(!input.snapshot_for_tick().was_pressed(InputAction::Confirm));
        release(&mut input, KeyCode::Space);
        press(&mut input, KeyCode::Space, Some(" "));
        assert!(input.snapshot_for_tick().was_pressed(InputAction::Confirm));
    }

    #[test]
    fn key_release_clears_held_state() {
        let mut input = InputCollector::default();
        press(&mut input, KeyCode::KeyD, Some("d"));
        release(&mut input, KeyCode::KeyD);
        let snapshot = input.snapshot_for_tick();
        assert!(snapshot.was_pressed(InputAction::MoveRight));
        assert!(!snapshot.is_down(InputAction::MoveRight));
    }

    #[test]
    fn typed_text_is_drained_per_tick_without_control_chars() {
        let mut input = InputCollector::default();
        press(&mut input, KeyCode::KeyY, Some("Y"));
        press(&mut input, KeyCode::KeyE, Some("e"));
        press(&mut input, KeyCode::Backspace, Some("\u{8}"));
        press(&mut input, KeyCode::Enter, Some("\r"));

        let first = input.snapshot_for_tick();
        assert_eq!(first.typed_text(), "Ye");
        assert!(first.was_pressed(InputAction::Erase));
        assert!(first.was_pressed(InputAction::Submit));
        assert_eq!(input.snapshot_for_tick().typed_text(), "");
    }

    #[test]
    fn focus_loss_releases_held_keys() {
        let mut input = InputCollector::default();
        press(&mut input, KeyCode::KeyW, None);
        input.release_all();
        let snapshot = input.snapshot_for_tick();
        assert!(!snapshot.is_down(InputAction::MoveUp));
    }
}
