use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, MouseButton, Touch, TouchPhase, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::WindowBuilder;

use crate::resolve_app_paths;

use super::metrics::LoopRateMeter;
use super::{InputAggregator, InputEvent, Renderer, Scene, SceneHost, Vec2};

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
    pub max_render_fps: Option<u32>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Silent Salt".to_string(),
            window_width: 800,
            window_height: 600,
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval: Duration::from_secs(1),
            max_render_fps: None,
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

pub fn run_app(config: LoopConfig, scene: Box<dyn Scene>) -> Result<(), AppError> {
    let assets_dir = match resolve_app_paths() {
        Ok(paths) => {
            info!(
                root = %paths.root.display(),
                assets_dir = %paths.assets_dir.display(),
                "startup"
            );
            Some(paths.assets_dir)
        }
        Err(error) => {
            warn!(error = %error, "startup_root_unresolved_sprites_disabled");
            None
        }
    };

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
    let mut renderer =
        Renderer::new(Arc::clone(&window), assets_dir).map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let target_tps = config.target_tps.max(1);
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(1));
    let fixed_dt = Duration::from_secs_f64(1.0 / target_tps as f64);
    let fixed_dt_seconds = fixed_dt.as_secs_f32();
    let effective_render_cap = normalize_render_fps_cap(config.max_render_fps);
    let render_frame_target = target_frame_duration(effective_render_cap);

    let mut host = SceneHost::new(scene);
    host.load();
    info!(
        entity_count = host.world().entity_count(),
        "scene_loaded"
    );
    info!(
        target_tps,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        render_fps_cap = %format_render_cap(effective_render_cap),
        "loop_config"
    );

    let mut input = InputAggregator::new();
    let mut pointer = PointerRouter::new(window.inner_size().width);
    let mut accumulator = Duration::ZERO;
    let mut last_frame_instant = Instant::now();
    let mut last_present_instant = Instant::now();
    let mut rate_meter = LoopRateMeter::new(metrics_log_interval, Instant::now());
    let mut last_applied_title: Option<String> = None;

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    input.mark_quit_requested();
                    info!(reason = "window_close", "shutdown_requested");
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    pointer.set_window_width(new_size.width);
                    if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::ScaleFactorChanged { .. } => {
                    let size = window.inner_size();
                    pointer.set_window_width(size.width);
                    if let Err(error) = renderer.resize(size.width, size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    if let Some(key) = key_name_for(&event.logical_key) {
                        input.apply(match event.state {
                            ElementState::Pressed => InputEvent::KeyDown(key),
                            ElementState::Released => InputEvent::KeyUp(key),
                        });
                    }
                    if input.quit_requested() {
                        info!(reason = "escape_key", "shutdown_requested");
                        window_target.exit();
                    }
                }
                WindowEvent::CursorMoved { position, .. } => {
                    let point = Vec2::new(position.x as f32, position.y as f32);
                    for routed in pointer.cursor_moved(point) {
                        input.apply(routed);
                    }
                }
                WindowEvent::MouseInput { state, button, .. } => {
                    for routed in pointer.mouse_button(button, state) {
                        input.apply(routed);
                    }
                }
                WindowEvent::Touch(Touch {
                    phase,
                    location,
                    id,
                    ..
                }) => {
                    let point = Vec2::new(location.x as f32, location.y as f32);
                    for routed in pointer.touch(phase, id, point) {
                        input.apply(routed);
                    }
                }
                WindowEvent::RedrawRequested => {
                    let now = Instant::now();
                    let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
                    last_frame_instant = now;

                    let clamped_frame_dt = clamp_frame_delta(raw_frame_dt, max_frame_delta);
                    accumulator = accumulator.saturating_add(clamped_frame_dt);

                    let step_plan = plan_sim_steps(accumulator, fixed_dt, max_ticks_per_frame);
                    for _ in 0..step_plan.ticks_to_run {
                        let snapshot = input.snapshot_for_tick();
                        host.update(fixed_dt_seconds, &snapshot);
                    }
                    rate_meter.record_ticks(step_plan.ticks_to_run);
                    accumulator = step_plan.remaining_accumulator;

                    if step_plan.dropped_backlog > Duration::ZERO {
                        warn!(
                            dropped_backlog_ms = step_plan.dropped_backlog.as_millis() as u64,
                            max_ticks_per_frame, "sim_clamp_triggered"
                        );
                    }

                    let elapsed_since_last_present =
                        Instant::now().saturating_duration_since(last_present_instant);
                    let cap_sleep =
                        compute_cap_sleep(elapsed_since_last_present, render_frame_target);
                    if cap_sleep > Duration::ZERO {
                        thread::sleep(cap_sleep);
                    }

                    if let Err(error) = renderer.render_world(host.world()) {
                        warn!(error = %error, "renderer_draw_failed");
                        window_target.exit();
                    }
                    last_present_instant = Instant::now();

                    let next_title = host.debug_title();
                    if next_title != last_applied_title {
                        window.set_title(next_title.as_deref().unwrap_or(&config.window_title));
                        last_applied_title = next_title;
                    }

                    rate_meter.record_frame(raw_frame_dt);
                    if let Some(snapshot) = rate_meter.poll(now) {
                        info!(
                            fps = snapshot.fps,
                            tps = snapshot.tps,
                            frame_time_ms = snapshot.frame_time_ms,
                            entity_count = host.world().entity_count(),
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
                host.shutdown();
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

/// Browser-style key name for a logical key, as [`InputAggregator`] expects.
fn key_name_for(key: &Key) -> Option<String> {
    match key {
        Key::Character(text) => Some(text.to_string()),
        Key::Named(named) => {
            let name = match named {
                NamedKey::ArrowUp => "ArrowUp",
                NamedKey::ArrowDown => "ArrowDown",
                NamedKey::ArrowLeft => "ArrowLeft",
                NamedKey::ArrowRight => "ArrowRight",
                NamedKey::Space => " ",
                NamedKey::Enter => "Enter",
                NamedKey::Escape => "Escape",
                NamedKey::F3 => "F3",
                _ => return None,
            };
            Some(name.to_string())
        }
        _ => None,
    }
}

/// Turns raw mouse and touch traffic into [`InputEvent`]s.
///
/// Left click and taps on the right half of the window interact. A drag with
/// the right mouse button, or a touch that starts on the left half, drives the
/// joystick. A second finger turns the gesture into a pinch.
#[derive(Debug, Default)]
struct PointerRouter {
    window_width: u32,
    cursor: Option<Vec2>,
    right_drag_active: bool,
    touches: Vec<(u64, Vec2)>,
    joystick_touch: Option<u64>,
    tap_touch: Option<u64>,
    pinching: bool,
}

impl PointerRouter {
    fn new(window_width: u32) -> Self {
        Self {
            window_width,
            ..Self::default()
        }
    }

    fn set_window_width(&mut self, window_width: u32) {
        self.window_width = window_width;
    }

    fn cursor_moved(&mut self, point: Vec2) -> Vec<InputEvent> {
        self.cursor = Some(point);
        if self.right_drag_active {
            vec![InputEvent::DragMove(point)]
        } else {
            Vec::new()
        }
    }

    fn mouse_button(&mut self, button: MouseButton, state: ElementState) -> Vec<InputEvent> {
        match (button, state) {
            (MouseButton::Left, ElementState::Pressed) => vec![InputEvent::Interact],
            (MouseButton::Right, ElementState::Pressed) if !self.right_drag_active => {
                match self.cursor {
                    Some(point) => {
                        self.right_drag_active = true;
                        vec![InputEvent::DragStart(point)]
                    }
                    None => Vec::new(),
                }
            }
            (MouseButton::Right, ElementState::Released) if self.right_drag_active => {
                self.right_drag_active = false;
                vec![InputEvent::DragEnd]
            }
            _ => Vec::new(),
        }
    }

    fn touch(&mut self, phase: TouchPhase, id: u64, point: Vec2) -> Vec<InputEvent> {
        match phase {
            TouchPhase::Started => self.touch_started(id, point),
            TouchPhase::Moved => self.touch_moved(id, point),
            TouchPhase::Ended => self.touch_finished(id, true),
            TouchPhase::Cancelled => self.touch_finished(id, false),
        }
    }

    fn touch_started(&mut self, id: u64, point: Vec2) -> Vec<InputEvent> {
        self.touches.retain(|(touch_id, _)| *touch_id != id);
        self.touches.push((id, point));
        let mut events = Vec::new();

        if self.touches.len() >= 2 {
            if !self.pinching {
                if self.joystick_touch.take().is_some() {
                    events.push(InputEvent::DragEnd);
                }
                self.tap_touch = None;
                self.pinching = true;
                let (a, b) = (self.touches[0].1, self.touches[1].1);
                events.push(InputEvent::PinchStart(a, b));
            }
            return events;
        }

        if self.is_joystick_zone(point) {
            self.joystick_touch = Some(id);
            events.push(InputEvent::DragStart(point));
        } else {
            self.tap_touch = Some(id);
        }
        events
    }

    fn touch_moved(&mut self, id: u64, point: Vec2) -> Vec<InputEvent> {
        let Some(entry) = self.touches.iter_mut().find(|(touch_id, _)| *touch_id == id) else {
            return Vec::new();
        };
        entry.1 = point;

        if self.pinching && self.touches.len() >= 2 {
            let (a, b) = (self.touches[0].1, self.touches[1].1);
            return vec![InputEvent::PinchMove(a, b)];
        }
        if self.joystick_touch == Some(id) {
            return vec![InputEvent::DragMove(point)];
        }
        Vec::new()
    }

    fn touch_finished(&mut self, id: u64, completed: bool) -> Vec<InputEvent> {
        self.touches.retain(|(touch_id, _)| *touch_id != id);
        let mut events = Vec::new();

        if self.pinching && self.touches.len() < 2 {
            self.pinching = false;
            events.push(InputEvent::PinchEnd);
        }
        if self.joystick_touch == Some(id) {
            self.joystick_touch = None;
            events.push(InputEvent::DragEnd);
        }
        if self.tap_touch == Some(id) {
            self.tap_touch = None;
            if completed {
                events.push(InputEvent::Interact);
            }
        }
        events
    }

    fn is_joystick_zone(&self, point: Vec2) -> bool {
        point.x < self.window_width as f32 * 0.5
    }
}

#[derive(Debug, Clone, Copy)]
struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;

    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    let dropped_backlog = if accumulator >= fixed_dt {
        std::mem::take(&mut accumulator)
    } else {
        Duration::ZERO
    };
    StepPlan {
        ticks_to_run,
        remaining_accumulator: accumulator,
        dropped_backlog,
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

fn normalize_render_fps_cap(cap: Option<u32>) -> Option<u32> {
    cap.filter(|value| *value > 0)
}

fn target_frame_duration(max_render_fps: Option<u32>) -> Option<Duration> {
    max_render_fps.map(|fps| Duration::from_secs_f64(1.0 / fps as f64))
}

fn compute_cap_sleep(elapsed: Duration, target: Option<Duration>) -> Duration {
    match target {
        Some(frame_target) if elapsed < frame_target => frame_target - elapsed,
        _ => Duration::ZERO,
    }
}

fn format_render_cap(cap: Option<u32>) -> String {
    match cap {
        Some(value) => value.to_string(),
        None => "off".to_string(),
    }
}
