use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

use crate::config::ViewerConfig;
use crate::zones::{PollOutcome, ZoneCoordinate, ZoneSession};

use super::input::InputCollector;
use super::metrics::{LoopMetricsSnapshot, MetricsAccumulator};
use super::overlay::HudData;
use super::rendering::{build_frame, cell_at_screen, FrameModel, FrameRequest, Renderer, Viewport};
use super::view_state::ViewState;

pub const DEFAULT_WINDOW_TITLE: &str = "Caves of Qud - Live Parsang Map";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    /// `None` or `Some(0)` renders uncapped.
    pub max_render_fps: Option<u32>,
    pub metrics_log_interval_ms: u64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: DEFAULT_WINDOW_TITLE.to_string(),
            window_width: 1280,
            window_height: 800,
            max_render_fps: Some(60),
            metrics_log_interval_ms: 1_000,
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

pub fn run_viewer(config: ViewerConfig) -> Result<(), AppError> {
    let paths = config.sources.resolve();
    info!(
        log_file = %paths.log_file.display(),
        catalog_file = %paths.catalog_file.display(),
        cache_dir = ?paths.cache_dir,
        scan_mode = ?config.map.scan_mode,
        "startup"
    );
    let poll_interval =
        normalize_non_zero_duration(config.map.poll_interval(), Duration::from_secs(5));
    let mut session = ZoneSession::new(paths, config.map.scan_mode, poll_interval);
    session.startup(Instant::now());

    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window.window_width as f64,
                config.window.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let mut renderer = Renderer::new(Arc::clone(&window)).map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let metrics_log_interval = normalize_non_zero_duration(
        Duration::from_millis(config.window.metrics_log_interval_ms),
        Duration::from_secs(1),
    );
    let effective_render_cap = normalize_render_fps_cap(config.window.max_render_fps);
    let render_frame_target = target_frame_duration(effective_render_cap);
    let mut input_collector = InputCollector::new();
    let mut view = ViewState::new(&config.map);
    if let Some(coord) = session.current_location().coordinate() {
        view.focus(coord, renderer.viewport());
    }

    info!(
        poll_interval_ms = poll_interval.as_millis() as u64,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        render_fps_cap = %format_render_cap(effective_render_cap),
        level = view.level(),
        level_aware = view.level_aware(),
        "loop_config"
    );

    let mut last_frame_instant = Instant::now();
    let mut last_present_instant = Instant::now();
    let mut metrics_accumulator = MetricsAccumulator::new(metrics_log_interval, Instant::now());
    let mut last_metrics = LoopMetricsSnapshot::default();

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    input_collector.mark_quit_requested();
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
                WindowEvent::CursorMoved { position, .. } => {
                    input_collector.set_cursor_position_px(position.x, position.y);
                }
                WindowEvent::CursorLeft { .. } => {
                    input_collector.clear_cursor_position();
                }
                WindowEvent::MouseInput { state, button, .. } => {
                    input_collector.handle_mouse_input(button, state);
                }
                WindowEvent::MouseWheel { delta, .. } => {
                    input_collector.handle_mouse_wheel(delta);
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    input_collector.handle_keyboard_input(&event);
                    if input_collector.quit_requested {
                        info!(reason = "escape_key", "shutdown_requested");
                        window_target.exit();
                    }
                }
                WindowEvent::RedrawRequested => {
                    let now = Instant::now();
                    let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
                    last_frame_instant = now;

                    if let PollOutcome::Scanned(_) = session.poll(now) {
                        metrics_accumulator.record_scan();
                    }

                    let viewport = renderer.viewport();
                    let frame_input = input_collector.take_frame_input();
                    view.apply_input(&frame_input, viewport);

                    // Single authoritative FPS cap sleep point for render pacing.
                    let elapsed_since_last_present =
                        Instant::now().saturating_duration_since(last_present_instant);
                    let cap_sleep =
                        compute_cap_sleep(elapsed_since_last_present, render_frame_target);
                    if cap_sleep > Duration::ZERO {
                        thread::sleep(cap_sleep);
                    }

                    let model = compose_frame(&session, &view, viewport);
                    let hud = view.hud_visible().then(|| {
                        hud_data(
                            &session,
                            &view,
                            frame_input.cursor.and_then(|cursor| {
                                cell_at_screen(
                                    view.transform(),
                                    cursor,
                                    view.cell_size_px(),
                                    &view.grid(),
                                    view.level(),
                                )
                            }),
                            last_metrics,
                            effective_render_cap,
                        )
                    });
                    if let Err(error) = renderer.render(&model, hud.as_ref()) {
                        warn!(error = %error, "renderer_draw_failed");
                        window_target.exit();
                    }
                    last_present_instant = Instant::now();
                    metrics_accumulator.record_frame(raw_frame_dt);

                    if let Some(snapshot) = metrics_accumulator.maybe_snapshot(now) {
                        last_metrics = snapshot;
                        info!(
                            fps = snapshot.fps,
                            frame_time_ms = snapshot.frame_time_ms,
                            scans = snapshot.scans,
                            visible_cells = model.cells.len(),
                            records = session.store().len(),
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
                info!(scans = session.scan_count(), "shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

pub(crate) fn compose_frame(session: &ZoneSession, view: &ViewState, viewport: Viewport) -> FrameModel {
    let request = FrameRequest {
        store: session.store(),
        level: view.level(),
        location: session.current_location(),
        grid: view.grid(),
        base_cell_size: view.cell_size_px(),
    };
    build_frame(&request, view.transform(), &viewport.screen_rect())
}

pub(crate) fn hud_data(
    session: &ZoneSession,
    view: &ViewState,
    hovered: Option<ZoneCoordinate>,
    metrics: LoopMetricsSnapshot,
    render_fps_cap: Option<u32>,
) -> HudData {
    HudData {
        location: session.current_location(),
        level: view.level(),
        level_aware: view.level_aware(),
        zoom: view.transform().zoom(),
        hovered: hovered.map(|coord| (coord, session.store().get(&coord).name.clone())),
        metrics,
        render_fps_cap,
        scan_mode: session.scan_mode(),
    }
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
