//! Windowed front end and headless runner.
//!
//! [`run`] opens a window, drives a [`Scene`] backed by a [`DrawableStore`]
//! from `RedrawRequested`, and draws the store with the wgpu renderer.
//! [`run_headless`] drives the same scene on a fixed timestep without a
//! window.

use std::sync::Arc;
use std::time::{Duration, Instant};

use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::backend::DrawableStore;
use crate::config::SimConfig;
use crate::controls::{Action, Controls};
use crate::error::{AppError, ConfigError};
use crate::gpu::{Camera, GpuState};
use crate::pool::PoolStats;
use crate::scene::Scene;
use crate::time::Time;
use crate::tunables::{to_hex_color, TunableUpdate};

#[cfg(feature = "egui")]
use crate::gpu::EguiIntegration;

const TITLE: &str = "Event Horizon";
const TITLE_REFRESH: Duration = Duration::from_millis(500);
const MESSAGE_DURATION: Duration = Duration::from_secs(2);

/// Simulated frame length used by [`run_headless`].
pub const HEADLESS_FRAME: Duration = Duration::from_micros(16_667);

/// Open a window and run until it is closed.
pub fn run(config: SimConfig) -> Result<(), AppError> {
    let scene = Scene::new(config, DrawableStore::new())?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(scene);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Run `frames` fixed-length frames without a window and return the pool statistics.
pub fn run_headless(
    config: SimConfig,
    frames: u64,
    seed: Option<u64>,
) -> Result<PoolStats, ConfigError> {
    let mut scene = match seed {
        Some(seed) => Scene::with_seed(config, DrawableStore::new(), seed)?,
        None => Scene::new(config, DrawableStore::new())?,
    };

    for frame in 0..frames {
        let report = scene.frame(HEADLESS_FRAME);
        tracing::trace!(frame, spawned = report.spawned, removed = report.tick.removed, "frame");
    }
    let live = scene.pool().len();
    scene.shutdown();

    let stats = scene.pool().stats();
    tracing::info!(
        frames,
        live_at_end = live,
        spawned = stats.spawned,
        absorbed = stats.absorbed,
        escaped = stats.escaped,
        overflowed = stats.overflowed,
        "headless run finished"
    );
    Ok(stats)
}

struct App {
    scene: Scene<DrawableStore>,
    time: Time,
    controls: Controls,
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    #[cfg(feature = "egui")]
    egui: Option<EguiIntegration>,
    mouse_pressed: bool,
    last_mouse_pos: Option<(f64, f64)>,
    message: Option<(String, Instant)>,
    last_title_update: Instant,
    title_dirty: bool,
    error: Option<AppError>,
}

impl App {
    fn new(scene: Scene<DrawableStore>) -> Self {
        Self {
            scene,
            time: Time::new(),
            controls: Controls::new(),
            window: None,
            gpu_state: None,
            #[cfg(feature = "egui")]
            egui: None,
            mouse_pressed: false,
            last_mouse_pos: None,
            message: None,
            last_title_update: Instant::now(),
            title_dirty: true,
            error: None,
        }
    }

    fn init_window(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let window_attrs = Window::default_attributes()
            .with_title(TITLE)
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let config = self.scene.config();
        let gpu_state = pollster::block_on(GpuState::new(
            window.clone(),
            &config.render,
            &config.trail,
        ))?;

        #[cfg(feature = "egui")]
        {
            self.egui = Some(EguiIntegration::new(
                gpu_state.device(),
                gpu_state.format(),
                &window,
            ));
        }

        self.window = Some(window);
        self.gpu_state = Some(gpu_state);
        // don't count window setup as simulated time
        self.time = Time::new();
        Ok(())
    }

    fn show_message(&mut self, text: impl Into<String>) {
        self.message = Some((text.into(), Instant::now()));
        self.title_dirty = true;
    }

    fn handle_action(&mut self, action: Action, event_loop: &ActiveEventLoop) {
        match action {
            Action::Tunable(update) => match self.scene.update_tunable(update) {
                Ok(true) => self.show_message(describe(update)),
                Ok(false) => {}
                Err(e) => self.show_message(e.to_string()),
            },
            Action::TogglePause => {
                self.time.toggle_pause();
                let text = if self.time.is_paused() { "paused" } else { "resumed" };
                self.show_message(text);
            }
            Action::ResetCamera => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.camera = Camera::new(self.scene.config().render.camera_distance);
                }
            }
            Action::Quit => event_loop.exit(),
        }
    }

    fn on_key(&mut self, event: &KeyEvent, event_loop: &ActiveEventLoop) {
        if event.state != ElementState::Pressed {
            return;
        }
        let PhysicalKey::Code(code) = event.physical_key else {
            return;
        };
        let repeatable = matches!(
            code,
            KeyCode::ArrowUp | KeyCode::ArrowDown | KeyCode::ArrowLeft | KeyCode::ArrowRight
        );
        if event.repeat && !repeatable {
            return;
        }
        if let Some(action) = self.controls.on_key(code, self.scene.tunables()) {
            self.handle_action(action, event_loop);
        }
    }

    fn update_title(&mut self) {
        let now = Instant::now();
        if !self.title_dirty && now.duration_since(self.last_title_update) < TITLE_REFRESH {
            return;
        }
        self.last_title_update = now;
        self.title_dirty = false;

        let expired = self
            .message
            .as_ref()
            .is_some_and(|(_, shown)| now.duration_since(*shown) > MESSAGE_DURATION);
        if expired {
            self.message = None;
        }

        let Some(window) = &self.window else {
            return;
        };
        let tunables = self.scene.tunables();
        let mut title = format!(
            "{TITLE} | {}s | {:.0} fps | {} rays | trail {} | pull {:.1}",
            self.time.elapsed().as_secs(),
            self.time.fps(),
            self.scene.pool().len(),
            tunables.trail_length,
            tunables.pull_strength,
        );
        if let Some((text, _)) = &self.message {
            title.push_str(" | ");
            title.push_str(text);
        }
        window.set_title(&title);
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let delta = self.time.update();
        if !self.time.is_paused() {
            self.scene.frame(delta);
        }

        #[cfg(feature = "egui")]
        let ui_output = self.run_ui(event_loop);

        self.update_title();

        let halo_color = self.scene.tunables().head_color;
        let Some(gpu_state) = &mut self.gpu_state else {
            return;
        };

        match gpu_state.begin_frame() {
            Ok(mut frame) => {
                gpu_state.draw_scene(&mut frame, self.scene.backend_mut(), halo_color);
                #[cfg(feature = "egui")]
                if let (Some(egui), Some(output)) = (&mut self.egui, &ui_output) {
                    gpu_state.draw_ui(&mut frame, egui, output);
                }
                gpu_state.finish(frame);
                #[cfg(feature = "egui")]
                if let (Some(egui), Some(output)) = (&mut self.egui, &ui_output) {
                    egui.cleanup(output);
                }
            }
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => gpu_state.reconfigure(),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                tracing::error!("GPU out of memory, exiting");
                event_loop.exit();
            }
            Err(e) => tracing::warn!(error = ?e, "render error"),
        }
    }

    #[cfg(feature = "egui")]
    fn run_ui(&mut self, event_loop: &ActiveEventLoop) -> Option<crate::gpu::EguiFrameOutput> {
        use crate::controls::{panel, PanelStatus};

        let (Some(egui), Some(window)) = (&mut self.egui, &self.window) else {
            return None;
        };
        let stats = self.scene.pool().stats();
        let status = PanelStatus {
            fps: self.time.fps(),
            live: self.scene.pool().len(),
            capacity: self.scene.pool().capacity(),
            absorbed: stats.absorbed,
            escaped: stats.escaped,
            paused: self.time.is_paused(),
        };
        let tunables = *self.scene.tunables();

        let mut actions = Vec::new();
        let output = egui.run(window, |ctx| {
            actions = panel(ctx, &tunables, status);
        });

        for action in actions {
            self.handle_action(action, event_loop);
        }
        Some(output)
    }
}

fn describe(update: TunableUpdate) -> String {
    match update {
        TunableUpdate::TrailLength(n) => format!("trail length {n}, rays reset"),
        TunableUpdate::PullStrength(s) => format!("pull strength {s:.1}"),
        TunableUpdate::HeadColor(c) => format!("head color {}", to_hex_color(c)),
        TunableUpdate::TailColor(c) => format!("tail color {}", to_hex_color(c)),
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.init_window(event_loop) {
                tracing::error!(error = %e, "failed to start renderer");
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        #[cfg(feature = "egui")]
        if let (Some(egui), Some(window)) = (&mut self.egui, &self.window) {
            if egui.on_window_event(window, &event) {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.resize(physical_size);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                self.on_key(&event, event_loop);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if button == MouseButton::Left {
                    self.mouse_pressed = state == ElementState::Pressed;
                    if !self.mouse_pressed {
                        self.last_mouse_pos = None;
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if self.mouse_pressed {
                    if let Some((last_x, last_y)) = self.last_mouse_pos {
                        if let Some(gpu_state) = &mut self.gpu_state {
                            gpu_state
                                .camera
                                .orbit((position.x - last_x) as f32, (position.y - last_y) as f32);
                        }
                    }
                    self.last_mouse_pos = Some((position.x, position.y));
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.1,
                };
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.camera.zoom(scroll);
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.scene.shutdown();
    }
}
