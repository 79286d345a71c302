//! Runtime controls: keyboard bindings and the optional egui panel.
//!
//! Both produce [`Action`]s; the app forwards tunable changes to
//! [`Scene::update_tunable`](crate::Scene::update_tunable) so validation and
//! the pool restart on trail length changes happen in one place.
//!
//! | Key            | Action                       |
//! |----------------|------------------------------|
//! | Up / Down      | Trail length +/- 5           |
//! | Right / Left   | Pull strength +/- 0.1        |
//! | H              | Next head color preset       |
//! | T              | Next tail color preset       |
//! | Space          | Pause / resume               |
//! | C              | Reset camera                 |
//! | Escape         | Quit                         |

use glam::Vec3;
use winit::keyboard::KeyCode;

use crate::tunables::{Tunables, TunableUpdate, MAX_TRAIL_LENGTH};

/// Trail length change per key press.
pub const TRAIL_STEP: u32 = 5;
/// Pull strength change per key press.
pub const PULL_STEP: f32 = 0.1;
/// Upper bound the controls will push pull strength to.
pub const MAX_PULL: f32 = 5.0;

/// Colors cycled by the H and T keys.
pub const COLOR_PRESETS: [Vec3; 6] = [
    Vec3::ONE,
    Vec3::new(1.0, 0.55, 0.1),
    Vec3::new(1.0, 0.85, 0.3),
    Vec3::new(0.3, 0.8, 1.0),
    Vec3::new(0.6, 0.3, 1.0),
    Vec3::ZERO,
];

/// Something the user asked for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Tunable(TunableUpdate),
    TogglePause,
    ResetCamera,
    Quit,
}

/// Key binding state.
#[derive(Debug, Default)]
pub struct Controls {
    head_preset: usize,
    tail_preset: usize,
}

impl Controls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a key press to an action, given the current tunables.
    ///
    /// Steps saturate at the valid range, so a press at a bound maps to an
    /// update equal to the current value (which the scene reports as no change).
    pub fn on_key(&mut self, key: KeyCode, tunables: &Tunables) -> Option<Action> {
        let action = match key {
            KeyCode::ArrowUp => Action::Tunable(TunableUpdate::TrailLength(
                tunables
                    .trail_length
                    .saturating_add(TRAIL_STEP)
                    .min(MAX_TRAIL_LENGTH),
            )),
            KeyCode::ArrowDown => Action::Tunable(TunableUpdate::TrailLength(
                tunables.trail_length.saturating_sub(TRAIL_STEP).max(1),
            )),
            KeyCode::ArrowRight => Action::Tunable(TunableUpdate::PullStrength(step_pull(
                tunables.pull_strength,
                PULL_STEP,
            ))),
            KeyCode::ArrowLeft => Action::Tunable(TunableUpdate::PullStrength(step_pull(
                tunables.pull_strength,
                -PULL_STEP,
            ))),
            KeyCode::KeyH => {
                self.head_preset = (self.head_preset + 1) % COLOR_PRESETS.len();
                Action::Tunable(TunableUpdate::HeadColor(COLOR_PRESETS[self.head_preset]))
            }
            KeyCode::KeyT => {
                self.tail_preset = (self.tail_preset + 1) % COLOR_PRESETS.len();
                Action::Tunable(TunableUpdate::TailColor(COLOR_PRESETS[self.tail_preset]))
            }
            KeyCode::Space => Action::TogglePause,
            KeyCode::KeyC => Action::ResetCamera,
            KeyCode::Escape => Action::Quit,
            _ => return None,
        };
        Some(action)
    }
}

fn step_pull(current: f32, step: f32) -> f32 {
    // round to one decimal so repeated steps don't drift
    let stepped = ((current + step) * 10.0).round() / 10.0;
    stepped.clamp(0.0, MAX_PULL.max(current))
}

/// Read-only numbers shown alongside the sliders.
#[cfg(feature = "egui")]
#[derive(Debug, Clone, Copy)]
pub struct PanelStatus {
    pub fps: f32,
    pub live: usize,
    pub capacity: usize,
    pub absorbed: u64,
    pub escaped: u64,
    pub paused: bool,
}

/// Draw the control panel and return the actions the user triggered this pass.
#[cfg(feature = "egui")]
pub fn panel(ctx: &egui::Context, tunables: &Tunables, status: PanelStatus) -> Vec<Action> {
    let mut actions = Vec::new();

    egui::Window::new("Black Hole")
        .default_pos([10.0, 10.0])
        .resizable(false)
        .show(ctx, |ui| {
            let mut trail_length = tunables.trail_length;
            let trail = ui.add(
                egui::Slider::new(&mut trail_length, 1..=MAX_TRAIL_LENGTH).text("Trail length"),
            );
            if trail.changed() {
                actions.push(Action::Tunable(TunableUpdate::TrailLength(trail_length)));
            }

            let mut pull = tunables.pull_strength;
            if ui
                .add(egui::Slider::new(&mut pull, 0.0..=MAX_PULL).text("Pull strength"))
                .changed()
            {
                actions.push(Action::Tunable(TunableUpdate::PullStrength(pull)));
            }

            ui.horizontal(|ui| {
                let mut head = tunables.head_color.to_array();
                ui.label("Head");
                if ui.color_edit_button_rgb(&mut head).changed() {
                    actions.push(Action::Tunable(TunableUpdate::HeadColor(Vec3::from(head))));
                }
                let mut tail = tunables.tail_color.to_array();
                ui.label("Tail");
                if ui.color_edit_button_rgb(&mut tail).changed() {
                    actions.push(Action::Tunable(TunableUpdate::TailColor(Vec3::from(tail))));
                }
            });

            ui.separator();
            ui.label(format!("{:.0} fps", status.fps));
            ui.label(format!("rays: {} / {}", status.live, status.capacity));
            ui.label(format!(
                "absorbed: {}  escaped: {}",
                status.absorbed, status.escaped
            ));

            ui.horizontal(|ui| {
                let label = if status.paused { "Resume" } else { "Pause" };
                if ui.button(label).clicked() {
                    actions.push(Action::TogglePause);
                }
                if ui.button("Reset camera").clicked() {
                    actions.push(Action::ResetCamera);
                }
            });
        });

    actions
}
