use macroquad::prelude::*;
use macroquad::ui::{hash, root_ui, widgets};

use projectile_lab::core::ballistics::Planet;
use projectile_lab::core::driver::RunPhase;

use crate::constants::{
    ANGLE_RANGE_DEG, CUSTOM_GRAVITY_LABEL, MASS_RANGE_KG, PANEL_H, PANEL_W, PANEL_X, PANEL_Y, SPEED_RANGE_MPS,
};
use crate::state::AppRuntime;

#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct FrameActions {
    pub(crate) launch: bool,
    pub(crate) toggle_pause: bool,
    pub(crate) reset: bool,
    pub(crate) save: bool,
}

impl FrameActions {
    pub(crate) fn merge(self, other: Self) -> Self {
        Self {
            launch: self.launch || other.launch,
            toggle_pause: self.toggle_pause || other.toggle_pause,
            reset: self.reset || other.reset,
            save: self.save || other.save,
        }
    }
}

/// Space launches from rest and pauses or resumes a run in flight.
pub(crate) fn space_action(space: bool, phase: RunPhase) -> FrameActions {
    let in_flight = matches!(phase, RunPhase::Running | RunPhase::Paused);
    FrameActions {
        launch: space && !in_flight,
        toggle_pause: space && in_flight,
        ..Default::default()
    }
}

/// A text field counts as focused from the frame its contents change until
/// the next mouse click elsewhere.
pub(crate) fn text_focus_after(was_typing: bool, edited: bool, clicked: bool) -> bool {
    edited || (was_typing && !clicked)
}

/// Hotkeys double as printable characters; none fire while typing.
pub(crate) fn gate_hotkeys(hotkeys: FrameActions, typing: bool) -> FrameActions {
    if typing { FrameActions::default() } else { hotkeys }
}

pub(crate) fn hotkey_actions(phase: RunPhase, typing: bool) -> FrameActions {
    let hotkeys = space_action(is_key_pressed(KeyCode::Space), phase).merge(FrameActions {
        reset: is_key_pressed(KeyCode::R),
        ..Default::default()
    });
    gate_hotkeys(hotkeys, typing)
}

fn gravity_variants() -> Vec<&'static str> {
    Planet::ALL
        .iter()
        .map(|p| p.name())
        .chain(std::iter::once(CUSTOM_GRAVITY_LABEL))
        .collect()
}

/// Buttons for disabled controls are shown as plain labels and never fire.
fn gated_button(ui: &mut macroquad::ui::Ui, enabled: bool, label: &str) -> bool {
    if enabled {
        ui.button(None, label)
    } else {
        ui.label(None, &format!("[{label}]"));
        false
    }
}

/// Draws the panel and returns its button actions, plus whether either text
/// field changed this frame.
pub(crate) fn draw_control_panel(state: &mut AppRuntime) -> (FrameActions, bool) {
    let custom_before = state.controls.custom_gravity.clone();
    let title_before = state.controls.save_title.clone();
    let enabled = state.lab.controls();
    let readouts = state.lab.readouts();
    let variants = gravity_variants();
    let custom_selected = state.controls.gravity_idx >= Planet::ALL.len();

    let mut actions = FrameActions::default();
    widgets::Window::new(hash!(), vec2(PANEL_X, PANEL_Y), vec2(PANEL_W, PANEL_H))
        .label("Projectile Lab")
        .ui(&mut *root_ui(), |ui| {
            ui.slider(hash!(), "Angle (deg)", ANGLE_RANGE_DEG, &mut state.controls.angle_deg);
            ui.slider(hash!(), "Speed (m/s)", SPEED_RANGE_MPS, &mut state.controls.speed_mps);
            ui.slider(hash!(), "Mass (kg)", MASS_RANGE_KG, &mut state.controls.mass_kg);
            ui.combo_box(hash!(), "Gravity", &variants, &mut state.controls.gravity_idx);
            if custom_selected {
                ui.input_text(hash!(), "g (m/s^2)", &mut state.controls.custom_gravity);
            }
            ui.separator();

            if gated_button(ui, enabled.launch_enabled, "Launch (Space)") {
                actions.launch = true;
            }
            if gated_button(ui, enabled.pause_enabled, enabled.pause_label) {
                actions.toggle_pause = true;
            }
            if gated_button(ui, enabled.reset_enabled, "Reset (R)") {
                actions.reset = true;
            }
            ui.separator();

            ui.label(None, &format!("Time of flight: {} s", readouts.time_of_flight));
            ui.label(None, &format!("Max height: {} m", readouts.max_height));
            ui.label(None, &format!("Range: {} m", readouts.range));
            ui.label(None, &format!("Gravity: {} m/s^2", readouts.gravity));
            ui.label(None, &format!("Kinetic energy: {} J", readouts.kinetic_energy));
            ui.separator();

            ui.input_text(hash!(), "Title", &mut state.controls.save_title);
            if ui.button(None, "Save") {
                actions.save = true;
            }
            ui.label(None, &state.status_line);
        });

    let edited = state.controls.custom_gravity != custom_before || state.controls.save_title != title_before;
    (actions, edited)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn space_launches_at_rest_and_pauses_in_flight() {
        assert!(space_action(true, RunPhase::Idle).launch);
        assert!(space_action(true, RunPhase::Landed).launch);
        assert!(space_action(true, RunPhase::Running).toggle_pause);
        assert!(space_action(true, RunPhase::Paused).toggle_pause);
        assert_eq!(space_action(false, RunPhase::Running), FrameActions::default());
    }

    #[test]
    fn typing_in_a_text_field_swallows_hotkeys() {
        let space_and_r = space_action(true, RunPhase::Running).merge(FrameActions {
            reset: true,
            ..Default::default()
        });

        // typing "R" then " " into the title field
        let typing = text_focus_after(false, true, false);
        assert_eq!(gate_hotkeys(space_and_r, typing), FrameActions::default());
        let typing = text_focus_after(typing, true, false);
        assert_eq!(gate_hotkeys(space_and_r, typing), FrameActions::default());

        // focus persists on frames without edits until a click
        let typing = text_focus_after(typing, false, false);
        assert!(typing);
        let typing = text_focus_after(typing, false, true);
        assert!(!typing);
        assert_eq!(gate_hotkeys(space_and_r, typing), space_and_r);
    }

    #[test]
    fn custom_entry_follows_the_planets() {
        let variants = gravity_variants();
        assert_eq!(variants.len(), Planet::ALL.len() + 1);
        assert_eq!(variants.last(), Some(&CUSTOM_GRAVITY_LABEL));
    }
}
