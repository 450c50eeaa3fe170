//! Heads-up display: intro caption, mode label and control hints.

use bevy::prelude::*;
use bevy_egui::{EguiContexts, EguiPlugin, EguiPrimaryContextPass, egui};
use orrery::{DisplaySink, ViewMode};

use crate::sim::Simulation;

/// Text published by the simulation.
#[derive(Resource, Default, Debug)]
pub struct HudText {
    /// Current cinematic caption. Empty when cleared.
    pub caption: String,
    /// Label of the active view mode.
    pub mode: String,
}

impl DisplaySink for HudText {
    fn show_caption(&mut self, text: &str) {
        text.clone_into(&mut self.caption);
    }

    fn show_mode(&mut self, label: &str) {
        label.clone_into(&mut self.mode);
    }
}

/// Plugin for the HUD overlay.
pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(EguiPlugin::default())
            .init_resource::<HudText>()
            .add_systems(EguiPrimaryContextPass, hud_system);
    }
}

/// Control hints for a mode.
fn hints(mode: ViewMode) -> &'static [&'static str] {
    match mode {
        ViewMode::Spaceship => &[
            "W/S: fly forward/back",
            "A/D: strafe and bank",
            "Drag: look, wheel: zoom",
        ],
        ViewMode::Free => &["W/S: move", "A/D: strafe", "Drag: look, wheel: zoom"],
        ViewMode::Orbit => &["Arrows: orbit around the ship", "Wheel: orbit distance"],
    }
}

fn hud_system(
    mut contexts: EguiContexts,
    hud: Res<HudText>,
    sim: Option<Res<Simulation>>,
) -> Result {
    let ctx = contexts.ctx_mut()?;

    if !hud.caption.is_empty() {
        egui::Area::new(egui::Id::new("caption"))
            .anchor(egui::Align2::CENTER_BOTTOM, [0.0, -48.0])
            .interactable(false)
            .show(ctx, |ui| {
                ui.label(
                    egui::RichText::new(&hud.caption)
                        .size(28.0)
                        .color(egui::Color32::WHITE),
                );
            });
    }

    egui::Area::new(egui::Id::new("mode"))
        .anchor(egui::Align2::RIGHT_TOP, [-16.0, 16.0])
        .interactable(false)
        .show(ctx, |ui| {
            ui.label(
                egui::RichText::new(&hud.mode)
                    .size(20.0)
                    .color(egui::Color32::LIGHT_GRAY),
            );
            if let Some(sim) = &sim
                && sim.0.is_interactive()
            {
                for hint in hints(sim.0.mode()) {
                    ui.label(egui::RichText::new(*hint).color(egui::Color32::GRAY));
                }
                ui.label(egui::RichText::new("Space: change mode").color(egui::Color32::GRAY));
            }
        });

    Ok(())
}
