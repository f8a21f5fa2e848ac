//! Viewer-side glue: input translation, snapping against scene meshes,
//! marker and indicator visuals, toolbar and settings loading.

/// Snap indicator under the pointer.
pub mod gizmos;

/// Mouse and keyboard translation into tool events.
pub mod input;

/// Demo model, lighting and camera for the native viewer.
pub mod scene;

use crate::CalibrationSet;
use crate::settings::SettingsPlugin;
use crate::tools::markers::attach_marker_visuals;
use crate::tools::snapping::update_snapper_system;
use crate::tools::tool_manager::handle_tool_keyboard_shortcuts;
use crate::tools::toolbar::{spawn_toolbar, sync_toolbar_button_state, toolbar_button_interaction};
use bevy::prelude::*;

/// Windowed host for the calibration tool. Requires `DefaultPlugins`.
pub struct ViewerPlugin;

impl Plugin for ViewerPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(SettingsPlugin)
            .add_systems(Startup, (spawn_toolbar, gizmos::create_snap_indicator))
            .add_systems(
                Update,
                (
                    handle_tool_keyboard_shortcuts,
                    toolbar_button_interaction,
                    input::emit_tool_key_ups,
                    update_snapper_system,
                    input::emit_pointer_clicks,
                )
                    .chain()
                    .in_set(CalibrationSet::Input),
            )
            .add_systems(
                Update,
                (
                    attach_marker_visuals,
                    gizmos::update_snap_indicator,
                    sync_toolbar_button_state,
                    scene::log_calibrated_basis,
                )
                    .after(CalibrationSet::Collect),
            );
    }
}
