//! Four-point oblique basis calibration for 3D model viewers.
//!
//! The user snaps four points onto model geometry. The first becomes the
//! origin, the rest define three basis vectors of a possibly non-orthogonal
//! frame (see [`basis`]). [`CalibrateBasisPlugin`] wires the collector, tool
//! manager and RPC layer into a Bevy app without needing a window;
//! [`engine::ViewerPlugin`] adds the windowed input, snapping and visuals.

pub mod basis;
pub mod engine;
pub mod error;
pub mod rpc;
pub mod settings;
pub mod tools;

use bevy::prelude::*;
use rpc::web_rpc::{RpcSet, WebRpcPlugin};
use settings::CalibrationSettings;
use tools::calibrate_basis::{
    CalibrateBasisToolPlugin, handle_calibration_clicks, handle_calibration_key_up,
};
use tools::markers::apply_marker_requests;
use tools::tool_manager::{
    ToolManagerPlugin, deactivate_tool_after_solve, handle_clear_tool_events,
    handle_toolbar_toggle_events, handle_tool_selection_events,
};

pub use basis::{Basis, solve_basis};
pub use error::CalibrationError;
pub use tools::calibrate_basis::{
    BasisCalibratedEvent, CalibrationResult, CollectorState, PickOutcome, PointCollector,
};

/// Frame ordering: host input first, then the tool state machine.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum CalibrationSet {
    /// Pointer, keyboard, toolbar and RPC events are produced here.
    Input,
    /// Tool manager and collector consume them.
    Collect,
}

/// Headless core of the calibration tool.
pub struct CalibrateBasisPlugin;

impl Plugin for CalibrateBasisPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((WebRpcPlugin, ToolManagerPlugin, CalibrateBasisToolPlugin))
            .init_resource::<CalibrationSettings>()
            .configure_sets(Update, (CalibrationSet::Input, CalibrationSet::Collect).chain())
            .configure_sets(Update, RpcSet::Receive.in_set(CalibrationSet::Input))
            .add_systems(
                Update,
                (
                    handle_toolbar_toggle_events,
                    handle_tool_selection_events,
                    handle_clear_tool_events,
                    handle_calibration_key_up,
                    handle_calibration_clicks,
                    deactivate_tool_after_solve,
                    apply_marker_requests,
                )
                    .chain()
                    .in_set(CalibrationSet::Collect),
            );
    }
}
