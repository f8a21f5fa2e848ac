//! Four-point oblique basis calibration tool.
//!
//! ```text
//! PointerClickEvent ──> handle_calibration_clicks()
//!                         ├─> Snapper::current_pick()
//!                         ├─> PointCollector::handle_click()
//!                         │     ├─> MarkerQueue (ordinal marker)
//!                         │     └─> solve_basis() on the fourth valid point
//!                         └─> BasisCalibratedEvent + CalibrationResult
//! ToolKeyUpEvent(27)  ──> handle_calibration_key_up() ──> cancel
//! ```

pub mod collector;

use crate::basis::Basis;
use crate::rpc::web_rpc::WebRpcInterface;
use crate::tools::markers::{MarkerQueue, MarkerSink};
use crate::tools::snapping::Snapper;
use bevy::prelude::*;

pub use collector::{CollectorState, PickOutcome, PointCollector};

/// Pointer click delivered by the host input layer.
#[derive(Event, Debug, Clone, Copy)]
pub struct PointerClickEvent {
    pub button: MouseButton,
}

/// Key release delivered by the host, using DOM key codes.
#[derive(Event, Debug, Clone, Copy)]
pub struct ToolKeyUpEvent {
    pub key_code: u32,
}

/// Fired once per successful four-point solve.
#[derive(Event, Debug, Clone, Copy)]
pub struct BasisCalibratedEvent {
    pub basis: Basis,
}

/// Most recent calibration, replaced on every successful solve.
#[derive(Resource, Default, Debug)]
pub struct CalibrationResult {
    pub latest: Option<Basis>,
}

pub struct CalibrateBasisToolPlugin;

impl Plugin for CalibrateBasisToolPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PointCollector>()
            .init_resource::<CalibrationResult>()
            .init_resource::<Snapper>()
            .init_resource::<MarkerQueue>()
            .add_event::<PointerClickEvent>()
            .add_event::<ToolKeyUpEvent>()
            .add_event::<BasisCalibratedEvent>();
    }
}

/// Cancel key handling. Clears markers along with the buffer.
pub fn handle_calibration_key_up(
    mut keys: EventReader<ToolKeyUpEvent>,
    mut collector: ResMut<PointCollector>,
    mut markers: ResMut<MarkerQueue>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    for key in keys.read() {
        if collector.handle_key_up(key.key_code) {
            markers.clear_markers();
            rpc_interface.send_notification("calibration_cancelled", serde_json::json!({}));
        }
    }
}

/// Primary-button clicks feed the collector with the current snap.
pub fn handle_calibration_clicks(
    mut clicks: EventReader<PointerClickEvent>,
    mut collector: ResMut<PointCollector>,
    snapper: Res<Snapper>,
    mut markers: ResMut<MarkerQueue>,
    mut result: ResMut<CalibrationResult>,
    mut calibrated: EventWriter<BasisCalibratedEvent>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    for click in clicks.read() {
        if click.button != MouseButton::Left {
            continue;
        }

        match collector.handle_click(&*snapper, &mut *markers) {
            PickOutcome::Ignored => {}
            PickOutcome::Accepted { index, point } => {
                rpc_interface.send_notification(
                    "calibration_point_added",
                    serde_json::json!({
                        "index": index,
                        "position": point.to_array(),
                    }),
                );
            }
            PickOutcome::RejectedCoplanar => {
                rpc_interface.send_notification(
                    "calibration_rejected",
                    serde_json::json!({ "reason": "coplanar" }),
                );
            }
            PickOutcome::Solved(basis) => {
                result.latest = Some(basis);
                calibrated.write(BasisCalibratedEvent { basis });
                rpc_interface.send_notification(
                    "basis_calibrated",
                    serde_json::json!({ "basis": basis.record() }),
                );
            }
        }
    }
}
