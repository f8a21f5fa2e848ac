/// Name the calibration tool is registered under with the tool manager.
pub const CALIBRATE_BASIS_TOOL_NAME: &str = "calibratebasis-tool";

/// Tool priority, above the built-in navigation tools which sit at 0.
pub const CALIBRATE_BASIS_TOOL_PRIORITY: i32 = 13;

/// Number of picked points that define an oblique basis.
pub const BASIS_POINT_COUNT: usize = 4;

/// Four points are coplanar when |(v1 x v2) . v3| falls below this value.
/// Fixed on purpose: results must match bit for bit across runs.
pub const COPLANARITY_EPSILON: f64 = 1e-4;

/// DOM key code delivered by the frontend for Escape.
pub const CANCEL_KEY_CODE: u32 = 27;

/// Default world-space radius for snapping a hit onto a triangle vertex.
pub const DEFAULT_VERTEX_SNAP_DISTANCE: f32 = 0.15;

/// Default world-space radius for snapping a hit onto a triangle edge.
pub const DEFAULT_EDGE_SNAP_DISTANCE: f32 = 0.08;
