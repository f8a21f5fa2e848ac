/// Calibration tool identity and geometric thresholds.
pub mod calibration;

/// Marker, indicator and toolbar rendering constants.
pub mod render_settings;
