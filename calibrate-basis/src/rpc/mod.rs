//! JSON-RPC 2.0 communication layer for frontend integration.
//!
//! Implements bidirectional messaging between the engine and a web UI via
//! iframe postMessage. Native builds keep the same request handling; outgoing
//! messages are only logged.
//!
//! ## Message Flow
//!
//! ```text
//! Frontend (Parent Window)  <──postMessage──>  Engine (iframe)
//!        │                                        │
//!        ├─ Request (with ID) ──────────────────> │
//!        │                                        ├─ Decode into RpcCommand
//!        │                                        ├─ Dispatch tool event
//!        │ <───────────────── Response (with ID) ─┤
//!        │                                        │
//!        │ <────────── Notification (no ID) ─────┤
//! ```
//!
//! ## Methods
//!
//! - `tool_selection { tool }`: activate the calibration tool
//! - `toggle_tool { tool }`: same as pressing the toolbar button
//! - `clear_tool`: deactivate the current tool
//! - `key_up { key_code }`: key release from the page, 27 cancels the current attempt
//! - `get_calibration`: latest calibrated basis, or `null`
//!
//! ## Notifications
//!
//! - `tool_state_changed { tool, active }`
//! - `calibration_point_added { index, position }`
//! - `calibration_rejected { reason }`
//! - `calibration_cancelled`
//! - `basis_calibrated { basis }`
//!
//! ## Error Handling
//!
//! Standard JSON-RPC 2.0 error codes:
//! - `-32600`: Invalid request
//! - `-32601`: Method not found
//! - `-32602`: Invalid params

/// JSON-RPC 2.0 bidirectional communication system.
///
/// Handles request-response patterns, notifications, and WASM message listeners.
pub mod web_rpc;
