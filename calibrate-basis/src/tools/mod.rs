//! Interactive tools for basis calibration.
//!
//! ## Tool Manager Architecture
//!
//! The `ToolManager` resource keeps a registry of named tools and exclusive
//! activation state:
//! - Tools are registered with an explicit name and priority
//! - Only one tool can be active at a time
//! - Tools are toggled via the toolbar button, the `C` key (native) or RPC
//! - Deactivation clears tool-specific state and notifies the frontend
//!
//! ### Tool Activation Flow
//!
//! ```text
//! Toolbar / Keyboard / RPC
//!   └─> ToolbarToggleEvent
//!       └─> handle_toolbar_toggle_events()
//!           ├─> ToolSelectionEvent ──> handle_tool_selection_events()
//!           └─> ClearToolEvent ──────> handle_clear_tool_events()
//! ```
//!
//! ## Calibrate Basis Tool (`ToolType::CalibrateBasis`)
//! - **Workflow**:
//!   1. Pointer movement snaps to model vertices, edges or faces
//!   2. Left click adds the snapped point (up to four, numbered markers)
//!   3. A coplanar fourth point discards the attempt, tool stays active
//!   4. A valid fourth point produces the oblique basis and ends the tool
//!   5. Escape discards the points picked so far

/// Four-point collector and its event handlers.
pub mod calibrate_basis;

/// On-screen markers for picked points.
pub mod markers;

/// Pointer ray snapping against model geometry.
pub mod snapping;

/// Unified tool manager coordinating exclusive tool activation and state.
pub mod tool_manager;

/// Toolbar button toggling the calibration tool.
pub mod toolbar;
