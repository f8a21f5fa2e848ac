use crate::rpc::web_rpc::WebRpcInterface;
use crate::tools::calibrate_basis::{BasisCalibratedEvent, PointCollector};
use crate::tools::markers::{MarkerQueue, MarkerSink};
use bevy::prelude::*;
use constants::calibration::{CALIBRATE_BASIS_TOOL_NAME, CALIBRATE_BASIS_TOOL_PRIORITY};
use serde::{Deserialize, Serialize};

/// Enumeration of available tools in the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolType {
    CalibrateBasis,
}

impl ToolType {
    /// Convert string identifier to tool type for RPC compatibility.
    pub fn from_string(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "calibrate_basis" | "calibratebasis" => Some(Self::CalibrateBasis),
            _ => None,
        }
    }

    /// Convert tool type to string identifier for frontend communication.
    pub fn to_string(&self) -> &'static str {
        match self {
            Self::CalibrateBasis => "calibrate_basis",
        }
    }
}

/// A tool known to the manager, registered under an explicit name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolRegistration {
    pub name: &'static str,
    pub tool_type: ToolType,
    /// Ordering key for `registered_tools`; stored as registration metadata.
    pub priority: i32,
}

/// Resource tracking registered tools and the currently active one.
#[derive(Resource, Default)]
pub struct ToolManager {
    registered: Vec<ToolRegistration>,
    /// Currently selected tool, if any.
    active_tool: Option<ToolType>,
}

impl ToolManager {
    /// Register a tool, replacing any earlier registration with the same name.
    pub fn register_tool(&mut self, registration: ToolRegistration) {
        info!(
            "Tool registered: {} (priority {})",
            registration.name, registration.priority
        );
        self.registered.retain(|r| r.name != registration.name);
        self.registered.push(registration);
        self.registered.sort_by(|a, b| b.priority.cmp(&a.priority));
    }

    /// Remove a tool by name, deactivating it first if needed.
    pub fn deregister_tool(&mut self, name: &str) -> Option<ToolRegistration> {
        let position = self.registered.iter().position(|r| r.name == name)?;
        let registration = self.registered.remove(position);
        if self.active_tool == Some(registration.tool_type) {
            self.deactivate_current_tool();
        }
        info!("Tool unregistered: {}", registration.name);
        Some(registration)
    }

    pub fn registration(&self, tool_type: ToolType) -> Option<&ToolRegistration> {
        self.registered.iter().find(|r| r.tool_type == tool_type)
    }

    pub fn priority_of(&self, tool_type: ToolType) -> Option<i32> {
        self.registration(tool_type).map(|r| r.priority)
    }

    /// Registered tools, highest priority first.
    pub fn registered_tools(&self) -> &[ToolRegistration] {
        &self.registered
    }

    /// Activate specified tool. Returns false when nothing changed.
    pub fn activate_tool(&mut self, tool_type: ToolType) -> bool {
        if self.registration(tool_type).is_none() {
            warn!("Cannot activate unregistered tool: {}", tool_type.to_string());
            return false;
        }

        // Check if tool is already active to avoid redundant operations.
        if self.active_tool == Some(tool_type) {
            return false;
        }

        self.active_tool = Some(tool_type);
        info!("Tool manager activated: {}", tool_type.to_string());
        true
    }

    /// Deactivate currently active tool.
    pub fn deactivate_current_tool(&mut self) -> Option<ToolType> {
        let previous = self.active_tool.take();
        if let Some(tool) = previous {
            info!("Tool manager deactivated: {}", tool.to_string());
        }
        previous
    }

    /// Get currently active tool type.
    pub fn active_tool(&self) -> Option<ToolType> {
        self.active_tool
    }

    /// Check if specific tool is currently active.
    pub fn is_tool_active(&self, tool_type: ToolType) -> bool {
        self.active_tool == Some(tool_type)
    }
}

/// Event fired when tool selection changes via RPC, toolbar or keyboard.
#[derive(Event)]
pub struct ToolSelectionEvent {
    pub tool_type: ToolType,
    pub source: ToolSelectionSource,
}

/// Deactivate whatever tool is active.
#[derive(Event)]
pub struct ClearToolEvent {
    pub source: ToolSelectionSource,
}

/// Toolbar button press: deactivate the tool if active, else activate it.
#[derive(Event)]
pub struct ToolbarToggleEvent {
    pub tool_type: ToolType,
    pub source: ToolSelectionSource,
}

/// Fired after a tool actually changed state.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolStateChanged {
    pub tool_type: ToolType,
    pub active: bool,
}

/// Source of tool selection for debugging and conditional logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolSelectionSource {
    Rpc,
    Keyboard,
    Toolbar,
    /// The tool finished its own job.
    Tool,
}

pub struct ToolManagerPlugin;

impl Plugin for ToolManagerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ToolManager>()
            .add_event::<ToolSelectionEvent>()
            .add_event::<ClearToolEvent>()
            .add_event::<ToolbarToggleEvent>()
            .add_event::<ToolStateChanged>()
            .add_systems(Startup, register_calibrate_basis_tool);
    }
}

fn register_calibrate_basis_tool(mut tool_manager: ResMut<ToolManager>) {
    tool_manager.register_tool(ToolRegistration {
        name: CALIBRATE_BASIS_TOOL_NAME,
        tool_type: ToolType::CalibrateBasis,
        priority: CALIBRATE_BASIS_TOOL_PRIORITY,
    });
}

/// Turn toolbar toggles into explicit activate / clear events.
pub fn handle_toolbar_toggle_events(
    mut toggles: EventReader<ToolbarToggleEvent>,
    tool_manager: Res<ToolManager>,
    mut selections: EventWriter<ToolSelectionEvent>,
    mut clears: EventWriter<ClearToolEvent>,
) {
    // Several toggles in one frame resolve against the state they would leave behind.
    let mut active = tool_manager.active_tool();
    for toggle in toggles.read() {
        if active == Some(toggle.tool_type) {
            clears.write(ClearToolEvent {
                source: toggle.source,
            });
            active = None;
        } else {
            selections.write(ToolSelectionEvent {
                tool_type: toggle.tool_type,
                source: toggle.source,
            });
            active = Some(toggle.tool_type);
        }
    }
}

/// System handling tool selection events with proper state coordination.
pub fn handle_tool_selection_events(
    mut events: EventReader<ToolSelectionEvent>,
    mut tool_manager: ResMut<ToolManager>,
    mut collector: ResMut<PointCollector>,
    mut markers: ResMut<MarkerQueue>,
    mut state_changes: EventWriter<ToolStateChanged>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    for event in events.read() {
        if !tool_manager.activate_tool(event.tool_type) {
            continue; // Tool already active or unknown.
        }

        match event.tool_type {
            ToolType::CalibrateBasis => {
                // Markers from a previous calibration go away with a new attempt.
                markers.clear_markers();
                collector.activate();
                info!("Calibrate basis tool activated via {:?}", event.source);
            }
        }

        state_changes.write(ToolStateChanged {
            tool_type: event.tool_type,
            active: true,
        });
        rpc_interface.send_notification(
            "tool_state_changed",
            serde_json::json!({
                "tool": event.tool_type.to_string(),
                "active": true
            }),
        );
    }
}

/// System handling explicit deactivation.
pub fn handle_clear_tool_events(
    mut events: EventReader<ClearToolEvent>,
    mut tool_manager: ResMut<ToolManager>,
    mut collector: ResMut<PointCollector>,
    mut markers: ResMut<MarkerQueue>,
    mut state_changes: EventWriter<ToolStateChanged>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    for event in events.read() {
        let Some(previous) = tool_manager.deactivate_current_tool() else {
            continue;
        };

        match previous {
            ToolType::CalibrateBasis => {
                collector.deactivate();
                markers.clear_markers();
            }
        }
        debug!("Tool cleared via {:?}", event.source);

        state_changes.write(ToolStateChanged {
            tool_type: previous,
            active: false,
        });
        rpc_interface.send_notification(
            "tool_state_changed",
            serde_json::json!({
                "tool": previous.to_string(),
                "active": false
            }),
        );
    }
}

/// A solved basis leaves the collector idle; mirror that in the manager so
/// the toolbar and frontend stop showing the tool as active.
pub fn deactivate_tool_after_solve(
    mut solved: EventReader<BasisCalibratedEvent>,
    mut tool_manager: ResMut<ToolManager>,
    mut state_changes: EventWriter<ToolStateChanged>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    if solved.read().count() == 0 {
        return;
    }
    if !tool_manager.is_tool_active(ToolType::CalibrateBasis) {
        return;
    }

    tool_manager.deactivate_current_tool();
    state_changes.write(ToolStateChanged {
        tool_type: ToolType::CalibrateBasis,
        active: false,
    });
    rpc_interface.send_notification(
        "tool_state_changed",
        serde_json::json!({
            "tool": ToolType::CalibrateBasis.to_string(),
            "active": false
        }),
    );
}

/// System handling keyboard shortcuts for tool selection (native builds only).
#[cfg(not(target_arch = "wasm32"))]
pub fn handle_tool_keyboard_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    settings: Res<crate::settings::CalibrationSettings>,
    mut toggles: EventWriter<ToolbarToggleEvent>,
) {
    if settings.shortcuts_enabled && keyboard.just_pressed(KeyCode::KeyC) {
        toggles.write(ToolbarToggleEvent {
            tool_type: ToolType::CalibrateBasis,
            source: ToolSelectionSource::Keyboard,
        });
    }
}

/// Placeholder system for WASM builds where keyboard shortcuts are disabled.
#[cfg(target_arch = "wasm32")]
pub fn handle_tool_keyboard_shortcuts() {
    // No keyboard shortcuts in WASM builds - tools controlled via RPC only.
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calibrate_registration() -> ToolRegistration {
        ToolRegistration {
            name: CALIBRATE_BASIS_TOOL_NAME,
            tool_type: ToolType::CalibrateBasis,
            priority: CALIBRATE_BASIS_TOOL_PRIORITY,
        }
    }

    #[test]
    fn tool_names_round_trip_through_rpc_strings() {
        assert_eq!(ToolType::from_string("Calibrate_Basis"), Some(ToolType::CalibrateBasis));
        assert_eq!(ToolType::from_string("measure"), None);
        assert_eq!(
            serde_json::to_value(ToolType::CalibrateBasis).unwrap(),
            serde_json::json!(ToolType::CalibrateBasis.to_string())
        );
    }

    #[test]
    fn unregistered_tool_cannot_activate() {
        let mut manager = ToolManager::default();
        assert!(!manager.activate_tool(ToolType::CalibrateBasis));
        assert_eq!(manager.active_tool(), None);
    }

    #[test]
    fn activation_is_reported_once() {
        let mut manager = ToolManager::default();
        manager.register_tool(calibrate_registration());

        assert!(manager.activate_tool(ToolType::CalibrateBasis));
        assert!(!manager.activate_tool(ToolType::CalibrateBasis));
        assert!(manager.is_tool_active(ToolType::CalibrateBasis));
        assert_eq!(manager.priority_of(ToolType::CalibrateBasis), Some(13));

        assert_eq!(manager.deactivate_current_tool(), Some(ToolType::CalibrateBasis));
        assert_eq!(manager.deactivate_current_tool(), None);
    }

    #[test]
    fn registered_tools_are_ordered_by_priority() {
        let mut manager = ToolManager::default();
        manager.register_tool(ToolRegistration {
            name: "calibratebasis-tool-legacy",
            priority: 2,
            ..calibrate_registration()
        });
        manager.register_tool(calibrate_registration());

        let names: Vec<&str> = manager.registered_tools().iter().map(|r| r.name).collect();
        assert_eq!(names, vec![CALIBRATE_BASIS_TOOL_NAME, "calibratebasis-tool-legacy"]);
    }

    #[test]
    fn re_registering_replaces_and_deregistering_deactivates() {
        let mut manager = ToolManager::default();
        manager.register_tool(calibrate_registration());
        manager.register_tool(ToolRegistration {
            priority: 20,
            ..calibrate_registration()
        });
        assert_eq!(manager.registered_tools().len(), 1);
        assert_eq!(manager.priority_of(ToolType::CalibrateBasis), Some(20));

        manager.activate_tool(ToolType::CalibrateBasis);
        let removed = manager.deregister_tool(CALIBRATE_BASIS_TOOL_NAME);
        assert_eq!(removed.map(|r| r.priority), Some(20));
        assert_eq!(manager.active_tool(), None);
        assert!(manager.deregister_tool(CALIBRATE_BASIS_TOOL_NAME).is_none());
    }
}
