use crate::error::CalibrationError;
use crate::tools::calibrate_basis::{CalibrationResult, ToolKeyUpEvent};
use crate::tools::tool_manager::{
    ClearToolEvent, ToolSelectionEvent, ToolSelectionSource, ToolType, ToolbarToggleEvent,
};
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsValue;

#[cfg(target_arch = "wasm32")]
use web_sys::{MessageEvent, window};

/// JSON-RPC 2.0 request structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub result: Option<serde_json::Value>,
    pub error: Option<RpcError>,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 notification structure for one-way communication.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcNotification {
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
}

/// JSON-RPC error structure following specification.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

/// Resource managing bidirectional RPC communication with the frontend.
/// Handles both request-response patterns and notification broadcasting.
#[derive(Resource, Default)]
pub struct WebRpcInterface {
    outgoing_notifications: Vec<RpcNotification>,
    outgoing_responses: Vec<RpcResponse>,
}

impl WebRpcInterface {
    /// Send notification to frontend without expecting response.
    pub fn send_notification(&mut self, method: &str, params: serde_json::Value) {
        self.outgoing_notifications.push(RpcNotification {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
        });
    }

    /// Notifications queued since the last flush.
    pub fn pending_notifications(&self) -> &[RpcNotification] {
        &self.outgoing_notifications
    }

    /// Responses queued since the last flush.
    pub fn pending_responses(&self) -> &[RpcResponse] {
        &self.outgoing_responses
    }

    /// Queue response for transmission to frontend.
    fn queue_response(&mut self, response: RpcResponse) {
        self.outgoing_responses.push(response);
    }
}

/// Ordered groups of the RPC pipeline so hosts can observe queued messages
/// before they are flushed.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum RpcSet {
    Receive,
    Send,
}

/// Plugin establishing WebRPC communication layer for iframe-based deployment.
pub struct WebRpcPlugin;

impl Plugin for WebRpcPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WebRpcInterface>()
            .add_event::<IncomingRpcMessage>()
            .add_systems(
                Update,
                (process_incoming_messages, handle_rpc_messages)
                    .chain()
                    .in_set(RpcSet::Receive),
            )
            .add_systems(PostUpdate, send_outgoing_messages.in_set(RpcSet::Send));

        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, setup_message_listener);
    }
}

#[cfg(target_arch = "wasm32")]
fn setup_message_listener(mut commands: Commands) {
    use std::sync::Arc;
    use std::sync::Mutex;

    // Thread-safe message queue for cross-thread communication.
    let message_queue: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let queue_clone = message_queue.clone();

    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        // Filter messages to ensure they contain string data.
        if let Ok(data) = event.data().dyn_into::<js_sys::JsString>() {
            let message_str: String = data.into();

            if message_str.contains("jsonrpc") {
                if let Ok(mut queue) = queue_clone.lock() {
                    queue.push(message_str);
                }
            }
        }
    }) as Box<dyn FnMut(MessageEvent)>);

    let Some(window) = window() else {
        error!("Window object not available, RPC listener not installed");
        return;
    };
    if let Err(e) =
        window.add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
    {
        error!("Failed to register message listener: {:?}", e);
        return;
    }

    // Prevent closure from being dropped by transferring ownership to JS.
    closure.forget();
    commands.insert_resource(MessageQueue(message_queue));
}

/// Resource wrapping thread-safe message queue for WASM event handling.
#[derive(Resource)]
struct MessageQueue(std::sync::Arc<std::sync::Mutex<Vec<String>>>);

/// Raw RPC message from the frontend. Native hosts and tests write these
/// directly.
#[derive(Event, Debug, Clone)]
pub struct IncomingRpcMessage {
    pub content: String,
}

fn process_incoming_messages(
    message_queue: Option<Res<MessageQueue>>,
    mut message_events: EventWriter<IncomingRpcMessage>,
) {
    let Some(queue_res) = message_queue else {
        return;
    };

    let messages = if let Ok(mut queue) = queue_res.0.lock() {
        std::mem::take(&mut *queue)
    } else {
        Vec::new()
    };

    for message_str in messages {
        message_events.write(IncomingRpcMessage {
            content: message_str,
        });
    }
}

/// Tool commands an RPC request can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcCommand {
    SelectTool(ToolType),
    ClearTool,
    ToggleTool(ToolType),
    KeyUp(u32),
}

/// Event writers the RPC layer dispatches commands into.
#[derive(SystemParam)]
pub struct RpcCommandWriters<'w> {
    tool_selection: EventWriter<'w, ToolSelectionEvent>,
    clear_tool: EventWriter<'w, ClearToolEvent>,
    toggle_tool: EventWriter<'w, ToolbarToggleEvent>,
    key_up: EventWriter<'w, ToolKeyUpEvent>,
}

impl RpcCommandWriters<'_> {
    fn dispatch(&mut self, command: RpcCommand) {
        let source = ToolSelectionSource::Rpc;
        match command {
            RpcCommand::SelectTool(tool_type) => {
                self.tool_selection.write(ToolSelectionEvent { tool_type, source });
            }
            RpcCommand::ClearTool => {
                self.clear_tool.write(ClearToolEvent { source });
            }
            RpcCommand::ToggleTool(tool_type) => {
                self.toggle_tool.write(ToolbarToggleEvent { tool_type, source });
            }
            RpcCommand::KeyUp(key_code) => {
                self.key_up.write(ToolKeyUpEvent { key_code });
            }
        }
    }
}

fn handle_rpc_messages(
    mut events: EventReader<IncomingRpcMessage>,
    calibration: Res<CalibrationResult>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut writers: RpcCommandWriters,
) {
    for event in events.read() {
        match serde_json::from_str::<RpcRequest>(&event.content) {
            Ok(request) => {
                debug!("Processing RPC method: {}", request.method);
                let (response, command) = handle_rpc_request(&request, &calibration);
                if let Some(command) = command {
                    writers.dispatch(command);
                }
                if let Some(response) = response {
                    rpc_interface.queue_response(response);
                }
            }
            Err(parse_error) => {
                warn!("RPC parse error: {}", parse_error);
                rpc_interface.queue_response(create_error_response(
                    serde_json::Value::Null,
                    -32600,
                    "Invalid request",
                    Some(serde_json::json!({ "detail": parse_error.to_string() })),
                ));
            }
        }
    }
}

/// Handle individual RPC request: decode it into a command and, for requests
/// carrying an ID, build the response.
pub fn handle_rpc_request(
    request: &RpcRequest,
    calibration: &CalibrationResult,
) -> (Option<RpcResponse>, Option<RpcCommand>) {
    let outcome = match request.method.as_str() {
        "get_calibration" => Ok((handle_get_calibration(calibration), None)),
        method => match parse_command(method, &request.params) {
            Ok(Some(command)) => Ok((command_result(command), Some(command))),
            Ok(None) => {
                warn!("Unknown RPC method: {}", method);
                Err(RpcError::method_not_found(method))
            }
            Err(error) => Err(error),
        },
    };

    let (result, command) = match outcome {
        Ok((value, command)) => (Ok(value), command),
        Err(error) => (Err(error), None),
    };

    // Only generate responses for requests with IDs (notifications have no ID).
    let response = request.id.clone().map(|id| match result {
        Ok(result_value) => RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: Some(result_value),
            error: None,
            id: Some(id),
        },
        Err(error) => RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(error),
            id: Some(id),
        },
    });

    (response, command)
}

/// Decode a command method. `Ok(None)` means the method is not a command.
fn parse_command(
    method: &str,
    params: &serde_json::Value,
) -> Result<Option<RpcCommand>, RpcError> {
    #[derive(Deserialize)]
    struct ToolParams {
        tool: String,
    }

    #[derive(Deserialize)]
    struct KeyUpParams {
        key_code: u32,
    }

    let decode_tool = |params: &serde_json::Value| -> Result<ToolType, CalibrationError> {
        let parsed = serde_json::from_value::<ToolParams>(params.clone()).map_err(|source| {
            CalibrationError::InvalidParams {
                method: method.to_string(),
                source,
            }
        })?;
        ToolType::from_string(&parsed.tool).ok_or(CalibrationError::UnknownTool(parsed.tool))
    };

    let command = match method {
        "tool_selection" => RpcCommand::SelectTool(decode_tool(params)?),
        "toggle_tool" => RpcCommand::ToggleTool(decode_tool(params)?),
        "clear_tool" => RpcCommand::ClearTool,
        "key_up" => {
            let parsed = serde_json::from_value::<KeyUpParams>(params.clone()).map_err(|source| {
                CalibrationError::InvalidParams {
                    method: method.to_string(),
                    source,
                }
            })?;
            RpcCommand::KeyUp(parsed.key_code)
        }
        _ => return Ok(None),
    };
    Ok(Some(command))
}

fn command_result(command: RpcCommand) -> serde_json::Value {
    match command {
        RpcCommand::SelectTool(tool) | RpcCommand::ToggleTool(tool) => serde_json::json!({
            "success": true,
            "tool": tool.to_string()
        }),
        RpcCommand::ClearTool => serde_json::json!({ "success": true }),
        RpcCommand::KeyUp(key_code) => serde_json::json!({
            "success": true,
            "key_code": key_code
        }),
    }
}

fn handle_get_calibration(calibration: &CalibrationResult) -> serde_json::Value {
    serde_json::json!({
        "basis": calibration.latest.map(|basis| basis.record())
    })
}

/// Create standardized error response with optional data payload.
fn create_error_response(
    id: serde_json::Value,
    code: i32,
    message: &str,
    data: Option<serde_json::Value>,
) -> RpcResponse {
    RpcResponse {
        jsonrpc: "2.0".to_string(),
        result: None,
        error: Some(RpcError {
            code,
            message: message.to_string(),
            data,
        }),
        id: Some(id),
    }
}

/// Send queued notifications and responses to the frontend.
fn send_outgoing_messages(mut rpc_interface: ResMut<WebRpcInterface>) {
    // Send notifications first.
    for notification in rpc_interface.outgoing_notifications.drain(..) {
        send_message_to_parent(&notification);
    }

    // Send responses second to maintain order.
    for response in rpc_interface.outgoing_responses.drain(..) {
        send_message_to_parent(&response);
    }
}

/// Send serialized message to parent window.
fn send_message_to_parent<T: Serialize>(message: &T) {
    #[cfg(target_arch = "wasm32")]
    {
        match serde_json::to_string(message) {
            Ok(json) => {
                if let Some(window) = window() {
                    if let Some(parent) = window.parent().ok().flatten() {
                        if let Err(e) = parent.post_message(&JsValue::from_str(&json), "*") {
                            error!("Failed to send message to parent: {:?}", e);
                        }
                    } else {
                        warn!("No parent window available for message transmission");
                    }
                } else {
                    error!("Window object not available");
                }
            }
            Err(e) => {
                error!("Failed to serialize message: {}", e);
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        match serde_json::to_string(message) {
            Ok(json) => debug!("RPC out: {}", json),
            Err(e) => error!("Failed to serialize message: {}", e),
        }
    }
}

/// Standard RPC error codes and constructors.
impl RpcError {
    pub fn method_not_found(method: &str) -> Self {
        Self {
            code: -32601,
            message: "Method not found".to_string(),
            data: Some(serde_json::json!({ "method": method })),
        }
    }

    pub fn invalid_params(message: &str) -> Self {
        Self {
            code: -32602,
            message: message.to_string(),
            data: None,
        }
    }
}

impl From<CalibrationError> for RpcError {
    fn from(err: CalibrationError) -> Self {
        RpcError::invalid_params(&err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basis::solve_basis;
    use bevy::math::DVec3;

    fn request(method: &str, params: serde_json::Value, id: Option<i64>) -> RpcRequest {
        RpcRequest {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
            id: id.map(serde_json::Value::from),
        }
    }

    #[test]
    fn tool_selection_becomes_command_and_response() {
        let req = request("tool_selection", serde_json::json!({ "tool": "calibrate_basis" }), Some(1));
        let (response, command) = handle_rpc_request(&req, &CalibrationResult::default());

        assert_eq!(command, Some(RpcCommand::SelectTool(ToolType::CalibrateBasis)));
        let response = response.unwrap();
        assert_eq!(response.result.unwrap()["tool"], "calibrate_basis");
        assert!(response.error.is_none());
    }

    #[test]
    fn notifications_dispatch_without_response() {
        let req = request("key_up", serde_json::json!({ "key_code": 27 }), None);
        let (response, command) = handle_rpc_request(&req, &CalibrationResult::default());
        assert!(response.is_none());
        assert_eq!(command, Some(RpcCommand::KeyUp(27)));
    }

    #[test]
    fn unknown_tool_is_invalid_params() {
        let req = request("tool_selection", serde_json::json!({ "tool": "lasso" }), Some(2));
        let (response, command) = handle_rpc_request(&req, &CalibrationResult::default());

        assert!(command.is_none());
        let error = response.unwrap().error.unwrap();
        assert_eq!(error.code, -32602);
        assert!(error.message.contains("lasso"));
    }

    #[test]
    fn missing_params_are_invalid_params() {
        let req = request("key_up", serde_json::json!({}), Some(3));
        let (response, command) = handle_rpc_request(&req, &CalibrationResult::default());
        assert!(command.is_none());
        assert_eq!(response.unwrap().error.unwrap().code, -32602);
    }

    #[test]
    fn unknown_method_is_reported() {
        let req = request("get_fps", serde_json::Value::Null, Some(4));
        let (response, command) = handle_rpc_request(&req, &CalibrationResult::default());
        assert!(command.is_none());
        assert_eq!(response.unwrap().error, Some(RpcError::method_not_found("get_fps")));
    }

    #[test]
    fn get_calibration_returns_latest_basis() {
        let empty = request("get_calibration", serde_json::Value::Null, Some(5));
        let (response, _) = handle_rpc_request(&empty, &CalibrationResult::default());
        assert!(response.unwrap().result.unwrap()["basis"].is_null());

        let calibration = CalibrationResult {
            latest: Some(solve_basis(&[DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::Z])),
        };
        let (response, command) = handle_rpc_request(&empty, &calibration);
        assert!(command.is_none());
        let basis = &response.unwrap().result.unwrap()["basis"];
        assert_eq!(basis["oblique_sum"], serde_json::json!([1.0, 1.0, 1.0]));
    }

    #[test]
    fn request_without_params_parses() {
        let parsed: RpcRequest =
            serde_json::from_str(r#"{"jsonrpc":"2.0","method":"clear_tool","id":7}"#).unwrap();
        let (response, command) = handle_rpc_request(&parsed, &CalibrationResult::default());
        assert_eq!(command, Some(RpcCommand::ClearTool));
        assert_eq!(response.unwrap().result.unwrap()["success"], true);
    }
}
