use crate::tools::measure::session::ViewerSession;
use crate::tools::tool_manager::{
    CancelMeasurementEvent, ClearMeasurementsEvent, ModeCommand, ModeCommandEvent,
    ModeSelectionSource,
};
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

/// JSON-RPC 2.0 error object.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

/// Session change requested by an RPC call, applied through the mode controller events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcAction {
    SetMode(ModeCommand),
    Cancel,
    ClearCompleted,
}

/// Resource managing bidirectional RPC communication between React and Bevy.
/// Handles both request-response patterns and notification broadcasting.
#[derive(Resource, Default)]
pub struct WebRpcInterface {
    outgoing_notifications: Vec<RpcNotification>,
    outgoing_responses: Vec<RpcResponse>,
}

impl WebRpcInterface {
    /// Send notification to React frontend without expecting response.
    pub fn send_notification(&mut self, method: &str, params: serde_json::Value) {
        self.outgoing_notifications.push(RpcNotification {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
        });
    }

    /// Queue response for transmission to React frontend.
    fn queue_response(&mut self, response: RpcResponse) {
        self.outgoing_responses.push(response);
    }

    #[cfg(test)]
    pub fn notifications(&self) -> &[RpcNotification] {
        &self.outgoing_notifications
    }
}

/// Plugin establishing WebRPC communication layer for iframe-based deployment.
pub struct WebRpcPlugin;

impl Plugin for WebRpcPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WebRpcInterface>()
            .add_event::<IncomingRpcMessage>()
            .add_systems(
                Update,
                (
                    process_incoming_messages,
                    handle_rpc_messages,
                    send_outgoing_messages,
                )
                    .chain(),
            );

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

    if let Some(window) = window() {
        if let Err(e) =
            window.add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
        {
            error!("Failed to register message listener: {:?}", e);
        }
    }

    // Prevent closure from being dropped by transferring ownership to JS.
    closure.forget();
    commands.insert_resource(MessageQueue(message_queue));
}

/// Resource wrapping thread-safe message queue for WASM event handling.
#[derive(Resource)]
struct MessageQueue(std::sync::Arc<std::sync::Mutex<Vec<String>>>);

/// Event representing incoming RPC message from React frontend.
#[derive(Event)]
struct IncomingRpcMessage {
    content: String,
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

fn handle_rpc_messages(
    mut events: EventReader<IncomingRpcMessage>,
    session: Res<ViewerSession>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut mode_events: EventWriter<ModeCommandEvent>,
    mut cancel_events: EventWriter<CancelMeasurementEvent>,
    mut clear_events: EventWriter<ClearMeasurementsEvent>,
) {
    let mut actions = Vec::new();

    for event in events.read() {
        debug!("Received RPC: {}", event.content);
        if let Some(response) = process_message(&event.content, &session, &mut actions) {
            rpc_interface.queue_response(response);
        }
    }

    for action in actions {
        let source = ModeSelectionSource::Rpc;
        match action {
            RpcAction::SetMode(command) => {
                mode_events.write(ModeCommandEvent { command, source });
            }
            RpcAction::Cancel => {
                cancel_events.write(CancelMeasurementEvent { source });
            }
            RpcAction::ClearCompleted => {
                clear_events.write(ClearMeasurementsEvent { source });
            }
        }
    }
}

/// Parse one raw message and handle it. Returns the response to send, if any.
fn process_message(
    content: &str,
    session: &ViewerSession,
    actions: &mut Vec<RpcAction>,
) -> Option<RpcResponse> {
    match serde_json::from_str::<RpcRequest>(content) {
        Ok(request) => handle_rpc_request(&request, session, actions),
        Err(parse_error) => {
            warn!("Unparseable RPC message: {}", parse_error);
            Some(create_error_response(
                None,
                RpcError::parse_error(&parse_error.to_string()),
            ))
        }
    }
}

/// Handle individual RPC request and generate response based on method.
///
/// Requests without an id are notifications: they are still applied, but get no response.
fn handle_rpc_request(
    request: &RpcRequest,
    session: &ViewerSession,
    actions: &mut Vec<RpcAction>,
) -> Option<RpcResponse> {
    let result = match request.method.as_str() {
        "set_mode" => handle_set_mode(&request.params, actions),
        "cancel_measurement" => {
            actions.push(RpcAction::Cancel);
            Ok(serde_json::json!({ "success": true }))
        }
        "clear_measurements" => {
            actions.push(RpcAction::ClearCompleted);
            Ok(serde_json::json!({
                "success": true,
                "cleared": session.completed().len()
            }))
        }
        "get_measurements" => Ok(handle_get_measurements(session)),
        _ => {
            warn!("Unknown RPC method: {}", request.method);
            Err(RpcError::method_not_found(&request.method))
        }
    };

    let id = request.id.clone()?;
    Some(match result {
        Ok(result_value) => RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: Some(result_value),
            error: None,
            id: Some(id),
        },
        Err(error) => create_error_response(Some(id), error),
    })
}

/// Handle mode selection with parameter validation.
fn handle_set_mode(
    params: &serde_json::Value,
    actions: &mut Vec<RpcAction>,
) -> Result<serde_json::Value, RpcError> {
    #[derive(serde::Deserialize)]
    struct SetModeParams {
        mode: String,
    }

    let mode_params = serde_json::from_value::<SetModeParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'mode' parameter"))?;

    let command = ModeCommand::from_string(&mode_params.mode)
        .ok_or_else(|| RpcError::invalid_params(&format!("Unknown mode: {}", mode_params.mode)))?;

    actions.push(RpcAction::SetMode(command));
    info!("Mode selection dispatched: {:?}", command);

    Ok(serde_json::json!({
        "success": true,
        "mode": command.as_str()
    }))
}

fn handle_get_measurements(session: &ViewerSession) -> serde_json::Value {
    serde_json::json!({
        "camera_mode": session.camera_mode(),
        "measurement_mode": session.measurement_mode(),
        "points_placed": session.accumulated_points().len(),
        "measurements": session.completed(),
    })
}

/// Create standardized error response.
fn create_error_response(id: Option<serde_json::Value>, error: RpcError) -> RpcResponse {
    RpcResponse {
        jsonrpc: "2.0".to_string(),
        result: None,
        error: Some(error),
        id,
    }
}

/// Send queued notifications and responses to React frontend.
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

/// Send serialized message to parent window (React frontend).
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
        // No-op for non-WASM targets.
        let _ = message;
    }
}

/// Standard RPC error codes and constructors.
impl RpcError {
    pub fn parse_error(message: &str) -> Self {
        Self {
            code: -32700,
            message: "Parse error".to_string(),
            data: Some(serde_json::json!({ "detail": message })),
        }
    }

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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(method: &str, params: serde_json::Value, id: Option<i64>) -> RpcRequest {
        RpcRequest {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
            id: id.map(|id| json!(id)),
        }
    }

    #[test]
    fn set_mode_queues_command() {
        let session = ViewerSession::default();
        let mut actions = Vec::new();
        let response = handle_rpc_request(
            &request("set_mode", json!({ "mode": "area" }), Some(7)),
            &session,
            &mut actions,
        )
        .unwrap();

        assert_eq!(actions, vec![RpcAction::SetMode(ModeCommand::MeasureArea)]);
        assert_eq!(response.id, Some(json!(7)));
        assert!(response.error.is_none());
        assert_eq!(response.result.unwrap()["mode"], "area");
    }

    #[test]
    fn set_mode_rejects_bad_params() {
        let session = ViewerSession::default();
        let mut actions = Vec::new();

        for params in [json!({}), json!({ "mode": "knife" }), json!(null)] {
            let response =
                handle_rpc_request(&request("set_mode", params, Some(1)), &session, &mut actions)
                    .unwrap();
            assert_eq!(response.error.unwrap().code, -32602);
        }
        assert!(actions.is_empty());
    }

    #[test]
    fn unknown_method_is_reported() {
        let session = ViewerSession::default();
        let mut actions = Vec::new();
        let response =
            handle_rpc_request(&request("get_fps", json!({}), Some(2)), &session, &mut actions)
                .unwrap();

        let error = response.error.unwrap();
        assert_eq!(error.code, -32601);
        assert_eq!(error.data, Some(json!({ "method": "get_fps" })));
    }

    #[test]
    fn notifications_apply_without_response() {
        let session = ViewerSession::default();
        let mut actions = Vec::new();

        assert!(
            handle_rpc_request(&request("cancel_measurement", json!({}), None), &session, &mut actions)
                .is_none()
        );
        assert!(
            handle_rpc_request(&request("clear_measurements", json!({}), None), &session, &mut actions)
                .is_none()
        );
        assert_eq!(actions, vec![RpcAction::Cancel, RpcAction::ClearCompleted]);
    }

    #[test]
    fn get_measurements_reports_session() {
        let session = ViewerSession::default();
        let mut actions = Vec::new();
        let response = handle_rpc_request(
            &request("get_measurements", json!({}), Some(3)),
            &session,
            &mut actions,
        )
        .unwrap();

        let result = response.result.unwrap();
        assert_eq!(result["camera_mode"], "orbit");
        assert_eq!(result["measurement_mode"], "none");
        assert_eq!(result["measurements"], json!([]));
        assert!(actions.is_empty());
    }

    #[test]
    fn raw_message_round_trip() {
        let session = ViewerSession::default();
        let mut actions = Vec::new();

        let response = process_message(
            r#"{"jsonrpc":"2.0","method":"set_mode","params":{"mode":"distance"},"id":"a"}"#,
            &session,
            &mut actions,
        )
        .unwrap();
        assert_eq!(response.id, Some(json!("a")));
        assert_eq!(actions, vec![RpcAction::SetMode(ModeCommand::MeasureDistance)]);

        let response = process_message(r#"{"jsonrpc":"2.0","method":"cancel_measurement"}"#, &session, &mut actions);
        assert!(response.is_none());

        let response = process_message("jsonrpc but not json", &session, &mut actions).unwrap();
        assert_eq!(response.error.unwrap().code, -32700);
        assert_eq!(response.id, None);
    }

    #[test]
    fn notifications_are_queued_in_order() {
        let mut interface = WebRpcInterface::default();
        interface.send_notification("mode_changed", json!({ "mode": "pan" }));
        interface.send_notification("measurement_cancelled", json!({}));

        let methods: Vec<&str> = interface
            .notifications()
            .iter()
            .map(|n| n.method.as_str())
            .collect();
        assert_eq!(methods, vec!["mode_changed", "measurement_cancelled"]);
    }
}
