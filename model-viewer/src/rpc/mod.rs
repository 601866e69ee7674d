//! JSON-RPC 2.0 communication layer for the UI chrome around the viewer.
//!
//! The viewer runs inside an iframe; the surrounding page owns the mode
//! buttons and measurement list and talks to Bevy via `postMessage`.
//!
//! ## Message Flow
//!
//! ```text
//! Page (Parent Window)   <──postMessage──>  Bevy (iframe)
//!        │                                        │
//!        ├─ Request (with ID) ──────────────────> │
//!        │                                        ├─ Process request
//!        │ <───────────────── Response (with ID) ─┤
//!        │                                        │
//!        │ <────────── Notification (no ID) ─────┤
//! ```
//!
//! Requests sent without an ID are applied but not answered.
//!
//! ## Methods
//!
//! - `set_mode { mode }`: `orbit`, `pan`, `zoom`, `distance`, `angle` or `area`
//! - `cancel_measurement`: abandon the measurement in progress
//! - `clear_measurements`: remove every completed measurement
//! - `get_measurements`: current modes, points placed and completed measurements
//!
//! ```typescript
//! iframe.contentWindow.postMessage(JSON.stringify({
//!   jsonrpc: "2.0",
//!   method: "set_mode",
//!   params: { mode: "area" },
//!   id: 1
//! }), "*");
//! ```
//!
//! ## Notifications
//!
//! - `mode_changed`: `{ mode, camera_mode, measurement_mode }`
//! - `measurement_completed`: `{ measurement: { id, kind, value, label, anchor, points } }`
//! - `measurement_cancelled`: `{ camera_mode, measurement_mode }`
//! - `measurements_cleared`: `{ cleared }`
//! - `model_load_failed`: `{ path, error }`
//!
//! ## Error Handling
//!
//! Standard JSON-RPC 2.0 error codes:
//! - `-32700`: Parse error
//! - `-32601`: Method not found
//! - `-32602`: Invalid params

/// JSON-RPC 2.0 bidirectional communication system for the page hosting the viewer.
///
/// Handles request-response patterns, notifications, and WASM message listeners.
pub mod web_rpc;
