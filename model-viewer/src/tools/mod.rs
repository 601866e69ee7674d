//! Interactive measurement tools and the mode controller.
//!
//! ## Mode Controller
//!
//! A single mode is active at a time: one of the camera modes (orbit, pan,
//! zoom), which decide what a left-drag does, or one of the measurement modes
//! (distance, angle, area), which turn left-clicks into committed points.
//!
//! ### Mode Selection Flow
//!
//! ```text
//! Keyboard/RPC Input
//!   └─> ModeCommandEvent / CancelMeasurementEvent / ClearMeasurementsEvent
//!       └─> handle_*_events()
//!           ├─> ViewerSession transition (discards points in progress)
//!           └─> Send RPC notification to frontend
//! ```
//!
//! ## Measurements
//!
//! - **Distance**: two clicks, label at the midpoint in centimetres.
//! - **Angle**: vertex first, then one point on each arm; label at the vertex in degrees.
//! - **Area**: click vertices, close by clicking near the first one; the area is
//!   projected on the ground (X-Z) plane and labelled at the centroid in cm².
//!
//! Completed measurements stay in the scene until cleared (`Delete` key on
//! native, `clear_measurements` RPC). `Escape` abandons the measurement in
//! progress on every target.
//!
//! ## Cross-Platform Considerations
//!
//! - **Native**: `O`/`P`/`Z` camera modes, `D`/`A`/`R` measurement modes.
//! - **WASM**: modes are selected by the React frontend over JSON-RPC 2.0.

/// Pure geometry helpers for distances, angles and X-Z polygons.
pub mod geometry;

/// Measurement session, pointer glue and annotation contracts.
pub mod measure;

/// Mode commands, selection events and keyboard shortcuts.
pub mod tool_manager;
