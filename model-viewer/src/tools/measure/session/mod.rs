//! Measurement interaction state machine.
//!
//! `ViewerSession` turns pointer events into committed world points, drives the
//! annotation renderer and produces finished measurements. All transitions go
//! through [`ViewerSession::handle`]:
//!
//! ```text
//! Idle ──SetMode(measure)──> AwaitingPoints(kind, [])
//!   AwaitingPoints ──PointerClick(hit)──> AwaitingPoints(kind, [.., hit])
//!   AwaitingPoints ──PointerClick(last point)──> emit CompletedMeasurement, AwaitingPoints(kind, [])
//!   AwaitingPoints ──PointerMove(hit)──> redraw live feedback, unchanged
//!   any ──SetMode(camera)──> Idle
//!   any ──Cancel──> Idle
//! ```
//!
//! A pick miss never changes state.

use super::annotation::{AnnotationLayer, AnnotationRenderer, LineStyle, MarkerStyle};
use super::pick::PickService;
use super::units::MeasurementUnits;
use crate::tools::geometry;
use crate::tools::tool_manager::{CameraMode, ModeCommand};
use bevy::prelude::*;
use constants::measurement::{MIN_POLYGON_VERTICES, POLYGON_CLOSE_THRESHOLD};
use serde::{Deserialize, Serialize};
use std::mem;

/// Active measurement mode as seen by UI chrome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementMode {
    #[default]
    None,
    Distance,
    Angle,
    Area,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementKind {
    Distance,
    Angle,
    Area,
}

impl MeasurementKind {
    pub fn mode(self) -> MeasurementMode {
        match self {
            Self::Distance => MeasurementMode::Distance,
            Self::Angle => MeasurementMode::Angle,
            Self::Area => MeasurementMode::Area,
        }
    }
}

/// Committed points of the measurement in progress.
///
/// Distance completes at 2 points, angle at 3 (the first is the vertex), area
/// grows until the polygon is closed on its first point.
#[derive(Debug, Clone, PartialEq)]
pub enum Accumulator {
    Distance(Vec<Vec3>),
    Angle(Vec<Vec3>),
    Area(Vec<Vec3>),
}

impl Accumulator {
    fn empty(kind: MeasurementKind) -> Self {
        match kind {
            MeasurementKind::Distance => Self::Distance(Vec::with_capacity(2)),
            MeasurementKind::Angle => Self::Angle(Vec::with_capacity(3)),
            MeasurementKind::Area => Self::Area(Vec::new()),
        }
    }

    pub fn kind(&self) -> MeasurementKind {
        match self {
            Self::Distance(_) => MeasurementKind::Distance,
            Self::Angle(_) => MeasurementKind::Angle,
            Self::Area(_) => MeasurementKind::Area,
        }
    }

    pub fn points(&self) -> &[Vec3] {
        match self {
            Self::Distance(points) | Self::Angle(points) | Self::Area(points) => points,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    AwaitingPoints(Accumulator),
}

/// A finished measurement, as drawn in the scene and reported to UI chrome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletedMeasurement {
    pub id: u32,
    pub kind: MeasurementKind,
    /// Value in display units (centimetres, degrees or square centimetres by default).
    pub value: f32,
    pub label: String,
    /// Label position: segment midpoint, angle vertex or polygon centroid.
    pub anchor: Vec3,
    pub points: Vec<Vec3>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionEvent {
    SetMode(ModeCommand),
    PointerMove(Vec2),
    PointerClick(Vec2),
    Cancel,
    ClearCompleted,
}

/// Geometry of a measurement before it is given an id.
struct Evaluation {
    value: f32,
    label: String,
    anchor: Vec3,
    outline: Vec<Vec3>,
}

/// Owns every piece of mutable measurement state.
#[derive(Resource, Debug)]
pub struct ViewerSession {
    camera_mode: CameraMode,
    state: SessionState,
    completed: Vec<CompletedMeasurement>,
    next_id: u32,
    units: MeasurementUnits,
    close_threshold: f32,
}

impl Default for ViewerSession {
    fn default() -> Self {
        Self {
            camera_mode: CameraMode::default(),
            state: SessionState::Idle,
            completed: Vec::new(),
            next_id: 0,
            units: MeasurementUnits::default(),
            close_threshold: POLYGON_CLOSE_THRESHOLD,
        }
    }
}

impl ViewerSession {
    pub fn with_settings(units: MeasurementUnits, close_threshold: f32) -> Self {
        Self {
            units,
            close_threshold,
            ..Default::default()
        }
    }

    /// Replace unit conversion and closing threshold. Only affects measurements completed afterwards.
    pub fn apply_settings(&mut self, units: MeasurementUnits, close_threshold: f32) {
        self.units = units;
        self.close_threshold = close_threshold;
    }

    pub fn camera_mode(&self) -> CameraMode {
        self.camera_mode
    }

    pub fn measurement_mode(&self) -> MeasurementMode {
        match &self.state {
            SessionState::Idle => MeasurementMode::None,
            SessionState::AwaitingPoints(accumulator) => accumulator.kind().mode(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn accumulated_points(&self) -> &[Vec3] {
        match &self.state {
            SessionState::Idle => &[],
            SessionState::AwaitingPoints(accumulator) => accumulator.points(),
        }
    }

    /// First vertex of the polygon being drawn, the point that closes it.
    pub fn polygon_anchor(&self) -> Option<Vec3> {
        match &self.state {
            SessionState::AwaitingPoints(Accumulator::Area(points)) => points.first().copied(),
            _ => None,
        }
    }

    pub fn completed(&self) -> &[CompletedMeasurement] {
        &self.completed
    }

    pub fn units(&self) -> &MeasurementUnits {
        &self.units
    }

    pub fn close_threshold(&self) -> f32 {
        self.close_threshold
    }

    /// Single entry point for every session transition.
    pub fn handle(
        &mut self,
        event: SessionEvent,
        picker: &mut impl PickService,
        renderer: &mut impl AnnotationRenderer,
    ) -> Option<CompletedMeasurement> {
        match event {
            SessionEvent::SetMode(command) => {
                self.set_mode(command, renderer);
                None
            }
            SessionEvent::PointerMove(screen) => {
                self.pointer_move(screen, picker, renderer);
                None
            }
            SessionEvent::PointerClick(screen) => self.pointer_click(screen, picker, renderer),
            SessionEvent::Cancel => {
                self.cancel(renderer);
                None
            }
            SessionEvent::ClearCompleted => {
                self.clear_completed(renderer);
                None
            }
        }
    }

    /// Camera commands leave measuring; measurement commands start a fresh accumulator.
    /// Re-selecting the active mode only discards the points in progress.
    pub fn set_mode(&mut self, command: ModeCommand, renderer: &mut impl AnnotationRenderer) {
        self.discard_in_progress(renderer);

        if let Some(camera_mode) = command.camera_mode() {
            self.camera_mode = camera_mode;
            self.state = SessionState::Idle;
        }
        if let Some(kind) = command.measurement_kind() {
            self.state = SessionState::AwaitingPoints(Accumulator::empty(kind));
        }

        debug!(
            "Mode set to {} (camera {:?}, measurement {:?})",
            command.as_str(),
            self.camera_mode,
            self.measurement_mode()
        );
    }

    /// Abandon the measurement in progress and stop measuring. Completed measurements stay.
    pub fn cancel(&mut self, renderer: &mut impl AnnotationRenderer) {
        self.discard_in_progress(renderer);
        if self.state != SessionState::Idle {
            info!("Measurement cancelled");
        }
        self.state = SessionState::Idle;
    }

    pub fn clear_completed(&mut self, renderer: &mut impl AnnotationRenderer) {
        renderer.remove_all(AnnotationLayer::Completed);
        let cleared = self.completed.len();
        self.completed.clear();
        info!("Cleared {} completed measurements", cleared);
    }

    /// Redraw the rubber-band feedback towards the surface under the pointer.
    pub fn pointer_move(
        &mut self,
        screen: Vec2,
        picker: &mut impl PickService,
        renderer: &mut impl AnnotationRenderer,
    ) {
        let SessionState::AwaitingPoints(accumulator) = &self.state else {
            return;
        };
        if accumulator.points().is_empty() {
            return;
        }
        let Some(hit) = picker.pick(screen) else {
            return;
        };

        renderer.remove_all(AnnotationLayer::Live);
        match accumulator {
            Accumulator::Distance(points) => {
                renderer.add_line(&[points[0], hit], LineStyle::Preview, AnnotationLayer::Live);
            }
            Accumulator::Angle(points) => {
                // Both arms once the first arm is fixed: p1 - vertex - pointer.
                if let [vertex, arm, ..] = points[..] {
                    renderer.add_line(&[arm, vertex, hit], LineStyle::Preview, AnnotationLayer::Live);
                }
            }
            Accumulator::Area(points) => {
                let first = points[0];
                let last = points[points.len() - 1];
                let target = if hit.distance(first) < self.close_threshold {
                    first
                } else {
                    hit
                };
                renderer.add_line(&[last, target], LineStyle::Preview, AnnotationLayer::Live);
            }
        }
    }

    /// Commit the surface point under the pointer; returns the measurement it completes, if any.
    pub fn pointer_click(
        &mut self,
        screen: Vec2,
        picker: &mut impl PickService,
        renderer: &mut impl AnnotationRenderer,
    ) -> Option<CompletedMeasurement> {
        if self.state == SessionState::Idle {
            return None;
        }
        let hit = picker.pick(screen)?;
        let close_threshold = self.close_threshold;

        let SessionState::AwaitingPoints(accumulator) = &mut self.state else {
            return None;
        };

        let kind = accumulator.kind();
        let finished = match accumulator {
            Accumulator::Distance(points) | Accumulator::Angle(points) => {
                renderer.add_marker(hit, MarkerStyle::Point, AnnotationLayer::Pending);
                points.push(hit);
                debug!("Committed point {} at {:?}", points.len(), hit);

                let required = if kind == MeasurementKind::Distance { 2 } else { 3 };
                (points.len() >= required).then(|| (kind, mem::take(points)))
            }
            Accumulator::Area(points) => {
                let closes = points.len() >= MIN_POLYGON_VERTICES
                    && hit.distance(points[0]) < close_threshold;

                if closes {
                    Some((MeasurementKind::Area, mem::take(points)))
                } else {
                    let style = if points.is_empty() {
                        MarkerStyle::Anchor
                    } else {
                        MarkerStyle::Point
                    };
                    renderer.add_marker(hit, style, AnnotationLayer::Pending);
                    if let Some(&previous) = points.last() {
                        renderer.add_line(&[previous, hit], LineStyle::Edge, AnnotationLayer::Pending);
                    }
                    points.push(hit);
                    debug!("Committed polygon vertex {} at {:?}", points.len(), hit);
                    None
                }
            }
        };

        let (kind, points) = finished?;
        self.complete(kind, points, renderer)
    }

    /// One-line summary for the status overlay.
    pub fn status_line(&self) -> String {
        let camera = match self.camera_mode {
            CameraMode::Orbit => "Orbit",
            CameraMode::Pan => "Pan",
            CameraMode::Zoom => "Zoom",
        };
        match &self.state {
            SessionState::Idle => format!("{camera} | Esc cancels, D/A/R measure"),
            SessionState::AwaitingPoints(accumulator) => {
                let hint = match accumulator {
                    Accumulator::Distance(_) => "click two points",
                    Accumulator::Angle(_) => "click vertex, then both arms",
                    Accumulator::Area(_) => "click vertices, close on the first",
                };
                format!(
                    "{camera} | {:?}: {} ({} placed)",
                    accumulator.kind(),
                    hint,
                    accumulator.points().len()
                )
            }
        }
    }

    fn discard_in_progress(&mut self, renderer: &mut impl AnnotationRenderer) {
        renderer.remove_all(AnnotationLayer::Live);
        renderer.remove_all(AnnotationLayer::Pending);
        if let SessionState::AwaitingPoints(accumulator) = &self.state {
            self.state = SessionState::AwaitingPoints(Accumulator::empty(accumulator.kind()));
        }
    }

    fn complete(
        &mut self,
        kind: MeasurementKind,
        points: Vec<Vec3>,
        renderer: &mut impl AnnotationRenderer,
    ) -> Option<CompletedMeasurement> {
        self.discard_in_progress(renderer);

        let Some(evaluation) = self.evaluate(kind, &points) else {
            warn!("Discarded degenerate {:?} measurement: {:?}", kind, points);
            return None;
        };

        renderer.add_line(&evaluation.outline, LineStyle::Result, AnnotationLayer::Completed);
        for point in &points {
            renderer.add_marker(*point, MarkerStyle::Point, AnnotationLayer::Completed);
        }
        renderer.add_label(&evaluation.label, evaluation.anchor, AnnotationLayer::Completed);

        let measurement = CompletedMeasurement {
            id: self.next_id,
            kind,
            value: evaluation.value,
            label: evaluation.label,
            anchor: evaluation.anchor,
            points,
        };
        self.next_id += 1;

        info!(
            "Measurement {} completed: {:?} {}",
            measurement.id, measurement.kind, measurement.label
        );
        self.completed.push(measurement.clone());
        Some(measurement)
    }

    fn evaluate(&self, kind: MeasurementKind, points: &[Vec3]) -> Option<Evaluation> {
        match (kind, points) {
            (MeasurementKind::Distance, &[start, end]) => {
                let value = self.units.scale_length(geometry::distance(start, end));
                Some(Evaluation {
                    value,
                    label: self.units.format_length(value),
                    anchor: geometry::midpoint(start, end),
                    outline: vec![start, end],
                })
            }
            (MeasurementKind::Angle, &[vertex, p1, p2]) => {
                let value = geometry::angle_degrees(vertex, p1, p2)?;
                Some(Evaluation {
                    value,
                    label: self.units.format_angle(value),
                    anchor: vertex,
                    outline: vec![p1, vertex, p2],
                })
            }
            (MeasurementKind::Area, polygon) if polygon.len() >= MIN_POLYGON_VERTICES => {
                let value = self.units.scale_area(geometry::polygon_area(polygon));
                let mut outline = polygon.to_vec();
                outline.push(polygon[0]);
                Some(Evaluation {
                    value,
                    label: self.units.format_area(value),
                    anchor: geometry::polygon_centroid(polygon)?,
                    outline,
                })
            }
            _ => None,
        }
    }
}
