//! Drawing contract between the measurement session and the scene.
//!
//! The session decides what to draw; implementors only create and destroy the
//! visuals. Every visual is tagged with an [`AnnotationLayer`] so a whole layer
//! can be removed in one call.

use bevy::math::Vec3;
use bevy::prelude::Component;

/// Lifetime group of an annotation visual.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnnotationLayer {
    /// Rubber-band feedback, redrawn on every pointer move.
    Live,
    /// Markers and edges of the measurement being built.
    Pending,
    /// Finished measurements; survive cancel and mode switches.
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    /// Follows the pointer.
    Preview,
    /// Committed polygon edge.
    Edge,
    /// Final measured segment or outline.
    Result,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerStyle {
    Point,
    /// First polygon vertex, the click target that closes the polygon.
    Anchor,
}

pub trait AnnotationRenderer {
    /// Draw a connected polyline through `points`.
    fn add_line(&mut self, points: &[Vec3], style: LineStyle, layer: AnnotationLayer);

    fn add_marker(&mut self, point: Vec3, style: MarkerStyle, layer: AnnotationLayer);

    /// Floating text anchored at a world position, facing the viewer and drawn over the model.
    fn add_label(&mut self, text: &str, position: Vec3, layer: AnnotationLayer);

    fn remove_all(&mut self, layer: AnnotationLayer);
}
