use bevy::color::Color;

/// Scene background, matches the light grey page behind the viewer canvas.
pub const BACKGROUND_COLOUR: Color = Color::srgb(0.94, 0.94, 0.94);

pub const DRAW_LINE_WIDTH: f32 = 0.01;
pub const DRAW_VERTEX_SIZE: f32 = 0.1;

/// Segments shorter than this are not drawn; the cuboid would collapse.
pub const MIN_SEGMENT_LENGTH: f32 = 0.0005;

pub const MEASURE_LINE_COLOUR: Color = Color::srgb(1.0, 1.0, 0.0);
pub const PREVIEW_LINE_COLOUR: Color = Color::srgb(1.0, 0.85, 0.2);
pub const MARKER_COLOUR: Color = Color::srgb(1.0, 0.0, 0.0);
pub const ANCHOR_MARKER_COLOUR: Color = Color::srgb(1.0, 0.45, 0.0);

pub const LABEL_FONT_SIZE: f32 = 16.0;
pub const LABEL_TEXT_COLOUR: Color = Color::srgb(0.0, 0.4, 0.8);
pub const LABEL_BACKGROUND_COLOUR: Color = Color::WHITE;
pub const LABEL_PADDING: f32 = 6.0;
pub const LABEL_CORNER_RADIUS: f32 = 4.0;

/// Labels sit above every other UI node.
pub const LABEL_Z_INDEX: i32 = 999;
