/// Distance (scene units) within which a click on the first polygon vertex closes the polygon.
/// Chosen for models authored in metres at roughly human scale.
pub const POLYGON_CLOSE_THRESHOLD: f32 = 0.5;

/// Minimum committed vertices before a polygon may be closed.
pub const MIN_POLYGON_VERTICES: usize = 3;

/// Scene units are metres; lengths are reported in centimetres.
pub const LENGTH_SCALE: f32 = 100.0;
pub const LENGTH_SUFFIX: &str = "cm";

pub const AREA_SCALE: f32 = LENGTH_SCALE * LENGTH_SCALE;
pub const AREA_SUFFIX: &str = "cm²";

pub const LABEL_DECIMALS: usize = 1;

/// Below this absolute signed area a polygon is treated as degenerate for centroid purposes.
pub const DEGENERATE_AREA_EPSILON: f32 = 1e-6;
