//! Measurement geometry over world-space points.
//!
//! Area and centroid project onto the X-Z plane (Y up). The projection ignores
//! height variation between vertices, so the result is exact only for polygons
//! lying in a horizontal plane.

use bevy::math::Vec3;
use constants::measurement::DEGENERATE_AREA_EPSILON;

/// Euclidean distance between two points.
pub fn distance(a: Vec3, b: Vec3) -> f32 {
    (b - a).length()
}

pub fn midpoint(a: Vec3, b: Vec3) -> Vec3 {
    (a + b) * 0.5
}

/// Angle at `vertex` between the arms towards `p1` and `p2`, in degrees.
///
/// Returns `None` when either arm has zero length, since the direction of a
/// zero vector is undefined. The cosine is clamped before `acos` so rounding
/// never pushes the result outside [0, 180].
pub fn angle_degrees(vertex: Vec3, p1: Vec3, p2: Vec3) -> Option<f32> {
    let arm1 = p1 - vertex;
    let arm2 = p2 - vertex;
    let denominator = arm1.length() * arm2.length();
    if denominator <= f32::EPSILON {
        return None;
    }
    let cosine = (arm1.dot(arm2) / denominator).clamp(-1.0, 1.0);
    Some(cosine.acos().to_degrees())
}

/// Shoelace sum over consecutive vertex pairs projected onto X-Z, halved.
/// Positive for one winding, negative for the other.
pub fn signed_area_xz(points: &[Vec3]) -> f32 {
    if points.len() < 3 {
        return 0.0;
    }
    let sum: f32 = (0..points.len())
        .map(|i| {
            let a = points[i];
            let b = points[(i + 1) % points.len()];
            a.x * b.z - b.x * a.z
        })
        .sum();
    sum * 0.5
}

/// Unsigned polygon area on the X-Z plane.
pub fn polygon_area(points: &[Vec3]) -> f32 {
    signed_area_xz(points).abs()
}

/// Arithmetic mean of all vertices.
pub fn vertex_mean(points: &[Vec3]) -> Option<Vec3> {
    if points.is_empty() {
        return None;
    }
    Some(points.iter().copied().sum::<Vec3>() / points.len() as f32)
}

/// Area-weighted centroid on X-Z with the mean vertex height as Y.
///
/// Zero-area polygons (collinear or repeated vertices) fall back to the
/// vertex mean instead of dividing by zero.
pub fn polygon_centroid(points: &[Vec3]) -> Option<Vec3> {
    let mean = vertex_mean(points)?;
    let signed_area = signed_area_xz(points);
    if signed_area.abs() <= DEGENERATE_AREA_EPSILON {
        return Some(mean);
    }

    let (mut cx, mut cz) = (0.0, 0.0);
    for i in 0..points.len() {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        let cross = a.x * b.z - b.x * a.z;
        cx += (a.x + b.x) * cross;
        cz += (a.z + b.z) * cross;
    }
    let factor = 6.0 * signed_area;

    Some(Vec3::new(cx / factor, mean.y, cz / factor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn unit_square() -> Vec<Vec3> {
        vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(0.0, 0.0, 1.0),
        ]
    }

    #[test]
    fn distance_is_symmetric_and_zero_on_itself() {
        let a = Vec3::new(1.0, -2.0, 3.5);
        let b = Vec3::new(-4.0, 0.5, 2.0);
        assert_relative_eq!(distance(a, b), distance(b, a));
        assert_eq!(distance(a, a), 0.0);
        assert_relative_eq!(distance(Vec3::ZERO, Vec3::new(3.0, 4.0, 0.0)), 5.0);
    }

    #[test]
    fn right_angle() {
        let angle = angle_degrees(Vec3::ZERO, Vec3::X, Vec3::Z).unwrap();
        assert_relative_eq!(angle, 90.0, epsilon = 1e-4);
    }

    #[test]
    fn angle_is_symmetric_in_its_arms() {
        let vertex = Vec3::new(0.3, 1.0, -0.2);
        let p1 = Vec3::new(2.0, 1.5, 0.4);
        let p2 = Vec3::new(-1.0, 0.2, 3.0);
        let a = angle_degrees(vertex, p1, p2).unwrap();
        let b = angle_degrees(vertex, p2, p1).unwrap();
        assert_relative_eq!(a, b);
        assert!((0.0..=180.0).contains(&a));
    }

    #[test]
    fn parallel_and_opposite_arms_stay_in_range() {
        let same = angle_degrees(Vec3::ZERO, Vec3::X, Vec3::X * 3.0).unwrap();
        assert_abs_diff_eq!(same, 0.0, epsilon = 1e-2);

        let opposite = angle_degrees(Vec3::ZERO, Vec3::X, -Vec3::X).unwrap();
        assert_abs_diff_eq!(opposite, 180.0, epsilon = 1e-2);
    }

    #[test]
    fn zero_length_arm_has_no_angle() {
        assert_eq!(angle_degrees(Vec3::ONE, Vec3::ONE, Vec3::X), None);
        assert_eq!(angle_degrees(Vec3::ZERO, Vec3::X, Vec3::ZERO), None);
    }

    #[test]
    fn unit_square_area_and_centroid() {
        let square = unit_square();
        assert_relative_eq!(polygon_area(&square), 1.0);

        let centroid = polygon_centroid(&square).unwrap();
        assert_relative_eq!(centroid.x, 0.5);
        assert_relative_eq!(centroid.y, 0.0);
        assert_relative_eq!(centroid.z, 0.5);
    }

    #[test]
    fn area_does_not_depend_on_winding() {
        let mut square = unit_square();
        let forward = signed_area_xz(&square);
        square.reverse();
        let backward = signed_area_xz(&square);
        assert_relative_eq!(forward, -backward);
        assert_relative_eq!(polygon_area(&square), 1.0);
    }

    #[test]
    fn area_ignores_height() {
        let square: Vec<Vec3> = unit_square()
            .into_iter()
            .enumerate()
            .map(|(i, p)| p + Vec3::Y * i as f32)
            .collect();
        assert_relative_eq!(polygon_area(&square), 1.0);
        // Y is the plain vertex mean: (0 + 1 + 2 + 3) / 4.
        assert_relative_eq!(polygon_centroid(&square).unwrap().y, 1.5);
    }

    #[test]
    fn centroid_of_l_shape_is_area_weighted() {
        // 2x2 square with the top-right 1x1 quadrant removed.
        let l_shape = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 2.0),
            Vec3::new(0.0, 0.0, 2.0),
        ];
        assert_relative_eq!(polygon_area(&l_shape), 3.0);

        let centroid = polygon_centroid(&l_shape).unwrap();
        assert_relative_eq!(centroid.x, 5.0 / 6.0, epsilon = 1e-5);
        assert_relative_eq!(centroid.z, 5.0 / 6.0, epsilon = 1e-5);
    }

    #[test]
    fn collinear_polygon_has_zero_area_and_mean_centroid() {
        let line = [
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(2.0, 1.0, 2.0),
        ];
        assert_eq!(polygon_area(&line), 0.0);

        let centroid = polygon_centroid(&line).unwrap();
        assert!(centroid.is_finite());
        assert_relative_eq!(centroid.x, 1.0);
        assert_relative_eq!(centroid.z, 1.0);
    }

    #[test]
    fn too_few_points() {
        assert_eq!(polygon_area(&[Vec3::ZERO, Vec3::X]), 0.0);
        assert_eq!(polygon_centroid(&[]), None);
    }
}
