//! Orthonormal frame construction.

use glam::Vec3;

/// How close to vertical a forward axis may get before the cross product
/// with world up degenerates.
const VERTICAL_LIMIT: f32 = 0.999;

/// Mutually orthogonal unit axes orienting a point along its polyline.
///
/// `forward` points at the next point in the branch; `right` and `up` span
/// the plane the mesh ring around the point is laid out in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
}

impl Default for Frame {
    fn default() -> Self {
        Self::from_forward(Vec3::Z)
    }
}

impl Frame {
    /// Build a frame whose forward axis points along `dir`.
    ///
    /// `right` is the cross product of forward and world up; when forward is
    /// nearly vertical that product degenerates, so world right (or world
    /// left, for a downward forward) is substituted. `up` completes the
    /// frame as forward x right.
    #[must_use]
    pub fn from_forward(dir: Vec3) -> Self {
        let forward = dir.normalize_or(Vec3::Z);
        let right = if forward.dot(Vec3::Y).abs() > VERTICAL_LIMIT {
            if forward.y > 0.0 { Vec3::X } else { Vec3::NEG_X }
        } else {
            forward.cross(Vec3::Y).normalize()
        };
        let up = forward.cross(right).normalize();
        Self { forward, right, up }
    }

    /// Frame positioned at `from`, facing `to`.
    #[must_use]
    pub fn looking_at(from: Vec3, to: Vec3) -> Self {
        Self::from_forward(to - from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_orthonormal(frame: &Frame) {
        assert!((frame.forward.length() - 1.0).abs() < 1e-5);
        assert!((frame.right.length() - 1.0).abs() < 1e-5);
        assert!((frame.up.length() - 1.0).abs() < 1e-5);
        assert!(frame.forward.dot(frame.right).abs() < 1e-5);
        assert!(frame.forward.dot(frame.up).abs() < 1e-5);
        assert!(frame.right.dot(frame.up).abs() < 1e-5);
    }

    #[test]
    fn test_from_forward_general() {
        let frame = Frame::from_forward(Vec3::new(1.0, 2.0, 3.0));
        assert_orthonormal(&frame);
        assert!(
            frame
                .forward
                .dot(Vec3::new(1.0, 2.0, 3.0).normalize())
                .abs()
                > 0.999
        );
    }

    #[test]
    fn test_vertical_fallback() {
        // Straight up: cross with world up degenerates, fall back to world right.
        let up_frame = Frame::from_forward(Vec3::Y);
        assert_orthonormal(&up_frame);
        assert_eq!(up_frame.right, Vec3::X);

        // Straight down: fall back to world left.
        let down_frame = Frame::from_forward(Vec3::NEG_Y);
        assert_orthonormal(&down_frame);
        assert_eq!(down_frame.right, Vec3::NEG_X);
    }

    #[test]
    fn test_nearly_vertical_still_finite() {
        let frame = Frame::from_forward(Vec3::new(1e-4, 1.0, 0.0));
        assert_orthonormal(&frame);
        assert!(frame.right.is_finite());
    }

    #[test]
    fn test_zero_direction_keeps_default() {
        let frame = Frame::from_forward(Vec3::ZERO);
        assert_orthonormal(&frame);
        assert_eq!(frame.forward, Vec3::Z);
    }

    #[test]
    fn test_looking_at() {
        let frame = Frame::looking_at(Vec3::ZERO, Vec3::new(0.0, 0.0, 5.0));
        assert_eq!(frame.forward, Vec3::Z);
    }
}
