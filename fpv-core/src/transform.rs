/// Ordered transform lists and rotation state
use crate::matrix::Matrix4;

/// Rotation state around three axes (in radians)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RotationState {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    /// Rotate by delta amounts (in radians)
    pub fn rotate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.x += dx;
        self.y += dy;
        self.z += dz;
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::zero()
    }
}

/// A single step of a transform chain
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformOp {
    Translate(f32, f32, f32),
    RotateX(f32),
    RotateY(f32),
    RotateZ(f32),
    Scale(f32, f32, f32),
    Perspective {
        aspect_ratio: f32,
        expand_x: bool,
        fov_degrees: f32,
    },
}

impl TransformOp {
    pub fn matrix(&self) -> Matrix4 {
        match *self {
            TransformOp::Translate(x, y, z) => Matrix4::translation(x, y, z),
            TransformOp::RotateX(a) => Matrix4::x_rotation(a),
            TransformOp::RotateY(a) => Matrix4::y_rotation(a),
            TransformOp::RotateZ(a) => Matrix4::z_rotation(a),
            TransformOp::Scale(x, y, z) => Matrix4::nonuniform_scaling(x, y, z),
            TransformOp::Perspective {
                aspect_ratio,
                expand_x,
                fov_degrees,
            } => Matrix4::perspective(aspect_ratio, expand_x, fov_degrees),
        }
    }
}

/// Fold `ops` left to right: `compose(&[a, b, c]) == A * B * C`.
///
/// The last op is the first one applied to a point.
pub fn compose(ops: &[TransformOp]) -> Matrix4 {
    ops.iter()
        .fold(Matrix4::identity(), |acc, op| acc.multiply(&op.matrix()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_state() {
        let mut state = RotationState::zero();
        assert_eq!(state.x, 0.0);
        assert_eq!(state.y, 0.0);
        assert_eq!(state.z, 0.0);

        state.rotate(0.1, 0.2, 0.3);
        assert!((state.x - 0.1).abs() < 1e-6);
        assert!((state.y - 0.2).abs() < 1e-6);
        assert!((state.z - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_empty_compose_is_identity() {
        assert_eq!(compose(&[]), Matrix4::identity());
    }

    #[test]
    fn test_compose_matches_chain() {
        let ops = [
            TransformOp::Perspective {
                aspect_ratio: 1.25,
                expand_x: false,
                fov_degrees: 90.0,
            },
            TransformOp::RotateX(0.2),
            TransformOp::RotateY(1.4),
            TransformOp::Translate(-1.0, -2.0, -3.0),
        ];
        let chained = Matrix4::perspective(1.25, false, 90.0)
            .x_rotate(0.2)
            .y_rotate(1.4)
            .translate(-1.0, -2.0, -3.0);
        assert_eq!(compose(&ops), chained);
    }

    #[test]
    fn test_compose_order_matters() {
        let a = compose(&[TransformOp::RotateX(0.5), TransformOp::Translate(0.0, 1.0, 2.0)]);
        let b = compose(&[TransformOp::Translate(0.0, 1.0, 2.0), TransformOp::RotateX(0.5)]);
        assert_ne!(a, b);
    }
}
