/// Entities: a shared mesh placed in the world
use std::sync::Arc;

use crate::geometry::{Mesh, Part};
use crate::matrix::Matrix4;
use crate::transform::{compose, RotationState, TransformOp};
use crate::vector::Vector3;

/// Everything the backend needs to draw one part of one entity
#[derive(Debug, Clone, Copy)]
pub struct PartDraw<'a> {
    pub part: &'a Part,
    /// `T * Rx * Ry * Rz * S`
    pub object_matrix: Matrix4,
    /// Translation-free, inverse-scaled companion used for normals
    pub object_rotation_matrix: Matrix4,
}

impl PartDraw<'_> {
    pub fn diffuse_color(&self) -> [f32; 3] {
        self.part.material().diffuse_color.to_array()
    }
}

#[derive(Debug, Clone)]
pub struct Entity {
    mesh: Arc<Mesh>,
    pub position: Vector3,
    pub rotation: RotationState,
    pub scale: f32,
}

impl Entity {
    /// Identity placement: origin, no rotation, unit scale
    pub fn new(mesh: Arc<Mesh>) -> Self {
        Self {
            mesh,
            position: Vector3::zero(),
            rotation: RotationState::zero(),
            scale: 1.0,
        }
    }

    pub fn with_position(mut self, position: Vector3) -> Self {
        self.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: RotationState) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn mesh(&self) -> &Arc<Mesh> {
        &self.mesh
    }

    pub fn object_matrix(&self) -> Matrix4 {
        let Vector3 { x, y, z } = self.position;
        let s = self.scale;
        compose(&[
            TransformOp::Translate(x, y, z),
            TransformOp::RotateX(self.rotation.x),
            TransformOp::RotateY(self.rotation.y),
            TransformOp::RotateZ(self.rotation.z),
            TransformOp::Scale(s, s, s),
        ])
    }

    /// A zero scale gives a zero inverse rather than infinities.
    pub fn object_rotation_matrix(&self) -> Matrix4 {
        let inverse = if self.scale == 0.0 {
            0.0
        } else {
            1.0 / self.scale
        };
        compose(&[
            TransformOp::Translate(0.0, 0.0, 0.0),
            TransformOp::RotateX(self.rotation.x),
            TransformOp::RotateY(self.rotation.y),
            TransformOp::RotateZ(self.rotation.z),
            TransformOp::Scale(inverse, inverse, inverse),
        ])
    }

    /// One draw per part, all sharing this frame's matrices
    pub fn draw_calls(&self) -> Vec<PartDraw<'_>> {
        let object_matrix = self.object_matrix();
        let object_rotation_matrix = self.object_rotation_matrix();
        self.mesh
            .parts()
            .iter()
            .map(|part| PartDraw {
                part,
                object_matrix,
                object_rotation_matrix,
            })
            .collect()
    }
}
