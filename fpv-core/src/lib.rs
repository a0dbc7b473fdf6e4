/// FPV Core Library - Geometry and transform pipeline for the first-person viewer
///
/// Covers the matrix algebra, OBJ/MTL ingestion and baking into per-material
/// parts, entity and camera transform composition, and the per-frame contract
/// with a rendering backend. Windowing, input capture and drawing live in the
/// host crates.

pub mod error;
pub mod vector;
pub mod matrix;
pub mod transform;
pub mod mtl;
pub mod obj;
pub mod geometry;
pub mod entity;
pub mod input;
pub mod projection;
pub mod scene;
pub mod frame;

// Re-export commonly used types
pub use error::{BakeError, MaterialError, ShapeError};
pub use vector::Vector3;
pub use matrix::Matrix4;
pub use transform::{compose, RotationState, TransformOp};
pub use mtl::{MaterialLibrary, MaterialSpec};
pub use obj::{parse_obj, FaceGroup, MaterialBinding, ObjDocument};
pub use geometry::{Mesh, Part};
pub use entity::{Entity, PartDraw};
pub use input::{CaptureState, InputState, LookDelta};
pub use projection::{Camera, CameraConfig, CameraRole, KeyBindings};
pub use scene::Scene;
pub use frame::{FrameStats, RenderBackend, Viewer};
