/// Per-frame orchestration and the rendering backend boundary
use std::time::Duration;

use crate::entity::PartDraw;
use crate::input::InputState;
use crate::matrix::Matrix4;
use crate::projection::{Camera, CameraConfig, CameraRole};
use crate::scene::Scene;

/// Consumer of baked buffers and per-frame matrices.
///
/// Matrices are handed over row-major; see [`Matrix4::transposed`] for
/// column-major APIs.
pub trait RenderBackend {
    type Error;

    fn begin_frame(&mut self) -> Result<(), Self::Error>;

    fn set_view_projection(&mut self, role: CameraRole, matrix: &Matrix4);

    fn draw_part(&mut self, draw: &PartDraw<'_>) -> Result<(), Self::Error>;

    fn end_frame(&mut self) -> Result<(), Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    pub parts_drawn: usize,
    pub triangles_drawn: usize,
}

/// The two cameras and the scene, advanced one tick per rendered frame
#[derive(Debug)]
pub struct Viewer {
    pub player: Camera,
    pub projector: Camera,
    pub scene: Scene,
}

impl Viewer {
    pub fn new(player: Camera, projector: Camera, scene: Scene) -> Self {
        Self {
            player,
            projector,
            scene,
        }
    }

    /// Player at the origin and a projector sharing its config, both with default pose
    pub fn with_scene(config: CameraConfig, scene: Scene) -> Self {
        let projector = Camera::projector(config.clone(), Default::default(), 0.0, 0.0);
        Self::new(Camera::player(config), projector, scene)
    }

    /// Camera update, then transforms, then draw handoff.
    pub fn tick<B: RenderBackend>(
        &mut self,
        input: &mut InputState,
        dt: Duration,
        aspect_ratio: f32,
        backend: &mut B,
    ) -> Result<FrameStats, B::Error> {
        self.player.update(input, dt);
        self.scene.update(dt);

        let player_matrix = self.player.view_projection(aspect_ratio);
        let projector_matrix = self.projector.view_projection(aspect_ratio);

        backend.begin_frame()?;
        backend.set_view_projection(CameraRole::Player, &player_matrix);
        backend.set_view_projection(CameraRole::Projector, &projector_matrix);

        let mut stats = FrameStats::default();
        for entity in self.scene.entities() {
            for draw in entity.draw_calls() {
                backend.draw_part(&draw)?;
                stats.parts_drawn += 1;
                stats.triangles_drawn += draw.part.triangle_count();
            }
        }

        backend.end_frame()?;
        Ok(stats)
    }
}
