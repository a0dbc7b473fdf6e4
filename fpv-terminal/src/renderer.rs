/// ASCII rasterizer for terminal rendering
use std::convert::Infallible;
use std::io::Write;

use crossterm::{
    cursor,
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use fpv_core::{CameraRole, Matrix4, PartDraw, RenderBackend};
use nalgebra::{Vector3, Vector4};

/// Character luminosity ramp for depth/shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Minimum brightness so faces turned away from the light stay visible
const AMBIENT: f32 = 0.15;

/// Vertices at or behind the camera plane are rejected
const MIN_W: f32 = 1e-4;

/// Triangles are clipped against `w = NEAR_W` before the perspective divide
const NEAR_W: f32 = 0.05;

/// Terminal cells are roughly twice as tall as they are wide
const CELL_ASPECT: f32 = 2.0;

/// ASCII renderer that rasterizes baked parts into a character grid
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
    color_buffer: Vec<Color>,
    light_dir: Vector3<f32>,
    view: CameraRole,
    player: Matrix4,
    projector: Matrix4,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![' '; size],
            color_buffer: vec![Color::Reset; size],
            light_dir: Vector3::new(0.4, 1.0, 0.6).normalize(),
            view: CameraRole::Player,
            player: Matrix4::identity(),
            projector: Matrix4::identity(),
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self {
            view: self.view,
            player: self.player,
            projector: self.projector,
            ..Self::new(width, height)
        };
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.char_buffer.fill(' ');
        self.color_buffer.fill(Color::Reset);
    }

    /// Physical width over height of the character grid
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            return 1.0;
        }
        self.width as f32 / (self.height as f32 * CELL_ASPECT)
    }

    pub fn view(&self) -> CameraRole {
        self.view
    }

    pub fn toggle_view(&mut self) {
        self.view = match self.view {
            CameraRole::Player => CameraRole::Projector,
            CameraRole::Projector => CameraRole::Player,
        };
    }

    fn view_projection(&self) -> &Matrix4 {
        match self.view {
            CameraRole::Player => &self.player,
            CameraRole::Projector => &self.projector,
        }
    }

    /// Number of cells covered by geometry
    pub fn covered_cells(&self) -> usize {
        self.char_buffer.iter().filter(|c| **c != ' ').count()
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<(char, Color)> {
        (x < self.width && y < self.height).then(|| {
            let idx = y * self.width + x;
            (self.char_buffer[idx], self.color_buffer[idx])
        })
    }

    fn render_part(&mut self, draw: &PartDraw<'_>) {
        let mvp: nalgebra::Matrix4<f32> = (self.view_projection() * &draw.object_matrix).into();
        let model: nalgebra::Matrix4<f32> = draw.object_matrix.into();
        let normal_matrix: nalgebra::Matrix4<f32> = draw.object_rotation_matrix.into();
        let [r, g, b] = draw.diffuse_color();

        let vertices = draw.part.vertex_buffer().chunks_exact(12);
        let normals = draw.part.normal_data().chunks_exact(9);
        for (corners, corner_normals) in vertices.zip(normals) {
            let mut clip = [Vector4::zeros(); 3];
            let mut world = [Vector3::zeros(); 3];
            for i in 0..3 {
                let local = Vector4::from_column_slice(&corners[i * 4..i * 4 + 4]);
                world[i] = (model * local).xyz();
                clip[i] = mvp * local;
            }
            let pieces = clip_near(&clip);
            if pieces.is_empty() {
                continue;
            }

            let normal = self.triangle_normal(corner_normals, &normal_matrix, &world);
            let brightness = normal.dot(&self.light_dir).max(0.0).max(AMBIENT);

            // Map brightness to character
            let char_index = (brightness * (LUMINOSITY_RAMP.len() - 1) as f32) as usize;
            let character = LUMINOSITY_RAMP[char_index.clamp(1, LUMINOSITY_RAMP.len() - 1)];
            let color = Color::Rgb {
                r: channel(r * brightness),
                g: channel(g * brightness),
                b: channel(b * brightness),
            };

            for piece in &pieces {
                let screen = [
                    self.project(&piece[0]),
                    self.project(&piece[1]),
                    self.project(&piece[2]),
                ];
                if let [Some(a), Some(b), Some(c)] = screen {
                    self.rasterize_triangle(&[a, b, c], character, color);
                }
            }
        }
    }

    /// Perspective divide and viewport mapping; depth is the clip-space `w`
    fn project(&self, clip: &Vector4<f32>) -> Option<(f32, f32, f32)> {
        if clip.w <= MIN_W {
            return None;
        }
        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;
        let screen_x = (ndc_x + 1.0) * 0.5 * self.width as f32;
        let screen_y = (1.0 - ndc_y) * 0.5 * self.height as f32;
        Some((screen_x, screen_y, clip.w))
    }

    /// Average of the baked corner normals in world orientation, or the face
    /// normal when the asset carries none
    fn triangle_normal(
        &self,
        corner_normals: &[f32],
        normal_matrix: &nalgebra::Matrix4<f32>,
        world: &[Vector3<f32>; 3],
    ) -> Vector3<f32> {
        let sum = corner_normals
            .chunks_exact(3)
            .map(|n| Vector3::new(n[0], n[1], n[2]))
            .fold(Vector3::zeros(), |acc, n| acc + n);
        let rotated = (normal_matrix * Vector4::new(sum.x, sum.y, sum.z, 0.0)).xyz();
        if let Some(normal) = rotated.try_normalize(1e-6) {
            return normal;
        }

        let face = (world[1] - world[0]).cross(&(world[2] - world[0]));
        face.try_normalize(1e-6).unwrap_or_else(Vector3::zeros)
    }

    fn rasterize_triangle(
        &mut self,
        coords: &[(f32, f32, f32); 3],
        character: char,
        color: Color,
    ) {
        let (v0, v1, v2) = (coords[0], coords[1], coords[2]);

        // Bounding box
        let min_x = v0.0.min(v1.0).min(v2.0).floor() as i32;
        let max_x = v0.0.max(v1.0).max(v2.0).ceil() as i32;
        let min_y = v0.1.min(v1.1).min(v2.1).floor() as i32;
        let max_y = v0.1.max(v1.1).max(v2.1).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                // Either winding counts as covered; there is no culling.
                if let Some((w0, w1, w2)) =
                    barycentric((v0.0, v0.1), (v1.0, v1.1), (v2.0, v2.1), (px, py))
                {
                    if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                        let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;

                        let idx = y as usize * self.width + x as usize;
                        if depth < self.depth_buffer[idx] {
                            self.depth_buffer[idx] = depth;
                            self.char_buffer[idx] = character;
                            self.color_buffer[idx] = color;
                        }
                    }
                }
            }
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            writer.queue(cursor::MoveTo(0, y as u16))?;
            let mut current = None;
            for x in 0..self.width {
                let idx = y * self.width + x;
                let color = self.color_buffer[idx];
                if current != Some(color) {
                    writer.queue(SetForegroundColor(color))?;
                    current = Some(color);
                }
                writer.queue(Print(self.char_buffer[idx]))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

impl RenderBackend for AsciiRenderer {
    type Error = Infallible;

    fn begin_frame(&mut self) -> Result<(), Infallible> {
        self.clear();
        Ok(())
    }

    fn set_view_projection(&mut self, role: CameraRole, matrix: &Matrix4) {
        match role {
            CameraRole::Player => self.player = *matrix,
            CameraRole::Projector => self.projector = *matrix,
        }
    }

    fn draw_part(&mut self, draw: &PartDraw<'_>) -> Result<(), Infallible> {
        self.render_part(draw);
        Ok(())
    }

    fn end_frame(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
}

/// Cut a clip-space triangle to the part in front of `w = NEAR_W`.
///
/// Yields nothing, the triangle itself, or the one or two triangles fanned
/// from the clipped polygon.
fn clip_near(triangle: &[Vector4<f32>; 3]) -> Vec<[Vector4<f32>; 3]> {
    let mut polygon = Vec::with_capacity(4);
    for i in 0..3 {
        let a = triangle[i];
        let b = triangle[(i + 1) % 3];
        let (da, db) = (a.w - NEAR_W, b.w - NEAR_W);
        if da >= 0.0 {
            polygon.push(a);
        }
        if (da >= 0.0) != (db >= 0.0) {
            let t = da / (da - db);
            polygon.push(a + (b - a) * t);
        }
    }

    (1..polygon.len().saturating_sub(1))
        .map(|j| [polygon[0], polygon[j], polygon[j + 1]])
        .collect()
}

fn channel(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fpv_core::{Camera, Entity, Mesh, Vector3 as Vec3};
    use std::sync::Arc;

    fn facing_quad() -> Arc<Mesh> {
        let obj = "v -1 -1 0\nv 1 -1 0\nv 1 1 0\nv -1 1 0\nvn 0 0 1\n\
                   usemtl Red\nf 1//1 2//1 3//1 4//1\n";
        Arc::new(Mesh::from_sources(obj, Some("newmtl Red\nKd 1 0 0\n")).unwrap())
    }

    fn render(entity: &Entity, renderer: &mut AsciiRenderer) {
        let camera = Camera::default();
        renderer.begin_frame().unwrap();
        renderer.set_view_projection(
            CameraRole::Player,
            &camera.view_projection(renderer.aspect_ratio()),
        );
        for draw in entity.draw_calls() {
            renderer.draw_part(&draw).unwrap();
        }
        renderer.end_frame().unwrap();
    }

    #[test]
    fn test_quad_in_front_covers_center() {
        let entity = Entity::new(facing_quad()).with_position(Vec3::new(0.0, 1.7, -3.0));
        let mut renderer = AsciiRenderer::new(80, 40);
        render(&entity, &mut renderer);

        assert!(renderer.covered_cells() > 0);
        let (character, color) = renderer.cell(40, 20).unwrap();
        assert_ne!(character, ' ');
        match color {
            Color::Rgb { r, g, b } => {
                assert!(r > 0);
                assert_eq!((g, b), (0, 0));
            }
            other => panic!("unexpected color {:?}", other),
        }
    }

    #[test]
    fn test_geometry_behind_camera_is_skipped() {
        let entity = Entity::new(facing_quad()).with_position(Vec3::new(0.0, 1.7, 3.0));
        let mut renderer = AsciiRenderer::new(80, 40);
        render(&entity, &mut renderer);
        assert_eq!(renderer.covered_cells(), 0);
    }

    #[test]
    fn test_nearer_part_wins_depth_test() {
        let near = Entity::new(facing_quad()).with_position(Vec3::new(0.0, 1.7, -2.0));
        let far = Entity::new(facing_quad())
            .with_position(Vec3::new(0.0, 1.7, -6.0))
            .with_scale(4.0);
        let mut renderer = AsciiRenderer::new(80, 40);
        render(&far, &mut renderer);
        let far_cells = renderer.covered_cells();

        let camera = Camera::default();
        for draw in near.draw_calls() {
            renderer.draw_part(&draw).unwrap();
        }
        assert!(renderer.covered_cells() >= far_cells);
        let idx = 20 * 80 + 40;
        let expected = camera
            .view_projection(renderer.aspect_ratio())
            .transform(&[0.0, 1.7, -2.0, 1.0])[3];
        assert!((renderer.depth_buffer[idx] - expected).abs() < 1e-3);
    }

    #[test]
    fn test_toggle_view_switches_matrix() {
        let mut renderer = AsciiRenderer::new(10, 10);
        let projector = Matrix4::translation(1.0, 2.0, 3.0);
        renderer.set_view_projection(CameraRole::Projector, &projector);
        assert_eq!(renderer.view(), CameraRole::Player);
        renderer.toggle_view();
        assert_eq!(renderer.view(), CameraRole::Projector);
        assert_eq!(renderer.view_projection(), &projector);
    }

    #[test]
    fn test_resize_keeps_view() {
        let mut renderer = AsciiRenderer::new(10, 10);
        renderer.toggle_view();
        renderer.resize(40, 20);
        assert_eq!(renderer.view(), CameraRole::Projector);
        assert_eq!(renderer.cell(39, 19), Some((' ', Color::Reset)));
        assert!((renderer.aspect_ratio() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_clip_near_splits_by_vertices_behind() {
        let front = |x: f32| Vector4::new(x, 0.0, 0.0, 2.0);
        let behind = |x: f32| Vector4::new(x, 0.0, 0.0, -1.0);

        assert_eq!(clip_near(&[front(0.0), front(1.0), front(2.0)]).len(), 1);
        assert!(clip_near(&[behind(0.0), behind(1.0), behind(2.0)]).is_empty());

        let one_behind = clip_near(&[behind(0.0), front(1.0), front(2.0)]);
        assert_eq!(one_behind.len(), 2);
        let two_behind = clip_near(&[behind(0.0), behind(1.0), front(2.0)]);
        assert_eq!(two_behind.len(), 1);

        for tri in one_behind.iter().chain(&two_behind) {
            assert!(tri.iter().all(|v| v.w >= NEAR_W - 1e-6));
        }
    }

    #[test]
    fn test_floor_under_player_is_drawn() {
        let mut viewer =
            crate::assets::build_viewer(None, 1.0, fpv_core::CameraConfig::default()).unwrap();
        let mut renderer = AsciiRenderer::new(120, 40);
        let mut input = fpv_core::InputState::default();
        let aspect_ratio = renderer.aspect_ratio();
        viewer
            .tick(&mut input, std::time::Duration::from_millis(16), aspect_ratio, &mut renderer)
            .unwrap();

        let grey_cells = (0..40)
            .flat_map(|y| (0..120).map(move |x| (x, y)))
            .filter(|&(x, y)| {
                matches!(
                    renderer.cell(x, y),
                    Some((c, Color::Rgb { r, g, b })) if c != ' ' && r == g && g == b
                )
            })
            .count();
        assert!(grey_cells > 0);

        // Straight down at the bottom edge is floor.
        match renderer.cell(60, 39) {
            Some((c, Color::Rgb { r, g, b })) => {
                assert_ne!(c, ' ');
                assert!(r == g && g == b);
            }
            other => panic!("expected floor at the bottom edge, got {:?}", other),
        }
    }

    #[test]
    fn test_barycentric_degenerate() {
        assert!(barycentric((0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (0.5, 0.5)).is_none());
        let (w0, w1, w2) = barycentric((0.0, 0.0), (4.0, 0.0), (0.0, 4.0), (1.0, 1.0)).unwrap();
        assert!((w0 + w1 + w2 - 1.0).abs() < 1e-6);
        assert!(w0 > 0.0 && w1 > 0.0 && w2 > 0.0);
    }
}
