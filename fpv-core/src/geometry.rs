/// Baked meshes: per-material parts with upload-ready buffers
use crate::error::BakeError;
use crate::mtl::{MaterialLibrary, MaterialSpec};
use crate::obj::{self, MaterialBinding, ObjDocument};

/// A single-material slice of a mesh, drawable on its own
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    material: MaterialSpec,
    triangle_indices: Vec<usize>,
    normal_data: Vec<f32>,
    vertex_buffer: Vec<f32>,
}

impl Part {
    /// Gather `positions[i]` for every triangle index into a flat `x, y, z, 1` buffer
    pub fn bake(
        material: MaterialSpec,
        triangle_indices: Vec<usize>,
        normal_data: Vec<f32>,
        positions: &[[f32; 3]],
    ) -> Result<Self, BakeError> {
        debug_assert_eq!(normal_data.len(), triangle_indices.len() * 3);

        let mut vertex_buffer = Vec::with_capacity(triangle_indices.len() * 4);
        for &index in &triangle_indices {
            let [x, y, z] = positions.get(index).ok_or(BakeError::VertexOutOfRange {
                index,
                len: positions.len(),
            })?;
            vertex_buffer.extend_from_slice(&[*x, *y, *z, 1.0]);
        }

        Ok(Self {
            material,
            triangle_indices,
            normal_data,
            vertex_buffer,
        })
    }

    pub fn material(&self) -> &MaterialSpec {
        &self.material
    }

    pub fn triangle_indices(&self) -> &[usize] {
        &self.triangle_indices
    }

    /// Stride 3, one normal per buffered vertex
    pub fn normal_data(&self) -> &[f32] {
        &self.normal_data
    }

    /// Stride 4, homogeneous positions
    pub fn vertex_buffer(&self) -> &[f32] {
        &self.vertex_buffer
    }

    pub fn vertex_count(&self) -> usize {
        self.triangle_indices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangle_indices.len() / 3
    }
}

/// A baked asset; immutable and shared by every entity that draws it
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    parts: Vec<Part>,
    positions: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
}

impl Mesh {
    /// Resolve each face group's material and bake it into a [`Part`].
    ///
    /// Groups that never received a face produce no part.
    pub fn bake(document: &ObjDocument, materials: &MaterialLibrary) -> Result<Self, BakeError> {
        let mut parts = Vec::with_capacity(document.groups.len());

        for group in document.groups.iter().filter(|g| !g.triangle_indices.is_empty()) {
            let material = match &group.binding {
                MaterialBinding::Default => MaterialSpec::default_material(),
                MaterialBinding::Named(name) => materials
                    .get(name)
                    .cloned()
                    .ok_or_else(|| BakeError::UnresolvedMaterial { name: name.clone() })?,
            };
            parts.push(Part::bake(
                material,
                group.triangle_indices.clone(),
                group.normal_data.clone(),
                &document.positions,
            )?);
        }

        let mesh = Self {
            parts,
            positions: document.positions.clone(),
            normals: document.normals.clone(),
        };
        log::info!(
            "Baked mesh: {} parts, {} triangles",
            mesh.parts.len(),
            mesh.triangle_count()
        );
        Ok(mesh)
    }

    /// Parse geometry and optional material text, then bake.
    ///
    /// Malformed material blocks are logged and skipped.
    pub fn from_sources(obj_text: &str, mtl_text: Option<&str>) -> Result<Self, BakeError> {
        let materials = match mtl_text {
            Some(text) => MaterialLibrary::parse(text).0,
            None => MaterialLibrary::new(),
        };
        Self::bake(&obj::parse_obj(obj_text), &materials)
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn part(&self, material_name: &str) -> Option<&Part> {
        self.parts.iter().find(|p| p.material.name == material_name)
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn normals(&self) -> &[[f32; 3]] {
        &self.normals
    }

    pub fn triangle_count(&self) -> usize {
        self.parts.iter().map(Part::triangle_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::Vector3;

    const TWO_MATERIALS: &str = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vn 0 0 1
usemtl Red
f 1//1 2//1 3//1
usemtl Blue
f 1//1 3//1 4//1
";

    fn library() -> MaterialLibrary {
        MaterialLibrary::parse("newmtl Red\nKd 1 0 0\nnewmtl Blue\nKd 0 0 1\n").0
    }

    #[test]
    fn test_parts_per_material() {
        let mesh = Mesh::bake(&obj::parse_obj(TWO_MATERIALS), &library()).unwrap();
        assert_eq!(mesh.parts().len(), 2);
        assert_eq!(mesh.triangle_count(), 2);

        let blue = mesh.part("Blue").unwrap();
        assert_eq!(blue.material().diffuse_color, Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(blue.triangle_indices(), &[0, 2, 3]);
        assert_eq!(
            blue.vertex_buffer(),
            &[0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0]
        );
    }

    #[test]
    fn test_buffer_lengths() {
        let mesh = Mesh::bake(&obj::parse_obj(TWO_MATERIALS), &library()).unwrap();
        for part in mesh.parts() {
            assert_eq!(part.vertex_buffer().len(), part.triangle_indices().len() * 4);
            assert_eq!(part.normal_data().len(), part.triangle_indices().len() * 3);
            assert!(part.vertex_buffer().chunks(4).all(|v| v[3] == 1.0));
        }
    }

    #[test]
    fn test_unresolved_material_fails_bake() {
        let result = Mesh::from_sources(TWO_MATERIALS, Some("newmtl Red\nKd 1 0 0\n"));
        assert_eq!(
            result,
            Err(BakeError::UnresolvedMaterial {
                name: "Blue".into()
            })
        );
    }

    #[test]
    fn test_vertex_out_of_range() {
        let result = Mesh::from_sources("v 0 0 0\nv 1 0 0\nf 1 2 3\n", None);
        assert_eq!(result, Err(BakeError::VertexOutOfRange { index: 2, len: 2 }));
    }

    #[test]
    fn test_empty_groups_are_dropped() {
        let mesh = Mesh::from_sources("usemtl Missing\nv 0 0 0\n", None).unwrap();
        assert!(mesh.parts().is_empty());
        assert_eq!(mesh.positions().len(), 1);
    }
}
