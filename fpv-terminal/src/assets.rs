/// Asset loading from disk plus the built-in demo scene
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use fpv_core::{
    mtl, parse_obj, Camera, CameraConfig, Entity, MaterialLibrary, Mesh, Scene, Vector3, Viewer,
};

pub const DEMO_CUBE_OBJ: &str = "\
# Two-tone cube, 1 unit wide
mtllib demo.mtl
o Cube
v -0.5 -0.5 0.5
v 0.5 -0.5 0.5
v 0.5 0.5 0.5
v -0.5 0.5 0.5
v -0.5 -0.5 -0.5
v 0.5 -0.5 -0.5
v 0.5 0.5 -0.5
v -0.5 0.5 -0.5
vn 0 0 1
vn 0 0 -1
vn 0 1 0
vn 0 -1 0
vn 1 0 0
vn -1 0 0
usemtl Sides
f 1//1 2//1 3//1 4//1
f 6//2 5//2 8//2 7//2
f 2//5 6//5 7//5 3//5
f 5//6 1//6 4//6 8//6
usemtl Caps
f 4//3 3//3 7//3 8//3
f 5//4 6//4 2//4 1//4
";

pub const DEMO_FLOOR_OBJ: &str = "\
o Floor
v -6 0 -6
v 6 0 -6
v 6 0 6
v -6 0 6
vn 0 1 0
usemtl Floor
f 1//1 2//1 3//1 4//1
";

pub const DEMO_MTL: &str = "\
newmtl Sides
Kd 0.9 0.45 0.1
newmtl Caps
Kd 0.2 0.6 0.95
newmtl Floor
Kd 0.55 0.55 0.55
";

/// Radians per second the demo cube spins around y
const DEMO_SPIN: f32 = 0.8;

/// Read and bake an OBJ file.
///
/// Without an explicit material file, the file named by `mtllib` next to the
/// model is used when it exists.
pub fn load_model(path: &Path, materials: Option<&Path>) -> Result<Mesh> {
    let obj_text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read model file {}", path.display()))?;

    let mtl_path: Option<PathBuf> = match materials {
        Some(p) => Some(p.to_path_buf()),
        None => mtl::mtllib_reference(&obj_text)
            .map(|name| path.with_file_name(name))
            .filter(|p| p.exists()),
    };

    let library = match &mtl_path {
        Some(p) => {
            let text = fs::read_to_string(p)
                .with_context(|| format!("Failed to read material file {}", p.display()))?;
            log::info!("Loading materials from {}", p.display());
            MaterialLibrary::parse(&text).0
        }
        None => MaterialLibrary::new(),
    };

    Mesh::bake(&parse_obj(&obj_text), &library)
        .with_context(|| format!("Failed to bake {}", path.display()))
}

/// Floor plus either the given model or a spinning demo cube, viewed by a
/// player at the origin and a projector looking down from behind
pub fn build_viewer(model: Option<Mesh>, scale: f32, config: CameraConfig) -> Result<Viewer> {
    let floor = Mesh::from_sources(DEMO_FLOOR_OBJ, Some(DEMO_MTL)).context("Demo floor")?;

    let mut scene = Scene::new();
    scene.add_entity(Entity::new(Arc::new(floor)));

    match model {
        Some(mesh) => {
            scene.add_entity(
                Entity::new(Arc::new(mesh))
                    .with_position(Vector3::new(0.0, 0.0, -4.0))
                    .with_scale(scale),
            );
        }
        None => {
            let cube = Mesh::from_sources(DEMO_CUBE_OBJ, Some(DEMO_MTL)).context("Demo cube")?;
            let index = scene.add_entity(
                Entity::new(Arc::new(cube))
                    .with_position(Vector3::new(0.0, 1.2, -4.0))
                    .with_scale(scale),
            );
            scene.add_script(move |entities, dt| {
                let spin = DEMO_SPIN * dt.as_secs_f32();
                entities[index].rotation.rotate(spin * 0.5, spin, 0.0);
            });
        }
    }

    let projector = Camera::projector(config.clone(), Vector3::new(0.0, 1.5, 3.0), 0.35, 0.0);
    Ok(Viewer::new(Camera::player(config), projector, scene))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_demo_assets_bake() {
        let cube = Mesh::from_sources(DEMO_CUBE_OBJ, Some(DEMO_MTL)).unwrap();
        assert_eq!(cube.parts().len(), 2);
        assert_eq!(cube.part("Sides").unwrap().triangle_count(), 8);
        assert_eq!(cube.part("Caps").unwrap().triangle_count(), 4);
        assert_eq!(cube.triangle_count(), 12);
    }

    #[test]
    fn test_demo_cube_spins() {
        let mut viewer = build_viewer(None, 1.0, CameraConfig::default()).unwrap();
        assert_eq!(viewer.scene.entities().len(), 2);
        viewer.scene.update(Duration::from_millis(500));
        assert!((viewer.scene.entities()[1].rotation.y - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_load_model_uses_mtllib() {
        let dir = std::env::temp_dir().join(format!("fpv-assets-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("demo.mtl"), DEMO_MTL).unwrap();
        fs::write(dir.join("cube.obj"), DEMO_CUBE_OBJ).unwrap();

        let mesh = load_model(&dir.join("cube.obj"), None).unwrap();
        assert_eq!(mesh.parts().len(), 2);

        // Without the material file the named materials cannot resolve.
        fs::remove_file(dir.join("demo.mtl")).unwrap();
        assert!(load_model(&dir.join("cube.obj"), None).is_err());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_model_reports_path() {
        let err = load_model(Path::new("/definitely/not/here.obj"), None).unwrap_err();
        assert!(err.to_string().contains("here.obj"));
    }
}
