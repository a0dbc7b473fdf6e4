/// FPV Terminal Viewer
///
/// Usage: fpv-terminal [model.obj] [--mtl file.mtl] [--scale s] [--fps n]
///
/// Without a model a spinning demo cube is shown.
/// Controls:
///   - Click / Enter: capture input, Esc: release
///   - WASD: Move, Shift: Run, Space: Jump
///   - Mouse / Arrow Keys: Look
///   - V: Toggle player/projector view
///   - Q: Quit
use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use fpv_core::CameraConfig;
use fpv_terminal::{assets, TerminalApp};

#[derive(Debug, PartialEq)]
struct TerminalOptions {
    model: Option<PathBuf>,
    materials: Option<PathBuf>,
    scale: f32,
    target_fps: u32,
}

impl Default for TerminalOptions {
    fn default() -> Self {
        Self {
            model: None,
            materials: None,
            scale: 1.0,
            target_fps: 30,
        }
    }
}

impl TerminalOptions {
    fn parse<I: Iterator<Item = String>>(mut args: I) -> Result<Self> {
        let mut options = Self::default();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--mtl" => {
                    let value = args.next().context("--mtl needs a path")?;
                    options.materials = Some(PathBuf::from(value));
                }
                "--scale" => {
                    let value = args.next().context("--scale needs a number")?;
                    options.scale = value
                        .parse()
                        .with_context(|| format!("Invalid scale '{}'", value))?;
                }
                "--fps" => {
                    let value = args.next().context("--fps needs a number")?;
                    options.target_fps = value
                        .parse()
                        .with_context(|| format!("Invalid frame rate '{}'", value))?;
                }
                flag if flag.starts_with("--") => bail!("Unknown option '{}'", flag),
                path => {
                    if options.model.is_some() {
                        bail!("Only one model path may be given");
                    }
                    options.model = Some(PathBuf::from(path));
                }
            }
        }
        Ok(options)
    }
}

fn main() -> Result<()> {
    if let Err(e) = env_logger::try_init() {
        eprintln!("Logger already initialized: {}", e);
    }

    let options = TerminalOptions::parse(env::args().skip(1))?;

    let model = match &options.model {
        Some(path) => {
            println!("Loading model: {}", path.display());
            let mesh = assets::load_model(path, options.materials.as_deref())?;
            println!(
                "Loaded {} triangles in {} parts",
                mesh.triangle_count(),
                mesh.parts().len()
            );
            Some(mesh)
        }
        None => None,
    };

    let viewer = assets::build_viewer(model, options.scale, CameraConfig::default())?;

    println!("Starting terminal viewer (press Q to quit)...");
    std::thread::sleep(std::time::Duration::from_secs(1));

    let mut app = TerminalApp::new(viewer, options.target_fps)?;
    app.run()?;

    println!("Thank you for using the FPV terminal viewer!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<TerminalOptions> {
        TerminalOptions::parse(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_defaults() {
        assert_eq!(parse(&[]).unwrap(), TerminalOptions::default());
    }

    #[test]
    fn test_all_options() {
        let options = parse(&[
            "room.obj", "--mtl", "room.mtl", "--scale", "0.5", "--fps", "60",
        ])
        .unwrap();
        assert_eq!(options.model, Some(PathBuf::from("room.obj")));
        assert_eq!(options.materials, Some(PathBuf::from("room.mtl")));
        assert_eq!(options.scale, 0.5);
        assert_eq!(options.target_fps, 60);
    }

    #[test]
    fn test_bad_options() {
        assert!(parse(&["--scale"]).is_err());
        assert!(parse(&["--scale", "big"]).is_err());
        assert!(parse(&["--wat"]).is_err());
        assert!(parse(&["a.obj", "b.obj"]).is_err());
    }
}
