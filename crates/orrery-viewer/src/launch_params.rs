//! Launch parameter parsing for the viewer.
//!
//! On native, parameters are parsed from command-line arguments using clap.
//! On WASM, defaults are used (CLI argument parsing is not available).

use bevy::prelude::*;
use orrery::SceneDefinition;

/// Default number of background stars.
const DEFAULT_STARS: usize = 1500;
/// Default star field seed.
const DEFAULT_SEED: u64 = 7;

/// Launch parameters for the viewer.
#[derive(Resource, Debug)]
pub struct LaunchParams {
    /// Scene to explore.
    pub scene: SceneDefinition,
    /// Number of background stars.
    pub stars: usize,
    /// Seed for the star field.
    pub seed: u64,
}

impl Default for LaunchParams {
    fn default() -> Self {
        Self {
            scene: SceneDefinition::solar_system(),
            stars: DEFAULT_STARS,
            seed: DEFAULT_SEED,
        }
    }
}

/// Read and validate a JSON scene file.
#[cfg(not(target_family = "wasm"))]
fn load_scene(path: &std::path::Path) -> orrery::Result<SceneDefinition> {
    let failure = |message: String| orrery::Error::LoadFailure {
        asset: path.display().to_string(),
        message,
    };
    let text = std::fs::read_to_string(path).map_err(|e| failure(e.to_string()))?;
    let scene: SceneDefinition = serde_json::from_str(&text).map_err(|e| failure(e.to_string()))?;
    scene.validate()?;
    Ok(scene)
}

#[cfg(not(target_family = "wasm"))]
mod native {
    use std::path::PathBuf;

    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    #[command(about = "Explorable planetary system viewer")]
    struct CliArgs {
        /// Scene definition (JSON). Uses the built-in solar system if omitted.
        #[arg(long)]
        scene: Option<PathBuf>,

        /// Number of background stars.
        #[arg(long, default_value_t = DEFAULT_STARS)]
        stars: usize,

        /// Seed for the star field.
        #[arg(long, default_value_t = DEFAULT_SEED)]
        seed: u64,
    }

    pub fn parse() -> LaunchParams {
        let args = CliArgs::parse();
        let scene = match args.scene {
            Some(path) => match load_scene(&path) {
                Ok(scene) => {
                    tracing::info!("Loaded scene from {}", path.display());
                    scene
                }
                Err(e) => {
                    tracing::error!("{e}; falling back to the built-in scene");
                    SceneDefinition::solar_system()
                }
            },
            None => SceneDefinition::solar_system(),
        };
        LaunchParams {
            scene,
            stars: args.stars,
            seed: args.seed,
        }
    }
}

/// Parse launch parameters from CLI args (native) or use defaults (WASM).
pub fn parse() -> LaunchParams {
    #[cfg(not(target_family = "wasm"))]
    {
        native::parse()
    }
    #[cfg(target_family = "wasm")]
    {
        LaunchParams::default()
    }
}

#[cfg(all(test, not(target_family = "wasm")))]
mod tests {
    use super::*;

    #[test]
    fn test_missing_scene_file_is_load_failure() {
        let err = load_scene(std::path::Path::new("does/not/exist.json")).unwrap_err();
        assert!(matches!(err, orrery::Error::LoadFailure { .. }));
    }

    #[test]
    fn test_invalid_scene_file_rejected() {
        let path = std::env::temp_dir().join("orrery_viewer_invalid_scene.json");
        std::fs::write(
            &path,
            r#"{
                "bodies": [],
                "obstacles": [],
                "camera": { "position": [0.0, 0.0, 0.0], "target": [0.0, 0.0, 0.0] }
            }"#,
        )
        .unwrap();
        let err = load_scene(&path).unwrap_err();
        assert!(matches!(err, orrery::Error::InvalidScene { .. }));
        std::fs::remove_file(&path).ok();
    }
}
