mod app;
mod args;
mod geometry;
mod locations;
mod renderer;
mod scene;
mod shaders;
mod transform;

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;

use spinlit_engine::device::GpuInit;
use spinlit_engine::logging::{init_logging, LoggingConfig};
use spinlit_engine::render::{ShaderProgram, TextureImage};
use spinlit_engine::window::{Runtime, RuntimeConfig};

use crate::app::{SceneAssets, SpinningApp};
use crate::args::{Command, DemoConfig};
use crate::locations::UniformLocations;

fn main() -> ExitCode {
    let command = args::parse(std::env::args_os().skip(1).collect());

    let log_filter = match &command {
        Ok(Command::Run(config)) => config.log_filter.clone(),
        _ => None,
    };
    init_logging(LoggingConfig {
        env_filter: log_filter,
        ..Default::default()
    });

    let result = match command {
        Ok(Command::Help) => {
            print!("{}", args::USAGE);
            Ok(())
        }
        Ok(Command::Run(config)) => run(config),
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: DemoConfig) -> Result<()> {
    let vertex = shaders::load(config.vertex_shader.as_deref(), shaders::VERTEX_SHADER)?;
    let fragment = shaders::load(config.fragment_shader.as_deref(), shaders::FRAGMENT_SHADER)?;

    let program = ShaderProgram::compile(&vertex, &fragment)?;
    renderer::check_vertex_inputs(&program)?;
    let locations = UniformLocations::resolve(&program)?;

    // The shaders do their own lighting in linear space; present without an
    // extra sRGB encode.
    let gpu_init = GpuInit {
        prefer_srgb: false,
        ..Default::default()
    };
    let max_texture = gpu_init.required_limits.max_texture_dimension_2d;

    let assets = SceneAssets {
        program,
        locations,
        diffuse: load_texture(&config.diffuse, max_texture, [255, 255, 255, 255]),
        specular: load_texture(&config.specular, max_texture, [0, 0, 0, 255]),
        normals: config.normals,
    };

    Runtime::run(RuntimeConfig::default(), gpu_init, SpinningApp::new(assets))
}

/// Decodes `path`, or logs why it could not be used and returns a one-texel
/// `fallback`.
fn load_texture(path: &Path, max_dimension: u32, fallback: [u8; 4]) -> TextureImage {
    let image = TextureImage::decode(path).and_then(|image| {
        image.check_fits(max_dimension)?;
        Ok(image)
    });
    match image {
        Ok(image) => image,
        Err(e) => {
            log::error!("{e}; using a placeholder for '{}'", path.display());
            TextureImage::solid(fallback)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_texture_falls_back_to_placeholder() {
        let path = std::env::temp_dir().join("spinlit-oversized-texture.png");
        image::RgbaImage::from_pixel(16, 4, image::Rgba([9, 9, 9, 255]))
            .save(&path)
            .unwrap();

        let fitted = load_texture(&path, 16, [1, 2, 3, 4]);
        let clamped = load_texture(&path, 8, [1, 2, 3, 4]);
        let _ = std::fs::remove_file(&path);

        assert_eq!((fitted.width, fitted.height), (16, 4));
        assert_eq!((clamped.width, clamped.height), (1, 1));
        assert_eq!(clamped.levels[0], vec![1, 2, 3, 4]);
    }

    #[test]
    fn missing_texture_falls_back_to_placeholder() {
        let tex = load_texture(Path::new("no/such/texture.png"), 8192, [0, 0, 0, 255]);
        assert_eq!(tex.levels, vec![vec![0, 0, 0, 255]]);
    }
}
