//! Command line parsing.

use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use crate::geometry::NormalSource;

pub const USAGE: &str = "\
spinlit: a spinning cube and tetrahedron lit by two point lights

USAGE:
    spinlit [OPTIONS]

OPTIONS:
    --vertex-shader PATH     WGSL vertex shader (default: built-in)
    --fragment-shader PATH   WGSL fragment shader (default: built-in)
    --diffuse PATH           diffuse map [default: texture.png]
    --specular PATH          specular map [default: texture_specular.png]
    --legacy-normals         feed vertex positions into the normal attribute
    --log FILTER             log filter, overrides RUST_LOG
    -h, --help               print this help
";

/// Startup configuration of the demo.
#[derive(Debug, Clone, PartialEq)]
pub struct DemoConfig {
    /// `None` selects the shader shipped with the binary.
    pub vertex_shader: Option<PathBuf>,
    pub fragment_shader: Option<PathBuf>,
    pub diffuse: PathBuf,
    pub specular: PathBuf,
    pub normals: NormalSource,
    pub log_filter: Option<String>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            vertex_shader: None,
            fragment_shader: None,
            diffuse: PathBuf::from("texture.png"),
            specular: PathBuf::from("texture_specular.png"),
            normals: NormalSource::FaceGeometry,
            log_filter: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Run(DemoConfig),
    Help,
}

/// Parses the arguments following the program name.
pub fn parse(args: Vec<OsString>) -> Result<Command> {
    let mut args = pico_args::Arguments::from_vec(args);

    if args.contains(["-h", "--help"]) {
        return Ok(Command::Help);
    }

    let defaults = DemoConfig::default();
    let config = DemoConfig {
        vertex_shader: args
            .opt_value_from_str("--vertex-shader")
            .context("invalid --vertex-shader")?,
        fragment_shader: args
            .opt_value_from_str("--fragment-shader")
            .context("invalid --fragment-shader")?,
        diffuse: args
            .opt_value_from_str("--diffuse")
            .context("invalid --diffuse")?
            .unwrap_or(defaults.diffuse),
        specular: args
            .opt_value_from_str("--specular")
            .context("invalid --specular")?
            .unwrap_or(defaults.specular),
        normals: if args.contains("--legacy-normals") {
            NormalSource::PositionAlias
        } else {
            NormalSource::FaceGeometry
        },
        log_filter: args.opt_value_from_str("--log").context("invalid --log")?,
    };

    let rest = args.finish();
    if !rest.is_empty() {
        bail!("unexpected arguments: {rest:?}\n\n{USAGE}");
    }

    Ok(Command::Run(config))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_strs(args: &[&str]) -> Result<Command> {
        parse(args.iter().map(OsString::from).collect())
    }

    #[test]
    fn no_arguments_gives_defaults() {
        assert_eq!(parse_strs(&[]).unwrap(), Command::Run(DemoConfig::default()));
    }

    #[test]
    fn help_wins() {
        assert_eq!(parse_strs(&["--diffuse", "a.png", "-h"]).unwrap(), Command::Help);
        assert_eq!(parse_strs(&["--help"]).unwrap(), Command::Help);
    }

    #[test]
    fn all_options() {
        let cmd = parse_strs(&[
            "--vertex-shader",
            "v.wgsl",
            "--fragment-shader",
            "f.wgsl",
            "--diffuse",
            "d.jpg",
            "--specular",
            "s.jpg",
            "--legacy-normals",
            "--log",
            "debug",
        ])
        .unwrap();

        assert_eq!(
            cmd,
            Command::Run(DemoConfig {
                vertex_shader: Some("v.wgsl".into()),
                fragment_shader: Some("f.wgsl".into()),
                diffuse: "d.jpg".into(),
                specular: "s.jpg".into(),
                normals: NormalSource::PositionAlias,
                log_filter: Some("debug".into()),
            })
        );
    }

    #[test]
    fn unknown_argument_is_an_error() {
        let err = parse_strs(&["--wireframe"]).unwrap_err();
        assert!(err.to_string().contains("--wireframe"));
    }

    #[test]
    fn missing_value_is_an_error() {
        assert!(parse_strs(&["--diffuse"]).is_err());
    }
}
