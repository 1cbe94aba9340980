//! Shader sources: the pair shipped with the binary, or files given on the
//! command line.

use std::borrow::Cow;
use std::path::Path;

use anyhow::{Context, Result};

pub const VERTEX_SHADER: &str = include_str!("../shaders/spinningcube.vert.wgsl");
pub const FRAGMENT_SHADER: &str = include_str!("../shaders/spinningcube.frag.wgsl");

/// Reads `path`, or falls back to `builtin` when no path was given.
pub fn load(path: Option<&Path>, builtin: &'static str) -> Result<Cow<'static, str>> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .map(Cow::Owned)
            .with_context(|| format!("failed to read shader source '{}'", path.display())),
        None => Ok(Cow::Borrowed(builtin)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_when_no_path() {
        let src = load(None, VERTEX_SHADER).unwrap();
        assert!(src.contains("@vertex"));
    }

    #[test]
    fn unreadable_file_names_the_path() {
        let err = load(Some(Path::new("no/such/shader.wgsl")), VERTEX_SHADER).unwrap_err();
        assert!(err.to_string().contains("no/such/shader.wgsl"));
    }
}
