//! Uniform locations and texture slots resolved once from the shader program.

use anyhow::{anyhow, bail, Result};
use spinlit_engine::render::program::{BindingKind, ShaderProgram, UniformLocation};

use crate::scene::NUM_LIGHTS;

/// Bind group holding view/projection, camera, lights and material.
pub const FRAME_GROUP: u32 = 0;
/// Bind group holding one drawable's model and normal matrix.
pub const OBJECT_GROUP: u32 = 1;
/// Bind group holding the material textures and their sampler.
pub const MATERIAL_GROUP: u32 = 2;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LightLocations {
    pub position: UniformLocation,
    pub ambient: UniformLocation,
    pub diffuse: UniformLocation,
    pub specular: UniformLocation,
}

impl LightLocations {
    fn resolve(program: &ShaderProgram, index: usize) -> Result<Self> {
        let field = |name: &str| uniform_in(program, &format!("light[{index}].{name}"), FRAME_GROUP);
        Ok(Self {
            position: field("position")?,
            ambient: field("ambient")?,
            diffuse: field("diffuse")?,
            specular: field("specular")?,
        })
    }
}

/// Binding indices of the material textures inside [`MATERIAL_GROUP`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MaterialSlots {
    pub diffuse: u32,
    pub specular: u32,
    pub sampler: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformLocations {
    pub model: UniformLocation,
    pub normal_matrix: UniformLocation,
    pub view: UniformLocation,
    pub projection: UniformLocation,
    pub view_pos: UniformLocation,
    pub lights: [LightLocations; NUM_LIGHTS],
    pub shininess: UniformLocation,
    pub material: MaterialSlots,
}

impl UniformLocations {
    /// Resolves every uniform the demo writes. Anything missing, or placed in
    /// a different bind group than the renderer expects, is an error.
    pub fn resolve(program: &ShaderProgram) -> Result<Self> {
        let lights: Vec<LightLocations> = (0..NUM_LIGHTS)
            .map(|i| LightLocations::resolve(program, i))
            .collect::<Result<_>>()?;
        let lights: [LightLocations; NUM_LIGHTS] = lights
            .try_into()
            .map_err(|_| anyhow!("expected {NUM_LIGHTS} light records"))?;

        Ok(Self {
            model: uniform_in(program, "model", OBJECT_GROUP)?,
            normal_matrix: uniform_in(program, "normal_matrix", OBJECT_GROUP)?,
            view: uniform_in(program, "view", FRAME_GROUP)?,
            projection: uniform_in(program, "projection", FRAME_GROUP)?,
            view_pos: uniform_in(program, "view_pos", FRAME_GROUP)?,
            lights,
            shininess: uniform_in(program, "material.shininess", FRAME_GROUP)?,
            material: MaterialSlots {
                diffuse: slot_in(program, "material_diffuse", BindingKind::Texture)?,
                specular: slot_in(program, "material_specular", BindingKind::Texture)?,
                sampler: slot_in(program, "material_sampler", BindingKind::Sampler)?,
            },
        })
    }
}

fn uniform_in(program: &ShaderProgram, path: &str, group: u32) -> Result<UniformLocation> {
    let loc = program.uniform_location(path)?;
    if loc.group != group {
        bail!("uniform `{path}` is in bind group {}, expected {group}", loc.group);
    }
    Ok(loc)
}

fn slot_in(program: &ShaderProgram, name: &str, kind: BindingKind) -> Result<u32> {
    let Some(b) = program.binding(name) else {
        bail!("`{name}` is not declared by the shader program");
    };
    if b.kind != kind {
        bail!("`{name}` is a {:?}, expected a {kind:?}", b.kind);
    }
    if b.group != MATERIAL_GROUP {
        bail!("`{name}` is in bind group {}, expected {MATERIAL_GROUP}", b.group);
    }
    Ok(b.binding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shaders::{FRAGMENT_SHADER, VERTEX_SHADER};

    fn shipped() -> ShaderProgram {
        match ShaderProgram::compile(VERTEX_SHADER, FRAGMENT_SHADER) {
            Ok(p) => p,
            Err(e) => panic!("shipped shaders failed to build: {e}"),
        }
    }

    #[test]
    fn shipped_shaders_resolve() {
        let locs = UniformLocations::resolve(&shipped()).unwrap();

        assert_eq!((locs.model.group, locs.model.binding, locs.model.size), (1, 0, 64));
        assert_eq!(locs.normal_matrix.size, 48);
        assert_eq!(locs.view_pos.size, 12);
        assert_eq!(
            locs.material,
            MaterialSlots { diffuse: 0, specular: 1, sampler: 2 }
        );
        assert_eq!((locs.shininess.offset, locs.shininess.size), (0, 4));
    }

    #[test]
    fn light_records_are_laid_out_in_order() {
        let locs = UniformLocations::resolve(&shipped()).unwrap();

        for (i, light) in locs.lights.iter().enumerate() {
            let base = 64 * i as u32;
            assert_eq!(light.position.offset, base);
            assert_eq!(light.ambient.offset, base + 16);
            assert_eq!(light.diffuse.offset, base + 32);
            assert_eq!(light.specular.offset, base + 48);
            assert_eq!(light.specular.size, 12);
        }
    }

    #[test]
    fn misplaced_uniform_is_rejected() {
        let vs = VERTEX_SHADER.replace(
            "@group(1) @binding(0) var<uniform> model",
            "@group(0) @binding(5) var<uniform> model",
        );
        let program = ShaderProgram::compile(&vs, FRAGMENT_SHADER).unwrap();
        let err = UniformLocations::resolve(&program).unwrap_err();
        assert!(err.to_string().contains("`model`"), "{err}");
    }

    #[test]
    fn missing_light_field_is_rejected() {
        let fs = FRAGMENT_SHADER
            .replace("    specular: vec3<f32>,\n};", "};")
            .replace("        color += l.specular * spec * specular_map;\n", "");
        let program = ShaderProgram::compile(VERTEX_SHADER, &fs).unwrap();
        let err = UniformLocations::resolve(&program).unwrap_err();
        assert!(err.to_string().contains("light[0].specular"), "{err}");
    }
}
