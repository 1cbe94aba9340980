//! Shader programs: one vertex + one fragment WGSL stage linked together.
//!
//! Compilation happens on the CPU with naga before any device exists, so
//! every compile or link problem is reported at startup with a bounded
//! diagnostic instead of surfacing later as a device validation panic.
//!
//! Uniform locations are resolved by name path, e.g. `view`,
//! `material.shininess` or `light[1].specular`, into a buffer slot plus byte
//! offset computed from the shader's own type layout.

mod error;
mod link;
mod reflect;

pub use error::{ShaderError, ShaderStage, MAX_DIAGNOSTIC_LEN};
pub use reflect::{BindingKind, ReflectedBinding, UniformLocation};

/// A compiled and linked vertex/fragment pair.
pub struct ShaderProgram {
    vertex_source: String,
    fragment_source: String,
    vertex: naga::Module,
    fragment: naga::Module,
    vertex_entry: String,
    fragment_entry: String,
    bindings: Vec<ReflectedBinding>,
}

impl ShaderProgram {
    /// Compiles both stages and links them.
    pub fn compile(vertex_source: &str, fragment_source: &str) -> Result<Self, ShaderError> {
        let vertex = compile_stage(ShaderStage::Vertex, vertex_source)?;
        let fragment = compile_stage(ShaderStage::Fragment, fragment_source)?;

        let vs_entry = link::entry_point(&vertex, ShaderStage::Vertex).map_err(ShaderError::link)?;
        let fs_entry =
            link::entry_point(&fragment, ShaderStage::Fragment).map_err(ShaderError::link)?;

        link::check_interface(&vertex, vs_entry, &fragment, fs_entry).map_err(ShaderError::link)?;

        let vs_bindings =
            reflect::module_bindings(&vertex, ShaderStage::Vertex).map_err(ShaderError::link)?;
        let fs_bindings =
            reflect::module_bindings(&fragment, ShaderStage::Fragment).map_err(ShaderError::link)?;
        let bindings = link::merge_bindings(vs_bindings, fs_bindings).map_err(ShaderError::link)?;

        let vertex_entry = vs_entry.name.clone();
        let fragment_entry = fs_entry.name.clone();

        log::debug!(
            "linked shader program: entry points `{vertex_entry}`/`{fragment_entry}`, {} resource bindings",
            bindings.len()
        );

        Ok(Self {
            vertex_source: vertex_source.to_string(),
            fragment_source: fragment_source.to_string(),
            vertex,
            fragment,
            vertex_entry,
            fragment_entry,
            bindings,
        })
    }

    pub fn vertex_entry(&self) -> &str {
        &self.vertex_entry
    }

    pub fn fragment_entry(&self) -> &str {
        &self.fragment_entry
    }

    /// All resource bindings, ordered by (group, binding).
    pub fn bindings(&self) -> &[ReflectedBinding] {
        &self.bindings
    }

    /// Looks up a resource global by name.
    pub fn binding(&self, name: &str) -> Option<&ReflectedBinding> {
        self.bindings.iter().find(|b| b.name == name)
    }

    /// Number of bind groups the pipeline layout needs (highest group + 1).
    pub fn group_count(&self) -> u32 {
        self.bindings.iter().map(|b| b.group + 1).max().unwrap_or(0)
    }

    /// Resolves a uniform name path to its buffer slot and byte range.
    pub fn uniform_location(&self, path: &str) -> Result<UniformLocation, ShaderError> {
        let root_name = path.split(['.', '[']).next().unwrap_or_default();
        let root = self
            .binding(root_name)
            .ok_or_else(|| ShaderError::missing_uniform(path))?;

        let module = match root.owner {
            ShaderStage::Vertex => &self.vertex,
            ShaderStage::Fragment => &self.fragment,
        };

        reflect::resolve_path(module, root, path).ok_or_else(|| ShaderError::missing_uniform(path))
    }

    /// Checks the vertex stage's inputs against the buffers a pipeline will
    /// bind, so a mismatch is reported here instead of at pipeline creation.
    pub fn check_vertex_layouts(
        &self,
        layouts: &[wgpu::VertexBufferLayout<'_>],
    ) -> Result<(), ShaderError> {
        let entry = link::entry_point(&self.vertex, ShaderStage::Vertex).map_err(ShaderError::link)?;
        let attributes: Vec<wgpu::VertexAttribute> = layouts
            .iter()
            .flat_map(|layout| layout.attributes.iter().copied())
            .collect();
        link::check_vertex_inputs(&self.vertex, entry, &attributes).map_err(ShaderError::link)
    }

    /// Creates one bind group layout per group index, derived from reflection.
    pub fn create_bind_group_layouts(&self, device: &wgpu::Device) -> Vec<wgpu::BindGroupLayout> {
        (0..self.group_count())
            .map(|group| {
                let entries: Vec<wgpu::BindGroupLayoutEntry> = self
                    .bindings
                    .iter()
                    .filter(|b| b.group == group)
                    .map(ReflectedBinding::layout_entry)
                    .collect();

                let label = format!("spinlit program group {group}");
                device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some(&label),
                    entries: &entries,
                })
            })
            .collect()
    }

    /// Creates the vertex and fragment shader modules on `device`.
    pub fn create_modules(&self, device: &wgpu::Device) -> (wgpu::ShaderModule, wgpu::ShaderModule) {
        let vertex = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("spinlit vertex shader"),
            source: wgpu::ShaderSource::Wgsl(self.vertex_source.as_str().into()),
        });
        let fragment = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("spinlit fragment shader"),
            source: wgpu::ShaderSource::Wgsl(self.fragment_source.as_str().into()),
        });
        (vertex, fragment)
    }
}

fn compile_stage(stage: ShaderStage, source: &str) -> Result<naga::Module, ShaderError> {
    let module = naga::front::wgsl::parse_str(source)
        .map_err(|e| ShaderError::compile(stage, e.emit_to_string(source)))?;

    // Only what every wgpu device offers without optional features.
    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::default(),
    )
    .validate(&module)
    .map_err(|e| ShaderError::compile(stage, error_chain(&e)))?;

    Ok(module)
}

/// Flattens an error and its sources into one line.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(e) = source {
        out.push_str(": ");
        out.push_str(&e.to_string());
        source = e.source();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const VS: &str = r#"
struct Light {
    position: vec3<f32>,
    ambient: vec3<f32>,
}

struct VsOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) uv: vec2<f32>,
}

@group(0) @binding(0) var<uniform> model: mat4x4<f32>;
@group(0) @binding(1) var<uniform> light: array<Light, 2>;

@vertex
fn vs_main(@location(0) position: vec3<f32>) -> VsOut {
    var out: VsOut;
    out.clip = model * vec4<f32>(position + light[0].position, 1.0);
    out.uv = position.xy;
    return out;
}
"#;

    const FS: &str = r#"
struct Material {
    tint: vec3<f32>,
    shininess: f32,
}

@group(1) @binding(0) var<uniform> material: Material;
@group(1) @binding(1) var albedo: texture_2d<f32>;
@group(1) @binding(2) var albedo_sampler: sampler;

@fragment
fn fs_main(@location(0) uv: vec2<f32>) -> @location(0) vec4<f32> {
    let texel = textureSample(albedo, albedo_sampler, uv);
    return vec4<f32>(texel.rgb * material.tint * material.shininess, 1.0);
}
"#;

    fn program() -> ShaderProgram {
        match ShaderProgram::compile(VS, FS) {
            Ok(p) => p,
            Err(e) => panic!("{e}"),
        }
    }

    #[test]
    fn compiles_and_links() {
        let p = program();
        assert_eq!(p.vertex_entry(), "vs_main");
        assert_eq!(p.fragment_entry(), "fs_main");
        assert_eq!(p.group_count(), 2);
        assert_eq!(p.bindings().len(), 5);
    }

    #[test]
    fn reflects_binding_kinds() {
        let p = program();
        assert_eq!(p.binding("model").map(|b| b.kind), Some(BindingKind::Uniform { size: 64 }));
        assert_eq!(p.binding("albedo").map(|b| b.kind), Some(BindingKind::Texture));
        assert_eq!(p.binding("albedo_sampler").map(|b| b.kind), Some(BindingKind::Sampler));
        assert_eq!(
            p.binding("model").map(|b| b.visibility),
            Some(wgpu::ShaderStages::VERTEX)
        );
    }

    #[test]
    fn resolves_array_of_struct_members() {
        let p = program();
        // Light: position @0, ambient @16, size 32 (vec3 aligns to 16).
        let loc = p.uniform_location("light[1].ambient").unwrap();
        assert_eq!(
            loc,
            UniformLocation { group: 0, binding: 1, offset: 48, size: 12 }
        );
        assert_eq!(p.uniform_location("light[0].position").unwrap().offset, 0);
        assert_eq!(p.uniform_location("light").unwrap().size, 64);
    }

    #[test]
    fn resolves_struct_member_after_vec3() {
        let p = program();
        let loc = p.uniform_location("material.shininess").unwrap();
        assert_eq!(loc.group, 1);
        assert_eq!(loc.offset, 12);
        assert_eq!(loc.size, 4);
    }

    #[test]
    fn unknown_paths_are_missing_uniforms() {
        let p = program();
        for path in ["projection", "light[2].ambient", "light[0].colour", "material.tint.x"] {
            assert_eq!(
                p.uniform_location(path),
                Err(ShaderError::MissingUniform { name: path.to_string() }),
                "{path}"
            );
        }
    }

    const POSITION_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

    fn position_layout(attributes: &[wgpu::VertexAttribute]) -> wgpu::VertexBufferLayout<'_> {
        wgpu::VertexBufferLayout {
            array_stride: 12,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes,
        }
    }

    #[test]
    fn vertex_inputs_match_buffer_layout() {
        assert_eq!(program().check_vertex_layouts(&[position_layout(&POSITION_ATTRS)]), Ok(()));
    }

    #[test]
    fn unfed_vertex_input_fails_to_link() {
        let vs = VS.replace(
            "fn vs_main(@location(0) position: vec3<f32>)",
            "fn vs_main(@location(0) position: vec3<f32>, @location(5) extra: vec4<f32>)",
        );
        let p = ShaderProgram::compile(&vs, FS).unwrap();
        match p.check_vertex_layouts(&[position_layout(&POSITION_ATTRS)]) {
            Err(ShaderError::Link { diagnostic }) => assert!(diagnostic.contains("location 5"), "{diagnostic}"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn integer_input_cannot_read_float_buffer() {
        let vs = VS
            .replace("@location(0) position: vec3<f32>", "@location(0) position: vec3<u32>")
            .replace("position + light[0].position", "vec3<f32>(position) + light[0].position")
            .replace("out.uv = position.xy;", "out.uv = vec2<f32>(position.xy);");
        let p = ShaderProgram::compile(&vs, FS).unwrap();
        assert!(matches!(
            p.check_vertex_layouts(&[position_layout(&POSITION_ATTRS)]),
            Err(ShaderError::Link { .. })
        ));
    }

    #[test]
    fn syntax_error_reports_stage() {
        let broken = VS.replace("return out;", "return out");
        match ShaderProgram::compile(&broken, FS) {
            Err(ShaderError::Compile { stage, diagnostic }) => {
                assert_eq!(stage, ShaderStage::Vertex);
                assert!(!diagnostic.is_empty());
                assert!(diagnostic.len() <= MAX_DIAGNOSTIC_LEN);
            }
            other => panic!("unexpected result: {:?}", other.err()),
        }
    }

    #[test]
    fn validation_error_is_a_compile_error() {
        // Type mismatch: vec3 * f32 assigned to vec4.
        let broken = FS.replace("texel.rgb * material.tint", "texel * material.tint");
        assert!(matches!(
            ShaderProgram::compile(VS, &broken),
            Err(ShaderError::Compile { stage: ShaderStage::Fragment, .. })
        ));
    }

    #[test]
    fn unwritten_fragment_input_fails_to_link() {
        let broken = FS.replace("@location(0) uv: vec2<f32>", "@location(3) uv: vec2<f32>");
        assert!(matches!(
            ShaderProgram::compile(VS, &broken),
            Err(ShaderError::Link { .. })
        ));
    }

    #[test]
    fn mismatched_interface_type_fails_to_link() {
        let broken = FS
            .replace("@location(0) uv: vec2<f32>", "@location(0) uv: vec3<f32>")
            .replace("albedo_sampler, uv)", "albedo_sampler, uv.xy)");
        assert!(matches!(
            ShaderProgram::compile(VS, &broken),
            Err(ShaderError::Link { .. })
        ));
    }

    #[test]
    fn missing_entry_point_fails_to_link() {
        let no_fragment = "fn helper() -> f32 { return 1.0; }";
        assert!(matches!(
            ShaderProgram::compile(VS, no_fragment),
            Err(ShaderError::Link { .. })
        ));
    }

    #[test]
    fn conflicting_slots_fail_to_link() {
        let clash = FS.replace(
            "@group(1) @binding(0) var<uniform> material",
            "@group(0) @binding(0) var<uniform> material",
        );
        assert!(matches!(
            ShaderProgram::compile(VS, &clash),
            Err(ShaderError::Link { .. })
        ));
    }
}
