//! Resource reflection over compiled naga modules.

use naga::{AddressSpace, ArraySize, Handle, ImageClass, ImageDimension, Module, ScalarKind, Type, TypeInner};

use super::ShaderStage;

/// What a resource binding holds.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BindingKind {
    /// Uniform buffer of `size` bytes (host-shareable layout).
    Uniform { size: u32 },
    /// Sampled 2D float texture.
    Texture,
    /// Filtering sampler.
    Sampler,
}

/// A resource global declared by one or both stages.
#[derive(Debug, Clone)]
pub struct ReflectedBinding {
    pub name: String,
    pub group: u32,
    pub binding: u32,
    pub kind: BindingKind,
    pub visibility: wgpu::ShaderStages,

    /// Stage whose module owns `ty`.
    pub(super) owner: ShaderStage,
    pub(super) ty: Handle<Type>,
}

impl ReflectedBinding {
    pub(super) fn layout_entry(&self) -> wgpu::BindGroupLayoutEntry {
        let ty = match self.kind {
            BindingKind::Uniform { size } => wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: std::num::NonZeroU64::new(u64::from(size)),
            },
            BindingKind::Texture => wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            BindingKind::Sampler => wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        };

        wgpu::BindGroupLayoutEntry {
            binding: self.binding,
            visibility: self.visibility,
            ty,
            count: None,
        }
    }
}

/// Byte range of a (possibly nested) uniform member inside its buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct UniformLocation {
    pub group: u32,
    pub binding: u32,
    pub offset: u32,
    pub size: u32,
}

/// Collects the resource globals of `module`.
pub(super) fn module_bindings(module: &Module, stage: ShaderStage) -> Result<Vec<ReflectedBinding>, String> {
    let mut out = Vec::new();

    for (handle, global) in module.global_variables.iter() {
        let Some(res) = &global.binding else { continue };

        let name = global
            .name
            .clone()
            .ok_or_else(|| format!("{stage} stage: resource {handle:?} has no name"))?;

        let inner = &module.types[global.ty].inner;
        let kind = match (global.space, inner) {
            (AddressSpace::Uniform, _) => BindingKind::Uniform {
                size: inner.size(module.to_ctx()),
            },
            (
                AddressSpace::Handle,
                TypeInner::Image {
                    dim: ImageDimension::D2,
                    arrayed: false,
                    class: ImageClass::Sampled { kind: ScalarKind::Float, multi: false },
                },
            ) => BindingKind::Texture,
            (AddressSpace::Handle, TypeInner::Sampler { comparison: false }) => BindingKind::Sampler,
            _ => {
                return Err(format!(
                    "{stage} stage: `{name}` (group {}, binding {}) is not a uniform buffer, \
                     2D float texture or filtering sampler",
                    res.group, res.binding
                ));
            }
        };

        out.push(ReflectedBinding {
            name,
            group: res.group,
            binding: res.binding,
            kind,
            visibility: stage.visibility(),
            owner: stage,
            ty: global.ty,
        });
    }

    Ok(out)
}

/// Resolves `path` (e.g. `light[1].specular`) below `root`.
///
/// The first segment must be the global's own name.
pub(super) fn resolve_path(module: &Module, root: &ReflectedBinding, path: &str) -> Option<UniformLocation> {
    let mut segments = path.split('.');
    let (name, indices) = parse_segment(segments.next()?)?;
    if name != root.name {
        return None;
    }

    let mut ty = root.ty;
    let mut offset = 0u32;
    for index in indices {
        let (next, delta) = step_index(module, ty, index)?;
        ty = next;
        offset += delta;
    }

    for segment in segments {
        let (member, indices) = parse_segment(segment)?;
        let (next, delta) = step_member(module, ty, member)?;
        ty = next;
        offset += delta;
        for index in indices {
            let (next, delta) = step_index(module, ty, index)?;
            ty = next;
            offset += delta;
        }
    }

    let size = match root.kind {
        BindingKind::Uniform { .. } => module.types[ty].inner.size(module.to_ctx()),
        BindingKind::Texture | BindingKind::Sampler => 0,
    };

    Some(UniformLocation {
        group: root.group,
        binding: root.binding,
        offset,
        size,
    })
}

/// Splits `name[1][2]` into `("name", [1, 2])`.
fn parse_segment(segment: &str) -> Option<(&str, Vec<u32>)> {
    let (name, mut rest) = match segment.find('[') {
        Some(i) => segment.split_at(i),
        None => (segment, ""),
    };
    if name.is_empty() {
        return None;
    }

    let mut indices = Vec::new();
    while !rest.is_empty() {
        let inner = rest.strip_prefix('[')?;
        let close = inner.find(']')?;
        indices.push(inner[..close].trim().parse().ok()?);
        rest = &inner[close + 1..];
    }

    Some((name, indices))
}

fn step_index(module: &Module, ty: Handle<Type>, index: u32) -> Option<(Handle<Type>, u32)> {
    match &module.types[ty].inner {
        TypeInner::Array { base, size: ArraySize::Constant(len), stride } if index < len.get() => {
            Some((*base, index * stride))
        }
        _ => None,
    }
}

fn step_member(module: &Module, ty: Handle<Type>, name: &str) -> Option<(Handle<Type>, u32)> {
    match &module.types[ty].inner {
        TypeInner::Struct { members, .. } => members
            .iter()
            .find(|m| m.name.as_deref() == Some(name))
            .map(|m| (m.ty, m.offset)),
        _ => None,
    }
}
