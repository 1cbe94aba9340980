//! Cross-stage checks performed when two compiled stages become one program.

use naga::{Binding, EntryPoint, Handle, Module, ScalarKind, Type, TypeInner};

use super::reflect::ReflectedBinding;
use super::ShaderStage;

/// Returns the first entry point of `stage` in `module`.
pub(super) fn entry_point(module: &Module, stage: ShaderStage) -> Result<&EntryPoint, String> {
    module
        .entry_points
        .iter()
        .find(|ep| ep.stage == stage.naga())
        .ok_or_else(|| format!("{stage} module declares no @{stage} entry point"))
}

/// Checks that every user-location input of the fragment entry point is
/// written by the vertex entry point with the same type.
pub(super) fn check_interface(
    vertex: &Module,
    vs_entry: &EntryPoint,
    fragment: &Module,
    fs_entry: &EntryPoint,
) -> Result<(), String> {
    let mut outputs = Vec::new();
    if let Some(result) = &vs_entry.function.result {
        collect_locations(vertex, result.ty, result.binding.as_ref(), &mut outputs);
    }

    let mut inputs = Vec::new();
    for arg in &fs_entry.function.arguments {
        collect_locations(fragment, arg.ty, arg.binding.as_ref(), &mut inputs);
    }

    for (location, ty) in &inputs {
        match outputs.iter().find(|(l, _)| l == location) {
            None => {
                return Err(format!(
                    "fragment input at location {location} is not written by `{}`",
                    vs_entry.name
                ));
            }
            Some((_, out_ty)) if out_ty != ty => {
                return Err(format!(
                    "location {location}: vertex output {out_ty:?} does not match fragment input {ty:?}"
                ));
            }
            Some(_) => {}
        }
    }

    Ok(())
}

/// Checks that every user-location input of the vertex entry point is fed
/// by one of `attributes` with the same scalar kind.
///
/// Component counts may differ; the pipeline pads or drops components.
pub(super) fn check_vertex_inputs(
    vertex: &Module,
    vs_entry: &EntryPoint,
    attributes: &[wgpu::VertexAttribute],
) -> Result<(), String> {
    let mut inputs = Vec::new();
    for arg in &vs_entry.function.arguments {
        collect_locations(vertex, arg.ty, arg.binding.as_ref(), &mut inputs);
    }

    for (location, ty) in &inputs {
        let Some(attr) = attributes.iter().find(|a| a.shader_location == *location) else {
            return Err(format!(
                "vertex input at location {location} of `{}` is not fed by any vertex buffer",
                vs_entry.name
            ));
        };

        let expected = format_kind(attr.format);
        match input_kind(ty) {
            Some(kind) if kind == expected => {}
            _ => {
                return Err(format!(
                    "location {location}: vertex input {ty:?} cannot read {:?} data",
                    attr.format
                ));
            }
        }
    }

    Ok(())
}

fn input_kind(ty: &TypeInner) -> Option<ScalarKind> {
    match ty {
        TypeInner::Scalar(scalar) | TypeInner::Vector { scalar, .. } => Some(scalar.kind),
        _ => None,
    }
}

/// Scalar kind a vertex format presents to the shader. Normalized formats
/// read as floats.
fn format_kind(format: wgpu::VertexFormat) -> ScalarKind {
    use wgpu::VertexFormat as F;
    match format {
        F::Uint8 | F::Uint8x2 | F::Uint8x4 | F::Uint16 | F::Uint16x2 | F::Uint16x4
        | F::Uint32 | F::Uint32x2 | F::Uint32x3 | F::Uint32x4 => ScalarKind::Uint,
        F::Sint8 | F::Sint8x2 | F::Sint8x4 | F::Sint16 | F::Sint16x2 | F::Sint16x4
        | F::Sint32 | F::Sint32x2 | F::Sint32x3 | F::Sint32x4 => ScalarKind::Sint,
        _ => ScalarKind::Float,
    }
}

fn collect_locations(
    module: &Module,
    ty: Handle<Type>,
    binding: Option<&Binding>,
    out: &mut Vec<(u32, TypeInner)>,
) {
    match binding {
        Some(Binding::Location { location, .. }) => {
            out.push((*location, module.types[ty].inner.clone()));
        }
        Some(Binding::BuiltIn(_)) => {}
        None => {
            if let TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    collect_locations(module, member.ty, member.binding.as_ref(), out);
                }
            }
        }
    }
}

/// Merges per-stage resource lists into one program-wide list.
///
/// A resource declared by both stages must agree on name, slot and kind.
pub(super) fn merge_bindings(
    vertex: Vec<ReflectedBinding>,
    fragment: Vec<ReflectedBinding>,
) -> Result<Vec<ReflectedBinding>, String> {
    let mut merged = vertex;

    for b in fragment {
        if let Some(existing) = merged.iter_mut().find(|e| e.name == b.name) {
            if (existing.group, existing.binding) != (b.group, b.binding) {
                return Err(format!(
                    "`{}` is bound at group {}, binding {} in the vertex stage \
                     but at group {}, binding {} in the fragment stage",
                    b.name, existing.group, existing.binding, b.group, b.binding
                ));
            }
            if existing.kind != b.kind {
                return Err(format!(
                    "`{}` has type {:?} in the vertex stage but {:?} in the fragment stage",
                    b.name, existing.kind, b.kind
                ));
            }
            existing.visibility |= b.visibility;
            continue;
        }

        if let Some(other) = merged
            .iter()
            .find(|e| (e.group, e.binding) == (b.group, b.binding))
        {
            return Err(format!(
                "`{}` and `{}` share group {}, binding {}",
                other.name, b.name, b.group, b.binding
            ));
        }

        merged.push(b);
    }

    merged.sort_by_key(|b| (b.group, b.binding));
    Ok(merged)
}
