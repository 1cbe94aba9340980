//! GPU side of the scene: pipeline, vertex buffers, uniform blocks and
//! material textures, all created once and reused every frame.

use anyhow::{Context, Result};
use nalgebra_glm as glm;
use wgpu::util::DeviceExt;

use spinlit_engine::device::Gpu;
use spinlit_engine::render::program::{BindingKind, ShaderError, ShaderProgram, UniformLocation};
use spinlit_engine::render::texture::create_sampler;
use spinlit_engine::render::{RenderCtx, RenderTarget, Texture, TextureImage, UniformBlock, UniformData};

use crate::geometry::{self, NormalSource};
use crate::locations::{UniformLocations, FRAME_GROUP, MATERIAL_GROUP, OBJECT_GROUP};
use crate::scene::{self, Drawable};
use crate::transform::{FrameTransforms, ObjectTransform};

/// Every uniform buffer of one bind group, plus the bind group itself.
struct UniformGroup {
    blocks: Vec<UniformBlock>,
    bind_group: wgpu::BindGroup,
}

impl UniformGroup {
    fn new(
        device: &wgpu::Device,
        program: &ShaderProgram,
        layout: &wgpu::BindGroupLayout,
        group: u32,
        label: &str,
    ) -> Result<Self> {
        let blocks = program
            .bindings()
            .iter()
            .filter(|b| b.group == group && matches!(b.kind, BindingKind::Uniform { .. }))
            .map(|b| -> Result<UniformBlock> {
                let data = UniformData::for_binding(program, &b.name)?;
                Ok(UniformBlock::new(device, &format!("{label} {}", b.name), data))
            })
            .collect::<Result<Vec<_>>>()?;

        let entries: Vec<wgpu::BindGroupEntry<'_>> =
            blocks.iter().map(UniformBlock::bind_group_entry).collect();
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &entries,
        });

        Ok(Self { blocks, bind_group })
    }

    fn write(&mut self, loc: &UniformLocation, f: impl FnOnce(&mut UniformData, &UniformLocation)) {
        match self
            .blocks
            .iter_mut()
            .find(|b| b.group() == loc.group && b.binding() == loc.binding)
        {
            Some(block) => f(block.data_mut(), loc),
            None => log::warn!(
                "no uniform block for group {} binding {}",
                loc.group,
                loc.binding
            ),
        }
    }

    fn flush(&self, queue: &wgpu::Queue) {
        for block in &self.blocks {
            block.flush(queue);
        }
    }
}

struct ObjectBinding {
    drawable: Drawable,
    anchor: glm::Vec3,
    uniforms: UniformGroup,
}

/// Draws the cube and the tetrahedron.
pub struct SceneRenderer {
    pipeline: wgpu::RenderPipeline,
    depth_enabled: bool,

    positions: wgpu::Buffer,
    normals: wgpu::Buffer,
    tex_coords: wgpu::Buffer,
    normal_source: NormalSource,

    locations: UniformLocations,
    frame: UniformGroup,
    objects: Vec<ObjectBinding>,

    material_bind_group: wgpu::BindGroup,
    _diffuse: Texture,
    _specular: Texture,
    _sampler: wgpu::Sampler,
}

impl SceneRenderer {
    pub fn new(
        gpu: &Gpu<'_>,
        program: &ShaderProgram,
        locations: UniformLocations,
        diffuse: &TextureImage,
        specular: &TextureImage,
        normal_source: NormalSource,
    ) -> Result<Self> {
        check_vertex_inputs(program)?;

        let device = gpu.device();
        let queue = gpu.queue();

        let layouts = program.create_bind_group_layouts(device);
        let layout_refs: Vec<&wgpu::BindGroupLayout> = layouts.iter().collect();
        let layout_for = |group: u32| {
            layouts
                .get(group as usize)
                .with_context(|| format!("shader program declares no bind group {group}"))
        };

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("spinlit scene pipeline layout"),
            bind_group_layouts: &layout_refs,
            immediate_size: 0,
        });

        let (vs, fs) = program.create_modules(device);
        let depth_format = gpu.depth_format();

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("spinlit scene pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &vs,
                entry_point: Some(program.vertex_entry()),
                compilation_options: Default::default(),
                buffers: &VERTEX_LAYOUTS,
            },

            fragment: Some(wgpu::FragmentState {
                module: &fs,
                entry_point: Some(program.fragment_entry()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.surface_format(),
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // Winding in the source data is mixed.
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: depth_format.map(|format| wgpu::DepthStencilState {
                format,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),

            multiview_mask: None,
            cache: None,
        });

        let positions = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("spinlit positions"),
            contents: bytemuck::cast_slice(&geometry::POSITIONS),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let normals = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("spinlit normals"),
            contents: bytemuck::cast_slice(&geometry::face_normals()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let tex_coords = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("spinlit texture coordinates"),
            contents: bytemuck::cast_slice(&geometry::TEX_COORDS),
            usage: wgpu::BufferUsages::VERTEX,
        });
        if normal_source == NormalSource::PositionAlias {
            log::warn!("normal attribute is fed from vertex positions (--legacy-normals)");
        }

        let frame = UniformGroup::new(device, program, layout_for(FRAME_GROUP)?, FRAME_GROUP, "spinlit frame")?;

        let objects = scene::drawables()
            .into_iter()
            .map(|drawable| -> Result<ObjectBinding> {
                let label = format!("spinlit {}", drawable.label);
                let uniforms =
                    UniformGroup::new(device, program, layout_for(OBJECT_GROUP)?, OBJECT_GROUP, &label)?;
                Ok(ObjectBinding {
                    anchor: glm::make_vec3(&drawable.anchor),
                    drawable,
                    uniforms,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let diffuse = upload_texture(device, queue, diffuse, "spinlit diffuse map")?;
        let specular = upload_texture(device, queue, specular, "spinlit specular map")?;
        let sampler = create_sampler(device);

        let slots = locations.material;
        let material_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("spinlit material"),
            layout: layout_for(MATERIAL_GROUP)?,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: slots.diffuse,
                    resource: wgpu::BindingResource::TextureView(diffuse.view()),
                },
                wgpu::BindGroupEntry {
                    binding: slots.specular,
                    resource: wgpu::BindingResource::TextureView(specular.view()),
                },
                wgpu::BindGroupEntry {
                    binding: slots.sampler,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        Ok(Self {
            pipeline,
            depth_enabled: depth_format.is_some(),
            positions,
            normals,
            tex_coords,
            normal_source,
            locations,
            frame,
            objects,
            material_bind_group,
            _diffuse: diffuse,
            _specular: specular,
            _sampler: sampler,
        })
    }

    /// Uploads this frame's uniforms and records the two draws.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        transforms: &FrameTransforms,
        t: f32,
    ) {
        self.write_frame_uniforms(transforms);
        self.frame.flush(ctx.queue);

        let model_loc = self.locations.model;
        let normal_loc = self.locations.normal_matrix;
        for object in &mut self.objects {
            let xf = ObjectTransform::at(&object.anchor, t);
            object.uniforms.write(&model_loc, |d, l| d.write_mat4(l, &xf.model));
            object.uniforms.write(&normal_loc, |d, l| d.write_mat3(l, &xf.normal));
            object.uniforms.flush(ctx.queue);
        }

        let color_attachment = target.color_attachment();
        let depth_attachment = target.depth_attachment().filter(|_| self.depth_enabled);

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("spinlit scene pass"),
            color_attachments: &[Some(color_attachment)],
            depth_stencil_attachment: depth_attachment,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        let (x, y, w, h) = transforms.viewport.rect();
        rpass.set_viewport(x, y, w, h, 0.0, 1.0);
        rpass.set_pipeline(&self.pipeline);

        rpass.set_vertex_buffer(0, self.positions.slice(..));
        let normals = match self.normal_source {
            NormalSource::FaceGeometry => &self.normals,
            NormalSource::PositionAlias => &self.positions,
        };
        rpass.set_vertex_buffer(1, normals.slice(..));
        rpass.set_vertex_buffer(2, self.tex_coords.slice(..));

        rpass.set_bind_group(FRAME_GROUP, &self.frame.bind_group, &[]);
        rpass.set_bind_group(MATERIAL_GROUP, &self.material_bind_group, &[]);

        for object in &self.objects {
            rpass.set_bind_group(OBJECT_GROUP, &object.uniforms.bind_group, &[]);
            rpass.draw(object.drawable.vertices.clone(), 0..1);
        }
    }

    fn write_frame_uniforms(&mut self, transforms: &FrameTransforms) {
        let locs = &self.locations;
        let frame = &mut self.frame;

        frame.write(&locs.view, |d, l| d.write_mat4(l, &transforms.view));
        frame.write(&locs.projection, |d, l| d.write_mat4(l, &transforms.projection));
        frame.write(&locs.view_pos, |d, l| {
            d.write_vec3(l, &glm::make_vec3(&scene::CAMERA_POS))
        });

        for (light, loc) in scene::lights().iter().zip(&locs.lights) {
            frame.write(&loc.position, |d, l| d.write_vec3(l, &light.position));
            frame.write(&loc.ambient, |d, l| d.write_vec3(l, &light.ambient));
            frame.write(&loc.diffuse, |d, l| d.write_vec3(l, &light.diffuse));
            frame.write(&loc.specular, |d, l| d.write_vec3(l, &light.specular));
        }

        frame.write(&locs.shininess, |d, l| d.write_f32(l, scene::MATERIAL_SHININESS));
    }
}

/// Checks that `program` reads its vertex inputs from the buffers this
/// renderer binds.
pub fn check_vertex_inputs(program: &ShaderProgram) -> Result<(), ShaderError> {
    program.check_vertex_layouts(&VERTEX_LAYOUTS)
}

fn upload_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    image: &TextureImage,
    label: &str,
) -> Result<Texture> {
    log::info!(
        "{label}: {}x{} {:?}, {} mip levels",
        image.width,
        image.height,
        image.format,
        image.mip_level_count()
    );
    Texture::upload(device, queue, image, label).with_context(|| format!("failed to upload {label}"))
}

const POSITION_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
const NORMAL_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x3];
const TEX_COORD_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![2 => Float32x2];

/// One tightly packed buffer per attribute, slots 0..3.
const VERTEX_LAYOUTS: [wgpu::VertexBufferLayout<'static>; 3] = [
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &POSITION_ATTRS,
    },
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &NORMAL_ATTRS,
    },
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &TEX_COORD_ATTRS,
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shaders::{FRAGMENT_SHADER, VERTEX_SHADER};

    #[test]
    fn shipped_vertex_shader_matches_buffers() {
        let program = ShaderProgram::compile(VERTEX_SHADER, FRAGMENT_SHADER).unwrap();
        assert_eq!(check_vertex_inputs(&program), Ok(()));
    }

    #[test]
    fn extra_vertex_input_is_a_link_error() {
        // First occurrence is the vertex input struct.
        let vs = VERTEX_SHADER.replacen(
            "    @location(2) tex_coords: vec2<f32>,\n",
            "    @location(2) tex_coords: vec2<f32>,\n    @location(5) extra: vec4<f32>,\n",
            1,
        );
        assert_ne!(vs, VERTEX_SHADER);

        // Compiles and resolves fine on its own.
        let program = ShaderProgram::compile(&vs, FRAGMENT_SHADER).unwrap();
        assert!(UniformLocations::resolve(&program).is_ok());

        let err = check_vertex_inputs(&program).unwrap_err();
        assert!(matches!(err, ShaderError::Link { .. }));
        assert!(err.to_string().contains("location 5"), "{err}");
    }
}
