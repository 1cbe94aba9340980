use nalgebra_glm as glm;

use super::program::{BindingKind, ShaderError, ShaderProgram, UniformLocation};

/// CPU mirror of one uniform buffer.
///
/// Values are written at resolved [`UniformLocation`]s in the shader's
/// host-shareable layout (mat3 columns padded to 16 bytes).
#[derive(Debug, Clone)]
pub struct UniformData {
    group: u32,
    binding: u32,
    bytes: Vec<u8>,
}

impl UniformData {
    /// Creates a zeroed mirror of `size` bytes, rounded up to 16.
    pub fn new(group: u32, binding: u32, size: u32) -> Self {
        let len = (size.max(1) as usize).next_multiple_of(16);
        Self {
            group,
            binding,
            bytes: vec![0; len],
        }
    }

    /// Creates a mirror sized for the uniform global `name` of `program`.
    pub fn for_binding(program: &ShaderProgram, name: &str) -> Result<Self, ShaderError> {
        match program.binding(name) {
            Some(b) => match b.kind {
                BindingKind::Uniform { size } => Ok(Self::new(b.group, b.binding, size)),
                BindingKind::Texture | BindingKind::Sampler => Err(ShaderError::MissingUniform {
                    name: name.to_string(),
                }),
            },
            None => Err(ShaderError::MissingUniform { name: name.to_string() }),
        }
    }

    pub fn group(&self) -> u32 {
        self.group
    }

    pub fn binding(&self) -> u32 {
        self.binding
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn write_mat4(&mut self, loc: &UniformLocation, m: &glm::Mat4) {
        self.write(loc, bytemuck::cast_slice(m.as_slice()));
    }

    /// Writes a 3x3 matrix as three 16-byte columns.
    pub fn write_mat3(&mut self, loc: &UniformLocation, m: &glm::Mat3) {
        let mut cols = [[0.0f32; 4]; 3];
        for (c, col) in cols.iter_mut().enumerate() {
            col[..3].copy_from_slice(&[m[(0, c)], m[(1, c)], m[(2, c)]]);
        }
        self.write(loc, bytemuck::cast_slice(&cols));
    }

    pub fn write_vec3(&mut self, loc: &UniformLocation, v: &glm::Vec3) {
        self.write(loc, bytemuck::cast_slice(v.as_slice()));
    }

    pub fn write_f32(&mut self, loc: &UniformLocation, v: f32) {
        self.write(loc, bytemuck::bytes_of(&v));
    }

    fn write(&mut self, loc: &UniformLocation, data: &[u8]) {
        debug_assert_eq!(
            (loc.group, loc.binding),
            (self.group, self.binding),
            "location written into the wrong uniform block"
        );

        let start = loc.offset as usize;
        let end = start + data.len();
        if data.len() > loc.size as usize || end > self.bytes.len() {
            log::error!(
                "uniform write of {} bytes at offset {} does not fit location of {} bytes",
                data.len(),
                loc.offset,
                loc.size
            );
            return;
        }

        self.bytes[start..end].copy_from_slice(data);
    }
}

/// A uniform buffer on the GPU plus its CPU mirror.
///
/// Writes go to the mirror; `flush` uploads the whole block at once.
pub struct UniformBlock {
    data: UniformData,
    buffer: wgpu::Buffer,
}

impl UniformBlock {
    pub fn new(device: &wgpu::Device, label: &str, data: UniformData) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: data.bytes().len() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self { data, buffer }
    }

    pub fn data_mut(&mut self) -> &mut UniformData {
        &mut self.data
    }

    pub fn group(&self) -> u32 {
        self.data.group()
    }

    pub fn binding(&self) -> u32 {
        self.data.binding()
    }

    /// Bind group entry for this block's binding slot.
    pub fn bind_group_entry(&self) -> wgpu::BindGroupEntry<'_> {
        wgpu::BindGroupEntry {
            binding: self.data.binding(),
            resource: self.buffer.as_entire_binding(),
        }
    }

    pub fn flush(&self, queue: &wgpu::Queue) {
        queue.write_buffer(&self.buffer, 0, self.data.bytes());
    }
}
