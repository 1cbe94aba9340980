//! GPU rendering helpers.
//!
//! Renderers own their GPU resources (pipelines, buffers, textures) and issue
//! commands via wgpu. This module provides the shared pieces:
//! - `RenderCtx`/`RenderTarget`: what a renderer gets each frame
//! - `ShaderProgram`: offline WGSL compile + link checks + uniform reflection
//! - `UniformBlock`: CPU mirror of one uniform buffer, written by location
//! - `Texture`: image decode, texel format selection, mip chain upload
//! - `DepthTarget`: depth buffer kept in sync with the surface size
//!
//! Convention: right-handed world space, clip depth in [0, 1].

mod ctx;
mod depth;
pub mod program;
pub mod texture;
pub mod uniform;

pub use ctx::{RenderCtx, RenderTarget};
pub(crate) use ctx::{color_attachment, depth_attachment};
pub use depth::DepthTarget;
pub use program::{ShaderError, ShaderProgram, ShaderStage, UniformLocation};
pub use texture::{Texture, TextureError, TextureImage, TexelFormat};
pub use uniform::{UniformBlock, UniformData};
