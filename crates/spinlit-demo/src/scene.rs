//! Fixed scene parameters: lights, material, camera and drawable anchors.

use std::ops::Range;

use nalgebra_glm as glm;

use crate::geometry::{CUBE_RANGE, TETRAHEDRON_RANGE};

pub const NUM_LIGHTS: usize = 2;

pub const LIGHT_POSITIONS: [[f32; 3]; NUM_LIGHTS] = [[0.0, 2.0, -3.0], [3.0, 0.0, -3.0]];
pub const LIGHT_AMBIENT: [f32; 3] = [0.2, 0.2, 0.2];
pub const LIGHT_DIFFUSE: [f32; 3] = [0.5, 0.5, 0.5];
pub const LIGHT_SPECULAR: [f32; 3] = [1.0, 1.0, 1.0];

pub const MATERIAL_SHININESS: f32 = 32.0;

pub const CAMERA_POS: [f32; 3] = [0.0, 0.0, 1.0];
pub const CAMERA_TARGET: [f32; 3] = [0.0, 0.0, 0.0];
pub const CAMERA_UP: [f32; 3] = [0.0, 1.0, 0.0];

pub const CLEAR_COLOR: wgpu::Color = wgpu::Color::BLACK;

#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub position: glm::Vec3,
    pub ambient: glm::Vec3,
    pub diffuse: glm::Vec3,
    pub specular: glm::Vec3,
}

/// The two static point lights. Colours are shared, positions differ.
pub fn lights() -> [Light; NUM_LIGHTS] {
    LIGHT_POSITIONS.map(|position| Light {
        position: glm::make_vec3(&position),
        ambient: glm::make_vec3(&LIGHT_AMBIENT),
        diffuse: glm::make_vec3(&LIGHT_DIFFUSE),
        specular: glm::make_vec3(&LIGHT_SPECULAR),
    })
}

/// One animated object: where it sits and which vertices it draws.
#[derive(Debug, Clone)]
pub struct Drawable {
    pub label: &'static str,
    pub anchor: [f32; 3],
    pub vertices: Range<u32>,
}

pub fn drawables() -> [Drawable; 2] {
    [
        Drawable {
            label: "cube",
            anchor: [1.0, 0.0, -3.0],
            vertices: CUBE_RANGE,
        },
        Drawable {
            label: "tetrahedron",
            anchor: [-1.0, 0.0, -3.0],
            vertices: TETRAHEDRON_RANGE,
        },
    ]
}
