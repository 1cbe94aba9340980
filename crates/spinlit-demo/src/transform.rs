//! Per-frame transform math. Everything here is a pure function of elapsed
//! time and the viewport.

use nalgebra_glm as glm;
use spinlit_engine::coords::Viewport;

use crate::scene::{CAMERA_POS, CAMERA_TARGET, CAMERA_UP};

pub const FOV_Y_DEGREES: f32 = 50.0;
pub const Z_NEAR: f32 = 0.1;
pub const Z_FAR: f32 = 1000.0;

const OSCILLATION_RATE: f32 = 0.3;
const YAW_DEGREES_PER_SEC: f32 = 45.0;
const PITCH_DEGREES_PER_SEC: f32 = 81.0;

/// Offset shared by every drawable at time `t` (seconds).
pub fn oscillation(t: f32) -> glm::Vec3 {
    let f = t * OSCILLATION_RATE;
    glm::vec3(
        (2.1 * f).sin() * 0.5,
        (1.7 * f).cos() * 0.5,
        (1.3 * f).sin() * (1.5 * f).cos() * 2.0,
    )
}

/// Model matrix: anchor, then oscillation, then yaw about +Y and pitch
/// about +X, each composed onto the accumulated matrix.
pub fn model_matrix(anchor: &glm::Vec3, t: f32) -> glm::Mat4 {
    let m = glm::translate(&glm::Mat4::identity(), anchor);
    let m = glm::translate(&m, &oscillation(t));
    let m = glm::rotate(&m, (t * YAW_DEGREES_PER_SEC).to_radians(), &glm::vec3(0.0, 1.0, 0.0));
    glm::rotate(&m, (t * PITCH_DEGREES_PER_SEC).to_radians(), &glm::vec3(1.0, 0.0, 0.0))
}

/// Inverse-transpose of the upper-left 3x3 block.
pub fn normal_matrix(model: &glm::Mat4) -> glm::Mat3 {
    glm::transpose(&glm::inverse(&glm::mat4_to_mat3(model)))
}

pub fn view_matrix() -> glm::Mat4 {
    glm::look_at(
        &glm::make_vec3(&CAMERA_POS),
        &glm::make_vec3(&CAMERA_TARGET),
        &glm::make_vec3(&CAMERA_UP),
    )
}

/// Perspective projection for `viewport`, or `None` when it has no area.
pub fn projection_matrix(viewport: Viewport) -> Option<glm::Mat4> {
    let aspect = viewport.aspect()?;
    Some(glm::perspective_rh_zo(aspect, FOV_Y_DEGREES.to_radians(), Z_NEAR, Z_FAR))
}

/// Model and normal matrix of one drawable for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectTransform {
    pub model: glm::Mat4,
    pub normal: glm::Mat3,
}

impl ObjectTransform {
    pub fn at(anchor: &glm::Vec3, t: f32) -> Self {
        let model = model_matrix(anchor, t);
        let normal = normal_matrix(&model);
        Self { model, normal }
    }
}

/// Transforms shared by every draw in a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameTransforms {
    /// Viewport the projection was built for.
    pub viewport: Viewport,
    pub view: glm::Mat4,
    pub projection: glm::Mat4,
}

impl FrameTransforms {
    pub fn compute(viewport: Viewport) -> Option<Self> {
        Some(Self {
            viewport,
            view: view_matrix(),
            projection: projection_matrix(viewport)?,
        })
    }
}
