//! Static geometry: a cube (12 triangles) followed by a tetrahedron (4
//! triangles) in one non-indexed triangle list.

use std::ops::Range;

use nalgebra_glm as glm;

pub const VERTEX_COUNT: usize = 48;

pub const CUBE_RANGE: Range<u32> = 0..36;
pub const TETRAHEDRON_RANGE: Range<u32> = 36..48;

const _: () = {
    assert!(CUBE_RANGE.start == 0);
    assert!(CUBE_RANGE.end == TETRAHEDRON_RANGE.start);
    assert!(TETRAHEDRON_RANGE.end as usize == VERTEX_COUNT);
    assert!((CUBE_RANGE.end - CUBE_RANGE.start) % 3 == 0);
    assert!((TETRAHEDRON_RANGE.end - TETRAHEDRON_RANGE.start) % 3 == 0);
};

const H: f32 = 0.25;

#[rustfmt::skip]
pub const POSITIONS: [[f32; 3]; VERTEX_COUNT] = [
    // Cube
    [-H, -H, -H], [-H,  H, -H], [ H, -H, -H],
    [ H,  H, -H], [ H, -H, -H], [-H,  H, -H],

    [ H, -H, -H], [ H,  H, -H], [ H, -H,  H],
    [ H,  H,  H], [ H, -H,  H], [ H,  H, -H],

    [ H, -H,  H], [ H,  H,  H], [-H, -H,  H],
    [-H,  H,  H], [-H, -H,  H], [ H,  H,  H],

    [-H, -H,  H], [-H,  H,  H], [-H, -H, -H],
    [-H,  H, -H], [-H, -H, -H], [-H,  H,  H],

    [ H, -H, -H], [ H, -H,  H], [-H, -H, -H],
    [-H, -H,  H], [-H, -H, -H], [ H, -H,  H],

    [ H,  H,  H], [ H,  H, -H], [-H,  H,  H],
    [-H,  H, -H], [-H,  H,  H], [ H,  H, -H],

    // Tetrahedron
    [0.0,  H, 0.0], [-H, -H, -H], [0.0, -H,  H],
    [0.0,  H, 0.0], [0.0, -H,  H], [ H, -H, -H],
    [0.0,  H, 0.0], [ H, -H, -H], [-H, -H, -H],
    [ H, -H, -H], [0.0, -H,  H], [-H, -H, -H],
];

#[rustfmt::skip]
pub const TEX_COORDS: [[f32; 2]; VERTEX_COUNT] = [
    // Cube: every face is two triangles with the same mapping.
    [1.0, 0.0], [1.0, 1.0], [0.0, 0.0],
    [0.0, 1.0], [0.0, 0.0], [1.0, 1.0],

    [1.0, 0.0], [1.0, 1.0], [0.0, 0.0],
    [0.0, 1.0], [0.0, 0.0], [1.0, 1.0],

    [1.0, 0.0], [1.0, 1.0], [0.0, 0.0],
    [0.0, 1.0], [0.0, 0.0], [1.0, 1.0],

    [1.0, 0.0], [1.0, 1.0], [0.0, 0.0],
    [0.0, 1.0], [0.0, 0.0], [1.0, 1.0],

    [1.0, 0.0], [1.0, 1.0], [0.0, 0.0],
    [0.0, 1.0], [0.0, 0.0], [1.0, 1.0],

    [1.0, 0.0], [1.0, 1.0], [0.0, 0.0],
    [0.0, 1.0], [0.0, 0.0], [1.0, 1.0],

    // Tetrahedron
    [0.5, 1.0], [0.0, 0.0], [1.0, 0.0],
    [0.5, 1.0], [0.0, 0.0], [1.0, 0.0],
    [0.5, 1.0], [0.0, 0.0], [1.0, 0.0],
    [1.0, 0.0], [0.5, 1.0], [0.0, 0.0],
];

/// What feeds the normal attribute (vertex slot 1).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum NormalSource {
    /// Flat per-face normals, oriented away from the mesh centroid.
    #[default]
    FaceGeometry,
    /// The position buffer bound as normals, as older builds of this demo
    /// did. Lighting is wrong but matches their output.
    PositionAlias,
}

/// Flat normals for every vertex, computed per mesh range.
pub fn face_normals() -> Vec<[f32; 3]> {
    let mut normals = Vec::with_capacity(VERTEX_COUNT);
    for range in [CUBE_RANGE, TETRAHEDRON_RANGE] {
        normals.extend(mesh_normals(&POSITIONS[range.start as usize..range.end as usize]));
    }
    normals
}

fn mesh_normals(positions: &[[f32; 3]]) -> Vec<[f32; 3]> {
    let points: Vec<glm::Vec3> = positions.iter().map(|p| glm::make_vec3(p)).collect();
    let centroid = points.iter().fold(glm::Vec3::zeros(), |acc, p| acc + p) / points.len() as f32;

    let mut out = Vec::with_capacity(points.len());
    for tri in points.chunks_exact(3) {
        let mut n = glm::normalize(&glm::cross(&(tri[1] - tri[0]), &(tri[2] - tri[0])));
        let face_center = (tri[0] + tri[1] + tri[2]) / 3.0;
        if glm::dot(&n, &(face_center - centroid)) < 0.0 {
            n = -n;
        }
        out.extend(std::iter::repeat_n([n.x, n.y, n.z], 3));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn normals_cover_every_vertex() {
        assert_eq!(face_normals().len(), VERTEX_COUNT);
    }

    #[test]
    fn cube_normals_are_axis_aligned_and_outward() {
        let normals = face_normals();
        for (i, n) in normals[..36].iter().enumerate() {
            let n = glm::make_vec3(n);
            assert!(approx(glm::length(&n), 1.0), "vertex {i}");

            // Exactly one non-zero component, pointing the same way as the vertex.
            let axis = (0..3).find(|&a| n[a].abs() > 0.5).unwrap();
            assert!(approx(n[axis].abs(), 1.0));
            assert!(n[axis] * POSITIONS[i][axis] > 0.0, "vertex {i}");
        }
    }

    #[test]
    fn tetrahedron_normals_point_away_from_centroid() {
        let normals = face_normals();
        let centroid = glm::vec3(0.0, -0.125, -0.0625);

        for tri in 0..4 {
            let base = 36 + tri * 3;
            let center = (0..3)
                .map(|k| glm::make_vec3(&POSITIONS[base + k]))
                .fold(glm::Vec3::zeros(), |a, p| a + p)
                / 3.0;
            let n = glm::make_vec3(&normals[base]);
            assert!(glm::dot(&n, &(center - centroid)) > 0.0, "face {tri}");
            assert_eq!(normals[base], normals[base + 1]);
            assert_eq!(normals[base], normals[base + 2]);
        }
    }

    #[test]
    fn texture_coordinates_are_normalized() {
        assert!(TEX_COORDS.iter().flatten().all(|c| (0.0..=1.0).contains(c)));
    }
}
