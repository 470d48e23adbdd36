//! Unit UV-sphere mesh shared by every instance of a sphere mesh.

use bytemuck::{Pod, Zeroable};

/// Longitude segments.
pub const WIDTH_SEGMENTS: u32 = 32;
/// Latitude segments.
pub const HEIGHT_SEGMENTS: u32 = 16;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct SphereVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Vertices and triangle indices of a radius-1 sphere centered at the origin.
///
/// Poles are a ring of coincident vertices, so the grid is
/// `(width + 1) * (height + 1)` vertices and the pole rows emit one
/// triangle per segment instead of two.
pub fn uv_sphere(width_segments: u32, height_segments: u32) -> (Vec<SphereVertex>, Vec<u32>) {
    let width_segments = width_segments.max(3);
    let height_segments = height_segments.max(2);

    let mut vertices = Vec::with_capacity(((width_segments + 1) * (height_segments + 1)) as usize);
    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        let theta = v * std::f32::consts::PI;
        for ix in 0..=width_segments {
            let u = ix as f32 / width_segments as f32;
            let phi = u * std::f32::consts::TAU;
            let position = [-phi.cos() * theta.sin(), theta.cos(), phi.sin() * theta.sin()];
            vertices.push(SphereVertex {
                position,
                normal: position,
            });
        }
    }

    let row = width_segments + 1;
    let mut indices = Vec::new();
    for iy in 0..height_segments {
        for ix in 0..width_segments {
            let a = iy * row + ix + 1;
            let b = iy * row + ix;
            let c = (iy + 1) * row + ix;
            let d = (iy + 1) * row + ix + 1;
            if iy != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height_segments - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }
    (vertices, indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertices_lie_on_unit_sphere() {
        let (vertices, _) = uv_sphere(WIDTH_SEGMENTS, HEIGHT_SEGMENTS);
        assert_eq!(vertices.len(), 33 * 17);
        for v in &vertices {
            let [x, y, z] = v.position;
            assert!(((x * x + y * y + z * z).sqrt() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_index_count() {
        let (vertices, indices) = uv_sphere(8, 4);
        // Two pole rows of one triangle per segment, two middle rows of two.
        assert_eq!(indices.len(), (8 * 2 + 8 * 2 * 2) * 3);
        assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
    }

    #[test]
    fn test_degenerate_segments_are_raised() {
        let (vertices, indices) = uv_sphere(0, 0);
        assert_eq!(vertices.len(), 4 * 3);
        assert!(!indices.is_empty());
    }
}
