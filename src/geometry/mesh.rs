use crate::geometry::{LineVertex, Vertex};
use std::f32::consts::PI;

pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// UV sphere centered on the origin.
    ///
    /// Vertices are laid out row by row from the north pole, `width_segments + 1`
    /// per row and `height_segments + 1` rows, so the seam column is duplicated to
    /// keep texture coordinates continuous. Quads touching a pole collapse to a
    /// single triangle.
    pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        let width_segments = width_segments.max(3);
        let height_segments = height_segments.max(2);
        let row = width_segments + 1;
        let mut vertices = Vec::with_capacity((row * (height_segments + 1)) as usize);
        for iy in 0..=height_segments {
            let v = iy as f32 / height_segments as f32;
            let theta = v * PI;
            // keep the pole texel centered
            let u_offset = if iy == 0 {
                0.5 / width_segments as f32
            } else if iy == height_segments {
                -0.5 / width_segments as f32
            } else {
                0.0
            };
            for ix in 0..=width_segments {
                let u = ix as f32 / width_segments as f32;
                let phi = u * 2.0 * PI;
                let normal = [
                    -phi.cos() * theta.sin(),
                    theta.cos(),
                    phi.sin() * theta.sin(),
                ];
                let position = normal.map(|n| n * radius);
                vertices.push(Vertex::new(position, normal, [u + u_offset, 1.0 - v]));
            }
        }
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
        Self::new(vertices, indices)
    }
}

/// Colored line segments along the positive axes: X red, Y green, Z blue.
pub fn axes(size: f32) -> Vec<LineVertex> {
    let red = [1.0, 0.0, 0.0];
    let green = [0.0, 1.0, 0.0];
    let blue = [0.0, 0.0, 1.0];
    vec![
        LineVertex { position: [0.0, 0.0, 0.0], color: red },
        LineVertex { position: [size, 0.0, 0.0], color: red },
        LineVertex { position: [0.0, 0.0, 0.0], color: green },
        LineVertex { position: [0.0, size, 0.0], color: green },
        LineVertex { position: [0.0, 0.0, 0.0], color: blue },
        LineVertex { position: [0.0, 0.0, size], color: blue },
    ]
}
