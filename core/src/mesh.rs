//! Shared triangle mesh types and the area-weighted normal pass used by both
//! the terrain and the trees.

use glam::Vec3;
use palette::Srgba;

/// One vertex of a triangle list.
#[derive(Debug, Clone, Copy)]
pub struct MeshVertex {
    pub position: Vec3,
    /// Unit length, or zero when no triangle touches the vertex.
    pub normal: Vec3,
    pub color: Srgba,
}

impl MeshVertex {
    pub fn new(position: Vec3, color: Srgba) -> Self {
        Self {
            position,
            normal: Vec3::ZERO,
            color,
        }
    }

    pub fn with_normal(position: Vec3, normal: Vec3, color: Srgba) -> Self {
        Self {
            position,
            normal,
            color,
        }
    }
}

// Exact component equality, color included
impl PartialEq for MeshVertex {
    fn eq(&self, other: &Self) -> bool {
        let (a, b) = (self.color, other.color);
        self.position == other.position
            && self.normal == other.normal
            && a.red == b.red
            && a.green == b.green
            && a.blue == b.blue
            && a.alpha == b.alpha
    }
}

/// Flat vertex array plus an index list grouped in counter-clockwise triples.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

pub type TerrainMesh = Mesh;
pub type TreeMesh = Mesh;

impl Mesh {
    pub fn with_capacity(vertices: usize, indices: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            indices: Vec::with_capacity(indices),
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Append a vertex and return its index.
    pub fn push_vertex(&mut self, vertex: MeshVertex) -> u32 {
        self.vertices.push(vertex);
        (self.vertices.len() - 1) as u32
    }

    pub fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    pub fn triangles(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        self.indices
            .chunks_exact(3)
            .map(|t| [t[0] as usize, t[1] as usize, t[2] as usize])
    }

    /// Replace every vertex normal with the normalized sum of the face normals
    /// around it. Any normals set during construction are discarded.
    pub fn recompute_normals(&mut self) {
        let normals = accumulate_normals(&self.vertices, &self.indices);
        for (vertex, normal) in self.vertices.iter_mut().zip(normals) {
            vertex.normal = normal;
        }
    }
}

/// Un-normalized face normal of the triangle (a, b, c).
///
/// Its length is twice the triangle's area, so summing these is area weighted.
/// Oriented so that a flat grid triangulated the way the terrain is faces +Y.
#[inline]
pub fn face_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    (c - a).cross(b - a)
}

/// Per-vertex normals from an index list, without touching the vertices.
///
/// Vertices no triangle references, and vertices whose faces cancel out,
/// keep a zero normal rather than NaN.
pub fn accumulate_normals(vertices: &[MeshVertex], indices: &[u32]) -> Vec<Vec3> {
    let mut acc = vec![Vec3::ZERO; vertices.len()];
    for tri in indices.chunks_exact(3) {
        let (i1, i2, i3) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        let n = face_normal(
            vertices[i1].position,
            vertices[i2].position,
            vertices[i3].position,
        );
        acc[i1] += n;
        acc[i2] += n;
        acc[i3] += n;
    }
    for n in acc.iter_mut() {
        *n = n.normalize_or_zero();
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::rgb8;
    use approx::assert_relative_eq;

    fn quad() -> Mesh {
        // Unit square in the XZ plane, triangulated like one terrain cell
        let mut mesh = Mesh::default();
        let white = rgb8(255, 255, 255);
        let tl = mesh.push_vertex(MeshVertex::new(Vec3::new(0.0, 0.0, 0.0), white));
        let tr = mesh.push_vertex(MeshVertex::new(Vec3::new(1.0, 0.0, 0.0), white));
        let bl = mesh.push_vertex(MeshVertex::new(Vec3::new(0.0, 0.0, 1.0), white));
        let br = mesh.push_vertex(MeshVertex::new(Vec3::new(1.0, 0.0, 1.0), white));
        mesh.push_triangle(tl, tr, bl);
        mesh.push_triangle(tr, br, bl);
        mesh
    }

    #[test]
    fn flat_cell_faces_up() {
        let mut mesh = quad();
        mesh.recompute_normals();
        for v in &mesh.vertices {
            assert_relative_eq!(v.normal.x, 0.0);
            assert_relative_eq!(v.normal.y, 1.0);
            assert_relative_eq!(v.normal.z, 0.0);
        }
    }

    #[test]
    fn face_normal_scales_with_area() {
        let small = face_normal(Vec3::ZERO, Vec3::X, Vec3::Z);
        let big = face_normal(Vec3::ZERO, Vec3::X * 2.0, Vec3::Z * 2.0);
        assert_relative_eq!(big.length(), small.length() * 4.0);
    }

    #[test]
    fn unreferenced_and_degenerate_vertices_stay_zero() {
        let mut mesh = quad();
        let lonely = mesh.push_vertex(MeshVertex::with_normal(
            Vec3::new(5.0, 5.0, 5.0),
            Vec3::Y,
            rgb8(0, 0, 0),
        ));
        // Zero-area triangle: three collinear points
        let a = mesh.push_vertex(MeshVertex::new(Vec3::ZERO, rgb8(0, 0, 0)));
        let b = mesh.push_vertex(MeshVertex::new(Vec3::X, rgb8(0, 0, 0)));
        let c = mesh.push_vertex(MeshVertex::new(Vec3::X * 2.0, rgb8(0, 0, 0)));
        mesh.push_triangle(a, b, c);

        mesh.recompute_normals();
        for idx in [lonely, a, b, c] {
            let n = mesh.vertices[idx as usize].normal;
            assert_eq!(n, Vec3::ZERO);
            assert!(!n.is_nan());
        }
        assert_eq!(mesh.triangle_count(), 3);
    }

    #[test]
    fn vertex_equality_includes_color() {
        let a = MeshVertex::with_normal(Vec3::X, Vec3::Y, rgb8(10, 20, 30));
        assert_eq!(a, a);
        assert_ne!(a, MeshVertex::with_normal(Vec3::X, Vec3::Y, rgb8(10, 20, 31)));
        assert_ne!(a, MeshVertex::with_normal(Vec3::X, Vec3::Z, rgb8(10, 20, 30)));

        let mut mesh = quad();
        let copy = mesh.clone();
        assert_eq!(mesh, copy);
        mesh.vertices[2].color = rgb8(0, 0, 0);
        assert_ne!(mesh, copy);
    }
}
