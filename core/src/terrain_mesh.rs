use std::time::Instant;

use glam::Vec3;
use palette::Srgba;
use tracing::debug;

use crate::error::GenerationError;
use crate::heightfield::HeightField;
use crate::mesh::{MeshVertex, TerrainMesh};
use crate::params::TerrainMeshParameters;
use crate::utils::{lerp_color, min_max, normalized, rgb8};

// Upper bounds of the height bands, as a fraction of the elevation range
const WATER_BAND: f32 = 0.2;
const GRASS_BAND: f32 = 0.7;
const ROCK_BAND: f32 = 0.9;

/// Per-vertex terrain normals on the height field's grid.
///
/// An owned copy of the mesh normals, so reading or editing it never
/// touches the published mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalGrid {
    width: usize,
    height: usize,
    normals: Vec<Vec3>,
}

impl NormalGrid {
    pub fn from_mesh(width: usize, height: usize, mesh: &TerrainMesh) -> Self {
        Self {
            width,
            height,
            normals: mesh.vertices.iter().map(|v| v.normal).collect(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn get(&self, x: usize, z: usize) -> Vec3 {
        self.normals[x + z * self.width]
    }

    pub fn as_slice(&self) -> &[Vec3] {
        &self.normals
    }
}

/// Color a vertex by its normalized height, then darken it toward the cliff
/// color when its slope passes the cliff angle.
///
/// Pure: depends only on the inputs, so re-running it never drifts.
pub fn classify_vertex(
    position: Vec3,
    normal: Vec3,
    min_height: f32,
    max_height: f32,
    params: &TerrainMeshParameters,
) -> Srgba {
    let t = normalized(position.y, min_height, max_height);
    let band = if t < WATER_BAND {
        rgb8(0, 0, 255)
    } else if t < GRASS_BAND {
        rgb8(0, 128, 0)
    } else if t < ROCK_BAND {
        rgb8(128, 128, 128)
    } else {
        rgb8(255, 255, 255)
    };

    if normal.dot(Vec3::Y) < params.cliff_threshold() {
        lerp_color(band, rgb8(169, 169, 169), params.cliff_lerp)
    } else {
        band
    }
}

/// Recolor every vertex of `mesh` from its position and normal.
pub fn classify_colors(
    mesh: &mut TerrainMesh,
    min_height: f32,
    max_height: f32,
    params: &TerrainMeshParameters,
) {
    for v in mesh.vertices.iter_mut() {
        v.color = classify_vertex(v.position, v.normal, min_height, max_height, params);
    }
}

/// Turns a height field into a colored, lit triangle list.
#[derive(Debug, Clone)]
pub struct TerrainMeshBuilder {
    params: TerrainMeshParameters,
}

impl TerrainMeshBuilder {
    pub fn new(params: TerrainMeshParameters) -> Result<Self, GenerationError> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &TerrainMeshParameters {
        &self.params
    }

    /// One vertex per grid cell, centered on the origin, two CCW triangles per
    /// interior cell. Grids with a single row or column yield no triangles.
    pub fn build(&self, field: &HeightField) -> (TerrainMesh, NormalGrid) {
        let start = Instant::now();
        let (width, height) = (field.width(), field.height());
        let (min_height, max_height) = min_max(field.data());

        let cells = width.saturating_sub(1) * height.saturating_sub(1);
        let mut mesh = TerrainMesh::with_capacity(width * height, cells * 6);

        let x_offset = width as f32 / 2.0;
        let z_offset = height as f32 / 2.0;
        // Placeholder color until normals are known
        let unset = rgb8(255, 0, 255);
        for z in 0..height {
            for x in 0..width {
                let position = Vec3::new(x as f32 - x_offset, field.get(x, z), z as f32 - z_offset);
                mesh.push_vertex(MeshVertex::new(position, unset));
            }
        }

        for z in 0..height.saturating_sub(1) {
            for x in 0..width.saturating_sub(1) {
                let top_left = (x + z * width) as u32;
                let top_right = top_left + 1;
                let bottom_left = (x + (z + 1) * width) as u32;
                let bottom_right = bottom_left + 1;

                mesh.push_triangle(top_left, top_right, bottom_left);
                mesh.push_triangle(top_right, bottom_right, bottom_left);
            }
        }

        mesh.recompute_normals();
        classify_colors(&mut mesh, min_height, max_height, &self.params);
        let normals = NormalGrid::from_mesh(width, height, &mesh);

        debug!(
            vertices = mesh.vertices.len(),
            triangles = mesh.triangle_count(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "terrain mesh built"
        );
        (mesh, normals)
    }
}
