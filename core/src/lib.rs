// core holds the noise kernels, terrain meshing and vegetation generation
pub mod error;
pub mod heightfield;
pub mod mesh;
pub mod params;
pub mod perlin2;
pub mod pipeline;
pub mod simplex2;
pub mod terrain_mesh;
pub mod tree;
pub mod utils;
pub mod vegetation;

pub use error::GenerationError;
pub use heightfield::{HeightField, HeightFieldGenerator, generate_height_field};
pub use mesh::{Mesh, MeshVertex, TerrainMesh, TreeMesh};
pub use params::{
    GenerationParameters, LandscapeParameters, NoiseKernel, TerrainMeshParameters,
    TreeGenerationParameters,
};
pub use perlin2::Perlin2D;
pub use pipeline::{GeneratedArtifacts, Landscape, generate, regenerate_if_changed};
pub use simplex2::Simplex2D;
pub use terrain_mesh::{NormalGrid, TerrainMeshBuilder};
pub use tree::{TreeInstance, build_tree};
pub use vegetation::{VegetationGenerator, generate_trees};

// 2D coherent noise sampled at (x, y), roughly within [-1, 1]
pub trait NoiseGenerator {
    fn get2(&self, x: f64, y: f64) -> f64;
}
