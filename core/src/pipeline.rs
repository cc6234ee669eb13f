use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, warn};

use crate::error::GenerationError;
use crate::heightfield::{HeightField, generate_height_field};
use crate::mesh::TerrainMesh;
use crate::params::LandscapeParameters;
use crate::terrain_mesh::{NormalGrid, TerrainMeshBuilder};
use crate::tree::TreeInstance;
use crate::vegetation::generate_trees;

/// Everything one generation pass publishes.
#[derive(Debug, Clone)]
pub struct GeneratedArtifacts {
    pub height_field: HeightField,
    pub terrain: TerrainMesh,
    pub normals: NormalGrid,
    pub trees: Vec<TreeInstance>,
}

impl GeneratedArtifacts {
    pub fn tree_vertex_count(&self) -> usize {
        self.trees.iter().map(|t| t.mesh.vertices.len()).sum()
    }
}

fn rng_for(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

// A terrain with no eligible cell still gets published, just without trees
fn place_trees(
    field: &HeightField,
    normals: &NormalGrid,
    params: &LandscapeParameters,
) -> Result<Vec<TreeInstance>, GenerationError> {
    match generate_trees(field, normals, &params.trees, &mut rng_for(params.seed)) {
        Err(err @ GenerationError::NoEligibleSites { .. }) => {
            warn!(%err, "publishing terrain without trees");
            Ok(Vec::new())
        }
        other => other,
    }
}

/// Run every stage from scratch.
pub fn generate(params: &LandscapeParameters) -> Result<GeneratedArtifacts, GenerationError> {
    params.validate()?;
    let start = Instant::now();

    let height_field = generate_height_field(&params.terrain)?;
    let builder = TerrainMeshBuilder::new(params.mesh.clone())?;
    let (terrain, normals) = builder.build(&height_field);
    let trees = place_trees(&height_field, &normals, params)?;

    info!(
        width = height_field.width(),
        height = height_field.height(),
        triangles = terrain.triangle_count(),
        trees = trees.len(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "landscape generated"
    );
    Ok(GeneratedArtifacts {
        height_field,
        terrain,
        normals,
        trees,
    })
}

// Reuse the terrain of `current` and only re-place trees
fn regenerate_vegetation(
    params: &LandscapeParameters,
    current: &GeneratedArtifacts,
) -> Result<GeneratedArtifacts, GenerationError> {
    params.validate()?;
    let start = Instant::now();
    let trees = place_trees(&current.height_field, &current.normals, params)?;
    info!(
        trees = trees.len(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "vegetation regenerated"
    );
    Ok(GeneratedArtifacts {
        trees,
        ..current.clone()
    })
}

/// Regenerate only what `new` invalidates relative to `last`.
///
/// Returns `Ok(None)` when nothing changed. `last` is updated only after a
/// successful pass, so a failure leaves the previous snapshot and artifacts
/// in charge.
pub fn regenerate_if_changed(
    new: &LandscapeParameters,
    last: &mut Option<LandscapeParameters>,
    current: Option<&GeneratedArtifacts>,
) -> Result<Option<GeneratedArtifacts>, GenerationError> {
    let artifacts = match (last.as_ref(), current) {
        (Some(prev), Some(_)) if prev == new => return Ok(None),
        (Some(prev), Some(current)) if !prev.terrain_changed(new) => {
            regenerate_vegetation(new, current)?
        }
        _ => generate(new)?,
    };
    *last = Some(new.clone());
    Ok(Some(artifacts))
}

/// Owns the last published artifacts and the snapshot they were built from.
#[derive(Debug, Clone)]
pub struct Landscape {
    parameters: LandscapeParameters,
    artifacts: GeneratedArtifacts,
}

impl Landscape {
    pub fn new(parameters: LandscapeParameters) -> Result<Self, GenerationError> {
        let artifacts = generate(&parameters)?;
        Ok(Self {
            parameters,
            artifacts,
        })
    }

    pub fn parameters(&self) -> &LandscapeParameters {
        &self.parameters
    }

    pub fn artifacts(&self) -> &GeneratedArtifacts {
        &self.artifacts
    }

    /// Apply `params`, returning whether anything was regenerated.
    ///
    /// On error the previous artifacts stay published.
    pub fn regenerate(&mut self, params: &LandscapeParameters) -> Result<bool, GenerationError> {
        let mut last = Some(self.parameters.clone());
        match regenerate_if_changed(params, &mut last, Some(&self.artifacts))? {
            Some(artifacts) => {
                self.artifacts = artifacts;
                self.parameters = params.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
