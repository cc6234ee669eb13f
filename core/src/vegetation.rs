use std::time::Instant;

use glam::Vec3;
use rand::Rng;
use tracing::{debug, warn};

use crate::error::GenerationError;
use crate::heightfield::HeightField;
use crate::params::TreeGenerationParameters;
use crate::terrain_mesh::NormalGrid;
use crate::tree::{TreeInstance, build_tree};

/// Places trees on a height field and builds a mesh for each of them.
pub struct VegetationGenerator<'a> {
    field: &'a HeightField,
    normals: &'a NormalGrid,
    params: &'a TreeGenerationParameters,
}

impl<'a> VegetationGenerator<'a> {
    pub fn new(
        field: &'a HeightField,
        normals: &'a NormalGrid,
        params: &'a TreeGenerationParameters,
    ) -> Result<Self, GenerationError> {
        params.validate()?;
        if normals.width() != field.width() || normals.height() != field.height() {
            return Err(GenerationError::DimensionMismatch {
                width: field.width(),
                height: field.height(),
                actual_width: normals.width(),
                actual_height: normals.height(),
            });
        }
        Ok(Self {
            field,
            normals,
            params,
        })
    }

    /// A cell can hold a tree when it is flat enough and inside the elevation band.
    pub fn is_eligible(&self, x: usize, z: usize) -> bool {
        if self.normals.get(x, z).dot(Vec3::Y) < self.params.min_up_dot {
            return false;
        }
        let y = self.field.get(x, z);
        y >= self.params.min_height && y <= self.params.max_height
    }

    pub fn eligible_site_count(&self) -> usize {
        let (w, h) = (self.field.width(), self.field.height());
        (0..h)
            .flat_map(|z| (0..w).map(move |x| (x, z)))
            .filter(|&(x, z)| self.is_eligible(x, z))
            .count()
    }

    // World position of a grid cell, centered like the terrain mesh
    fn site_position(&self, x: usize, z: usize) -> Vec3 {
        Vec3::new(
            x as f32 - self.field.width() as f32 / 2.0,
            self.field.get(x, z),
            z as f32 - self.field.height() as f32 / 2.0,
        )
    }

    /// Sample sites uniformly, rejecting ineligible ones, until `tree_count`
    /// trees are built or the retry budget runs out.
    ///
    /// Running out of budget returns the trees built so far. A map with no
    /// eligible cell at all is an error rather than an endless retry.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<Vec<TreeInstance>, GenerationError> {
        let target = self.params.tree_count;
        if target == 0 {
            return Ok(Vec::new());
        }
        if self.eligible_site_count() == 0 {
            return Err(GenerationError::NoEligibleSites {
                min_height: self.params.min_height,
                max_height: self.params.max_height,
                min_up_dot: self.params.min_up_dot,
            });
        }

        let start = Instant::now();
        let budget = target.saturating_mul(self.params.max_attempts_per_tree as usize);
        let (w, h) = (self.field.width(), self.field.height());
        let mut trees = Vec::with_capacity(target);
        let mut attempts = 0usize;

        while trees.len() < target && attempts < budget {
            attempts += 1;
            let x = rng.gen_range(0..w);
            let z = rng.gen_range(0..h);
            if !self.is_eligible(x, z) {
                continue;
            }
            trees.push(build_tree(self.site_position(x, z), self.params, rng));
        }

        if trees.len() < target {
            warn!(
                placed = trees.len(),
                requested = target,
                attempts,
                "placement budget exhausted, returning a partial forest"
            );
        }
        debug!(
            trees = trees.len(),
            attempts,
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "vegetation generated"
        );
        Ok(trees)
    }
}

/// Place and build `params.tree_count` trees using `rng` for every random choice.
pub fn generate_trees<R: Rng + ?Sized>(
    field: &HeightField,
    normals: &NormalGrid,
    params: &TreeGenerationParameters,
    rng: &mut R,
) -> Result<Vec<TreeInstance>, GenerationError> {
    VegetationGenerator::new(field, normals, params)?.generate(rng)
}
