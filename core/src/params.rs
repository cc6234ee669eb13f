use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::error::GenerationError;

// Hard limits; anything larger is almost certainly a typo in a config file
pub const MAX_GRID_DIMENSION: usize = 4096;
pub const MAX_OCTAVES: u32 = 32;

/// Which 2D coherent noise kernel feeds the height field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NoiseKernel {
    #[default]
    Simplex,
    Perlin,
}

/// Inputs of the height field stage.
///
/// Compared by value: any field change means the terrain must be rebuilt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParameters {
    pub width: usize,
    pub height: usize,
    // Spatial frequency multiplier applied to grid coordinates
    pub scale: f64,
    pub frequency: f64,
    pub amplitude: f64,
    pub octaves: u32,
    // Amplitude falloff per octave
    pub persistence: f64,
    // Frequency growth per octave
    pub lacunarity: f64,
    // Final vertical scale, heights land in [0, height_scale]
    pub height_scale: f32,
    pub noise: NoiseKernel,
    // None keeps the reference permutation table
    pub noise_seed: Option<u32>,
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self {
            width: 256,
            height: 256,
            scale: 0.001,
            frequency: 2.0,
            amplitude: 1.0,
            octaves: 8,
            persistence: 0.35,
            lacunarity: 2.5,
            height_scale: 128.0,
            noise: NoiseKernel::Simplex,
            noise_seed: None,
        }
    }
}

impl GenerationParameters {
    pub fn validate(&self) -> Result<(), GenerationError> {
        check_dimension("width", self.width)?;
        check_dimension("height", self.height)?;
        if self.octaves == 0 || self.octaves > MAX_OCTAVES {
            return Err(GenerationError::invalid(
                "octaves",
                format!("must be within 1..={MAX_OCTAVES}, got {}", self.octaves),
            ));
        }
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(GenerationError::invalid(
                "scale",
                format!("must be finite and > 0, got {}", self.scale),
            ));
        }
        check_finite("frequency", self.frequency)?;
        check_finite("amplitude", self.amplitude)?;
        check_finite("persistence", self.persistence)?;
        check_finite("lacunarity", self.lacunarity)?;
        if !(self.height_scale.is_finite() && self.height_scale >= 0.0) {
            return Err(GenerationError::invalid(
                "height_scale",
                format!("must be finite and >= 0, got {}", self.height_scale),
            ));
        }
        Ok(())
    }
}

/// Inputs of the terrain mesh stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainMeshParameters {
    // Slopes steeper than this (degrees from horizontal) count as cliffs
    pub cliff_angle_deg: i32,
    // How far a cliff vertex moves toward the cliff color, 0..=1
    pub cliff_lerp: f32,
}

impl Default for TerrainMeshParameters {
    fn default() -> Self {
        Self {
            cliff_angle_deg: 45,
            cliff_lerp: 0.5,
        }
    }
}

impl TerrainMeshParameters {
    pub fn validate(&self) -> Result<(), GenerationError> {
        if !(0..=90).contains(&self.cliff_angle_deg) {
            return Err(GenerationError::invalid(
                "cliff_angle_deg",
                format!("must be within 0..=90, got {}", self.cliff_angle_deg),
            ));
        }
        if !(0.0..=1.0).contains(&self.cliff_lerp) {
            return Err(GenerationError::invalid(
                "cliff_lerp",
                format!("must be within 0..=1, got {}", self.cliff_lerp),
            ));
        }
        Ok(())
    }

    /// Threshold on `dot(normal, up)` below which a vertex is a cliff.
    pub fn cliff_threshold(&self) -> f32 {
        (90.0 - self.cliff_angle_deg as f32).to_radians().cos()
    }
}

/// Bounds for the randomized tree population.
///
/// Trunk segment, ring and radius ranges are inclusive. Branch and leaf counts
/// exclude their max unless min and max are equal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeGenerationParameters {
    pub tree_count: usize,
    // Valid elevation band for a tree's base
    pub min_height: f32,
    pub max_height: f32,
    pub trunk_base_radius_min: f32,
    pub trunk_base_radius_max: f32,
    // Radial vertices per trunk ring
    pub trunk_segments_min: usize,
    pub trunk_segments_max: usize,
    // Ring gaps along the trunk
    pub trunk_rings_min: usize,
    pub trunk_rings_max: usize,
    pub branch_count_min: usize,
    pub branch_count_max: usize,
    // Leaves per branch tip
    pub leaf_count_min: usize,
    pub leaf_count_max: usize,
    // Minimum dot(normal, up) at a tree site
    pub min_up_dot: f32,
    // Placement gives up after tree_count * max_attempts_per_tree rejections
    pub max_attempts_per_tree: u32,
    // Keep the leaf normals authored at construction instead of recomputing them
    pub preserve_leaf_normals: bool,
}

impl Default for TreeGenerationParameters {
    fn default() -> Self {
        Self {
            tree_count: 2000,
            min_height: 20.0,
            max_height: 80.0,
            trunk_base_radius_min: 0.25,
            trunk_base_radius_max: 0.75,
            trunk_segments_min: 8,
            trunk_segments_max: 8,
            trunk_rings_min: 4,
            trunk_rings_max: 8,
            branch_count_min: 12,
            branch_count_max: 24,
            leaf_count_min: 12,
            leaf_count_max: 24,
            min_up_dot: 0.9,
            max_attempts_per_tree: 64,
            preserve_leaf_normals: false,
        }
    }
}

impl TreeGenerationParameters {
    pub fn validate(&self) -> Result<(), GenerationError> {
        check_finite("min_height", self.min_height as f64)?;
        check_finite("max_height", self.max_height as f64)?;
        check_range("min_height..max_height", self.min_height, self.max_height)?;

        check_finite("trunk_base_radius_min", self.trunk_base_radius_min as f64)?;
        check_finite("trunk_base_radius_max", self.trunk_base_radius_max as f64)?;
        if self.trunk_base_radius_min <= 0.0 {
            return Err(GenerationError::invalid(
                "trunk_base_radius_min",
                format!("must be > 0, got {}", self.trunk_base_radius_min),
            ));
        }
        check_range(
            "trunk_base_radius",
            self.trunk_base_radius_min,
            self.trunk_base_radius_max,
        )?;

        if self.trunk_segments_min < 3 {
            return Err(GenerationError::invalid(
                "trunk_segments_min",
                format!("a ring needs at least 3 segments, got {}", self.trunk_segments_min),
            ));
        }
        check_range("trunk_segments", self.trunk_segments_min, self.trunk_segments_max)?;

        if self.trunk_rings_min == 0 {
            return Err(GenerationError::invalid("trunk_rings_min", "must be at least 1"));
        }
        check_range("trunk_rings", self.trunk_rings_min, self.trunk_rings_max)?;
        check_range("branch_count", self.branch_count_min, self.branch_count_max)?;
        check_range("leaf_count", self.leaf_count_min, self.leaf_count_max)?;

        if !(-1.0..=1.0).contains(&self.min_up_dot) {
            return Err(GenerationError::invalid(
                "min_up_dot",
                format!("must be within -1..=1, got {}", self.min_up_dot),
            ));
        }
        if self.max_attempts_per_tree == 0 {
            return Err(GenerationError::invalid(
                "max_attempts_per_tree",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Complete snapshot of everything a regeneration depends on.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LandscapeParameters {
    pub terrain: GenerationParameters,
    pub mesh: TerrainMeshParameters,
    pub trees: TreeGenerationParameters,
    // Seed for tree placement and shape; None draws from OS entropy
    pub seed: Option<u64>,
}

impl LandscapeParameters {
    pub fn validate(&self) -> Result<(), GenerationError> {
        self.terrain.validate()?;
        self.mesh.validate()?;
        self.trees.validate()
    }

    // True when the height field or terrain mesh must be rebuilt
    pub fn terrain_changed(&self, other: &Self) -> bool {
        self.terrain != other.terrain || self.mesh != other.mesh
    }
}

fn check_dimension(name: &'static str, value: usize) -> Result<(), GenerationError> {
    if value == 0 || value > MAX_GRID_DIMENSION {
        return Err(GenerationError::invalid(
            name,
            format!("must be within 1..={MAX_GRID_DIMENSION}, got {value}"),
        ));
    }
    Ok(())
}

fn check_finite(name: &'static str, value: f64) -> Result<(), GenerationError> {
    if !value.is_finite() {
        return Err(GenerationError::invalid(name, format!("must be finite, got {value}")));
    }
    Ok(())
}

fn check_range<T: PartialOrd + Debug>(
    name: &'static str,
    min: T,
    max: T,
) -> Result<(), GenerationError> {
    if min > max {
        return Err(GenerationError::invalid(
            name,
            format!("min {min:?} is greater than max {max:?}"),
        ));
    }
    Ok(())
}
