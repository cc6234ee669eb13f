use std::time::Instant;

use tracing::debug;

use crate::error::GenerationError;
use crate::params::{GenerationParameters, NoiseKernel};
use crate::utils::{min_max, normalize_to};
use crate::{NoiseGenerator, Perlin2D, Simplex2D};

/// Dense `width × height` grid of elevations, stored flat at `x + z * width`.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightField {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl HeightField {
    pub fn flat(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width * height],
        }
    }

    /// Wrap an existing buffer; its length must be `width * height`.
    pub fn from_data(width: usize, height: usize, data: Vec<f32>) -> Result<Self, GenerationError> {
        if data.len() != width * height {
            return Err(GenerationError::invalid(
                "data",
                format!("expected {} samples, got {}", width * height, data.len()),
            ));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn index(&self, x: usize, z: usize) -> usize {
        x + z * self.width
    }

    #[inline]
    pub fn get(&self, x: usize, z: usize) -> f32 {
        self.data[self.index(x, z)]
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn min_elevation(&self) -> f32 {
        min_max(&self.data).0
    }

    pub fn max_elevation(&self) -> f32 {
        min_max(&self.data).1
    }
}

/// Layered-noise height field synthesis over a pluggable kernel.
pub struct HeightFieldGenerator {
    noise: Box<dyn NoiseGenerator>,
}

impl HeightFieldGenerator {
    pub fn with_noise(noise: Box<dyn NoiseGenerator>) -> Self {
        Self { noise }
    }

    /// Generator using the kernel and permutation seed named in `params`.
    pub fn for_params(params: &GenerationParameters) -> Self {
        let noise: Box<dyn NoiseGenerator> = match (params.noise, params.noise_seed) {
            (NoiseKernel::Simplex, None) => Box::new(Simplex2D::new()),
            (NoiseKernel::Simplex, Some(seed)) => Box::new(Simplex2D::with_seed(seed)),
            (NoiseKernel::Perlin, None) => Box::new(Perlin2D::new()),
            (NoiseKernel::Perlin, Some(seed)) => Box::new(Perlin2D::with_seed(seed)),
        };
        Self::with_noise(noise)
    }

    // Sum of octaves at one grid cell, before normalization
    fn octave_sum(&self, params: &GenerationParameters, x: usize, z: usize) -> f64 {
        let mut frequency = params.frequency;
        let mut amplitude = params.amplitude;
        let mut total = 0.0;
        for _ in 0..params.octaves {
            let nx = x as f64 * params.scale * frequency;
            let nz = z as f64 * params.scale * frequency;
            total += self.noise.get2(nx, nz) * amplitude;
            amplitude *= params.persistence;
            frequency *= params.lacunarity;
        }
        total
    }

    /// Fill a `params.width × params.height` grid with normalized elevations
    /// in `[0, params.height_scale]`.
    ///
    /// Deterministic for a given kernel. A field whose noise is constant
    /// everywhere comes out uniformly 0.
    pub fn generate(&self, params: &GenerationParameters) -> Result<HeightField, GenerationError> {
        params.validate()?;
        let start = Instant::now();

        let (width, height) = (params.width, params.height);
        let mut data = Vec::with_capacity(width * height);
        for z in 0..height {
            for x in 0..width {
                data.push(self.octave_sum(params, x, z) as f32);
            }
        }
        // Huge amplitudes can overflow f32; refuse instead of spreading NaN
        if data.iter().any(|v| !v.is_finite()) {
            return Err(GenerationError::invalid(
                "amplitude",
                "octave sum is not finite, reduce amplitude or persistence",
            ));
        }

        let (raw_min, raw_max) = min_max(&data);
        normalize_to(&mut data, params.height_scale);

        debug!(
            width,
            height,
            octaves = params.octaves,
            raw_min,
            raw_max,
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "height field generated"
        );
        HeightField::from_data(width, height, data)
    }
}

/// Height field using the kernel selected by `params`.
pub fn generate_height_field(params: &GenerationParameters) -> Result<HeightField, GenerationError> {
    HeightFieldGenerator::for_params(params).generate(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Constant(f64);

    impl NoiseGenerator for Constant {
        fn get2(&self, _x: f64, _y: f64) -> f64 {
            self.0
        }
    }

    fn small_params() -> GenerationParameters {
        GenerationParameters {
            width: 64,
            height: 48,
            scale: 0.02,
            octaves: 4,
            ..Default::default()
        }
    }

    #[test]
    fn values_span_zero_to_height_scale() {
        let params = small_params();
        let hf = generate_height_field(&params).unwrap();
        assert_eq!(hf.data().len(), 64 * 48);
        assert_eq!(hf.min_elevation(), 0.0);
        assert!((hf.max_elevation() - params.height_scale).abs() < 1e-3);
        assert!(
            hf.data()
                .iter()
                .all(|&v| (0.0..=params.height_scale).contains(&v))
        );
    }

    #[test]
    fn generation_is_deterministic() {
        let params = small_params();
        let a = generate_height_field(&params).unwrap();
        let b = generate_height_field(&params).unwrap();
        assert_eq!(a, b);

        let perlin = GenerationParameters {
            noise: NoiseKernel::Perlin,
            noise_seed: Some(7),
            ..small_params()
        };
        assert_eq!(
            generate_height_field(&perlin).unwrap(),
            generate_height_field(&perlin).unwrap()
        );
    }

    #[test]
    fn flat_noise_gives_zero_field() {
        let generator = HeightFieldGenerator::with_noise(Box::new(Constant(0.25)));
        let hf = generator.generate(&small_params()).unwrap();
        assert!(hf.data().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn single_cell_grid_is_flat() {
        let params = GenerationParameters {
            width: 1,
            height: 1,
            ..Default::default()
        };
        let hf = generate_height_field(&params).unwrap();
        assert_eq!(hf.data(), &[0.0]);
    }

    #[test]
    fn invalid_params_are_rejected_before_work() {
        let params = GenerationParameters {
            scale: -1.0,
            ..small_params()
        };
        assert!(generate_height_field(&params).is_err());
    }

    #[test]
    fn grid_is_indexed_x_major() {
        let hf = HeightField::from_data(3, 2, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(hf.get(2, 0), 2.0);
        assert_eq!(hf.get(0, 1), 3.0);
        assert!(HeightField::from_data(3, 2, vec![0.0; 5]).is_err());
    }
}
