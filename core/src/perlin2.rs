use crate::NoiseGenerator;
use crate::simplex2::{PERMUTATION, doubled};
use crate::utils::shuffled_permutation;

// Single-octave classic 2D Perlin noise
#[derive(Clone)]
pub struct Perlin2D {
    perm: [u8; 512], // permutation table (256 duplicated)
}

impl Perlin2D {
    pub fn new() -> Self {
        Self {
            perm: doubled(&PERMUTATION),
        }
    }

    pub fn with_seed(seed: u32) -> Self {
        Self {
            perm: doubled(&shuffled_permutation(seed as u64 ^ 0xDEAD_BEEF_CAFE_BABE)),
        }
    }

    // Fade function as defined by Ken Perlin: 6t^5 − 15t^4 + 10t^3
    // First and second derivatives are zero at t=0 and t=1
    #[inline]
    fn fade(t: f64) -> f64 {
        t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
    }

    #[inline]
    fn lerp(a: f64, b: f64, t: f64) -> f64 {
        a + t * (b - a)
    }

    // Low 3 bits of the hash pick one of 8 gradient directions
    #[inline]
    fn grad(hash: u8, x: f64, y: f64) -> f64 {
        match hash & 7 {
            0 => x + y,
            1 => -x + y,
            2 => x - y,
            3 => -x - y,
            4 => x,
            5 => -x,
            6 => y,
            _ => -y,
        }
    }
}

impl Default for Perlin2D {
    fn default() -> Self {
        Self::new()
    }
}

impl NoiseGenerator for Perlin2D {
    // Returns roughly [-1.0, +1.0]
    fn get2(&self, x: f64, y: f64) -> f64 {
        // Which unit square, and where inside it
        let xi = (x.floor() as i64 & 255) as usize;
        let yi = (y.floor() as i64 & 255) as usize;
        let xf = x - x.floor();
        let yf = y - y.floor();
        let u = Self::fade(xf);
        let v = Self::fade(yf);

        let p = &self.perm;
        let aa = p[p[xi] as usize + yi];
        let ab = p[p[xi] as usize + yi + 1];
        let ba = p[p[xi + 1] as usize + yi];
        let bb = p[p[xi + 1] as usize + yi + 1];

        let x1 = Self::lerp(Self::grad(aa, xf, yf), Self::grad(ba, xf - 1.0, yf), u);
        let x2 = Self::lerp(
            Self::grad(ab, xf, yf - 1.0),
            Self::grad(bb, xf - 1.0, yf - 1.0),
            u,
        );
        Self::lerp(x1, x2, v)
    }
}
