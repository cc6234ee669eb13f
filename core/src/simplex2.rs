use crate::NoiseGenerator;
use crate::utils::shuffled_permutation;

// Ken Perlin's reference permutation, used when no seed is given
#[rustfmt::skip]
pub(crate) const PERMUTATION: [u8; 256] = [
    151, 160, 137, 91, 90, 15, 131, 13, 201, 95, 96, 53, 194, 233, 7, 225,
    140, 36, 103, 30, 69, 142, 8, 99, 37, 240, 21, 10, 23, 190, 6, 148,
    247, 120, 234, 75, 0, 26, 197, 62, 94, 252, 219, 203, 117, 35, 11, 32,
    57, 177, 33, 88, 237, 149, 56, 87, 174, 20, 125, 136, 171, 168, 68, 175,
    74, 165, 71, 134, 139, 48, 27, 166, 77, 146, 158, 231, 83, 111, 229, 122,
    60, 211, 133, 230, 220, 105, 92, 41, 55, 46, 245, 40, 244, 102, 143, 54,
    65, 25, 63, 161, 1, 216, 80, 73, 209, 76, 132, 187, 208, 89, 18, 169,
    200, 196, 135, 130, 116, 188, 159, 86, 164, 100, 109, 198, 173, 186, 3, 64,
    52, 217, 226, 250, 124, 123, 5, 202, 38, 147, 118, 126, 255, 82, 85, 212,
    207, 206, 59, 227, 47, 16, 58, 17, 182, 189, 28, 42, 223, 183, 170, 213,
    119, 248, 152, 2, 44, 154, 163, 70, 221, 153, 101, 155, 167, 43, 172, 9,
    129, 22, 39, 253, 19, 98, 108, 110, 79, 113, 224, 232, 178, 185, 112, 104,
    218, 246, 97, 228, 251, 34, 242, 193, 238, 210, 144, 12, 191, 179, 162, 241,
    81, 51, 145, 235, 249, 14, 239, 107, 49, 192, 214, 31, 181, 199, 106, 157,
    184, 84, 204, 176, 115, 121, 50, 45, 127, 4, 150, 254, 138, 236, 205, 93,
    222, 114, 67, 29, 24, 72, 243, 141, 128, 195, 78, 66, 215, 61, 156, 180,
];

// Duplicate a 256 entry table to 512 so `perm[i + perm[j]]` never wraps
pub(crate) fn doubled(p: &[u8; 256]) -> [u8; 512] {
    let mut perm = [0u8; 512];
    for (i, slot) in perm.iter_mut().enumerate() {
        *slot = p[i & 255];
    }
    perm
}

// Single-octave 2D Simplex noise
// Simplex divides space into triangles, rather than squares
// This results in better isotropy (uniformity in all directions)
#[derive(Clone)]
pub struct Simplex2D {
    perm: [u8; 512],
    // Gradient directions, picked by hash % 8
    grad: [(i8, i8); 8],
}

impl Simplex2D {
    pub fn new() -> Self {
        Self::from_table(&PERMUTATION)
    }

    // Same kernel over a permutation shuffled from `seed`
    pub fn with_seed(seed: u32) -> Self {
        Self::from_table(&shuffled_permutation(seed as u64 ^ 0x1234_5678_9ABC_DEF0))
    }

    fn from_table(p: &[u8; 256]) -> Self {
        Self {
            perm: doubled(p),
            grad: [
                (1, 1),
                (-1, 1),
                (1, -1),
                (-1, -1),
                (1, 0),
                (-1, 0),
                (0, 1),
                (0, -1),
            ],
        }
    }

    #[inline]
    fn dot(g: (i8, i8), x: f64, y: f64) -> f64 {
        (g.0 as f64) * x + (g.1 as f64) * y
    }

    // Falloff (0.5 - d²)^4 * grad·offset, zero outside the corner's radius
    #[inline]
    fn corner(&self, hash: u8, x: f64, y: f64) -> f64 {
        let t = 0.5 - x * x - y * y;
        if t <= 0.0 {
            return 0.0;
        }
        let t_sq = t * t;
        t_sq * t_sq * Self::dot(self.grad[(hash & 7) as usize], x, y)
    }
}

impl Default for Simplex2D {
    fn default() -> Self {
        Self::new()
    }
}

impl NoiseGenerator for Simplex2D {
    // Returns roughly [-1.0, +1.0]
    fn get2(&self, xin: f64, yin: f64) -> f64 {
        const SQRT_3: f64 = 1.732_050_807_568_877_2;
        // Skew input space onto a grid of equilateral triangles and back
        const F2: f64 = 0.5 * (SQRT_3 - 1.0);
        const G2: f64 = (3.0 - SQRT_3) / 6.0;

        let s = (xin + yin) * F2;
        let i = (xin + s).floor() as i64;
        let j = (yin + s).floor() as i64;

        let t = (i + j) as f64 * G2;
        let x0 = xin - (i as f64 - t);
        let y0 = yin - (j as f64 - t);

        // Lower or upper triangle of the skewed cell
        let (i1, j1) = if x0 > y0 { (1, 0) } else { (0, 1) };

        let x1 = x0 - i1 as f64 + G2;
        let y1 = y0 - j1 as f64 + G2;
        let x2 = x0 - 1.0 + 2.0 * G2;
        let y2 = y0 - 1.0 + 2.0 * G2;

        let ii = (i & 255) as usize;
        let jj = (j & 255) as usize;
        let perm = &self.perm;
        let h0 = perm[ii + perm[jj] as usize];
        let h1 = perm[ii + i1 + perm[jj + j1] as usize];
        let h2 = perm[ii + 1 + perm[jj + 1] as usize];

        70.0 * (self.corner(h0, x0, y0) + self.corner(h1, x1, y1) + self.corner(h2, x2, y2))
    }
}

#[cfg(test)]
mod tests {
    use crate::NoiseGenerator;

    use super::Simplex2D;

    #[test]
    fn simplex2_determinism() {
        let s1 = Simplex2D::new();
        let s2 = Simplex2D::new();
        assert_eq!(s1.get2(1.23, 4.56), s2.get2(1.23, 4.56));

        let a = Simplex2D::with_seed(9999);
        let b = Simplex2D::with_seed(9999);
        assert_eq!(a.get2(-7.1, 0.3), b.get2(-7.1, 0.3));
    }

    #[test]
    fn simplex2_zero_at_lattice_origin() {
        assert_eq!(Simplex2D::new().get2(0.0, 0.0), 0.0);
    }

    #[test]
    fn simplex2_range() {
        let s = Simplex2D::new();
        for y in 0..64 {
            for x in 0..64 {
                let v = s.get2(x as f64 * 0.173, y as f64 * 0.219 - 3.0);
                assert!(v.abs() <= 1.1, "value {v} out of range");
            }
        }
    }

    #[test]
    fn simplex2_is_continuous() {
        let s = Simplex2D::new();
        let a = s.get2(3.3, 1.7);
        let b = s.get2(3.3 + 1e-6, 1.7);
        assert!((a - b).abs() < 1e-4);
    }

    #[test]
    fn simplex2_seed_changes_pattern() {
        let a = Simplex2D::with_seed(1);
        let b = Simplex2D::with_seed(2);
        let differs = (0..32).any(|i| {
            let p = i as f64 * 0.37 + 0.11;
            a.get2(p, p * 0.5) != b.get2(p, p * 0.5)
        });
        assert!(differs);
    }
}
