use glam::Vec3;
use palette::Srgba;

use crate::mesh::TerrainMesh;

// Smallest and largest value of a slice, (0, 0) when it is empty
pub fn min_max(values: &[f32]) -> (f32, f32) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    values
        .iter()
        .fold((f32::MAX, f32::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}

// Position of `value` inside [min, max] as 0..1
// A flat (or broken) range maps everything to 0 instead of dividing by zero
pub fn normalized(value: f32, min: f32, max: f32) -> f32 {
    let range = max - min;
    if range > 0.0 && range.is_finite() {
        (value - min) / range
    } else {
        0.0
    }
}

// Rescale in place so the lowest value becomes 0 and the highest `scale`
pub fn normalize_to(values: &mut [f32], scale: f32) {
    let (min, max) = min_max(values);
    for v in values.iter_mut() {
        *v = normalized(*v, min, max) * scale;
    }
}

// Build an opaque color from 8-bit sRGB components
pub fn rgb8(r: u8, g: u8, b: u8) -> Srgba {
    Srgba::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0)
}

// Linearly interpolate the stored components
// No gamma decoding: this is a blend in encoded sRGB space
pub fn lerp_color(a: Srgba, b: Srgba, t: f32) -> Srgba {
    Srgba::new(
        a.red + (b.red - a.red) * t,
        a.green + (b.green - a.green) * t,
        a.blue + (b.blue - a.blue) * t,
        a.alpha + (b.alpha - a.alpha) * t,
    )
}

pub fn to_rgba8(color: Srgba) -> [u8; 4] {
    let quantize = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    [
        quantize(color.red),
        quantize(color.green),
        quantize(color.blue),
        quantize(color.alpha),
    ]
}

// Seeded Fisher–Yates shuffle of 0..=255 for noise permutation tables
pub(crate) fn shuffled_permutation(seed: u64) -> [u8; 256] {
    let mut p = [0u8; 256];
    for (i, slot) in p.iter_mut().enumerate() {
        *slot = i as u8;
    }
    // xorshift64 must not start at zero
    let mut x = seed | 1;
    let mut next = || {
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        x
    };
    for i in (1..256).rev() {
        let j = (next() % (i as u64 + 1)) as usize;
        p.swap(i, j);
    }
    p
}

// Top-down RGB preview of a terrain mesh
// Vertex colors are shaded by a Lambert term against `light`
// Returns width*height*3 bytes, row-major in z
pub fn to_terrain_image(mesh: &TerrainMesh, light: Vec3) -> Vec<u8> {
    let light = light.normalize_or_zero();
    let mut buf = Vec::with_capacity(mesh.vertices.len() * 3);
    for v in &mesh.vertices {
        // Keep some ambient so shadowed slopes stay readable
        let shade = 0.35 + 0.65 * v.normal.dot(light).max(0.0);
        let [r, g, b, _] = to_rgba8(v.color);
        buf.extend_from_slice(&[
            (r as f32 * shade) as u8,
            (g as f32 * shade) as u8,
            (b as f32 * shade) as u8,
        ]);
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_maps_extremes() {
        let mut values = vec![-2.0, 0.0, 2.0];
        normalize_to(&mut values, 10.0);
        assert_eq!(values, vec![0.0, 5.0, 10.0]);
    }

    #[test]
    fn normalize_flat_is_zero() {
        let mut values = vec![3.5; 9];
        normalize_to(&mut values, 128.0);
        assert!(values.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn lerp_is_linear_in_stored_components() {
        let black = rgb8(0, 0, 0);
        let white = rgb8(255, 255, 255);
        let mid = lerp_color(black, white, 0.5);
        assert_eq!(to_rgba8(mid), [128, 128, 128, 255]);
        assert_eq!(to_rgba8(lerp_color(black, white, 0.0)), [0, 0, 0, 255]);
    }

    #[test]
    fn permutation_is_a_permutation() {
        let mut p = shuffled_permutation(42).to_vec();
        assert_ne!(p, (0..=255u8).collect::<Vec<_>>());
        p.sort_unstable();
        assert_eq!(p, (0..=255u8).collect::<Vec<_>>());
    }
}
