use glam::Vec3;
use image::{Rgb, RgbImage};
use landscape::GeneratedArtifacts;
use landscape::utils::to_terrain_image;

// Light from the north-west, above the horizon
const LIGHT: Vec3 = Vec3::new(-1.0, 1.5, -1.0);
const TREE_MARK: Rgb<u8> = Rgb([0, 64, 0]);

/// Top-down hillshaded image of the terrain colors, one pixel per grid cell,
/// with every tree base marked.
pub fn render(artifacts: &GeneratedArtifacts) -> Option<RgbImage> {
    let (width, height) = (
        artifacts.height_field.width(),
        artifacts.height_field.height(),
    );
    let buf = to_terrain_image(&artifacts.terrain, LIGHT);
    let mut img = RgbImage::from_raw(width as u32, height as u32, buf)?;

    let (half_w, half_h) = (width as f32 / 2.0, height as f32 / 2.0);
    for tree in &artifacts.trees {
        let x = (tree.position.x + half_w).round() as u32;
        let z = (tree.position.z + half_h).round() as u32;
        if x < img.width() && z < img.height() {
            img.put_pixel(x, z, TREE_MARK);
        }
    }
    Some(img)
}
