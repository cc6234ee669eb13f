use glam::Vec3;
use image::RgbImage;
use landscape::{
    GenerationParameters, LandscapeParameters, TreeGenerationParameters, generate,
    utils::to_terrain_image,
};
use std::path::Path;

fn main() {
    let size = 384;
    let params = LandscapeParameters {
        terrain: GenerationParameters {
            width: size,
            height: size,
            scale: 0.004,
            ..Default::default()
        },
        trees: TreeGenerationParameters {
            tree_count: 400,
            ..Default::default()
        },
        seed: Some(2025),
        ..Default::default()
    };
    let landscape = generate(&params).unwrap();

    // Hillshaded vertex colors, light from the north-west
    let light = Vec3::new(-1.0, 1.5, -1.0);
    let buf = to_terrain_image(&landscape.terrain, light);
    let img = RgbImage::from_raw(size as u32, size as u32, buf).unwrap();

    println!(
        "terrain: {} triangles, trees: {} ({} vertices)",
        landscape.terrain.triangle_count(),
        landscape.trees.len(),
        landscape.tree_vertex_count()
    );

    let path = Path::new("terrain_final.png");
    img.save(path).unwrap();
    println!("Saved final terrain image to {:?}", path);
}
