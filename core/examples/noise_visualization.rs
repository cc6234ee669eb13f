use image::{GrayImage, Luma};
use landscape::{
    GenerationParameters, HeightFieldGenerator, NoiseGenerator, NoiseKernel, Perlin2D, Simplex2D,
    generate_height_field,
};
use std::path::Path;

// Single-octave kernel sampled over the unit square
fn save_kernel<N: NoiseGenerator>(generator: &N, size: usize, frequency: f64, filename: &str) {
    let mut img = GrayImage::new(size as u32, size as u32);
    for y in 0..size {
        for x in 0..size {
            let v = generator.get2(
                x as f64 / size as f64 * frequency,
                y as f64 / size as f64 * frequency,
            );
            let gray = ((v.clamp(-1.0, 1.0) * 0.5 + 0.5) * 255.0).round() as u8;
            img.put_pixel(x as u32, y as u32, Luma([gray]));
        }
    }
    img.save(Path::new(filename)).unwrap();
    println!("Saved {}", filename);
}

// Height field as grayscale, black at 0 and white at height_scale
fn save_height_field(params: &GenerationParameters, generator: &HeightFieldGenerator, filename: &str) {
    let field = generator.generate(params).unwrap();
    let mut img = GrayImage::new(field.width() as u32, field.height() as u32);
    for z in 0..field.height() {
        for x in 0..field.width() {
            let norm = if params.height_scale > 0.0 {
                field.get(x, z) / params.height_scale
            } else {
                0.0
            };
            img.put_pixel(x as u32, z as u32, Luma([(norm * 255.0).round() as u8]));
        }
    }
    img.save(Path::new(filename)).unwrap();
    println!("Saved {}", filename);
}

fn main() {
    let size = 256;
    save_kernel(&Simplex2D::new(), size, 8.0, "simplex2d.png");
    save_kernel(&Perlin2D::new(), size, 8.0, "perlin2d.png");
    save_kernel(&Simplex2D::with_seed(42), size, 8.0, "simplex2d_seed42.png");

    let params = GenerationParameters {
        width: size,
        height: size,
        scale: 0.01,
        ..Default::default()
    };
    save_height_field(&params, &HeightFieldGenerator::for_params(&params), "height_simplex.png");

    let perlin = GenerationParameters {
        noise: NoiseKernel::Perlin,
        ..params.clone()
    };
    save_height_field(&perlin, &HeightFieldGenerator::for_params(&perlin), "height_perlin.png");

    let single = GenerationParameters { octaves: 1, ..params };
    let field = generate_height_field(&single).unwrap();
    println!(
        "single octave: min {:.3} max {:.3}",
        field.min_elevation(),
        field.max_elevation()
    );
}
