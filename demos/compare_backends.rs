//! Side-by-side comparison of the blur backends
//!
//! Run with: cargo run --release --example compare_backends

use rgba_blur::{blur, Backend, BlurConfig};
use std::time::Instant;

fn main() {
    env_logger::init();

    println!("RGBA Blur Backend Comparison");
    println!("============================\n");
    let detected = Backend::detect();
    println!(
        "Detected backend: {:?} ({})\n",
        detected,
        detected
            .lane_bits()
            .map_or_else(|| "scalar".to_string(), |bits| format!("{}-bit lanes", bits))
    );

    let sizes = [(256, 256), (512, 512), (1024, 1024)];
    let iterations = 20;

    for (width, height) in sizes {
        println!("Image size: {}x{}", width, height);
        println!("{:-<60}", "");

        // Diagonal gradient with a different ramp per channel
        let source: Vec<u32> = (0..width * height)
            .map(|i| {
                let x = (i % width) * 255 / width;
                let y = (i / width) * 255 / height;
                u32::from_le_bytes([x as u8, y as u8, ((x + y) / 2) as u8, 255])
            })
            .collect();

        let backends = [
            ("Scalar (baseline)", Backend::Scalar),
            ("SIMD 128-bit (f32x4)", Backend::Simd128),
            ("SIMD 256-bit (f32x8)", Backend::Simd256),
        ];

        let mut results = Vec::new();

        for (name, backend) in backends {
            let config = BlurConfig::new(1.5).with_backend(backend);
            let mut image = source.clone();
            let mut scratch = vec![0u32; width * height];

            // Warmup
            blur(&mut image, &mut scratch, width, height, &config).unwrap();

            let start = Instant::now();
            for _ in 0..iterations {
                image.copy_from_slice(&source);
                blur(&mut image, &mut scratch, width, height, &config).unwrap();
            }
            let ms = start.elapsed().as_secs_f64() * 1000.0 / iterations as f64;
            results.push((name, ms, image));
        }

        let baseline_ms = results[0].1;
        for (name, ms, image) in &results {
            let max_diff = image
                .iter()
                .zip(&results[0].2)
                .flat_map(|(a, b)| {
                    a.to_le_bytes()
                        .into_iter()
                        .zip(b.to_le_bytes())
                        .map(|(p, q)| p.abs_diff(q))
                })
                .max()
                .unwrap_or(0);
            println!(
                "  {:<24} {:>8.3} ms  {:>5.2}x  max diff vs scalar: {}",
                name,
                ms,
                baseline_ms / ms,
                max_diff
            );
        }
        println!();
    }
}
