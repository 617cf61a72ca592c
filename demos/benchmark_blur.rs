/// Quick benchmark of the reusable blur state on the detected backend
use rgba_blur::Blur;
use std::time::Instant;

fn main() {
    env_logger::init();

    let sizes = [(512, 512), (1024, 1024), (2048, 2048)];

    for (width, height) in sizes {
        println!("\n=== {}x{} image ===", width, height);

        let mut image = vec![0x8040_c0ffu32; width * height];
        let mut blur = Blur::new(width, height);
        println!("Backend: {:?}", blur.backend());

        // Warmup
        blur.blur(&mut image, 1.5).unwrap();

        // Benchmark
        let iterations = 100;
        let start = Instant::now();
        for _ in 0..iterations {
            blur.blur(&mut image, 1.5).unwrap();
        }
        let elapsed = start.elapsed();

        let ms_per_iter = elapsed.as_secs_f64() * 1000.0 / iterations as f64;
        let mpix_per_sec = (width * height) as f64 / 1_000_000.0 / (ms_per_iter / 1000.0);

        println!("Time per blur: {:.3} ms", ms_per_iter);
        println!("Throughput: {:.1} Mpix/sec", mpix_per_sec);
    }
}
