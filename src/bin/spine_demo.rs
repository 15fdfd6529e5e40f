use std::fs;
use std::path::Path;

use spine_detector::config::load_config;
use spine_detector::skeleton::RawSkeleton;
use spine_detector::{Graph, ImageField, SpineDetector};

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let Some(config_path) = args.get(1) else {
        eprintln!("usage: spine_demo <config.json>");
        std::process::exit(2);
    };
    if let Err(e) = run(Path::new(config_path)) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run(config_path: &Path) -> Result<(), String> {
    let config = load_config(config_path)?;

    let raw = fs::read_to_string(&config.skeleton_path).map_err(|e| {
        format!(
            "Failed to read skeleton {}: {e}",
            config.skeleton_path.display()
        )
    })?;
    let raw: RawSkeleton = serde_json::from_str(&raw).map_err(|e| {
        format!(
            "Failed to parse skeleton {}: {e}",
            config.skeleton_path.display()
        )
    })?;
    let mut skeleton = Graph::from_raw(&raw).map_err(|e| e.to_string())?;

    let field = load_field(&config.field_path)?;

    let detector = SpineDetector::new(config.spine_params.clone());
    let report = detector
        .detect(&mut skeleton, &field, &config.seeds)
        .map_err(|e| e.to_string())?;

    println!(
        "spines={} skipped={} latency_ms={:.3}",
        report.spines.len(),
        report.skipped_seeds.len(),
        report.latency_ms
    );

    if let Some(out) = &config.output.json_out {
        let json = serde_json::to_string_pretty(&report.traces())
            .map_err(|e| format!("Failed to serialize traces: {e}"))?;
        fs::write(out, json)
            .map_err(|e| format!("Failed to write {}: {e}", out.display()))?;
    }
    Ok(())
}

/// Load a grayscale image as the scoring field, normalized to [0, 1].
fn load_field(path: &Path) -> Result<ImageField, String> {
    let img = image::open(path)
        .map_err(|e| format!("Failed to read field {}: {e}", path.display()))?
        .to_luma8();
    let (w, h) = img.dimensions();
    let data: Vec<f32> = img.into_raw().into_iter().map(|v| v as f32 / 255.0).collect();
    Ok(ImageField::from_vec(w as usize, h as usize, data))
}
