/// Replays a recorded depth capture and exports the fused point cloud
use point_cloud_capture::CaptureSettings;
use point_cloud_capture::replay::ReplayCapture;
use std::env;
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().collect();
    if !(2..=4).contains(&args.len()) {
        eprintln!(
            "Usage: {} <recording_dir> [output.ply] [settings.json]",
            args[0]
        );
        std::process::exit(1);
    }

    let recording_dir = Path::new(&args[1]);
    let output_path = args.get(2).map(Path::new);
    let settings = match args.get(3) {
        Some(path) => CaptureSettings::load(Path::new(path))?,
        None => CaptureSettings::default(),
    };

    let replay = ReplayCapture::new(recording_dir, output_path, settings);
    replay.run()?;

    Ok(())
}
