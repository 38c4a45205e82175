/// Grid cells per metre used for spatial deduplication (1 cm buckets)
pub const GRID_DENSITY: f32 = 100.0;

/// Depth ceiling in metres. The first qualifying sample above it ends the frame scan.
pub const MAX_DEPTH: f32 = 2.0;

/// Keep one vertex in this many for the display subset
pub const DOWNSAMPLE_STRIDE: usize = 10;

/// Default export filename, matches the capture app's share sheet output
pub const EXPORT_FILE_NAME: &str = "exported.ply";

/// Sidecar summary written next to every export
pub const SUMMARY_FILE_NAME: &str = "capture_summary.json";
