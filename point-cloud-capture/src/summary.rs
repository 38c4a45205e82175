/// Capture summary written next to each export
use crate::bounds::PointCloudBounds;
use crate::downsample::downsample;
use crate::error::ExportError;
use crate::pipeline::{CaptureSession, SessionStats};
use crate::settings::CaptureSettings;
use constants::capture_settings::SUMMARY_FILE_NAME;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Metadata about one capture session and its export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureSummary {
    /// Export filename, relative to the summary.
    pub export_file: String,
    pub point_count: usize,
    /// Size of the display subset.
    pub displayed_points: usize,
    /// Extent of the cloud; absent when nothing was captured.
    pub bounds: Option<PointCloudBounds>,
    pub stats: SessionStats,
    pub settings: CaptureSettings,
}

impl CaptureSummary {
    pub fn from_session(session: &CaptureSession, export_file: &str) -> Self {
        let snapshot = session.store().snapshot();
        let settings = session.settings().clone();

        Self {
            export_file: export_file.to_string(),
            point_count: snapshot.len(),
            displayed_points: downsample(&snapshot, settings.downsample_stride).len(),
            bounds: PointCloudBounds::from_vertices(&snapshot),
            stats: session.stats(),
            settings,
        }
    }
}

/// Writes `capture_summary.json` into an output directory.
pub struct SummaryWriter {
    output_dir: PathBuf,
}

impl SummaryWriter {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
        }
    }

    pub fn write(&self, summary: &CaptureSummary) -> Result<PathBuf, ExportError> {
        let summary_path = self.output_dir.join(SUMMARY_FILE_NAME);
        fs::write(&summary_path, serde_json::to_string_pretty(summary)?)?;

        info!(path = %summary_path.display(), "wrote capture summary");
        self.print_summary(summary);
        Ok(summary_path)
    }

    /// Prints summary for verification and debugging.
    fn print_summary(&self, summary: &CaptureSummary) {
        println!("Capture Summary:");
        println!("  Points: {}", summary.point_count);
        println!("  Displayed: {}", summary.displayed_points);
        match &summary.bounds {
            Some(bounds) => {
                println!("  X: {:.2} to {:.2}", bounds.min_x, bounds.max_x);
                println!("  Y: {:.2} to {:.2}", bounds.min_y, bounds.max_y);
                println!("  Z: {:.2} to {:.2}", bounds.min_z, bounds.max_z);
            }
            None => println!("  No points captured"),
        }
        println!(
            "  Frames: {} processed, {} dropped, {} unavailable, {} gated",
            summary.stats.frames_processed,
            summary.stats.frames_dropped,
            summary.stats.frames_unavailable,
            summary.stats.frames_gated
        );
        println!("  Depth ceiling exits: {}", summary.stats.depth_exits);
    }
}
