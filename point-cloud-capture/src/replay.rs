/// Offline replay of a recorded capture into an exported point cloud
use crate::export::export_to_file;
use crate::pipeline::{CaptureSession, FrameOutcome};
use crate::recording::{discover_frames, load_frame};
use crate::settings::CaptureSettings;
use crate::summary::{CaptureSummary, SummaryWriter};
use constants::capture_settings::EXPORT_FILE_NAME;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Feeds every recorded frame through a capture session, then exports the result.
pub struct ReplayCapture {
    /// Directory holding `frame_NNNN.json` / `.bin` pairs.
    recording_dir: PathBuf,
    /// Destination of the PLY export; the summary is written beside it.
    output_path: PathBuf,
    settings: CaptureSettings,
}

impl ReplayCapture {
    pub fn new(recording_dir: &Path, output_path: Option<&Path>, settings: CaptureSettings) -> Self {
        let output_path = output_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| recording_dir.join(EXPORT_FILE_NAME));

        Self {
            recording_dir: recording_dir.to_path_buf(),
            output_path,
            settings,
        }
    }

    pub fn run(&self) -> Result<CaptureSummary, Box<dyn std::error::Error>> {
        println!("Replaying capture {}...", self.recording_dir.display());

        let frames = discover_frames(&self.recording_dir)?;
        info!(frames = frames.len(), "found recorded frames");

        let session = CaptureSession::new(self.settings.clone());
        session.set_capturing(true);

        let pb = ProgressBar::new(frames.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{bar:40.green/blue}] {pos}/{len} frames ({percent}%) {msg}")?
                .progress_chars("▉▊▋▌▍▎▏ "),
        );
        pb.set_message("Fusing frames");

        for frame in &frames {
            let owned = load_frame(&frame.header_path)?;
            if let FrameOutcome::Processed(report) = session.submit_frame(&owned) {
                debug!(frame = %frame.name, inserted = report.inserted, "replayed frame");
            }
            pb.inc(1);
        }

        session.set_capturing(false);
        pb.finish_with_message(format!("{} points", session.store().count()));

        let export_path = export_to_file(session.store(), &self.output_path)?;
        let export_file = export_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        let summary = CaptureSummary::from_session(&session, &export_file);
        let output_dir = export_path.parent().unwrap_or(Path::new("."));
        SummaryWriter::new(output_dir).write(&summary)?;

        println!("Exported {}", export_path.display());
        Ok(summary)
    }
}
