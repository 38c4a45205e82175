/// Per-frame fusion pipeline and the capture session that gates it
use crate::camera::{CameraPose, Unprojector};
use crate::downsample::downsample;
use crate::frame::{ConfidenceLevel, SensorFrame};
use crate::grid_key::GridKey;
use crate::planes::DecodedFrame;
use crate::settings::CaptureSettings;
use crate::store::{PointStore, Vertex};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU64, Ordering};
use tracing::{debug, trace};

/// Where the session's single in-flight frame currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FramePhase {
    Idle = 0,
    Decoding = 1,
    Projecting = 2,
    Inserting = 3,
}

impl FramePhase {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => FramePhase::Decoding,
            2 => FramePhase::Projecting,
            3 => FramePhase::Inserting,
            _ => FramePhase::Idle,
        }
    }
}

/// Result of offering one frame to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Processed(FrameReport),
    /// Another frame was in flight; this one was discarded.
    Dropped,
    /// Capture was switched off when the frame arrived.
    CaptureDisabled,
    /// A plane was missing or unreadable; the store is untouched.
    Unavailable,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Pixels that passed the confidence and depth gates.
    pub candidates: usize,
    /// Vertices that landed in previously empty cells.
    pub inserted: usize,
    /// The scan stopped at the first sample beyond the depth ceiling.
    pub depth_exceeded: bool,
}

/// Running totals for a capture session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub frames_processed: u64,
    pub frames_dropped: u64,
    pub frames_gated: u64,
    pub frames_unavailable: u64,
    pub depth_exits: u64,
    pub points_inserted: u64,
}

#[derive(Default)]
struct SessionCounters {
    frames_processed: AtomicU64,
    frames_dropped: AtomicU64,
    frames_gated: AtomicU64,
    frames_unavailable: AtomicU64,
    depth_exits: AtomicU64,
    points_inserted: AtomicU64,
}

/// Rendering collaborator. Receives the display subset after every processed frame.
pub trait GeometrySink: Send + Sync {
    fn update_geometry(&self, vertices: &[Vertex]);
}

/// Accumulates frames into a shared point store.
///
/// At most one frame is fused at a time. A frame that arrives while another is in flight
/// is dropped, not queued. The capture flag is sampled on entry only, so switching it off
/// lets an in-flight frame finish and leaves the store as it is.
///
/// Sink refreshes run after the slot is released, one at a time. Each snapshot is taken
/// under the refresh lock, so the sink never sees a smaller store than it saw before.
pub struct CaptureSession {
    settings: CaptureSettings,
    store: Arc<PointStore>,
    capturing: AtomicBool,
    in_flight: AtomicBool,
    phase: AtomicU8,
    counters: SessionCounters,
    sink: Option<Arc<dyn GeometrySink>>,
    refresh: Mutex<()>,
}

impl CaptureSession {
    pub fn new(settings: CaptureSettings) -> Self {
        Self {
            settings,
            store: Arc::new(PointStore::new()),
            capturing: AtomicBool::new(false),
            in_flight: AtomicBool::new(false),
            phase: AtomicU8::new(FramePhase::Idle as u8),
            counters: SessionCounters::default(),
            sink: None,
            refresh: Mutex::new(()),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn GeometrySink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Shared handle for readers (export, display).
    pub fn store(&self) -> &Arc<PointStore> {
        &self.store
    }

    pub fn settings(&self) -> &CaptureSettings {
        &self.settings
    }

    pub fn set_capturing(&self, capturing: bool) {
        self.capturing.store(capturing, Ordering::SeqCst);
    }

    pub fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::SeqCst)
    }

    pub fn phase(&self) -> FramePhase {
        FramePhase::from_u8(self.phase.load(Ordering::Acquire))
    }

    pub fn stats(&self) -> SessionStats {
        let c = &self.counters;
        SessionStats {
            frames_processed: c.frames_processed.load(Ordering::Relaxed),
            frames_dropped: c.frames_dropped.load(Ordering::Relaxed),
            frames_gated: c.frames_gated.load(Ordering::Relaxed),
            frames_unavailable: c.frames_unavailable.load(Ordering::Relaxed),
            depth_exits: c.depth_exits.load(Ordering::Relaxed),
            points_inserted: c.points_inserted.load(Ordering::Relaxed),
        }
    }

    /// Current display subset of the store.
    pub fn display_points(&self) -> Vec<Vertex> {
        downsample(&self.store.snapshot(), self.settings.downsample_stride)
    }

    /// Runs one frame through decode, filter, unproject and insert.
    /// Safe to call from any number of capture threads.
    pub fn submit_frame<F: SensorFrame + ?Sized>(&self, frame: &F) -> FrameOutcome {
        if !self.is_capturing() {
            self.counters.frames_gated.fetch_add(1, Ordering::Relaxed);
            return FrameOutcome::CaptureDisabled;
        }

        let Some(guard) = InFlightGuard::acquire(self) else {
            self.counters.frames_dropped.fetch_add(1, Ordering::Relaxed);
            debug!("frame dropped, previous frame still in flight");
            return FrameOutcome::Dropped;
        };

        self.set_phase(FramePhase::Decoding);
        let Some(decoded) = DecodedFrame::decode(frame) else {
            self.counters.frames_unavailable.fetch_add(1, Ordering::Relaxed);
            debug!("frame skipped, sensor planes unavailable");
            return FrameOutcome::Unavailable;
        };

        let report = self.fuse(&decoded, &frame.camera());
        drop(guard);

        self.counters.frames_processed.fetch_add(1, Ordering::Relaxed);
        self.counters
            .points_inserted
            .fetch_add(report.inserted as u64, Ordering::Relaxed);
        if report.depth_exceeded {
            self.counters.depth_exits.fetch_add(1, Ordering::Relaxed);
        }

        self.refresh_display();
        FrameOutcome::Processed(report)
    }

    fn fuse(&self, frame: &DecodedFrame<'_>, pose: &CameraPose) -> FrameReport {
        self.set_phase(FramePhase::Projecting);

        let depth_size = frame.depth_size();
        let unprojector = Unprojector::new(pose, depth_size, frame.image.size());
        let density = self.settings.grid_density;
        let mut batch = Vec::new();
        let mut depth_exceeded = false;

        'scan: for row in 0..depth_size.height {
            for col in 0..depth_size.width {
                let confidence = frame
                    .confidence
                    .value(col, row)
                    .and_then(ConfidenceLevel::from_raw);
                if confidence != Some(self.settings.required_confidence) {
                    continue;
                }

                let Some(depth) = frame.depth.value(col, row) else {
                    continue;
                };

                // Ends the whole frame, not just this pixel.
                // TODO: confirm with the capture owners whether a per-pixel skip was intended.
                if depth > self.settings.max_depth {
                    debug!(col, row, depth, "depth ceiling exceeded, ending frame scan");
                    depth_exceeded = true;
                    break 'scan;
                }

                let position = unprojector.unproject(col, row, depth);
                let (x, y) = unprojector.image_pixel(col, row);
                let Some(color) = frame.image.color(x, y) else {
                    continue;
                };

                batch.push((GridKey::new(position, density), Vertex::new(position, color)));
            }
        }

        self.set_phase(FramePhase::Inserting);
        let candidates = batch.len();
        let inserted = self.store.extend_if_absent(batch);
        trace!(candidates, inserted, total = self.store.count(), "frame fused");

        FrameReport {
            candidates,
            inserted,
            depth_exceeded,
        }
    }

    fn refresh_display(&self) {
        if let Some(sink) = &self.sink {
            let _serial = self.refresh.lock();
            sink.update_geometry(&self.display_points());
        }
    }

    fn set_phase(&self, phase: FramePhase) {
        self.phase.store(phase as u8, Ordering::Release);
    }
}

/// Holds the session's single writer slot; releases it and returns to `Idle` on drop.
struct InFlightGuard<'a> {
    session: &'a CaptureSession,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(session: &'a CaptureSession) -> Option<Self> {
        session
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        Some(Self { session })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.session.set_phase(FramePhase::Idle);
        self.session.in_flight.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::DeviceOrientation;
    use crate::color::ycbcr_to_rgba;
    use crate::frame::{OwnedFrame, OwnedPlane};
    use glam::{Mat4, Vec2, Vec3, Vec4};

    const HIGH: u8 = 2;
    const LOW: u8 = 0;

    fn pose(width: usize, height: usize) -> CameraPose {
        CameraPose {
            intrinsics: CameraPose::intrinsics_from(
                Vec2::ONE,
                Vec2::new(width as f32 / 2.0, height as f32 / 2.0),
            ),
            view_matrix: Mat4::IDENTITY,
            orientation: DeviceOrientation::Portrait,
        }
    }

    fn capturing_session() -> CaptureSession {
        let session = CaptureSession::new(CaptureSettings::default());
        session.set_capturing(true);
        session
    }

    fn processed(outcome: FrameOutcome) -> FrameReport {
        match outcome {
            FrameOutcome::Processed(report) => report,
            other => panic!("expected processed frame, got {other:?}"),
        }
    }

    #[test]
    fn test_centre_pixel_lands_in_front_of_camera() {
        let session = capturing_session();
        let mut confidences = [LOW; 16];
        confidences[2 * 4 + 2] = HIGH;
        let frame = OwnedFrame::new(4, 4, &[1.0; 16], &confidences, pose(4, 4));

        let report = processed(session.submit_frame(&frame));
        assert_eq!(report.inserted, 1);

        let vertex = session.store().snapshot()[0];
        assert!((vertex.position() - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
        assert_eq!(vertex.color[3], 1.0);
    }

    #[test]
    fn test_confidence_gate() {
        let session = capturing_session();
        let frame = OwnedFrame::new(4, 4, &[0.5; 16], &[1; 16], pose(4, 4));

        let report = processed(session.submit_frame(&frame));
        assert_eq!(report.candidates, 0);
        assert!(session.store().is_empty());
    }

    #[test]
    fn test_unknown_confidence_is_skipped() {
        let session = capturing_session();
        let frame = OwnedFrame::new(2, 2, &[0.5; 4], &[7; 4], pose(2, 2));

        assert_eq!(processed(session.submit_frame(&frame)).candidates, 0);
    }

    #[test]
    fn test_depth_ceiling_ends_scan() {
        let session = capturing_session();
        // Row-major: pixels 0..3 qualify, pixel 4 is too far, pixels 5.. would qualify.
        let mut depths = [0.5f32; 16];
        depths[4] = 2.5;
        let frame = OwnedFrame::new(4, 4, &depths, &[HIGH; 16], pose(4, 4));

        let report = processed(session.submit_frame(&frame));
        assert!(report.depth_exceeded);
        assert_eq!(report.candidates, 4);
        assert_eq!(session.stats().depth_exits, 1);
    }

    #[test]
    fn test_low_confidence_far_pixel_does_not_end_scan() {
        let session = capturing_session();
        let mut depths = [0.5f32; 4];
        let mut confidences = [HIGH; 4];
        depths[1] = 9.0;
        confidences[1] = LOW;
        let frame = OwnedFrame::new(2, 2, &depths, &confidences, pose(2, 2));

        let report = processed(session.submit_frame(&frame));
        assert!(!report.depth_exceeded);
        assert_eq!(report.candidates, 3);
    }

    #[test]
    fn test_depth_at_ceiling_is_kept() {
        let session = capturing_session();
        let frame = OwnedFrame::new(2, 2, &[2.0; 4], &[HIGH; 4], pose(2, 2));

        let report = processed(session.submit_frame(&frame));
        assert!(!report.depth_exceeded);
        assert_eq!(report.candidates, 4);
    }

    #[test]
    fn test_capture_disabled_gate() {
        let session = CaptureSession::new(CaptureSettings::default());
        let frame = OwnedFrame::new(2, 2, &[0.5; 4], &[HIGH; 4], pose(2, 2));

        assert_eq!(session.submit_frame(&frame), FrameOutcome::CaptureDisabled);
        assert!(session.store().is_empty());
        assert_eq!(session.stats().frames_gated, 1);
    }

    #[test]
    fn test_stopping_capture_keeps_points() {
        let session = capturing_session();
        let frame = OwnedFrame::new(2, 2, &[0.5; 4], &[HIGH; 4], pose(2, 2));
        processed(session.submit_frame(&frame));
        let count = session.store().count();

        session.set_capturing(false);
        assert_eq!(session.submit_frame(&frame), FrameOutcome::CaptureDisabled);
        assert_eq!(session.store().count(), count);
    }

    #[test]
    fn test_unavailable_frame_leaves_store_untouched() {
        let session = capturing_session();
        let mut frame = OwnedFrame::new(2, 2, &[0.5; 4], &[HIGH; 4], pose(2, 2));
        frame.depth = None;

        assert_eq!(session.submit_frame(&frame), FrameOutcome::Unavailable);
        assert!(session.store().is_empty());
        assert_eq!(session.phase(), FramePhase::Idle);

        // Next frame is processed normally.
        let frame = OwnedFrame::new(2, 2, &[0.5; 4], &[HIGH; 4], pose(2, 2));
        assert!(matches!(session.submit_frame(&frame), FrameOutcome::Processed(_)));
    }

    #[test]
    fn test_repeated_frame_adds_nothing() {
        let session = capturing_session();
        let frame = OwnedFrame::new(4, 4, &[1.0; 16], &[HIGH; 16], pose(4, 4));

        let first = processed(session.submit_frame(&frame));
        let second = processed(session.submit_frame(&frame));
        assert!(first.inserted > 0);
        assert_eq!(second.inserted, 0);
        assert_eq!(session.stats().points_inserted, first.inserted as u64);
    }

    struct RecordingSink {
        updates: Mutex<Vec<usize>>,
    }

    impl GeometrySink for RecordingSink {
        fn update_geometry(&self, vertices: &[Vertex]) {
            self.updates.lock().push(vertices.len());
        }
    }

    #[test]
    fn test_sink_receives_downsampled_points() {
        let sink = Arc::new(RecordingSink {
            updates: Mutex::new(Vec::new()),
        });
        let session = CaptureSession::new(CaptureSettings::default()).with_sink(sink.clone());
        session.set_capturing(true);

        // 8x8 pixels at 1 m with unit focal length spread far beyond 1 cm cells.
        let frame = OwnedFrame::new(8, 8, &[1.0; 64], &[HIGH; 64], pose(8, 8));
        let report = processed(session.submit_frame(&frame));

        assert_eq!(report.inserted, 64);
        assert_eq!(*sink.updates.lock(), vec![6]);
    }

    #[test]
    fn test_colour_sampled_from_larger_image() {
        let session = capturing_session();
        // 4x4 image behind a 2x2 depth frame; luma rises 50 per column and 10 per row.
        let luma: Vec<u8> = (0..4)
            .flat_map(|y| (0..4).map(move |x| 16 + 50 * x + 10 * y))
            .collect();
        let frame = OwnedFrame::new(2, 2, &[1.0; 4], &[HIGH; 4], pose(4, 4)).with_image(
            OwnedPlane::from_u8(4, 4, &luma),
            OwnedPlane::uniform_chroma(4, 4, 128, 128),
        );

        assert_eq!(processed(session.submit_frame(&frame)).inserted, 4);

        // Depth pixels map to image pixels (0, 0), (2, 0), (0, 2), (2, 2) in scan order.
        let colors: Vec<Vec4> = session.store().snapshot().iter().map(Vertex::color).collect();
        let expected: Vec<Vec4> = [16, 116, 36, 136]
            .into_iter()
            .map(|l| ycbcr_to_rgba(l, 128, 128))
            .collect();
        assert_eq!(colors, expected);
    }
}
