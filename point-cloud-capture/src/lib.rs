//! Incremental colour point cloud reconstruction from depth camera frames.
//!
//! Frames enter through [`CaptureSession::submit_frame`], are decoded, gated on
//! confidence and depth, unprojected into world space and deduplicated into a
//! [`PointStore`] on a 1 cm grid. Readers take snapshots for display
//! ([`downsample`]) or export ([`encode_ply`]) at any time.

pub mod bounds;
pub mod camera;
pub mod color;
pub mod downsample;
pub mod error;
pub mod export;
pub mod frame;
pub mod grid_key;
pub mod pipeline;
pub mod planes;
pub mod recording;
pub mod replay;
pub mod settings;
pub mod store;
pub mod summary;

pub use camera::{CameraPose, DeviceOrientation, Unprojector};
pub use downsample::downsample;
pub use error::{ExportError, RecordingError, SettingsError};
pub use export::{encode_ply, export_to_file};
pub use frame::{ConfidenceLevel, OwnedFrame, OwnedPlane, SensorFrame};
pub use grid_key::GridKey;
pub use pipeline::{CaptureSession, FrameOutcome, FramePhase, FrameReport, GeometrySink, SessionStats};
pub use planes::{DecodedFrame, RawPlane};
pub use settings::CaptureSettings;
pub use store::{PointStore, Vertex};
