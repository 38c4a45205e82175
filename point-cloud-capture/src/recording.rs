/// Recorded capture frames: a JSON header plus a raw plane payload per frame
use crate::camera::CameraPose;
use crate::error::RecordingError;
use crate::frame::{OwnedFrame, OwnedPlane};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const FRAME_PREFIX: &str = "frame_";

/// Location of one plane inside the frame payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaneLayout {
    pub offset: usize,
    pub width: usize,
    pub height: usize,
    pub bytes_per_row: usize,
}

/// Contents of `frame_NNNN.json`. A missing plane replays as an unavailable frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameHeader {
    pub camera: CameraPose,
    pub depth: Option<PlaneLayout>,
    pub confidence: Option<PlaneLayout>,
    pub luma: Option<PlaneLayout>,
    pub chroma: Option<PlaneLayout>,
}

/// A frame found in a recording directory.
#[derive(Debug, Clone)]
pub struct RecordedFrame {
    pub name: String,
    pub header_path: PathBuf,
}

/// Lists `frame_*.json` headers in name order.
pub fn discover_frames(recording_dir: &Path) -> Result<Vec<RecordedFrame>, RecordingError> {
    let mut frames = Vec::new();

    for entry in fs::read_dir(recording_dir)? {
        let path = entry?.path();
        if !path.is_file() || path.extension().is_none_or(|ext| ext != "json") {
            continue;
        }

        let name = path
            .file_stem()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        if name.starts_with(FRAME_PREFIX) {
            frames.push(RecordedFrame {
                name,
                header_path: path,
            });
        }
    }

    if frames.is_empty() {
        return Err(RecordingError::NoFrames(recording_dir.to_path_buf()));
    }

    frames.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(frames)
}

/// Loads a frame header and its sibling `.bin` payload.
pub fn load_frame(header_path: &Path) -> Result<OwnedFrame, RecordingError> {
    let header: FrameHeader = serde_json::from_str(&fs::read_to_string(header_path)?)?;
    let payload = fs::read(header_path.with_extension("bin"))?;

    let plane = |layout: &Option<PlaneLayout>, name: &'static str| {
        layout
            .as_ref()
            .map(|layout| slice_plane(&payload, layout, name, header_path))
            .transpose()
    };

    Ok(OwnedFrame {
        depth: plane(&header.depth, "depth")?,
        confidence: plane(&header.confidence, "confidence")?,
        luma: plane(&header.luma, "luma")?,
        chroma: plane(&header.chroma, "chroma")?,
        camera: header.camera,
    })
}

/// Writes `frame` as `frame_{index:04}.json` + `.bin` in `recording_dir`.
pub fn write_frame(
    recording_dir: &Path,
    index: usize,
    frame: &OwnedFrame,
) -> Result<PathBuf, RecordingError> {
    let mut payload = Vec::new();
    let mut append = |plane: &Option<OwnedPlane>| {
        plane.as_ref().map(|plane| {
            let layout = PlaneLayout {
                offset: payload.len(),
                width: plane.width,
                height: plane.height,
                bytes_per_row: plane.bytes_per_row,
            };
            payload.extend_from_slice(&plane.bytes);
            layout
        })
    };

    let header = FrameHeader {
        camera: frame.camera,
        depth: append(&frame.depth),
        confidence: append(&frame.confidence),
        luma: append(&frame.luma),
        chroma: append(&frame.chroma),
    };

    fs::create_dir_all(recording_dir)?;
    let header_path = recording_dir.join(format!("{FRAME_PREFIX}{index:04}.json"));
    fs::write(&header_path, serde_json::to_string_pretty(&header)?)?;
    fs::write(header_path.with_extension("bin"), payload)?;

    Ok(header_path)
}

fn slice_plane(
    payload: &[u8],
    layout: &PlaneLayout,
    plane: &'static str,
    frame: &Path,
) -> Result<OwnedPlane, RecordingError> {
    let out_of_range = || RecordingError::PlaneOutOfRange {
        frame: frame.to_path_buf(),
        plane,
        payload_len: payload.len(),
    };

    let len = layout
        .bytes_per_row
        .checked_mul(layout.height)
        .ok_or_else(out_of_range)?;
    let end = layout.offset.checked_add(len).ok_or_else(out_of_range)?;
    let bytes = payload.get(layout.offset..end).ok_or_else(out_of_range)?;

    Ok(OwnedPlane::new(
        bytes.to_vec(),
        layout.width,
        layout.height,
        layout.bytes_per_row,
    ))
}
