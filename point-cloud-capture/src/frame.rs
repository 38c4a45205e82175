/// Sensor frame boundary and an owned in-memory frame implementation
use crate::camera::CameraPose;
use crate::planes::RawPlane;
use constants::confidence::{CONFIDENCE_HIGH, CONFIDENCE_LOW, CONFIDENCE_MEDIUM};
use serde::{Deserialize, Serialize};

/// One frame as delivered by the capture session.
/// A plane accessor returns `None` when the plane is missing or cannot be read.
pub trait SensorFrame {
    /// 32-bit float depth in metres, one sample per pixel.
    fn depth_plane(&self) -> Option<RawPlane<'_>>;
    /// 8-bit confidence level per depth pixel.
    fn confidence_plane(&self) -> Option<RawPlane<'_>>;
    /// Full resolution 8-bit luma.
    fn luma_plane(&self) -> Option<RawPlane<'_>>;
    /// Half resolution interleaved Cb/Cr pairs.
    fn chroma_plane(&self) -> Option<RawPlane<'_>>;
    fn camera(&self) -> CameraPose;
}

/// Discrete reliability level of a depth sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    /// `None` for raw values outside the defined level set.
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            CONFIDENCE_LOW => Some(ConfidenceLevel::Low),
            CONFIDENCE_MEDIUM => Some(ConfidenceLevel::Medium),
            CONFIDENCE_HIGH => Some(ConfidenceLevel::High),
            _ => None,
        }
    }
}

/// Plane data owned by the frame.
#[derive(Debug, Clone, PartialEq)]
pub struct OwnedPlane {
    pub bytes: Vec<u8>,
    pub width: usize,
    pub height: usize,
    pub bytes_per_row: usize,
}

impl OwnedPlane {
    pub fn new(bytes: Vec<u8>, width: usize, height: usize, bytes_per_row: usize) -> Self {
        Self {
            bytes,
            width,
            height,
            bytes_per_row,
        }
    }

    /// Tightly packed depth plane.
    pub fn from_depths(width: usize, height: usize, depths: &[f32]) -> Self {
        let bytes = bytemuck::cast_slice::<f32, u8>(depths).to_vec();
        Self::new(bytes, width, height, width * size_of::<f32>())
    }

    /// Tightly packed 8-bit plane.
    pub fn from_u8(width: usize, height: usize, values: &[u8]) -> Self {
        Self::new(values.to_vec(), width, height, width)
    }

    /// Chroma plane covering a `luma_width` x `luma_height` image with one (cb, cr) pair.
    pub fn uniform_chroma(luma_width: usize, luma_height: usize, cb: u8, cr: u8) -> Self {
        let width = luma_width.div_ceil(2);
        let height = luma_height.div_ceil(2);
        let bytes = [cb, cr].repeat(width * height);
        Self::new(bytes, width, height, width * 2)
    }

    pub fn as_raw(&self) -> RawPlane<'_> {
        RawPlane {
            bytes: &self.bytes,
            width: self.width,
            height: self.height,
            bytes_per_row: self.bytes_per_row,
        }
    }
}

/// Frame whose planes live in memory: replayed recordings and synthetic frames.
#[derive(Debug, Clone)]
pub struct OwnedFrame {
    pub depth: Option<OwnedPlane>,
    pub confidence: Option<OwnedPlane>,
    pub luma: Option<OwnedPlane>,
    pub chroma: Option<OwnedPlane>,
    pub camera: CameraPose,
}

impl OwnedFrame {
    /// Depth and confidence of `width` x `height`, with a neutral grey image of the same size.
    pub fn new(
        width: usize,
        height: usize,
        depths: &[f32],
        confidences: &[u8],
        camera: CameraPose,
    ) -> Self {
        Self {
            depth: Some(OwnedPlane::from_depths(width, height, depths)),
            confidence: Some(OwnedPlane::from_u8(width, height, confidences)),
            luma: Some(OwnedPlane::from_u8(width, height, &vec![128; width * height])),
            chroma: Some(OwnedPlane::uniform_chroma(width, height, 128, 128)),
            camera,
        }
    }

    pub fn with_image(mut self, luma: OwnedPlane, chroma: OwnedPlane) -> Self {
        self.luma = Some(luma);
        self.chroma = Some(chroma);
        self
    }
}

impl SensorFrame for OwnedFrame {
    fn depth_plane(&self) -> Option<RawPlane<'_>> {
        self.depth.as_ref().map(OwnedPlane::as_raw)
    }

    fn confidence_plane(&self) -> Option<RawPlane<'_>> {
        self.confidence.as_ref().map(OwnedPlane::as_raw)
    }

    fn luma_plane(&self) -> Option<RawPlane<'_>> {
        self.luma.as_ref().map(OwnedPlane::as_raw)
    }

    fn chroma_plane(&self) -> Option<RawPlane<'_>> {
        self.chroma.as_ref().map(OwnedPlane::as_raw)
    }

    fn camera(&self) -> CameraPose {
        self.camera
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::DeviceOrientation;
    use crate::planes::DecodedFrame;
    use glam::{Mat3, Mat4};

    fn pose() -> CameraPose {
        CameraPose {
            intrinsics: Mat3::IDENTITY,
            view_matrix: Mat4::IDENTITY,
            orientation: DeviceOrientation::Portrait,
        }
    }

    #[test]
    fn test_confidence_levels() {
        assert_eq!(ConfidenceLevel::from_raw(0), Some(ConfidenceLevel::Low));
        assert_eq!(ConfidenceLevel::from_raw(2), Some(ConfidenceLevel::High));
        assert_eq!(ConfidenceLevel::from_raw(3), None);
        assert_eq!(ConfidenceLevel::from_raw(1), Some(ConfidenceLevel::Medium));
    }

    #[test]
    fn test_owned_frame_decodes() {
        let frame = OwnedFrame::new(3, 3, &[1.0; 9], &[2; 9], pose());
        let decoded = DecodedFrame::decode(&frame).unwrap();

        assert_eq!(decoded.depth_size().width, 3);
        assert_eq!(decoded.image.size().height, 3);
        assert_eq!(decoded.depth.value(2, 2), Some(1.0));
    }

    #[test]
    fn test_missing_plane_is_unavailable() {
        let mut frame = OwnedFrame::new(2, 2, &[1.0; 4], &[2; 4], pose());
        frame.chroma = None;
        assert!(DecodedFrame::decode(&frame).is_none());
    }

    #[test]
    fn test_mismatched_confidence_is_unavailable() {
        let mut frame = OwnedFrame::new(2, 2, &[1.0; 4], &[2; 4], pose());
        frame.confidence = Some(OwnedPlane::from_u8(1, 2, &[2, 2]));
        assert!(DecodedFrame::decode(&frame).is_none());
    }
}
