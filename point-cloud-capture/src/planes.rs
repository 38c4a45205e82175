/// Typed, bounds-checked views over the planar buffers of one sensor frame
use crate::color::ycbcr_to_rgba;
use crate::frame::SensorFrame;
use bytemuck::Pod;
use glam::{Vec2, Vec4};
use std::marker::PhantomData;
use std::mem::size_of;

/// Pixel dimensions of a plane or image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub width: usize,
    pub height: usize,
}

impl Size {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub fn as_vec2(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }
}

/// Untyped plane exactly as the capture session hands it over.
/// Borrowing the bytes is the read lock; the lock is released when the borrow ends.
#[derive(Debug, Clone, Copy)]
pub struct RawPlane<'a> {
    pub bytes: &'a [u8],
    pub width: usize,
    pub height: usize,
    pub bytes_per_row: usize,
}

/// Read-only typed accessor over a row-strided plane.
/// Layout is validated once on construction and every read is bounds checked.
#[derive(Debug, Clone, Copy)]
pub struct Plane<'a, T: Pod> {
    raw: RawPlane<'a>,
    _element: PhantomData<T>,
}

impl<'a, T: Pod> Plane<'a, T> {
    /// Returns `None` when the plane is empty or the buffer is too short for the declared layout.
    pub fn new(raw: RawPlane<'a>) -> Option<Self> {
        let row_bytes = raw.width.checked_mul(size_of::<T>())?;
        if raw.width == 0 || raw.height == 0 || raw.bytes_per_row < row_bytes {
            return None;
        }

        // Last row only needs its pixels, not the full stride.
        let required = raw
            .bytes_per_row
            .checked_mul(raw.height - 1)?
            .checked_add(row_bytes)?;
        if raw.bytes.len() < required {
            return None;
        }

        Some(Self {
            raw,
            _element: PhantomData,
        })
    }

    pub fn size(&self) -> Size {
        Size::new(self.raw.width, self.raw.height)
    }

    /// Element at (x, y): base + y * bytes_per_row + x * element size.
    pub fn value(&self, x: usize, y: usize) -> Option<T> {
        if !self.size().contains(x, y) {
            return None;
        }
        let offset = y * self.raw.bytes_per_row + x * size_of::<T>();
        self.raw
            .bytes
            .get(offset..offset + size_of::<T>())
            .map(bytemuck::pod_read_unaligned)
    }
}

/// Biplanar luma/chroma image: full resolution luma, half resolution interleaved Cb/Cr.
#[derive(Debug, Clone, Copy)]
pub struct YCbCrImage<'a> {
    luma: Plane<'a, u8>,
    chroma: Plane<'a, [u8; 2]>,
}

impl<'a> YCbCrImage<'a> {
    pub fn new(luma: RawPlane<'a>, chroma: RawPlane<'a>) -> Option<Self> {
        let luma = Plane::<u8>::new(luma)?;
        let chroma = Plane::<[u8; 2]>::new(chroma)?;

        // Every luma pixel must have a chroma sample at (x / 2, y / 2).
        let luma_size = luma.size();
        let chroma_size = chroma.size();
        if chroma_size.width < luma_size.width.div_ceil(2)
            || chroma_size.height < luma_size.height.div_ceil(2)
        {
            return None;
        }

        Some(Self { luma, chroma })
    }

    pub fn size(&self) -> Size {
        self.luma.size()
    }

    /// Normalised RGBA colour of the pixel at (x, y).
    pub fn color(&self, x: usize, y: usize) -> Option<Vec4> {
        let luma = self.luma.value(x, y)?;
        let [cb, cr] = self.chroma.value(x / 2, y / 2)?;
        Some(ycbcr_to_rgba(luma, cb, cr))
    }
}

/// All planes of a frame, decoded and validated for one pipeline pass.
#[derive(Debug, Clone, Copy)]
pub struct DecodedFrame<'a> {
    pub depth: Plane<'a, f32>,
    pub confidence: Plane<'a, u8>,
    pub image: YCbCrImage<'a>,
}

impl<'a> DecodedFrame<'a> {
    /// Yields `None` if any plane is missing, cannot be borrowed, or has an inconsistent layout.
    /// This is a silent skip, not an error.
    pub fn decode<F: SensorFrame + ?Sized>(frame: &'a F) -> Option<Self> {
        let depth = Plane::<f32>::new(frame.depth_plane()?)?;
        let confidence = Plane::<u8>::new(frame.confidence_plane()?)?;
        if confidence.size() != depth.size() {
            return None;
        }
        let image = YCbCrImage::new(frame.luma_plane()?, frame.chroma_plane()?)?;

        Some(Self {
            depth,
            confidence,
            image,
        })
    }

    pub fn depth_size(&self) -> Size {
        self.depth.size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(bytes: &[u8], width: usize, height: usize, bytes_per_row: usize) -> RawPlane<'_> {
        RawPlane {
            bytes,
            width,
            height,
            bytes_per_row,
        }
    }

    #[test]
    fn test_plane_reads_with_row_stride() {
        // 2x2 u8 plane padded to 4 bytes per row.
        let bytes = [1u8, 2, 0xAA, 0xAA, 3, 4];
        let plane = Plane::<u8>::new(raw(&bytes, 2, 2, 4)).unwrap();

        assert_eq!(plane.value(0, 0), Some(1));
        assert_eq!(plane.value(1, 0), Some(2));
        assert_eq!(plane.value(0, 1), Some(3));
        assert_eq!(plane.value(1, 1), Some(4));
    }

    #[test]
    fn test_plane_rejects_out_of_bounds() {
        let bytes = [0u8; 8];
        let plane = Plane::<u8>::new(raw(&bytes, 2, 2, 4)).unwrap();

        assert_eq!(plane.value(2, 0), None);
        assert_eq!(plane.value(0, 2), None);
    }

    #[test]
    fn test_plane_reads_f32_samples() {
        let depths = [0.5f32, 1.25, 3.0, 0.0];
        let bytes: &[u8] = bytemuck::cast_slice(&depths[..]);
        let plane = Plane::<f32>::new(raw(bytes, 2, 2, 8)).unwrap();

        assert_eq!(plane.value(1, 0), Some(1.25));
        assert_eq!(plane.value(0, 1), Some(3.0));
    }

    #[test]
    fn test_plane_rejects_short_buffer() {
        let bytes = [0u8; 5];
        assert!(Plane::<u8>::new(raw(&bytes, 2, 2, 4)).is_none());
        assert!(Plane::<u8>::new(raw(&bytes, 4, 1, 2)).is_none());
        assert!(Plane::<u8>::new(raw(&bytes, 0, 1, 0)).is_none());
    }

    #[test]
    fn test_ycbcr_uses_half_resolution_chroma() {
        let luma = [16u8, 16, 235, 235, 16, 16, 235, 235];
        // One chroma pixel per 2x2 luma block: (cb, cr).
        let chroma = [128u8, 128, 128, 128];
        let image = YCbCrImage::new(raw(&luma, 4, 2, 4), raw(&chroma, 2, 1, 4)).unwrap();

        let dark = image.color(1, 1).unwrap();
        let bright = image.color(3, 1).unwrap();
        assert_eq!(dark, Vec4::new(0.0, 0.0, 0.0, 1.0));
        assert!(bright.x > 0.99 && bright.y > 0.99 && bright.z > 0.99);
    }

    #[test]
    fn test_ycbcr_rejects_small_chroma_plane() {
        let luma = [0u8; 16];
        let chroma = [0u8; 4];
        assert!(YCbCrImage::new(raw(&luma, 4, 4, 4), raw(&chroma, 2, 1, 4)).is_none());
    }
}
