/// Luma/chroma to normalised RGBA conversion
use glam::Vec4;

const LUMA_OFFSET: f32 = 16.0;
const CHROMA_OFFSET: f32 = 128.0;

const LUMA_SCALE: f32 = 1.164;
const CR_TO_RED: f32 = 1.596;
const CB_TO_GREEN: f32 = 0.392;
const CR_TO_GREEN: f32 = 0.813;
const CB_TO_BLUE: f32 = 2.017;

/// Converts one luma sample and its chroma pair into RGBA in [0, 1].
/// Alpha is always 1.
pub fn ycbcr_to_rgba(luma: u8, cb: u8, cr: u8) -> Vec4 {
    let y = luma as f32 - LUMA_OFFSET;
    let cb = cb as f32 - CHROMA_OFFSET;
    let cr = cr as f32 - CHROMA_OFFSET;

    let r = LUMA_SCALE * y + CR_TO_RED * cr;
    let g = LUMA_SCALE * y - CB_TO_GREEN * cb - CR_TO_GREEN * cr;
    let b = LUMA_SCALE * y + CB_TO_BLUE * cb;

    Vec4::new(normalize(r), normalize(g), normalize(b), 1.0)
}

fn normalize(channel: f32) -> f32 {
    channel.clamp(0.0, 255.0) / 255.0
}
