/// Per-pixel depth confidence levels reported by the sensor
pub const CONFIDENCE_LOW: u8 = 0;
pub const CONFIDENCE_MEDIUM: u8 = 1;
pub const CONFIDENCE_HIGH: u8 = 2;
