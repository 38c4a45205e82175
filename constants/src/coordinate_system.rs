use glam::Mat4;
use std::f32::consts::{FRAC_PI_2, PI};

/// Sensor camera space to rendering camera space (column-major).
/// Y and Z are negated, X is unchanged.
pub const FLIP_YZ: Mat4 = Mat4::from_cols_array(&[
    1.0, 0.0, 0.0, 0.0, // X = X
    0.0, -1.0, 0.0, 0.0, // Y = -Y
    0.0, 0.0, -1.0, 0.0, // Z = -Z
    0.0, 0.0, 0.0, 1.0,
]);

/// Rotation about the viewing axis for each interface orientation (radians)
pub const PORTRAIT_ROTATION: f32 = FRAC_PI_2;
pub const PORTRAIT_UPSIDE_DOWN_ROTATION: f32 = -FRAC_PI_2;
pub const LANDSCAPE_LEFT_ROTATION: f32 = PI;
pub const LANDSCAPE_RIGHT_ROTATION: f32 = 0.0;
