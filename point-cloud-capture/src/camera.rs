/// Camera geometry: orientation correction and pixel unprojection into world space
use crate::planes::Size;
use constants::coordinate_system::{
    FLIP_YZ, LANDSCAPE_LEFT_ROTATION, LANDSCAPE_RIGHT_ROTATION, PORTRAIT_ROTATION,
    PORTRAIT_UPSIDE_DOWN_ROTATION,
};
use glam::{Mat3, Mat4, Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Interface orientation the view matrix was requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceOrientation {
    #[default]
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
}

impl DeviceOrientation {
    /// Rotation about the viewing axis, in radians.
    pub fn rotation_angle(self) -> f32 {
        match self {
            DeviceOrientation::Portrait => PORTRAIT_ROTATION,
            DeviceOrientation::PortraitUpsideDown => PORTRAIT_UPSIDE_DOWN_ROTATION,
            DeviceOrientation::LandscapeLeft => LANDSCAPE_LEFT_ROTATION,
            DeviceOrientation::LandscapeRight => LANDSCAPE_RIGHT_ROTATION,
        }
    }

    /// Axis flip composed with the orientation rotation: `FLIP_YZ * Rz(angle)`.
    pub fn camera_correction(self) -> Mat4 {
        let rotation = Quat::from_axis_angle(Vec3::Z, self.rotation_angle());
        FLIP_YZ * Mat4::from_quat(rotation)
    }
}

/// Per-frame camera state. Read only, never stored past the frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    /// Pinhole intrinsics in image pixels (column-major, principal point in the third column).
    pub intrinsics: Mat3,
    /// World to camera transform for `orientation`.
    pub view_matrix: Mat4,
    pub orientation: DeviceOrientation,
}

impl CameraPose {
    /// Intrinsics from focal lengths and principal point.
    pub fn intrinsics_from(focal: Vec2, principal_point: Vec2) -> Mat3 {
        Mat3::from_cols(
            Vec3::new(focal.x, 0.0, 0.0),
            Vec3::new(0.0, focal.y, 0.0),
            principal_point.extend(1.0),
        )
    }
}

/// Maps depth-plane pixels to world positions for one frame.
/// Matrix inverses are computed once on construction. Singular intrinsics are not guarded
/// and yield non-finite positions.
#[derive(Debug, Clone, Copy)]
pub struct Unprojector {
    inverse_intrinsics: Mat3,
    world_transform: Mat4,
    depth_size: Vec2,
    image_size: Vec2,
    image_extent: Size,
}

impl Unprojector {
    pub fn new(pose: &CameraPose, depth_size: Size, image_size: Size) -> Self {
        let world_transform = pose.view_matrix.inverse() * pose.orientation.camera_correction();

        Self {
            inverse_intrinsics: pose.intrinsics.inverse(),
            world_transform,
            depth_size: depth_size.as_vec2(),
            image_size: image_size.as_vec2(),
            image_extent: image_size,
        }
    }

    /// Depth-plane pixel in [0, 1) texture coordinates.
    pub fn normalized(&self, col: usize, row: usize) -> Vec2 {
        Vec2::new(col as f32, row as f32) / self.depth_size
    }

    /// World position of the depth sample at (col, row), `depth` in metres.
    pub fn unproject(&self, col: usize, row: usize, depth: f32) -> Vec3 {
        let screen_point = (self.normalized(col, row) * self.image_size).extend(1.0);
        let local_point = self.inverse_intrinsics * screen_point * depth;
        let world_point = self.world_transform * local_point.extend(1.0);

        world_point.truncate() / world_point.w
    }

    /// Colour image pixel matching the depth pixel, clamped into the image.
    pub fn image_pixel(&self, col: usize, row: usize) -> (usize, usize) {
        let pixel = (self.normalized(col, row) * self.image_size).round();
        let x = (pixel.x.max(0.0) as usize).min(self.image_extent.width.saturating_sub(1));
        let y = (pixel.y.max(0.0) as usize).min(self.image_extent.height.saturating_sub(1));
        (x, y)
    }
}
