/// Spatial deduplication key: world position quantised to grid cells
use constants::capture_settings::GRID_DENSITY;
use glam::Vec3;

/// Integer cell coordinates of a position, one cell per `1 / density` metres per axis.
/// Keyed on the full triple so distinct cells never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridKey {
    x: i32,
    y: i32,
    z: i32,
}

impl GridKey {
    /// Rounds each axis to the nearest cell, halves away from zero.
    /// Non-finite components saturate (NaN maps to cell 0).
    pub fn new(position: Vec3, density: f32) -> Self {
        let cell = (position * density).round();
        Self {
            x: cell.x as i32,
            y: cell.y as i32,
            z: cell.z as i32,
        }
    }

    /// Key at the default 1 cm density.
    pub fn from_position(position: Vec3) -> Self {
        Self::new(position, GRID_DENSITY)
    }

    pub fn cell(&self) -> (i32, i32, i32) {
        (self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_cell_same_key() {
        let a = GridKey::from_position(Vec3::new(0.101, -0.204, 1.0));
        let b = GridKey::from_position(Vec3::new(0.104, -0.196, 1.003));
        assert_eq!(a, b);
        assert_eq!(a.cell(), (10, -20, 100));
    }

    #[test]
    fn test_neighbouring_cells_differ() {
        let a = GridKey::from_position(Vec3::new(0.004, 0.0, 0.0));
        let b = GridKey::from_position(Vec3::new(0.006, 0.0, 0.0));
        assert_ne!(a, b);
        assert_eq!(b.cell(), (1, 0, 0));
    }

    #[test]
    fn test_rounding_is_symmetric_around_zero() {
        assert_eq!(GridKey::from_position(Vec3::splat(-0.004)).cell(), (0, 0, 0));
        assert_eq!(GridKey::from_position(Vec3::splat(-0.006)).cell(), (-1, -1, -1));
    }

    #[test]
    fn test_axis_order_matters() {
        let a = GridKey::from_position(Vec3::new(0.01, 0.02, 0.03));
        let b = GridKey::from_position(Vec3::new(0.03, 0.02, 0.01));
        assert_ne!(a, b);
    }

    #[test]
    fn test_custom_density() {
        // 10 cm cells
        let a = GridKey::new(Vec3::new(0.12, 0.0, 0.0), 10.0);
        let b = GridKey::new(Vec3::new(0.08, 0.0, 0.0), 10.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_non_finite_position_saturates() {
        let key = GridKey::from_position(Vec3::new(f32::NAN, f32::INFINITY, f32::NEG_INFINITY));
        assert_eq!(key.cell(), (0, i32::MAX, i32::MIN));
    }
}
