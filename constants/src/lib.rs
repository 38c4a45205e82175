pub mod capture_settings;
pub mod confidence;
pub mod coordinate_system;
pub mod export;
