//! Configuration for a ball pit.
//!
//! Every section is `#[serde(default)]`, so a JSON document only needs the
//! fields it wants to change:
//!
//! ```ignore
//! let config = BallpitConfig::from_json(r#"{ "count": 80, "gravity": 0.0 }"#)?;
//! ```
//!
//! Values are trusted. Nothing here is range-checked: a negative friction or
//! a `minSize` above `maxSize` gives visually odd but non-crashing results.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ConfigError;

/// Physics tuning and box bounds.
///
/// `max_x`/`max_y` are the initial half-extents; once the drawable surface is
/// sized they are overwritten with the viewport-derived world size.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PhysicsConfig {
    /// Number of particles. Fixed for the lifetime of a particle set.
    pub count: usize,
    /// Downward acceleration, scaled per particle by its radius.
    pub gravity: f32,
    /// Velocity multiplier applied every frame.
    pub friction: f32,
    /// Velocity retained after hitting a wall.
    pub wall_bounce: f32,
    /// Per-frame speed limit applied during integration.
    pub max_velocity: f32,
    pub max_x: f32,
    pub max_y: f32,
    pub max_z: f32,
    /// Smallest radius for particles 1..N-1.
    pub min_size: f32,
    /// Largest radius for particles 1..N-1.
    pub max_size: f32,
    /// Radius of particle 0.
    pub size0: f32,
    /// Whether particle 0 chases the projected pointer.
    pub control_sphere0: bool,
    /// Whether particle 0 is drawn at all.
    pub follow_cursor: bool,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            count: 200,
            gravity: 0.5,
            friction: 0.9975,
            wall_bounce: 0.95,
            max_velocity: 0.15,
            max_x: 5.0,
            max_y: 5.0,
            max_z: 2.0,
            min_size: 0.5,
            max_size: 1.0,
            size0: 1.0,
            control_sphere0: false,
            follow_cursor: true,
        }
    }
}

/// Surface parameters handed to the rendering backend's physical material.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct MaterialParams {
    pub metalness: f32,
    pub roughness: f32,
    pub clearcoat: f32,
    pub clearcoat_roughness: f32,
}

impl Default for MaterialParams {
    fn default() -> Self {
        Self {
            metalness: 0.5,
            roughness: 0.5,
            clearcoat: 1.0,
            clearcoat_roughness: 0.15,
        }
    }
}

/// Extra subsurface-style lighting term applied by the rendering backend.
///
/// The simulation itself never reads these; they are forwarded untouched.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScatteringParams {
    pub distortion: f32,
    pub ambient: f32,
    pub attenuation: f32,
    pub power: f32,
    pub scale: f32,
}

impl Default for ScatteringParams {
    fn default() -> Self {
        Self {
            distortion: 0.1,
            ambient: 0.0,
            attenuation: 0.1,
            power: 2.0,
            scale: 10.0,
        }
    }
}

/// How the drawable surface's size is determined on resize.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum SurfaceSizing {
    /// Follow the surface's current bounding rectangle.
    #[default]
    Surface,
    /// Always use this size; resize events are ignored.
    Fixed { width: f32, height: f32 },
}

/// Camera and surface options for the render core.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewConfig {
    /// Reference vertical field of view in degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Camera position; the camera always looks at the origin.
    pub camera_position: [f32; 3],
    /// Below this aspect ratio the FOV widens to keep horizontal framing.
    pub min_aspect: Option<f32>,
    /// Above this aspect ratio the FOV narrows to keep horizontal framing.
    pub max_aspect: Option<f32>,
    pub min_pixel_ratio: Option<f32>,
    pub max_pixel_ratio: Option<f32>,
    /// Quiet period before a burst of resize events is applied.
    pub resize_debounce_ms: u64,
    pub sizing: SurfaceSizing,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            fov: 50.0,
            near: 0.1,
            far: 100.0,
            camera_position: [0.0, 0.0, 20.0],
            min_aspect: None,
            max_aspect: Some(1.5),
            min_pixel_ratio: None,
            max_pixel_ratio: None,
            resize_debounce_ms: 100,
            sizing: SurfaceSizing::Surface,
        }
    }
}

/// Complete ball pit configuration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct BallpitConfig {
    #[serde(flatten)]
    pub physics: PhysicsConfig,
    /// Hex RGB colors interpolated across particle indices.
    pub colors: Vec<u32>,
    pub ambient_color: u32,
    pub ambient_intensity: f32,
    pub light_intensity: f32,
    pub material: MaterialParams,
    pub scattering: ScatteringParams,
    pub view: ViewConfig,
}

impl Default for BallpitConfig {
    fn default() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            colors: vec![0x000000, 0x000000, 0x000000],
            ambient_color: 0xffffff,
            ambient_intensity: 1.0,
            light_intensity: 200.0,
            material: MaterialParams::default(),
            scattering: ScatteringParams::default(),
            view: ViewConfig::default(),
        }
    }
}

impl BallpitConfig {
    /// Set the number of particles.
    pub fn with_count(mut self, count: usize) -> Self {
        self.physics.count = count;
        self
    }

    /// Set the gravity strength. `0.0` also enables the ceiling.
    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.physics.gravity = gravity;
        self
    }

    /// Set the per-frame velocity multiplier.
    pub fn with_friction(mut self, friction: f32) -> Self {
        self.physics.friction = friction;
        self
    }

    /// Set wall restitution.
    pub fn with_wall_bounce(mut self, wall_bounce: f32) -> Self {
        self.physics.wall_bounce = wall_bounce;
        self
    }

    /// Set the speed limit.
    pub fn with_max_velocity(mut self, max_velocity: f32) -> Self {
        self.physics.max_velocity = max_velocity;
        self
    }

    /// Set the box half-extents.
    pub fn with_bounds(mut self, max_x: f32, max_y: f32, max_z: f32) -> Self {
        self.physics.max_x = max_x;
        self.physics.max_y = max_y;
        self.physics.max_z = max_z;
        self
    }

    /// Set the radius range for particles 1..N-1 and the radius of particle 0.
    pub fn with_sizes(mut self, min_size: f32, max_size: f32, size0: f32) -> Self {
        self.physics.min_size = min_size;
        self.physics.max_size = max_size;
        self.physics.size0 = size0;
        self
    }

    /// Bind particle 0 to the pointer from the first frame.
    pub fn with_control_sphere0(mut self, enabled: bool) -> Self {
        self.physics.control_sphere0 = enabled;
        self
    }

    /// Show or hide particle 0.
    pub fn with_follow_cursor(mut self, enabled: bool) -> Self {
        self.physics.follow_cursor = enabled;
        self
    }

    /// Set the color list.
    pub fn with_colors(mut self, colors: impl Into<Vec<u32>>) -> Self {
        self.colors = colors.into();
        self
    }

    /// Replace the camera and surface options.
    pub fn with_view(mut self, view: ViewConfig) -> Self {
        self.view = view;
        self
    }

    /// Parse a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Save the configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_component() {
        let config = BallpitConfig::default();
        assert_eq!(config.physics.count, 200);
        assert_eq!(config.physics.gravity, 0.5);
        assert_eq!(config.physics.friction, 0.9975);
        assert_eq!(config.physics.max_velocity, 0.15);
        assert!(!config.physics.control_sphere0);
        assert!(config.physics.follow_cursor);
        assert_eq!(config.view.max_aspect, Some(1.5));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = BallpitConfig::from_json(r#"{ "count": 12, "wallBounce": 0.5 }"#).unwrap();
        assert_eq!(config.physics.count, 12);
        assert_eq!(config.physics.wall_bounce, 0.5);
        assert_eq!(config.physics.max_z, 2.0);
        assert_eq!(config.light_intensity, 200.0);
    }

    #[test]
    fn test_nested_sections_and_sizing() {
        let json = r#"{
            "view": { "fov": 35.0, "sizing": { "fixed": { "width": 640.0, "height": 480.0 } } },
            "scattering": { "power": 4.0 }
        }"#;
        let config = BallpitConfig::from_json(json).unwrap();
        assert_eq!(config.view.fov, 35.0);
        assert_eq!(config.view.near, 0.1);
        assert_eq!(
            config.view.sizing,
            SurfaceSizing::Fixed { width: 640.0, height: 480.0 }
        );
        assert_eq!(config.scattering.power, 4.0);
        assert_eq!(config.scattering.scale, 10.0);
    }

    #[test]
    fn test_json_round_trip_through_file() {
        let path = std::env::temp_dir().join("ballpit_config_round_trip.json");
        let config = BallpitConfig::default()
            .with_count(7)
            .with_gravity(0.0)
            .with_colors(vec![0xff0000, 0x00ff00]);
        config.save(&path).unwrap();
        let loaded = BallpitConfig::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = BallpitConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
