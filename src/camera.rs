//! Perspective camera, world-size math and pointer ray projection.
//!
//! The visible world rectangle at the camera's distance from the origin is
//!
//! ```text
//! w_height = 2 * tan(fov / 2) * distance
//! w_width  = w_height * aspect
//! ```
//!
//! and is what the physics box is sized to on every resize.

use glam::{Mat4, Vec2, Vec3};

use crate::config::ViewConfig;

/// Visible world-space extent of the scene at the camera's distance.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WorldSize {
    pub width: f32,
    pub height: f32,
}

/// Perspective camera looking at a fixed target.
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    /// Camera position in world space.
    pub position: Vec3,
    /// Point the camera looks at.
    pub target: Vec3,
    /// Current vertical field of view in degrees.
    pub fov: f32,
    /// Reference vertical field of view the aspect lock is relative to.
    pub base_fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub min_aspect: Option<f32>,
    pub max_aspect: Option<f32>,
}

impl PerspectiveCamera {
    /// Create a camera from the view options.
    pub fn new(view: &ViewConfig) -> Self {
        Self {
            position: Vec3::from_array(view.camera_position),
            target: Vec3::ZERO,
            fov: view.fov,
            base_fov: view.fov,
            aspect: 1.0,
            near: view.near,
            far: view.far,
            min_aspect: view.min_aspect,
            max_aspect: view.max_aspect,
        }
    }

    /// Set the real viewport aspect and re-derive the field of view.
    ///
    /// Outside `[min_aspect, max_aspect]` the FOV is rescaled through the
    /// tangent of the half angle so framing matches the nearest allowed
    /// aspect, while `aspect` keeps the real value.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.fov = match (self.min_aspect, self.max_aspect) {
            (Some(min), _) if aspect < min => self.locked_fov(min),
            (_, Some(max)) if aspect > max => self.locked_fov(max),
            _ => self.base_fov,
        };
    }

    fn locked_fov(&self, locked_aspect: f32) -> f32 {
        let tangent = (self.base_fov.to_radians() / 2.0).tan() / (self.aspect / locked_aspect);
        2.0 * tangent.atan().to_degrees()
    }

    /// Distance from the camera to the world origin.
    pub fn distance(&self) -> f32 {
        self.position.length()
    }

    /// Visible world rectangle at [`distance`](Self::distance).
    pub fn world_size(&self) -> WorldSize {
        let height = 2.0 * (self.fov.to_radians() / 2.0).tan() * self.distance();
        WorldSize {
            width: height * self.aspect,
            height,
        }
    }

    /// Unit vector the camera looks along.
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }

    /// Calculate the view matrix for rendering.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    /// Calculate the projection matrix for rendering.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Ray from the camera through a point in normalized device coordinates.
    pub fn ray_through(&self, ndc: Vec2) -> Ray {
        let inverse = self.view_proj().inverse();
        let on_ray = inverse.project_point3(Vec3::new(ndc.x, ndc.y, 0.5));
        Ray {
            origin: self.position,
            direction: (on_ray - self.position).normalize_or_zero(),
        }
    }
}

/// Half-line in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Point where the ray meets `plane`, or `None` if it is parallel to the
    /// plane or the plane lies behind the origin.
    pub fn intersect_plane(&self, plane: &Plane) -> Option<Vec3> {
        let denominator = plane.normal.dot(self.direction);
        if denominator == 0.0 {
            return None;
        }
        let t = -(self.origin.dot(plane.normal) + plane.constant) / denominator;
        if t < 0.0 {
            return None;
        }
        Some(self.origin + self.direction * t)
    }
}

/// Plane `normal · p + constant = 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub constant: f32,
}

impl Plane {
    pub fn new(normal: Vec3, constant: f32) -> Self {
        Self { normal, constant }
    }
}

/// Maps pointer NDC onto a camera-facing plane through the origin.
///
/// The plane normal is refreshed from the camera on every projection, so
/// the projected point stays at the same visual depth however the camera
/// is oriented.
#[derive(Debug, Clone)]
pub struct RayProjector {
    plane: Plane,
    last_hit: Vec3,
}

impl RayProjector {
    pub fn new() -> Self {
        Self {
            plane: Plane::new(Vec3::Z, 0.0),
            last_hit: Vec3::ZERO,
        }
    }

    /// Project `ndc` into the world. A miss keeps the previous hit.
    pub fn project(&mut self, camera: &PerspectiveCamera, ndc: Vec2) -> Vec3 {
        self.plane.normal = camera.forward();
        if let Some(hit) = camera.ray_through(ndc).intersect_plane(&self.plane) {
            self.last_hit = hit;
        }
        self.last_hit
    }

    /// Most recent intersection point.
    pub fn last_hit(&self) -> Vec3 {
        self.last_hit
    }
}

impl Default for RayProjector {
    fn default() -> Self {
        Self::new()
    }
}
