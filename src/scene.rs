//! Scene contents and the contract with the rendering backend.
//!
//! The core never touches the GPU directly. It asks a [`RenderBackend`] for
//! geometry and material handles, fills a [`Scene`] with instanced sphere
//! meshes, and issues one [`RenderBackend::render`] per frame. Every handle
//! the scene holds is released back to the backend when the scene is
//! cleared; forgetting to do so leaks GPU memory.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::camera::PerspectiveCamera;
use crate::config::{MaterialParams, ScatteringParams};

/// Opaque backend geometry resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryHandle(pub u32);

/// Opaque backend material resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialHandle(pub u32);

/// Everything a backend needs to build a sphere material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialDesc {
    pub params: MaterialParams,
    pub scattering: ScatteringParams,
}

/// Rendering backend driven by the core.
///
/// Implementations own all GPU state. Methods are infallible from the
/// core's point of view: a backend recovers from or logs its own errors so
/// the frame callback always returns.
pub trait RenderBackend {
    /// Create the unit sphere mesh shared by all instances of a mesh.
    fn create_sphere_geometry(&mut self) -> GeometryHandle;

    /// Create a material for a sphere mesh.
    fn create_material(&mut self, desc: &MaterialDesc) -> MaterialHandle;

    fn release_geometry(&mut self, handle: GeometryHandle);

    fn release_material(&mut self, handle: MaterialHandle);

    /// Resize the drawing buffer. `width`/`height` are logical pixels.
    fn set_size(&mut self, width: f32, height: f32, pixel_ratio: f32);

    /// Draw the scene from the camera.
    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera);

    /// Release backend-wide resources. Called once, after the scene is cleared.
    fn dispose(&mut self);
}

/// Per-instance data, laid out for direct upload as a vertex buffer.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct SphereInstance {
    pub position: [f32; 3],
    /// Uniform scale (the particle radius). Zero hides the instance.
    pub scale: f32,
    pub color: [f32; 3],
    pub _pad: f32,
}

impl SphereInstance {
    pub fn new(position: Vec3, scale: f32, color: Vec3) -> Self {
        Self {
            position: position.to_array(),
            scale,
            color: color.to_array(),
            _pad: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: Vec3,
    pub intensity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f32,
}

/// Instanced sphere mesh with the lights it carries.
#[derive(Debug, Clone)]
pub struct SphereMesh {
    pub geometry: GeometryHandle,
    pub material: MaterialHandle,
    pub instances: Vec<SphereInstance>,
    pub ambient_light: AmbientLight,
    pub point_light: PointLight,
}

/// Index of a mesh inside a [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshId(usize);

/// Flat list of meshes.
#[derive(Debug, Default)]
pub struct Scene {
    meshes: Vec<SphereMesh>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, mesh: SphereMesh) -> MeshId {
        self.meshes.push(mesh);
        MeshId(self.meshes.len() - 1)
    }

    pub fn mesh(&self, id: MeshId) -> Option<&SphereMesh> {
        self.meshes.get(id.0)
    }

    pub fn mesh_mut(&mut self, id: MeshId) -> Option<&mut SphereMesh> {
        self.meshes.get_mut(id.0)
    }

    pub fn meshes(&self) -> &[SphereMesh] {
        &self.meshes
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Release every mesh's material and geometry, then empty the scene.
    pub fn clear(&mut self, backend: &mut dyn RenderBackend) {
        for mesh in self.meshes.drain(..) {
            backend.release_material(mesh.material);
            backend.release_geometry(mesh.geometry);
            log::debug!(
                "released mesh resources (geometry {}, material {})",
                mesh.geometry.0,
                mesh.material.0
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Releases {
        geometries: Vec<u32>,
        materials: Vec<u32>,
    }

    impl RenderBackend for Releases {
        fn create_sphere_geometry(&mut self) -> GeometryHandle {
            GeometryHandle(0)
        }
        fn create_material(&mut self, _desc: &MaterialDesc) -> MaterialHandle {
            MaterialHandle(0)
        }
        fn release_geometry(&mut self, handle: GeometryHandle) {
            self.geometries.push(handle.0);
        }
        fn release_material(&mut self, handle: MaterialHandle) {
            self.materials.push(handle.0);
        }
        fn set_size(&mut self, _width: f32, _height: f32, _pixel_ratio: f32) {}
        fn render(&mut self, _scene: &Scene, _camera: &PerspectiveCamera) {}
        fn dispose(&mut self) {}
    }

    fn mesh(id: u32) -> SphereMesh {
        SphereMesh {
            geometry: GeometryHandle(id),
            material: MaterialHandle(id + 100),
            instances: Vec::new(),
            ambient_light: AmbientLight {
                color: Vec3::ONE,
                intensity: 1.0,
            },
            point_light: PointLight {
                position: Vec3::ZERO,
                color: Vec3::ONE,
                intensity: 1.0,
            },
        }
    }

    #[test]
    fn test_instance_layout_is_32_bytes() {
        assert_eq!(std::mem::size_of::<SphereInstance>(), 32);
        let instance = SphereInstance::new(Vec3::new(1.0, 2.0, 3.0), 0.5, Vec3::X);
        let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&instance));
        assert_eq!(floats, &[1.0, 2.0, 3.0, 0.5, 1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_clear_releases_every_handle_once() {
        let mut scene = Scene::new();
        let a = scene.add(mesh(1));
        scene.add(mesh(2));
        assert_eq!(scene.mesh(a).unwrap().geometry, GeometryHandle(1));

        let mut backend = Releases::default();
        scene.clear(&mut backend);
        scene.clear(&mut backend);
        assert!(scene.is_empty());
        assert_eq!(backend.geometries, vec![1, 2]);
        assert_eq!(backend.materials, vec![101, 102]);
    }
}
