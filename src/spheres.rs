//! The ball pit's instanced spheres: physics plus what gets drawn.

use glam::Vec3;

use crate::color::{hex_to_linear, ColorRamp};
use crate::config::BallpitConfig;
use crate::physics::PhysicsEngine;
use crate::scene::{
    AmbientLight, MaterialDesc, MeshId, PointLight, RenderBackend, Scene, SphereInstance, SphereMesh,
};

/// A particle set bound to one mesh in the scene.
pub struct Spheres {
    config: BallpitConfig,
    physics: PhysicsEngine,
    colors: Vec<Vec3>,
    mesh: MeshId,
}

impl Spheres {
    /// Build a particle set and its mesh, allocating backend resources.
    pub fn new(config: BallpitConfig, backend: &mut dyn RenderBackend, scene: &mut Scene) -> Self {
        let physics = PhysicsEngine::new(config.physics.clone());
        Self::with_physics(config, physics, backend, scene)
    }

    /// Like [`new`](Self::new) with a prepared physics engine.
    pub fn with_physics(
        config: BallpitConfig,
        physics: PhysicsEngine,
        backend: &mut dyn RenderBackend,
        scene: &mut Scene,
    ) -> Self {
        let count = physics.particles().len();
        let colors = instance_colors(&config.colors, count);
        let light_color = colors.first().copied().unwrap_or(Vec3::ONE);

        let geometry = backend.create_sphere_geometry();
        let material = backend.create_material(&MaterialDesc {
            params: config.material,
            scattering: config.scattering,
        });
        let mesh = scene.add(SphereMesh {
            geometry,
            material,
            instances: vec![SphereInstance::new(Vec3::ZERO, 0.0, Vec3::ONE); count],
            ambient_light: AmbientLight {
                color: hex_to_linear(config.ambient_color),
                intensity: config.ambient_intensity,
            },
            point_light: PointLight {
                position: Vec3::ZERO,
                color: light_color,
                intensity: config.light_intensity,
            },
        });

        let spheres = Self {
            config,
            physics,
            colors,
            mesh,
        };
        if let Some(mesh) = scene.mesh_mut(spheres.mesh) {
            spheres.write_instances(mesh);
        }
        log::info!("created ball pit with {} spheres", count);
        spheres
    }

    pub fn config(&self) -> &BallpitConfig {
        &self.config
    }

    pub fn physics(&self) -> &PhysicsEngine {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut PhysicsEngine {
        &mut self.physics
    }

    pub fn mesh(&self) -> MeshId {
        self.mesh
    }

    /// Number of spheres.
    pub fn count(&self) -> usize {
        self.physics.particles().len()
    }

    /// Step the physics and push the new transforms into the mesh.
    pub fn update(&mut self, delta: f32, scene: &mut Scene) {
        self.physics.update(delta);
        if let Some(mesh) = scene.mesh_mut(self.mesh) {
            self.write_instances(mesh);
        }
    }

    fn write_instances(&self, mesh: &mut SphereMesh) {
        let particles = self.physics.particles();
        let hide_first = !self.physics.config().follow_cursor;
        for (i, instance) in mesh.instances.iter_mut().enumerate() {
            let scale = if i == 0 && hide_first {
                0.0
            } else {
                particles.size(i)
            };
            *instance = SphereInstance::new(particles.position(i), scale, self.colors[i]);
        }
        if !particles.is_empty() {
            mesh.point_light.position = particles.position(0);
        }
    }
}

/// Color for each particle index. White when fewer than two colors are given.
fn instance_colors(colors: &[u32], count: usize) -> Vec<Vec3> {
    match ColorRamp::from_hex(colors) {
        Some(ramp) => (0..count)
            .map(|i| ramp.color_at(i as f32 / count as f32))
            .collect(),
        None => vec![Vec3::ONE; count],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::PerspectiveCamera;
    use crate::physics::ParticleSet;
    use crate::scene::{GeometryHandle, MaterialHandle};

    #[derive(Default)]
    struct NullBackend {
        next: u32,
    }

    impl RenderBackend for NullBackend {
        fn create_sphere_geometry(&mut self) -> GeometryHandle {
            self.next += 1;
            GeometryHandle(self.next)
        }
        fn create_material(&mut self, _desc: &MaterialDesc) -> MaterialHandle {
            self.next += 1;
            MaterialHandle(self.next)
        }
        fn release_geometry(&mut self, _handle: GeometryHandle) {}
        fn release_material(&mut self, _handle: MaterialHandle) {}
        fn set_size(&mut self, _width: f32, _height: f32, _pixel_ratio: f32) {}
        fn render(&mut self, _scene: &Scene, _camera: &PerspectiveCamera) {}
        fn dispose(&mut self) {}
    }

    fn placed(config: &BallpitConfig) -> PhysicsEngine {
        let mut set = ParticleSet::new(config.physics.count);
        for i in 0..set.len() {
            set.set_position(i, Vec3::new(i as f32 * 2.5 - 2.0, 0.0, 0.0));
        }
        set.set_size(1, 0.75);
        PhysicsEngine::from_particles(config.physics.clone(), set)
    }

    #[test]
    fn test_instances_mirror_particles() {
        let config = BallpitConfig::default().with_count(3).with_gravity(0.0);
        let mut scene = Scene::new();
        let mut backend = NullBackend::default();
        let spheres = Spheres::with_physics(config.clone(), placed(&config), &mut backend, &mut scene);

        let mesh = scene.mesh(spheres.mesh()).unwrap();
        assert_eq!(mesh.instances.len(), 3);
        assert_eq!(mesh.instances[1].position, [0.5, 0.0, 0.0]);
        assert_eq!(mesh.instances[1].scale, 0.75);
        assert_eq!(mesh.point_light.position, Vec3::new(-2.0, 0.0, 0.0));
        assert_eq!(mesh.point_light.intensity, 200.0);
    }

    #[test]
    fn test_hidden_cursor_sphere_has_zero_scale() {
        let config = BallpitConfig::default()
            .with_count(3)
            .with_gravity(0.0)
            .with_follow_cursor(false);
        let mut scene = Scene::new();
        let mut backend = NullBackend::default();
        let mut spheres = Spheres::with_physics(config.clone(), placed(&config), &mut backend, &mut scene);
        spheres.update(0.016, &mut scene);

        let mesh = scene.mesh(spheres.mesh()).unwrap();
        assert_eq!(mesh.instances[0].scale, 0.0);
        assert!(mesh.instances[2].scale > 0.0);
    }

    #[test]
    fn test_colors_follow_index_ramp() {
        let colors = instance_colors(&[0x000000, 0xffffff], 4);
        assert_eq!(colors[0], Vec3::ZERO);
        assert!((colors[2].x - 0.5).abs() < 1e-4);
        assert!(colors[3].x < 1.0);

        let plain = instance_colors(&[0xff0000], 2);
        assert_eq!(plain, vec![Vec3::ONE; 2]);
    }

    #[test]
    fn test_point_light_takes_first_color() {
        let config = BallpitConfig::default()
            .with_count(4)
            .with_colors(vec![0xff0000, 0x0000ff]);
        let mut scene = Scene::new();
        let mut backend = NullBackend::default();
        let spheres = Spheres::new(config, &mut backend, &mut scene);
        let light = scene.mesh(spheres.mesh()).unwrap().point_light;
        assert!((light.color.x - 1.0).abs() < 1e-5);
        assert_eq!(light.color.z, 0.0);
    }
}
