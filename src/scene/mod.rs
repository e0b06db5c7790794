mod camera;
mod color;
mod displacement;
mod light;
mod material;
mod render_ppm;
mod uniforms;
pub use camera::PerspectiveCamera;
pub use color::{Color, Hsl};
pub use displacement::DisplacementField;
pub use light::{AmbientLight, DirectionalLight, HemisphereLight, Lights, ShadowCamera};
pub use material::SphereMaterial;
pub use render_ppm::render_ppm;
pub use uniforms::SceneUniforms;

use crate::config::DemoConfig;
use crate::geometry::Mesh;
use glam::{EulerRot, Mat4, Vec3};
use rand::Rng;
use std::fmt::Debug;
use std::time::Duration;

const SPHERE_RADIUS: f32 = 50.0;
const NEAR_PLANE: f32 = 1.0;
const FAR_PLANE: f32 = 10000.0;
pub const AXES_SIZE: f32 = 5.0;

/// Linear fog between `near` and `far` distances from the camera.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Fog {
    pub color: Color,
    pub near: f32,
    pub far: f32,
}

impl Default for Fog {
    fn default() -> Self {
        Self {
            color: Color::from_hex(0xf7d9aa),
            near: 100.0,
            far: 950.0,
        }
    }
}

pub struct SphereObject {
    pub mesh: Mesh,
    pub rotation: Vec3,
    pub material: SphereMaterial,
    pub field: DisplacementField,
}

impl SphereObject {
    pub fn new<R: Rng>(
        width_segments: u32,
        height_segments: u32,
        textured: bool,
        rng: &mut R,
    ) -> Self {
        let mesh = Mesh::sphere(SPHERE_RADIUS, width_segments, height_segments);
        let field = DisplacementField::new(mesh.vertices.len(), rng);
        Self {
            mesh,
            rotation: Vec3::ZERO,
            material: SphereMaterial::new(textured),
            field,
        }
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }
}

/// Everything that gets drawn: one sphere, three lights, a camera and the
/// optional axes helper.
pub struct Scene {
    pub background: Color,
    pub transparent: bool,
    pub fog: Fog,
    pub camera: PerspectiveCamera,
    pub lights: Lights,
    pub sphere: SphereObject,
    pub show_axes: bool,
}

impl Scene {
    pub fn new<R: Rng>(config: &DemoConfig, width: u32, height: u32, rng: &mut R) -> Self {
        let params = config.params();
        let mut camera =
            PerspectiveCamera::new(params.field_of_view, 1.0, NEAR_PLANE, FAR_PLANE);
        camera.set_aspect(width, height);
        camera.position = config.camera_position();
        let sphere = SphereObject::new(
            params.width_segments,
            params.height_segments,
            params.textured,
            rng,
        );
        log::info!(
            "scene built: {:?} sphere with {} vertices, fov {}",
            config.variant,
            sphere.field.len(),
            params.field_of_view
        );
        Self {
            background: Color::from_hex(0x111111),
            transparent: params.transparent,
            fog: Fog::default(),
            camera,
            lights: Lights::default(),
            sphere,
            show_axes: config.debug,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_aspect(width, height);
    }

    /// Advance the animation to `time` (see [`animation_time`]).
    pub fn animate<R: Rng>(&mut self, time: f32, rng: &mut R) {
        let spin = 0.01 * time;
        self.sphere.rotation.y = spin;
        self.sphere.rotation.z = spin;
        self.sphere.material.amplitude = 15.0 * (spin * 0.125).sin();
        self.sphere.material.color.offset_hsl(0.0005, 0.0, 0.0);
        self.sphere.field.step(time, rng);
    }

    /// A key press kicks the displacement field one extra step.
    pub fn keydown<K: Debug, R: Rng>(&mut self, key: K, time: f32, rng: &mut R) {
        log::debug!("keydown: {key:?}");
        self.sphere.field.step(time, rng);
    }

    pub fn uniforms(&self) -> SceneUniforms {
        SceneUniforms::from(self)
    }
}

/// Animation clock: wall time in hundredths of a second.
pub fn animation_time(elapsed: Duration) -> f32 {
    (elapsed.as_secs_f64() * 1000.0 * 0.01) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Variant;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn scene(variant: Variant) -> Scene {
        let config = DemoConfig {
            variant,
            ..DemoConfig::default()
        };
        Scene::new(&config, 800, 600, &mut StdRng::seed_from_u64(1))
    }

    #[test]
    fn builds_textured_scene() {
        let scene = scene(Variant::Textured);
        assert_eq!(scene.sphere.field.len(), 129 * 65);
        assert_eq!(scene.sphere.field.len(), scene.sphere.mesh.vertices.len());
        assert_eq!(scene.camera.position, Vec3::new(0.0, 0.0, 300.0));
        assert_eq!(scene.camera.fov, 30.0);
        assert!(!scene.transparent);
        assert!(!scene.show_axes);
        assert_eq!(scene.sphere.material.amplitude, 1.0);
    }

    #[test]
    fn animate_spins_and_scales() {
        let mut scene = scene(Variant::Plain);
        let mut rng = StdRng::seed_from_u64(2);
        let hue = scene.sphere.material.color.to_hsl().h;
        let time = 400.0;
        scene.animate(time, &mut rng);
        assert!((scene.sphere.rotation.y - 4.0).abs() < 1e-5);
        assert_eq!(scene.sphere.rotation.z, scene.sphere.rotation.y);
        assert_eq!(scene.sphere.rotation.x, 0.0);
        assert!((scene.sphere.material.amplitude - 15.0 * 0.5f32.sin()).abs() < 1e-4);
        let shifted = scene.sphere.material.color.to_hsl().h;
        assert!((shifted - hue - 0.0005).abs() < 1e-4);
        assert!(scene.sphere.field.noise().iter().all(|n| n.abs() <= 5.0));
    }

    #[test]
    fn keydown_steps_field() {
        let mut scene = scene(Variant::Plain);
        let mut rng = StdRng::seed_from_u64(4);
        let before = scene.sphere.field.displacement().to_vec();
        scene.keydown("KeyA", 10.0, &mut rng);
        assert_ne!(before, scene.sphere.field.displacement());
    }

    #[test]
    fn resize_changes_aspect_only() {
        let mut scene = scene(Variant::Textured);
        let position = scene.camera.position;
        scene.resize(1000, 500);
        assert_eq!(scene.camera.aspect, 2.0);
        assert_eq!(scene.camera.position, position);
    }

    #[test]
    fn animation_clock() {
        assert_eq!(animation_time(Duration::from_secs(2)), 20.0);
        assert_eq!(animation_time(Duration::ZERO), 0.0);
    }

    #[test]
    fn uniforms_carry_material() {
        let scene = scene(Variant::Textured);
        let u = scene.uniforms();
        assert_eq!(u.material_color[3], 1.0);
        assert_eq!(u.params[0], 1.0);
        assert_eq!(u.fog_range[0], 100.0);
        assert_eq!(u.fog_range[1], 950.0);
        assert_eq!(u.directional_dir[3], 0.0);
    }
}
