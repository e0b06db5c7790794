use crate::scene::Scene;
use bytemuck::{Pod, Zeroable};

/// GPU mirror of the scene state; every field is 16-byte aligned to match WGSL.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct SceneUniforms {
    pub view_proj: [[f32; 4]; 4],
    /// world to camera, fog distance is the view-space depth
    pub view: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    /// rgb + intensity
    pub hemisphere_sky: [f32; 4],
    pub hemisphere_ground: [f32; 4],
    pub directional_color: [f32; 4],
    /// xyz towards the light
    pub directional_dir: [f32; 4],
    pub ambient: [f32; 4],
    pub fog_color: [f32; 4],
    /// near, far
    pub fog_range: [f32; 4],
    /// rgb + textured flag
    pub material_color: [f32; 4],
    /// amplitude
    pub params: [f32; 4],
}

fn rgb_w(rgb: [f32; 3], w: f32) -> [f32; 4] {
    [rgb[0], rgb[1], rgb[2], w]
}

impl From<&Scene> for SceneUniforms {
    fn from(scene: &Scene) -> Self {
        let lights = &scene.lights;
        let material = &scene.sphere.material;
        Self {
            view_proj: scene.camera.view_projection().to_cols_array_2d(),
            view: scene.camera.view_matrix().to_cols_array_2d(),
            model: scene.sphere.model_matrix().to_cols_array_2d(),
            hemisphere_sky: rgb_w(lights.hemisphere.sky.to_array(), lights.hemisphere.intensity),
            hemisphere_ground: rgb_w(
                lights.hemisphere.ground.to_array(),
                lights.hemisphere.intensity,
            ),
            directional_color: rgb_w(
                lights.directional.color.to_array(),
                lights.directional.intensity,
            ),
            directional_dir: lights
                .directional
                .direction()
                .extend(0.0)
                .to_array(),
            ambient: rgb_w(lights.ambient.color.to_array(), lights.ambient.intensity),
            fog_color: rgb_w(scene.fog.color.to_array(), 1.0),
            fog_range: [scene.fog.near, scene.fog.far, 0.0, 0.0],
            material_color: rgb_w(
                material.color.to_array(),
                if material.textured { 1.0 } else { 0.0 },
            ),
            params: [material.amplitude, 0.0, 0.0, 0.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DemoConfig;
    use glam::{Mat4, Vec3};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::mem::size_of;

    #[test]
    fn layout_is_uniform_friendly() {
        assert_eq!(size_of::<SceneUniforms>() % 16, 0);
        assert_eq!(size_of::<SceneUniforms>(), 3 * 64 + 9 * 16);
    }

    #[test]
    fn fog_depth_is_planar() {
        let mut rng = StdRng::seed_from_u64(1);
        let scene = Scene::new(&DemoConfig::default(), 800, 600, &mut rng);
        let view = Mat4::from_cols_array_2d(&scene.uniforms().view);
        // points on the same plane facing the camera share one fog depth
        let center = -view.transform_point3(Vec3::ZERO).z;
        let edge = -view.transform_point3(Vec3::new(100.0, 60.0, 0.0)).z;
        assert!((center - 300.0).abs() < 1e-3);
        assert!((edge - center).abs() < 1e-3);
    }
}
