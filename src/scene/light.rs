use crate::scene::Color;
use glam::Vec3;

/// Sky/ground gradient light.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HemisphereLight {
    pub sky: Color,
    pub ground: Color,
    pub intensity: f32,
}

/// Shadow frustum recorded on the directional light. No shadow map is rendered.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ShadowCamera {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
    pub near: f32,
    pub far: f32,
    pub map_size: (u32, u32),
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DirectionalLight {
    pub color: Color,
    pub intensity: f32,
    pub position: Vec3,
    pub cast_shadow: bool,
    pub shadow: ShadowCamera,
}

impl DirectionalLight {
    /// Unit vector pointing from the scene origin towards the light.
    pub fn direction(&self) -> Vec3 {
        self.position.normalize_or_zero()
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AmbientLight {
    pub color: Color,
    pub intensity: f32,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Lights {
    pub hemisphere: HemisphereLight,
    pub directional: DirectionalLight,
    pub ambient: AmbientLight,
}

impl Default for Lights {
    fn default() -> Self {
        Self {
            hemisphere: HemisphereLight {
                sky: Color::from_hex(0xaaaaaa),
                ground: Color::from_hex(0x000000),
                intensity: 0.9,
            },
            directional: DirectionalLight {
                color: Color::from_hex(0xffffff),
                intensity: 0.9,
                position: Vec3::new(150.0, 350.0, 350.0),
                cast_shadow: true,
                shadow: ShadowCamera {
                    left: -400.0,
                    right: 400.0,
                    top: 400.0,
                    bottom: -400.0,
                    near: 1.0,
                    far: 1000.0,
                    map_size: (2048, 2048),
                },
            },
            ambient: AmbientLight {
                color: Color::from_hex(0xdc8874),
                intensity: 0.3,
            },
        }
    }
}
