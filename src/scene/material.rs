use crate::scene::Color;

const INITIAL_COLOR: u32 = 0x8855ff;

/// Parameters fed to the sphere shader.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SphereMaterial {
    /// Scale applied to the displacement attribute and to the texture coordinates.
    pub amplitude: f32,
    pub color: Color,
    pub textured: bool,
}

impl SphereMaterial {
    pub fn new(textured: bool) -> Self {
        Self {
            amplitude: 1.0,
            color: Color::from_hex(INITIAL_COLOR),
            textured,
        }
    }
}
