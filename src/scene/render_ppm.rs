use crate::error::Result;
use crate::renderer::Renderer;
use std::fmt::Write;

/// Draws one frame into a headless renderer and encodes it as a plain PPM.
pub fn render_ppm(renderer: &mut Renderer) -> Result<String> {
    let width = renderer.config.width;
    let height = renderer.config.height;
    renderer.draw()?;
    let pixels = renderer.read_pixels()?;
    let mut ret = String::with_capacity(pixels.len() * 3);
    writeln!(ret, "P3").unwrap();
    writeln!(ret, "{width} {height} 255").unwrap();
    for rgba in pixels.chunks_exact(4) {
        write!(ret, "{} {} {} ", rgba[0], rgba[1], rgba[2]).unwrap();
    }
    Ok(ret)
}
