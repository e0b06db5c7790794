use wgpu::{
    AddressMode, Device, Extent3d, FilterMode, ImageCopyTexture, ImageDataLayout, Origin3d,
    Queue, Sampler, SamplerDescriptor, TextureAspect, TextureDescriptor, TextureDimension,
    TextureFormat, TextureUsages, TextureView, TextureViewDescriptor,
};

pub const WATER_SIZE: u32 = 256;

/// Tileable rippled-water pattern, RGBA8, `size * size` texels.
///
/// Every wave has a whole number of periods across the tile so the texture
/// repeats without seams.
pub fn water_pixels(size: u32) -> Vec<u8> {
    use std::f32::consts::TAU;
    let waves: [(f32, f32, f32); 4] = [
        (3.0, 1.0, 0.0),
        (-2.0, 5.0, 1.3),
        (7.0, -4.0, 2.1),
        (1.0, 9.0, 4.2),
    ];
    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let u = x as f32 / size as f32;
            let v = y as f32 / size as f32;
            let h = waves
                .iter()
                .map(|(kx, ky, phase)| (TAU * (kx * u + ky * v) + phase).sin())
                .sum::<f32>()
                / waves.len() as f32;
            let t = 0.5 + 0.5 * h;
            let r = 0.10 + 0.25 * t;
            let g = 0.35 + 0.35 * t;
            let b = 0.55 + 0.40 * t;
            for c in [r, g, b] {
                pixels.push((c.clamp(0.0, 1.0) * 255.0) as u8);
            }
            pixels.push(255);
        }
    }
    pixels
}

/// Uploads the water pattern and returns a view plus a repeat-wrapping sampler.
pub fn create_water_texture(device: &Device, queue: &Queue) -> (TextureView, Sampler) {
    let size = Extent3d {
        width: WATER_SIZE,
        height: WATER_SIZE,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&TextureDescriptor {
        label: Some("water texture"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: TextureFormat::Rgba8Unorm,
        usage: TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        ImageCopyTexture {
            texture: &texture,
            mip_level: 0,
            origin: Origin3d::ZERO,
            aspect: TextureAspect::All,
        },
        &water_pixels(WATER_SIZE),
        ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(4 * WATER_SIZE),
            rows_per_image: Some(WATER_SIZE),
        },
        size,
    );
    let view = texture.create_view(&TextureViewDescriptor::default());
    let sampler = device.create_sampler(&SamplerDescriptor {
        label: Some("water sampler"),
        address_mode_u: AddressMode::Repeat,
        address_mode_v: AddressMode::Repeat,
        address_mode_w: AddressMode::Repeat,
        mag_filter: FilterMode::Linear,
        min_filter: FilterMode::Linear,
        ..Default::default()
    });
    (view, sampler)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_size_and_alpha() {
        let pixels = water_pixels(16);
        assert_eq!(pixels.len(), 16 * 16 * 4);
        assert!(pixels.chunks_exact(4).all(|p| p[3] == 255));
        // bluish
        assert!(pixels.chunks_exact(4).all(|p| p[2] > p[0]));
    }

    #[test]
    fn pattern_tiles() {
        let size = 64;
        let pixels = water_pixels(size);
        let texel = |x: u32, y: u32| {
            let i = ((y * size + x) * 4) as usize;
            [pixels[i], pixels[i + 1], pixels[i + 2]]
        };
        // neighbours across the seam differ about as much as neighbours inside
        for y in 0..size {
            let seam = texel(size - 1, y)
                .iter()
                .zip(texel(0, y).iter())
                .map(|(a, b)| (*a as i32 - *b as i32).abs())
                .max()
                .unwrap_or(0);
            assert!(seam < 40);
        }
    }
}
