use bytemuck::{Pod, Zeroable};

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Hsl {
    pub h: f32,
    pub s: f32,
    pub l: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
        Self::new(channel(16), channel(8), channel(0))
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    pub fn to_hsl(self) -> Hsl {
        let max = self.r.max(self.g).max(self.b);
        let min = self.r.min(self.g).min(self.b);
        let l = (min + max) / 2.0;
        if min == max {
            return Hsl { h: 0.0, s: 0.0, l };
        }
        let delta = max - min;
        let s = if l <= 0.5 {
            delta / (max + min)
        } else {
            delta / (2.0 - max - min)
        };
        let h = if max == self.r {
            (self.g - self.b) / delta + if self.g < self.b { 6.0 } else { 0.0 }
        } else if max == self.g {
            (self.b - self.r) / delta + 2.0
        } else {
            (self.r - self.g) / delta + 4.0
        };
        let h = h / 6.0;
        Hsl {
            h: if h >= 1.0 { 0.0 } else { h },
            s,
            l,
        }
    }

    pub fn set_hsl(&mut self, h: f32, s: f32, l: f32) {
        let h = h.rem_euclid(1.0);
        let s = s.clamp(0.0, 1.0);
        let l = l.clamp(0.0, 1.0);
        if s == 0.0 {
            *self = Self::new(l, l, l);
            return;
        }
        let p = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let q = 2.0 * l - p;
        *self = Self::new(
            hue_to_rgb(q, p, h + 1.0 / 3.0),
            hue_to_rgb(q, p, h),
            hue_to_rgb(q, p, h - 1.0 / 3.0),
        );
    }

    pub fn offset_hsl(&mut self, dh: f32, ds: f32, dl: f32) {
        let hsl = self.to_hsl();
        self.set_hsl(hsl.h + dh, hsl.s + ds, hsl.l + dl);
    }
}

fn hue_to_rgb(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * 6.0 * (2.0 / 3.0 - t)
    } else {
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn hex_channels() {
        let c = Color::from_hex(0xff8000);
        assert_eq!(c.r, 1.0);
        assert!(close(c.g, 128.0 / 255.0));
        assert_eq!(c.b, 0.0);
    }

    #[test]
    fn hsl_round_trip_keeps_color() {
        let original = Color::from_hex(0x8855ff);
        let hsl = original.to_hsl();
        let mut c = Color::new(0.0, 0.0, 0.0);
        c.set_hsl(hsl.h, hsl.s, hsl.l);
        assert!(close(c.r, original.r));
        assert!(close(c.g, original.g));
        assert!(close(c.b, original.b));
    }

    #[test]
    fn primaries_have_expected_hue() {
        assert!(close(Color::from_hex(0xff0000).to_hsl().h, 0.0));
        assert!(close(Color::from_hex(0x00ff00).to_hsl().h, 1.0 / 3.0));
        assert!(close(Color::from_hex(0x0000ff).to_hsl().h, 2.0 / 3.0));
        let gray = Color::from_hex(0x111111).to_hsl();
        assert_eq!(gray.s, 0.0);
    }

    #[test]
    fn hue_offset_wraps() {
        let mut c = Color::from_hex(0x8855ff);
        let start = c.to_hsl();
        for _ in 0..5000 {
            c.offset_hsl(0.0005, 0.0, 0.0);
            let h = c.to_hsl().h;
            assert!((0.0..1.0).contains(&h));
        }
        let end = c.to_hsl();
        assert!((end.s - start.s).abs() < 1e-3);
        assert!((end.l - start.l).abs() < 1e-3);
    }

    #[test]
    fn offset_clamps_saturation_and_lightness() {
        let start = Color::from_hex(0x8855ff);
        let hue = start.to_hsl().h;

        let mut saturated = start;
        saturated.offset_hsl(0.0, 10.0, 0.0);
        let mut expected = Color::new(0.0, 0.0, 0.0);
        expected.set_hsl(hue, 1.0, start.to_hsl().l);
        assert_eq!(saturated, expected);

        let mut gray = start;
        gray.offset_hsl(0.0, -10.0, 0.0);
        assert_eq!(gray.to_hsl().s, 0.0);
        assert_eq!(gray.r, gray.g);
        assert_eq!(gray.g, gray.b);

        let mut white = start;
        white.offset_hsl(0.0, 0.0, 10.0);
        assert_eq!(white, Color::new(1.0, 1.0, 1.0));

        let mut black = start;
        black.offset_hsl(0.0, 0.0, -10.0);
        assert_eq!(black, Color::new(0.0, 0.0, 0.0));
    }
}
