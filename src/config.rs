use clap::{Parser, ValueEnum};
use glam::Vec3;

const DEFAULT_CAMERA_POSITION: Vec3 = Vec3::new(0.0, 0.0, 300.0);

/// Which flavour of the demo to run.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Variant {
    /// Narrow lens, opaque canvas, dense sphere and a water texture.
    #[default]
    Textured,
    /// Wider lens, transparent canvas, coarse sphere, flat color.
    Plain,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VariantParams {
    pub field_of_view: f32,
    pub transparent: bool,
    pub width_segments: u32,
    pub height_segments: u32,
    pub textured: bool,
}

impl Variant {
    pub fn params(self) -> VariantParams {
        match self {
            Variant::Textured => VariantParams {
                field_of_view: 30.0,
                transparent: false,
                width_segments: 128,
                height_segments: 64,
                textured: true,
            },
            Variant::Plain => VariantParams {
                field_of_view: 45.0,
                transparent: true,
                width_segments: 64,
                height_segments: 32,
                textured: false,
            },
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "noisy_sphere", about = "Animated displaced sphere")]
pub struct Cli {
    /// Show the axes helper and log frame rate
    #[arg(short, long)]
    pub debug: bool,

    /// Camera zoom factor, must be positive
    #[arg(short, long, default_value_t = 1.0, value_parser = parse_zoom)]
    pub zoom: f32,

    #[arg(long, value_enum, default_value_t = Variant::Textured)]
    pub variant: Variant,

    /// Initial window width
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Initial window height
    #[arg(long, default_value_t = 720)]
    pub height: u32,
}

fn parse_zoom(s: &str) -> Result<f32, String> {
    let zoom: f32 = s.parse().map_err(|e| format!("{e}"))?;
    if zoom.is_finite() && zoom > 0.0 {
        Ok(zoom)
    } else {
        Err(format!("zoom must be a positive number, got {zoom}"))
    }
}

/// Settings fixed at startup.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DemoConfig {
    pub debug: bool,
    pub zoom: f32,
    pub variant: Variant,
    pub window_size: (u32, u32),
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            debug: false,
            zoom: 1.0,
            variant: Variant::default(),
            window_size: (1280, 720),
        }
    }
}

impl From<Cli> for DemoConfig {
    fn from(cli: Cli) -> Self {
        Self {
            debug: cli.debug,
            zoom: cli.zoom,
            variant: cli.variant,
            window_size: (cli.width.max(1), cli.height.max(1)),
        }
    }
}

impl DemoConfig {
    pub fn params(&self) -> VariantParams {
        self.variant.params()
    }

    pub fn camera_position(&self) -> Vec3 {
        DEFAULT_CAMERA_POSITION / self.zoom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_textured_demo() {
        let config = DemoConfig::from(Cli::parse_from(["noisy_sphere"]));
        assert!(!config.debug);
        assert_eq!(config.variant, Variant::Textured);
        assert_eq!(config.camera_position(), Vec3::new(0.0, 0.0, 300.0));
        let params = config.params();
        assert_eq!(params.field_of_view, 30.0);
        assert_eq!((params.width_segments, params.height_segments), (128, 64));
        assert!(params.textured && !params.transparent);
    }

    #[test]
    fn zoom_moves_camera_closer() {
        let config =
            DemoConfig::from(Cli::parse_from(["noisy_sphere", "--zoom", "2", "--debug"]));
        assert!(config.debug);
        assert_eq!(config.camera_position(), Vec3::new(0.0, 0.0, 150.0));
    }

    #[test]
    fn rejects_non_positive_zoom() {
        assert!(Cli::try_parse_from(["noisy_sphere", "--zoom", "0"]).is_err());
        assert!(Cli::try_parse_from(["noisy_sphere", "--zoom", "-1"]).is_err());
        assert!(Cli::try_parse_from(["noisy_sphere", "--zoom", "inf"]).is_err());
    }

    #[test]
    fn plain_variant() {
        let config =
            DemoConfig::from(Cli::parse_from(["noisy_sphere", "--variant", "plain"]));
        let params = config.params();
        assert!(params.transparent);
        assert!(!params.textured);
        assert_eq!(params.field_of_view, 45.0);
    }
}
