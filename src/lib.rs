pub mod app;
pub mod config;
pub mod error;
pub mod geometry;
pub mod renderer;
pub mod scene;
mod stats;
mod texture;
pub use app::{run, App};
pub use config::{Cli, DemoConfig, Variant};
pub use error::DemoError;
pub use scene::render_ppm;
