mod mesh;
mod vertex;
pub use mesh::{axes, Mesh};
pub use vertex::{LineVertex, Vertex};
