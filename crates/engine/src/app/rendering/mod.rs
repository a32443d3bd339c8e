mod draw;
mod renderer;
mod text;
mod transform;

pub use renderer::Renderer;
pub use transform::{scene_to_screen_px, Viewport};
