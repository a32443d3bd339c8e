use crate::app::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Screen rectangle covered by the scene: top-left plus size in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ScreenRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

/// Maps a scene point to the screen. The scene is centred in the viewport and
/// scaled about its own centre.
pub(crate) fn scene_to_screen(
    point: Vec2,
    scene_size: Vec2,
    viewport: Viewport,
    scale: f32,
) -> Vec2 {
    Vec2 {
        x: viewport.width as f32 * 0.5 + (point.x - scene_size.x * 0.5) * scale,
        y: viewport.height as f32 * 0.5 + (point.y - scene_size.y * 0.5) * scale,
    }
}

pub fn scene_to_screen_px(
    point: Vec2,
    scene_size: Vec2,
    viewport: Viewport,
    scale: f32,
) -> (i32, i32) {
    let screen = scene_to_screen(point, scene_size, viewport, scale);
    (screen.x.round() as i32, screen.y.round() as i32)
}

pub(crate) fn scene_rect_on_screen(
    scene_size: Vec2,
    viewport: Viewport,
    scale: f32,
) -> ScreenRect {
    let top_left = scene_to_screen(Vec2::ZERO, scene_size, viewport, scale);
    ScreenRect {
        left: top_left.x,
        top: top_left.y,
        width: scene_size.x * scale,
        height: scene_size.y * scale,
    }
}
