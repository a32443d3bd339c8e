use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::ImageReader;
use pixels::{Error, Pixels, SurfaceTexture};
use tracing::warn;
use winit::window::Window;

use crate::app::{DialoguePanel, Entity, HudState, RenderableKind, SceneWorld};

use super::draw::{clear, fill_disc, fill_rect, rect_outline, ring, write_pixel, Canvas};
use super::text::{draw_text, glyph_advance, glyph_height, line_advance, text_width, wrap_text};
use super::transform::{scene_rect_on_screen, scene_to_screen, Viewport};

const LETTERBOX_COLOR: [u8; 4] = [28, 22, 40, 255];
const SCENE_BORDER_COLOR: [u8; 4] = [192, 132, 252, 255];
const PANEL_BG_COLOR: [u8; 4] = [17, 24, 39, 230];
const PANEL_BORDER_COLOR: [u8; 4] = [255, 255, 255, 60];
const PILL_BG_COLOR: [u8; 4] = [255, 255, 255, 230];
const PILL_TEXT_COLOR: [u8; 4] = [31, 41, 55, 255];
const SPEAKER_TEXT_COLOR: [u8; 4] = [255, 255, 255, 255];
const LINE_TEXT_COLOR: [u8; 4] = [229, 231, 235, 255];
const PROMPT_BG_COLOR: [u8; 4] = [147, 51, 234, 255];
const BADGE_RING_COLOR: [u8; 4] = [192, 132, 252, 255];
const BADGE_LABEL_COLOR: [u8; 4] = [31, 41, 55, 255];
const HUD_MARGIN_PX: i32 = 16;
const HUD_TEXT_SCALE: i32 = 3;
const HINT_TEXT_SCALE: i32 = 2;
const PILL_PADDING_PX: i32 = 10;
const DIALOGUE_PADDING_PX: i32 = 20;
const DIALOGUE_BADGE_RADIUS_PX: i32 = 24;
const DIALOGUE_MAX_TEXT_LINES: usize = 4;

struct LoadedSprite {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

/// Decoded sprites keyed by sprite key. Failed loads are cached as `None`
/// and warned about once.
#[derive(Default)]
struct SpriteCache {
    sprites_dir: Option<PathBuf>,
    loaded: HashMap<String, Option<LoadedSprite>>,
    warned_keys: HashSet<String>,
}

impl SpriteCache {
    fn new(assets_dir: Option<PathBuf>) -> Self {
        Self {
            sprites_dir: assets_dir.map(|dir| dir.join("sprites")),
            ..Self::default()
        }
    }

    fn preload(&mut self, key: &str) {
        if self.loaded.contains_key(key) {
            return;
        }
        let sprite = match self.sprites_dir.as_deref() {
            Some(dir) => {
                let path = dir.join(format!("{key}.png"));
                match load_sprite_rgba(&path) {
                    Ok(sprite) => Some(sprite),
                    Err(reason) => {
                        self.warn_once(key, Some(&path), &reason);
                        None
                    }
                }
            }
            None => {
                self.warn_once(key, None, "assets_dir_unavailable");
                None
            }
        };
        self.loaded.insert(key.to_string(), sprite);
    }

    fn get(&self, key: &str) -> Option<&LoadedSprite> {
        self.loaded.get(key).and_then(Option::as_ref)
    }

    fn warn_once(&mut self, key: &str, path: Option<&Path>, reason: &str) {
        if !self.warned_keys.insert(key.to_string()) {
            return;
        }
        let path_display = path
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "<unresolved>".to_string());
        warn!(
            sprite_key = key,
            path = %path_display,
            reason,
            "renderer_sprite_load_failed_using_placeholder"
        );
    }
}

fn load_sprite_rgba(path: &Path) -> Result<LoadedSprite, String> {
    let reader = ImageReader::open(path).map_err(|error| format!("file_open_failed:{error}"))?;
    let decoded = reader
        .decode()
        .map_err(|error| format!("decode_failed:{error}"))?;
    let image = decoded.to_rgba8();
    Ok(LoadedSprite {
        width: image.width(),
        height: image.height(),
        rgba: image.into_raw(),
    })
}

pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    viewport: Viewport,
    sprites: SpriteCache,
}

impl Renderer {
    pub fn new(window: Arc<Window>, assets_dir: Option<PathBuf>) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            viewport: Viewport {
                width: size.width,
                height: size.height,
            },
            sprites: SpriteCache::new(assets_dir),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.viewport = Viewport { width, height };
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    /// Paints the world read-only and presents the frame.
    pub fn render_world(&mut self, world: &SceneWorld) -> Result<(), Error> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Ok(());
        }

        for entity in world.entities() {
            if let RenderableKind::Sprite { key, .. } = &entity.renderable.kind {
                self.sprites.preload(key);
            }
        }

        let canvas = Canvas {
            width: self.viewport.width,
            height: self.viewport.height,
        };
        paint_world(self.pixels.frame_mut(), canvas, world, &self.sprites);
        self.pixels.render()
    }
}

fn paint_world(frame: &mut [u8], canvas: Canvas, world: &SceneWorld, sprites: &SpriteCache) {
    if canvas.is_empty() {
        return;
    }
    clear(frame, LETTERBOX_COLOR);

    let viewport = Viewport {
        width: canvas.width,
        height: canvas.height,
    };
    let scale = world.camera().effective_zoom();
    let scene_rect = scene_rect_on_screen(world.scene_size(), viewport, scale);
    let (left, top) = (scene_rect.left.round() as i32, scene_rect.top.round() as i32);
    let (width, height) = (
        scene_rect.width.round() as i32,
        scene_rect.height.round() as i32,
    );
    fill_rect(frame, canvas, left, top, width, height, world.background_color());
    rect_outline(
        frame,
        canvas,
        left - 1,
        top - 1,
        width + 2,
        height + 2,
        SCENE_BORDER_COLOR,
    );

    for entity in world.entities().iter().filter(|entity| entity.visible) {
        draw_entity(frame, canvas, world, entity, scale, sprites);
    }

    draw_hud(frame, canvas, world.hud());
}

fn draw_entity(
    frame: &mut [u8],
    canvas: Canvas,
    world: &SceneWorld,
    entity: &Entity,
    scale: f32,
    sprites: &SpriteCache,
) {
    let viewport = Viewport {
        width: canvas.width,
        height: canvas.height,
    };
    let top_left = scene_to_screen(
        entity.transform.position,
        world.scene_size(),
        viewport,
        scale,
    );
    let (x, y) = (top_left.x.round() as i32, top_left.y.round() as i32);
    let size = (entity.renderable.size_px * scale).round().max(1.0) as i32;

    match &entity.renderable.kind {
        RenderableKind::Placeholder { color } => fill_rect(frame, canvas, x, y, size, size, *color),
        RenderableKind::Sprite {
            key,
            fallback_color,
        } => match sprites.get(key) {
            Some(sprite) => draw_sprite_contained(frame, canvas, x, y, size, sprite),
            None => fill_rect(frame, canvas, x, y, size, size, *fallback_color),
        },
        RenderableKind::Badge { label, color } => {
            let radius = size / 2;
            let (cx, cy) = (x + radius, y + radius);
            draw_badge(frame, canvas, cx, cy, radius, *label, *color);
        }
    }
}

fn draw_badge(
    frame: &mut [u8],
    canvas: Canvas,
    cx: i32,
    cy: i32,
    radius: i32,
    label: char,
    color: [u8; 4],
) {
    fill_disc(frame, canvas, cx, cy, radius, color);
    ring(
        frame,
        canvas,
        cx,
        cy,
        radius,
        (radius / 8).max(1),
        BADGE_RING_COLOR,
    );
    let text_scale = (radius / 6).max(1);
    let label = label.to_string();
    draw_text(
        frame,
        canvas,
        cx - text_width(&label, text_scale) / 2 + text_scale / 2,
        cy - glyph_height(text_scale) / 2,
        &label,
        text_scale,
        BADGE_LABEL_COLOR,
    );
}

/// Nearest-neighbour blit fitted inside a `size`-square box, aspect preserved.
fn draw_sprite_contained(
    frame: &mut [u8],
    canvas: Canvas,
    left: i32,
    top: i32,
    size: i32,
    sprite: &LoadedSprite,
) {
    if sprite.width == 0 || sprite.height == 0 || size <= 0 {
        return;
    }
    if sprite.rgba.len() < sprite.width as usize * sprite.height as usize * 4 {
        return;
    }

    let fit = (size as f32 / sprite.width as f32).min(size as f32 / sprite.height as f32);
    let out_w = (sprite.width as f32 * fit).round().max(1.0) as i32;
    let out_h = (sprite.height as f32 * fit).round().max(1.0) as i32;
    let origin_x = left + (size - out_w) / 2;
    let origin_y = top + (size - out_h) / 2;
    let inv_fit = fit.recip();

    for dy in 0..out_h {
        let src_y = ((dy as f32 * inv_fit) as u32).min(sprite.height - 1) as usize;
        for dx in 0..out_w {
            let src_x = ((dx as f32 * inv_fit) as u32).min(sprite.width - 1) as usize;
            let offset = (src_y * sprite.width as usize + src_x) * 4;
            let texel = [
                sprite.rgba[offset],
                sprite.rgba[offset + 1],
                sprite.rgba[offset + 2],
                sprite.rgba[offset + 3],
            ];
            if texel[3] == 0 {
                continue;
            }
            write_pixel(frame, canvas, origin_x + dx, origin_y + dy, texel);
        }
    }
}

fn draw_hud(frame: &mut [u8], canvas: Canvas, hud: &HudState) {
    if !hud.counter.is_empty() {
        draw_pill(
            frame,
            canvas,
            HUD_MARGIN_PX,
            HUD_MARGIN_PX,
            &hud.counter,
            HUD_TEXT_SCALE,
        );
    }

    match &hud.dialogue {
        Some(panel) => draw_dialogue_panel(frame, canvas, panel),
        None => {
            if let Some(hint) = hud.hint.as_deref() {
                let pill_width = text_width(hint, HINT_TEXT_SCALE) + PILL_PADDING_PX * 2;
                let pill_height = glyph_height(HINT_TEXT_SCALE) + PILL_PADDING_PX * 2;
                draw_pill(
                    frame,
                    canvas,
                    canvas.width as i32 - HUD_MARGIN_PX - pill_width,
                    canvas.height as i32 - HUD_MARGIN_PX - pill_height,
                    hint,
                    HINT_TEXT_SCALE,
                );
            }
        }
    }
}

fn draw_pill(frame: &mut [u8], canvas: Canvas, x: i32, y: i32, text: &str, scale: i32) {
    let width = text_width(text, scale) + PILL_PADDING_PX * 2;
    let height = glyph_height(scale) + PILL_PADDING_PX * 2;
    fill_rect(frame, canvas, x, y, width, height, PILL_BG_COLOR);
    draw_text(
        frame,
        canvas,
        x + PILL_PADDING_PX,
        y + PILL_PADDING_PX,
        text,
        scale,
        PILL_TEXT_COLOR,
    );
}

fn draw_dialogue_panel(frame: &mut [u8], canvas: Canvas, panel: &DialoguePanel) {
    let width = canvas.width as i32;
    let text_left = DIALOGUE_PADDING_PX * 2 + DIALOGUE_BADGE_RADIUS_PX * 2;
    let max_chars =
        ((width - text_left - DIALOGUE_PADDING_PX) / glyph_advance(HUD_TEXT_SCALE)).max(1);
    let mut lines = wrap_text(&panel.text, max_chars as usize);
    lines.truncate(DIALOGUE_MAX_TEXT_LINES);

    let prompt_height = glyph_height(HINT_TEXT_SCALE) + PILL_PADDING_PX * 2;
    let text_block_height = line_advance(HUD_TEXT_SCALE) * (lines.len() as i32 + 1);
    let panel_height = DIALOGUE_PADDING_PX * 3 + text_block_height + prompt_height;
    let panel_top = canvas.height as i32 - panel_height;

    fill_rect(frame, canvas, 0, panel_top, width, panel_height, PANEL_BG_COLOR);
    rect_outline(
        frame,
        canvas,
        DIALOGUE_PADDING_PX / 2,
        panel_top + DIALOGUE_PADDING_PX / 2,
        width - DIALOGUE_PADDING_PX,
        panel_height - DIALOGUE_PADDING_PX,
        PANEL_BORDER_COLOR,
    );

    draw_badge(
        frame,
        canvas,
        DIALOGUE_PADDING_PX + DIALOGUE_BADGE_RADIUS_PX,
        panel_top + DIALOGUE_PADDING_PX + DIALOGUE_BADGE_RADIUS_PX,
        DIALOGUE_BADGE_RADIUS_PX,
        panel.badge_label,
        panel.badge_color,
    );

    let mut y = panel_top + DIALOGUE_PADDING_PX;
    draw_text(
        frame,
        canvas,
        text_left,
        y,
        &panel.speaker,
        HUD_TEXT_SCALE,
        SPEAKER_TEXT_COLOR,
    );
    for line in &lines {
        y += line_advance(HUD_TEXT_SCALE);
        draw_text(
            frame,
            canvas,
            text_left,
            y,
            line,
            HUD_TEXT_SCALE,
            LINE_TEXT_COLOR,
        );
    }

    let prompt_width = text_width(&panel.prompt, HINT_TEXT_SCALE) + PILL_PADDING_PX * 2;
    let prompt_x = width - DIALOGUE_PADDING_PX * 2 - prompt_width;
    let prompt_y = canvas.height as i32 - DIALOGUE_PADDING_PX - prompt_height;
    fill_rect(
        frame,
        canvas,
        prompt_x,
        prompt_y,
        prompt_width,
        prompt_height,
        PROMPT_BG_COLOR,
    );
    draw_text(
        frame,
        canvas,
        prompt_x + PILL_PADDING_PX,
        prompt_y + PILL_PADDING_PX,
        &panel.prompt,
        HINT_TEXT_SCALE,
        SPEAKER_TEXT_COLOR,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{RenderableDesc, Transform, Vec2};

    const BACKGROUND: [u8; 4] = [135, 206, 235, 255];
    const RED: [u8; 4] = [220, 40, 40, 255];
    const GREEN: [u8; 4] = [20, 200, 60, 255];

    fn canvas() -> Canvas {
        Canvas {
            width: 800,
            height: 600,
        }
    }

    fn frame_for(canvas: Canvas) -> Vec<u8> {
        vec![0; canvas.width as usize * canvas.height as usize * 4]
    }

    fn pixel(frame: &[u8], canvas: Canvas, x: i32, y: i32) -> [u8; 4] {
        let offset = (y as usize * canvas.width as usize + x as usize) * 4;
        [
            frame[offset],
            frame[offset + 1],
            frame[offset + 2],
            frame[offset + 3],
        ]
    }

    fn scene_world() -> SceneWorld {
        let mut world = SceneWorld::default();
        world.set_scene_size(800.0, 600.0);
        world.set_background_color(BACKGROUND);
        world
    }

    fn spawn_box(world: &mut SceneWorld, position: Vec2, kind: RenderableKind) -> crate::EntityId {
        world.spawn(
            Transform { position },
            RenderableDesc {
                kind,
                size_px: 50.0,
                debug_name: "box",
            },
        )
    }

    #[test]
    fn empty_scene_paints_background_and_letterbox() {
        let canvas = canvas();
        let mut frame = frame_for(canvas);
        let mut world = scene_world();
        world.camera_mut().set_zoom_clamped(0.5);

        paint_world(&mut frame, canvas, &world, &SpriteCache::default());

        assert_eq!(pixel(&frame, canvas, 400, 300), BACKGROUND);
        assert_eq!(pixel(&frame, canvas, 10, 10), LETTERBOX_COLOR);
    }

    #[test]
    fn visible_placeholder_is_drawn_at_scene_position() {
        let canvas = canvas();
        let mut frame = frame_for(canvas);
        let mut world = scene_world();
        spawn_box(
            &mut world,
            Vec2::new(100.0, 100.0),
            RenderableKind::Placeholder { color: RED },
        );

        paint_world(&mut frame, canvas, &world, &SpriteCache::default());

        assert_eq!(pixel(&frame, canvas, 125, 125), RED);
        assert_eq!(pixel(&frame, canvas, 160, 125), BACKGROUND);
    }

    #[test]
    fn hidden_entities_are_skipped() {
        let canvas = canvas();
        let mut frame = frame_for(canvas);
        let mut world = scene_world();
        let id = spawn_box(
            &mut world,
            Vec2::new(100.0, 100.0),
            RenderableKind::Placeholder { color: RED },
        );
        world.find_entity_mut(id).expect("entity").visible = false;

        paint_world(&mut frame, canvas, &world, &SpriteCache::default());

        assert_eq!(pixel(&frame, canvas, 125, 125), BACKGROUND);
    }

    #[test]
    fn missing_sprite_falls_back_to_placeholder_color() {
        let canvas = canvas();
        let mut frame = frame_for(canvas);
        let mut world = scene_world();
        spawn_box(
            &mut world,
            Vec2::new(300.0, 300.0),
            RenderableKind::Sprite {
                key: "player".to_string(),
                fallback_color: GREEN,
            },
        );
        let mut sprites = SpriteCache::new(None);
        sprites.preload("player");

        paint_world(&mut frame, canvas, &world, &sprites);

        assert_eq!(pixel(&frame, canvas, 320, 320), GREEN);
    }

    #[test]
    fn loaded_sprite_is_scaled_into_its_box() {
        let canvas = canvas();
        let mut frame = frame_for(canvas);
        let mut world = scene_world();
        spawn_box(
            &mut world,
            Vec2::new(0.0, 0.0),
            RenderableKind::Sprite {
                key: "player".to_string(),
                fallback_color: GREEN,
            },
        );
        let mut sprites = SpriteCache::default();
        sprites.loaded.insert(
            "player".to_string(),
            Some(LoadedSprite {
                width: 2,
                height: 2,
                rgba: RED.repeat(4),
            }),
        );

        paint_world(&mut frame, canvas, &world, &sprites);

        assert_eq!(pixel(&frame, canvas, 5, 45), RED);
        assert_eq!(pixel(&frame, canvas, 49, 49), RED);
    }

    #[test]
    fn dialogue_panel_covers_bottom_of_canvas() {
        let canvas = canvas();
        let mut frame = frame_for(canvas);
        let mut world = scene_world();
        world.hud_mut().dialogue = Some(DialoguePanel {
            speaker: "Taph".to_string(),
            badge_label: 'T',
            badge_color: [255, 255, 255, 255],
            text: "Hi! I'm Taph from Forsaken!".to_string(),
            prompt: "Next".to_string(),
        });

        paint_world(&mut frame, canvas, &world, &SpriteCache::default());

        assert_ne!(pixel(&frame, canvas, 400, 598), BACKGROUND);
        assert_eq!(pixel(&frame, canvas, 400, 100), BACKGROUND);
    }

    #[test]
    fn tiny_canvas_never_panics() {
        let canvas = Canvas {
            width: 3,
            height: 2,
        };
        let mut frame = frame_for(canvas);
        let mut world = scene_world();
        world.hud_mut().counter = "Met: 0/4".to_string();
        world.hud_mut().hint = Some("Space - interact".to_string());
        spawn_box(
            &mut world,
            Vec2::new(1.0, 1.0),
            RenderableKind::Badge {
                label: 'N',
                color: RED,
            },
        );

        paint_world(&mut frame, canvas, &world, &SpriteCache::default());
    }
}
