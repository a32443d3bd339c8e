use std::ops::{Add, Mul, Sub};

use super::input::{clamp_display_scale, ActionStates, InputAction, DISPLAY_SCALE_DEFAULT};

#[derive(Debug, Clone, Copy)]
pub struct InputSnapshot {
    actions: ActionStates,
    joystick: Vec2,
    interact_presses: u32,
    display_scale: f32,
    dump_state_pressed: bool,
    quit_requested: bool,
}

impl Default for InputSnapshot {
    fn default() -> Self {
        Self {
            actions: ActionStates::default(),
            joystick: Vec2::ZERO,
            interact_presses: 0,
            display_scale: DISPLAY_SCALE_DEFAULT,
            dump_state_pressed: false,
            quit_requested: false,
        }
    }
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(
        actions: ActionStates,
        joystick: Vec2,
        interact_presses: u32,
        display_scale: f32,
        dump_state_pressed: bool,
        quit_requested: bool,
    ) -> Self {
        Self {
            actions,
            joystick,
            interact_presses,
            display_scale,
            dump_state_pressed,
            quit_requested,
        }
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn joystick(&self) -> Vec2 {
        self.joystick
    }

    pub fn interact_presses(&self) -> u32 {
        self.interact_presses
    }

    pub fn display_scale(&self) -> f32 {
        self.display_scale
    }

    pub fn dump_state_pressed(&self) -> bool {
        self.dump_state_pressed
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Held movement keys as unit steps plus the joystick scaled by `joystick_scale`.
    pub fn movement_vector(&self, joystick_scale: f32) -> Vec2 {
        self.actions.movement_vector() + self.joystick * joystick_scale
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn with_joystick(mut self, joystick: Vec2) -> Self {
        self.joystick = joystick;
        self
    }

    pub fn with_interact_presses(mut self, interact_presses: u32) -> Self {
        self.interact_presses = interact_presses;
        self
    }

    pub fn with_display_scale(mut self, display_scale: f32) -> Self {
        self.display_scale = display_scale;
        self
    }

    pub fn with_dump_state_pressed(mut self, dump_state_pressed: bool) -> Self {
        self.dump_state_pressed = dump_state_pressed;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub u64);

/// Scene-pixel coordinates, y grows downward.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }

    pub fn distance(self, other: Self) -> f32 {
        (self - other).length()
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Camera2D {
    pub zoom: f32,
}

impl Default for Camera2D {
    fn default() -> Self {
        Self {
            zoom: DISPLAY_SCALE_DEFAULT,
        }
    }
}

impl Camera2D {
    pub fn effective_zoom(&self) -> f32 {
        clamp_display_scale(self.zoom)
    }

    pub fn set_zoom_clamped(&mut self, zoom: f32) {
        self.zoom = clamp_display_scale(zoom);
    }
}

/// `position` is the top-left corner of the entity's box in scene pixels.
#[derive(Debug, Clone, Copy, Default)]
pub struct Transform {
    pub position: Vec2,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderableKind {
    Placeholder { color: [u8; 4] },
    /// Image under `assets/sprites/<key>.png`, falls back to a placeholder box.
    Sprite { key: String, fallback_color: [u8; 4] },
    /// Disc with a single-letter label.
    Badge { label: char, color: [u8; 4] },
}

#[derive(Debug, Clone)]
pub struct RenderableDesc {
    pub kind: RenderableKind,
    pub size_px: f32,
    pub debug_name: &'static str,
}

#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub transform: Transform,
    pub renderable: RenderableDesc,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialoguePanel {
    pub speaker: String,
    pub badge_label: char,
    pub badge_color: [u8; 4],
    pub text: String,
    pub prompt: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HudState {
    pub counter: String,
    pub hint: Option<String>,
    pub dialogue: Option<DialoguePanel>,
}

/// Everything the renderer reads. Scenes write it during `update`.
#[derive(Debug, Default)]
pub struct SceneWorld {
    next_entity_id: u64,
    entities: Vec<Entity>,
    scene_size: Vec2,
    background_color: [u8; 4],
    camera: Camera2D,
    hud: HudState,
}

impl SceneWorld {
    pub fn spawn(&mut self, transform: Transform, renderable: RenderableDesc) -> EntityId {
        let id = EntityId(self.next_entity_id);
        self.next_entity_id = self.next_entity_id.saturating_add(1);
        self.entities.push(Entity {
            id,
            transform,
            renderable,
            visible: true,
        });
        id
    }

    pub fn clear(&mut self) {
        self.entities.clear();
        self.camera = Camera2D::default();
        self.hud = HudState::default();
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn find_entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.id == id)
    }

    pub fn find_entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|entity| entity.id == id)
    }

    pub fn set_scene_size(&mut self, width: f32, height: f32) {
        self.scene_size = Vec2::new(width, height);
    }

    pub fn scene_size(&self) -> Vec2 {
        self.scene_size
    }

    pub fn set_background_color(&mut self, color: [u8; 4]) {
        self.background_color = color;
    }

    pub fn background_color(&self) -> [u8; 4] {
        self.background_color
    }

    pub fn camera(&self) -> &Camera2D {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera2D {
        &mut self.camera
    }

    pub fn hud(&self) -> &HudState {
        &self.hud
    }

    pub fn hud_mut(&mut self) -> &mut HudState {
        &mut self.hud
    }
}

pub trait Scene {
    fn load(&mut self, world: &mut SceneWorld);
    fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot, world: &mut SceneWorld);
    fn unload(&mut self, world: &mut SceneWorld);
    fn debug_title(&self) -> Option<String> {
        None
    }
}

/// Owns the single active scene and the world it writes into.
pub struct SceneHost {
    scene: Box<dyn Scene>,
    world: SceneWorld,
    is_loaded: bool,
}

impl SceneHost {
    pub fn new(scene: Box<dyn Scene>) -> Self {
        Self {
            scene,
            world: SceneWorld::default(),
            is_loaded: false,
        }
    }

    pub fn load(&mut self) {
        if self.is_loaded {
            return;
        }
        self.scene.load(&mut self.world);
        self.is_loaded = true;
    }

    pub fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) {
        if !self.is_loaded {
            return;
        }
        self.scene.update(fixed_dt_seconds, input, &mut self.world);
    }

    pub fn world(&self) -> &SceneWorld {
        &self.world
    }

    pub fn debug_title(&self) -> Option<String> {
        self.scene.debug_title()
    }

    pub fn is_loaded(&self) -> bool {
        self.is_loaded
    }

    pub fn shutdown(&mut self) {
        if !self.is_loaded {
            return;
        }
        self.scene.unload(&mut self.world);
        self.world.clear();
        self.is_loaded = false;
    }
}
