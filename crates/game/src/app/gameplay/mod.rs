use engine::{Scene, Vec2};

mod dialogue;
mod movement;
mod proximity;
mod roster;
mod scene_impl;
mod state;
mod view;

pub(crate) use roster::RosterError;

const SCENE_WIDTH: f32 = 800.0;
const SCENE_HEIGHT: f32 = 600.0;
const PLAYER_SIZE: f32 = 50.0;
const CHARACTER_SIZE: f32 = 60.0;
const PLAYER_SPEED: f32 = 3.0;
const PLAYER_SPAWN: Vec2 = Vec2 { x: 100.0, y: 300.0 };
const INTERACTION_RADIUS: f32 = 80.0;
const JOYSTICK_SCALE: f32 = 0.1;

/// Tunables for one play session. Lengths are scene pixels, speed is pixels
/// per tick at unit intent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct GameplayConfig {
    pub(crate) scene_width: f32,
    pub(crate) scene_height: f32,
    pub(crate) player_size: f32,
    pub(crate) character_size: f32,
    pub(crate) player_speed: f32,
    pub(crate) player_spawn: Vec2,
    pub(crate) interaction_radius: f32,
    pub(crate) joystick_scale: f32,
}

impl Default for GameplayConfig {
    fn default() -> Self {
        Self {
            scene_width: SCENE_WIDTH,
            scene_height: SCENE_HEIGHT,
            player_size: PLAYER_SIZE,
            character_size: CHARACTER_SIZE,
            player_speed: PLAYER_SPEED,
            player_spawn: PLAYER_SPAWN,
            interaction_radius: INTERACTION_RADIUS,
            joystick_scale: JOYSTICK_SCALE,
        }
    }
}

pub(crate) fn build_scene(config: GameplayConfig) -> Result<Box<dyn Scene>, RosterError> {
    let roster = roster::default_cast()?;
    Ok(Box::new(scene_impl::GameplayScene::new(config, roster)))
}
