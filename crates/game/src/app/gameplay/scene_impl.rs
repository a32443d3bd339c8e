use engine::{
    DialoguePanel, EntityId, InputSnapshot, RenderableDesc, RenderableKind, Scene, SceneWorld,
    Transform,
};
use tracing::{info, warn};

use super::roster::Roster;
use super::state::GameState;
use super::view::RenderView;
use super::GameplayConfig;

const BACKGROUND_COLOR: [u8; 4] = [135, 206, 235, 255];
const PLAYER_SPRITE_KEY: &str = "player";
const PLAYER_FALLBACK_COLOR: [u8; 4] = [236, 236, 240, 255];
const BADGE_COLOR: [u8; 4] = [255, 255, 255, 255];
const CONTROLS_HINT: &str = "Arrows/WASD move | Space interact";
const PROMPT_NEXT: &str = "Next";
const PROMPT_CLOSE: &str = "Close";

pub(crate) struct GameplayScene {
    state: GameState,
    initial_state: GameState,
    player_id: Option<EntityId>,
    character_ids: Vec<EntityId>,
    display_scale: f32,
}

impl GameplayScene {
    pub(crate) fn new(config: GameplayConfig, roster: Roster) -> Self {
        let state = GameState::new(config, roster);
        Self {
            initial_state: state.clone(),
            state,
            player_id: None,
            character_ids: Vec::new(),
            display_scale: 1.0,
        }
    }

    fn sync_world(&self, world: &mut SceneWorld) {
        let view = self.state.view(self.display_scale);
        world.camera_mut().set_zoom_clamped(view.display_scale);

        if let Some(player) = self.player_id {
            if let Some(entity) = world.find_entity_mut(player) {
                entity.transform.position = view.player.into();
            }
        }
        for (entity_id, character) in self.character_ids.iter().zip(&view.characters) {
            if let Some(entity) = world.find_entity_mut(*entity_id) {
                entity.visible = character.visible;
            }
        }

        let hud = world.hud_mut();
        hud.counter = view.counter_text();
        hud.dialogue = dialogue_panel(&view);
        hud.hint = hud.dialogue.is_none().then(|| CONTROLS_HINT.to_string());
    }

    fn dump_state(&self) {
        let view = self.state.view(self.display_scale);
        match serde_json::to_string_pretty(&view) {
            Ok(json) => info!(state = %json, "state_dump"),
            Err(error) => warn!(error = %error, "state_dump_failed"),
        }
    }
}

fn dialogue_panel(view: &RenderView) -> Option<DialoguePanel> {
    let dialogue = view.dialogue.as_ref()?;
    let prompt = if dialogue.is_last_line {
        PROMPT_CLOSE
    } else {
        PROMPT_NEXT
    };
    Some(DialoguePanel {
        speaker: dialogue.speaker.clone(),
        badge_label: dialogue.glyph,
        badge_color: BADGE_COLOR,
        text: dialogue.text.clone(),
        prompt: prompt.to_string(),
    })
}

impl Scene for GameplayScene {
    fn load(&mut self, world: &mut SceneWorld) {
        self.state = self.initial_state.clone();
        let config = *self.state.config();
        world.set_scene_size(config.scene_width, config.scene_height);
        world.set_background_color(BACKGROUND_COLOR);

        self.player_id = Some(world.spawn(
            Transform {
                position: self.state.player_position(),
            },
            RenderableDesc {
                kind: RenderableKind::Sprite {
                    key: PLAYER_SPRITE_KEY.to_string(),
                    fallback_color: PLAYER_FALLBACK_COLOR,
                },
                size_px: config.player_size,
                debug_name: "player",
            },
        ));
        self.character_ids = self
            .state
            .roster()
            .iter()
            .map(|(_, character)| {
                world.spawn(
                    Transform {
                        position: character.position(),
                    },
                    RenderableDesc {
                        kind: RenderableKind::Badge {
                            label: character.glyph(),
                            color: BADGE_COLOR,
                        },
                        size_px: config.character_size,
                        debug_name: "character",
                    },
                )
            })
            .collect();

        self.sync_world(world);
        info!(
            entity_count = world.entity_count(),
            characters = self.character_ids.len(),
            "gameplay_scene_loaded"
        );
    }

    fn update(&mut self, _fixed_dt_seconds: f32, input: &InputSnapshot, world: &mut SceneWorld) {
        self.display_scale = input.display_scale();
        self.state.apply_input(input);
        if input.dump_state_pressed() {
            self.dump_state();
        }
        self.sync_world(world);
    }

    fn unload(&mut self, _world: &mut SceneWorld) {
        info!(
            stage = self.state.stage(),
            met_count = self.state.roster().met_count(),
            "gameplay_scene_unloaded"
        );
        self.player_id = None;
        self.character_ids.clear();
    }

    fn debug_title(&self) -> Option<String> {
        let player = self.state.player_position();
        Some(format!(
            "Silent Salt | Met {}/{} | Stage {} | Player ({:.0}, {:.0})",
            self.state.roster().met_count(),
            self.state.roster().len(),
            self.state.stage(),
            player.x,
            player.y,
        ))
    }
}
