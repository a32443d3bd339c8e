use engine::{InputSnapshot, Vec2};
use tracing::{debug, info};

use super::dialogue::{DialogueState, DialogueStep};
use super::movement;
use super::proximity::find_nearby;
use super::roster::{Character, Roster};
use super::view::{CharacterView, DialogueView, PositionView, RenderView};
use super::GameplayConfig;

/// Stage counter, one step per completed character.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct GameProgress {
    stage: u32,
}

impl GameProgress {
    pub(crate) fn stage(&self) -> u32 {
        self.stage
    }

    pub(crate) fn advance(&mut self) {
        self.stage = self.stage.saturating_add(1);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InteractionOutcome {
    /// No session and nobody in range.
    Ignored,
    Dialogue(DialogueStep),
}

/// Roster, player, dialogue session and progress for one play session.
#[derive(Debug, Clone)]
pub(crate) struct GameState {
    config: GameplayConfig,
    roster: Roster,
    player: Vec2,
    dialogue: DialogueState,
    progress: GameProgress,
}

impl GameState {
    pub(crate) fn new(config: GameplayConfig, roster: Roster) -> Self {
        Self {
            player: movement::clamp_to_scene(config.player_spawn, &config),
            config,
            roster,
            dialogue: DialogueState::Idle,
            progress: GameProgress::default(),
        }
    }

    pub(crate) fn config(&self) -> &GameplayConfig {
        &self.config
    }

    pub(crate) fn roster(&self) -> &Roster {
        &self.roster
    }

    pub(crate) fn player_position(&self) -> Vec2 {
        self.player
    }

    #[cfg(test)]
    pub(crate) fn dialogue(&self) -> DialogueState {
        self.dialogue
    }

    pub(crate) fn stage(&self) -> u32 {
        self.progress.stage()
    }

    pub(crate) fn current_line(&self) -> Option<&str> {
        self.dialogue.current_line(&self.roster)
    }

    pub(crate) fn active_character(&self) -> Option<&Character> {
        self.dialogue
            .character()
            .and_then(|index| self.roster.get(index))
    }

    /// One fixed tick: queued interactions first, in order, then movement.
    pub(crate) fn apply_input(&mut self, input: &InputSnapshot) {
        for _ in 0..input.interact_presses() {
            self.interact();
        }
        self.tick(input.movement_vector(self.config.joystick_scale));
    }

    /// Moves the player unless a dialogue is open.
    pub(crate) fn tick(&mut self, intent: Vec2) {
        if self.dialogue.is_talking() {
            return;
        }
        self.player = movement::step(self.player, intent, &self.config);
    }

    /// Advances an open dialogue, otherwise starts one with whoever is near.
    pub(crate) fn interact(&mut self) -> InteractionOutcome {
        if let Some(step) = self.dialogue.advance(&mut self.roster, &mut self.progress) {
            self.log_step(step);
            return InteractionOutcome::Dialogue(step);
        }

        let Some(character) =
            find_nearby(&self.roster, self.player, self.config.interaction_radius)
        else {
            debug!(
                x = self.player.x,
                y = self.player.y,
                "interaction_ignored"
            );
            return InteractionOutcome::Ignored;
        };
        let step = self
            .dialogue
            .begin(character, &mut self.roster, &mut self.progress);
        self.log_step(step);
        InteractionOutcome::Dialogue(step)
    }

    #[cfg(test)]
    pub(crate) fn place_player(&mut self, position: Vec2) {
        self.player = movement::clamp_to_scene(position, &self.config);
    }

    pub(crate) fn view(&self, display_scale: f32) -> RenderView {
        let characters = self
            .roster
            .iter()
            .map(|(_, character)| CharacterView {
                id: character.id().to_string(),
                name: character.name().to_string(),
                glyph: character.glyph(),
                position: PositionView::from(character.position()),
                visible: !character.is_met(),
            })
            .collect();

        let dialogue = match (self.active_character(), self.dialogue) {
            (
                Some(character),
                DialogueState::Talking {
                    line_index,
                    ..
                },
            ) => Some(DialogueView {
                character_id: character.id().to_string(),
                speaker: character.name().to_string(),
                glyph: character.glyph(),
                line_index,
                line_count: character.line_count(),
                text: self.current_line().unwrap_or_default().to_string(),
                is_last_line: self.dialogue.is_last_line(&self.roster),
            }),
            _ => None,
        };

        RenderView {
            player: PositionView::from(self.player),
            characters,
            dialogue,
            met_count: self.roster.met_count(),
            character_count: self.roster.len(),
            stage: self.progress.stage(),
            display_scale,
        }
    }

    fn log_step(&self, step: DialogueStep) {
        let name = |index| {
            self.roster
                .get(index)
                .map(Character::name)
                .unwrap_or("<unknown>")
        };
        match step {
            DialogueStep::Started { character } => info!(
                character = name(character),
                line_count = self.roster.get(character).map_or(0, Character::line_count),
                "dialogue_started"
            ),
            DialogueStep::Advanced {
                character,
                line_index,
            } => debug!(character = name(character), line_index, "dialogue_advanced"),
            DialogueStep::Completed { character, stage } => info!(
                character = name(character),
                stage,
                met_count = self.roster.met_count(),
                "character_met"
            ),
        }
    }
}
