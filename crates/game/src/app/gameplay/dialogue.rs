use super::roster::{CharacterIndex, Roster};
use super::state::GameProgress;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum DialogueState {
    #[default]
    Idle,
    Talking {
        character: CharacterIndex,
        line_index: usize,
    },
}

/// What a dialogue transition did, for logging and callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DialogueStep {
    Started {
        character: CharacterIndex,
    },
    Advanced {
        character: CharacterIndex,
        line_index: usize,
    },
    Completed {
        character: CharacterIndex,
        stage: u32,
    },
}

impl DialogueState {
    pub(crate) fn is_talking(&self) -> bool {
        matches!(self, Self::Talking { .. })
    }

    pub(crate) fn character(&self) -> Option<CharacterIndex> {
        match self {
            Self::Talking { character, .. } => Some(*character),
            Self::Idle => None,
        }
    }

    /// Opens a session at line 0. A character with no lines completes at once.
    pub(crate) fn begin(
        &mut self,
        character: CharacterIndex,
        roster: &mut Roster,
        progress: &mut GameProgress,
    ) -> DialogueStep {
        let has_lines = roster
            .get(character)
            .is_some_and(|entry| entry.line_count() > 0);
        if !has_lines {
            return self.complete(character, roster, progress);
        }

        *self = Self::Talking {
            character,
            line_index: 0,
        };
        DialogueStep::Started { character }
    }

    /// Moves to the next line, or finishes on the last one. `None` when idle.
    pub(crate) fn advance(
        &mut self,
        roster: &mut Roster,
        progress: &mut GameProgress,
    ) -> Option<DialogueStep> {
        let Self::Talking {
            character,
            line_index,
        } = *self
        else {
            return None;
        };

        let line_count = roster.get(character).map_or(0, |entry| entry.line_count());
        let next = line_index + 1;
        if next < line_count {
            *self = Self::Talking {
                character,
                line_index: next,
            };
            return Some(DialogueStep::Advanced {
                character,
                line_index: next,
            });
        }
        Some(self.complete(character, roster, progress))
    }

    pub(crate) fn current_line<'a>(&self, roster: &'a Roster) -> Option<&'a str> {
        match *self {
            Self::Talking {
                character,
                line_index,
            } => roster.get(character)?.line(line_index),
            Self::Idle => None,
        }
    }

    pub(crate) fn is_last_line(&self, roster: &Roster) -> bool {
        match *self {
            Self::Talking {
                character,
                line_index,
            } => roster
                .get(character)
                .is_some_and(|entry| line_index + 1 >= entry.line_count()),
            Self::Idle => false,
        }
    }

    fn complete(
        &mut self,
        character: CharacterIndex,
        roster: &mut Roster,
        progress: &mut GameProgress,
    ) -> DialogueStep {
        *self = Self::Idle;
        if roster.mark_met(character) {
            progress.advance();
        }
        DialogueStep::Completed {
            character,
            stage: progress.stage(),
        }
    }
}
