//! Read-only snapshot handed to presentation. Serialized for the F3 state dump.

use engine::Vec2;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub(crate) struct PositionView {
    pub(crate) x: f32,
    pub(crate) y: f32,
}

impl From<Vec2> for PositionView {
    fn from(value: Vec2) -> Self {
        Self {
            x: value.x,
            y: value.y,
        }
    }
}

impl From<PositionView> for Vec2 {
    fn from(value: PositionView) -> Self {
        Vec2::new(value.x, value.y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct CharacterView {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) glyph: char,
    pub(crate) position: PositionView,
    pub(crate) visible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct DialogueView {
    pub(crate) character_id: String,
    pub(crate) speaker: String,
    pub(crate) glyph: char,
    pub(crate) line_index: usize,
    pub(crate) line_count: usize,
    pub(crate) text: String,
    pub(crate) is_last_line: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct RenderView {
    pub(crate) player: PositionView,
    pub(crate) characters: Vec<CharacterView>,
    pub(crate) dialogue: Option<DialogueView>,
    pub(crate) met_count: usize,
    pub(crate) character_count: usize,
    pub(crate) stage: u32,
    pub(crate) display_scale: f32,
}

impl RenderView {
    pub(crate) fn counter_text(&self) -> String {
        format!("Met: {}/{}", self.met_count, self.character_count)
    }
}
