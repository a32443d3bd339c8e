use std::collections::HashSet;

use engine::Vec2;
use thiserror::Error;

/// Position of a character in roster order. Dialogue sessions hold this,
/// never the character itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct CharacterIndex(usize);

#[derive(Debug, Clone)]
pub(crate) struct Character {
    id: String,
    name: String,
    position: Vec2,
    glyph: char,
    lines: Vec<String>,
    met: bool,
}

impl Character {
    pub(crate) fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        position: Vec2,
        glyph: char,
        lines: &[&str],
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            position,
            glyph,
            lines: lines.iter().map(|line| line.to_string()).collect(),
            met: false,
        }
    }

    pub(crate) fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn position(&self) -> Vec2 {
        self.position
    }

    pub(crate) fn glyph(&self) -> char {
        self.glyph
    }

    pub(crate) fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    pub(crate) fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub(crate) fn is_met(&self) -> bool {
        self.met
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum RosterError {
    #[error("character at roster slot {slot} has an empty id")]
    EmptyId { slot: usize },
    #[error("character id `{0}` appears more than once")]
    DuplicateId(String),
}

/// Fixed cast in roster order. Only the `met` flags ever change.
#[derive(Debug, Clone)]
pub(crate) struct Roster {
    characters: Vec<Character>,
}

impl Roster {
    pub(crate) fn new(characters: Vec<Character>) -> Result<Self, RosterError> {
        let mut seen = HashSet::new();
        for (slot, character) in characters.iter().enumerate() {
            if character.id.trim().is_empty() {
                return Err(RosterError::EmptyId { slot });
            }
            if !seen.insert(character.id.as_str()) {
                return Err(RosterError::DuplicateId(character.id.clone()));
            }
        }
        Ok(Self { characters })
    }

    pub(crate) fn len(&self) -> usize {
        self.characters.len()
    }

    pub(crate) fn get(&self, index: CharacterIndex) -> Option<&Character> {
        self.characters.get(index.0)
    }

    pub(crate) fn index_of(&self, id: &str) -> Option<CharacterIndex> {
        self.characters
            .iter()
            .position(|character| character.id == id)
            .map(CharacterIndex)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (CharacterIndex, &Character)> {
        self.characters
            .iter()
            .enumerate()
            .map(|(index, character)| (CharacterIndex(index), character))
    }

    pub(crate) fn met_count(&self) -> usize {
        self.characters.iter().filter(|character| character.met).count()
    }

    /// Sets `met`; returns whether the flag changed. Never clears it.
    pub(crate) fn mark_met(&mut self, index: CharacterIndex) -> bool {
        match self.characters.get_mut(index.0) {
            Some(character) if !character.met => {
                character.met = true;
                true
            }
            _ => false,
        }
    }
}

pub(crate) fn default_cast() -> Result<Roster, RosterError> {
    Roster::new(vec![
        Character::new(
            "taph",
            "Taph",
            Vec2::new(300.0, 250.0),
            'T',
            &[
                "Hi! I'm Taph from Forsaken!",
                "*waves* Hi!",
                "*points* You...",
                "*stone face* Talk?",
                "*shrugs* No?",
                "*Silent Salt shakes their head*",
                "Hmm, looks like this isn't working...",
            ],
        ),
        Character::new(
            "jason",
            "Jason Voorhees",
            Vec2::new(500.0, 300.0),
            'J',
            &[
                "*Steps out of the shadows*",
                "Ki ki ki... ma ma ma...",
                "Ki ki... ma?",
                "*Silent Salt stares, puzzled*",
                "*Jason shrugs*",
            ],
        ),
        Character::new(
            "gaster",
            "W.D. Gaster",
            Vec2::new(400.0, 450.0),
            'G',
            &[
                "*You fall into a black void*",
                "I think you're a little...",
                "out of touch with reality.",
                "buddy.",
                "*Gaster sends you back*",
            ],
        ),
        Character::new(
            "nox",
            "Nox",
            Vec2::new(650.0, 200.0),
            'N',
            &[
                "*You are back in Cookie Run Kingdom*",
                "Silent Salt! Finally, I found you!",
                "I know you can't speak...",
                "But I'll teach you! Repeat after me:",
                "Hel-lo!",
                "*Silent Salt tries*",
                "...H...He...Hello!",
                "Wonderful! You spoke!",
            ],
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn character(id: &str) -> Character {
        Character::new(id, id, Vec2::ZERO, 'X', &["hello"])
    }

    #[test]
    fn default_cast_has_four_characters_in_order() {
        let roster = default_cast().expect("cast");
        let ids: Vec<&str> = roster.iter().map(|(_, character)| character.id()).collect();
        assert_eq!(ids, ["taph", "jason", "gaster", "nox"]);

        let counts: Vec<usize> = roster
            .iter()
            .map(|(_, character)| character.line_count())
            .collect();
        assert_eq!(counts, [7, 5, 5, 8]);
        assert_eq!(roster.met_count(), 0);
    }

    #[test]
    fn dialogue_lines_are_ascii_for_the_bitmap_font() {
        let roster = default_cast().expect("cast");
        for (_, character) in roster.iter() {
            for index in 0..character.line_count() {
                let line = character.line(index).expect("line");
                assert!(line.is_ascii(), "{line}");
            }
        }
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let error = Roster::new(vec![character("a"), character("a")]).expect_err("dup");
        assert_eq!(error, RosterError::DuplicateId("a".to_string()));
    }

    #[test]
    fn empty_ids_are_rejected() {
        let error = Roster::new(vec![character("a"), character("  ")]).expect_err("empty");
        assert_eq!(error, RosterError::EmptyId { slot: 1 });
    }

    #[test]
    fn mark_met_is_monotonic() {
        let mut roster = Roster::new(vec![character("a"), character("b")]).expect("roster");
        let b = roster.index_of("b").expect("b");

        assert!(roster.mark_met(b));
        assert!(!roster.mark_met(b));
        assert!(roster.get(b).expect("b").is_met());
        assert_eq!(roster.met_count(), 1);
    }

    #[test]
    fn out_of_range_index_is_ignored() {
        let mut roster = Roster::new(vec![character("a")]).expect("roster");
        assert!(!roster.mark_met(CharacterIndex(9)));
        assert!(roster.get(CharacterIndex(9)).is_none());
    }
}
