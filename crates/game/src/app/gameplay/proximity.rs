use engine::Vec2;

use super::roster::{CharacterIndex, Roster};

/// First unmet character, in roster order, strictly closer than `radius` to
/// `player`. Distances are between top-left corners.
pub(crate) fn find_nearby(roster: &Roster, player: Vec2, radius: f32) -> Option<CharacterIndex> {
    roster
        .iter()
        .filter(|(_, character)| !character.is_met())
        .find(|(_, character)| character.position().distance(player) < radius)
        .map(|(index, _)| index)
}
