use engine::Vec2;

use super::GameplayConfig;

/// One tick of player motion: `position + speed * intent`, clamped so the
/// whole player box stays inside the scene.
pub(crate) fn step(position: Vec2, intent: Vec2, config: &GameplayConfig) -> Vec2 {
    let intent = if intent.is_finite() { intent } else { Vec2::ZERO };
    clamp_to_scene(position + intent * config.player_speed, config)
}

pub(crate) fn clamp_to_scene(position: Vec2, config: &GameplayConfig) -> Vec2 {
    Vec2::new(
        clamp_axis(position.x, config.scene_width - config.player_size),
        clamp_axis(position.y, config.scene_height - config.player_size),
    )
}

fn clamp_axis(value: f32, max: f32) -> f32 {
    let max = max.max(0.0);
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GameplayConfig {
        GameplayConfig::default()
    }

    #[test]
    fn step_scales_intent_by_speed() {
        let next = step(Vec2::new(100.0, 300.0), Vec2::new(1.0, -1.0), &config());
        assert_eq!(next, Vec2::new(103.0, 297.0));
    }

    #[test]
    fn zero_intent_keeps_position() {
        let start = Vec2::new(123.0, 456.0);
        assert_eq!(step(start, Vec2::ZERO, &config()), start);
    }

    #[test]
    fn step_clamps_at_every_edge() {
        let config = config();
        assert_eq!(
            step(Vec2::new(1.0, 1.0), Vec2::new(-1.0, -1.0), &config),
            Vec2::new(0.0, 0.0)
        );
        assert_eq!(
            step(Vec2::new(749.0, 549.0), Vec2::new(1.0, 1.0), &config),
            Vec2::new(750.0, 550.0)
        );
    }

    #[test]
    fn non_finite_intent_is_ignored() {
        let start = Vec2::new(10.0, 10.0);
        assert_eq!(step(start, Vec2::new(f32::NAN, 1.0), &config()), start);
        assert_eq!(step(start, Vec2::new(f32::INFINITY, 0.0), &config()), start);
    }

    #[test]
    fn clamp_recovers_from_nan_position() {
        let clamped = clamp_to_scene(Vec2::new(f32::NAN, 900.0), &config());
        assert_eq!(clamped, Vec2::new(0.0, 550.0));
    }

    #[test]
    fn scene_smaller_than_player_pins_to_origin() {
        let config = GameplayConfig {
            scene_width: 20.0,
            scene_height: 20.0,
            ..GameplayConfig::default()
        };
        assert_eq!(
            clamp_to_scene(Vec2::new(5.0, 5.0), &config),
            Vec2::new(0.0, 0.0)
        );
    }
}
