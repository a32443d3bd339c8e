mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod scene;

pub use input::{
    DisplayScale, InputAction, InputAggregator, InputEvent, VirtualJoystick,
    DISPLAY_SCALE_DEFAULT, DISPLAY_SCALE_MAX, DISPLAY_SCALE_MIN, DISPLAY_SCALE_STEP,
    JOYSTICK_MAX_DISTANCE,
};
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use metrics::LoopMetricsSnapshot;
pub use rendering::{scene_to_screen_px, Renderer, Viewport};
pub use scene::{
    Camera2D, DialoguePanel, Entity, EntityId, HudState, InputSnapshot, RenderableDesc,
    RenderableKind, Scene, SceneHost, SceneWorld, Transform, Vec2,
};
