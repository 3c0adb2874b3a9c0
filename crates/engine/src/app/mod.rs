mod audio;
mod input;
mod loop_runner;
mod metrics;
mod room;

pub use audio::{MusicDirector, NullMusic};
pub use input::{InputAction, InputCollector, InputSnapshot};
pub use loop_runner::{
    run_app, Frontend, FrontendControl, HeadlessFrontend, LoopConfig, HEADLESS_FRAMES_ENV_VAR,
};
pub use metrics::{LoopMetricsSnapshot, MetricsHandle};
pub use room::{Room, RoomCommand, RoomId, RoomMachine, Tilemap, TilemapError, Vec2};
