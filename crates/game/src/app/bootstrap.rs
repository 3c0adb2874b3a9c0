use engine::{
    resolve_app_paths, LoopConfig, MetricsHandle, NullMusic, RoomId, RoomMachine, Vec2,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::progress::ProgressStore;
use super::story::{build_registry, StoryContext};

const SAVE_FILE: &str = "progress.json";

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) machine: RoomMachine<StoryContext>,
    pub(crate) ctx: StoryContext,
    pub(crate) start_spawn: Vec2,
    pub(crate) metrics: MetricsHandle,
}

/// Wires the whole game: tracing, the persisted progress record, the room
/// registry, and the loop configuration. The game always boots into the
/// title room; continuing from the resume pointer is the title's job.
pub(crate) fn build_app() -> AppWiring {
    init_tracing();
    info!("=== Winter Atlas Startup ===");

    let progress = match resolve_app_paths() {
        Ok(paths) => {
            info!(save_dir = %paths.save_dir.display(), "startup");
            ProgressStore::load_or_default(paths.save_dir.join(SAVE_FILE))
        }
        Err(error) => {
            // The save is a convenience; the game still runs memory-only.
            warn!(error = %error, "save_dir_unavailable_running_memory_only");
            ProgressStore::in_memory()
        }
    };

    let machine = build_registry(RoomId::Title);
    let ctx = StoryContext::new(progress, Box::new(NullMusic::default()));

    AppWiring {
        config: LoopConfig::default(),
        machine,
        ctx,
        start_spawn: Vec2::default(),
        metrics: MetricsHandle::default(),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
