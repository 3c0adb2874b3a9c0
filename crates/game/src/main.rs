mod app;

use engine::{run_app, HeadlessFrontend};

fn main() {
    let wiring = app::bootstrap::build_app();
    run_app(
        wiring.config,
        wiring.machine,
        wiring.ctx,
        Box::new(HeadlessFrontend::default()),
        wiring.start_spawn,
        wiring.metrics,
    );
}
