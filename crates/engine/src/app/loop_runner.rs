use std::env;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use super::input::InputCollector;
use super::metrics::MetricsAccumulator;
use super::room::{RoomId, RoomMachine, Vec2};
use super::MetricsHandle;

pub const HEADLESS_FRAMES_ENV_VAR: &str = "WINTER_ATLAS_HEADLESS_FRAMES";

const DEFAULT_HEADLESS_FRAMES: u64 = 300;

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontendControl {
    Continue,
    Quit,
}

/// Platform adapter around the core loop. Implementations own the window,
/// renderer, and raw input devices; the loop only exchanges logical input
/// and a read-only view of the context with them.
pub trait Frontend<C> {
    /// Pumps platform events into the collector. Returning
    /// [`FrontendControl::Quit`] ends the loop after the current frame.
    fn poll(&mut self, input: &mut InputCollector) -> FrontendControl;

    /// Presents the current state. Called once per frame after simulation.
    fn present(&mut self, active_room: RoomId, ctx: &C);
}

/// Frontend that feeds no input and draws nothing; it quits after a bounded
/// number of frames so the core stays runnable without a platform layer.
/// `WINTER_ATLAS_HEADLESS_FRAMES` overrides the frame budget.
pub struct HeadlessFrontend {
    remaining_frames: u64,
}

impl Default for HeadlessFrontend {
    fn default() -> Self {
        Self {
            remaining_frames: resolve_headless_frames(),
        }
    }
}

impl<C> Frontend<C> for HeadlessFrontend {
    fn poll(&mut self, _input: &mut InputCollector) -> FrontendControl {
        if self.remaining_frames == 0 {
            info!(reason = "headless_frame_budget", "shutdown_requested");
            return FrontendControl::Quit;
        }
        self.remaining_frames -= 1;
        FrontendControl::Continue
    }

    fn present(&mut self, _active_room: RoomId, _ctx: &C) {}
}

fn resolve_headless_frames() -> u64 {
    match env::var(HEADLESS_FRAMES_ENV_VAR) {
        Ok(value) => match value.parse::<u64>() {
            Ok(frames) => frames,
            Err(_) => {
                warn!(
                    env_var = HEADLESS_FRAMES_ENV_VAR,
                    value = value.as_str(),
                    "invalid headless frame budget; using default"
                );
                DEFAULT_HEADLESS_FRAMES
            }
        },
        Err(_) => DEFAULT_HEADLESS_FRAMES,
    }
}

/// Drives the fixed-timestep loop: poll input, run due simulation ticks,
/// apply at most one room switch per tick, present, pace. Returns when the
/// frontend requests quit or a tick snapshot carries a quit request.
pub fn run_app<C>(
    config: LoopConfig,
    mut machine: RoomMachine<C>,
    mut ctx: C,
    mut frontend: Box<dyn Frontend<C>>,
    start_spawn: Vec2,
    metrics_handle: MetricsHandle,
) {
    let target_tps = config.target_tps.max(1);
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(1));
    let fixed_dt = Duration::from_secs_f64(1.0 / target_tps as f64);
    let fixed_dt_seconds = fixed_dt.as_secs_f32();

    let mut input = InputCollector::default();
    let mut accumulator = Duration::ZERO;
    let mut last_frame_instant = Instant::now();
    let mut metrics_accumulator = MetricsAccumulator::new(metrics_log_interval);

    machine.enter_active(start_spawn, &mut ctx);
    info!(
        target_tps,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame,
        first_room = machine.active().as_str(),
        "loop_config"
    );

    'frames: loop {
        if frontend.poll(&mut input) == FrontendControl::Quit {
            break;
        }

        let now = Instant::now();
        let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
        last_frame_instant = now;
        accumulator = accumulator.saturating_add(raw_frame_dt.min(max_frame_delta));

        let step_plan = plan_sim_steps(accumulator, fixed_dt, max_ticks_per_frame);
        for _ in 0..step_plan.ticks_to_run {
            let snapshot = input.snapshot_for_tick();
            if snapshot.quit_requested() {
                info!(reason = "quit_action", "shutdown_requested");
                break 'frames;
            }

            let command = machine.update_active(fixed_dt_seconds, &snapshot, &mut ctx);
            if machine.apply(command, &mut ctx) {
                metrics_accumulator.record_room_switch();
            }
            metrics_accumulator.record_tick();
        }
        accumulator = step_plan.remaining_accumulator;

        if step_plan.dropped_backlog > Duration::ZERO {
            warn!(
                dropped_backlog_ms = step_plan.dropped_backlog.as_millis() as u64,
                max_ticks_per_frame, "sim_clamp_triggered"
            );
        }

        frontend.present(machine.active(), &ctx);
        metrics_accumulator.record_frame(raw_frame_dt);

        if let Some(snapshot) = metrics_accumulator.maybe_snapshot(now) {
            metrics_handle.publish(snapshot);
            info!(
                fps = snapshot.fps,
                tps = snapshot.tps,
                frame_time_ms = snapshot.frame_time_ms,
                room_switches = snapshot.room_switches,
                room = machine.active().as_str(),
                "loop_metrics"
            );
        }

        let frame_spent = Instant::now().saturating_duration_since(now);
        if frame_spent < fixed_dt {
            thread::sleep(fixed_dt - frame_spent);
        }
    }

    machine.shutdown(&mut ctx);
    info!("shutdown");
}

#[derive(Debug, Clone, Copy)]
struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;

    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    if accumulator >= fixed_dt {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: Duration::ZERO,
            dropped_backlog: accumulator,
        }
    } else {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: accumulator,
            dropped_backlog: Duration::ZERO,
        }
    }
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_sim_steps_runs_expected_ticks_without_drop() {
        let fixed_dt = Duration::from_millis(16);
        let result = plan_sim_steps(Duration::from_millis(48), fixed_dt, 5);

        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::ZERO);
        assert_eq!(result.dropped_backlog, Duration::ZERO);
    }

    #[test]
    fn plan_sim_steps_keeps_partial_remainder() {
        let fixed_dt = Duration::from_millis(16);
        let result = plan_sim_steps(Duration::from_millis(40), fixed_dt, 5);

        assert_eq!(result.ticks_to_run, 2);
        assert_eq!(result.remaining_accumulator, Duration::from_millis(8));
    }

    #[test]
    fn plan_sim_steps_drops_backlog_when_tick_cap_hit() {
        let fixed_dt = Duration::from_millis(16);
        let result = plan_sim_steps(Duration::from_millis(120), fixed_dt, 3);

        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::ZERO);
        assert_eq!(result.dropped_backlog, Duration::from_millis(72));
    }

    #[test]
    fn zero_durations_fall_back_to_defaults() {
        assert_eq!(
            normalize_non_zero_duration(Duration::ZERO, Duration::from_secs(1)),
            Duration::from_secs(1)
        );
        assert_eq!(
            normalize_non_zero_duration(Duration::from_millis(5), Duration::from_secs(1)),
            Duration::from_millis(5)
        );
    }
}
