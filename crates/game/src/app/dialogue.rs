use std::time::Duration;

/// One spoken line. Scripts are static tables, so lines borrow for the
/// program lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Line {
    pub speaker: &'static str,
    pub text: &'static str,
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct StartOptions {
    /// When set, a timer armed on the final line closes the sequence without
    /// player input. Used to bulletproof story beats whose completion must
    /// not stall on a missing confirm press.
    pub auto_close: Option<Duration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Player advances line by line with confirm.
    Manual,
    /// Cinematic auto-play: every line advances on a fixed timer and input
    /// is ignored entirely.
    Cinematic { line_duration: Duration },
}

#[derive(Debug)]
enum State<T> {
    Idle,
    Active {
        lines: &'static [Line],
        index: usize,
        on_complete: Option<T>,
        mode: Mode,
        auto_close: Option<Duration>,
        auto_close_timer: Option<Duration>,
        line_timer: Duration,
    },
}

enum TickOutcome {
    Nothing,
    Finish,
}

/// Modal line-by-line text presenter: `Idle -> Active -> Idle`. At most one
/// sequence is active process-wide; a `start` while active is dropped, not
/// queued (the rejected completion token is handed back to the caller).
/// The completion token `T` is emitted at most once, on whichever of
/// `advance`, `close`, or `tick` ends the sequence.
#[derive(Debug)]
pub(crate) struct DialogueSequencer<T> {
    state: State<T>,
}

impl<T> Default for DialogueSequencer<T> {
    fn default() -> Self {
        Self { state: State::Idle }
    }
}

impl<T> DialogueSequencer<T> {
    /// Begins a manual-advance sequence. No-op while a sequence is active:
    /// the rejected `on_complete` comes straight back so nothing is silently
    /// lost. Empty line lists are rejected the same way.
    pub(crate) fn start(
        &mut self,
        lines: &'static [Line],
        on_complete: Option<T>,
        opts: StartOptions,
    ) -> Option<T> {
        self.start_with_mode(lines, on_complete, Mode::Manual, opts.auto_close)
    }

    /// Begins a cinematic auto-play sequence: lines advance on `line_duration`
    /// and the sequence closes itself after the last one. Immune to input.
    pub(crate) fn start_cinematic(
        &mut self,
        lines: &'static [Line],
        on_complete: Option<T>,
        line_duration: Duration,
    ) -> Option<T> {
        self.start_with_mode(
            lines,
            on_complete,
            Mode::Cinematic { line_duration },
            None,
        )
    }

    fn start_with_mode(
        &mut self,
        lines: &'static [Line],
        on_complete: Option<T>,
        mode: Mode,
        auto_close: Option<Duration>,
    ) -> Option<T> {
        if self.is_active() || lines.is_empty() {
            return on_complete;
        }
        let line_timer = match mode {
            Mode::Cinematic { line_duration } => line_duration,
            Mode::Manual => Duration::ZERO,
        };
        self.state = State::Active {
            lines,
            index: 0,
            on_complete,
            mode,
            auto_close,
            auto_close_timer: None,
            line_timer,
        };
        None
    }

    pub(crate) fn is_active(&self) -> bool {
        matches!(self.state, State::Active { .. })
    }

    pub(crate) fn current_line(&self) -> Option<Line> {
        match &self.state {
            State::Active { lines, index, .. } => lines.get(*index).copied(),
            State::Idle => None,
        }
    }

    /// Moves to the next line; on the last line, completes. Meaningless when
    /// idle and ignored in cinematic mode.
    pub(crate) fn advance(&mut self) -> Option<T> {
        let at_end = match &mut self.state {
            State::Active {
                lines,
                index,
                mode: Mode::Manual,
                ..
            } => {
                if *index + 1 >= lines.len() {
                    true
                } else {
                    *index += 1;
                    false
                }
            }
            _ => return None,
        };
        if at_end {
            self.finish()
        } else {
            None
        }
    }

    /// Force-returns to idle from any state, firing a pending completion
    /// exactly once. Idempotent when already idle.
    pub(crate) fn close(&mut self) -> Option<T> {
        self.finish()
    }

    /// Drives the timers: auto-close on the final line (manual mode) and
    /// per-line auto-advance (cinematic mode).
    pub(crate) fn tick(&mut self, dt: Duration) -> Option<T> {
        let outcome = match &mut self.state {
            State::Idle => TickOutcome::Nothing,
            State::Active {
                lines,
                index,
                mode,
                auto_close,
                auto_close_timer,
                line_timer,
                ..
            } => match *mode {
                Mode::Cinematic { line_duration } => {
                    *line_timer = line_timer.saturating_sub(dt);
                    if !line_timer.is_zero() {
                        TickOutcome::Nothing
                    } else if *index + 1 >= lines.len() {
                        TickOutcome::Finish
                    } else {
                        *index += 1;
                        *line_timer = line_duration;
                        TickOutcome::Nothing
                    }
                }
                Mode::Manual => {
                    let on_final_line = *index + 1 == lines.len();
                    match (on_final_line, *auto_close) {
                        (true, Some(limit)) => {
                            let timer = auto_close_timer.get_or_insert(limit);
                            *timer = timer.saturating_sub(dt);
                            if timer.is_zero() {
                                TickOutcome::Finish
                            } else {
                                TickOutcome::Nothing
                            }
                        }
                        _ => TickOutcome::Nothing,
                    }
                }
            },
        };
        match outcome {
            TickOutcome::Finish => self.finish(),
            TickOutcome::Nothing => None,
        }
    }

    fn finish(&mut self) -> Option<T> {
        match std::mem::replace(&mut self.state, State::Idle) {
            State::Active { on_complete, .. } => on_complete,
            State::Idle => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_LINES: &[Line] = &[
        Line {
            speaker: "June",
            text: "first",
        },
        Line {
            speaker: "June",
            text: "second",
        },
    ];

    const ONE_LINE: &[Line] = &[Line {
        speaker: "Gabi",
        text: "only",
    }];

    fn sequencer() -> DialogueSequencer<&'static str> {
        DialogueSequencer::default()
    }

    #[test]
    fn advance_walks_lines_then_completes_once() {
        let mut dialogue = sequencer();
        assert!(dialogue
            .start(TWO_LINES, Some("done"), StartOptions::default())
            .is_none());
        assert_eq!(dialogue.current_line().map(|l| l.text), Some("first"));

        assert_eq!(dialogue.advance(), None);
        assert_eq!(dialogue.current_line().map(|l| l.text), Some("second"));

        assert_eq!(dialogue.advance(), Some("done"));
        assert!(!dialogue.is_active());
        assert_eq!(dialogue.advance(), None);
    }

    #[test]
    fn reentrant_start_is_dropped_and_returns_the_token() {
        let mut dialogue = sequencer();
        dialogue.start(TWO_LINES, Some("first"), StartOptions::default());

        let rejected = dialogue.start(ONE_LINE, Some("second"), StartOptions::default());
        assert_eq!(rejected, Some("second"));
        // The first sequence is untouched, still on its first line.
        assert_eq!(dialogue.current_line().map(|l| l.text), Some("first"));
    }

    #[test]
    fn close_is_idempotent_and_fires_completion_once() {
        let mut dialogue = sequencer();
        dialogue.start(TWO_LINES, Some("done"), StartOptions::default());

        assert_eq!(dialogue.close(), Some("done"));
        assert_eq!(dialogue.close(), None);
        assert!(!dialogue.is_active());
    }

    #[test]
    fn auto_close_fires_after_final_line_delay() {
        let mut dialogue = sequencer();
        dialogue.start(
            ONE_LINE,
            Some("done"),
            StartOptions {
                auto_close: Some(Duration::from_millis(100)),
            },
        );

        assert_eq!(dialogue.tick(Duration::from_millis(60)), None);
        assert!(dialogue.is_active());
        assert_eq!(dialogue.tick(Duration::from_millis(60)), Some("done"));
        assert!(!dialogue.is_active());
    }

    #[test]
    fn auto_close_only_arms_on_the_final_line() {
        let mut dialogue = sequencer();
        dialogue.start(
            TWO_LINES,
            Some("done"),
            StartOptions {
                auto_close: Some(Duration::from_millis(50)),
            },
        );

        // First line: no timer running yet, no matter how long we wait.
        assert_eq!(dialogue.tick(Duration::from_secs(5)), None);
        assert!(dialogue.is_active());

        dialogue.advance();
        assert_eq!(dialogue.tick(Duration::from_millis(50)), Some("done"));
    }

    #[test]
    fn explicit_close_cancels_the_armed_timer() {
        let mut dialogue = sequencer();
        dialogue.start(
            ONE_LINE,
            Some("done"),
            StartOptions {
                auto_close: Some(Duration::from_millis(100)),
            },
        );
        dialogue.tick(Duration::from_millis(50));

        assert_eq!(dialogue.close(), Some("done"));
        assert_eq!(dialogue.tick(Duration::from_millis(100)), None);
    }

    #[test]
    fn cinematic_mode_completes_without_input() {
        let mut dialogue = sequencer();
        dialogue.start_cinematic(TWO_LINES, Some("done"), Duration::from_millis(100));

        // Input is ignored entirely.
        assert_eq!(dialogue.advance(), None);
        assert_eq!(dialogue.current_line().map(|l| l.text), Some("first"));

        assert_eq!(dialogue.tick(Duration::from_millis(100)), None);
        assert_eq!(dialogue.current_line().map(|l| l.text), Some("second"));
        assert_eq!(dialogue.tick(Duration::from_millis(100)), Some("done"));
    }

    #[test]
    fn empty_lines_are_rejected_with_the_token() {
        let mut dialogue = sequencer();
        assert_eq!(
            dialogue.start(&[], Some("done"), StartOptions::default()),
            Some("done")
        );
        assert!(!dialogue.is_active());
    }
}
