use std::time::Duration;

use tracing::debug;

/// Named-track music playback, implemented by the platform frontend. The
/// core only ever asks for tracks by name; decoding and mixing live outside
/// this crate. Playback failures are the implementor's to swallow; rooms
/// never observe them.
pub trait MusicDirector {
    /// Starts the named track, looping. Calling with the track that is
    /// already current is a no-op, so rooms can re-assert their track on
    /// every activation without restarting it.
    fn play(&mut self, track: &str);
    fn stop(&mut self);
    fn fade_out(&mut self, duration: Duration);
    fn current(&self) -> Option<&str>;
}

/// Track-state-only implementation for headless runs and tests. Honors the
/// same dedupe contract a real player must.
#[derive(Debug, Default)]
pub struct NullMusic {
    current: Option<String>,
}

impl MusicDirector for NullMusic {
    fn play(&mut self, track: &str) {
        if self.current.as_deref() == Some(track) {
            return;
        }
        debug!(track, "music_play");
        self.current = Some(track.to_string());
    }

    fn stop(&mut self) {
        self.current = None;
    }

    fn fade_out(&mut self, _duration: Duration) {
        self.current = None;
    }

    fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaying_current_track_is_a_noop() {
        let mut music = NullMusic::default();
        music.play("title_screen");
        music.play("title_screen");
        assert_eq!(music.current(), Some("title_screen"));
    }

    #[test]
    fn play_switches_tracks() {
        let mut music = NullMusic::default();
        music.play("0");
        music.play("1");
        assert_eq!(music.current(), Some("1"));
    }

    #[test]
    fn stop_and_fade_clear_current() {
        let mut music = NullMusic::default();
        music.play("4");
        music.stop();
        assert_eq!(music.current(), None);

        music.play("5");
        music.fade_out(Duration::from_millis(900));
        assert_eq!(music.current(), None);
    }
}
