//! Playback transport contract and the deterministic implementation used
//! by the authoring CLI and tests.

/// The media playback collaborator. Decoding and presentation live
/// entirely on the other side of this trait.
pub trait PlaybackTransport {
    /// Current playback position in seconds.
    fn current_time(&self) -> f64;
    /// Media duration in seconds.
    fn duration(&self) -> f64;
    fn play(&mut self);
    fn pause(&mut self);
}

/// Events the transport feeds into a session. Delivery happens on the
/// single cooperative event loop; a session never polls.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// First-load readiness. Replaces the original player's poll-until-
    /// renderer-ready loop; markers load exactly once on this event.
    Ready,
    /// Playback started. The editor gates placement affordances on having
    /// seen this at least once.
    Play,
    /// The media clock advanced; drives visibility and interpolation.
    TimeUpdate,
    /// Media failed to load or decode. Non-recoverable for the session.
    Error(String),
}

/// Deterministic transport with an externally driven clock.
#[derive(Debug, Default)]
pub struct ManualTransport {
    time: f64,
    duration: f64,
    playing: bool,
}

impl ManualTransport {
    pub fn new(duration: f64) -> Self {
        Self {
            time: 0.0,
            duration: duration.max(0.0),
            playing: false,
        }
    }

    /// Move the clock; clamped to the media duration.
    pub fn seek(&mut self, time: f64) {
        self.time = time.clamp(0.0, self.duration);
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }
}

impl PlaybackTransport for ManualTransport {
    fn current_time(&self) -> f64 {
        self.time
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn play(&mut self) {
        self.playing = true;
    }

    fn pause(&mut self) {
        self.playing = false;
    }
}
