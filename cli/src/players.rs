//! Host-side audio players
//!
//! The console player only logs what it would play; the speaker player (behind
//! the `speaker` feature) plays through the default output device with rodio.
//! Both report track ends on a channel drained by a background task, so the
//! queue is never re-entered from inside `start_track`.

use std::path::PathBuf;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use runecall_core::{AudioPlayer, PlayerFactory, PlayerKey, TrackEndReason};

/// A resolved sound file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundTrack {
    pub id: String,
    pub path: PathBuf,
}

/// Events players send back to the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerEvent {
    TrackEnded {
        player: PlayerKey,
        reason: TrackEndReason,
    },
}

pub type PlayerEventSender = mpsc::UnboundedSender<PlayerEvent>;
pub type PlayerEventReceiver = mpsc::UnboundedReceiver<PlayerEvent>;

pub fn create_player_channel() -> (PlayerEventSender, PlayerEventReceiver) {
    mpsc::unbounded_channel()
}

fn report_end(events: &PlayerEventSender, player: PlayerKey, reason: TrackEndReason) {
    if events
        .send(PlayerEvent::TrackEnded { player, reason })
        .is_err()
    {
        tracing::debug!(%player, %reason, "Player event dropped, service gone");
    }
}

/// Which output the factory builds players for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputKind {
    #[default]
    Console,
    #[cfg(feature = "speaker")]
    Speaker,
}

// ─────────────────────────────────────────────────────────────────────────────
// Console Player
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct ConsoleState {
    current: Option<SoundTrack>,
    volume: u8,
    rate: u16,
}

/// Prints starts and stops. Track ends are driven by the `finish` REPL command.
#[derive(Debug)]
pub struct ConsolePlayer {
    key: PlayerKey,
    events: PlayerEventSender,
    state: Mutex<ConsoleState>,
}

impl ConsolePlayer {
    pub fn new(key: PlayerKey, events: PlayerEventSender) -> Self {
        Self {
            key,
            events,
            state: Mutex::new(ConsoleState {
                current: None,
                volume: 100,
                rate: 100,
            }),
        }
    }

    pub fn current(&self) -> Option<SoundTrack> {
        self.state.lock().current.clone()
    }

    /// End the current track with `reason`. Returns false if nothing played.
    pub fn finish_current(&self, reason: TrackEndReason) -> bool {
        let ended = self.state.lock().current.take();
        match ended {
            Some(track) => {
                println!("[{}] {} ended ({reason})", self.key.destination, track.id);
                report_end(&self.events, self.key, reason);
                true
            }
            None => false,
        }
    }
}

impl AudioPlayer for ConsolePlayer {
    type Track = SoundTrack;

    fn set_volume(&self, volume: u8) {
        self.state.lock().volume = volume;
    }

    fn set_rate(&self, rate: u16) {
        self.state.lock().rate = rate;
    }

    fn start_track(&self, track: SoundTrack) -> bool {
        let mut state = self.state.lock();
        println!(
            "[{}] ▶ {} (volume {}, rate {}%)",
            self.key.destination, track.id, state.volume, state.rate
        );
        state.current = Some(track);
        true
    }

    fn stop_all_tracks(&self) {
        self.finish_current(TrackEndReason::Stopped);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Speaker Player
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "speaker")]
mod speaker {
    use std::fs::File;
    use std::io::BufReader;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU8, AtomicU16, Ordering};

    use parking_lot::Mutex;
    use rodio::{Decoder, OutputStream, Sink};

    use runecall_core::{AudioPlayer, PlayerKey, TrackEndReason};

    use super::{PlayerEventSender, SoundTrack, report_end};

    /// One started track. The sink arrives once the playback thread opened
    /// the output device.
    #[derive(Default)]
    struct Playback {
        sink: Mutex<Option<Arc<Sink>>>,
        stop_reason: Mutex<Option<TrackEndReason>>,
    }

    impl Playback {
        fn stop(&self, reason: TrackEndReason) {
            {
                let mut stop_reason = self.stop_reason.lock();
                if stop_reason.is_none() {
                    *stop_reason = Some(reason);
                }
            }
            if let Some(sink) = self.sink.lock().as_ref() {
                sink.stop();
            }
        }
    }

    pub struct SpeakerPlayer {
        key: PlayerKey,
        events: PlayerEventSender,
        volume: AtomicU8,
        rate: AtomicU16,
        current: Arc<Mutex<Option<Arc<Playback>>>>,
    }

    impl SpeakerPlayer {
        pub fn new(key: PlayerKey, events: PlayerEventSender) -> Self {
            Self {
                key,
                events,
                volume: AtomicU8::new(100),
                rate: AtomicU16::new(100),
                current: Arc::new(Mutex::new(None)),
            }
        }

        pub fn finish_current(&self, reason: TrackEndReason) -> bool {
            match self.current.lock().take() {
                Some(playback) => {
                    playback.stop(reason);
                    true
                }
                None => false,
            }
        }
    }

    impl AudioPlayer for SpeakerPlayer {
        type Track = SoundTrack;

        fn set_volume(&self, volume: u8) {
            self.volume.store(volume, Ordering::SeqCst);
        }

        fn set_rate(&self, rate: u16) {
            self.rate.store(rate, Ordering::SeqCst);
        }

        fn start_track(&self, track: SoundTrack) -> bool {
            let volume = f32::from(self.volume.load(Ordering::SeqCst)) / 100.0;
            let speed = f32::from(self.rate.load(Ordering::SeqCst)) / 100.0;
            let playback = Arc::new(Playback::default());
            *self.current.lock() = Some(Arc::clone(&playback));

            let key = self.key;
            let events = self.events.clone();
            let current = Arc::clone(&self.current);

            let spawned = std::thread::Builder::new()
                .name(format!("speaker-{}", key.destination))
                .spawn(move || {
                    let reason = play_to_end(&track, &playback, volume, speed);
                    {
                        let mut current = current.lock();
                        if current.as_ref().is_some_and(|p| Arc::ptr_eq(p, &playback)) {
                            *current = None;
                        }
                    }
                    report_end(&events, key, reason);
                });

            match spawned {
                Ok(_) => true,
                Err(e) => {
                    tracing::warn!(player = %key, error = %e, "Failed to spawn playback thread");
                    self.current.lock().take();
                    false
                }
            }
        }

        fn stop_all_tracks(&self) {
            self.finish_current(TrackEndReason::Stopped);
        }
    }

    /// Blocks until the track ends and returns why it ended
    fn play_to_end(
        track: &SoundTrack,
        playback: &Playback,
        volume: f32,
        speed: f32,
    ) -> TrackEndReason {
        let Ok((_stream, handle)) = OutputStream::try_default() else {
            tracing::warn!(sound = %track.id, "No audio output device");
            return TrackEndReason::LoadFailed;
        };
        let Ok(file) = File::open(&track.path) else {
            return TrackEndReason::LoadFailed;
        };
        let Ok(source) = Decoder::new(BufReader::new(file)) else {
            tracing::warn!(
                sound = %track.id,
                path = %track.path.display(),
                "Failed to decode sound"
            );
            return TrackEndReason::LoadFailed;
        };
        let Ok(sink) = Sink::try_new(&handle) else {
            return TrackEndReason::LoadFailed;
        };

        sink.set_volume(volume);
        sink.set_speed(speed);
        sink.append(source);
        let sink = Arc::new(sink);
        {
            let mut slot = playback.sink.lock();
            *slot = Some(Arc::clone(&sink));
            if playback.stop_reason.lock().is_some() {
                sink.stop();
            }
        }

        sink.sleep_until_end();
        playback
            .stop_reason
            .lock()
            .take()
            .unwrap_or(TrackEndReason::Finished)
    }
}

#[cfg(feature = "speaker")]
pub use speaker::SpeakerPlayer;

// ─────────────────────────────────────────────────────────────────────────────
// Factory
// ─────────────────────────────────────────────────────────────────────────────

/// Player handed to each destination by [`HostPlayerFactory`]
pub enum HostPlayer {
    Console(ConsolePlayer),
    #[cfg(feature = "speaker")]
    Speaker(SpeakerPlayer),
}

impl HostPlayer {
    pub fn finish_current(&self, reason: TrackEndReason) -> bool {
        match self {
            HostPlayer::Console(player) => player.finish_current(reason),
            #[cfg(feature = "speaker")]
            HostPlayer::Speaker(player) => player.finish_current(reason),
        }
    }
}

impl AudioPlayer for HostPlayer {
    type Track = SoundTrack;

    fn set_volume(&self, volume: u8) {
        match self {
            HostPlayer::Console(player) => player.set_volume(volume),
            #[cfg(feature = "speaker")]
            HostPlayer::Speaker(player) => player.set_volume(volume),
        }
    }

    fn set_rate(&self, rate: u16) {
        match self {
            HostPlayer::Console(player) => player.set_rate(rate),
            #[cfg(feature = "speaker")]
            HostPlayer::Speaker(player) => player.set_rate(rate),
        }
    }

    fn start_track(&self, track: SoundTrack) -> bool {
        match self {
            HostPlayer::Console(player) => player.start_track(track),
            #[cfg(feature = "speaker")]
            HostPlayer::Speaker(player) => player.start_track(track),
        }
    }

    fn stop_all_tracks(&self) {
        match self {
            HostPlayer::Console(player) => player.stop_all_tracks(),
            #[cfg(feature = "speaker")]
            HostPlayer::Speaker(player) => player.stop_all_tracks(),
        }
    }
}

pub struct HostPlayerFactory {
    output: OutputKind,
    events: PlayerEventSender,
}

impl HostPlayerFactory {
    pub fn new(output: OutputKind, events: PlayerEventSender) -> Self {
        Self { output, events }
    }
}

impl PlayerFactory for HostPlayerFactory {
    type Player = HostPlayer;

    fn create(&self, key: PlayerKey) -> HostPlayer {
        let events = self.events.clone();
        match self.output {
            OutputKind::Console => HostPlayer::Console(ConsolePlayer::new(key, events)),
            #[cfg(feature = "speaker")]
            OutputKind::Speaker => HostPlayer::Speaker(SpeakerPlayer::new(key, events)),
        }
    }
}
