use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;

use runecall_core::{AppConfig, AppConfigExt, CueError, CueService};

use crate::links::LinkTable;
use crate::players::{
    HostPlayerFactory, OutputKind, PlayerEvent, PlayerEventReceiver, create_player_channel,
};
use crate::sounds::SoundLibrary;

/// The cue service as wired up by this host
pub type HostService = CueService<HostPlayerFactory, SoundLibrary>;

#[derive(Default)]
pub struct BackgroundTasks {
    pub player_events: Option<JoinHandle<()>>,
    pub replay: Option<JoinHandle<()>>,
}

impl BackgroundTasks {
    pub async fn abort_all(&mut self) {
        if let Some(handle) = self.replay.take() {
            handle.abort();
        }
        if let Some(handle) = self.player_events.take() {
            handle.abort();
        }
    }
}

/// Holds all shared state for the CLI application.
/// This is a lightweight container - logic lives in the core service.
#[derive(Clone)]
pub struct CliContext {
    pub config: Arc<RwLock<AppConfig>>,
    pub service: Arc<HostService>,
    pub links: LinkTable,
    pub sounds: SoundLibrary,
    pub tasks: Arc<Mutex<BackgroundTasks>>,
    /// Persist config changes (links) to disk
    pub persist: bool,
}

impl CliContext {
    /// Build the service and start draining player events.
    /// Must be called from within a tokio runtime.
    pub fn new(config: AppConfig, output: OutputKind, persist: bool) -> Result<Self, CueError> {
        let (events_tx, events_rx) = create_player_channel();
        let links = LinkTable::from_config(&config.links);
        let sounds = SoundLibrary::new(config.sounds_path(), SoundLibrary::default_bundled_dir());

        let service = Arc::new(CueService::from_config(
            &config,
            HostPlayerFactory::new(output, events_tx),
            sounds.clone(),
            Box::new(links.clone()),
        )?);

        let tasks = BackgroundTasks {
            player_events: Some(spawn_event_pump(Arc::clone(&service), events_rx)),
            replay: None,
        };

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            service,
            links,
            sounds,
            tasks: Arc::new(Mutex::new(tasks)),
            persist,
        })
    }
}

/// Route player end events back into the service
pub fn spawn_event_pump(
    service: Arc<HostService>,
    mut events: PlayerEventReceiver,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                PlayerEvent::TrackEnded { player, reason } => {
                    let advanced = service.on_track_finished(player, reason);
                    tracing::debug!(%player, %reason, advanced, "Player event handled");
                }
            }
        }
    })
}
